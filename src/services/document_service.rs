// src/services/document_service.rs

use std::path::{Path, PathBuf};

use chrono::Local;
use genpdf::{
    elements,
    fonts::{FontData, FontFamily},
    style, Element,
};
use image::Luma;
use qrcode::QrCode;

use crate::{common::error::AppError, models::disposition::DispositionRecord};

// Geração síncrona de PDF; o pipeline de disposição chama via spawn_blocking
pub trait DocumentRenderer: Send + Sync {
    fn render_call_report(&self, record: &DispositionRecord) -> Result<PathBuf, AppError>;
    fn render_appointment_confirmation(&self, record: &DispositionRecord) -> Result<PathBuf, AppError>;
}

// (diretório, família) no padrão Nome-Regular.ttf / Nome-Bold.ttf ...
const SYSTEM_FONT_FAMILIES: &[(&str, &str)] = &[
    ("/usr/share/fonts/liberation", "LiberationSans"),
    ("/usr/share/fonts/truetype/liberation", "LiberationSans"),
    ("/usr/share/fonts/TTF", "LiberationSans"),
    ("/usr/share/fonts/noto", "NotoSans"),
    ("/usr/share/fonts/truetype/noto", "NotoSans"),
    ("/usr/share/fonts/TTF", "NotoSans"),
];

// Arquivos avulsos (regular, negrito)
const SYSTEM_FONT_FILES: &[(&str, &str)] = &[
    ("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf", "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf"),
    ("/usr/share/fonts/TTF/DejaVuSans.ttf", "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf"),
    ("C:\\Windows\\Fonts\\arial.ttf", "C:\\Windows\\Fonts\\arialbd.ttf"),
    ("/Library/Fonts/Arial.ttf", "/Library/Fonts/Arial Bold.ttf"),
];

const CONFIGURED_FAMILIES: &[&str] = &["Roboto", "LiberationSans", "NotoSans", "DejaVuSans"];

/// Procura uma família de fontes: primeiro no diretório configurado, depois nos locais comuns do sistema.
pub fn load_fonts(fonts_dir: &Path) -> Result<FontFamily<FontData>, AppError> {
    for family in CONFIGURED_FAMILIES {
        if let Ok(fonts) = genpdf::fonts::from_files(fonts_dir, family, None) {
            return Ok(fonts);
        }
    }

    for (dir, family) in SYSTEM_FONT_FAMILIES {
        if let Ok(fonts) = genpdf::fonts::from_files(dir, family, None) {
            return Ok(fonts);
        }
    }

    for (regular_path, bold_path) in SYSTEM_FONT_FILES {
        let Ok(regular_data) = std::fs::read(regular_path) else {
            continue;
        };
        let bold_data = std::fs::read(bold_path).unwrap_or_else(|_| regular_data.clone());

        if let (Ok(regular), Ok(bold), Ok(italic), Ok(bold_italic)) = (
            FontData::new(regular_data.clone(), None),
            FontData::new(bold_data.clone(), None),
            FontData::new(regular_data, None),
            FontData::new(bold_data, None),
        ) {
            return Ok(FontFamily { regular, bold, italic, bold_italic });
        }
    }

    Err(AppError::FontNotFound(format!(
        "Nenhuma fonte TrueType encontrada em {:?} nem no sistema",
        fonts_dir
    )))
}

#[derive(Clone)]
pub struct DocumentService {
    exports_dir: PathBuf,
    fonts_dir: PathBuf,
}

impl DocumentService {
    pub fn new(exports_dir: &Path, fonts_dir: &Path) -> Result<Self, AppError> {
        std::fs::create_dir_all(exports_dir)?;
        Ok(Self { exports_dir: exports_dir.to_path_buf(), fonts_dir: fonts_dir.to_path_buf() })
    }

    fn new_document(&self, title: &str) -> Result<genpdf::Document, AppError> {
        let fonts = load_fonts(&self.fonts_dir)?;
        let mut doc = genpdf::Document::new(fonts);
        doc.set_title(title);
        doc.set_paper_size(genpdf::PaperSize::Letter);

        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(18);
        doc.set_page_decorator(decorator);
        Ok(doc)
    }

    // O número de confirmação entra no nome para não sobrescrever dois documentos do mesmo segundo
    fn output_path(&self, prefix: &str, confirmation_number: &str) -> PathBuf {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        self.exports_dir.join(format!("{}_{}_{}.pdf", prefix, timestamp, confirmation_number))
    }
}

fn section_header(title: &'static str) -> impl Element {
    elements::Paragraph::new(title).styled(style::Style::new().bold().with_font_size(14))
}

// Tabela de duas colunas (rótulo, valor) com grade
fn info_table(rows: &[(&str, &str)]) -> Result<elements::TableLayout, AppError> {
    let mut table = elements::TableLayout::new(vec![1, 3]);
    table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

    let label_style = style::Style::new().bold();
    for (label, value) in rows {
        table
            .row()
            .element(elements::Paragraph::new(*label).styled(label_style).padded(1))
            .element(elements::Paragraph::new(*value).padded(1))
            .push()?;
    }
    Ok(table)
}

fn confirmation_qr(confirmation_number: &str) -> Result<elements::Image, AppError> {
    let code = QrCode::new(confirmation_number.as_bytes())
        .map_err(|e| AppError::Pdf(format!("QR code: {}", e)))?;

    let image_buffer = code.render::<Luma<u8>>().build();
    let dynamic_image = image::DynamicImage::ImageLuma8(image_buffer);

    Ok(elements::Image::from_dynamic_image(dynamic_image)?
        .with_scale(genpdf::Scale::new(0.5, 0.5)))
}

impl DocumentRenderer for DocumentService {
    fn render_call_report(&self, record: &DispositionRecord) -> Result<PathBuf, AppError> {
        let mut doc = self.new_document("Storm911 Call Report")?;

        doc.push(
            elements::Paragraph::new("Storm911 Call Report")
                .styled(style::Style::new().bold().with_font_size(24)),
        );
        doc.push(elements::Break::new(1));
        doc.push(elements::Paragraph::new(format!(
            "Generated: {}",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        )));
        doc.push(elements::Paragraph::new(format!(
            "Disposition: {}    Confirmation: {}",
            record.disposition_type.label(),
            record.confirmation_number
        )));
        doc.push(elements::Break::new(1.5));

        doc.push(section_header("Customer Information"));
        doc.push(info_table(&[
            ("Name:", record.customer_name.as_str()),
            ("Address:", record.address.as_str()),
            ("Phone:", record.phone.as_str()),
            ("Email:", record.email.as_str()),
        ])?);
        doc.push(elements::Break::new(1));

        doc.push(section_header("Roofing Information"));
        doc.push(info_table(&[
            ("Stories:", record.stories.as_str()),
            ("Roof Age:", record.roof_age.as_str()),
            ("Roof Type:", record.roof_type.as_str()),
        ])?);
        doc.push(elements::Break::new(1));

        doc.push(section_header("Insurance Information"));
        doc.push(info_table(&[
            ("Has Insurance:", record.has_insurance.as_str()),
            ("Insurance Company:", record.insurance_company.as_str()),
            ("Is Homeowner:", record.is_homeowner.as_str()),
            ("Has Contractor:", record.has_contractor.as_str()),
        ])?);
        doc.push(elements::Break::new(1));

        doc.push(section_header("Appointment Information"));
        let duration = record.appointment_duration.clone().unwrap_or_default();
        doc.push(info_table(&[
            ("Date:", record.appointment_date.as_str()),
            ("Time:", record.appointment_time.as_str()),
            ("Duration:", duration.as_str()),
        ])?);

        if !record.notes.trim().is_empty() {
            doc.push(elements::Break::new(1));
            doc.push(section_header("Notes"));
            for line in record.notes.lines() {
                doc.push(elements::Paragraph::new(line));
            }
        }

        let path = self.output_path("call_report", &record.confirmation_number);
        doc.render_to_file(&path)?;

        tracing::info!("📄 Relatório da ligação gerado: {:?}", path);
        Ok(path)
    }

    fn render_appointment_confirmation(&self, record: &DispositionRecord) -> Result<PathBuf, AppError> {
        let mut doc = self.new_document("Roof Inspection Appointment Confirmation")?;
        let bold = style::Style::new().bold();

        doc.push(
            elements::Paragraph::new("Roof Inspection Appointment Confirmation")
                .styled(style::Style::new().bold().with_font_size(20)),
        );
        doc.push(elements::Break::new(1));
        doc.push(elements::Paragraph::new(format!("Dear {},", record.customer_name)));
        doc.push(elements::Break::new(1));
        doc.push(elements::Paragraph::new(
            "This letter confirms your upcoming FREE roof inspection appointment with Storm911.",
        ));
        doc.push(elements::Break::new(1));

        doc.push(elements::Paragraph::new("Appointment Details:").styled(bold));
        doc.push(elements::Paragraph::new(format!("Date: {}", record.appointment_date)));
        doc.push(elements::Paragraph::new(format!("Time: {}", record.appointment_time)));
        doc.push(elements::Paragraph::new(format!("Address: {}", record.address)));
        if let Some(duration) = &record.appointment_duration {
            doc.push(elements::Paragraph::new(format!("Estimated duration: {}", duration)));
        }
        doc.push(elements::Paragraph::new(format!(
            "Confirmation Number: {}",
            record.confirmation_number
        )));
        doc.push(elements::Break::new(1));

        doc.push(elements::Paragraph::new("What to Expect:").styled(bold));
        for line in [
            "Our professional inspector will arrive at the scheduled time",
            "We will thoroughly examine your roof for any storm damage",
            "You will receive a detailed report of our findings",
        ] {
            doc.push(elements::Paragraph::new(format!("- {}", line)));
        }
        doc.push(elements::Break::new(1));

        doc.push(elements::Paragraph::new("Important Notes:").styled(bold));
        for line in [
            "No payment is required for this inspection",
            "We work with all insurance companies",
            "You will receive professional documentation of any damage found",
        ] {
            doc.push(elements::Paragraph::new(format!("- {}", line)));
        }
        doc.push(elements::Break::new(1));

        doc.push(elements::Paragraph::new(
            "If you need to reschedule or have any questions, please contact us at:",
        ));
        doc.push(elements::Paragraph::new("Phone: 1-800-STORM911"));
        doc.push(elements::Paragraph::new("Email: appointments@storm911.com"));
        doc.push(elements::Break::new(1.5));

        doc.push(confirmation_qr(&record.confirmation_number)?);
        doc.push(elements::Break::new(1));
        doc.push(
            elements::Paragraph::new("Thank you for choosing Storm911 for your roof inspection needs.")
                .styled(style::Style::new().italic()),
        );

        let path = self.output_path("appointment_confirmation", &record.confirmation_number);
        doc.render_to_file(&path)?;

        tracing::info!("📄 Confirmação de agendamento gerada: {:?}", path);
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_record;

    // Sem fonte instalada na máquina de teste não há como renderizar
    fn service_with_fonts(dir: &Path) -> Option<DocumentService> {
        if load_fonts(&dir.join("fonts")).is_err() {
            eprintln!("nenhuma fonte disponível, teste de PDF ignorado");
            return None;
        }
        DocumentService::new(&dir.join("EXPORTS"), &dir.join("fonts")).ok()
    }

    #[test]
    fn call_report_is_written_with_expected_name() {
        let dir = tempfile::tempdir().unwrap();
        let Some(service) = service_with_fonts(dir.path()) else { return };

        let record = sample_record();
        let path = service.render_call_report(&record).unwrap();

        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("call_report_"));
        assert!(name.ends_with(&format!("_{}.pdf", record.confirmation_number)));
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn confirmation_letter_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let Some(service) = service_with_fonts(dir.path()) else { return };

        let path = service.render_appointment_confirmation(&sample_record()).unwrap();
        assert!(path.starts_with(dir.path().join("EXPORTS")));
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn unknown_fonts_dir_falls_back_or_reports_font_not_found() {
        let dir = tempfile::tempdir().unwrap();
        match load_fonts(&dir.path().join("nope")) {
            Ok(_) => {}
            Err(e) => assert!(matches!(e, AppError::FontNotFound(_))),
        }
    }
}
