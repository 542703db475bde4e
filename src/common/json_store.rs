// src/common/json_store.rs

use std::{fs, io::Write, path::Path};

use serde::{de::DeserializeOwned, Serialize};

use crate::common::error::AppError;

/// Lê um documento JSON inteiro. `Ok(None)` quando o arquivo ainda não existe.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, AppError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&raw)?))
}

/// Regrava o documento inteiro: escreve num temporário do mesmo diretório e renomeia por cima.
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let payload = serde_json::to_vec_pretty(value)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(&payload)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| AppError::IoError(e.error))?;

    Ok(())
}
