pub mod call_service;
pub mod disposition_service;
pub mod document_service;
pub mod email_service;
pub mod lead_service;
pub mod script_service;
pub mod settings_service;
