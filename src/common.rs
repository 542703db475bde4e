pub mod error;
pub mod formatting;
pub mod json_store;
pub mod validation;
