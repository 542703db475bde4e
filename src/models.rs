pub mod api;
pub mod call;
pub mod disposition;
pub mod event;
pub mod lead;
pub mod script;
pub mod settings;
