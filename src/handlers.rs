pub mod calls;
pub mod crm;
pub mod dispositions;
pub mod events;
pub mod leads;
pub mod script;
pub mod settings;
pub mod system;
