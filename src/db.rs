pub mod crm_repo;
pub use crm_repo::{CrmCredentials, CrmRepository, LeadApi};
pub mod event_repo;
pub use event_repo::EventRepository;
pub mod settings_repo;
pub use settings_repo::SettingsRepository;
pub mod state_repo;
pub use state_repo::StateRepository;
