//! Application use cases. Orchestrate domain logic via ports.

pub mod auth_service;
pub mod command_router;
pub mod language;
pub mod message_store;
pub mod report_composer;
pub mod report_service;
pub mod scheduler;

pub use auth_service::AuthService;
pub use command_router::CommandRouter;
pub use language::LanguageClassifier;
pub use message_store::MessageStore;
pub use report_composer::ReportComposer;
pub use report_service::ReportService;
pub use scheduler::{FanOutSummary, ReportScheduler};
