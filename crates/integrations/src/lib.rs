//! Outbound integrations: transactional email and the scheduling page.

pub mod config;
pub mod mailer;
pub mod scheduling;
pub mod templates;

pub use config::*;
pub use mailer::*;
pub use scheduling::*;
