//! Contact VCF service - collect contacts, review them, download approved
//! ones as a vCard file.
//!
//! - Anonymous submitters post a name and phone number
//! - Administrators approve or reject each submission
//! - Approved contacts are exported as vCard 3.0

pub mod api;
pub mod config;
pub mod error;

pub use config::Config;
pub use error::ApiError;
