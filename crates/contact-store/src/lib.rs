//! Contact submissions with administrator approval and vCard export.
//!
//! - Normalizes free-form phone numbers into international form
//! - Keeps an ordered, file-backed book of contacts with unique phones
//! - Exports approved contacts as vCard 3.0 text

mod error;
pub mod persistence;
pub mod phone;
mod store;
mod types;
pub mod vcf;

pub use error::StoreError;
pub use persistence::{ContactPersistence, JsonFileStore, MemoryStore};
pub use phone::{CountryPrefix, PhoneNormalizer};
pub use store::ContactStore;
pub use types::*;
