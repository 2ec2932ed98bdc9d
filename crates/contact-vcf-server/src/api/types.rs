//! API request and response types.

use contact_store::Contact;
use serde::{Deserialize, Serialize};

/// Contact submission.
///
/// Missing fields deserialize as empty and are rejected by the store.
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub phone: String,
}

/// Status change requested through `/api/update-status`.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub id: String,

    /// "approved" or "rejected"
    pub status: String,
}

/// Optional filter for the contact listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

/// Phone lookup given as a query parameter.
#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    pub phone: Option<String>,
}

/// A single contact.
#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub ok: bool,
    pub contact: Contact,
}

impl ContactResponse {
    pub fn new(contact: Contact) -> Self {
        Self { ok: true, contact }
    }
}

/// Contact listing, newest first.
#[derive(Debug, Serialize)]
pub struct ContactsResponse {
    pub ok: bool,
    pub contacts: Vec<Contact>,
    pub total: usize,
}

/// Result of a phone status lookup.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub ok: bool,
    pub found: bool,
    pub contact: Contact,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub storage: String,
    pub contacts: usize,
}
