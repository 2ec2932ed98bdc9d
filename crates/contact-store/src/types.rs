//! Contact records and the approval state machine.

use crate::error::StoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Current schema version of the persisted contact book.
pub const BOOK_VERSION: u32 = 1;

/// Approval status of a submitted contact.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    /// Submitted, awaiting an administrator decision
    #[default]
    Pending,
    /// Included in the vCard export
    Approved,
    /// Excluded from the vCard export
    Rejected,
}

impl ContactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactStatus::Pending => "pending",
            ContactStatus::Approved => "approved",
            ContactStatus::Rejected => "rejected",
        }
    }

    /// Whether an administrator may move a contact into this status.
    ///
    /// Only approve and reject exist as transitions; nothing goes back to pending.
    pub fn is_decision(&self) -> bool {
        matches!(self, ContactStatus::Approved | ContactStatus::Rejected)
    }
}

impl fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContactStatus {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(ContactStatus::Pending),
            "approved" | "approve" => Ok(ContactStatus::Approved),
            "rejected" | "reject" => Ok(ContactStatus::Rejected),
            other => Err(StoreError::InvalidInput(format!(
                "Unknown status '{}'",
                other
            ))),
        }
    }
}

/// A submitted contact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    /// Opaque identifier assigned at submission
    pub id: String,

    /// Display name
    pub name: String,

    /// Phone number in normalized international form (e.g., "+254712345678")
    pub phone: String,

    /// Approval status
    #[serde(default)]
    pub status: ContactStatus,

    /// When the contact was submitted
    pub created_at: DateTime<Utc>,

    /// When the status last changed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Contact {
    /// Create a new pending contact with a fresh id.
    pub fn new_pending(name: String, phone: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            phone,
            status: ContactStatus::Pending,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Move the contact to `status`.
    ///
    /// Approve and reject are reachable from every state, including each
    /// other. Re-applying the current status succeeds and refreshes
    /// `updated_at`.
    pub fn transition(&mut self, status: ContactStatus) -> Result<(), StoreError> {
        if !status.is_decision() {
            return Err(StoreError::InvalidInput(format!(
                "Cannot move contact {} to '{}'",
                self.id, status
            )));
        }
        self.status = status;
        self.updated_at = Some(Utc::now());
        Ok(())
    }

    pub fn approve(&mut self) {
        self.status = ContactStatus::Approved;
        self.updated_at = Some(Utc::now());
    }

    pub fn reject(&mut self) {
        self.status = ContactStatus::Rejected;
        self.updated_at = Some(Utc::now());
    }

    pub fn is_approved(&self) -> bool {
        self.status == ContactStatus::Approved
    }
}

/// The persisted collection of contacts, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactBook {
    /// Schema version
    pub version: u32,
    /// Contacts in insertion order
    pub contacts: Vec<Contact>,
}

impl Default for ContactBook {
    fn default() -> Self {
        Self {
            version: BOOK_VERSION,
            contacts: Vec::new(),
        }
    }
}

/// On-disk shapes accepted when loading: the versioned document, or a bare
/// array of contacts.
#[derive(Deserialize)]
#[serde(untagged)]
enum BookRepr {
    Versioned {
        #[serde(default = "default_version")]
        version: u32,
        contacts: Vec<Contact>,
    },
    Bare(Vec<Contact>),
}

fn default_version() -> u32 {
    BOOK_VERSION
}

impl<'de> Deserialize<'de> for ContactBook {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(match BookRepr::deserialize(deserializer)? {
            BookRepr::Versioned { version, contacts } => ContactBook { version, contacts },
            BookRepr::Bare(contacts) => ContactBook {
                version: BOOK_VERSION,
                contacts,
            },
        })
    }
}

impl ContactBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// Get a contact by id.
    pub fn get(&self, id: &str) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.id == id)
    }

    /// Get a mutable contact by id.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Contact> {
        self.contacts.iter_mut().find(|c| c.id == id)
    }

    /// Get a contact by normalized phone number.
    pub fn find_by_phone(&self, phone: &str) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.phone == phone)
    }

    pub fn contains_phone(&self, phone: &str) -> bool {
        self.find_by_phone(phone).is_some()
    }

    /// Append a contact.
    pub fn push(&mut self, contact: Contact) {
        self.contacts.push(contact);
    }

    /// All contacts, newest first.
    ///
    /// Contacts with equal `created_at` keep reverse insertion order, so the
    /// later submission still comes first.
    pub fn newest_first(&self) -> Vec<Contact> {
        let mut contacts: Vec<Contact> = self.contacts.iter().rev().cloned().collect();
        contacts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        contacts
    }

    /// Count contacts per status.
    pub fn counts(&self) -> StoreCounts {
        let mut counts = StoreCounts {
            total: self.contacts.len(),
            ..StoreCounts::default()
        };
        for contact in &self.contacts {
            match contact.status {
                ContactStatus::Pending => counts.pending += 1,
                ContactStatus::Approved => counts.approved += 1,
                ContactStatus::Rejected => counts.rejected += 1,
            }
        }
        counts
    }
}

/// Number of contacts in each status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreCounts {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}
