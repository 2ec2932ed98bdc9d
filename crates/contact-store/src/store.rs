//! Contact store: submission, listing, approval and export over a
//! whole-document persistence backend.

use crate::error::StoreError;
use crate::persistence::{ContactPersistence, MemoryStore};
use crate::phone::PhoneNormalizer;
use crate::types::{Contact, ContactStatus, StoreCounts};
use crate::vcf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

/// Contact store backed by a [`ContactPersistence`] implementation.
///
/// Each operation loads the full book. Mutations hold a store-wide lock for
/// their whole load-modify-save cycle, so writers inside one process never
/// interleave. Separate processes sharing a file are not coordinated.
pub struct ContactStore {
    backend: Arc<dyn ContactPersistence>,
    normalizer: PhoneNormalizer,
    /// Marker prepended to every submitted name
    name_prefix: Option<String>,
    write_lock: Mutex<()>,
}

impl ContactStore {
    /// Create a store over `backend`.
    pub fn new(backend: Arc<dyn ContactPersistence>, normalizer: PhoneNormalizer) -> Self {
        info!(backend = backend.kind(), "Contact store initialized");
        Self {
            backend,
            normalizer,
            name_prefix: None,
            write_lock: Mutex::new(()),
        }
    }

    /// Store with in-memory persistence and default phone rules.
    pub fn memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), PhoneNormalizer::default())
    }

    /// Prepend a fixed marker to every submitted name.
    pub fn with_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.name_prefix = if prefix.is_empty() { None } else { Some(prefix) };
        self
    }

    pub fn normalizer(&self) -> &PhoneNormalizer {
        &self.normalizer
    }

    pub fn backend_kind(&self) -> &'static str {
        self.backend.kind()
    }

    /// Submit a new contact.
    ///
    /// The phone is normalized first; a contact whose normalized phone is
    /// already stored is rejected.
    #[instrument(skip(self))]
    pub async fn submit(&self, name: &str, phone: &str) -> Result<Contact, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::InvalidInput("Name is required".into()));
        }
        if phone.trim().is_empty() {
            return Err(StoreError::InvalidInput("Phone is required".into()));
        }

        let phone = self.normalizer.normalize(phone)?;
        let name = match &self.name_prefix {
            Some(prefix) => format!("{}{}", prefix, name),
            None => name.to_string(),
        };

        let _guard = self.write_lock.lock().await;
        let mut book = self.backend.load().await?;

        if book.contains_phone(&phone) {
            warn!(phone = %phone, "Duplicate contact submission");
            return Err(StoreError::DuplicatePhone(phone));
        }

        let contact = Contact::new_pending(name, phone);
        book.push(contact.clone());
        self.backend.save(&book).await?;

        info!(
            id = %contact.id,
            phone = %contact.phone,
            country = self.normalizer.country_of(&contact.phone).unwrap_or("other"),
            "Contact submitted"
        );
        Ok(contact)
    }

    /// All contacts, newest first.
    pub async fn list(&self) -> Result<Vec<Contact>, StoreError> {
        Ok(self.backend.load().await?.newest_first())
    }

    /// Contacts in one status, newest first.
    pub async fn list_by_status(&self, status: ContactStatus) -> Result<Vec<Contact>, StoreError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|c| c.status == status)
            .collect())
    }

    /// Get a contact by id.
    pub async fn get(&self, id: &str) -> Result<Contact, StoreError> {
        self.backend
            .load()
            .await?
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Look up a contact by a free-form phone number.
    pub async fn find_by_phone(&self, phone: &str) -> Result<Contact, StoreError> {
        let phone = self.normalizer.normalize(phone)?;
        self.backend
            .load()
            .await?
            .find_by_phone(&phone)
            .cloned()
            .ok_or(StoreError::NotFound(phone))
    }

    /// Set a contact's status and persist.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        id: &str,
        status: ContactStatus,
    ) -> Result<Contact, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut book = self.backend.load().await?;

        let contact = book
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let previous = contact.status;
        contact.transition(status)?;
        let updated = contact.clone();

        self.backend.save(&book).await?;

        info!(id = %id, from = %previous, to = %status, "Contact status updated");
        Ok(updated)
    }

    pub async fn approve(&self, id: &str) -> Result<Contact, StoreError> {
        self.update_status(id, ContactStatus::Approved).await
    }

    pub async fn reject(&self, id: &str) -> Result<Contact, StoreError> {
        self.update_status(id, ContactStatus::Rejected).await
    }

    /// Approved contacts, newest first.
    pub async fn approved(&self) -> Result<Vec<Contact>, StoreError> {
        self.list_by_status(ContactStatus::Approved).await
    }

    /// vCard text for every approved contact, newest first.
    ///
    /// Empty when nothing is approved.
    pub async fn export_vcf(&self) -> Result<String, StoreError> {
        Ok(vcf::export(&self.list().await?))
    }

    /// Number of contacts per status.
    pub async fn count(&self) -> Result<StoreCounts, StoreError> {
        Ok(self.backend.load().await?.counts())
    }
}
