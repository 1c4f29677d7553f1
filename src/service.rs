use std::future::Future;
use std::time::Duration;

use crate::domain::{BatchQuery, EmailEntry, EmailUpdate};
use crate::store::{EmailStore, StoreError};

/// Shared error taxonomy both transport adapters map from. `Validation` and
/// `DuplicateEmail` are client-caused; the rest are storage failures scoped
/// to the failing request.
#[derive(thiserror::Error, Debug)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("{0} is already subscribed")]
    DuplicateEmail(String),
    #[error("storage unavailable")]
    StoreUnavailable(#[source] sqlx::Error),
    #[error("storage operation timed out after {0:?}")]
    Timeout(Duration),
}

impl ServiceError {
    /// True when the caller, not the store, is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServiceError::Validation(_) | ServiceError::DuplicateEmail(_)
        )
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail(email) => ServiceError::DuplicateEmail(email),
            StoreError::Query(err) => ServiceError::StoreUnavailable(err),
        }
    }
}

/// Transport-neutral CRUD operations over the email store. Both adapters
/// delegate here so their behavior cannot drift apart. Every store
/// round-trip runs under the configured deadline; expiry is reported as a
/// storage failure and never retried.
#[derive(Clone)]
pub struct EmailService {
    store: EmailStore,
    timeout: Duration,
}

impl EmailService {
    pub fn new(store: EmailStore, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    #[tracing::instrument(name = "Create a new email", skip(self))]
    pub async fn create_email(&self, email: &str) -> Result<Option<EmailEntry>, ServiceError> {
        if email.is_empty() {
            return Err(ServiceError::Validation(String::from(
                "email cannot be empty",
            )));
        }

        self.with_timeout(self.store.insert(email)).await?;

        // Read-after-write: the response carries what is now persisted, not
        // an echo of the input.
        self.with_timeout(self.store.find_by_email(email)).await
    }

    #[tracing::instrument(name = "Get an email", skip(self))]
    pub async fn get_email(&self, email: &str) -> Result<Option<EmailEntry>, ServiceError> {
        self.with_timeout(self.store.find_by_email(email)).await
    }

    /// Validates the pagination parameters before touching the store. The
    /// page comes back verbatim, without total-count or has-more metadata.
    #[tracing::instrument(name = "Get a batch of emails", skip(self))]
    pub async fn get_email_batch(
        &self,
        query: BatchQuery,
    ) -> Result<Vec<EmailEntry>, ServiceError> {
        if query.page <= 0 || query.count <= 0 {
            return Err(ServiceError::Validation(String::from(
                "page and count fields are required and must be > than 0",
            )));
        }

        self.with_timeout(self.store.list_page(query)).await
    }

    #[tracing::instrument(name = "Update an email", skip(self, update), fields(email = %update.email))]
    pub async fn update_email(
        &self,
        update: EmailUpdate,
    ) -> Result<Option<EmailEntry>, ServiceError> {
        self.with_timeout(self.store.replace(&update)).await?;

        // Two separate round-trips, not one transaction. A concurrent writer
        // may slip in between; that window is part of the contract.
        self.with_timeout(self.store.find_by_email(&update.email))
            .await
    }

    /// The follow-up read returns absent on success by construction, which
    /// keeps "deleted, now gone" distinguishable from an I/O failure during
    /// the delete itself.
    #[tracing::instrument(name = "Delete an email", skip(self))]
    pub async fn delete_email(&self, email: &str) -> Result<Option<EmailEntry>, ServiceError> {
        self.with_timeout(self.store.remove(email)).await?;

        self.with_timeout(self.store.find_by_email(email)).await
    }

    async fn with_timeout<T, F>(&self, operation: F) -> Result<T, ServiceError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.timeout, operation).await {
            Ok(result) => result.map_err(ServiceError::from),
            Err(_) => {
                tracing::error!("Storage operation timed out after {:?}", self.timeout);
                Err(ServiceError::Timeout(self.timeout))
            }
        }
    }
}
