use async_trait::async_trait;

use super::domain::{
    Account, AccountId, Application, Entity, Listing, ListingId, NewAccount, NewApplication,
    NewListing,
};

/// Name of the uniqueness rule on account emails, reported in constraint violations.
pub const UNIQUE_EMAIL: &str = "account email must be unique";

/// Storage abstraction shared by the in-memory and SQLite backends.
///
/// Implementations own referential integrity: inserts that reference a missing parent fail
/// with [`StoreError::NotFound`], deleting an account removes its listings and applications,
/// and deleting a listing removes the applications that reference it.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert_account(&self, account: NewAccount) -> Result<Account, StoreError>;
    async fn insert_listing(&self, listing: NewListing) -> Result<Listing, StoreError>;
    /// Always stores the application with status `applied`.
    async fn insert_application(
        &self,
        application: NewApplication,
    ) -> Result<Application, StoreError>;

    async fn account(&self, id: AccountId) -> Result<Option<Account>, StoreError>;
    async fn listing(&self, id: ListingId) -> Result<Option<Listing>, StoreError>;
    /// All listings in creation order.
    async fn listings(&self) -> Result<Vec<Listing>, StoreError>;
    async fn listings_by_owner(&self, owner: AccountId) -> Result<Vec<Listing>, StoreError>;
    async fn applications_by_account(
        &self,
        account: AccountId,
    ) -> Result<Vec<Application>, StoreError>;

    async fn delete_account(&self, id: AccountId) -> Result<(), StoreError>;
    async fn delete_listing(&self, id: ListingId) -> Result<(), StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: Entity, id: i64 },
    #[error("constraint violated: {0}")]
    ConstraintViolation(&'static str),
    #[error("record store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn account_not_found(id: AccountId) -> Self {
        Self::NotFound {
            entity: Entity::Account,
            id: id.0,
        }
    }

    pub fn listing_not_found(id: ListingId) -> Self {
        Self::NotFound {
            entity: Entity::Listing,
            id: id.0,
        }
    }
}
