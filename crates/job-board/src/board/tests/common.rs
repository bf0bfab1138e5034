use std::sync::Arc;

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;

use crate::board::domain::{
    Account, AccountId, AccountRegistration, Application, Listing, ListingId, ListingSubmission,
    NewAccount, NewApplication, NewListing,
};
use crate::board::memory::InMemoryRecordStore;
use crate::board::password::PasswordDigest;
use crate::board::service::JobBoardService;
use crate::board::store::{RecordStore, StoreError};

pub(super) fn registration(name: &str, email: &str) -> AccountRegistration {
    AccountRegistration {
        name: name.to_string(),
        email: email.to_string(),
        password: "s3cret-passphrase".to_string(),
        city: "Des Moines".to_string(),
    }
}

pub(super) fn submission(
    title: &str,
    company: &str,
    location: &str,
    owner: AccountId,
) -> ListingSubmission {
    ListingSubmission {
        title: title.to_string(),
        description: format!("{title} wanted at {company}"),
        company: company.to_string(),
        location: location.to_string(),
        salary: "72000.50".to_string(),
        user_id: Some(owner.0),
    }
}

pub(super) fn new_account(email: &str) -> NewAccount {
    NewAccount {
        name: "Grace Hopper".to_string(),
        email: email.to_string(),
        password: PasswordDigest::hash("cobol").expect("password hashes"),
        city: "Arlington".to_string(),
    }
}

pub(super) fn new_listing(title: &str, owner: AccountId) -> NewListing {
    NewListing {
        title: title.to_string(),
        description: "Keep the lights on".to_string(),
        company: "Acme".to_string(),
        location: "NYC".to_string(),
        salary: "50000.00".parse().expect("valid decimal"),
        owner_id: owner,
    }
}

pub(super) type MemoryService = JobBoardService<InMemoryRecordStore>;

pub(super) fn memory_service() -> (MemoryService, Arc<InMemoryRecordStore>) {
    let store = Arc::new(InMemoryRecordStore::default());
    (JobBoardService::new(store.clone()), store)
}

/// Poster plus the two listings used by the search examples.
pub(super) async fn seed_search_fixture(service: &MemoryService) -> (Account, Listing, Listing) {
    let poster = service
        .create_account(registration("Poster", "poster@example.com"))
        .await
        .expect("poster registers");
    let engineer = service
        .create_listing(submission("Engineer", "Acme", "NYC", poster.id))
        .await
        .expect("engineer listing posts");
    let cook = service
        .create_listing(submission("Cook", "Bistro", "LA", poster.id))
        .await
        .expect("cook listing posts");
    (poster, engineer, cook)
}

pub(super) struct UnavailableStore;

fn offline() -> StoreError {
    StoreError::Unavailable("database offline".to_string())
}

#[async_trait]
impl RecordStore for UnavailableStore {
    async fn insert_account(&self, _account: NewAccount) -> Result<Account, StoreError> {
        Err(offline())
    }

    async fn insert_listing(&self, _listing: NewListing) -> Result<Listing, StoreError> {
        Err(offline())
    }

    async fn insert_application(
        &self,
        _application: NewApplication,
    ) -> Result<Application, StoreError> {
        Err(offline())
    }

    async fn account(&self, _id: AccountId) -> Result<Option<Account>, StoreError> {
        Err(offline())
    }

    async fn listing(&self, _id: ListingId) -> Result<Option<Listing>, StoreError> {
        Err(offline())
    }

    async fn listings(&self) -> Result<Vec<Listing>, StoreError> {
        Err(offline())
    }

    async fn listings_by_owner(&self, _owner: AccountId) -> Result<Vec<Listing>, StoreError> {
        Err(offline())
    }

    async fn applications_by_account(
        &self,
        _account: AccountId,
    ) -> Result<Vec<Application>, StoreError> {
        Err(offline())
    }

    async fn delete_account(&self, _id: AccountId) -> Result<(), StoreError> {
        Err(offline())
    }

    async fn delete_listing(&self, _id: ListingId) -> Result<(), StoreError> {
        Err(offline())
    }
}

/// Answers every lookup from `inner` except single-listing reads, which behave as if the
/// listing was deleted a moment earlier.
pub(super) struct VanishingListingStore {
    pub(super) inner: InMemoryRecordStore,
}

#[async_trait]
impl RecordStore for VanishingListingStore {
    async fn insert_account(&self, account: NewAccount) -> Result<Account, StoreError> {
        self.inner.insert_account(account).await
    }

    async fn insert_listing(&self, listing: NewListing) -> Result<Listing, StoreError> {
        self.inner.insert_listing(listing).await
    }

    async fn insert_application(
        &self,
        application: NewApplication,
    ) -> Result<Application, StoreError> {
        self.inner.insert_application(application).await
    }

    async fn account(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        self.inner.account(id).await
    }

    async fn listing(&self, _id: ListingId) -> Result<Option<Listing>, StoreError> {
        Ok(None)
    }

    async fn listings(&self) -> Result<Vec<Listing>, StoreError> {
        self.inner.listings().await
    }

    async fn listings_by_owner(&self, owner: AccountId) -> Result<Vec<Listing>, StoreError> {
        self.inner.listings_by_owner(owner).await
    }

    async fn applications_by_account(
        &self,
        account: AccountId,
    ) -> Result<Vec<Application>, StoreError> {
        self.inner.applications_by_account(account).await
    }

    async fn delete_account(&self, id: AccountId) -> Result<(), StoreError> {
        self.inner.delete_account(id).await
    }

    async fn delete_listing(&self, id: ListingId) -> Result<(), StoreError> {
        self.inner.delete_listing(id).await
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
