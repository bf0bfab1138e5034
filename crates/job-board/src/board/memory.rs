use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::domain::{
    Account, AccountId, Application, ApplicationId, ApplicationStatus, Listing, ListingId,
    NewAccount, NewApplication, NewListing,
};
use super::store::{RecordStore, StoreError, UNIQUE_EMAIL};

/// Process-local record store for development, demos, and tests. Data is lost on restart.
#[derive(Default, Clone)]
pub struct InMemoryRecordStore {
    tables: Arc<Mutex<Tables>>,
}

#[derive(Default)]
struct Tables {
    accounts: BTreeMap<AccountId, Account>,
    listings: BTreeMap<ListingId, Listing>,
    applications: BTreeMap<ApplicationId, Application>,
    last_account: i64,
    last_listing: i64,
    last_application: i64,
}

impl Tables {
    fn drop_listing(&mut self, id: ListingId) {
        self.listings.remove(&id);
        self.applications
            .retain(|_, application| application.listing_id != id);
    }
}

impl InMemoryRecordStore {
    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("record store mutex poisoned".to_string()))
    }
}

fn next_id(last: &mut i64) -> i64 {
    *last += 1;
    *last
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn insert_account(&self, account: NewAccount) -> Result<Account, StoreError> {
        let mut tables = self.lock()?;
        if tables
            .accounts
            .values()
            .any(|existing| existing.email == account.email)
        {
            return Err(StoreError::ConstraintViolation(UNIQUE_EMAIL));
        }

        let id = AccountId(next_id(&mut tables.last_account));
        let record = Account {
            id,
            name: account.name,
            email: account.email,
            password: account.password,
            city: account.city,
            created_at: Utc::now(),
        };
        tables.accounts.insert(id, record.clone());
        Ok(record)
    }

    async fn insert_listing(&self, listing: NewListing) -> Result<Listing, StoreError> {
        let mut tables = self.lock()?;
        if !tables.accounts.contains_key(&listing.owner_id) {
            return Err(StoreError::account_not_found(listing.owner_id));
        }

        let id = ListingId(next_id(&mut tables.last_listing));
        let record = Listing {
            id,
            title: listing.title,
            description: listing.description,
            company: listing.company,
            location: listing.location,
            salary: listing.salary,
            owner_id: listing.owner_id,
        };
        tables.listings.insert(id, record.clone());
        Ok(record)
    }

    async fn insert_application(
        &self,
        application: NewApplication,
    ) -> Result<Application, StoreError> {
        let mut tables = self.lock()?;
        if !tables.accounts.contains_key(&application.account_id) {
            return Err(StoreError::account_not_found(application.account_id));
        }
        if !tables.listings.contains_key(&application.listing_id) {
            return Err(StoreError::listing_not_found(application.listing_id));
        }

        let id = ApplicationId(next_id(&mut tables.last_application));
        let record = Application {
            id,
            account_id: application.account_id,
            listing_id: application.listing_id,
            status: ApplicationStatus::Applied,
            applied_at: Utc::now(),
        };
        tables.applications.insert(id, record.clone());
        Ok(record)
    }

    async fn account(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        Ok(self.lock()?.accounts.get(&id).cloned())
    }

    async fn listing(&self, id: ListingId) -> Result<Option<Listing>, StoreError> {
        Ok(self.lock()?.listings.get(&id).cloned())
    }

    async fn listings(&self) -> Result<Vec<Listing>, StoreError> {
        Ok(self.lock()?.listings.values().cloned().collect())
    }

    async fn listings_by_owner(&self, owner: AccountId) -> Result<Vec<Listing>, StoreError> {
        Ok(self
            .lock()?
            .listings
            .values()
            .filter(|listing| listing.owner_id == owner)
            .cloned()
            .collect())
    }

    async fn applications_by_account(
        &self,
        account: AccountId,
    ) -> Result<Vec<Application>, StoreError> {
        Ok(self
            .lock()?
            .applications
            .values()
            .filter(|application| application.account_id == account)
            .cloned()
            .collect())
    }

    async fn delete_account(&self, id: AccountId) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        if tables.accounts.remove(&id).is_none() {
            return Err(StoreError::account_not_found(id));
        }

        let owned: Vec<ListingId> = tables
            .listings
            .values()
            .filter(|listing| listing.owner_id == id)
            .map(|listing| listing.id)
            .collect();
        for listing in owned {
            tables.drop_listing(listing);
        }
        tables
            .applications
            .retain(|_, application| application.account_id != id);
        Ok(())
    }

    async fn delete_listing(&self, id: ListingId) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        if !tables.listings.contains_key(&id) {
            return Err(StoreError::listing_not_found(id));
        }
        tables.drop_listing(id);
        Ok(())
    }
}
