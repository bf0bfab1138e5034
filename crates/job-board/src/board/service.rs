use std::sync::Arc;

use tracing::{debug, info};

use super::domain::{
    Account, AccountId, AccountProfile, AccountRegistration, Application, ApplicationSummary,
    Listing, ListingId, ListingSubmission, NewApplication,
};
use super::intake::{self, IntakeError};
use super::password::PasswordError;
use super::store::{RecordStore, StoreError};

/// Query and mutation facade over a [`RecordStore`].
///
/// The store handle is passed in explicitly; the service keeps no other state, so one instance
/// can be shared across request handlers behind an `Arc`.
pub struct JobBoardService<S: ?Sized> {
    store: Arc<S>,
}

impl<S> JobBoardService<S>
where
    S: RecordStore + ?Sized + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Every listing, in creation order.
    pub async fn list_all(&self) -> Result<Vec<Listing>, ServiceError> {
        Ok(self.store.listings().await?)
    }

    /// Case-insensitive substring search across title, company, and location.
    ///
    /// A missing or blank term returns the same result as [`Self::list_all`].
    pub async fn search(&self, term: Option<&str>) -> Result<Vec<Listing>, ServiceError> {
        let listings = self.store.listings().await?;
        let needle = match term.map(str::trim) {
            Some(term) if !term.is_empty() => term.to_lowercase(),
            _ => return Ok(listings),
        };

        let matches: Vec<Listing> = listings
            .into_iter()
            .filter(|listing| listing.matches(&needle))
            .collect();
        debug!(term = %needle, matches = matches.len(), "listing search");
        Ok(matches)
    }

    pub async fn get_listing(&self, id: ListingId) -> Result<Listing, ServiceError> {
        let listing = self
            .store
            .listing(id)
            .await?
            .ok_or(StoreError::listing_not_found(id))?;
        Ok(listing)
    }

    pub async fn get_account(&self, id: AccountId) -> Result<Account, ServiceError> {
        let account = self
            .store
            .account(id)
            .await?
            .ok_or(StoreError::account_not_found(id))?;
        Ok(account)
    }

    pub async fn applications_for(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Application>, ServiceError> {
        self.get_account(account_id).await?;
        Ok(self.store.applications_by_account(account_id).await?)
    }

    pub async fn listings_posted_by(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Listing>, ServiceError> {
        self.get_account(account_id).await?;
        Ok(self.store.listings_by_owner(account_id).await?)
    }

    /// The account together with what it applied to and what it posted.
    ///
    /// Applications whose listing is deleted while the profile is being assembled are left out.
    pub async fn profile(&self, account_id: AccountId) -> Result<AccountProfile, ServiceError> {
        let account = self.get_account(account_id).await?;

        let mut applications = Vec::new();
        for application in self.store.applications_by_account(account_id).await? {
            let Some(listing) = self.store.listing(application.listing_id).await? else {
                debug!(
                    application_id = %application.id,
                    listing_id = %application.listing_id,
                    "listing removed while building profile"
                );
                continue;
            };
            applications.push(ApplicationSummary {
                application,
                applicant_name: account.name.clone(),
                listing,
            });
        }

        let listings = self.store.listings_by_owner(account_id).await?;

        Ok(AccountProfile {
            account,
            applications,
            listings,
        })
    }

    pub async fn create_account(
        &self,
        registration: AccountRegistration,
    ) -> Result<Account, ServiceError> {
        let account = intake::account_from_registration(registration)?;
        let stored = self.store.insert_account(account).await?;
        info!(account_id = %stored.id, "account registered");
        Ok(stored)
    }

    pub async fn create_listing(
        &self,
        submission: ListingSubmission,
    ) -> Result<Listing, ServiceError> {
        let listing = intake::listing_from_submission(submission)?;
        let stored = self.store.insert_listing(listing).await?;
        info!(listing_id = %stored.id, owner_id = %stored.owner_id, "listing posted");
        Ok(stored)
    }

    /// Record that `account_id` applied to `listing_id`. The stored status is always `applied`
    /// and repeat applications are accepted.
    pub async fn create_application(
        &self,
        account_id: AccountId,
        listing_id: ListingId,
    ) -> Result<Application, ServiceError> {
        let stored = self
            .store
            .insert_application(NewApplication {
                account_id,
                listing_id,
            })
            .await?;
        info!(
            application_id = %stored.id,
            %account_id,
            %listing_id,
            "application submitted"
        );
        Ok(stored)
    }

    pub async fn delete_account(&self, id: AccountId) -> Result<(), ServiceError> {
        self.store.delete_account(id).await?;
        info!(account_id = %id, "account deleted");
        Ok(())
    }

    pub async fn delete_listing(&self, id: ListingId) -> Result<(), ServiceError> {
        self.store.delete_listing(id).await?;
        info!(listing_id = %id, "listing deleted");
        Ok(())
    }
}

/// Error raised by the job board service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Password(#[from] PasswordError),
}
