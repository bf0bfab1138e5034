//! Accounts, job listings, and applications.
//!
//! [`RecordStore`] is the storage seam; [`InMemoryRecordStore`] and [`SqliteRecordStore`] both
//! enforce email uniqueness and cascade deletes so callers never have to.
//! [`JobBoardService`] layers search, profile assembly, and field-presence checks on top.

pub mod domain;
pub(crate) mod intake;
pub mod memory;
pub mod password;
pub mod router;
pub mod service;
pub mod sqlite;
pub mod store;

#[cfg(test)]
mod tests;

pub use domain::{
    Account, AccountId, AccountProfile, AccountRegistration, Application, ApplicationId,
    ApplicationStatus, ApplicationSummary, Entity, Listing, ListingId, ListingSubmission,
    NewAccount, NewApplication, NewListing,
};
pub use intake::IntakeError;
pub use memory::InMemoryRecordStore;
pub use password::{PasswordDigest, PasswordError};
pub use router::board_router;
pub use service::{JobBoardService, ServiceError};
pub use sqlite::SqliteRecordStore;
pub use store::{RecordStore, StoreError, UNIQUE_EMAIL};
