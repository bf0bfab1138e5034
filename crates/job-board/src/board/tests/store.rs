use super::common::*;
use crate::board::domain::{AccountId, ApplicationStatus, Entity, ListingId, NewApplication};
use crate::board::memory::InMemoryRecordStore;
use crate::board::sqlite::SqliteRecordStore;
use crate::board::store::{RecordStore, StoreError, UNIQUE_EMAIL};

async fn sqlite() -> SqliteRecordStore {
    SqliteRecordStore::in_memory()
        .await
        .expect("in-memory sqlite opens")
}

async fn assert_ids_follow_creation_order<S: RecordStore>(store: &S) {
    let owner = store
        .insert_account(new_account("owner@example.com"))
        .await
        .expect("owner inserted");
    let first = store
        .insert_listing(new_listing("First", owner.id))
        .await
        .expect("first listing");
    let second = store
        .insert_listing(new_listing("Second", owner.id))
        .await
        .expect("second listing");

    assert!(first.id < second.id);
    let titles: Vec<String> = store
        .listings()
        .await
        .expect("listings")
        .into_iter()
        .map(|listing| listing.title)
        .collect();
    assert_eq!(titles, vec!["First".to_string(), "Second".to_string()]);
}

async fn assert_email_is_unique<S: RecordStore>(store: &S) {
    let original = store
        .insert_account(new_account("dup@example.com"))
        .await
        .expect("first insert");

    match store.insert_account(new_account("dup@example.com")).await {
        Err(StoreError::ConstraintViolation(constraint)) => assert_eq!(constraint, UNIQUE_EMAIL),
        other => panic!("expected constraint violation, got {other:?}"),
    }

    let stored = store
        .account(original.id)
        .await
        .expect("lookup")
        .expect("original present");
    assert_eq!(stored.id, original.id);
    assert_eq!(stored.name, original.name);
    assert!(stored.password.verify("cobol"));
}

async fn assert_inserts_require_parents<S: RecordStore>(store: &S) {
    match store.insert_listing(new_listing("Orphan", AccountId(41))).await {
        Err(StoreError::NotFound {
            entity: Entity::Account,
            id: 41,
        }) => {}
        other => panic!("expected missing owner, got {other:?}"),
    }

    let account = store
        .insert_account(new_account("parent@example.com"))
        .await
        .expect("account");
    match store
        .insert_application(NewApplication {
            account_id: account.id,
            listing_id: ListingId(42),
        })
        .await
    {
        Err(StoreError::NotFound {
            entity: Entity::Listing,
            id: 42,
        }) => {}
        other => panic!("expected missing listing, got {other:?}"),
    }
    match store
        .insert_application(NewApplication {
            account_id: AccountId(99),
            listing_id: ListingId(42),
        })
        .await
    {
        Err(StoreError::NotFound {
            entity: Entity::Account,
            id: 99,
        }) => {}
        other => panic!("expected missing account reported first, got {other:?}"),
    }
    assert!(store.listings().await.expect("listings").is_empty());
    assert!(store
        .applications_by_account(account.id)
        .await
        .expect("applications")
        .is_empty());
}

async fn assert_account_delete_cascades<S: RecordStore>(store: &S) {
    let owner = store
        .insert_account(new_account("owner@example.com"))
        .await
        .expect("owner");
    let applicant = store
        .insert_account(new_account("applicant@example.com"))
        .await
        .expect("applicant");
    let listing = store
        .insert_listing(new_listing("Welder", owner.id))
        .await
        .expect("listing");
    let application = store
        .insert_application(NewApplication {
            account_id: applicant.id,
            listing_id: listing.id,
        })
        .await
        .expect("application");
    assert_eq!(application.status, ApplicationStatus::Applied);

    store.delete_account(applicant.id).await.expect("delete applicant");
    assert!(store
        .applications_by_account(applicant.id)
        .await
        .expect("applications")
        .is_empty());
    assert!(store.listing(listing.id).await.expect("lookup").is_some());

    store
        .insert_application(NewApplication {
            account_id: owner.id,
            listing_id: listing.id,
        })
        .await
        .expect("owner applies");
    store.delete_account(owner.id).await.expect("delete owner");
    assert!(store.listing(listing.id).await.expect("lookup").is_none());
    assert!(store
        .applications_by_account(owner.id)
        .await
        .expect("applications")
        .is_empty());

    assert!(matches!(
        store.delete_account(owner.id).await,
        Err(StoreError::NotFound {
            entity: Entity::Account,
            ..
        })
    ));
}

async fn assert_listing_delete_cascades<S: RecordStore>(store: &S) {
    let owner = store
        .insert_account(new_account("owner@example.com"))
        .await
        .expect("owner");
    let doomed = store
        .insert_listing(new_listing("Doomed", owner.id))
        .await
        .expect("doomed listing");
    let kept = store
        .insert_listing(new_listing("Kept", owner.id))
        .await
        .expect("kept listing");
    for listing_id in [doomed.id, kept.id] {
        store
            .insert_application(NewApplication {
                account_id: owner.id,
                listing_id,
            })
            .await
            .expect("application");
    }

    store.delete_listing(doomed.id).await.expect("delete listing");

    let remaining = store
        .applications_by_account(owner.id)
        .await
        .expect("applications");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].listing_id, kept.id);
    assert!(store.account(owner.id).await.expect("lookup").is_some());
    assert_eq!(
        store.listings_by_owner(owner.id).await.expect("owned"),
        vec![kept]
    );
}

#[tokio::test]
async fn memory_ids_follow_creation_order() {
    assert_ids_follow_creation_order(&InMemoryRecordStore::default()).await;
}

#[tokio::test]
async fn sqlite_ids_follow_creation_order() {
    assert_ids_follow_creation_order(&sqlite().await).await;
}

#[tokio::test]
async fn memory_email_is_unique() {
    assert_email_is_unique(&InMemoryRecordStore::default()).await;
}

#[tokio::test]
async fn sqlite_email_is_unique() {
    assert_email_is_unique(&sqlite().await).await;
}

#[tokio::test]
async fn memory_inserts_require_parents() {
    assert_inserts_require_parents(&InMemoryRecordStore::default()).await;
}

#[tokio::test]
async fn sqlite_inserts_require_parents() {
    assert_inserts_require_parents(&sqlite().await).await;
}

#[tokio::test]
async fn memory_account_delete_cascades() {
    assert_account_delete_cascades(&InMemoryRecordStore::default()).await;
}

#[tokio::test]
async fn sqlite_account_delete_cascades() {
    assert_account_delete_cascades(&sqlite().await).await;
}

#[tokio::test]
async fn memory_listing_delete_cascades() {
    assert_listing_delete_cascades(&InMemoryRecordStore::default()).await;
}

#[tokio::test]
async fn sqlite_listing_delete_cascades() {
    assert_listing_delete_cascades(&sqlite().await).await;
}

#[tokio::test]
async fn sqlite_round_trips_salary_scale_and_timestamps() {
    let store = sqlite().await;
    let owner = store
        .insert_account(new_account("owner@example.com"))
        .await
        .expect("owner");
    let listing = store
        .insert_listing(new_listing("Analyst", owner.id))
        .await
        .expect("listing");

    let reloaded = store
        .listing(listing.id)
        .await
        .expect("lookup")
        .expect("present");
    assert_eq!(reloaded.salary.to_string(), "50000.00");

    let account = store
        .account(owner.id)
        .await
        .expect("lookup")
        .expect("present");
    assert_eq!(account.created_at.timestamp(), owner.created_at.timestamp());
}
