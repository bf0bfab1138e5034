//! SQLite-backed record store.
//!
//! Referential integrity lives in the schema: foreign keys are switched on for every pooled
//! connection and both child tables declare `ON DELETE CASCADE`, so removing an account
//! removes its listings and every application that hangs off either of them.
//!
//! Inserts are single autocommit statements so concurrent writers queue on SQLite's busy
//! timeout instead of failing a deferred transaction's lock upgrade.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use tracing::debug;

use super::domain::{
    Account, AccountId, Application, ApplicationId, ApplicationStatus, Listing, ListingId,
    NewAccount, NewApplication, NewListing,
};
use super::password::PasswordDigest;
use super::store::{RecordStore, StoreError, UNIQUE_EMAIL};

/// How long a writer waits for another connection's write lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS accounts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL,
    city TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS listings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    company TEXT NOT NULL,
    location TEXT NOT NULL,
    salary TEXT NOT NULL,
    owner_id INTEGER NOT NULL REFERENCES accounts(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_listings_owner_id ON listings(owner_id);

CREATE TABLE IF NOT EXISTS applications (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    account_id INTEGER NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
    listing_id INTEGER NOT NULL REFERENCES listings(id) ON DELETE CASCADE,
    status TEXT NOT NULL DEFAULT 'applied'
        CHECK (status IN ('applied', 'accepted', 'rejected')),
    applied_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_applications_account_id ON applications(account_id);
CREATE INDEX IF NOT EXISTS idx_applications_listing_id ON applications(listing_id);
"#;

/// Durable record store on a SQLite connection pool.
#[derive(Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    /// Open (creating if needed) the database at `database_url` and apply the schema.
    ///
    /// `sqlite::memory:` databases live inside a single connection, so the pool is pinned to
    /// one connection that is never recycled.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT);

        let in_memory = database_url.contains(":memory:");
        let pool = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { 5 })
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.run_migrations().await?;
        debug!(database_url, "sqlite record store ready");
        Ok(store)
    }

    /// Ephemeral database, mainly for tests.
    pub async fn in_memory() -> Result<Self, StoreError> {
        Self::connect("sqlite::memory:").await
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// SQLite does not say which foreign key failed; the account is reported before the listing.
    async fn missing_parent(&self, application: NewApplication) -> StoreError {
        match self.account(application.account_id).await {
            Ok(None) => StoreError::account_not_found(application.account_id),
            Ok(Some(_)) => StoreError::listing_not_found(application.listing_id),
            Err(err) => err,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(value: sqlx::Error) -> Self {
        Self::Unavailable(value.to_string())
    }
}

fn corrupt(column: &str, detail: impl std::fmt::Display) -> StoreError {
    StoreError::Unavailable(format!("invalid {column} in stored row: {detail}"))
}

fn parse_timestamp(column: &str, raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|value| value.with_timezone(&Utc))
        .map_err(|err| corrupt(column, err))
}

#[derive(Debug, FromRow)]
struct AccountRow {
    id: i64,
    name: String,
    email: String,
    password: String,
    city: String,
    created_at: String,
}

impl AccountRow {
    fn into_account(self) -> Result<Account, StoreError> {
        Ok(Account {
            id: AccountId(self.id),
            name: self.name,
            email: self.email,
            password: PasswordDigest::from_encoded(self.password)
                .map_err(|err| corrupt("password", err))?,
            city: self.city,
            created_at: parse_timestamp("created_at", &self.created_at)?,
        })
    }
}

#[derive(Debug, FromRow)]
struct ListingRow {
    id: i64,
    title: String,
    description: String,
    company: String,
    location: String,
    salary: String,
    owner_id: i64,
}

impl ListingRow {
    fn into_listing(self) -> Result<Listing, StoreError> {
        Ok(Listing {
            id: ListingId(self.id),
            title: self.title,
            description: self.description,
            company: self.company,
            location: self.location,
            salary: Decimal::from_str(&self.salary).map_err(|err| corrupt("salary", err))?,
            owner_id: AccountId(self.owner_id),
        })
    }
}

#[derive(Debug, FromRow)]
struct ApplicationRow {
    id: i64,
    account_id: i64,
    listing_id: i64,
    status: String,
    applied_at: String,
}

impl ApplicationRow {
    fn into_application(self) -> Result<Application, StoreError> {
        Ok(Application {
            id: ApplicationId(self.id),
            account_id: AccountId(self.account_id),
            listing_id: ListingId(self.listing_id),
            status: ApplicationStatus::from_str(&self.status)
                .map_err(|err| corrupt("status", err))?,
            applied_at: parse_timestamp("applied_at", &self.applied_at)?,
        })
    }
}

const ACCOUNT_COLUMNS: &str = "SELECT id, name, email, password, city, created_at FROM accounts";
const LISTING_COLUMNS: &str =
    "SELECT id, title, description, company, location, salary, owner_id FROM listings";
const APPLICATION_COLUMNS: &str =
    "SELECT id, account_id, listing_id, status, applied_at FROM applications";

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn insert_account(&self, account: NewAccount) -> Result<Account, StoreError> {
        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO accounts (name, email, password, city, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&account.name)
        .bind(&account.email)
        .bind(account.password.as_str())
        .bind(&account.city)
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await;

        let result = match result {
            Ok(result) => result,
            Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
                return Err(StoreError::ConstraintViolation(UNIQUE_EMAIL));
            }
            Err(err) => return Err(err.into()),
        };

        Ok(Account {
            id: AccountId(result.last_insert_rowid()),
            name: account.name,
            email: account.email,
            password: account.password,
            city: account.city,
            created_at,
        })
    }

    async fn insert_listing(&self, listing: NewListing) -> Result<Listing, StoreError> {
        let result = sqlx::query(
            "INSERT INTO listings (title, description, company, location, salary, owner_id) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&listing.title)
        .bind(&listing.description)
        .bind(&listing.company)
        .bind(&listing.location)
        .bind(listing.salary.to_string())
        .bind(listing.owner_id.0)
        .execute(&self.pool)
        .await;

        let result = match result {
            Ok(result) => result,
            Err(sqlx::Error::Database(err)) if err.is_foreign_key_violation() => {
                return Err(StoreError::account_not_found(listing.owner_id));
            }
            Err(err) => return Err(err.into()),
        };

        Ok(Listing {
            id: ListingId(result.last_insert_rowid()),
            title: listing.title,
            description: listing.description,
            company: listing.company,
            location: listing.location,
            salary: listing.salary,
            owner_id: listing.owner_id,
        })
    }

    async fn insert_application(
        &self,
        application: NewApplication,
    ) -> Result<Application, StoreError> {
        let applied_at = Utc::now();
        let status = ApplicationStatus::Applied;
        let result = sqlx::query(
            "INSERT INTO applications (account_id, listing_id, status, applied_at) VALUES (?, ?, ?, ?)",
        )
        .bind(application.account_id.0)
        .bind(application.listing_id.0)
        .bind(status.label())
        .bind(applied_at.to_rfc3339())
        .execute(&self.pool)
        .await;

        let result = match result {
            Ok(result) => result,
            Err(sqlx::Error::Database(err)) if err.is_foreign_key_violation() => {
                return Err(self.missing_parent(application).await);
            }
            Err(err) => return Err(err.into()),
        };

        Ok(Application {
            id: ApplicationId(result.last_insert_rowid()),
            account_id: application.account_id,
            listing_id: application.listing_id,
            status,
            applied_at,
        })
    }

    async fn account(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!("{ACCOUNT_COLUMNS} WHERE id = ?"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.map(AccountRow::into_account).transpose()
    }

    async fn listing(&self, id: ListingId) -> Result<Option<Listing>, StoreError> {
        let row = sqlx::query_as::<_, ListingRow>(&format!("{LISTING_COLUMNS} WHERE id = ?"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.map(ListingRow::into_listing).transpose()
    }

    async fn listings(&self) -> Result<Vec<Listing>, StoreError> {
        let rows = sqlx::query_as::<_, ListingRow>(&format!("{LISTING_COLUMNS} ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(ListingRow::into_listing).collect()
    }

    async fn listings_by_owner(&self, owner: AccountId) -> Result<Vec<Listing>, StoreError> {
        let rows = sqlx::query_as::<_, ListingRow>(&format!(
            "{LISTING_COLUMNS} WHERE owner_id = ? ORDER BY id"
        ))
        .bind(owner.0)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ListingRow::into_listing).collect()
    }

    async fn applications_by_account(
        &self,
        account: AccountId,
    ) -> Result<Vec<Application>, StoreError> {
        let rows = sqlx::query_as::<_, ApplicationRow>(&format!(
            "{APPLICATION_COLUMNS} WHERE account_id = ? ORDER BY id"
        ))
        .bind(account.0)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ApplicationRow::into_application).collect()
    }

    async fn delete_account(&self, id: AccountId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::account_not_found(id));
        }
        Ok(())
    }

    async fn delete_listing(&self, id: ListingId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM listings WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::listing_not_found(id));
        }
        Ok(())
    }
}
