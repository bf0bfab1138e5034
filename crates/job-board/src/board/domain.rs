use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::password::PasswordDigest;

/// Identifier wrapper for registered accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(pub i64);

/// Identifier wrapper for posted job listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ListingId(pub i64);

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub i64);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Record kinds held by the store, used to label lookup failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Account,
    Listing,
}

impl Entity {
    pub fn label(self) -> &'static str {
        match self {
            Entity::Account => "account",
            Entity::Listing => "listing",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A registered user. The password digest never leaves the process in serialized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: PasswordDigest,
    pub city: String,
    pub created_at: DateTime<Utc>,
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A job posted by an account. Identifiers increase with creation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub title: String,
    pub description: String,
    pub company: String,
    pub location: String,
    pub salary: Decimal,
    pub owner_id: AccountId,
}

impl Listing {
    /// `needle` must already be lowercased.
    pub fn matches(&self, needle: &str) -> bool {
        [&self.title, &self.company, &self.location]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

/// Review state of an application. Only `Applied` is ever written by this crate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    Applied,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "applied" => Ok(Self::Applied),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown application status '{other}'")),
        }
    }
}

/// An account's application to a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub account_id: AccountId,
    pub listing_id: ListingId,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
}

/// Validated account ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: PasswordDigest,
    pub city: String,
}

/// Validated listing ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewListing {
    pub title: String,
    pub description: String,
    pub company: String,
    pub location: String,
    pub salary: Decimal,
    pub owner_id: AccountId,
}

/// Application insert request. It has no status field: new applications are
/// always stored as [`ApplicationStatus::Applied`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewApplication {
    pub account_id: AccountId,
    pub listing_id: ListingId,
}

/// Registration form as submitted by a user. Missing fields deserialize as empty strings so
/// the intake checks can name them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AccountRegistration {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub city: String,
}

/// Job posting form as submitted by a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListingSubmission {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub salary: String,
    #[serde(default)]
    pub user_id: Option<i64>,
}

/// An application joined with the names needed to describe it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationSummary {
    pub application: Application,
    pub applicant_name: String,
    pub listing: Listing,
}

impl fmt::Display for ApplicationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} applied for {}", self.applicant_name, self.listing.title)
    }
}

/// Everything shown on an account's profile page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountProfile {
    pub account: Account,
    pub applications: Vec<ApplicationSummary>,
    pub listings: Vec<Listing>,
}
