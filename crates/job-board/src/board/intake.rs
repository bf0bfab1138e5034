use std::str::FromStr;

use rust_decimal::Decimal;

use super::domain::{AccountId, AccountRegistration, ListingSubmission, NewAccount, NewListing};
use super::password::PasswordDigest;
use super::service::ServiceError;

/// Salary columns hold at most 10 digits, 2 of them after the decimal point.
const SALARY_SCALE: u32 = 2;
const SALARY_INTEGER_DIGITS: u32 = 8;

/// Submitted form data failed the field presence checks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    #[error("invalid salary '{0}': expected a non-negative amount with at most 8 digits before and 2 after the decimal point")]
    InvalidSalary(String),
}

fn required(field: &'static str, value: &str) -> Result<String, IntakeError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(IntakeError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

/// Field checks run first, so a hashing failure is only reported for otherwise valid input.
pub(crate) fn account_from_registration(
    registration: AccountRegistration,
) -> Result<NewAccount, ServiceError> {
    let AccountRegistration {
        name,
        email,
        password,
        city,
    } = registration;

    let name = required("name", &name)?;
    let email = required("email", &email)?;
    if password.is_empty() {
        return Err(IntakeError::MissingField("password").into());
    }
    let city = required("city", &city)?;

    Ok(NewAccount {
        name,
        email,
        password: PasswordDigest::hash(&password)?,
        city,
    })
}

pub(crate) fn listing_from_submission(
    submission: ListingSubmission,
) -> Result<NewListing, IntakeError> {
    let ListingSubmission {
        title,
        description,
        company,
        location,
        salary,
        user_id,
    } = submission;

    let title = required("title", &title)?;
    let description = required("description", &description)?;
    let company = required("company", &company)?;
    let location = required("location", &location)?;
    let salary = parse_salary(&required("salary", &salary)?)?;
    let owner_id = user_id
        .map(AccountId)
        .ok_or(IntakeError::MissingField("user_id"))?;

    Ok(NewListing {
        title,
        description,
        company,
        location,
        salary,
        owner_id,
    })
}

pub(crate) fn parse_salary(raw: &str) -> Result<Decimal, IntakeError> {
    let invalid = || IntakeError::InvalidSalary(raw.to_string());

    let mut salary = Decimal::from_str(raw).map_err(|_| invalid())?.normalize();
    if salary.is_sign_negative() && !salary.is_zero() {
        return Err(invalid());
    }
    if salary.scale() > SALARY_SCALE {
        return Err(invalid());
    }
    if salary.trunc() >= Decimal::from(10_i64.pow(SALARY_INTEGER_DIGITS)) {
        return Err(invalid());
    }

    salary.set_sign_positive(true);
    salary.rescale(SALARY_SCALE);
    Ok(salary)
}
