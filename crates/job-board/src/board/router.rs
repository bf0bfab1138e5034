use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use super::domain::{AccountId, AccountRegistration, ListingId, ListingSubmission};
use super::intake::IntakeError;
use super::service::{JobBoardService, ServiceError};
use super::store::{RecordStore, StoreError};

/// Router builder exposing listing search, posting, applications, and account profiles.
pub fn board_router<S>(service: Arc<JobBoardService<S>>) -> Router
where
    S: RecordStore + ?Sized + 'static,
{
    Router::new()
        .route(
            "/api/v1/jobs",
            get(search_handler::<S>).post(create_listing_handler::<S>),
        )
        .route("/api/v1/jobs/:listing_id", get(listing_handler::<S>))
        .route("/api/v1/jobs/:listing_id/apply", post(apply_handler::<S>))
        .route("/api/v1/accounts", post(register_handler::<S>))
        .route("/api/v1/accounts/:account_id", get(profile_handler::<S>))
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchQuery {
    pub(crate) q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApplyForm {
    #[serde(default)]
    pub(crate) user_id: Option<i64>,
}

pub(crate) async fn search_handler<S>(
    State(service): State<Arc<JobBoardService<S>>>,
    Query(SearchQuery { q }): Query<SearchQuery>,
) -> Response
where
    S: RecordStore + ?Sized + 'static,
{
    match service.search(q.as_deref()).await {
        Ok(listings) => (StatusCode::OK, Json(listings)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn listing_handler<S>(
    State(service): State<Arc<JobBoardService<S>>>,
    Path(listing_id): Path<i64>,
) -> Response
where
    S: RecordStore + ?Sized + 'static,
{
    match service.get_listing(ListingId(listing_id)).await {
        Ok(listing) => (StatusCode::OK, Json(listing)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_listing_handler<S>(
    State(service): State<Arc<JobBoardService<S>>>,
    Form(submission): Form<ListingSubmission>,
) -> Response
where
    S: RecordStore + ?Sized + 'static,
{
    match service.create_listing(submission).await {
        Ok(listing) => (StatusCode::CREATED, Json(listing)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn apply_handler<S>(
    State(service): State<Arc<JobBoardService<S>>>,
    Path(listing_id): Path<i64>,
    Form(ApplyForm { user_id }): Form<ApplyForm>,
) -> Response
where
    S: RecordStore + ?Sized + 'static,
{
    let Some(user_id) = user_id else {
        return error_response(IntakeError::MissingField("user_id").into());
    };

    match service
        .create_application(AccountId(user_id), ListingId(listing_id))
        .await
    {
        Ok(application) => (StatusCode::CREATED, Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn register_handler<S>(
    State(service): State<Arc<JobBoardService<S>>>,
    Form(registration): Form<AccountRegistration>,
) -> Response
where
    S: RecordStore + ?Sized + 'static,
{
    match service.create_account(registration).await {
        Ok(account) => (StatusCode::CREATED, Json(account)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn profile_handler<S>(
    State(service): State<Arc<JobBoardService<S>>>,
    Path(account_id): Path<i64>,
) -> Response
where
    S: RecordStore + ?Sized + 'static,
{
    match service.profile(AccountId(account_id)).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(error) => error_response(error),
    }
}

/// Body text for 500 responses. Store and hashing details stay in the logs.
pub(crate) const INTERNAL_ERROR: &str = "internal server error";

fn error_response(error: ServiceError) -> Response {
    let (status, message) = match &error {
        ServiceError::Intake(_) => (StatusCode::UNPROCESSABLE_ENTITY, error.to_string()),
        ServiceError::Store(StoreError::NotFound { .. }) => {
            (StatusCode::NOT_FOUND, error.to_string())
        }
        ServiceError::Store(StoreError::ConstraintViolation(_)) => {
            (StatusCode::CONFLICT, error.to_string())
        }
        ServiceError::Store(StoreError::Unavailable(detail)) => {
            warn!(%detail, "record store unavailable");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                INTERNAL_ERROR.to_string(),
            )
        }
        ServiceError::Password(err) => {
            warn!(error = %err, "password hashing failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                INTERNAL_ERROR.to_string(),
            )
        }
    };

    let payload = json!({
        "error": message,
    });
    (status, Json(payload)).into_response()
}
