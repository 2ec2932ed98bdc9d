//! HTTP request handlers.

use super::types::{
    ContactResponse, ContactsResponse, HealthResponse, ListQuery, StatusQuery, StatusResponse,
    SubmitRequest, UpdateStatusRequest,
};
use super::AppState;
use crate::error::ApiError;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use contact_store::{vcf, ContactStatus};
use tracing::info;

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let counts = state.store.count().await?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        storage: state.store.backend_kind().to_string(),
        contacts: counts.total,
    }))
}

/// Submit a contact for review.
pub async fn submit_contact(
    State(state): State<AppState>,
    payload: Result<Json<SubmitRequest>, JsonRejection>,
) -> Result<Json<ContactResponse>, ApiError> {
    let Json(request) = payload?;

    let contact = state.store.submit(&request.name, &request.phone).await?;

    Ok(Json(ContactResponse::new(contact)))
}

/// List contacts newest first, optionally filtered by status.
pub async fn list_contacts(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ContactsResponse>, ApiError> {
    let contacts = match query.status.as_deref() {
        Some(status) => {
            let status: ContactStatus = status.parse()?;
            state.store.list_by_status(status).await?
        }
        None => state.store.list().await?,
    };

    let total = contacts.len();
    Ok(Json(ContactsResponse {
        ok: true,
        contacts,
        total,
    }))
}

/// Get one contact by id.
pub async fn get_contact(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ContactResponse>, ApiError> {
    let contact = state.store.get(&id).await?;
    Ok(Json(ContactResponse::new(contact)))
}

/// Look up a submission by phone, given as `?phone=`.
///
/// Form decoding reads an unencoded `+` as a space, so a value that starts
/// with a space and then a digit is taken to have started with `+`.
pub async fn status_by_query(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<StatusResponse>, ApiError> {
    let phone = query
        .phone
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| ApiError::InvalidInput("Phone is required".into()))?;

    let phone = if phone.starts_with(' ') && phone[1..].starts_with(|c: char| c.is_ascii_digit()) {
        format!("+{}", &phone[1..])
    } else {
        phone
    };

    lookup_status(&state, &phone).await
}

/// Look up a submission by phone, given in the path.
pub async fn status_by_path(
    State(state): State<AppState>,
    Path(phone): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    lookup_status(&state, &phone).await
}

async fn lookup_status(state: &AppState, phone: &str) -> Result<Json<StatusResponse>, ApiError> {
    let contact = state.store.find_by_phone(phone).await?;

    Ok(Json(StatusResponse {
        ok: true,
        found: true,
        contact,
    }))
}

/// Approve a contact.
pub async fn approve_contact(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ContactResponse>, ApiError> {
    let contact = state.store.approve(&id).await?;
    Ok(Json(ContactResponse::new(contact)))
}

/// Reject a contact.
pub async fn reject_contact(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ContactResponse>, ApiError> {
    let contact = state.store.reject(&id).await?;
    Ok(Json(ContactResponse::new(contact)))
}

/// Set a contact's status from a `{id, status}` body.
pub async fn update_status(
    State(state): State<AppState>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<ContactResponse>, ApiError> {
    let Json(request) = payload?;
    let status: ContactStatus = request.status.parse()?;

    let contact = state.store.update_status(&request.id, status).await?;
    Ok(Json(ContactResponse::new(contact)))
}

/// Download approved contacts as a vCard file.
///
/// Responds 404 when nothing is approved instead of sending an empty file.
pub async fn download_vcf(State(state): State<AppState>) -> Result<Response, ApiError> {
    let body = state.store.export_vcf().await?;

    if body.is_empty() {
        return Err(ApiError::NotFound("No approved contacts to export".into()));
    }

    info!(bytes = body.len(), "vCard export generated");

    let disposition = format!("attachment; filename=\"{}\"", state.export_filename);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, vcf::VCARD_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
