//! Endpoint registration handlers

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use pks_core::{EndpointRecord, PresentedCertificate, RegistrationRequest, Scope};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::{parse_optional_body, AppState};
use crate::api::error::ApiError;
use crate::core::RegistrationOutcome;

/// Base path of endpoint resources
pub const ENDPOINTS_PATH: &str = "/v1/pks/endpoints";

/// Returned instead of a record when the target's certificate needs acceptance
#[derive(Debug, Serialize)]
pub struct CertificateConfirmationResponse {
    pub certificate: PresentedCertificate,
}

/// PUT /v1/pks/endpoints
///
/// Create or update an endpoint. Creation answers `201 Created`, update
/// `200 OK`, both with a `Location` header. A certificate awaiting
/// acceptance is returned with `200 OK` and nothing is stored.
pub async fn register_endpoint(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request: Option<RegistrationRequest> = parse_optional_body(&body)?;

    match state.registrar.register(request).await? {
        RegistrationOutcome::Registered { record, created } => {
            let status = if created {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            let location = format!("{}/{}", ENDPOINTS_PATH, record.id);
            Ok((status, [(header::LOCATION, location)], Json(record)).into_response())
        }
        RegistrationOutcome::CertificateConfirmationRequired(certificate) => {
            Ok((StatusCode::OK, Json(CertificateConfirmationResponse { certificate })).into_response())
        }
    }
}

/// GET /v1/pks/endpoints/{id}
pub async fn get_endpoint(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<EndpointRecord>, ApiError> {
    state
        .store
        .get_endpoint(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Endpoint not found: {}", id)))
}

/// Query parameters for listing endpoints
#[derive(Debug, Default, Deserialize)]
pub struct ListEndpointsQuery {
    /// Only return records in the partition this tag resolves to
    pub scope_tag: Option<String>,
}

/// Response listing endpoint records
#[derive(Debug, Serialize)]
pub struct ListEndpointsResponse {
    pub endpoints: Vec<EndpointRecord>,
    pub count: usize,
}

/// GET /v1/pks/endpoints
pub async fn list_endpoints(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListEndpointsQuery>,
) -> Result<Json<ListEndpointsResponse>, ApiError> {
    let mut endpoints = state.store.list_endpoints().await?;

    if let Some(tag) = query.scope_tag {
        let partition = Scope::resolve(&[tag]).partition_key();
        endpoints.retain(|record| record.scope().partition_key() == partition);
    }

    Ok(Json(ListEndpointsResponse {
        count: endpoints.len(),
        endpoints,
    }))
}

/// DELETE /v1/pks/endpoints/{id}
pub async fn delete_endpoint(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !state.store.delete_endpoint(id).await? {
        return Err(ApiError::NotFound(format!("Endpoint not found: {}", id)));
    }

    info!(id = %id, "Deleted endpoint");
    Ok(StatusCode::NO_CONTENT)
}
