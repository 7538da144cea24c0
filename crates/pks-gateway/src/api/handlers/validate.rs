//! Connectivity validation handler

use axum::{body::Bytes, extract::State, Json};
use pks_core::{PresentedCertificate, RegistrationRequest};
use serde::Serialize;
use std::sync::Arc;

use super::{parse_optional_body, AppState};
use crate::api::error::ApiError;

/// Outcome of a successful connectivity validation
#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub reachable: bool,
    /// Certificate presented by the target, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<PresentedCertificate>,
}

/// PUT /v1/pks/endpoints/validate
///
/// Checks that the endpoint's addresses are reachable through the
/// connectivity adapter. Nothing is persisted.
pub async fn validate_endpoint(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ValidateResponse>, ApiError> {
    let request: Option<RegistrationRequest> = parse_optional_body(&body)?;
    let report = state.registrar.validate_connection(request).await?;

    Ok(Json(ValidateResponse {
        reachable: true,
        certificate: report.certificate,
    }))
}
