//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: agentns — Secure naming and discovery for AI agents.
//

//! HTTP endpoint handlers.
//!
//! Handlers translate the service error taxonomy into status codes and the
//! uniform `{status:"failure", error}` envelope; every failure at this
//! boundary is also emitted to the audit sink.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use agentns_types::ocsp::{OcspCertId, OcspResponse};
use agentns_types::prelude::*;

use crate::audit::{AuditAction, AuditEvent};
use crate::error::ServiceError;
use crate::registry::ListQuery;

use super::state::AppState;

type Failure = (StatusCode, Json<ApiFailure>);

/// POST /register — validate, issue a certificate, persist the agent.
pub async fn register_handler(
    State(state): State<AppState>,
    Json(request): Json<AgentRegistrationRequest>,
) -> Result<Json<AgentRegistrationResponse>, Failure> {
    info!(ans_name = %request.ans_name, "processing registration");

    let (agent, certificate) = state
        .registry
        .register(&request)
        .await
        .map_err(|e| reject(&state, Some(request.agent_name.clone()), e))?;

    let certificate_pem = certificate
        .to_pem()
        .map_err(|e| reject(&state, Some(agent.agent_id.clone()), ServiceError::Internal(e.to_string())))?;

    Ok(Json(AgentRegistrationResponse::success(agent, certificate_pem)))
}

/// POST /renew — issue a fresh certificate for an already-registered agent.
pub async fn renew_handler(
    State(state): State<AppState>,
    Json(request): Json<AgentRenewalRequest>,
) -> Result<Json<AgentRenewalResponse>, Failure> {
    info!(agent_id = %request.agent_id, "processing renewal");

    let (agent, certificate) = state
        .registry
        .renew(&request)
        .await
        .map_err(|e| reject(&state, Some(request.agent_id.clone()), e))?;

    let certificate_pem = certificate
        .to_pem()
        .map_err(|e| reject(&state, Some(agent.agent_id.clone()), ServiceError::Internal(e.to_string())))?;

    Ok(Json(AgentRenewalResponse::success(agent, certificate_pem)))
}

/// POST /revoke — revoke the agent's certificate and deactivate the record.
pub async fn revoke_handler(
    State(state): State<AppState>,
    Json(request): Json<RevocationRequest>,
) -> Result<Json<RevocationResponse>, Failure> {
    info!(agent_id = %request.agent_id, "processing revocation");

    let agent = state
        .registry
        .revoke(&request.agent_id, request.reason.as_deref())
        .await
        .map_err(|e| reject(&state, Some(request.agent_id.clone()), e))?;

    Ok(Json(RevocationResponse {
        status: "success".to_string(),
        agent_id: agent.agent_id,
    }))
}

/// POST /resolve — version-negotiated resolution to a signed endpoint record.
pub async fn resolve_handler(
    State(state): State<AppState>,
    Json(request): Json<ResolutionRequest>,
) -> Result<Json<EndpointRecord>, Failure> {
    let record = state
        .registry
        .resolve(&request.ans_name, request.version_range.as_deref())
        .await
        .map_err(|e| reject(&state, None, e))?;

    Ok(Json(record))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub protocol: Option<String>,
    pub capability: Option<String>,
    pub provider: Option<String>,
    #[serde(default)]
    pub include_inactive: bool,
    pub max: Option<usize>,
}

/// GET /agents — filtered directory listing.
pub async fn list_agents_handler(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<AgentListResponse>, Failure> {
    // An empty query value (`?protocol=`) means "no filter", same as absence.
    let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());

    let agents = state
        .registry
        .list(&ListQuery {
            protocol: non_empty(params.protocol),
            capability: non_empty(params.capability),
            provider: non_empty(params.provider),
            include_inactive: params.include_inactive,
            max: params.max,
        })
        .await
        .map_err(|e| reject(&state, None, e))?;

    let total = agents.len();
    Ok(Json(AgentListResponse { agents, total }))
}

#[derive(Debug, Deserialize)]
pub struct OcspParams {
    pub serial: String,
}

/// GET /ocsp?serial=... — status query against this CA's issuer name.
pub async fn ocsp_get_handler(
    State(state): State<AppState>,
    Query(params): Query<OcspParams>,
) -> Result<Json<OcspResponse>, Failure> {
    let cert_id = OcspCertId {
        issuer_name_hash: state.responder.issuer_name_hash().to_string(),
        serial: params.serial,
    };
    ocsp_respond(&state, cert_id).await
}

/// POST /ocsp — status query with an explicit cert id.
pub async fn ocsp_post_handler(
    State(state): State<AppState>,
    Json(cert_id): Json<OcspCertId>,
) -> Result<Json<OcspResponse>, Failure> {
    ocsp_respond(&state, cert_id).await
}

async fn ocsp_respond(
    state: &AppState,
    cert_id: OcspCertId,
) -> Result<Json<OcspResponse>, Failure> {
    let response = state.responder.respond(&cert_id).await.map_err(|e| {
        reject(state, None, ServiceError::OcspUnavailable(e.to_string()))
    })?;
    Ok(Json(response))
}

/// GET /ca/certificate — the trust-chain root for offline verification.
pub async fn ca_certificate_handler(
    State(state): State<AppState>,
) -> Result<Json<CaCertificateResponse>, Failure> {
    let certificate = state
        .ca
        .certificate()
        .to_pem()
        .map_err(|e| reject(&state, None, ServiceError::Internal(e.to_string())))?;
    Ok(Json(CaCertificateResponse { certificate }))
}

/// GET /schemas — the published wire-type schema map.
pub async fn schemas_handler() -> Json<Value> {
    Json(
        serde_json::to_value(agentns_types::schema::generate())
            .unwrap_or_else(|_| Value::Object(Default::default())),
    )
}

/// GET /health — liveness probe.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

// ---------------------------------------------------------------------------
// Response types local to the HTTP surface
// ---------------------------------------------------------------------------

#[derive(Debug, serde::Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

#[derive(Debug, serde::Serialize)]
pub struct CaCertificateResponse {
    pub certificate: String,
}

// ---------------------------------------------------------------------------
// Failure translation
// ---------------------------------------------------------------------------

fn reject(state: &AppState, subject: Option<String>, error: ServiceError) -> Failure {
    state.audit.record(
        AuditEvent::new(AuditAction::Failure, subject).with_detail(format!(
            "{}: {}",
            error.kind(),
            error
        )),
    );

    let status = StatusCode::from_u16(error.status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ApiFailure::new(error.to_string())))
}
