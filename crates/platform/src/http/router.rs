//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: agentns — Secure naming and discovery for AI agents.
//

//! Axum router composition for the agentns HTTP layer.
//!
//! Routes:
//!   POST /register        — register an agent, returns its certificate
//!   POST /renew           — renew an agent certificate
//!   POST /revoke          — revoke an agent certificate
//!   POST /resolve         — resolve a name to a signed endpoint record
//!   GET  /agents          — filtered directory listing
//!   GET  /ocsp            — certificate status by serial
//!   POST /ocsp            — certificate status by explicit cert id
//!   GET  /ca/certificate  — the CA root certificate (PEM)
//!   GET  /schemas         — published wire-type JSON schemas
//!   GET  /health          — liveness probe

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{
    handlers::{
        ca_certificate_handler, health_handler, list_agents_handler, ocsp_get_handler,
        ocsp_post_handler, register_handler, renew_handler, resolve_handler, revoke_handler,
        schemas_handler,
    },
    state::AppState,
};

/// Build the route set shared by the server binary and the test harnesses,
/// keeping a single source of truth for the surface.
pub fn build_base_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register_handler))
        .route("/renew", post(renew_handler))
        .route("/revoke", post(revoke_handler))
        .route("/resolve", post(resolve_handler))
        .route("/agents", get(list_agents_handler))
        .route("/ocsp", get(ocsp_get_handler).post(ocsp_post_handler))
        .route("/ca/certificate", get(ca_certificate_handler))
        .route("/schemas", get(schemas_handler))
        .route("/health", get(health_handler))
}

/// Compose the full router with middleware.
pub fn create_router(state: AppState) -> Router {
    build_base_router()
        .with_state(state)
        // Same-origin only; discovery clients talk to the API directly.
        .layer(CorsLayer::new())
        .layer(TraceLayer::new_for_http())
}
