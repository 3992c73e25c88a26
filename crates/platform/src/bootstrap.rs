//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: agentns — Secure naming and discovery for AI agents.
//

//! Explicit startup wiring.
//!
//! Components are process-wide resources, initialized in dependency order
//! and never lazily: CA → OCSP responder → OCSP client → adapters → RA →
//! registry. The HTTP layer is built on top of the returned handles.

use std::sync::Arc;

use crate::adapters::AdapterRegistry;
use crate::audit::AuditSink;
use crate::ca::{CertificateAuthority, DEFAULT_CERT_TTL_DAYS};
use crate::error::ServiceResult;
use crate::ocsp::{
    InProcessTransport, OcspClient, OcspResponder, DEFAULT_CLIENT_TTL_SECS,
    DEFAULT_RESPONDER_TTL_SECS, DEFAULT_TIMEOUT_MS,
};
use crate::ra::RegistrationAuthority;
use crate::registry::AgentRegistry;
use crate::storage::StoragePort;

/// Tunables for a platform instance. `Default` matches production defaults.
#[derive(Debug, Clone)]
pub struct PlatformOptions {
    pub ca_common_name: String,
    pub cert_ttl_days: i64,
    pub responder_ttl_secs: i64,
    pub client_ttl_secs: i64,
    pub ocsp_timeout_ms: u64,
}

impl Default for PlatformOptions {
    fn default() -> Self {
        Self {
            ca_common_name: "AgentNS Root CA".to_string(),
            cert_ttl_days: DEFAULT_CERT_TTL_DAYS,
            responder_ttl_secs: DEFAULT_RESPONDER_TTL_SECS,
            client_ttl_secs: DEFAULT_CLIENT_TTL_SECS,
            ocsp_timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

/// Live handles to the wired platform.
#[derive(Clone)]
pub struct Platform {
    pub ca: Arc<CertificateAuthority>,
    pub responder: Arc<OcspResponder>,
    pub ocsp_client: Arc<OcspClient>,
    pub adapters: Arc<AdapterRegistry>,
    pub ra: Arc<RegistrationAuthority>,
    pub registry: Arc<AgentRegistry>,
    pub audit: Arc<dyn AuditSink>,
}

/// Wire up a platform instance over the given store and audit sink.
///
/// Revocations persisted by a previous run are loaded into the CA before
/// anything can query it.
pub async fn bootstrap(
    options: PlatformOptions,
    store: Arc<dyn StoragePort>,
    audit: Arc<dyn AuditSink>,
) -> ServiceResult<Platform> {
    let ca = Arc::new(CertificateAuthority::bootstrap(
        &options.ca_common_name,
        options.cert_ttl_days,
    )?);
    ca.load_revocations(store.list_revocations().await?).await;

    let responder = Arc::new(OcspResponder::new(ca.clone(), options.responder_ttl_secs));

    let ocsp_client = Arc::new(OcspClient::new(
        Arc::new(InProcessTransport::new(responder.clone())),
        ca.clone(),
        options.client_ttl_secs,
        options.ocsp_timeout_ms,
        audit.clone(),
    ));

    let adapters = Arc::new(AdapterRegistry::with_builtin());
    let ra = Arc::new(RegistrationAuthority::new(adapters.clone()));

    let registry = Arc::new(
        AgentRegistry::bootstrap(
            store,
            ra.clone(),
            ca.clone(),
            responder.clone(),
            ocsp_client.clone(),
            audit.clone(),
        )
        .await?,
    );

    Ok(Platform {
        ca,
        responder,
        ocsp_client,
        adapters,
        ra,
        registry,
        audit,
    })
}
