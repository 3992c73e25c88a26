//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: agentns — Secure naming and discovery for AI agents.
//

//! OCSP — signed certificate-status queries with TTL caching.
//!
//! The responder signs with the CA key (no delegation certificate is
//! configured) and caches responses by cert id until `next_update`. The
//! client caches `good` outcomes and falls back to synchronous chain
//! verification when the responder is unreachable or its signature does
//! not verify.

mod client;
mod responder;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use agentns_core::canonical::canonical_bytes;
use agentns_core::error::CryptoError;
use agentns_types::ocsp::{OcspCertId, OcspResponse};

pub use client::{OcspClient, OcspOutcome, DEFAULT_CLIENT_TTL_SECS, DEFAULT_TIMEOUT_MS};
pub use responder::{OcspResponder, DEFAULT_RESPONDER_TTL_SECS};

#[derive(Error, Debug)]
pub enum OcspError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("response signature did not verify")]
    SignatureInvalid,

    #[error("response is stale or malformed: {0}")]
    Stale(String),

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

/// Transport seam between client and responder. The in-process transport
/// is the default; an HTTP transport satisfies the same contract.
#[async_trait]
pub trait OcspTransport: Send + Sync {
    async fn fetch(&self, cert_id: &OcspCertId) -> Result<OcspResponse, OcspError>;
}

/// Direct call into a co-located responder.
pub struct InProcessTransport {
    responder: Arc<OcspResponder>,
}

impl InProcessTransport {
    pub fn new(responder: Arc<OcspResponder>) -> Self {
        Self { responder }
    }
}

#[async_trait]
impl OcspTransport for InProcessTransport {
    async fn fetch(&self, cert_id: &OcspCertId) -> Result<OcspResponse, OcspError> {
        self.responder.respond(cert_id).await
    }
}

/// Canonical bytes the responder signature covers: the response minus the
/// `signature` and `responder_certificate` fields.
pub(crate) fn signed_bytes(response: &OcspResponse) -> Result<Vec<u8>, CryptoError> {
    let mut value = serde_json::to_value(response)?;
    if let Some(obj) = value.as_object_mut() {
        obj.remove("signature");
        obj.remove("responder_certificate");
    }
    Ok(canonical_bytes(&value))
}
