//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: agentns — Secure naming and discovery for AI agents.
//

//! OCSP wire types — certificate identity and signed status responses.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Identifies a certificate to the responder: the SHA-256 hash of the
/// issuer's subject name (hex) plus the certificate serial.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct OcspCertId {
    pub issuer_name_hash: String,
    pub serial: String,
}

/// Certificate status as reported by the responder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OcspCertStatus {
    Good,
    Revoked,
    Unknown,
}

/// A signed status response.
///
/// The responder's signature covers the canonical bytes of this structure
/// minus the `signature` and `responder_certificate` fields. Responses are
/// valid until `next_update`; clients must not trust them beyond it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OcspResponse {
    pub cert_id: OcspCertId,
    pub status: OcspCertStatus,
    pub produced_at: DateTime<Utc>,
    pub next_update: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revocation_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revocation_reason: Option<String>,
    pub signature: String,
    pub responder_certificate: String,
}
