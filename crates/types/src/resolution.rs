//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: agentns — Secure naming and discovery for AI agents.
//

//! Resolution wire types — the signed endpoint record.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /resolve`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ResolutionRequest {
    /// Full ANS name, or a pattern with trailing fields omitted or `*`.
    pub ans_name: String,
    /// Optional semver constraint set, e.g. `"^1.0.0"` or `">=1.2.0 <2.0.0"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_range: Option<String>,
}

/// The signed payload of an endpoint record.
///
/// The registry's signature covers the canonical byte serialization of this
/// structure: UTF-8 JSON with lexicographically sorted keys and no
/// insignificant whitespace.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EndpointRecordData {
    pub agent_id: String,
    pub ans_name: String,
    pub endpoint: String,
    pub capabilities: Vec<String>,
    pub protocol_extensions: Value,
    /// The resolved agent's certificate, PEM-encoded.
    pub certificate: String,
    pub is_active: bool,
}

/// A resolution result, verifiable offline against the registry certificate.
///
/// `signature` is the hex-encoded registry signature over the canonical
/// bytes of `data`; `registry_certificate` is the PEM certificate whose
/// public key verifies it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EndpointRecord {
    pub data: EndpointRecordData,
    pub signature: String,
    pub registry_certificate: String,
}
