//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: agentns — Secure naming and discovery for AI agents.
//

//! Directory records — the persisted agent entry and revocation entry.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A registered agent as stored by the registry and returned in listings.
///
/// The parsed name components (`protocol`, `capability`, `provider`,
/// `version`) are denormalized from `ans_name` for indexed filtering; they
/// always agree with the parse of `ans_name`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AgentRecord {
    pub agent_id: String,
    pub ans_name: String,
    pub protocol: String,
    pub capability: String,
    pub provider: String,
    pub version: String,
    pub capabilities: Vec<String>,
    pub protocol_extensions: Value,
    pub endpoint: String,
    pub certificate_serial: String,
    pub certificate_pem: String,
    pub registration_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_renewal_time: Option<DateTime<Utc>>,
    pub is_active: bool,
}

/// Response body for `GET /agents`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AgentListResponse {
    pub agents: Vec<AgentRecord>,
    pub total: usize,
}

/// A certificate revocation, keyed by serial. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RevocationEntry {
    pub serial: String,
    pub revoked_at: DateTime<Utc>,
    pub reason: String,
}
