//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: agentns — Secure naming and discovery for AI agents.
//

//! Registration, renewal, and revocation wire types.
//!
//! Field naming follows the published registration protocol: snake_case
//! with the fixed camelCase exceptions (`agentCategory`, `providerName`,
//! `registeredAgent`, `renewedAgent`, `currentCertificate`).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::agent::AgentRecord;

/// Body of `POST /register`.
///
/// The individual name components must agree with the parse of `ans_name`;
/// the registration authority rejects any discrepancy.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AgentRegistrationRequest {
    pub protocol: String,
    pub agent_name: String,
    #[serde(rename = "agentCategory")]
    pub agent_category: String,
    #[serde(rename = "providerName")]
    pub provider_name: String,
    pub version: String,
    pub ans_name: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub protocol_extensions: Value,
    pub endpoint: String,
    /// PEM-encoded certificate signing request; its CN must equal `agent_name`.
    pub csr: String,
}

/// Body of a successful or failed `POST /register` response.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AgentRegistrationResponse {
    pub status: String,
    #[serde(
        rename = "registeredAgent",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub registered_agent: Option<AgentRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AgentRegistrationResponse {
    pub fn success(agent: AgentRecord, certificate_pem: String) -> Self {
        Self {
            status: "success".to_string(),
            registered_agent: Some(agent),
            certificate: Some(certificate_pem),
            error: None,
        }
    }
}

/// Body of `POST /renew`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AgentRenewalRequest {
    pub agent_id: String,
    /// PEM certificate currently held by the agent; must belong to `agent_id`
    /// and must not be revoked.
    #[serde(rename = "currentCertificate")]
    pub current_certificate: String,
    /// PEM CSR for the replacement certificate.
    pub csr: String,
}

/// Body of a `POST /renew` response.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AgentRenewalResponse {
    pub status: String,
    #[serde(
        rename = "renewedAgent",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub renewed_agent: Option<AgentRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AgentRenewalResponse {
    pub fn success(agent: AgentRecord, certificate_pem: String) -> Self {
        Self {
            status: "success".to_string(),
            renewed_agent: Some(agent),
            certificate: Some(certificate_pem),
            error: None,
        }
    }
}

/// Body of `POST /revoke`. `agent_id` may be a bare agent id or a full ANS
/// name when the id alone is ambiguous across registered versions.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RevocationRequest {
    pub agent_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Body of a `POST /revoke` response.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RevocationResponse {
    pub status: String,
    pub agent_id: String,
}

/// Uniform failure envelope for all API errors.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ApiFailure {
    pub status: String,
    pub error: String,
}

impl ApiFailure {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            status: "failure".to_string(),
            error: error.into(),
        }
    }
}
