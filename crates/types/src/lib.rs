//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: agentns — Secure naming and discovery for AI agents.
//

//! Shared wire types for the agentns name service.
//!
//! This crate provides the canonical type definitions exchanged between
//! clients and the agentns platform: registration, renewal, revocation,
//! resolution, directory listings, and OCSP status. Types are serializable
//! via serde and have JSON schema support via schemars.
//!
//! Wire field names follow the published schemas: snake_case throughout,
//! except for the handful of camelCase fields the registration protocol
//! fixes (`agentCategory`, `providerName`, `registeredAgent`,
//! `currentCertificate`).

pub mod agent;
pub mod ocsp;
pub mod registration;
pub mod resolution;
pub mod schema;

// Re-export primitive type aliases — direct re-exports, no newtype wrappers.
pub use chrono::{DateTime, Utc};

/// Prelude module for convenient glob imports.
pub mod prelude {
    pub use crate::agent::{AgentListResponse, AgentRecord, RevocationEntry};
    pub use crate::ocsp::{OcspCertId, OcspCertStatus, OcspResponse};
    pub use crate::registration::{
        AgentRegistrationRequest, AgentRegistrationResponse, AgentRenewalRequest,
        AgentRenewalResponse, ApiFailure, RevocationRequest, RevocationResponse,
    };
    pub use crate::resolution::{EndpointRecord, EndpointRecordData, ResolutionRequest};
    pub use crate::{DateTime, Utc};
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use chrono::Utc;
    use serde_json::json;

    fn sample_agent() -> AgentRecord {
        AgentRecord {
            agent_id: "chat".to_string(),
            ans_name: "a2a://chat.conversation.openai.v1.2.3".to_string(),
            protocol: "a2a".to_string(),
            capability: "conversation".to_string(),
            provider: "openai".to_string(),
            version: "1.2.3".to_string(),
            capabilities: vec!["chat".to_string(), "summarize".to_string()],
            protocol_extensions: json!({"spec_version": "1.0"}),
            endpoint: "https://agents.openai.example/chat".to_string(),
            certificate_serial: "00000001deadbeef".to_string(),
            certificate_pem: "-----BEGIN CERTIFICATE-----\n-----END CERTIFICATE-----".to_string(),
            registration_time: Utc::now(),
            last_renewal_time: None,
            is_active: true,
        }
    }

    #[test]
    fn test_registration_request_round_trip() {
        let json_input = r#"{
            "protocol": "a2a",
            "agent_name": "chat",
            "agentCategory": "conversation",
            "providerName": "openai",
            "version": "1.2.3",
            "ans_name": "a2a://chat.conversation.openai.v1.2.3",
            "capabilities": ["chat"],
            "protocol_extensions": {"spec_version": "1.0"},
            "endpoint": "https://agents.openai.example/chat",
            "csr": "-----BEGIN CERTIFICATE REQUEST-----"
        }"#;

        let request: AgentRegistrationRequest =
            serde_json::from_str(json_input).expect("deserialization failed");
        assert_eq!(request.agent_name, "chat");
        assert_eq!(request.agent_category, "conversation");
        assert_eq!(request.provider_name, "openai");

        let output = serde_json::to_string(&request).expect("serialization failed");
        assert!(output.contains("\"agentCategory\":\"conversation\""));
        assert!(output.contains("\"providerName\":\"openai\""));
        assert!(output.contains("\"ans_name\""));
    }

    #[test]
    fn test_registration_response_success_shape() {
        let response = AgentRegistrationResponse::success(
            sample_agent(),
            "-----BEGIN CERTIFICATE-----".to_string(),
        );

        let output = serde_json::to_string(&response).expect("serialization failed");
        assert!(output.contains("\"status\":\"success\""));
        assert!(output.contains("\"registeredAgent\""));
        assert!(!output.contains("\"error\""));
    }

    #[test]
    fn test_renewal_request_field_names() {
        let json_input = r#"{
            "agent_id": "chat",
            "currentCertificate": "-----BEGIN CERTIFICATE-----",
            "csr": "-----BEGIN CERTIFICATE REQUEST-----"
        }"#;

        let request: AgentRenewalRequest =
            serde_json::from_str(json_input).expect("deserialization failed");
        assert_eq!(request.agent_id, "chat");
        assert!(request.current_certificate.starts_with("-----BEGIN"));
    }

    #[test]
    fn test_agent_record_round_trip() {
        let original = sample_agent();
        let json = serde_json::to_string(&original).expect("serialization failed");
        let deserialized: AgentRecord = serde_json::from_str(&json).expect("deserialization failed");

        assert_eq!(original.agent_id, deserialized.agent_id);
        assert_eq!(original.ans_name, deserialized.ans_name);
        assert_eq!(original.capabilities, deserialized.capabilities);
        assert_eq!(original.protocol_extensions, deserialized.protocol_extensions);
        assert_eq!(original.certificate_serial, deserialized.certificate_serial);
        assert_eq!(original.is_active, deserialized.is_active);
    }

    #[test]
    fn test_agent_record_omits_absent_renewal_time() {
        let json = serde_json::to_string(&sample_agent()).expect("serialization failed");
        assert!(!json.contains("last_renewal_time"));
    }

    #[test]
    fn test_endpoint_record_round_trip() {
        let original = EndpointRecord {
            data: EndpointRecordData {
                agent_id: "chat".to_string(),
                ans_name: "a2a://chat.conversation.openai.v1.2.3".to_string(),
                endpoint: "https://agents.openai.example/chat".to_string(),
                capabilities: vec!["chat".to_string()],
                protocol_extensions: json!({"spec_version": "1.0"}),
                certificate: "-----BEGIN CERTIFICATE-----".to_string(),
                is_active: true,
            },
            signature: "deadbeef".to_string(),
            registry_certificate: "-----BEGIN CERTIFICATE-----".to_string(),
        };

        let json = serde_json::to_string(&original).expect("serialization failed");
        let deserialized: EndpointRecord =
            serde_json::from_str(&json).expect("deserialization failed");

        assert_eq!(original.data.agent_id, deserialized.data.agent_id);
        assert_eq!(original.data.endpoint, deserialized.data.endpoint);
        assert_eq!(original.signature, deserialized.signature);
        assert_eq!(original.registry_certificate, deserialized.registry_certificate);
    }

    #[test]
    fn test_ocsp_status_wire_form() {
        assert_eq!(
            serde_json::to_string(&OcspCertStatus::Good).expect("serialization failed"),
            "\"good\""
        );
        assert_eq!(
            serde_json::to_string(&OcspCertStatus::Revoked).expect("serialization failed"),
            "\"revoked\""
        );
        assert_eq!(
            serde_json::to_string(&OcspCertStatus::Unknown).expect("serialization failed"),
            "\"unknown\""
        );
    }

    #[test]
    fn test_ocsp_response_round_trip() {
        let now = Utc::now();
        let original = OcspResponse {
            cert_id: OcspCertId {
                issuer_name_hash: "ab".repeat(32),
                serial: "00000001deadbeef".to_string(),
            },
            status: OcspCertStatus::Revoked,
            produced_at: now,
            next_update: now,
            revocation_time: Some(now),
            revocation_reason: Some("keyCompromise".to_string()),
            signature: "deadbeef".to_string(),
            responder_certificate: "-----BEGIN CERTIFICATE-----".to_string(),
        };

        let json = serde_json::to_string(&original).expect("serialization failed");
        let deserialized: OcspResponse = serde_json::from_str(&json).expect("deserialization failed");

        assert_eq!(original.cert_id, deserialized.cert_id);
        assert_eq!(original.revocation_reason, deserialized.revocation_reason);
    }

    #[test]
    fn test_resolution_request_optional_range() {
        let bare: ResolutionRequest =
            serde_json::from_str(r#"{"ans_name": "a2a://chat.conversation.openai.v1.2.3"}"#)
                .expect("deserialization failed");
        assert_eq!(bare.version_range, None);

        let ranged: ResolutionRequest = serde_json::from_str(
            r#"{"ans_name": "a2a://chat.conversation.openai", "version_range": "^1.0.0"}"#,
        )
        .expect("deserialization failed");
        assert_eq!(ranged.version_range.as_deref(), Some("^1.0.0"));
    }

    #[test]
    fn test_schema_map_covers_wire_types() {
        let schemas = crate::schema::generate();
        for name in [
            "registration_request.v1",
            "registration_response.v1",
            "renewal_request.v1",
            "revocation_request.v1",
            "resolution_request.v1",
            "endpoint_record.v1",
            "agent_record.v1",
            "ocsp_response.v1",
        ] {
            assert!(schemas.contains_key(name), "missing schema {name}");
        }
    }
}
