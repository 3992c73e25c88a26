//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: agentns — Secure naming and discovery for AI agents.
//

//! Agent-to-agent (`a2a`) extension payloads.
//!
//! Required shape:
//! - `spec_version`: non-empty string
//! - `capabilities[]`: each with `name`, `version`, `description`, and an
//!   optional `interface.{inputs,outputs}` object
//! - `routing.protocol` ∈ {http, grpc, websocket}
//! - `security.authentication` ∈ {mtls, oauth2, jwt, api_key, none}
//! - `security.authorization` ∈ {rbac, abac, capability, none}
//! - `security.encryption` ∈ {tls, mtls, e2e, none}

use serde_json::{Map, Value};

use super::{require_enum, require_object, require_string, AdapterError, ProtocolAdapter};

const ROUTING_PROTOCOLS: &[&str] = &["http", "grpc", "websocket"];
const AUTHENTICATION: &[&str] = &["mtls", "oauth2", "jwt", "api_key", "none"];
const AUTHORIZATION: &[&str] = &["rbac", "abac", "capability", "none"];
const ENCRYPTION: &[&str] = &["tls", "mtls", "e2e", "none"];

#[derive(Debug)]
pub struct A2aAdapter;

impl ProtocolAdapter for A2aAdapter {
    fn protocol(&self) -> &'static str {
        "a2a"
    }

    fn validate(&self, payload: &Value) -> Result<(), AdapterError> {
        let mut reasons = Vec::new();

        let Some(map) = require_object(payload, &mut reasons) else {
            return Err(AdapterError::invalid(reasons));
        };

        require_string(map, "spec_version", &mut reasons);
        validate_capabilities(map, &mut reasons);
        validate_section(map, "routing", &mut reasons, |routing, reasons| {
            require_enum(routing, "protocol", ROUTING_PROTOCOLS, reasons);
        });
        validate_section(map, "security", &mut reasons, |security, reasons| {
            require_enum(security, "authentication", AUTHENTICATION, reasons);
            require_enum(security, "authorization", AUTHORIZATION, reasons);
            require_enum(security, "encryption", ENCRYPTION, reasons);
        });

        if reasons.is_empty() {
            Ok(())
        } else {
            Err(AdapterError::invalid(reasons))
        }
    }

    fn parse(&self, payload: &Value) -> Result<Value, AdapterError> {
        self.validate(payload)?;

        // Validation guarantees the object shape; normalization lowercases
        // the enumerated fields so equality checks downstream are stable.
        let mut normalized = payload.clone();
        if let Some(map) = normalized.as_object_mut() {
            lowercase_field(map, "routing", "protocol");
            lowercase_field(map, "security", "authentication");
            lowercase_field(map, "security", "authorization");
            lowercase_field(map, "security", "encryption");
        }
        Ok(normalized)
    }

    fn format(&self, normalized: &Value) -> Result<Value, AdapterError> {
        self.validate(normalized)?;
        Ok(normalized.clone())
    }
}

fn validate_capabilities(map: &Map<String, Value>, reasons: &mut Vec<String>) {
    let Some(items) = map.get("capabilities").and_then(Value::as_array) else {
        reasons.push("missing required field 'capabilities' (array)".to_string());
        return;
    };

    for (i, item) in items.iter().enumerate() {
        let Some(cap) = item.as_object() else {
            reasons.push(format!("capabilities[{i}] must be an object"));
            continue;
        };
        for field in ["name", "version", "description"] {
            if cap.get(field).and_then(Value::as_str).is_none() {
                reasons.push(format!("capabilities[{i}] missing string field '{field}'"));
            }
        }
        if let Some(interface) = cap.get("interface") {
            match interface.as_object() {
                Some(iface) => {
                    for field in ["inputs", "outputs"] {
                        if let Some(v) = iface.get(field) {
                            if !v.is_object() && !v.is_array() {
                                reasons.push(format!(
                                    "capabilities[{i}].interface.{field} must be an object or array"
                                ));
                            }
                        }
                    }
                }
                None => reasons.push(format!("capabilities[{i}].interface must be an object")),
            }
        }
    }
}

fn validate_section(
    map: &Map<String, Value>,
    name: &str,
    reasons: &mut Vec<String>,
    check: impl FnOnce(&Map<String, Value>, &mut Vec<String>),
) {
    match map.get(name).and_then(Value::as_object) {
        Some(section) => check(section, reasons),
        None => reasons.push(format!("missing required field '{name}' (object)")),
    }
}

fn lowercase_field(map: &mut Map<String, Value>, section: &str, field: &str) {
    if let Some(value) = map
        .get_mut(section)
        .and_then(Value::as_object_mut)
        .and_then(|s| s.get_mut(field))
    {
        let lowered = value.as_str().map(str::to_ascii_lowercase);
        if let Some(lowered) = lowered {
            *value = Value::String(lowered);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_payload() -> Value {
        json!({
            "spec_version": "1.0",
            "capabilities": [
                {
                    "name": "chat",
                    "version": "1.0.0",
                    "description": "Conversational interface",
                    "interface": {"inputs": {"type": "string"}, "outputs": {"type": "string"}}
                }
            ],
            "routing": {"protocol": "http"},
            "security": {
                "authentication": "mtls",
                "authorization": "rbac",
                "encryption": "tls"
            }
        })
    }

    #[test]
    fn test_accepts_valid_payload() {
        A2aAdapter.validate(&valid_payload()).expect("should validate");
    }

    #[test]
    fn test_rejects_missing_spec_version() {
        let mut payload = valid_payload();
        payload.as_object_mut().expect("object").remove("spec_version");

        let err = A2aAdapter.validate(&payload).expect_err("should fail");
        assert!(err.to_string().contains("spec_version"));
    }

    #[test]
    fn test_rejects_unknown_routing_protocol() {
        let mut payload = valid_payload();
        payload["routing"]["protocol"] = json!("carrier-pigeon");

        let err = A2aAdapter.validate(&payload).expect_err("should fail");
        assert!(err.to_string().contains("protocol"));
    }

    #[test]
    fn test_rejects_incomplete_capability() {
        let mut payload = valid_payload();
        payload["capabilities"][0].as_object_mut().expect("object").remove("description");

        let err = A2aAdapter.validate(&payload).expect_err("should fail");
        assert!(err.to_string().contains("capabilities[0]"));
    }

    #[test]
    fn test_rejects_bad_security_enums() {
        let mut payload = valid_payload();
        payload["security"]["authorization"] = json!("vibes");

        assert!(A2aAdapter.validate(&payload).is_err());
    }

    #[test]
    fn test_parse_lowercases_enums() {
        let mut payload = valid_payload();
        payload["routing"]["protocol"] = json!("HTTP");
        payload["security"]["encryption"] = json!("TLS");

        let normalized = A2aAdapter.parse(&payload).expect("should parse");
        assert_eq!(normalized["routing"]["protocol"], "http");
        assert_eq!(normalized["security"]["encryption"], "tls");
    }

    #[test]
    fn test_format_round_trips_normalized_payload() {
        let normalized = A2aAdapter.parse(&valid_payload()).expect("parse");
        let formatted = A2aAdapter.format(&normalized).expect("format");
        assert_eq!(formatted, normalized);
    }
}
