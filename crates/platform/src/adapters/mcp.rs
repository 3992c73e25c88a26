//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: agentns — Secure naming and discovery for AI agents.
//

//! Model Context Protocol (`mcp`) extension payloads.
//!
//! Required shape:
//! - `schema_version`: non-empty string
//! - `context_specifications[]`: each with `context_type`, `version`,
//!   `description`, `schema` (object), and optional `max_tokens` (positive)
//! - optional `document_types[]`: strings
//! - optional `token_limit`: positive integer

use serde_json::{Map, Value};

use super::{optional_positive_integer, require_object, require_string, AdapterError, ProtocolAdapter};

#[derive(Debug)]
pub struct McpAdapter;

impl ProtocolAdapter for McpAdapter {
    fn protocol(&self) -> &'static str {
        "mcp"
    }

    fn validate(&self, payload: &Value) -> Result<(), AdapterError> {
        let mut reasons = Vec::new();

        let Some(map) = require_object(payload, &mut reasons) else {
            return Err(AdapterError::invalid(reasons));
        };

        require_string(map, "schema_version", &mut reasons);
        validate_context_specifications(map, &mut reasons);
        validate_document_types(map, &mut reasons);
        optional_positive_integer(map, "token_limit", &mut reasons);

        if reasons.is_empty() {
            Ok(())
        } else {
            Err(AdapterError::invalid(reasons))
        }
    }

    fn parse(&self, payload: &Value) -> Result<Value, AdapterError> {
        self.validate(payload)?;

        // Normalization fills in the optional list so consumers never
        // branch on its absence.
        let mut normalized = payload.clone();
        if let Some(map) = normalized.as_object_mut() {
            map.entry("document_types").or_insert_with(|| Value::Array(Vec::new()));
        }
        Ok(normalized)
    }

    fn format(&self, normalized: &Value) -> Result<Value, AdapterError> {
        self.validate(normalized)?;
        Ok(normalized.clone())
    }
}

fn validate_context_specifications(map: &Map<String, Value>, reasons: &mut Vec<String>) {
    let Some(items) = map.get("context_specifications").and_then(Value::as_array) else {
        reasons.push("missing required field 'context_specifications' (array)".to_string());
        return;
    };

    for (i, item) in items.iter().enumerate() {
        let Some(spec) = item.as_object() else {
            reasons.push(format!("context_specifications[{i}] must be an object"));
            continue;
        };
        for field in ["context_type", "version", "description"] {
            if spec.get(field).and_then(Value::as_str).is_none() {
                reasons.push(format!(
                    "context_specifications[{i}] missing string field '{field}'"
                ));
            }
        }
        if spec.get("schema").and_then(Value::as_object).is_none() {
            reasons.push(format!(
                "context_specifications[{i}] missing object field 'schema'"
            ));
        }
        optional_positive_integer_at(spec, "max_tokens", i, reasons);
    }
}

fn optional_positive_integer_at(
    spec: &Map<String, Value>,
    field: &str,
    index: usize,
    reasons: &mut Vec<String>,
) {
    if let Some(value) = spec.get(field) {
        match value.as_u64() {
            Some(n) if n > 0 => {}
            _ => reasons.push(format!(
                "context_specifications[{index}].{field} must be a positive integer"
            )),
        }
    }
}

fn validate_document_types(map: &Map<String, Value>, reasons: &mut Vec<String>) {
    if let Some(value) = map.get("document_types") {
        match value.as_array() {
            Some(items) => {
                for (i, item) in items.iter().enumerate() {
                    if !item.is_string() {
                        reasons.push(format!("document_types[{i}] must be a string"));
                    }
                }
            }
            None => reasons.push("'document_types' must be an array".to_string()),
        }
    }
}
