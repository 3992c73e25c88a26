//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: agentns — Secure naming and discovery for AI agents.
//

//! Protocol adapter registry.
//!
//! Each supported protocol scheme contributes an adapter that validates,
//! parses (normalizes), and formats the `protocol_extensions` payload of a
//! registration. New protocols register without touching the core: the
//! registry is a plain string → adapter map.

mod a2a;
mod mcp;

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

pub use a2a::A2aAdapter;
pub use mcp::McpAdapter;

#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("no adapter registered for protocol '{0}'")]
    Unsupported(String),

    #[error("{}", reasons.join("; "))]
    Invalid { reasons: Vec<String> },
}

impl AdapterError {
    pub fn invalid(reasons: Vec<String>) -> Self {
        AdapterError::Invalid { reasons }
    }
}

/// Per-protocol handling of extension payloads.
pub trait ProtocolAdapter: Send + Sync + std::fmt::Debug {
    /// The protocol scheme this adapter serves, e.g. `"a2a"`.
    fn protocol(&self) -> &'static str;

    /// Check the payload against the protocol's requirements. Collects every
    /// violation rather than stopping at the first.
    fn validate(&self, payload: &Value) -> Result<(), AdapterError>;

    /// Validate and normalize the payload into its canonical shape
    /// (defaults filled in, enumerated values lowercased).
    fn parse(&self, payload: &Value) -> Result<Value, AdapterError>;

    /// Render a normalized payload back into wire form.
    fn format(&self, normalized: &Value) -> Result<Value, AdapterError>;
}

/// String → adapter map.
pub struct AdapterRegistry {
    adapters: HashMap<&'static str, Arc<dyn ProtocolAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self {
            adapters: HashMap::new(),
        }
    }

    /// Registry preloaded with the prescribed `a2a` and `mcp` adapters.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(A2aAdapter));
        registry.register(Arc::new(McpAdapter));
        registry
    }

    pub fn register(&mut self, adapter: Arc<dyn ProtocolAdapter>) {
        self.adapters.insert(adapter.protocol(), adapter);
    }

    pub fn get(&self, protocol: &str) -> Result<&Arc<dyn ProtocolAdapter>, AdapterError> {
        self.adapters
            .get(protocol)
            .ok_or_else(|| AdapterError::Unsupported(protocol.to_string()))
    }

    pub fn supports(&self, protocol: &str) -> bool {
        self.adapters.contains_key(protocol)
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

// Shared helpers for the field-presence checks both adapters perform.

fn require_object<'v>(
    payload: &'v Value,
    reasons: &mut Vec<String>,
) -> Option<&'v serde_json::Map<String, Value>> {
    match payload.as_object() {
        Some(map) => Some(map),
        None => {
            reasons.push("protocol_extensions must be a JSON object".to_string());
            None
        }
    }
}

fn require_string(map: &serde_json::Map<String, Value>, field: &str, reasons: &mut Vec<String>) {
    match map.get(field).and_then(Value::as_str) {
        Some(s) if !s.is_empty() => {}
        Some(_) => reasons.push(format!("'{field}' must be a non-empty string")),
        None => reasons.push(format!("missing required field '{field}'")),
    }
}

fn require_enum(
    map: &serde_json::Map<String, Value>,
    field: &str,
    allowed: &[&str],
    reasons: &mut Vec<String>,
) {
    match map.get(field).and_then(Value::as_str) {
        Some(s) if allowed.contains(&s.to_ascii_lowercase().as_str()) => {}
        Some(s) => reasons.push(format!(
            "'{field}' must be one of [{}], got '{s}'",
            allowed.join(", ")
        )),
        None => reasons.push(format!("missing required field '{field}'")),
    }
}

fn optional_positive_integer(
    map: &serde_json::Map<String, Value>,
    field: &str,
    reasons: &mut Vec<String>,
) {
    if let Some(value) = map.get(field) {
        match value.as_u64() {
            Some(n) if n > 0 => {}
            _ => reasons.push(format!("'{field}' must be a positive integer")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builtin_registry_serves_both_protocols() {
        let registry = AdapterRegistry::with_builtin();
        assert!(registry.supports("a2a"));
        assert!(registry.supports("mcp"));
        assert!(!registry.supports("dns"));
    }

    #[test]
    fn test_unknown_protocol_is_unsupported() {
        let registry = AdapterRegistry::with_builtin();
        let err = registry.get("gopher").expect_err("should be unsupported");
        assert!(matches!(err, AdapterError::Unsupported(p) if p == "gopher"));
    }

    #[test]
    fn test_validation_collects_all_reasons() {
        let registry = AdapterRegistry::with_builtin();
        let adapter = registry.get("a2a").expect("registered");

        let err = adapter
            .validate(&json!({"capabilities": "not-an-array"}))
            .expect_err("should fail");
        match err {
            AdapterError::Invalid { reasons } => {
                assert!(reasons.len() >= 3, "expected several reasons, got {reasons:?}");
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
    }
}
