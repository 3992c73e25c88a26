//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: agentns — Secure naming and discovery for AI agents.
//

//! Audit event sink — the observability collaborator.
//!
//! The core emits structured events for every trust decision; the sink is
//! an abstraction so embedders can route events wherever they need. The
//! default sink writes `tracing` events under the `audit` target.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Registered,
    Renewed,
    Revoked,
    Resolved,
    OcspFallback,
    SignatureFailure,
    Failure,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Registered => "registered",
            AuditAction::Renewed => "renewed",
            AuditAction::Revoked => "revoked",
            AuditAction::Resolved => "resolved",
            AuditAction::OcspFallback => "ocsp_fallback",
            AuditAction::SignatureFailure => "signature_failure",
            AuditAction::Failure => "failure",
        }
    }
}

/// A single audit record.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub request_id: Uuid,
    pub action: AuditAction,
    /// Agent id when known.
    pub subject: Option<String>,
    pub detail: Option<String>,
    pub at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(action: AuditAction, subject: Option<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            action,
            subject,
            detail: None,
            at: Utc::now(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Receives audit events. Implementations must be cheap and non-blocking;
/// the core calls `record` inline on request paths.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: AuditEvent);
}

/// Default sink: structured `tracing` events under the `audit` target.
#[derive(Debug, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: AuditEvent) {
        tracing::info!(
            target: "audit",
            request_id = %event.request_id,
            action = event.action.as_str(),
            subject = event.subject.as_deref().unwrap_or("-"),
            detail = event.detail.as_deref().unwrap_or("-"),
            "audit event"
        );
    }
}

/// Buffering sink for tests and embedders that inspect events after the fact.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Count of events with the given action.
    pub fn count(&self, action: AuditAction) -> usize {
        self.events().iter().filter(|e| e.action == action).count()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: AuditEvent) {
        if let Ok(mut guard) = self.events.lock() {
            guard.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_records_in_order() {
        let sink = MemoryAuditSink::new();
        sink.record(AuditEvent::new(AuditAction::Registered, Some("chat".into())));
        sink.record(
            AuditEvent::new(AuditAction::OcspFallback, Some("chat".into()))
                .with_detail("transport timeout"),
        );

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].action, AuditAction::Registered);
        assert_eq!(events[1].action, AuditAction::OcspFallback);
        assert_eq!(events[1].detail.as_deref(), Some("transport timeout"));
        assert_eq!(sink.count(AuditAction::OcspFallback), 1);
    }
}
