//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: agentns — Secure naming and discovery for AI agents.
//

//! AppState — shared handles for the HTTP layer.

use std::sync::Arc;

use crate::audit::AuditSink;
use crate::bootstrap::Platform;
use crate::ca::CertificateAuthority;
use crate::ocsp::OcspResponder;
use crate::registry::AgentRegistry;

/// Shared application state for the HTTP layer.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<AgentRegistry>,
    pub responder: Arc<OcspResponder>,
    pub ca: Arc<CertificateAuthority>,
    pub audit: Arc<dyn AuditSink>,
}

impl From<&Platform> for AppState {
    fn from(platform: &Platform) -> Self {
        Self {
            registry: platform.registry.clone(),
            responder: platform.responder.clone(),
            ca: platform.ca.clone(),
            audit: platform.audit.clone(),
        }
    }
}
