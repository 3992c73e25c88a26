//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: agentns — Secure naming and discovery for AI agents.
//

//! Registration Authority — the policy gate in front of the CA.
//!
//! Ordered validation ladder for registrations: request schema → name
//! parse → name/body consistency → protocol adapter → reserved-name
//! policy → CSR self-signature and CN. The most specific failure is
//! returned first; adapter validation reports every violation at once.

use std::sync::Arc;

use semver::Version;

use agentns_core::crypto::{Certificate, CertificateSigningRequest};
use agentns_core::name::AnsName;
use agentns_types::agent::AgentRecord;
use agentns_types::registration::{AgentRegistrationRequest, AgentRenewalRequest};

use crate::adapters::AdapterRegistry;
use crate::ca::CertificateAuthority;
use crate::error::{ServiceError, ServiceResult};

/// Agent ids the platform keeps for itself.
const RESERVED_AGENT_IDS: &[&str] = &["ans", "registry", "admin"];

/// A registration that has passed every policy check and is ready for the CA.
#[derive(Debug)]
pub struct ValidatedRegistration {
    pub name: AnsName,
    pub csr: CertificateSigningRequest,
}

pub struct RegistrationAuthority {
    adapters: Arc<AdapterRegistry>,
}

impl RegistrationAuthority {
    pub fn new(adapters: Arc<AdapterRegistry>) -> Self {
        Self { adapters }
    }

    /// Run the full registration ladder.
    pub fn validate_registration(
        &self,
        request: &AgentRegistrationRequest,
    ) -> ServiceResult<ValidatedRegistration> {
        self.check_request_schema(request)?;

        let name = AnsName::parse(&request.ans_name)?;
        self.check_name_consistency(request, &name)?;

        let adapter = self.adapters.get(&name.protocol).map_err(ServiceError::from)?;
        adapter
            .validate(&request.protocol_extensions)
            .map_err(ServiceError::from)?;

        if RESERVED_AGENT_IDS.contains(&name.agent_id.as_str()) {
            return Err(ServiceError::ReservedName(name.agent_id));
        }

        let csr = CertificateSigningRequest::from_pem(&request.csr)
            .map_err(|e| ServiceError::InvalidCsr(e.to_string()))?;
        csr.verify()
            .map_err(|e| ServiceError::InvalidCsr(format!("self-signature check failed: {e}")))?;
        if csr.common_name != name.agent_id {
            return Err(ServiceError::NameMismatch(format!(
                "CSR common name '{}' does not equal agent id '{}'",
                csr.common_name, name.agent_id
            )));
        }

        Ok(ValidatedRegistration { name, csr })
    }

    /// Validate a renewal against the stored agent record.
    ///
    /// The presented certificate must parse, belong to the agent (CN and
    /// serial), and still verify against the CA — a revoked or expired
    /// certificate cannot be renewed. Renewals preserve `ans_name`; version
    /// bumps are new registrations.
    pub async fn validate_renewal(
        &self,
        request: &AgentRenewalRequest,
        agent: &AgentRecord,
        ca: &CertificateAuthority,
    ) -> ServiceResult<CertificateSigningRequest> {
        for (field, value) in [
            ("agent_id", &request.agent_id),
            ("currentCertificate", &request.current_certificate),
            ("csr", &request.csr),
        ] {
            if value.trim().is_empty() {
                return Err(ServiceError::SchemaError(format!(
                    "field '{field}' must be present and non-empty"
                )));
            }
        }

        let current = Certificate::from_pem(&request.current_certificate)
            .map_err(|e| ServiceError::SchemaError(format!("currentCertificate: {e}")))?;

        if current.subject_common_name != agent.agent_id {
            return Err(ServiceError::NameMismatch(format!(
                "certificate subject '{}' does not equal agent id '{}'",
                current.subject_common_name, agent.agent_id
            )));
        }
        if current.serial != agent.certificate_serial {
            return Err(ServiceError::NameMismatch(
                "certificate serial does not match the registered certificate".to_string(),
            ));
        }

        ca.verify_chain(&current).await.map_err(ServiceError::from)?;

        let csr = CertificateSigningRequest::from_pem(&request.csr)
            .map_err(|e| ServiceError::InvalidCsr(e.to_string()))?;
        csr.verify()
            .map_err(|e| ServiceError::InvalidCsr(format!("self-signature check failed: {e}")))?;
        if csr.common_name != agent.agent_id {
            return Err(ServiceError::NameMismatch(format!(
                "CSR common name '{}' does not equal agent id '{}'",
                csr.common_name, agent.agent_id
            )));
        }

        Ok(csr)
    }

    fn check_request_schema(&self, request: &AgentRegistrationRequest) -> ServiceResult<()> {
        for (field, value) in [
            ("protocol", &request.protocol),
            ("agent_name", &request.agent_name),
            ("agentCategory", &request.agent_category),
            ("providerName", &request.provider_name),
            ("version", &request.version),
            ("ans_name", &request.ans_name),
            ("endpoint", &request.endpoint),
            ("csr", &request.csr),
        ] {
            if value.trim().is_empty() {
                return Err(ServiceError::SchemaError(format!(
                    "field '{field}' must be present and non-empty"
                )));
            }
        }

        if !request.endpoint.contains("://") {
            return Err(ServiceError::SchemaError(
                "field 'endpoint' must be an absolute URI".to_string(),
            ));
        }

        if request.protocol_extensions.is_null() {
            return Err(ServiceError::SchemaError(
                "field 'protocol_extensions' must be present".to_string(),
            ));
        }

        Ok(())
    }

    fn check_name_consistency(
        &self,
        request: &AgentRegistrationRequest,
        name: &AnsName,
    ) -> ServiceResult<()> {
        let mismatch = |field: &str, body: &str, parsed: &str| {
            Err(ServiceError::NameMismatch(format!(
                "ans_name declares {field} '{parsed}' but the request body says '{body}'"
            )))
        };

        if name.protocol != request.protocol {
            return mismatch("protocol", &request.protocol, &name.protocol);
        }
        if name.agent_id != request.agent_name {
            return mismatch("agent id", &request.agent_name, &name.agent_id);
        }
        if name.capability != request.agent_category {
            return mismatch("capability", &request.agent_category, &name.capability);
        }
        if name.provider != request.provider_name {
            return mismatch("provider", &request.provider_name, &name.provider);
        }

        match Version::parse(&request.version) {
            Ok(v) if v == name.version => Ok(()),
            Ok(v) => mismatch("version", &v.to_string(), &name.version.to_string()),
            Err(e) => Err(ServiceError::SchemaError(format!(
                "field 'version' is not a semantic version: {e}"
            ))),
        }
    }
}
