//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: agentns — Secure naming and discovery for AI agents.
//

//! Agent Registry — registration, listing, resolution, and endpoint-record
//! signing.
//!
//! Resolution order: parse the name or pattern, collect active candidates
//! matching the routing fields, negotiate the version (range if given,
//! exact if the name pins one, highest otherwise), then walk candidates
//! best-first and return the first whose certificate passes the OCSP check
//! and chain verification. A revoked or unknown candidate is skipped, not
//! fatal: the next best version answers instead.

use std::sync::Arc;

use chrono::Utc;
use rsa::RsaPrivateKey;
use semver::Version;

use agentns_core::canonical::canonical_bytes;
use agentns_core::crypto::{self, Certificate, CertificateSigningRequest};
use agentns_core::name::NamePattern;
use agentns_core::version::parse_range;
use agentns_types::agent::AgentRecord;
use agentns_types::registration::{AgentRegistrationRequest, AgentRenewalRequest};
use agentns_types::resolution::{EndpointRecord, EndpointRecordData};

use crate::audit::{AuditAction, AuditEvent, AuditSink};
use crate::ca::CertificateAuthority;
use crate::error::{ServiceError, ServiceResult};
use crate::ocsp::{OcspClient, OcspOutcome, OcspResponder};
use crate::ra::RegistrationAuthority;
use crate::storage::{AgentFilter, StoragePort};

/// Listing pagination bounds.
const LIST_DEFAULT: usize = 10;
const LIST_MAX: usize = 100;

/// Upper bound on candidates examined per resolution.
const RESOLVE_CANDIDATE_LIMIT: usize = 256;

/// Query parameters for [`AgentRegistry::list`].
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub protocol: Option<String>,
    pub capability: Option<String>,
    pub provider: Option<String>,
    pub include_inactive: bool,
    pub max: Option<usize>,
}

pub struct AgentRegistry {
    store: Arc<dyn StoragePort>,
    ra: Arc<RegistrationAuthority>,
    ca: Arc<CertificateAuthority>,
    responder: Arc<OcspResponder>,
    ocsp_client: Arc<OcspClient>,
    signing_key: RsaPrivateKey,
    certificate: Certificate,
    certificate_pem: String,
    audit: Arc<dyn AuditSink>,
}

impl AgentRegistry {
    /// Create the registry, obtaining its signing identity from the CA.
    ///
    /// The registry enrolls like any agent: a fresh keypair and a CSR with
    /// CN `registry` (the id is reserved, so no agent can claim it).
    pub async fn bootstrap(
        store: Arc<dyn StoragePort>,
        ra: Arc<RegistrationAuthority>,
        ca: Arc<CertificateAuthority>,
        responder: Arc<OcspResponder>,
        ocsp_client: Arc<OcspClient>,
        audit: Arc<dyn AuditSink>,
    ) -> ServiceResult<Self> {
        let signing_key =
            crypto::generate_keypair().map_err(|e| ServiceError::Internal(e.to_string()))?;
        Self::with_key(store, ra, ca, responder, ocsp_client, audit, signing_key).await
    }

    /// Bootstrap with an externally supplied key (tests use smaller keys).
    pub async fn with_key(
        store: Arc<dyn StoragePort>,
        ra: Arc<RegistrationAuthority>,
        ca: Arc<CertificateAuthority>,
        responder: Arc<OcspResponder>,
        ocsp_client: Arc<OcspClient>,
        audit: Arc<dyn AuditSink>,
        signing_key: RsaPrivateKey,
    ) -> ServiceResult<Self> {
        let csr = CertificateSigningRequest::create("registry", &signing_key)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        let certificate = ca.issue(&csr).await?;
        let certificate_pem = certificate
            .to_pem()
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        tracing::info!(serial = %certificate.serial, "registry signing certificate issued");

        Ok(Self {
            store,
            ra,
            ca,
            responder,
            ocsp_client,
            signing_key,
            certificate,
            certificate_pem,
            audit,
        })
    }

    /// Register a new agent: RA policy gate → CA issuance → persistence.
    pub async fn register(
        &self,
        request: &AgentRegistrationRequest,
    ) -> ServiceResult<(AgentRecord, Certificate)> {
        let validated = self.ra.validate_registration(request)?;
        let certificate = self.ca.issue(&validated.csr).await?;

        let agent = AgentRecord {
            agent_id: validated.name.agent_id.clone(),
            ans_name: validated.name.format(),
            protocol: validated.name.protocol.clone(),
            capability: validated.name.capability.clone(),
            provider: validated.name.provider.clone(),
            version: validated.name.version.to_string(),
            capabilities: request.capabilities.clone(),
            protocol_extensions: request.protocol_extensions.clone(),
            endpoint: request.endpoint.clone(),
            certificate_serial: certificate.serial.clone(),
            certificate_pem: certificate
                .to_pem()
                .map_err(|e| ServiceError::Internal(e.to_string()))?,
            registration_time: Utc::now(),
            last_renewal_time: None,
            is_active: true,
        };

        self.store.put_agent(agent.clone()).await?;

        self.audit.record(
            AuditEvent::new(AuditAction::Registered, Some(agent.agent_id.clone()))
                .with_detail(agent.ans_name.clone()),
        );

        Ok((agent, certificate))
    }

    /// Renew an agent's certificate. The previous certificate remains valid
    /// until its natural expiry; revoking it is an explicit, separate call.
    pub async fn renew(
        &self,
        request: &AgentRenewalRequest,
    ) -> ServiceResult<(AgentRecord, Certificate)> {
        let current = Certificate::from_pem(&request.current_certificate)
            .map_err(|e| ServiceError::SchemaError(format!("currentCertificate: {e}")))?;

        let records = self.store.get_by_id(&request.agent_id).await?;
        if records.is_empty() {
            return Err(ServiceError::NotFound(request.agent_id.clone()));
        }
        let record = records
            .into_iter()
            .find(|r| r.certificate_serial == current.serial)
            .ok_or_else(|| {
                ServiceError::NameMismatch(
                    "currentCertificate does not match any registered certificate for this agent"
                        .to_string(),
                )
            })?;

        let csr = self.ra.validate_renewal(request, &record, &self.ca).await?;
        let certificate = self.ca.issue(&csr).await?;

        let mut updated = record;
        updated.certificate_serial = certificate.serial.clone();
        updated.certificate_pem = certificate
            .to_pem()
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        updated.last_renewal_time = Some(Utc::now());
        self.store.update_agent(updated.clone()).await?;

        self.audit.record(
            AuditEvent::new(AuditAction::Renewed, Some(updated.agent_id.clone()))
                .with_detail(updated.ans_name.clone()),
        );

        Ok((updated, certificate))
    }

    /// Revoke an agent's certificate and deactivate the record.
    ///
    /// `agent_ref` is a bare agent id, or a full ANS name when the id alone
    /// is ambiguous across registered versions. Idempotent: a repeat call
    /// reaches the same state and reports it.
    pub async fn revoke(
        &self,
        agent_ref: &str,
        reason: Option<&str>,
    ) -> ServiceResult<AgentRecord> {
        let records = if agent_ref.contains("://") {
            self.store
                .get_by_ans_name(agent_ref)
                .await?
                .map(|r| vec![r])
                .unwrap_or_default()
        } else {
            self.store.get_by_id(agent_ref).await?
        };

        let record = match records.len() {
            0 => return Err(ServiceError::NotFound(agent_ref.to_string())),
            1 => records.into_iter().next().ok_or_else(|| {
                ServiceError::Internal("candidate list changed underneath".to_string())
            })?,
            _ => {
                let versions: Vec<String> =
                    records.iter().map(|r| r.version.clone()).collect();
                return Err(ServiceError::Ambiguous(format!(
                    "agent id '{agent_ref}' has multiple registrations; pass a full ANS name \
                     (candidate versions: {})",
                    versions.join(", ")
                )));
            }
        };

        let entry = self.ca.revoke(&record.certificate_serial, reason).await?;
        self.store.put_revocation(entry).await?;

        let mut updated = record;
        updated.is_active = false;
        self.store.update_agent(updated.clone()).await?;

        // Cached `good` answers for this serial must die before we return.
        self.responder.invalidate(&updated.certificate_serial).await;
        self.ocsp_client.invalidate(&updated.certificate_serial).await;

        self.audit.record(
            AuditEvent::new(AuditAction::Revoked, Some(updated.agent_id.clone()))
                .with_detail(updated.ans_name.clone()),
        );

        Ok(updated)
    }

    /// Filtered listing in stable `ans_name` ascending order.
    pub async fn list(&self, query: &ListQuery) -> ServiceResult<Vec<AgentRecord>> {
        let filter = AgentFilter {
            protocol: wildcard_to_none(&query.protocol),
            agent_id: None,
            capability: wildcard_to_none(&query.capability),
            provider: wildcard_to_none(&query.provider),
            include_inactive: query.include_inactive,
        };
        let max = query.max.unwrap_or(LIST_DEFAULT).clamp(1, LIST_MAX);
        Ok(self.store.query(&filter, max).await?)
    }

    /// Resolve a name or pattern into a signed endpoint record.
    pub async fn resolve(
        &self,
        ans_name: &str,
        version_range: Option<&str>,
    ) -> ServiceResult<EndpointRecord> {
        let pattern =
            NamePattern::parse(ans_name).map_err(|e| ServiceError::InvalidName(e.to_string()))?;
        let range = version_range.map(parse_range).transpose()?;

        // A pinned version and a range that excludes it cannot both be
        // honored; surface the conflict instead of guessing.
        if let (Some(req), Some(pinned)) = (&range, &pattern.version) {
            if !req.matches(pinned) {
                return Err(ServiceError::Ambiguous(format!(
                    "name pins version {pinned} but version_range '{}' excludes it",
                    version_range.unwrap_or_default()
                )));
            }
        }

        let filter = AgentFilter {
            protocol: pattern.protocol.clone(),
            agent_id: Some(pattern.agent_id.clone()),
            capability: pattern.capability.clone(),
            provider: pattern.provider.clone(),
            include_inactive: false,
        };
        let candidates = self.store.query(&filter, RESOLVE_CANDIDATE_LIMIT).await?;

        let mut survivors: Vec<(Version, AgentRecord)> = candidates
            .into_iter()
            .filter_map(|agent| {
                Version::parse(&agent.version).ok().map(|v| (v, agent))
            })
            .filter(|(version, _)| match (&range, &pattern.version) {
                (Some(req), _) => req.matches(version),
                (None, Some(pinned)) => version == pinned,
                (None, None) => true,
            })
            .collect();

        if survivors.is_empty() {
            return Err(ServiceError::NotFound(ans_name.to_string()));
        }

        // Highest version wins; ties go to the latest registration, then to
        // the lexicographically smallest agent id.
        survivors.sort_by(|(va, a), (vb, b)| {
            vb.cmp(va)
                .then_with(|| b.registration_time.cmp(&a.registration_time))
                .then_with(|| a.agent_id.cmp(&b.agent_id))
        });

        for (_, candidate) in &survivors {
            let certificate = match Certificate::from_pem(&candidate.certificate_pem) {
                Ok(cert) => cert,
                Err(e) => {
                    tracing::warn!(ans_name = %candidate.ans_name, error = %e, "stored certificate unreadable, skipping candidate");
                    continue;
                }
            };

            match self.ocsp_client.check(&certificate).await {
                OcspOutcome::Revoked | OcspOutcome::Unknown => continue,
                // `Unavailable` already recorded the fallback; chain
                // verification below is the fallback path.
                OcspOutcome::Good | OcspOutcome::Unavailable => {}
            }

            if self.ca.verify_chain(&certificate).await.is_err() {
                continue;
            }

            let record = self.sign_endpoint_record(candidate)?;

            self.audit.record(
                AuditEvent::new(AuditAction::Resolved, Some(candidate.agent_id.clone()))
                    .with_detail(candidate.ans_name.clone()),
            );

            return Ok(record);
        }

        Err(ServiceError::NotFound(ans_name.to_string()))
    }

    /// The registry's own certificate (attached to every endpoint record).
    pub fn certificate(&self) -> &Certificate {
        &self.certificate
    }

    fn sign_endpoint_record(&self, agent: &AgentRecord) -> ServiceResult<EndpointRecord> {
        let data = EndpointRecordData {
            agent_id: agent.agent_id.clone(),
            ans_name: agent.ans_name.clone(),
            endpoint: agent.endpoint.clone(),
            capabilities: agent.capabilities.clone(),
            protocol_extensions: agent.protocol_extensions.clone(),
            certificate: agent.certificate_pem.clone(),
            is_active: agent.is_active,
        };

        let payload = serde_json::to_value(&data)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        let signature = crypto::sign_bytes(&self.signing_key, &canonical_bytes(&payload))?;

        Ok(EndpointRecord {
            data,
            signature: hex::encode(signature),
            registry_certificate: self.certificate_pem.clone(),
        })
    }
}

/// Client-side contract: verify an endpoint record against the CA.
///
/// Reconstructs the canonical bytes of `data`, checks the registry
/// signature with the attached certificate's public key, checks the OCSP
/// status of that certificate, and verifies it chains to the CA. A revoked
/// or unknown status is non-trust; an unavailable responder degrades to
/// chain verification alone, as on the resolution path.
pub async fn verify_endpoint_record(
    record: &EndpointRecord,
    ca: &CertificateAuthority,
    ocsp_client: &OcspClient,
) -> ServiceResult<()> {
    let registry_certificate = Certificate::from_pem(&record.registry_certificate)
        .map_err(|e| ServiceError::SignatureInvalid(e.to_string()))?;

    let payload = serde_json::to_value(&record.data)
        .map_err(|e| ServiceError::Internal(e.to_string()))?;
    let signature = hex::decode(&record.signature)
        .map_err(|e| ServiceError::SignatureInvalid(e.to_string()))?;

    crypto::verify_bytes(
        &registry_certificate
            .public_key()
            .map_err(|e| ServiceError::SignatureInvalid(e.to_string()))?,
        &canonical_bytes(&payload),
        &signature,
    )
    .map_err(|_| ServiceError::SignatureInvalid("endpoint record signature".to_string()))?;

    match ocsp_client.check(&registry_certificate).await {
        OcspOutcome::Revoked => return Err(ServiceError::CertificateRevoked),
        OcspOutcome::Unknown => return Err(ServiceError::NotIssuedByThisCa),
        OcspOutcome::Good | OcspOutcome::Unavailable => {}
    }

    ca.verify_chain(&registry_certificate).await?;

    Ok(())
}

fn wildcard_to_none(value: &Option<String>) -> Option<String> {
    value.as_deref().filter(|v| *v != "*").map(str::to_string)
}
