//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: agentns — Secure naming and discovery for AI agents.
//

//! OCSP client — status checks with a short-lived `good` cache and a
//! fallback to synchronous chain verification.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tokio::time::timeout;

use agentns_core::crypto::{self, Certificate};
use agentns_types::ocsp::{OcspCertId, OcspCertStatus, OcspResponse};

use crate::audit::{AuditAction, AuditEvent, AuditSink};
use crate::ca::CertificateAuthority;

use super::{signed_bytes, OcspError, OcspTransport};

/// Default lifetime of cached `good` outcomes.
pub const DEFAULT_CLIENT_TTL_SECS: i64 = 600;

/// Default transport timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 2000;

/// Outcome of a status check from the relying side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OcspOutcome {
    Good,
    Revoked,
    Unknown,
    /// Transport or signature failure — the caller must fall back to
    /// synchronous chain verification. Never treated as trust by itself.
    Unavailable,
}

pub struct OcspClient {
    transport: Arc<dyn OcspTransport>,
    ca: Arc<CertificateAuthority>,
    client_ttl: Duration,
    transport_timeout: StdDuration,
    audit: Arc<dyn AuditSink>,
    /// serial → expiry of a verified `good` response.
    cache: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl OcspClient {
    pub fn new(
        transport: Arc<dyn OcspTransport>,
        ca: Arc<CertificateAuthority>,
        client_ttl_secs: i64,
        transport_timeout_ms: u64,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            transport,
            ca,
            client_ttl: Duration::seconds(client_ttl_secs),
            transport_timeout: StdDuration::from_millis(transport_timeout_ms),
            audit,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Query the responder for a certificate's status.
    ///
    /// `good` outcomes are cached for `min(next_update - now, client TTL)`.
    /// On timeout, transport failure, or a response whose signature does not
    /// verify, returns [`OcspOutcome::Unavailable`] after recording the
    /// fallback through the audit sink.
    pub async fn check(&self, certificate: &Certificate) -> OcspOutcome {
        let serial = certificate.serial.as_str();

        // Cache lookup under a read lock, released before the transport call.
        {
            let cache = self.cache.read().await;
            if let Some(expires) = cache.get(serial) {
                if *expires > Utc::now() {
                    return OcspOutcome::Good;
                }
            }
        }

        let cert_id = OcspCertId {
            issuer_name_hash: self.ca.issuer_name_hash().to_string(),
            serial: serial.to_string(),
        };

        let response = match timeout(self.transport_timeout, self.transport.fetch(&cert_id)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                return self.fallback(certificate, &format!("transport error: {e}"));
            }
            Err(_) => {
                return self.fallback(certificate, "transport timeout");
            }
        };

        if let Err(e) = self.verify_response(&cert_id, &response).await {
            self.audit.record(
                AuditEvent::new(
                    AuditAction::SignatureFailure,
                    Some(certificate.subject_common_name.clone()),
                )
                .with_detail(format!("OCSP response rejected: {e}")),
            );
            return self.fallback(certificate, &format!("response rejected: {e}"));
        }

        match response.status {
            OcspCertStatus::Good => {
                let expires = std::cmp::min(response.next_update, Utc::now() + self.client_ttl);
                self.cache.write().await.insert(serial.to_string(), expires);
                OcspOutcome::Good
            }
            OcspCertStatus::Revoked => OcspOutcome::Revoked,
            // `unknown` is non-trust: the serial is not one the CA issued.
            OcspCertStatus::Unknown => OcspOutcome::Unknown,
        }
    }

    /// Drop a cached `good` entry. Called synchronously from the revocation
    /// path before revoke returns.
    pub async fn invalidate(&self, serial: &str) {
        self.cache.write().await.remove(serial);
    }

    async fn verify_response(
        &self,
        requested: &OcspCertId,
        response: &OcspResponse,
    ) -> Result<(), OcspError> {
        if response.cert_id != *requested {
            return Err(OcspError::Stale("cert_id does not match the query".to_string()));
        }

        let now = Utc::now();
        if response.next_update <= now {
            return Err(OcspError::Stale("next_update is in the past".to_string()));
        }
        if response.produced_at > now + Duration::seconds(60) {
            return Err(OcspError::Stale("produced_at is in the future".to_string()));
        }

        let responder_cert = Certificate::from_pem(&response.responder_certificate)?;
        self.ca
            .verify_chain(&responder_cert)
            .await
            .map_err(|_| OcspError::SignatureInvalid)?;

        let signature =
            hex::decode(&response.signature).map_err(|_| OcspError::SignatureInvalid)?;
        crypto::verify_bytes(
            &responder_cert.public_key()?,
            &signed_bytes(response)?,
            &signature,
        )
        .map_err(|_| OcspError::SignatureInvalid)?;

        Ok(())
    }

    fn fallback(&self, certificate: &Certificate, detail: &str) -> OcspOutcome {
        tracing::warn!(
            serial = %certificate.serial,
            detail,
            "OCSP unavailable, falling back to chain verification"
        );
        self.audit.record(
            AuditEvent::new(
                AuditAction::OcspFallback,
                Some(certificate.subject_common_name.clone()),
            )
            .with_detail(detail.to_string()),
        );
        OcspOutcome::Unavailable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use agentns_core::crypto::{generate_keypair_bits, CertificateSigningRequest};

    use crate::audit::MemoryAuditSink;
    use crate::ocsp::{InProcessTransport, OcspResponder, DEFAULT_RESPONDER_TTL_SECS};

    struct FailingTransport;

    #[async_trait]
    impl OcspTransport for FailingTransport {
        async fn fetch(&self, _cert_id: &OcspCertId) -> Result<OcspResponse, OcspError> {
            Err(OcspError::Transport("connection refused".to_string()))
        }
    }

    struct SlowTransport;

    #[async_trait]
    impl OcspTransport for SlowTransport {
        async fn fetch(&self, _cert_id: &OcspCertId) -> Result<OcspResponse, OcspError> {
            tokio::time::sleep(StdDuration::from_secs(30)).await;
            Err(OcspError::Transport("unreachable".to_string()))
        }
    }

    struct Fixture {
        ca: Arc<CertificateAuthority>,
        responder: Arc<OcspResponder>,
        audit: Arc<MemoryAuditSink>,
        certificate: Certificate,
    }

    async fn fixture() -> Fixture {
        let key = generate_keypair_bits(1024).expect("keygen");
        let ca = Arc::new(
            CertificateAuthority::with_key("AgentNS Test CA", 365, key).expect("bootstrap"),
        );
        let responder = Arc::new(OcspResponder::new(ca.clone(), DEFAULT_RESPONDER_TTL_SECS));

        let agent_key = generate_keypair_bits(1024).expect("keygen");
        let csr = CertificateSigningRequest::create("chat", &agent_key).expect("csr");
        let certificate = ca.issue(&csr).await.expect("issue");

        Fixture {
            ca,
            responder,
            audit: Arc::new(MemoryAuditSink::new()),
            certificate,
        }
    }

    fn client_with(fx: &Fixture, transport: Arc<dyn OcspTransport>) -> OcspClient {
        OcspClient::new(
            transport,
            fx.ca.clone(),
            DEFAULT_CLIENT_TTL_SECS,
            100,
            fx.audit.clone(),
        )
    }

    #[tokio::test]
    async fn test_good_certificate_checks_good() {
        let fx = fixture().await;
        let client = client_with(&fx, Arc::new(InProcessTransport::new(fx.responder.clone())));

        assert_eq!(client.check(&fx.certificate).await, OcspOutcome::Good);
    }

    #[tokio::test]
    async fn test_revoked_certificate_checks_revoked() {
        let fx = fixture().await;
        let client = client_with(&fx, Arc::new(InProcessTransport::new(fx.responder.clone())));

        fx.ca.revoke(&fx.certificate.serial, None).await.expect("revoke");
        fx.responder.invalidate(&fx.certificate.serial).await;
        client.invalidate(&fx.certificate.serial).await;

        assert_eq!(client.check(&fx.certificate).await, OcspOutcome::Revoked);
    }

    #[tokio::test]
    async fn test_transport_failure_falls_back_with_audit() {
        let fx = fixture().await;
        let client = client_with(&fx, Arc::new(FailingTransport));

        assert_eq!(client.check(&fx.certificate).await, OcspOutcome::Unavailable);
        assert_eq!(fx.audit.count(AuditAction::OcspFallback), 1);
    }

    #[tokio::test]
    async fn test_transport_timeout_falls_back() {
        let fx = fixture().await;
        let client = client_with(&fx, Arc::new(SlowTransport));

        assert_eq!(client.check(&fx.certificate).await, OcspOutcome::Unavailable);
        assert_eq!(fx.audit.count(AuditAction::OcspFallback), 1);
    }

    #[tokio::test]
    async fn test_foreign_responder_signature_is_rejected() {
        let fx = fixture().await;

        // A responder backed by a different CA: its responses chain to the
        // wrong root and must not be trusted.
        let foreign_key = generate_keypair_bits(1024).expect("keygen");
        let foreign_ca = Arc::new(
            CertificateAuthority::with_key("Foreign CA", 365, foreign_key).expect("bootstrap"),
        );
        let foreign_responder = Arc::new(OcspResponder::new(foreign_ca, DEFAULT_RESPONDER_TTL_SECS));

        let client = client_with(&fx, Arc::new(InProcessTransport::new(foreign_responder)));

        assert_eq!(client.check(&fx.certificate).await, OcspOutcome::Unavailable);
        assert_eq!(fx.audit.count(AuditAction::SignatureFailure), 1);
        assert_eq!(fx.audit.count(AuditAction::OcspFallback), 1);
    }

    /// Succeeds on the first fetch, then refuses — exercises the cache path.
    struct OneShotTransport {
        inner: InProcessTransport,
        used: std::sync::atomic::AtomicBool,
    }

    #[async_trait]
    impl OcspTransport for OneShotTransport {
        async fn fetch(&self, cert_id: &OcspCertId) -> Result<OcspResponse, OcspError> {
            if self.used.swap(true, std::sync::atomic::Ordering::SeqCst) {
                return Err(OcspError::Transport("responder gone".to_string()));
            }
            self.inner.fetch(cert_id).await
        }
    }

    #[tokio::test]
    async fn test_good_outcome_is_cached() {
        let fx = fixture().await;
        let transport = Arc::new(OneShotTransport {
            inner: InProcessTransport::new(fx.responder.clone()),
            used: std::sync::atomic::AtomicBool::new(false),
        });
        let client = client_with(&fx, transport);

        assert_eq!(client.check(&fx.certificate).await, OcspOutcome::Good);

        // Second check is served from the client cache even though the
        // transport now refuses connections.
        assert_eq!(client.check(&fx.certificate).await, OcspOutcome::Good);
        assert_eq!(fx.audit.count(AuditAction::OcspFallback), 0);
    }

    #[tokio::test]
    async fn test_invalidate_clears_cached_good() {
        let fx = fixture().await;
        let client = client_with(&fx, Arc::new(InProcessTransport::new(fx.responder.clone())));

        assert_eq!(client.check(&fx.certificate).await, OcspOutcome::Good);

        fx.ca.revoke(&fx.certificate.serial, None).await.expect("revoke");
        fx.responder.invalidate(&fx.certificate.serial).await;
        client.invalidate(&fx.certificate.serial).await;

        assert_eq!(client.check(&fx.certificate).await, OcspOutcome::Revoked);
    }
}
