//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: agentns — Secure naming and discovery for AI agents.
//

//! OCSP responder — signed status responses with a TTL cache.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::RwLock;

use agentns_types::ocsp::{OcspCertId, OcspCertStatus, OcspResponse};

use crate::ca::{CertificateAuthority, SerialStatus};

use super::{signed_bytes, OcspError};

/// Default response lifetime (`next_update - produced_at`).
pub const DEFAULT_RESPONDER_TTL_SECS: i64 = 3600;

/// Signs status responses with the CA key and caches them until
/// `next_update`. Revocation invalidates the cached entry synchronously via
/// [`OcspResponder::invalidate`].
pub struct OcspResponder {
    ca: Arc<CertificateAuthority>,
    ttl: Duration,
    cache: RwLock<HashMap<String, OcspResponse>>,
}

impl OcspResponder {
    pub fn new(ca: Arc<CertificateAuthority>, ttl_secs: i64) -> Self {
        Self {
            ca,
            ttl: Duration::seconds(ttl_secs),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Answer a status query, serving from cache while fresh.
    pub async fn respond(&self, cert_id: &OcspCertId) -> Result<OcspResponse, OcspError> {
        // Cache hit: reuse while inside the response window. The read lock
        // is dropped before any signing work.
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.get(&cert_id.serial) {
                if cached.cert_id == *cert_id && cached.next_update > Utc::now() {
                    return Ok(cached.clone());
                }
            }
        }

        let response = self.build_response(cert_id).await?;

        self.cache
            .write()
            .await
            .insert(cert_id.serial.clone(), response.clone());

        Ok(response)
    }

    /// Drop any cached response for a serial. Called synchronously from the
    /// revocation path so no stale `good` survives a revoke.
    pub async fn invalidate(&self, serial: &str) {
        self.cache.write().await.remove(serial);
    }

    /// The certificate clients verify responses against (the CA root; no
    /// delegation).
    pub fn responder_certificate_pem(&self) -> Result<String, OcspError> {
        Ok(self.ca.certificate().to_pem()?)
    }

    /// The issuer name hash this responder is authoritative for.
    pub fn issuer_name_hash(&self) -> &str {
        self.ca.issuer_name_hash()
    }

    async fn build_response(&self, cert_id: &OcspCertId) -> Result<OcspResponse, OcspError> {
        let now = Utc::now();

        // A query for a foreign issuer is answered, but never with `good`.
        let status = if cert_id.issuer_name_hash != self.ca.issuer_name_hash() {
            SerialStatus::Unknown
        } else {
            self.ca.status_of(&cert_id.serial).await
        };

        let (status, revocation_time, revocation_reason) = match status {
            SerialStatus::Good => (OcspCertStatus::Good, None, None),
            SerialStatus::Revoked(entry) => (
                OcspCertStatus::Revoked,
                Some(entry.revoked_at),
                Some(entry.reason),
            ),
            SerialStatus::Unknown => (OcspCertStatus::Unknown, None, None),
        };

        let mut response = OcspResponse {
            cert_id: cert_id.clone(),
            status,
            produced_at: now,
            next_update: now + self.ttl,
            revocation_time,
            revocation_reason,
            signature: String::new(),
            responder_certificate: self.responder_certificate_pem()?,
        };

        let signature = self.ca.sign(&signed_bytes(&response)?)?;
        response.signature = hex::encode(signature);

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentns_core::crypto::{generate_keypair_bits, CertificateSigningRequest};
    use agentns_core::crypto::Certificate;

    async fn responder_with_cert() -> (Arc<CertificateAuthority>, OcspResponder, Certificate) {
        let key = generate_keypair_bits(1024).expect("keygen");
        let ca = Arc::new(
            CertificateAuthority::with_key("AgentNS Test CA", 365, key).expect("bootstrap"),
        );

        let agent_key = generate_keypair_bits(1024).expect("keygen");
        let csr = CertificateSigningRequest::create("chat", &agent_key).expect("csr");
        let cert = ca.issue(&csr).await.expect("issue");

        let responder = OcspResponder::new(ca.clone(), DEFAULT_RESPONDER_TTL_SECS);
        (ca, responder, cert)
    }

    fn cert_id(responder: &OcspResponder, serial: &str) -> OcspCertId {
        OcspCertId {
            issuer_name_hash: responder.issuer_name_hash().to_string(),
            serial: serial.to_string(),
        }
    }

    #[tokio::test]
    async fn test_good_status_for_issued_serial() {
        let (_ca, responder, cert) = responder_with_cert().await;

        let response = responder.respond(&cert_id(&responder, &cert.serial)).await.expect("respond");
        assert_eq!(response.status, OcspCertStatus::Good);
        assert!(response.next_update > response.produced_at);
    }

    #[tokio::test]
    async fn test_unknown_status_for_unissued_serial() {
        let (_ca, responder, _cert) = responder_with_cert().await;

        let response = responder
            .respond(&cert_id(&responder, "ffffffffffffffffffffffffffffffff"))
            .await
            .expect("respond");
        assert_eq!(response.status, OcspCertStatus::Unknown);
    }

    #[tokio::test]
    async fn test_unknown_for_foreign_issuer_hash() {
        let (_ca, responder, cert) = responder_with_cert().await;

        let foreign = OcspCertId {
            issuer_name_hash: "00".repeat(32),
            serial: cert.serial.clone(),
        };
        let response = responder.respond(&foreign).await.expect("respond");
        assert_eq!(response.status, OcspCertStatus::Unknown);
    }

    #[tokio::test]
    async fn test_response_signature_verifies_against_responder_certificate() {
        let (_ca, responder, cert) = responder_with_cert().await;

        let response = responder.respond(&cert_id(&responder, &cert.serial)).await.expect("respond");

        let responder_cert =
            Certificate::from_pem(&response.responder_certificate).expect("parse responder cert");
        let signature = hex::decode(&response.signature).expect("hex signature");
        agentns_core::crypto::verify_bytes(
            &responder_cert.public_key().expect("public key"),
            &super::signed_bytes(&response).expect("signed bytes"),
            &signature,
        )
        .expect("responder signature verifies");
    }

    #[tokio::test]
    async fn test_cached_response_is_reused() {
        let (_ca, responder, cert) = responder_with_cert().await;
        let id = cert_id(&responder, &cert.serial);

        let first = responder.respond(&id).await.expect("respond");
        let second = responder.respond(&id).await.expect("respond");
        assert_eq!(first.produced_at, second.produced_at);
        assert_eq!(first.signature, second.signature);
    }

    #[tokio::test]
    async fn test_revocation_invalidates_cached_good() {
        let (ca, responder, cert) = responder_with_cert().await;
        let id = cert_id(&responder, &cert.serial);

        let before = responder.respond(&id).await.expect("respond");
        assert_eq!(before.status, OcspCertStatus::Good);

        // Revoke, then invalidate synchronously — the next response must
        // report revoked within the same step.
        ca.revoke(&cert.serial, Some("keyCompromise")).await.expect("revoke");
        responder.invalidate(&cert.serial).await;

        let after = responder.respond(&id).await.expect("respond");
        assert_eq!(after.status, OcspCertStatus::Revoked);
        assert_eq!(after.revocation_reason.as_deref(), Some("keyCompromise"));
        assert!(after.revocation_time.is_some());
    }
}
