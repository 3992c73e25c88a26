//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: agentns — Secure naming and discovery for AI agents.
//

//! Core Certificate Authority service.
//!
//! The CA holds its signing key and self-signed certificate in memory, a
//! set of issued serials, and the revocation list keyed by serial. All
//! mutating paths take the single write lock; verification takes read
//! locks only. Chain verification consults the revocation list first so a
//! revoked certificate is rejected without any signature work.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

use chrono::{Duration, Utc};
use regex::Regex;
use rsa::{RsaPrivateKey, RsaPublicKey};
use tokio::sync::RwLock;

use agentns_core::crypto::{self, Certificate, CertificateSigningRequest};
use agentns_core::error::CryptoError;
use agentns_types::agent::RevocationEntry;

use super::error::{CaError, CaResult};

/// Default certificate lifetime.
pub const DEFAULT_CERT_TTL_DAYS: i64 = 365;

const DEFAULT_REVOCATION_REASON: &str = "unspecified";

fn cn_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("CN token regex is valid"))
}

/// Status of a serial as the CA knows it.
#[derive(Debug, Clone)]
pub enum SerialStatus {
    Good,
    Revoked(RevocationEntry),
    Unknown,
}

struct CaState {
    issued: HashSet<String>,
    revoked: HashMap<String, RevocationEntry>,
}

/// The embedded Certificate Authority.
pub struct CertificateAuthority {
    key: RsaPrivateKey,
    public_key: RsaPublicKey,
    certificate: Certificate,
    subject: String,
    issuer_name_hash: String,
    cert_ttl: Duration,
    state: RwLock<CaState>,
    serial_seq: AtomicU64,
}

impl CertificateAuthority {
    /// Generate a CA key and self-signed root certificate.
    pub fn bootstrap(common_name: &str, cert_ttl_days: i64) -> CaResult<Self> {
        let key = crypto::generate_keypair()?;
        Self::with_key(common_name, cert_ttl_days, key)
    }

    /// Bootstrap with an externally supplied key (tests use smaller keys).
    pub fn with_key(common_name: &str, cert_ttl_days: i64, key: RsaPrivateKey) -> CaResult<Self> {
        let public_key = RsaPublicKey::from(&key);
        let cert_ttl = Duration::days(cert_ttl_days);

        let serial_seq = AtomicU64::new(1);
        let now = Utc::now();
        let certificate = crypto::build_certificate(
            &next_serial_bytes(&serial_seq),
            common_name,
            common_name,
            true,
            now,
            now + cert_ttl,
            &public_key,
            &key,
        )?;

        let issuer_name_hash = hash_issuer_name(common_name);

        tracing::info!(subject = common_name, serial = %certificate.serial, "CA bootstrapped");

        Ok(Self {
            key,
            public_key,
            certificate,
            subject: common_name.to_string(),
            issuer_name_hash,
            cert_ttl,
            state: RwLock::new(CaState {
                issued: HashSet::new(),
                revoked: HashMap::new(),
            }),
            serial_seq,
        })
    }

    /// Issue a certificate for a verified CSR.
    ///
    /// The CSR's self-signature is checked here regardless of upstream
    /// validation; the CN must be a non-empty agent-id token.
    pub async fn issue(&self, csr: &CertificateSigningRequest) -> CaResult<Certificate> {
        csr.verify()
            .map_err(|e| CaError::InvalidCsr(format!("self-signature check failed: {e}")))?;

        if !cn_token_re().is_match(&csr.common_name) {
            return Err(CaError::InvalidCsr(format!(
                "common name '{}' is not a valid agent-id token",
                csr.common_name
            )));
        }

        let now = Utc::now();
        let certificate = crypto::build_certificate(
            &next_serial_bytes(&self.serial_seq),
            &csr.common_name,
            &self.subject,
            false,
            now,
            now + self.cert_ttl,
            &csr.public_key()?,
            &self.key,
        )?;

        self.state
            .write()
            .await
            .issued
            .insert(certificate.serial.clone());

        tracing::info!(subject = %csr.common_name, serial = %certificate.serial, "certificate issued");

        Ok(certificate)
    }

    /// Parse, verify, and issue from a PEM CSR.
    pub async fn issue_pem(&self, csr_pem: &str) -> CaResult<Certificate> {
        let csr = CertificateSigningRequest::from_pem(csr_pem)
            .map_err(|e| CaError::InvalidCsr(e.to_string()))?;
        self.issue(&csr).await
    }

    /// Revoke a serial. Idempotent: a second revocation returns the
    /// existing entry and does not overwrite the original reason.
    pub async fn revoke(&self, serial: &str, reason: Option<&str>) -> CaResult<RevocationEntry> {
        let mut state = self.state.write().await;

        if let Some(existing) = state.revoked.get(serial) {
            return Ok(existing.clone());
        }

        let entry = RevocationEntry {
            serial: serial.to_string(),
            revoked_at: Utc::now(),
            reason: reason.unwrap_or(DEFAULT_REVOCATION_REASON).to_string(),
        };
        state.revoked.insert(serial.to_string(), entry.clone());

        tracing::info!(serial = %serial, reason = %entry.reason, "certificate revoked");

        Ok(entry)
    }

    /// Verify that a certificate chains to this CA and is currently valid.
    ///
    /// Order: revocation (fast rejection), issuer + signature, expiry.
    pub async fn verify_chain(&self, certificate: &Certificate) -> CaResult<()> {
        if let Some(entry) = self.state.read().await.revoked.get(&certificate.serial) {
            return Err(CaError::Revoked(entry.serial.clone()));
        }

        if certificate.issuer != self.subject {
            return Err(CaError::NotIssued);
        }
        certificate
            .verify_signature(&self.public_key)
            .map_err(|_| CaError::NotIssued)?;

        if !certificate.validity_contains(Utc::now()) {
            return Err(CaError::Expired);
        }

        Ok(())
    }

    /// Status of a serial for OCSP.
    pub async fn status_of(&self, serial: &str) -> SerialStatus {
        let state = self.state.read().await;
        if let Some(entry) = state.revoked.get(serial) {
            return SerialStatus::Revoked(entry.clone());
        }
        if state.issued.contains(serial) || serial == self.certificate.serial {
            return SerialStatus::Good;
        }
        SerialStatus::Unknown
    }

    /// Preload revocations persisted by a previous run.
    pub async fn load_revocations(&self, entries: Vec<RevocationEntry>) {
        let mut state = self.state.write().await;
        for entry in entries {
            state.revoked.entry(entry.serial.clone()).or_insert(entry);
        }
    }

    /// Sign bytes with the CA key (used by the OCSP responder; no
    /// delegation certificate is configured).
    pub fn sign(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        crypto::sign_bytes(&self.key, data)
    }

    pub fn certificate(&self) -> &Certificate {
        &self.certificate
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Hex SHA-256 of the CA subject name, as used in OCSP cert ids.
    pub fn issuer_name_hash(&self) -> &str {
        &self.issuer_name_hash
    }
}

/// Monotonic sequence plus 64 bits of randomness: collisions require both a
/// counter wrap and a random collision. The 0x01 guard byte keeps the DER
/// INTEGER positive and untrimmed, so the hex form is stable.
fn next_serial_bytes(seq: &AtomicU64) -> Vec<u8> {
    let ordinal = seq.fetch_add(1, Ordering::Relaxed);
    let entropy: u64 = rand::random();

    let mut bytes = Vec::with_capacity(17);
    bytes.push(0x01);
    bytes.extend_from_slice(&ordinal.to_be_bytes());
    bytes.extend_from_slice(&entropy.to_be_bytes());
    bytes
}

fn hash_issuer_name(subject: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(subject.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentns_core::crypto::generate_keypair_bits;

    async fn test_ca() -> CertificateAuthority {
        let key = generate_keypair_bits(1024).expect("keygen");
        CertificateAuthority::with_key("AgentNS Test CA", DEFAULT_CERT_TTL_DAYS, key)
            .expect("bootstrap")
    }

    fn test_csr(cn: &str) -> CertificateSigningRequest {
        let key = generate_keypair_bits(1024).expect("keygen");
        CertificateSigningRequest::create(cn, &key).expect("csr")
    }

    #[tokio::test]
    async fn test_issue_then_verify_chain() {
        let ca = test_ca().await;
        let cert = ca.issue(&test_csr("chat")).await.expect("issue");

        assert_eq!(cert.subject_common_name, "chat");
        assert_eq!(cert.issuer, "AgentNS Test CA");
        ca.verify_chain(&cert).await.expect("fresh certificate verifies");
    }

    #[tokio::test]
    async fn test_issue_rejects_non_token_cn() {
        let ca = test_ca().await;
        let key = generate_keypair_bits(1024).expect("keygen");
        let csr = CertificateSigningRequest::create("bad.name", &key).expect("csr");

        assert!(matches!(ca.issue(&csr).await, Err(CaError::InvalidCsr(_))));
    }

    #[tokio::test]
    async fn test_revoke_then_verify_chain_rejects() {
        let ca = test_ca().await;
        let cert = ca.issue(&test_csr("chat")).await.expect("issue");

        ca.revoke(&cert.serial, Some("keyCompromise")).await.expect("revoke");

        assert!(matches!(
            ca.verify_chain(&cert).await,
            Err(CaError::Revoked(_))
        ));
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent_and_preserves_reason() {
        let ca = test_ca().await;
        let cert = ca.issue(&test_csr("chat")).await.expect("issue");

        let first = ca.revoke(&cert.serial, Some("keyCompromise")).await.expect("revoke");
        let second = ca.revoke(&cert.serial, Some("superseded")).await.expect("revoke again");

        assert_eq!(first.reason, "keyCompromise");
        assert_eq!(second.reason, "keyCompromise");
        assert_eq!(first.revoked_at, second.revoked_at);
    }

    #[tokio::test]
    async fn test_verify_chain_rejects_foreign_certificate() {
        let ca = test_ca().await;
        let other_ca = test_ca().await;

        let cert = other_ca.issue(&test_csr("chat")).await.expect("issue");
        assert!(matches!(ca.verify_chain(&cert).await, Err(CaError::NotIssued)));
    }

    #[tokio::test]
    async fn test_verify_chain_rejects_expired_certificate() {
        let key = generate_keypair_bits(1024).expect("keygen");
        let ca = CertificateAuthority::with_key("AgentNS Test CA", -1, key).expect("bootstrap");

        let cert = ca.issue(&test_csr("chat")).await.expect("issue");
        assert!(matches!(ca.verify_chain(&cert).await, Err(CaError::Expired)));
    }

    #[tokio::test]
    async fn test_verify_chain_accepts_own_root() {
        let ca = test_ca().await;
        ca.verify_chain(ca.certificate()).await.expect("root verifies against itself");
    }

    #[tokio::test]
    async fn test_status_of_tracks_lifecycle() {
        let ca = test_ca().await;
        let cert = ca.issue(&test_csr("chat")).await.expect("issue");

        assert!(matches!(ca.status_of(&cert.serial).await, SerialStatus::Good));
        assert!(matches!(ca.status_of("ffffffffffffffff").await, SerialStatus::Unknown));

        ca.revoke(&cert.serial, None).await.expect("revoke");
        assert!(matches!(ca.status_of(&cert.serial).await, SerialStatus::Revoked(_)));
    }

    #[tokio::test]
    async fn test_serials_are_unique_and_monotonic_prefixed() {
        let ca = test_ca().await;
        let a = ca.issue(&test_csr("one")).await.expect("issue");
        let b = ca.issue(&test_csr("two")).await.expect("issue");

        assert_ne!(a.serial, b.serial);
        // 17 serial bytes: the 0x01 guard, the sequence, the entropy.
        assert_eq!(a.serial.len(), 34);
        assert!(a.serial[2..18] < b.serial[2..18]);
    }
}
