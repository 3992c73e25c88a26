//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: agentns — Secure naming and discovery for AI agents.
//

//! Crypto primitives — RSA keypairs, X.509 CSRs and certificates, and
//! detached signatures.
//!
//! Certificates are real X.509 v3: DER built with `x509-cert`, signed
//! RSA-SHA256 (PKCS#1 v1.5), PEM on the wire. [`Certificate`] and
//! [`CertificateSigningRequest`] are parsed views over the encoded form;
//! the PEM they carry is the source of truth, and signature verification
//! always runs over the DER-encoded to-be-signed body.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use const_oid::db::rfc4519::CN;
use const_oid::db::rfc5912::SHA_256_WITH_RSA_ENCRYPTION;
use rand::rngs::OsRng;
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::pkcs8::{
    DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding,
};
use rsa::sha2::Sha256;
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::{RsaPrivateKey, RsaPublicKey};
use x509_cert::builder::{Builder, CertificateBuilder, Profile, RequestBuilder};
use x509_cert::der::asn1::{GeneralizedTime, PrintableStringRef, UtcTime, Utf8StringRef};
use x509_cert::der::{DecodePem, Encode, EncodePem};
use x509_cert::name::Name;
use x509_cert::request::CertReq;
use x509_cert::serial_number::SerialNumber;
use x509_cert::spki::SubjectPublicKeyInfoOwned;
use x509_cert::time::{Time, Validity};
use x509_cert::Certificate as X509Certificate;

use crate::error::CryptoError;

/// Default RSA modulus size for generated keys.
pub const DEFAULT_RSA_BITS: usize = 2048;

/// The only signature algorithm this service issues.
pub const SIGNATURE_ALGORITHM: &str = "sha256WithRSAEncryption";

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// Generate a fresh RSA private key at the default size.
pub fn generate_keypair() -> Result<RsaPrivateKey, CryptoError> {
    generate_keypair_bits(DEFAULT_RSA_BITS)
}

/// Generate a fresh RSA private key with an explicit modulus size.
pub fn generate_keypair_bits(bits: usize) -> Result<RsaPrivateKey, CryptoError> {
    RsaPrivateKey::new(&mut OsRng, bits).map_err(|e| CryptoError::KeyGeneration(e.to_string()))
}

/// Encode a public key as SPKI PEM.
pub fn public_key_to_pem(key: &RsaPublicKey) -> Result<String, CryptoError> {
    key.to_public_key_pem(LineEnding::LF)
        .map_err(|e| CryptoError::InvalidKey(e.to_string()))
}

/// Decode a public key from SPKI PEM.
pub fn public_key_from_pem(pem: &str) -> Result<RsaPublicKey, CryptoError> {
    RsaPublicKey::from_public_key_pem(pem).map_err(|e| CryptoError::InvalidKey(e.to_string()))
}

/// Encode a private key as PKCS#8 PEM.
pub fn private_key_to_pem(key: &RsaPrivateKey) -> Result<String, CryptoError> {
    let pem = key
        .to_pkcs8_pem(LineEnding::LF)
        .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
    Ok(pem.as_str().to_owned())
}

/// Decode a private key from PKCS#8 PEM.
pub fn private_key_from_pem(pem: &str) -> Result<RsaPrivateKey, CryptoError> {
    RsaPrivateKey::from_pkcs8_pem(pem).map_err(|e| CryptoError::InvalidKey(e.to_string()))
}

// ---------------------------------------------------------------------------
// Detached signatures
// ---------------------------------------------------------------------------

/// Sign arbitrary bytes with PKCS#1 v1.5 / SHA-256.
pub fn sign_bytes(key: &RsaPrivateKey, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let signing_key = SigningKey::<Sha256>::new(key.clone());
    let signature = signing_key
        .try_sign(data)
        .map_err(|e| CryptoError::Signing(e.to_string()))?;
    Ok(signature.to_vec())
}

/// Verify a PKCS#1 v1.5 / SHA-256 signature over arbitrary bytes.
pub fn verify_bytes(key: &RsaPublicKey, data: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
    let verifying_key = VerifyingKey::<Sha256>::new(key.clone());
    let signature =
        Signature::try_from(signature).map_err(|_| CryptoError::SignatureInvalid)?;
    verifying_key
        .verify(data, &signature)
        .map_err(|_| CryptoError::SignatureInvalid)
}

// ---------------------------------------------------------------------------
// Certificate signing requests
// ---------------------------------------------------------------------------

/// A PKCS#10 certificate request: the subject proves possession of the
/// private key matching `public_key_pem` with the request's self-signature.
#[derive(Debug, Clone)]
pub struct CertificateSigningRequest {
    pub common_name: String,
    pub public_key_pem: String,
    pem: String,
}

impl CertificateSigningRequest {
    /// Build and self-sign a request for `common_name`.
    pub fn create(common_name: &str, key: &RsaPrivateKey) -> Result<Self, CryptoError> {
        let subject = parse_cn_name(common_name)?;
        let signer = SigningKey::<Sha256>::new(key.clone());

        let builder = RequestBuilder::new(subject, &signer).map_err(|e| csr_error(e))?;
        let request = builder.build::<Signature>().map_err(|e| csr_error(e))?;

        let pem = request.to_pem(LineEnding::LF).map_err(|e| csr_error(e))?;
        Self::from_pem(&pem)
    }

    /// Parse a PEM request into its field view. Does not verify the
    /// self-signature; call [`CertificateSigningRequest::verify`] for that.
    pub fn from_pem(pem: &str) -> Result<Self, CryptoError> {
        let request = CertReq::from_pem(pem).map_err(|e| csr_error(e))?;

        let common_name = extract_common_name(&request.info.subject, "CSR subject")?;
        let public_key_pem = spki_to_pem(&request.info.public_key)?;

        Ok(Self {
            common_name,
            public_key_pem,
            pem: pem.trim().to_string(),
        })
    }

    /// Check the self-signature over the DER `CertificationRequestInfo`
    /// against the embedded public key.
    pub fn verify(&self) -> Result<(), CryptoError> {
        let request = CertReq::from_pem(&self.pem).map_err(|e| csr_error(e))?;

        if request.algorithm.oid != SHA_256_WITH_RSA_ENCRYPTION {
            return Err(CryptoError::Malformed {
                kind: "CSR",
                reason: format!("unexpected signature algorithm {}", request.algorithm.oid),
            });
        }

        let tbs = request.info.to_der().map_err(|e| csr_error(e))?;
        let signature = request.signature.as_bytes().ok_or(CryptoError::Malformed {
            kind: "CSR",
            reason: "signature BIT STRING has unused bits".to_string(),
        })?;

        verify_bytes(&self.public_key()?, &tbs, signature)
    }

    /// The requester's public key.
    pub fn public_key(&self) -> Result<RsaPublicKey, CryptoError> {
        public_key_from_pem(&self.public_key_pem)
    }

    pub fn to_pem(&self) -> Result<String, CryptoError> {
        Ok(self.pem.clone())
    }
}

// ---------------------------------------------------------------------------
// Certificates
// ---------------------------------------------------------------------------

/// An issued X.509 v3 identity certificate.
///
/// The PEM body is the source of truth; the named fields are a parsed view
/// and never feed back into the encoding. Never mutated after issuance.
#[derive(Debug, Clone)]
pub struct Certificate {
    /// Hex of the DER serial number content bytes.
    pub serial: String,
    pub subject_common_name: String,
    /// Common name of the issuing authority.
    pub issuer: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    pub public_key_pem: String,
    pub signature_algorithm: String,
    pem: String,
}

impl Certificate {
    /// Parse a PEM certificate into its field view.
    pub fn from_pem(pem: &str) -> Result<Self, CryptoError> {
        let certificate = X509Certificate::from_pem(pem).map_err(|e| cert_error(e))?;
        let tbs = &certificate.tbs_certificate;

        Ok(Self {
            serial: hex::encode(tbs.serial_number.as_bytes()),
            subject_common_name: extract_common_name(&tbs.subject, "certificate subject")?,
            issuer: extract_common_name(&tbs.issuer, "certificate issuer")?,
            not_before: chrono_time(tbs.validity.not_before)?,
            not_after: chrono_time(tbs.validity.not_after)?,
            public_key_pem: spki_to_pem(&tbs.subject_public_key_info)?,
            signature_algorithm: SIGNATURE_ALGORITHM.to_string(),
            pem: pem.trim().to_string(),
        })
    }

    /// Verify the issuing signature over the DER `TBSCertificate`.
    pub fn verify_signature(&self, issuer_key: &RsaPublicKey) -> Result<(), CryptoError> {
        let certificate = X509Certificate::from_pem(&self.pem).map_err(|e| cert_error(e))?;

        if certificate.signature_algorithm.oid != SHA_256_WITH_RSA_ENCRYPTION {
            return Err(CryptoError::Malformed {
                kind: "certificate",
                reason: format!(
                    "unexpected signature algorithm {}",
                    certificate.signature_algorithm.oid
                ),
            });
        }

        let tbs = certificate.tbs_certificate.to_der().map_err(|e| cert_error(e))?;
        let signature = certificate
            .signature
            .as_bytes()
            .ok_or(CryptoError::Malformed {
                kind: "certificate",
                reason: "signature BIT STRING has unused bits".to_string(),
            })?;

        verify_bytes(issuer_key, &tbs, signature)
    }

    /// The subject's public key.
    pub fn public_key(&self) -> Result<RsaPublicKey, CryptoError> {
        public_key_from_pem(&self.public_key_pem)
    }

    /// Whether `at` falls inside the validity window.
    pub fn validity_contains(&self, at: DateTime<Utc>) -> bool {
        self.not_before <= at && at <= self.not_after
    }

    pub fn to_pem(&self) -> Result<String, CryptoError> {
        Ok(self.pem.clone())
    }
}

/// Build and sign an X.509 v3 certificate.
///
/// `is_ca` selects the root profile (self-signed, `keyCertSign`) versus the
/// leaf profile (basic constraints CA=false, authority key identifier from
/// the issuer key). The returned [`Certificate`] is re-parsed from its own
/// encoding, so the field view always agrees with what a verifier sees.
#[allow(clippy::too_many_arguments)]
pub fn build_certificate(
    serial_bytes: &[u8],
    subject_common_name: &str,
    issuer_common_name: &str,
    is_ca: bool,
    not_before: DateTime<Utc>,
    not_after: DateTime<Utc>,
    subject_key: &RsaPublicKey,
    issuer_key: &RsaPrivateKey,
) -> Result<Certificate, CryptoError> {
    let serial_number = SerialNumber::new(serial_bytes).map_err(|e| cert_error(e))?;

    let subject = parse_cn_name(subject_common_name)?;
    let profile = if is_ca {
        Profile::Root
    } else {
        Profile::Leaf {
            issuer: parse_cn_name(issuer_common_name)?,
            enable_key_agreement: false,
            enable_key_encipherment: true,
        }
    };

    let validity = Validity {
        not_before: asn1_time(not_before)?,
        not_after: asn1_time(not_after)?,
    };

    let spki_der = subject_key
        .to_public_key_der()
        .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
    let spki = SubjectPublicKeyInfoOwned::try_from(spki_der.as_bytes())
        .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;

    let signer = SigningKey::<Sha256>::new(issuer_key.clone());
    let builder = CertificateBuilder::new(profile, serial_number, validity, subject, spki, &signer)
        .map_err(|e| cert_error(e))?;
    let certificate = builder.build::<Signature>().map_err(|e| cert_error(e))?;

    let pem = certificate.to_pem(LineEnding::LF).map_err(|e| cert_error(e))?;
    Certificate::from_pem(&pem)
}

// ---------------------------------------------------------------------------
// ASN.1 helpers
// ---------------------------------------------------------------------------

fn parse_cn_name(common_name: &str) -> Result<Name, CryptoError> {
    Name::from_str(&format!("CN={common_name}")).map_err(|e| CryptoError::Malformed {
        kind: "distinguished name",
        reason: e.to_string(),
    })
}

/// Pull the CN attribute out of a distinguished name. Our issued subjects
/// are single-RDN `CN=<token>` names, UTF8String-encoded; PrintableString
/// is accepted for externally produced material.
fn extract_common_name(name: &Name, what: &'static str) -> Result<String, CryptoError> {
    for rdn in name.0.iter() {
        for atv in rdn.0.iter() {
            if atv.oid != CN {
                continue;
            }
            if let Ok(s) = atv.value.decode_as::<Utf8StringRef<'_>>() {
                return Ok(s.to_string());
            }
            if let Ok(s) = atv.value.decode_as::<PrintableStringRef<'_>>() {
                return Ok(s.to_string());
            }
            return Err(CryptoError::Malformed {
                kind: what,
                reason: "CN is not a UTF8String or PrintableString".to_string(),
            });
        }
    }
    Err(CryptoError::Malformed {
        kind: what,
        reason: "no CN attribute present".to_string(),
    })
}

fn spki_to_pem(spki: &SubjectPublicKeyInfoOwned) -> Result<String, CryptoError> {
    let der = spki.to_der().map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
    let key = RsaPublicKey::from_public_key_der(&der)
        .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
    public_key_to_pem(&key)
}

/// UTCTime through 2049 as RFC 5280 requires, GeneralizedTime beyond.
fn asn1_time(at: DateTime<Utc>) -> Result<Time, CryptoError> {
    let seconds = u64::try_from(at.timestamp()).map_err(|_| CryptoError::Malformed {
        kind: "certificate validity",
        reason: "timestamp precedes the UNIX epoch".to_string(),
    })?;
    let duration = core::time::Duration::from_secs(seconds);

    if let Ok(utc) = UtcTime::from_unix_duration(duration) {
        return Ok(Time::UtcTime(utc));
    }
    GeneralizedTime::from_unix_duration(duration)
        .map(Time::GeneralTime)
        .map_err(|e| CryptoError::Malformed {
            kind: "certificate validity",
            reason: e.to_string(),
        })
}

fn chrono_time(time: Time) -> Result<DateTime<Utc>, CryptoError> {
    let duration = time.to_unix_duration();
    DateTime::<Utc>::from_timestamp(duration.as_secs() as i64, duration.subsec_nanos()).ok_or(
        CryptoError::Malformed {
            kind: "certificate validity",
            reason: "timestamp out of range".to_string(),
        },
    )
}

fn csr_error(e: impl std::fmt::Display) -> CryptoError {
    CryptoError::Malformed {
        kind: "CSR",
        reason: e.to_string(),
    }
}

fn cert_error(e: impl std::fmt::Display) -> CryptoError {
    CryptoError::Malformed {
        kind: "certificate",
        reason: e.to_string(),
    }
}
