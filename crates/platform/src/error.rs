//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: agentns — Secure naming and discovery for AI agents.
//

//! Service-wide error taxonomy.
//!
//! Every failure the platform can surface maps onto one of these kinds; the
//! HTTP layer translates them to status codes and the audit log records the
//! kind string. Lower-level module errors (`CaError`, `AdapterError`,
//! `StorageError`, crypto/name errors) convert into this enum at the service
//! boundary.

use thiserror::Error;

use agentns_core::error::{CryptoError, NameError, RangeError};

use crate::adapters::AdapterError;
use crate::ca::CaError;
use crate::storage::StorageError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("invalid name: {0}")]
    InvalidName(String),

    #[error("schema validation failed: {0}")]
    SchemaError(String),

    #[error("name mismatch: {0}")]
    NameMismatch(String),

    #[error("protocol extensions invalid: {0}")]
    ExtensionInvalid(String),

    #[error("unsupported protocol: {0}")]
    UnsupportedProtocol(String),

    #[error("agent id '{0}' is reserved")]
    ReservedName(String),

    #[error("invalid CSR: {0}")]
    InvalidCsr(String),

    #[error("agent already registered: {0}")]
    AlreadyRegistered(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("ambiguous request: {0}")]
    Ambiguous(String),

    #[error("certificate has expired")]
    CertificateExpired,

    #[error("certificate has been revoked")]
    CertificateRevoked,

    #[error("certificate was not issued by this authority")]
    NotIssuedByThisCa,

    #[error("signature verification failed: {0}")]
    SignatureInvalid(String),

    #[error("OCSP responder unavailable: {0}")]
    OcspUnavailable(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Stable kind identifier for audit events.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::InvalidName(_) => "InvalidName",
            ServiceError::SchemaError(_) => "SchemaError",
            ServiceError::NameMismatch(_) => "NameMismatch",
            ServiceError::ExtensionInvalid(_) => "ExtensionInvalid",
            ServiceError::UnsupportedProtocol(_) => "UnsupportedProtocol",
            ServiceError::ReservedName(_) => "ReservedName",
            ServiceError::InvalidCsr(_) => "InvalidCSR",
            ServiceError::AlreadyRegistered(_) => "AlreadyRegistered",
            ServiceError::NotFound(_) => "NotFound",
            ServiceError::Ambiguous(_) => "Ambiguous",
            ServiceError::CertificateExpired => "CertificateExpired",
            ServiceError::CertificateRevoked => "CertificateRevoked",
            ServiceError::NotIssuedByThisCa => "NotIssuedByThisCA",
            ServiceError::SignatureInvalid(_) => "SignatureInvalid",
            ServiceError::OcspUnavailable(_) => "OCSPUnavailable",
            ServiceError::Storage(_) => "StorageError",
            ServiceError::Internal(_) => "InternalError",
        }
    }

    /// HTTP status code for the API boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::InvalidName(_)
            | ServiceError::SchemaError(_)
            | ServiceError::NameMismatch(_)
            | ServiceError::ExtensionInvalid(_)
            | ServiceError::UnsupportedProtocol(_)
            | ServiceError::ReservedName(_)
            | ServiceError::InvalidCsr(_) => 400,
            ServiceError::AlreadyRegistered(_) | ServiceError::Ambiguous(_) => 409,
            ServiceError::NotFound(_) => 404,
            ServiceError::CertificateExpired | ServiceError::CertificateRevoked => 403,
            ServiceError::NotIssuedByThisCa | ServiceError::SignatureInvalid(_) => 401,
            ServiceError::OcspUnavailable(_) => 503,
            ServiceError::Storage(_) | ServiceError::Internal(_) => 500,
        }
    }
}

impl From<NameError> for ServiceError {
    fn from(e: NameError) -> Self {
        ServiceError::InvalidName(e.to_string())
    }
}

impl From<RangeError> for ServiceError {
    fn from(e: RangeError) -> Self {
        ServiceError::SchemaError(format!("invalid version_range: {e}"))
    }
}

impl From<CryptoError> for ServiceError {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::SignatureInvalid => {
                ServiceError::SignatureInvalid("signature did not verify".to_string())
            }
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

impl From<CaError> for ServiceError {
    fn from(e: CaError) -> Self {
        match e {
            CaError::InvalidCsr(reason) => ServiceError::InvalidCsr(reason),
            CaError::Expired => ServiceError::CertificateExpired,
            CaError::Revoked(_) => ServiceError::CertificateRevoked,
            CaError::NotIssued => ServiceError::NotIssuedByThisCa,
            CaError::Crypto(inner) => ServiceError::from(inner),
        }
    }
}

impl From<AdapterError> for ServiceError {
    fn from(e: AdapterError) -> Self {
        match e {
            AdapterError::Unsupported(protocol) => ServiceError::UnsupportedProtocol(protocol),
            AdapterError::Invalid { .. } => ServiceError::ExtensionInvalid(e.to_string()),
        }
    }
}

impl From<StorageError> for ServiceError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::Conflict(what) => ServiceError::AlreadyRegistered(what),
            StorageError::NotFound(what) => ServiceError::NotFound(what),
            StorageError::Backend(reason) => ServiceError::Storage(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_follow_the_propagation_policy() {
        assert_eq!(ServiceError::SchemaError("x".into()).status_code(), 400);
        assert_eq!(ServiceError::AlreadyRegistered("x".into()).status_code(), 409);
        assert_eq!(ServiceError::NotFound("x".into()).status_code(), 404);
        assert_eq!(ServiceError::Ambiguous("x".into()).status_code(), 409);
        assert_eq!(ServiceError::CertificateRevoked.status_code(), 403);
        assert_eq!(ServiceError::SignatureInvalid("x".into()).status_code(), 401);
        assert_eq!(ServiceError::Storage("x".into()).status_code(), 500);
    }

    #[test]
    fn test_conflict_maps_to_already_registered() {
        let err: ServiceError =
            StorageError::Conflict("a2a://chat.conversation.openai.v1.2.3".into()).into();
        assert_eq!(err.kind(), "AlreadyRegistered");
    }

    #[test]
    fn test_ca_error_mapping() {
        assert_eq!(
            ServiceError::from(CaError::Revoked("01".into())).kind(),
            "CertificateRevoked"
        );
        assert_eq!(ServiceError::from(CaError::NotIssued).kind(), "NotIssuedByThisCA");
    }
}
