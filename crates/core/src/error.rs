//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: agentns — Secure naming and discovery for AI agents.
//

//! Error types for names, version ranges, and crypto primitives.

use thiserror::Error;

/// Errors from parsing or validating ANS names.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("name '{0}' does not match the ANS name grammar")]
    Grammar(String),

    #[error("invalid semantic version in name: {0}")]
    Version(String),
}

/// Errors from parsing version range constraints.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    #[error("version range is empty")]
    Empty,

    #[error("invalid version range '{input}': {reason}")]
    Invalid { input: String, reason: String },
}

/// Errors from key handling, signing, and certificate operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("RSA key generation failed: {0}")]
    KeyGeneration(String),

    #[error("invalid key material: {0}")]
    InvalidKey(String),

    #[error("malformed PEM block: {0}")]
    Pem(String),

    #[error("malformed {kind}: {reason}")]
    Malformed { kind: &'static str, reason: String },

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("signature verification failed")]
    SignatureInvalid,

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
