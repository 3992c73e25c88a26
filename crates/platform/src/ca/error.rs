//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: agentns — Secure naming and discovery for AI agents.
//

//! CA error types.

use thiserror::Error;

use agentns_core::error::CryptoError;

pub type CaResult<T> = Result<T, CaError>;

#[derive(Error, Debug)]
pub enum CaError {
    #[error("invalid CSR: {0}")]
    InvalidCsr(String),

    #[error("certificate is outside its validity window")]
    Expired,

    #[error("certificate {0} has been revoked")]
    Revoked(String),

    #[error("certificate was not issued by this authority")]
    NotIssued,

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}
