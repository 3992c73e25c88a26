//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: agentns — Secure naming and discovery for AI agents.
//

//! Certificate Authority — issuance, revocation, and chain verification.

mod error;
mod service;

pub use error::{CaError, CaResult};
pub use service::{CertificateAuthority, SerialStatus, DEFAULT_CERT_TTL_DAYS};
