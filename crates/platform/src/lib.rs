//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: agentns — Secure naming and discovery for AI agents.
//

//! agentns platform — the trust-and-resolution service crate.
//!
//! This crate provides:
//! - `ca`: the embedded Certificate Authority (issue, revoke, chain verify)
//! - `ocsp`: responder and client with TTL caches and signed responses
//! - `adapters`: per-protocol validation of `protocol_extensions`
//! - `ra`: the Registration Authority policy gate
//! - `registry`: agent storage, listing, resolution, endpoint-record signing
//! - `storage`: the abstract storage port with in-memory and (feature
//!   `postgres`) PostgreSQL backends
//! - `http`: the Axum HTTP layer
//! - `bootstrap`: explicit startup wiring in dependency order

pub mod adapters;
pub mod audit;
pub mod bootstrap;
pub mod ca;
pub mod error;
pub mod http;
pub mod ocsp;
pub mod ra;
pub mod registry;
pub mod storage;

pub use error::ServiceError;
