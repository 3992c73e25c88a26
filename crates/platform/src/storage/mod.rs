//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: agentns — Secure naming and discovery for AI agents.
//

//! Abstract storage port for agents and revocations.
//!
//! Contracts every backend must honor:
//! - serializable writes for the agent primary key
//! - a uniqueness constraint over `ans_name` and over the
//!   `(protocol, agent_id, capability, provider, version)` tuple
//! - deterministic `ans_name`-ascending ordering for listing queries

mod memory;
#[cfg(feature = "postgres")]
mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use agentns_types::agent::{AgentRecord, RevocationEntry};

pub use memory::MemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresStore;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("conflicting record already exists: {0}")]
    Conflict(String),

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("backend failure: {0}")]
    Backend(String),
}

/// Exact-match filter over the denormalized name columns. A `None` field
/// matches anything; callers translate the `*` wildcard to `None`.
#[derive(Debug, Clone, Default)]
pub struct AgentFilter {
    pub protocol: Option<String>,
    pub agent_id: Option<String>,
    pub capability: Option<String>,
    pub provider: Option<String>,
    pub include_inactive: bool,
}

impl AgentFilter {
    pub fn matches(&self, agent: &AgentRecord) -> bool {
        fn field(want: &Option<String>, have: &str) -> bool {
            match want.as_deref() {
                None => true,
                Some(w) => w == have,
            }
        }

        (self.include_inactive || agent.is_active)
            && field(&self.protocol, &agent.protocol)
            && field(&self.agent_id, &agent.agent_id)
            && field(&self.capability, &agent.capability)
            && field(&self.provider, &agent.provider)
    }
}

/// CRUD contracts for the agent directory and the revocation log.
#[async_trait]
pub trait StoragePort: Send + Sync {
    /// Insert a new agent. Fails with [`StorageError::Conflict`] when the
    /// `ans_name` or the name tuple is already taken.
    async fn put_agent(&self, agent: AgentRecord) -> Result<(), StorageError>;

    /// All records registered under an agent id (one per version).
    async fn get_by_id(&self, agent_id: &str) -> Result<Vec<AgentRecord>, StorageError>;

    async fn get_by_ans_name(&self, ans_name: &str) -> Result<Option<AgentRecord>, StorageError>;

    /// Filtered listing in stable `ans_name` ascending order.
    async fn query(
        &self,
        filter: &AgentFilter,
        limit: usize,
    ) -> Result<Vec<AgentRecord>, StorageError>;

    /// Replace an existing agent record, keyed by `ans_name`.
    async fn update_agent(&self, agent: AgentRecord) -> Result<(), StorageError>;

    /// Record a revocation. Writing the same serial twice keeps the first
    /// entry.
    async fn put_revocation(&self, entry: RevocationEntry) -> Result<(), StorageError>;

    async fn get_revocation(&self, serial: &str)
        -> Result<Option<RevocationEntry>, StorageError>;

    async fn list_revocations(&self) -> Result<Vec<RevocationEntry>, StorageError>;
}
