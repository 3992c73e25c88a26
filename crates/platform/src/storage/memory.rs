//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: agentns — Secure naming and discovery for AI agents.
//

//! In-memory storage backend — the default and the test backend.
//!
//! Agents live in a `BTreeMap` keyed by `ans_name`, which gives listing
//! queries their deterministic ascending order for free. A secondary index
//! over the name tuple enforces the five-field uniqueness constraint.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use agentns_types::agent::{AgentRecord, RevocationEntry};

use super::{AgentFilter, StorageError, StoragePort};

#[derive(Default)]
struct MemoryInner {
    /// ans_name → record; iteration order is the listing order.
    agents: BTreeMap<String, AgentRecord>,
    /// (protocol, agent_id, capability, provider, version) → ans_name.
    tuple_index: HashMap<(String, String, String, String, String), String>,
    /// serial → revocation, insertion kept sorted for deterministic listing.
    revocations: BTreeMap<String, RevocationEntry>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn tuple_key(agent: &AgentRecord) -> (String, String, String, String, String) {
    (
        agent.protocol.clone(),
        agent.agent_id.clone(),
        agent.capability.clone(),
        agent.provider.clone(),
        agent.version.clone(),
    )
}

#[async_trait]
impl StoragePort for MemoryStore {
    async fn put_agent(&self, agent: AgentRecord) -> Result<(), StorageError> {
        let mut inner = self.inner.write().await;

        if inner.agents.contains_key(&agent.ans_name) {
            return Err(StorageError::Conflict(agent.ans_name));
        }
        let key = tuple_key(&agent);
        if inner.tuple_index.contains_key(&key) {
            return Err(StorageError::Conflict(agent.ans_name));
        }

        inner.tuple_index.insert(key, agent.ans_name.clone());
        inner.agents.insert(agent.ans_name.clone(), agent);
        Ok(())
    }

    async fn get_by_id(&self, agent_id: &str) -> Result<Vec<AgentRecord>, StorageError> {
        let inner = self.inner.read().await;
        Ok(inner
            .agents
            .values()
            .filter(|a| a.agent_id == agent_id)
            .cloned()
            .collect())
    }

    async fn get_by_ans_name(&self, ans_name: &str) -> Result<Option<AgentRecord>, StorageError> {
        let inner = self.inner.read().await;
        Ok(inner.agents.get(ans_name).cloned())
    }

    async fn query(
        &self,
        filter: &AgentFilter,
        limit: usize,
    ) -> Result<Vec<AgentRecord>, StorageError> {
        let inner = self.inner.read().await;
        Ok(inner
            .agents
            .values()
            .filter(|a| filter.matches(a))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn update_agent(&self, agent: AgentRecord) -> Result<(), StorageError> {
        let mut inner = self.inner.write().await;
        if !inner.agents.contains_key(&agent.ans_name) {
            return Err(StorageError::NotFound(agent.ans_name));
        }
        inner.agents.insert(agent.ans_name.clone(), agent);
        Ok(())
    }

    async fn put_revocation(&self, entry: RevocationEntry) -> Result<(), StorageError> {
        let mut inner = self.inner.write().await;
        inner.revocations.entry(entry.serial.clone()).or_insert(entry);
        Ok(())
    }

    async fn get_revocation(
        &self,
        serial: &str,
    ) -> Result<Option<RevocationEntry>, StorageError> {
        let inner = self.inner.read().await;
        Ok(inner.revocations.get(serial).cloned())
    }

    async fn list_revocations(&self) -> Result<Vec<RevocationEntry>, StorageError> {
        let inner = self.inner.read().await;
        Ok(inner.revocations.values().cloned().collect())
    }
}
