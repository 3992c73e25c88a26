//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: agentns — Secure naming and discovery for AI agents.
//

//! PostgreSQL storage backend.
//!
//! Uniqueness is enforced by the schema (primary key on `ans_name`, unique
//! index on the name tuple); conflicts surface as `StorageError::Conflict`.
//! Listing order comes from `ORDER BY ans_name ASC`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use agentns_types::agent::{AgentRecord, RevocationEntry};

use super::{AgentFilter, StorageError, StoragePort};

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(Self::new(pool))
    }

    pub async fn run_migrations(&self) -> Result<(), StorageError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(())
    }
}

fn map_sqlx(e: sqlx::Error, conflict_subject: &str) -> StorageError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return StorageError::Conflict(conflict_subject.to_string());
        }
    }
    StorageError::Backend(e.to_string())
}

fn row_to_agent(row: &sqlx::postgres::PgRow) -> AgentRecord {
    AgentRecord {
        agent_id: row.get("agent_id"),
        ans_name: row.get("ans_name"),
        protocol: row.get("protocol"),
        capability: row.get("capability"),
        provider: row.get("provider"),
        version: row.get("version"),
        capabilities: row
            .get::<serde_json::Value, _>("capabilities")
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default(),
        protocol_extensions: row.get("protocol_extensions"),
        endpoint: row.get("endpoint"),
        certificate_serial: row.get("certificate_serial"),
        certificate_pem: row.get("certificate_pem"),
        registration_time: row.get::<DateTime<Utc>, _>("registration_time"),
        last_renewal_time: row.get::<Option<DateTime<Utc>>, _>("last_renewal_time"),
        is_active: row.get("is_active"),
    }
}

#[async_trait]
impl StoragePort for PostgresStore {
    async fn put_agent(&self, agent: AgentRecord) -> Result<(), StorageError> {
        let capabilities = serde_json::Value::from(agent.capabilities.clone());
        sqlx::query(
            "INSERT INTO agents (ans_name, agent_id, protocol, capability, provider, version, \
             capabilities, protocol_extensions, endpoint, certificate_serial, certificate_pem, \
             registration_time, last_renewal_time, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
        )
        .bind(&agent.ans_name)
        .bind(&agent.agent_id)
        .bind(&agent.protocol)
        .bind(&agent.capability)
        .bind(&agent.provider)
        .bind(&agent.version)
        .bind(capabilities)
        .bind(&agent.protocol_extensions)
        .bind(&agent.endpoint)
        .bind(&agent.certificate_serial)
        .bind(&agent.certificate_pem)
        .bind(agent.registration_time)
        .bind(agent.last_renewal_time)
        .bind(agent.is_active)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx(e, &agent.ans_name))?;
        Ok(())
    }

    async fn get_by_id(&self, agent_id: &str) -> Result<Vec<AgentRecord>, StorageError> {
        let rows = sqlx::query("SELECT * FROM agents WHERE agent_id = $1 ORDER BY ans_name ASC")
            .bind(agent_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(rows.iter().map(row_to_agent).collect())
    }

    async fn get_by_ans_name(&self, ans_name: &str) -> Result<Option<AgentRecord>, StorageError> {
        let row = sqlx::query("SELECT * FROM agents WHERE ans_name = $1")
            .bind(ans_name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(row.as_ref().map(row_to_agent))
    }

    async fn query(
        &self,
        filter: &AgentFilter,
        limit: usize,
    ) -> Result<Vec<AgentRecord>, StorageError> {
        let rows = sqlx::query(
            "SELECT * FROM agents \
             WHERE ($1::text IS NULL OR protocol = $1) \
               AND ($2::text IS NULL OR agent_id = $2) \
               AND ($3::text IS NULL OR capability = $3) \
               AND ($4::text IS NULL OR provider = $4) \
               AND ($5::bool OR is_active) \
             ORDER BY ans_name ASC LIMIT $6",
        )
        .bind(&filter.protocol)
        .bind(&filter.agent_id)
        .bind(&filter.capability)
        .bind(&filter.provider)
        .bind(filter.include_inactive)
        .bind(limit.min(i64::MAX as usize) as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(rows.iter().map(row_to_agent).collect())
    }

    async fn update_agent(&self, agent: AgentRecord) -> Result<(), StorageError> {
        let capabilities = serde_json::Value::from(agent.capabilities.clone());
        let result = sqlx::query(
            "UPDATE agents SET capabilities = $2, protocol_extensions = $3, endpoint = $4, \
             certificate_serial = $5, certificate_pem = $6, last_renewal_time = $7, \
             is_active = $8 WHERE ans_name = $1",
        )
        .bind(&agent.ans_name)
        .bind(capabilities)
        .bind(&agent.protocol_extensions)
        .bind(&agent.endpoint)
        .bind(&agent.certificate_serial)
        .bind(&agent.certificate_pem)
        .bind(agent.last_renewal_time)
        .bind(agent.is_active)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Backend(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(agent.ans_name));
        }
        Ok(())
    }

    async fn put_revocation(&self, entry: RevocationEntry) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO revocations (serial, revoked_at, reason) VALUES ($1, $2, $3) \
             ON CONFLICT (serial) DO NOTHING",
        )
        .bind(&entry.serial)
        .bind(entry.revoked_at)
        .bind(&entry.reason)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn get_revocation(
        &self,
        serial: &str,
    ) -> Result<Option<RevocationEntry>, StorageError> {
        let row = sqlx::query("SELECT serial, revoked_at, reason FROM revocations WHERE serial = $1")
            .bind(serial)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(row.map(|r| RevocationEntry {
            serial: r.get("serial"),
            revoked_at: r.get("revoked_at"),
            reason: r.get("reason"),
        }))
    }

    async fn list_revocations(&self) -> Result<Vec<RevocationEntry>, StorageError> {
        let rows =
            sqlx::query("SELECT serial, revoked_at, reason FROM revocations ORDER BY serial ASC")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(rows
            .iter()
            .map(|r| RevocationEntry {
                serial: r.get("serial"),
                revoked_at: r.get("revoked_at"),
                reason: r.get("reason"),
            })
            .collect())
    }
}
