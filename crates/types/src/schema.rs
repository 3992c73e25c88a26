//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: agentns — Secure naming and discovery for AI agents.
//

//! JSON schema generation for agentns wire types.
//!
//! Uses `schemars` to generate JSON Schema (draft-07) representations of
//! all wire types. The schema map is served at `GET /schemas` and is the
//! published contract the registration authority validates against.

use std::collections::BTreeMap;

use schemars::{schema::RootSchema, schema_for};
use serde_json::Value;

use crate::agent::AgentRecord;
use crate::ocsp::OcspResponse;
use crate::registration::{
    AgentRegistrationRequest, AgentRegistrationResponse, AgentRenewalRequest, RevocationRequest,
};
use crate::resolution::{EndpointRecord, ResolutionRequest};

/// Generate JSON schemas for all published wire types.
///
/// Returns a `BTreeMap` mapping schema name (e.g., `"endpoint_record.v1"`)
/// to the schema serialized as a `serde_json::Value`.
pub fn generate() -> BTreeMap<String, Value> {
    let mut map = BTreeMap::new();
    insert(&mut map, "registration_request.v1", schema_for!(AgentRegistrationRequest));
    insert(&mut map, "registration_response.v1", schema_for!(AgentRegistrationResponse));
    insert(&mut map, "renewal_request.v1", schema_for!(AgentRenewalRequest));
    insert(&mut map, "revocation_request.v1", schema_for!(RevocationRequest));
    insert(&mut map, "resolution_request.v1", schema_for!(ResolutionRequest));
    insert(&mut map, "endpoint_record.v1", schema_for!(EndpointRecord));
    insert(&mut map, "agent_record.v1", schema_for!(AgentRecord));
    insert(&mut map, "ocsp_response.v1", schema_for!(OcspResponse));
    map
}

fn insert(map: &mut BTreeMap<String, Value>, name: &str, schema: RootSchema) {
    map.insert(
        name.to_string(),
        serde_json::to_value(schema).expect("schema serialization failed"),
    );
}
