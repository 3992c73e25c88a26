//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: agentns — Secure naming and discovery for AI agents.
//

//! HTTP layer — Axum router, handlers, shared state, and env config.

pub mod config;
pub mod handlers;
pub mod router;
pub mod state;

pub use config::Config;
pub use router::create_router;
pub use state::AppState;
