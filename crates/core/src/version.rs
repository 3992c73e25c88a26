//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: agentns — Secure naming and discovery for AI agents.
//

//! Version range parsing for resolution.
//!
//! The accepted grammar is a whitespace-separated list of constraints,
//! ANDed together:
//!
//! - `^X.Y.Z` — compatible-with (caret), with the 0.x narrowing rules
//! - `~X.Y.Z` — patch-level (tilde)
//! - `>=A`, `>A`, `<=A`, `<A`, `=A` — comparators
//! - `A.B.C` — exact match
//! - `*` — any version
//!
//! Constraints are normalized onto `semver::VersionReq`, whose comparator
//! semantics match this grammar. A bare `A.B.C` is rewritten to `=A.B.C`
//! because `VersionReq` would otherwise treat it as a caret constraint.

use semver::VersionReq;

use crate::error::RangeError;

/// Parse a version range expression into a matchable requirement.
pub fn parse_range(input: &str) -> Result<VersionReq, RangeError> {
    let tokens: Vec<&str> = input.split_whitespace().collect();
    if tokens.is_empty() {
        return Err(RangeError::Empty);
    }

    if tokens == ["*"] {
        return Ok(VersionReq::STAR);
    }

    let normalized: Vec<String> = tokens.iter().map(|t| normalize_constraint(t)).collect();

    VersionReq::parse(&normalized.join(", ")).map_err(|e| RangeError::Invalid {
        input: input.to_string(),
        reason: e.to_string(),
    })
}

/// Rewrite a single constraint token into `VersionReq` syntax.
fn normalize_constraint(token: &str) -> String {
    // An operator prefix keeps its meaning; a bare version means exact.
    if token.starts_with(['^', '~', '>', '<', '=', '*']) {
        token.to_string()
    } else {
        format!("={token}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use semver::Version;

    fn matches(range: &str, version: &str) -> bool {
        parse_range(range)
            .expect("range should parse")
            .matches(&Version::parse(version).expect("version should parse"))
    }

    #[test]
    fn test_caret_range() {
        assert!(matches("^1.0.0", "1.0.0"));
        assert!(matches("^1.0.0", "1.2.3"));
        assert!(!matches("^1.0.0", "2.0.0"));
        assert!(!matches("^1.0.0", "0.9.9"));
    }

    #[test]
    fn test_caret_zero_major_narrows() {
        assert!(matches("^0.4.0", "0.4.9"));
        assert!(!matches("^0.4.0", "0.5.0"));
        // ^0.0.Z is exact.
        assert!(matches("^0.0.3", "0.0.3"));
        assert!(!matches("^0.0.3", "0.0.4"));
    }

    #[test]
    fn test_tilde_range() {
        assert!(matches("~1.2.0", "1.2.9"));
        assert!(!matches("~1.2.0", "1.3.0"));
        assert!(!matches("~1.2.3", "1.2.2"));
    }

    #[test]
    fn test_comparators_anded() {
        assert!(matches(">=1.2.0 <2.0.0", "1.5.0"));
        assert!(!matches(">=1.2.0 <2.0.0", "2.0.0"));
        assert!(!matches(">=1.2.0 <2.0.0", "1.1.9"));
        assert!(matches(">1.0.0", "1.0.1"));
        assert!(!matches(">1.0.0", "1.0.0"));
        assert!(matches("<=1.0.0", "1.0.0"));
    }

    #[test]
    fn test_bare_version_is_exact_not_caret() {
        assert!(matches("1.2.3", "1.2.3"));
        assert!(!matches("1.2.3", "1.2.4"));
        assert!(!matches("1.2.3", "1.9.0"));
        assert!(matches("=1.2.3", "1.2.3"));
        assert!(!matches("=1.2.3", "1.3.0"));
    }

    #[test]
    fn test_star_matches_everything() {
        assert!(matches("*", "0.0.1"));
        assert!(matches("*", "99.99.99"));
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!(parse_range(""), Err(RangeError::Empty));
        assert_eq!(parse_range("   "), Err(RangeError::Empty));
        assert!(matches!(parse_range("not-a-range"), Err(RangeError::Invalid { .. })));
        assert!(matches!(parse_range(">= <"), Err(RangeError::Invalid { .. })));
    }
}
