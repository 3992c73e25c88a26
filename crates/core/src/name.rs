//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: agentns — Secure naming and discovery for AI agents.
//

//! The ANS name grammar.
//!
//! Canonical form:
//! `<protocol>://<agent_id>.<capability>.<provider>.v<MAJOR.MINOR.PATCH>[,<extension>]`
//!
//! Parsing is strict — exactly one `://`, dot-separated token fragments, a
//! `v`-prefixed semver segment, then an optional `,extension` — and
//! round-trips exactly: `parse(format(n)) == n`.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use semver::Version;

use crate::error::NameError;

fn name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?P<protocol>[a-z0-9]+)://(?P<id>[A-Za-z0-9_-]+)\.(?P<cap>[A-Za-z0-9_-]+)\.(?P<prov>[A-Za-z0-9_-]+)\.v(?P<ver>\d+\.\d+\.\d+)(?:,(?P<ext>[^\s]+))?$",
        )
        .expect("name grammar regex is valid")
    })
}

fn pattern_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?P<protocol>[a-z0-9]+|\*)://(?P<id>[A-Za-z0-9_-]+)(?:\.(?P<cap>[A-Za-z0-9_-]+|\*)(?:\.(?P<prov>[A-Za-z0-9_-]+|\*)(?:\.v(?P<ver>\d+\.\d+\.\d+|\*))?)?)?$",
        )
        .expect("name pattern regex is valid")
    })
}

/// An immutable structured agent name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnsName {
    pub protocol: String,
    pub agent_id: String,
    pub capability: String,
    pub provider: String,
    pub version: Version,
    pub extension: Option<String>,
}

impl AnsName {
    /// Parse a canonical ANS name string.
    pub fn parse(input: &str) -> Result<Self, NameError> {
        let caps = name_re()
            .captures(input)
            .ok_or_else(|| NameError::Grammar(input.to_string()))?;

        // The grammar guarantees a \d+\.\d+\.\d+ segment, but semver still
        // enforces numeric limits (no leading-zero components, fits in u64).
        let version =
            Version::parse(&caps["ver"]).map_err(|e| NameError::Version(e.to_string()))?;

        Ok(Self {
            protocol: caps["protocol"].to_string(),
            agent_id: caps["id"].to_string(),
            capability: caps["cap"].to_string(),
            provider: caps["prov"].to_string(),
            version,
            extension: caps.name("ext").map(|m| m.as_str().to_string()),
        })
    }

    /// Render the canonical string form.
    pub fn format(&self) -> String {
        match &self.extension {
            Some(ext) => format!(
                "{}://{}.{}.{}.v{},{}",
                self.protocol, self.agent_id, self.capability, self.provider, self.version, ext
            ),
            None => format!(
                "{}://{}.{}.{}.v{}",
                self.protocol, self.agent_id, self.capability, self.provider, self.version
            ),
        }
    }

    /// Field-wise match against a filter; absent fields and the literal `*`
    /// match anything.
    pub fn matches(&self, filter: &NameFilter) -> bool {
        field_matches(&filter.protocol, &self.protocol)
            && field_matches(&filter.capability, &self.capability)
            && field_matches(&filter.provider, &self.provider)
    }
}

impl fmt::Display for AnsName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

impl FromStr for AnsName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Wildcard filter over the three routing fields of a name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameFilter {
    pub protocol: Option<String>,
    pub capability: Option<String>,
    pub provider: Option<String>,
}

fn field_matches(want: &Option<String>, have: &str) -> bool {
    match want.as_deref() {
        None | Some("*") => true,
        Some(w) => w == have,
    }
}

/// A resolution pattern: a name with trailing fields omitted or wildcarded.
///
/// `agent_id` is always concrete; `capability`, `provider`, and `version`
/// are `None` when omitted or given as `*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamePattern {
    pub protocol: Option<String>,
    pub agent_id: String,
    pub capability: Option<String>,
    pub provider: Option<String>,
    pub version: Option<Version>,
}

impl NamePattern {
    /// Parse a resolution input. A full canonical name is also a valid
    /// pattern (with every field concrete).
    pub fn parse(input: &str) -> Result<Self, NameError> {
        let caps = pattern_re()
            .captures(input)
            .ok_or_else(|| NameError::Grammar(input.to_string()))?;

        let field = |name: &str| -> Option<String> {
            caps.name(name)
                .map(|m| m.as_str())
                .filter(|s| *s != "*")
                .map(str::to_string)
        };

        let version = match caps.name("ver").map(|m| m.as_str()) {
            None | Some("*") => None,
            Some(v) => {
                Some(Version::parse(v).map_err(|e| NameError::Version(e.to_string()))?)
            }
        };

        Ok(Self {
            protocol: field("protocol"),
            agent_id: caps["id"].to_string(),
            capability: field("cap"),
            provider: field("prov"),
            version,
        })
    }

    /// Whether the pattern matches a concrete name, ignoring version.
    pub fn matches_routing(&self, name: &AnsName) -> bool {
        self.agent_id == name.agent_id
            && field_matches(&self.protocol, &name.protocol)
            && field_matches(&self.capability, &name.capability)
            && field_matches(&self.provider, &name.provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_name() {
        let name = AnsName::parse("a2a://chat.conversation.openai.v1.2.3").expect("should parse");
        assert_eq!(name.protocol, "a2a");
        assert_eq!(name.agent_id, "chat");
        assert_eq!(name.capability, "conversation");
        assert_eq!(name.provider, "openai");
        assert_eq!(name.version, Version::new(1, 2, 3));
        assert_eq!(name.extension, None);
    }

    #[test]
    fn test_parse_with_extension() {
        let name =
            AnsName::parse("mcp://indexer.search.anthropic.v0.4.1,beta-eu").expect("should parse");
        assert_eq!(name.extension.as_deref(), Some("beta-eu"));
    }

    #[test]
    fn test_round_trip_is_exact() {
        for input in [
            "a2a://chat.conversation.openai.v1.2.3",
            "mcp://indexer.search.anthropic.v0.4.1,beta-eu",
            "a2a://agent_x.text-gen.acme-labs.v10.0.7",
        ] {
            let name = AnsName::parse(input).expect("should parse");
            assert_eq!(name.format(), input);
            assert_eq!(AnsName::parse(&name.format()).expect("reparse"), name);
        }
    }

    #[test]
    fn test_rejects_malformed_names() {
        for input in [
            "",
            "a2a://chat",
            "a2a://chat.conversation.openai",
            "a2a://chat.conversation.openai.v1.2",
            "a2a://chat.conversation.openai.1.2.3",
            "A2A://chat.conversation.openai.v1.2.3",
            "a2a:/chat.conversation.openai.v1.2.3",
            "a2a://chat.conv ersation.openai.v1.2.3",
            "a2a://ch.at.conversation.openai.v1.2.3.v1.2.3",
            "a2a://chat..openai.v1.2.3",
        ] {
            assert!(AnsName::parse(input).is_err(), "should reject {input:?}");
        }
    }

    #[test]
    fn test_rejects_whitespace_in_extension() {
        assert!(AnsName::parse("a2a://chat.conversation.openai.v1.2.3,ex t").is_err());
    }

    #[test]
    fn test_matches_wildcards() {
        let name = AnsName::parse("a2a://chat.conversation.openai.v1.2.3").expect("should parse");

        assert!(name.matches(&NameFilter::default()));
        assert!(name.matches(&NameFilter {
            protocol: Some("a2a".to_string()),
            capability: Some("*".to_string()),
            provider: None,
        }));
        assert!(!name.matches(&NameFilter {
            protocol: Some("mcp".to_string()),
            ..Default::default()
        }));
        assert!(!name.matches(&NameFilter {
            provider: Some("anthropic".to_string()),
            ..Default::default()
        }));
    }

    #[test]
    fn test_pattern_parses_truncated_forms() {
        let p = NamePattern::parse("a2a://chat").expect("should parse");
        assert_eq!(p.agent_id, "chat");
        assert_eq!(p.capability, None);
        assert_eq!(p.provider, None);
        assert_eq!(p.version, None);

        let p = NamePattern::parse("a2a://chat.conversation.*").expect("should parse");
        assert_eq!(p.capability.as_deref(), Some("conversation"));
        assert_eq!(p.provider, None);

        let p = NamePattern::parse("a2a://chat.conversation.openai.v*").expect("should parse");
        assert_eq!(p.version, None);

        let p = NamePattern::parse("a2a://chat.conversation.openai.v1.2.3").expect("should parse");
        assert_eq!(p.version, Some(Version::new(1, 2, 3)));
    }

    #[test]
    fn test_pattern_routing_match() {
        let name = AnsName::parse("a2a://chat.conversation.openai.v1.2.3").expect("should parse");

        let p = NamePattern::parse("a2a://chat").expect("should parse");
        assert!(p.matches_routing(&name));

        let p = NamePattern::parse("*://chat.conversation.openai").expect("should parse");
        assert!(p.matches_routing(&name));

        let p = NamePattern::parse("a2a://other").expect("should parse");
        assert!(!p.matches_routing(&name));

        let p = NamePattern::parse("a2a://chat.search.openai").expect("should parse");
        assert!(!p.matches_routing(&name));
    }

    #[test]
    fn test_pattern_rejects_garbage() {
        for input in ["", "chat", "a2a://", "a2a://chat.", "a2a://chat.conversation.openai.v1.x.3"] {
            assert!(NamePattern::parse(input).is_err(), "should reject {input:?}");
        }
    }
}
