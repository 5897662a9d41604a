//! OSV record shapes. Mirrors the subset of the OSV schema the local matcher
//! needs: enough of `affected[].ranges[].events` to evaluate affectedness,
//! enough of `severity` to let `scoutbom-remediation` threshold on CVSS.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vulnerability {
    pub id: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub affected: Vec<Affected>,
    #[serde(default)]
    pub severity: Vec<Severity>,
    #[serde(default)]
    pub withdrawn: Option<String>,
    #[serde(default)]
    pub database_specific: serde_json::Value,
}

impl Vulnerability {
    pub fn is_withdrawn(&self) -> bool {
        self.withdrawn.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Affected {
    pub package: AffectedPackage,
    #[serde(default)]
    pub ranges: Vec<Range>,
    #[serde(default)]
    pub versions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffectedPackage {
    pub ecosystem: String,
    pub name: String,
    #[serde(default)]
    pub purl: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Range {
    #[serde(rename = "type")]
    pub range_type: String,
    #[serde(default)]
    pub repo: Option<String>,
    pub events: Vec<Event>,
}

/// A single range event. OSV encodes these as `{"introduced": "1.0.0"}` etc;
/// at most one field is set per event, same as the wire schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub introduced: Option<String>,
    #[serde(default)]
    pub fixed: Option<String>,
    #[serde(default)]
    pub last_affected: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Introduced,
    Fixed,
    LastAffected,
    Limit,
}

impl Event {
    /// The version string this event fires at, and which kind it is. An
    /// event with no recognized field set returns `None`; the schema never
    /// produces that in practice but parsers shouldn't panic on it.
    pub fn kind_and_version(&self) -> Option<(EventKind, &str)> {
        if let Some(v) = &self.introduced {
            Some((EventKind::Introduced, v.as_str()))
        } else if let Some(v) = &self.fixed {
            Some((EventKind::Fixed, v.as_str()))
        } else if let Some(v) = &self.last_affected {
            Some((EventKind::LastAffected, v.as_str()))
        } else {
            self.limit.as_deref().map(|v| (EventKind::Limit, v))
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Severity {
    #[serde(rename = "type")]
    pub severity_type: String,
    pub score: String,
}
