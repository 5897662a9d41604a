//! CVSS severity scoring for the guided-remediation filter (spec §4.8/§5):
//! "compute the maximum CVSS score across all `severity` entries applicable
//! to the matched affected entries; compare `round(10*score)` to
//! `round(10*threshold)`... unknown severity (`maxScore < 0`) always
//! passes."
//!
//! OSV's `severity[].score` is either a bare number (some non-CVSS scales)
//! or a CVSS vector string (`"CVSS:3.1/AV:N/AC:L/..."`). This module parses
//! both; an entry that is neither is simply not counted toward the max.

use scoutbom_osv::{Severity, Vulnerability};

/// `-1.0` is the sentinel for "no parseable severity entry" per spec §5 —
/// "unknown severity (maxScore < 0) always passes".
pub const UNKNOWN_SEVERITY: f64 = -1.0;

pub fn max_score(vuln: &Vulnerability) -> f64 {
    vuln.severity
        .iter()
        .filter_map(parse_score)
        .fold(UNKNOWN_SEVERITY, f64::max)
}

fn parse_score(severity: &Severity) -> Option<f64> {
    let raw = severity.score.trim();
    if let Ok(n) = raw.parse::<f64>() {
        return Some(n);
    }
    if let Some(vector) = raw.strip_prefix("CVSS:3.0/").or_else(|| raw.strip_prefix("CVSS:3.1/")) {
        return cvss_v3_base_score(vector);
    }
    None
}

/// Compares `round(10*score)` against `round(10*threshold)` as integers,
/// sidestepping float-equality noise, per spec §5. Unknown severity always
/// passes the threshold (the vulnerability is never filtered out for lack
/// of data).
pub fn passes_threshold(vuln: &Vulnerability, threshold: f64) -> bool {
    let score = max_score(vuln);
    if score < 0.0 {
        return true;
    }
    (score * 10.0).round() as i64 >= (threshold * 10.0).round() as i64
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Scope {
    Unchanged,
    Changed,
}

fn metric<'a>(vector: &'a str, key: &str) -> Option<&'a str> {
    vector
        .split('/')
        .find_map(|pair| pair.strip_prefix(key).and_then(|rest| rest.strip_prefix(':')))
}

/// CVSS v3.0/v3.1 base score from a bare metric vector (without the
/// leading `CVSS:3.x/` prefix, already stripped by the caller). Returns
/// `None` if a required metric is missing or unrecognized rather than
/// guessing a default.
fn cvss_v3_base_score(vector: &str) -> Option<f64> {
    let av = match metric(vector, "AV")? {
        "N" => 0.85,
        "A" => 0.62,
        "L" => 0.55,
        "P" => 0.2,
        _ => return None,
    };
    let ac = match metric(vector, "AC")? {
        "L" => 0.77,
        "H" => 0.44,
        _ => return None,
    };
    let scope = match metric(vector, "S")? {
        "U" => Scope::Unchanged,
        "C" => Scope::Changed,
        _ => return None,
    };
    let pr = match (metric(vector, "PR")?, scope) {
        ("N", _) => 0.85,
        ("L", Scope::Unchanged) => 0.62,
        ("L", Scope::Changed) => 0.68,
        ("H", Scope::Unchanged) => 0.27,
        ("H", Scope::Changed) => 0.5,
        _ => return None,
    };
    let ui = match metric(vector, "UI")? {
        "N" => 0.85,
        "R" => 0.62,
        _ => return None,
    };
    let cia = |value: &str| -> Option<f64> {
        match value {
            "N" => Some(0.0),
            "L" => Some(0.22),
            "H" => Some(0.56),
            _ => None,
        }
    };
    let c = cia(metric(vector, "C")?)?;
    let i = cia(metric(vector, "I")?)?;
    let a = cia(metric(vector, "A")?)?;

    let iss = 1.0 - ((1.0 - c) * (1.0 - i) * (1.0 - a));
    let impact = match scope {
        Scope::Unchanged => 6.42 * iss,
        Scope::Changed => 7.52 * (iss - 0.029) - 3.25 * (iss - 0.02).powf(15.0),
    };
    if impact <= 0.0 {
        return Some(0.0);
    }
    let exploitability = 8.22 * av * ac * pr * ui;
    let base = match scope {
        Scope::Unchanged => roundup((impact + exploitability).min(10.0)),
        Scope::Changed => roundup((1.08 * (impact + exploitability)).min(10.0)),
    };
    Some(base)
}

/// CVSS's own "round up to the nearest 0.1" function, used instead of plain
/// float rounding because the standard defines it in terms of a scaled
/// integer to avoid floating-point drift at the boundary.
fn roundup(input: f64) -> f64 {
    let scaled = (input * 100_000.0).round() as i64;
    if scaled % 10_000 == 0 {
        scaled as f64 / 100_000.0
    } else {
        ((scaled / 10_000) + 1) as f64 / 10.0
    }
}
