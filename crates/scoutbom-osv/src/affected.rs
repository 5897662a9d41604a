//! The affectedness predicate (spec §4.8): given an OSV vulnerability and a
//! package, decide whether the package's version falls inside any affected
//! range. Shared verbatim by the local matcher (`matcher.rs`) and by
//! `scoutbom-remediation`, which layers a severity filter on top.

use crate::vuln::{Affected, Event, EventKind, Vulnerability};
use scoutbom_core::Package;
use std::cmp::Ordering;

/// An ecosystem-specific version comparator. `compare` returns `None` when a
/// side fails to parse under this ecosystem's rules, in which case the
/// caller treats the comparison as inconclusive rather than panicking.
pub trait EcosystemComparator: Send + Sync {
    fn compare(&self, a: &str, b: &str) -> Option<Ordering>;
}

/// Strict-ish semver: pads missing minor/patch components with zero before
/// delegating to `semver::Version`, since several ecosystems (Go tags,
/// npm majors-only ranges) omit trailing components.
struct SemverComparator;

impl SemverComparator {
    fn coerce(raw: &str) -> Option<semver::Version> {
        let trimmed = raw.trim().trim_start_matches('v');
        if let Ok(v) = semver::Version::parse(trimmed) {
            return Some(v);
        }
        let parts: Vec<&str> = trimmed.splitn(2, '-').collect();
        let (core, pre) = (parts[0], parts.get(1).copied());
        let mut segments: Vec<&str> = core.split('.').collect();
        while segments.len() < 3 {
            segments.push("0");
        }
        let padded = match pre {
            Some(p) => format!("{}-{}", segments.join("."), p),
            None => segments.join("."),
        };
        semver::Version::parse(&padded).ok()
    }
}

impl EcosystemComparator for SemverComparator {
    fn compare(&self, a: &str, b: &str) -> Option<Ordering> {
        Some(Self::coerce(a)?.cmp(&Self::coerce(b)?))
    }
}

/// Component-wise comparator for ecosystems (Maven, PyPI, RubyGems, Linux
/// distro packages) whose versions aren't semver but are still built from
/// dot/dash-separated numeric-or-alpha runs that compare the way a human
/// expects numerically-first.
struct GenericComponentComparator;

impl GenericComponentComparator {
    fn split(raw: &str) -> Vec<Component> {
        let mut components = Vec::new();
        let mut current = String::new();
        let mut current_is_digit: Option<bool> = None;
        for ch in raw.chars() {
            if ch == '.' || ch == '-' || ch == '+' || ch == '_' || ch == ':' {
                if !current.is_empty() {
                    components.push(Component::new(&current));
                    current.clear();
                }
                current_is_digit = None;
                continue;
            }
            let is_digit = ch.is_ascii_digit();
            if let Some(prev) = current_is_digit {
                if prev != is_digit && !current.is_empty() {
                    components.push(Component::new(&current));
                    current.clear();
                }
            }
            current_is_digit = Some(is_digit);
            current.push(ch);
        }
        if !current.is_empty() {
            components.push(Component::new(&current));
        }
        components
    }
}

enum Component {
    Numeric(u64),
    Text(String),
}

impl Component {
    fn new(s: &str) -> Self {
        match s.parse::<u64>() {
            Ok(n) => Component::Numeric(n),
            Err(_) => Component::Text(s.to_string()),
        }
    }
}

impl EcosystemComparator for GenericComponentComparator {
    fn compare(&self, a: &str, b: &str) -> Option<Ordering> {
        let (left, right) = (Self::split(a), Self::split(b));
        for pair in left.iter().zip(right.iter()) {
            let ord = match pair {
                (Component::Numeric(x), Component::Numeric(y)) => x.cmp(y),
                (Component::Text(x), Component::Text(y)) => x.cmp(y),
                // A missing component compares as lower; a numeric vs. text
                // mismatch (e.g. a pre-release suffix) treats numeric as
                // greater, matching common distro version-compare rules.
                (Component::Numeric(_), Component::Text(_)) => Ordering::Greater,
                (Component::Text(_), Component::Numeric(_)) => Ordering::Less,
            };
            if ord != Ordering::Equal {
                return Some(ord);
            }
        }
        Some(left.len().cmp(&right.len()))
    }
}

/// Look up the comparator for an OSV ecosystem name, or `None` if this
/// implementation has no ordering rule for it (step 1 of §4.8: "if unknown,
/// return false").
fn comparator_for(ecosystem: &str) -> Option<&'static dyn EcosystemComparator> {
    match ecosystem {
        "npm" | "crates.io" | "Go" | "NuGet" | "Hex" | "Pub" => Some(&SemverComparator),
        "Maven" | "PyPI" | "RubyGems" | "Packagist" | "Alpine" | "Debian" | "Red Hat" => {
            Some(&GenericComponentComparator)
        }
        _ => None,
    }
}

#[derive(Clone)]
enum RangeKey {
    NegInf,
    Version(String),
}

fn key_order(a: &RangeKey, b: &RangeKey, cmp: &dyn EcosystemComparator) -> Ordering {
    match (a, b) {
        (RangeKey::NegInf, RangeKey::NegInf) => Ordering::Equal,
        (RangeKey::NegInf, _) => Ordering::Less,
        (_, RangeKey::NegInf) => Ordering::Greater,
        (RangeKey::Version(x), RangeKey::Version(y)) => cmp.compare(x, y).unwrap_or(Ordering::Equal),
    }
}

fn event_key(event: &Event, kind: EventKind, version: &str) -> Option<(RangeKey, EventKind)> {
    let _ = kind;
    if matches!(event.kind_and_version(), Some((EventKind::Introduced, v)) if v == "0") {
        return Some((RangeKey::NegInf, EventKind::Introduced));
    }
    Some((RangeKey::Version(version.to_string()), kind))
}

/// Evaluate one range's events against a package version. Sorts events by
/// version under the ecosystem comparator (stable, so property 6 — stable
/// under reordering of `events` — holds regardless of input order) and
/// applies the exact-hit / predecessor rule from spec §4.8 step 2b.
fn range_affects(events: &[Event], pkg_version: &str, cmp: &dyn EcosystemComparator) -> bool {
    let mut keyed: Vec<(RangeKey, EventKind)> = events
        .iter()
        .filter_map(|e| {
            let (kind, version) = e.kind_and_version()?;
            event_key(e, kind, version)
        })
        .collect();
    keyed.sort_by(|(a, _), (b, _)| key_order(a, b, cmp));

    let pkg_key = RangeKey::Version(pkg_version.to_string());

    // Exact hit: an event whose version equals the package version.
    if let Some((_, kind)) = keyed
        .iter()
        .find(|(k, _)| key_order(k, &pkg_key, cmp) == Ordering::Equal)
    {
        return matches!(kind, EventKind::Introduced | EventKind::LastAffected);
    }

    // Otherwise: affected iff the immediately preceding event (by sorted
    // position) is an `introduced` event.
    let mut predecessor: Option<EventKind> = None;
    for (key, kind) in &keyed {
        if key_order(key, &pkg_key, cmp) == Ordering::Less {
            predecessor = Some(*kind);
        } else {
            break;
        }
    }
    matches!(predecessor, Some(EventKind::Introduced))
}

fn affected_entry_matches(
    affected: &Affected,
    ecosystem: &str,
    name: &str,
    version: &str,
    cmp: &dyn EcosystemComparator,
) -> bool {
    if affected.package.ecosystem != ecosystem || affected.package.name != name {
        return false;
    }

    if affected.versions.iter().any(|v| v == version) {
        return true;
    }

    affected.ranges.iter().any(|range| {
        let applies = range.range_type == "ECOSYSTEM" || (range.range_type == "SEMVER" && ecosystem == "npm");
        applies && range_affects(&range.events, version, cmp)
    })
}

/// Spec §4.8: true iff some `affected` entry matching the package's
/// ecosystem+name has `pkg.version` inside one of its ranges (or listed
/// verbatim in `versions`). Ecosystems with no registered comparator always
/// return false, matching step 1 ("if unknown, return false").
pub fn is_affected(vuln: &Vulnerability, pkg: &Package) -> bool {
    let Some(ecosystem) = pkg.ecosystem() else {
        return false;
    };
    let Some(cmp) = comparator_for(ecosystem) else {
        return false;
    };
    if pkg.version.is_empty() {
        return false;
    }

    vuln.affected
        .iter()
        .any(|a| affected_entry_matches(a, ecosystem, &pkg.name, &pkg.version, cmp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vuln::AffectedPackage;
    use scoutbom_core::PurlType;
    use std::collections::HashSet;

    fn pkg(name: &str, version: &str) -> Package {
        Package {
            id: scoutbom_core::PackageId(0),
            name: name.to_string(),
            version: version.to_string(),
            purl_type: Some(PurlType::Npm),
            locations: vec!["package.json".to_string()],
            plugins: HashSet::new(),
            metadata: None,
            source_code: None,
            layer_metadata: None,
            licenses: vec![],
            exploitability_signals: vec![],
        }
    }

    fn vuln_with_range(events: Vec<Event>) -> Vulnerability {
        Vulnerability {
            id: "GHSA-test".to_string(),
            aliases: vec![],
            affected: vec![Affected {
                package: AffectedPackage {
                    ecosystem: "npm".to_string(),
                    name: "left-pad".to_string(),
                    purl: None,
                },
                ranges: vec![crate::vuln::Range {
                    range_type: "ECOSYSTEM".to_string(),
                    repo: None,
                    events,
                }],
                versions: vec![],
            }],
            severity: vec![],
            withdrawn: None,
            database_specific: serde_json::Value::Null,
        }
    }

    fn introduced(v: &str) -> Event {
        Event {
            introduced: Some(v.to_string()),
            fixed: None,
            last_affected: None,
            limit: None,
        }
    }

    fn fixed(v: &str) -> Event {
        Event {
            introduced: None,
            fixed: Some(v.to_string()),
            last_affected: None,
            limit: None,
        }
    }

    /// Scenario F: boundary behavior around an introduced/fixed pair.
    #[test]
    fn scenario_f_affectedness_boundary() {
        let vuln = vuln_with_range(vec![introduced("1.0.0"), fixed("2.0.0")]);

        assert!(is_affected(&vuln, &pkg("left-pad", "1.0.0")));
        assert!(is_affected(&vuln, &pkg("left-pad", "1.5.0")));
        assert!(!is_affected(&vuln, &pkg("left-pad", "2.0.0")));
        assert!(!is_affected(&vuln, &pkg("left-pad", "0.9.0")));
    }

    #[test]
    fn stable_under_event_reordering() {
        let forward = vuln_with_range(vec![introduced("1.0.0"), fixed("2.0.0")]);
        let reversed = vuln_with_range(vec![fixed("2.0.0"), introduced("1.0.0")]);

        for version in ["0.9.0", "1.0.0", "1.5.0", "2.0.0", "3.0.0"] {
            assert_eq!(
                is_affected(&forward, &pkg("left-pad", version)),
                is_affected(&reversed, &pkg("left-pad", version)),
                "mismatch at {version}"
            );
        }
    }

    #[test]
    fn introduced_zero_means_affected_from_the_start() {
        let vuln = vuln_with_range(vec![introduced("0"), fixed("1.5.0")]);
        assert!(is_affected(&vuln, &pkg("left-pad", "0.0.1")));
        assert!(!is_affected(&vuln, &pkg("left-pad", "1.5.0")));
    }

    #[test]
    fn last_affected_is_inclusive() {
        let vuln = vuln_with_range(vec![introduced("1.0.0"), Event {
            introduced: None,
            fixed: None,
            last_affected: Some("2.5.0".to_string()),
            limit: None,
        }]);
        assert!(is_affected(&vuln, &pkg("left-pad", "2.5.0")));
        assert!(!is_affected(&vuln, &pkg("left-pad", "2.5.1")));
    }

    #[test]
    fn unknown_ecosystem_is_never_affected() {
        // `GIT` (ecosystemless-but-versioned) has no registered comparator,
        // so affectedness must short-circuit to false per step 1, even
        // though the vulnerability has a matching-shaped range.
        let mut vuln = vuln_with_range(vec![introduced("1.0.0")]);
        vuln.affected[0].package.ecosystem = scoutbom_core::GIT_ECOSYSTEM.to_string();
        let mut package = pkg("left-pad", "2.0.0");
        package.purl_type = None;
        assert_eq!(package.ecosystem(), Some(scoutbom_core::GIT_ECOSYSTEM));
        assert!(!is_affected(&vuln, &package));
    }

    #[test]
    fn exact_version_listed_verbatim_matches() {
        let mut vuln = vuln_with_range(vec![]);
        vuln.affected[0].versions = vec!["1.2.3".to_string()];
        assert!(is_affected(&vuln, &pkg("left-pad", "1.2.3")));
        assert!(!is_affected(&vuln, &pkg("left-pad", "1.2.4")));
    }
}
