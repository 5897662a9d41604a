//! Human-readable scan summary. The `--json` path skips this entirely and
//! serializes the `Inventory` directly.

use crate::scan::ScanOutcome;
use scoutbom_core::Inventory;
use std::collections::HashMap;

pub fn print(outcome: &ScanOutcome) {
    let inv = &outcome.inventory;
    println!("packages:  {}", inv.packages.len());
    println!("secrets:   {}", inv.secrets.len());
    println!("findings:  {}", inv.package_vulns.len());
    println!("remediation candidates (severity/affectedness filtered): {}", outcome.remediation_candidates);

    if !inv.package_vulns.is_empty() {
        println!();
        println!("{:<22} {:<30} {}", "VULNERABILITY", "PACKAGE", "LOCATIONS");
        for finding in &inv.package_vulns {
            let package_label = match inv.package(finding.package_id) {
                Some(p) => format!("{}@{}", p.name, p.version),
                None => "<unknown package>".to_string(),
            };
            let locations = inv
                .package(finding.package_id)
                .map(|p| p.locations.join(", "))
                .unwrap_or_default();
            println!("{:<22} {:<30} {}", finding.vulnerability.id, package_label, locations);
        }
    }

    if !inv.secrets.is_empty() {
        println!();
        println!("{:<12} {}", "SECRET KIND", "LOCATION");
        for secret in &inv.secrets {
            println!("{:<12} {}", secret_kind_label(secret), secret.location);
        }
    }

    let by_ecosystem = packages_by_ecosystem(inv);
    if !by_ecosystem.is_empty() {
        println!();
        println!("packages by ecosystem:");
        let mut ecosystems: Vec<_> = by_ecosystem.into_iter().collect();
        ecosystems.sort_by(|a, b| a.0.cmp(&b.0));
        for (ecosystem, count) in ecosystems {
            println!("  {ecosystem}: {count}");
        }
    }
}

fn secret_kind_label(secret: &scoutbom_core::Secret) -> &'static str {
    match &secret.secret {
        scoutbom_core::SecretKind::BitwardenApiKey { .. } => "bitwarden",
        scoutbom_core::SecretKind::HerokuApiKey { .. } => "heroku",
        scoutbom_core::SecretKind::IbmCloudApiKey { .. } => "ibm-cloud",
        scoutbom_core::SecretKind::NuGetApiKey { .. } => "nuget",
        scoutbom_core::SecretKind::Generic { .. } => "generic",
    }
}

fn packages_by_ecosystem(inv: &Inventory) -> HashMap<&'static str, usize> {
    let mut counts = HashMap::new();
    for package in &inv.packages {
        if let Some(ecosystem) = package.ecosystem() {
            *counts.entry(ecosystem).or_insert(0) += 1;
        }
    }
    counts
}
