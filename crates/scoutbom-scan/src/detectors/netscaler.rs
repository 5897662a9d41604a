//! Detects vulnerable NetScaler ADC/Gateway firmware builds (CVE-2025-7775)
//! from the appliance's own version artifacts, without needing a package
//! manager lockfile.
//!
//! Two artifact shapes carry the version (spec §6):
//! - a `ns-<major.minor>-<build>.gz` firmware archive, whose filename
//!   encodes the version directly;
//! - an `nsversion` file, whose content matches `NS(\d+\.\d+) Build
//!   (\d+\.\d+)`.
//!
//! The archive filename must start with the `ns-` prefix exactly
//! (`ns-14.1-47.47.gz`, not e.g. `thing-ns-14.1-47.47.gz`) — a looser regex
//! that merely searched for `ns-` anywhere in the name previously matched
//! unrelated files that happened to embed the substring (spec §9 redesign
//! flag: the stricter prefix-check variant is canonical).

use crate::fs::ScanFileSystem;
use crate::index::PackageIndex;
use crate::plugin::Detector;
use regex::Regex;
use scoutbom_core::{
    Capabilities, Inventory, Package, PackageVuln, Plugin, VulnerabilityRef,
};
use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;

pub struct NetScalerDetector;

const VULN_ID: &str = "CVE-2025-7775";

fn archive_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^ns-(\d+\.\d+)-(\d+)\.(\d+)\.gz$").unwrap())
}

fn version_file_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"NS(\d+\.\d+) Build (\d+)\.(\d+)").unwrap())
}

/// Per-branch fixed-build threshold for CVE-2025-7775: a build on the named
/// `(major.minor, build major)` branch at or above `build minor` is fixed;
/// anything below it on that same branch is vulnerable. Branches not listed
/// here are outside the advisory's affected range and are never flagged.
const FIXED_BUILDS: &[(&str, u32, u32)] = &[("14.1", 47, 48), ("13.1", 59, 22), ("12.1", 55, 330)];

fn fixed_build_minor(major_minor: &str, build_major: u32) -> Option<u32> {
    FIXED_BUILDS
        .iter()
        .find(|(mm, bmaj, _)| *mm == major_minor && *bmaj == build_major)
        .map(|(_, _, bmin)| *bmin)
}

/// `None` if the version isn't on a tracked branch at all (not applicable to
/// this advisory); `Some(true)` if vulnerable, `Some(false)` if fixed.
fn is_vulnerable(major_minor: &str, build_major: u32, build_minor: u32) -> Option<bool> {
    let threshold = fixed_build_minor(major_minor, build_major)?;
    Some(build_minor < threshold)
}

enum ParsedVersion {
    Archive { major_minor: String, build_major: u32, build_minor: u32 },
}

fn parse_from_filename(name: &str) -> Option<ParsedVersion> {
    let caps = archive_regex().captures(name)?;
    Some(ParsedVersion::Archive {
        major_minor: caps[1].to_string(),
        build_major: caps[2].parse().ok()?,
        build_minor: caps[3].parse().ok()?,
    })
}

fn parse_from_content(content: &str) -> Option<ParsedVersion> {
    let caps = version_file_regex().captures(content)?;
    Some(ParsedVersion::Archive {
        major_minor: caps[1].to_string(),
        build_major: caps[2].parse().ok()?,
        build_minor: caps[3].parse().ok()?,
    })
}

impl Plugin for NetScalerDetector {
    fn name(&self) -> &str {
        "netscaler-detector"
    }

    fn version(&self) -> i32 {
        1
    }

    fn requirements(&self) -> Capabilities {
        Capabilities::default()
    }
}

impl Detector for NetScalerDetector {
    fn wants_file(&self, relative_path: &Path) -> bool {
        match relative_path.file_name().and_then(|n| n.to_str()) {
            Some(name) => archive_regex().is_match(name) || name == "nsversion",
            None => false,
        }
    }

    fn detect(
        &self,
        fs: &dyn ScanFileSystem,
        relative_path: &Path,
        _index: &PackageIndex,
        inventory: &mut Inventory,
    ) -> anyhow::Result<()> {
        let name = relative_path.file_name().and_then(|n| n.to_str()).unwrap_or("");

        let parsed = if name == "nsversion" {
            let bytes = fs.read(relative_path)?;
            let content = String::from_utf8_lossy(&bytes);
            parse_from_content(&content)
        } else {
            parse_from_filename(name)
        };

        let Some(ParsedVersion::Archive { major_minor, build_major, build_minor }) = parsed else {
            return Ok(());
        };

        if is_vulnerable(&major_minor, build_major, build_minor) != Some(true) {
            return Ok(());
        }

        let version = format!("{major_minor}-{build_major}.{build_minor}");
        let id = inventory.next_id();
        let mut plugins = HashSet::new();
        plugins.insert(self.name().to_string());

        inventory.add_package(Package {
            id,
            name: "netscaler-adc".to_string(),
            version: version.clone(),
            purl_type: None,
            locations: vec![relative_path.display().to_string()],
            plugins: plugins.clone(),
            metadata: None,
            source_code: None,
            layer_metadata: None,
            licenses: vec![],
            exploitability_signals: vec![],
        });

        inventory.add_package_vuln(PackageVuln {
            vulnerability: VulnerabilityRef {
                id: VULN_ID.to_string(),
                aliases: vec![],
                withdrawn: false,
                summary: Some("NetScaler ADC/Gateway memory overflow leading to RCE".to_string()),
            },
            package_id: id,
            exploitability_signals: vec![],
            plugins,
        });

        Ok(())
    }
}
