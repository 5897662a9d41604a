//! Core types for scoutbom: the plugin model, capability gating, the plugin
//! registry/resolver, the ecosystem/PURL mapping, and the inventory data
//! model that every other crate in the workspace builds on.

pub mod ecosystem;
pub mod inventory;
pub mod plugin;
pub mod registry;

pub use ecosystem::{build_purl, PurlType, GIT_ECOSYSTEM};
pub use inventory::{
    ExploitabilitySignal, ExploitabilityStatus, Inventory, LayerMetadata, Package,
    PackageId, PackageMetadata, PackageVuln, Secret, SecretKind, SourceCode, VulnerabilityRef,
};
pub use plugin::{Capabilities, HostPolicy, Network, OsFamily, Plugin};
pub use registry::{PluginRegistry, RegistryError};

/// scoutbom's version string, exposed for CLI `--version` output and for
/// tagging on-disk cache records.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
