//! Plugin model and capability gating.
//!
//! Every plugin — extractor, detector, or enricher — declares a unique
//! name, a version integer, the capabilities it needs from the host, and
//! the names of plugins it requires to have already run. The registry
//! (`crate::registry`) is the only thing that actually resolves these
//! declarations into a run order.

use serde::{Deserialize, Serialize};

/// Host operating system family a plugin can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OsFamily {
    Any,
    Linux,
    Unix,
    Windows,
    MacOS,
}

/// Network access a plugin needs from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Network {
    NotRequired,
    Offline,
    Online,
}

/// Capabilities a plugin requires from the host environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub os: OsFamily,
    pub network: Network,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            os: OsFamily::Any,
            network: Network::NotRequired,
        }
    }
}

/// The host's policy for what capabilities it is willing to grant. The
/// registry rejects any plugin whose `Capabilities` aren't satisfiable by
/// this policy.
#[derive(Debug, Clone, Copy)]
pub struct HostPolicy {
    pub os: OsFamily,
    pub allow_offline_network: bool,
    pub allow_online_network: bool,
}

impl HostPolicy {
    /// The policy of the machine scoutbom is actually running on, with
    /// network access fully enabled. Callers building a restricted policy
    /// (e.g. an offline scan) should construct `HostPolicy` directly.
    pub fn current() -> Self {
        let os = if cfg!(target_os = "linux") {
            OsFamily::Linux
        } else if cfg!(target_os = "macos") {
            OsFamily::MacOS
        } else if cfg!(target_os = "windows") {
            OsFamily::Windows
        } else if cfg!(unix) {
            OsFamily::Unix
        } else {
            OsFamily::Any
        };
        Self {
            os,
            allow_offline_network: true,
            allow_online_network: true,
        }
    }

    pub fn satisfies(&self, caps: &Capabilities) -> bool {
        let os_ok = match caps.os {
            OsFamily::Any => true,
            OsFamily::Unix => matches!(self.os, OsFamily::Unix | OsFamily::Linux | OsFamily::MacOS),
            other => other == self.os,
        };
        let network_ok = match caps.network {
            Network::NotRequired => true,
            Network::Offline => self.allow_offline_network || self.allow_online_network,
            Network::Online => self.allow_online_network,
        };
        os_ok && network_ok
    }
}

/// Common declarations every plugin kind makes.
pub trait Plugin {
    fn name(&self) -> &str;
    fn version(&self) -> i32;
    fn requirements(&self) -> Capabilities {
        Capabilities::default()
    }
    fn required_plugins(&self) -> &[&str] {
        &[]
    }
}
