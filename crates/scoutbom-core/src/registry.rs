//! Dependency-respecting plugin registry: resolves a set of plugins into a
//! run order and rejects anything the host can't satisfy.

use crate::plugin::{Capabilities, HostPolicy, Plugin};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("plugin {plugin:?} requires {missing:?}, which is not registered")]
    MissingRequirement { plugin: String, missing: String },
    #[error("plugin {plugin:?} was registered more than once")]
    DuplicateName { plugin: String },
    #[error("plugin {plugin:?} needs capabilities the host policy denies")]
    CapabilityDenied { plugin: String },
    #[error("a dependency cycle includes plugin {plugin:?}")]
    Cycle { plugin: String },
}

struct Entry {
    name: String,
    requires: Vec<String>,
}

/// Collects plugin declarations and resolves them into a run order.
///
/// `register` takes only the declarative parts of a `Plugin` (name and
/// required_plugins) so the registry can be built once from a heterogeneous
/// mix of extractors, detectors, and enrichers without needing a common
/// trait object for all three.
#[derive(Default)]
pub struct PluginRegistry {
    entries: Vec<Entry>,
    seen: HashSet<String>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin, checking it against the host policy immediately.
    /// Dependency existence is checked later, in `resolve`, once every
    /// plugin the caller intends to run has been registered.
    pub fn register<P: Plugin>(&mut self, plugin: &P, host: &HostPolicy) -> Result<(), RegistryError> {
        let name = plugin.name().to_string();
        if !self.seen.insert(name.clone()) {
            return Err(RegistryError::DuplicateName { plugin: name });
        }
        if !host.satisfies(&plugin.requirements()) {
            return Err(RegistryError::CapabilityDenied { plugin: name });
        }
        self.entries.push(Entry {
            name,
            requires: plugin.required_plugins().iter().map(|s| s.to_string()).collect(),
        });
        Ok(())
    }

    /// Resolve the registered plugins into a run order satisfying every
    /// `required_plugins` edge, using Kahn's algorithm and breaking ties
    /// between independently runnable plugins by name so the order is
    /// deterministic across runs.
    pub fn resolve(&self) -> Result<Vec<String>, RegistryError> {
        let names: HashSet<&str> = self.entries.iter().map(|e| e.name.as_str()).collect();
        for entry in &self.entries {
            for req in &entry.requires {
                if !names.contains(req.as_str()) {
                    return Err(RegistryError::MissingRequirement {
                        plugin: entry.name.clone(),
                        missing: req.clone(),
                    });
                }
            }
        }

        let mut indegree: HashMap<&str, usize> = HashMap::new();
        let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();
        for entry in &self.entries {
            indegree.entry(entry.name.as_str()).or_insert(0);
            for req in &entry.requires {
                *indegree.entry(entry.name.as_str()).or_insert(0) += 1;
                dependents.entry(req.as_str()).or_default().push(&entry.name);
            }
        }

        let mut ready: Vec<&str> = indegree
            .iter()
            .filter(|(_, &deg)| deg == 0)
            .map(|(&name, _)| name)
            .collect();
        ready.sort_unstable();

        let mut order = Vec::with_capacity(self.entries.len());
        while let Some(name) = ready.first().copied() {
            ready.remove(0);
            order.push(name.to_string());
            if let Some(children) = dependents.get(name) {
                let mut newly_ready = Vec::new();
                for &child in children {
                    let deg = indegree.get_mut(child).expect("child must be tracked");
                    *deg -= 1;
                    if *deg == 0 {
                        newly_ready.push(child);
                    }
                }
                ready.extend(newly_ready);
                ready.sort_unstable();
                ready.dedup();
            }
        }

        if order.len() != self.entries.len() {
            let stuck = self
                .entries
                .iter()
                .find(|e| !order.contains(&e.name))
                .map(|e| e.name.clone())
                .unwrap_or_default();
            return Err(RegistryError::Cycle { plugin: stuck });
        }

        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::{Network, OsFamily};

    struct Simple {
        name: &'static str,
        requires: &'static [&'static str],
        caps: Capabilities,
    }

    impl Plugin for Simple {
        fn name(&self) -> &str {
            self.name
        }
        fn version(&self) -> i32 {
            1
        }
        fn requirements(&self) -> Capabilities {
            self.caps
        }
        fn required_plugins(&self) -> &[&str] {
            self.requires
        }
    }

    fn plugin(name: &'static str, requires: &'static [&'static str]) -> Simple {
        Simple {
            name,
            requires,
            caps: Capabilities::default(),
        }
    }

    fn host() -> HostPolicy {
        HostPolicy {
            os: OsFamily::Linux,
            allow_offline_network: true,
            allow_online_network: true,
        }
    }

    #[test]
    fn resolves_chain_in_dependency_order() {
        let mut reg = PluginRegistry::new();
        reg.register(&plugin("a", &[]), &host()).unwrap();
        reg.register(&plugin("b", &["a"]), &host()).unwrap();
        reg.register(&plugin("c", &["b"]), &host()).unwrap();

        let order = reg.resolve().unwrap();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn independent_plugins_break_ties_by_name() {
        let mut reg = PluginRegistry::new();
        reg.register(&plugin("zeta", &[]), &host()).unwrap();
        reg.register(&plugin("alpha", &[]), &host()).unwrap();
        reg.register(&plugin("mid", &[]), &host()).unwrap();

        let order = reg.resolve().unwrap();
        assert_eq!(order, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn missing_requirement_is_rejected() {
        let mut reg = PluginRegistry::new();
        reg.register(&plugin("b", &["a"]), &host()).unwrap();
        let err = reg.resolve().unwrap_err();
        assert_eq!(
            err,
            RegistryError::MissingRequirement {
                plugin: "b".to_string(),
                missing: "a".to_string(),
            }
        );
    }

    #[test]
    fn cycle_is_rejected() {
        let mut reg = PluginRegistry::new();
        reg.register(&plugin("a", &["b"]), &host()).unwrap();
        reg.register(&plugin("b", &["a"]), &host()).unwrap();
        let err = reg.resolve().unwrap_err();
        assert!(matches!(err, RegistryError::Cycle { .. }));
    }

    #[test]
    fn capability_denied_when_host_lacks_network() {
        let mut reg = PluginRegistry::new();
        let needs_online = Simple {
            name: "fetcher",
            requires: &[],
            caps: Capabilities {
                os: OsFamily::Any,
                network: Network::Online,
            },
        };
        let offline_host = HostPolicy {
            os: OsFamily::Linux,
            allow_offline_network: true,
            allow_online_network: false,
        };
        let err = reg.register(&needs_online, &offline_host).unwrap_err();
        assert_eq!(
            err,
            RegistryError::CapabilityDenied {
                plugin: "fetcher".to_string()
            }
        );
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut reg = PluginRegistry::new();
        reg.register(&plugin("a", &[]), &host()).unwrap();
        let err = reg.register(&plugin("a", &[]), &host()).unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateName {
                plugin: "a".to_string()
            }
        );
    }

    #[test]
    fn diamond_dependency_resolves_each_plugin_once() {
        let mut reg = PluginRegistry::new();
        reg.register(&plugin("base", &[]), &host()).unwrap();
        reg.register(&plugin("left", &["base"]), &host()).unwrap();
        reg.register(&plugin("right", &["base"]), &host()).unwrap();
        reg.register(&plugin("top", &["left", "right"]), &host()).unwrap();

        let order = reg.resolve().unwrap();
        assert_eq!(order.len(), 4);
        assert_eq!(order[0], "base");
        assert_eq!(order[3], "top");
        assert!(order.iter().position(|n| n == "left").unwrap() < order.iter().position(|n| n == "top").unwrap());
        assert!(order.iter().position(|n| n == "right").unwrap() < order.iter().position(|n| n == "top").unwrap());
    }
}
