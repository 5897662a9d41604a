//! Expiration enricher (spec §4.7): asks a vendor-specific probe whether a
//! detected secret is still live and, if so, how long it has left, writing
//! `Secret::expire_time`/`never_expires`. Built generically over
//! `scoutbom_veles::validator::ExpirationProbe` so the two shipped probes
//! (Heroku, IBM Cloud) and any future vendor share one enricher body.

use crate::plugin::Enricher;
use scoutbom_core::{Capabilities, Inventory, Network, Plugin, Secret};
use scoutbom_veles::validator::ExpirationProbe;

/// A probe applies to a secret kind it recognizes and returns `Unknown` for
/// anything else, matching the vendor validators' own `key_of` rejection
/// behavior.
pub type ExpirationLookup = fn(&Secret) -> ExpirationProbe;

pub struct ExpirationEnricher {
    name: &'static str,
    lookup: ExpirationLookup,
}

impl ExpirationEnricher {
    pub fn new(name: &'static str, lookup: ExpirationLookup) -> Self {
        Self { name, lookup }
    }

    pub fn heroku() -> Self {
        Self::new("heroku-expiration-enricher", scoutbom_veles::vendors::heroku::fetch_expiration)
    }

    pub fn ibm_cloud() -> Self {
        Self::new(
            "ibm-cloud-expiration-enricher",
            scoutbom_veles::vendors::ibm_cloud::fetch_expiration,
        )
    }
}

impl Plugin for ExpirationEnricher {
    fn name(&self) -> &str {
        self.name
    }

    fn version(&self) -> i32 {
        1
    }

    fn requirements(&self) -> Capabilities {
        Capabilities {
            network: Network::Online,
            ..Capabilities::default()
        }
    }
}

impl Enricher for ExpirationEnricher {
    fn enrich(&self, inventory: &mut Inventory) -> anyhow::Result<()> {
        for secret in &mut inventory.secrets {
            match (self.lookup)(secret) {
                ExpirationProbe::Expires(at) => {
                    secret.expire_time = Some(at);
                    secret.never_expires = false;
                }
                ExpirationProbe::Never => {
                    secret.expire_time = None;
                    secret.never_expires = true;
                }
                ExpirationProbe::Unknown => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scoutbom_core::SecretKind;

    fn always(probe: ExpirationProbe) -> ExpirationLookup {
        match probe {
            ExpirationProbe::Never => |_: &Secret| ExpirationProbe::Never,
            ExpirationProbe::Unknown => |_: &Secret| ExpirationProbe::Unknown,
            ExpirationProbe::Expires(_) => |_: &Secret| {
                ExpirationProbe::Expires(time::OffsetDateTime::now_utc())
            },
        }
    }

    #[test]
    fn never_expires_clears_any_previous_timestamp() {
        let mut inv = Inventory::new();
        let mut secret = Secret::new("loc", SecretKind::HerokuApiKey { key: "k".to_string() });
        secret.expire_time = Some(time::OffsetDateTime::now_utc());
        inv.secrets = vec![secret];

        let enricher = ExpirationEnricher::new("test", always(ExpirationProbe::Never));
        enricher.enrich(&mut inv).unwrap();

        assert!(inv.secrets[0].never_expires);
        assert!(inv.secrets[0].expire_time.is_none());
    }

    #[test]
    fn unknown_probe_leaves_secret_untouched() {
        let mut inv = Inventory::new();
        let secret = Secret::new("loc", SecretKind::HerokuApiKey { key: "k".to_string() });
        inv.secrets = vec![secret];

        let enricher = ExpirationEnricher::new("test", always(ExpirationProbe::Unknown));
        enricher.enrich(&mut inv).unwrap();

        assert!(!inv.secrets[0].never_expires);
        assert!(inv.secrets[0].expire_time.is_none());
    }

    #[test]
    fn expires_probe_sets_timestamp_and_clears_never_expires() {
        let mut inv = Inventory::new();
        let mut secret = Secret::new("loc", SecretKind::HerokuApiKey { key: "k".to_string() });
        secret.never_expires = true;
        inv.secrets = vec![secret];

        let enricher = ExpirationEnricher::new(
            "test",
            always(ExpirationProbe::Expires(time::OffsetDateTime::now_utc())),
        );
        enricher.enrich(&mut inv).unwrap();

        assert!(!inv.secrets[0].never_expires);
        assert!(inv.secrets[0].expire_time.is_some());
    }
}
