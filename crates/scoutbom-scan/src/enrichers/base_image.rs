//! Base-image attribution enricher (spec §4.7, §9 open question). Packages
//! carrying `LayerMetadata.base_image_index != 0` came from a base layer
//! rather than the application's own layers. Both documented behaviors are
//! implemented and selected by `PipelineConfig::remove_base_image_packages`:
//! annotate-only (default) keeps them in the inventory for downstream
//! filtering, while the stricter mode drops them outright.

use crate::plugin::Enricher;
use scoutbom_core::{Capabilities, Inventory, Network, Plugin};

pub struct BaseImageEnricher {
    remove_base_image_packages: bool,
}

impl BaseImageEnricher {
    pub fn new(remove_base_image_packages: bool) -> Self {
        Self {
            remove_base_image_packages,
        }
    }
}

impl Plugin for BaseImageEnricher {
    fn name(&self) -> &str {
        "base-image-enricher"
    }

    fn version(&self) -> i32 {
        1
    }

    fn requirements(&self) -> Capabilities {
        Capabilities {
            network: Network::NotRequired,
            ..Capabilities::default()
        }
    }
}

impl Enricher for BaseImageEnricher {
    fn enrich(&self, inventory: &mut Inventory) -> anyhow::Result<()> {
        if !self.remove_base_image_packages {
            // Annotate-only mode: mark rather than drop, so a downstream
            // consumer can still filter these out explicitly.
            for package in &mut inventory.packages {
                if let Some(layer) = &mut package.layer_metadata {
                    if layer.base_image_index != 0 {
                        layer.attributed_base_image = true;
                    }
                }
            }
            return Ok(());
        }

        let kept_ids: std::collections::HashSet<_> = inventory
            .packages
            .iter()
            .filter(|p| match p.layer_metadata {
                Some(layer) => layer.base_image_index == 0,
                None => true,
            })
            .map(|p| p.id)
            .collect();

        inventory
            .packages
            .retain(|p| kept_ids.contains(&p.id));
        inventory
            .package_vulns
            .retain(|v| kept_ids.contains(&v.package_id));

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scoutbom_core::{LayerMetadata, Package, PackageId, PurlType};
    use std::collections::HashSet;

    fn pkg(id: u64, base_image_index: i32) -> Package {
        Package {
            id: PackageId(id),
            name: format!("pkg-{id}"),
            version: "1.0.0".to_string(),
            purl_type: Some(PurlType::Apk),
            locations: vec!["/usr/lib".to_string()],
            plugins: HashSet::new(),
            metadata: None,
            source_code: None,
            layer_metadata: Some(LayerMetadata {
                base_image_index,
                attributed_base_image: false,
            }),
            licenses: vec![],
            exploitability_signals: vec![],
        }
    }

    #[test]
    fn default_mode_keeps_every_package() {
        let mut inv = Inventory::new();
        inv.packages = vec![pkg(1, 0), pkg(2, 1)];
        BaseImageEnricher::new(false).enrich(&mut inv).unwrap();
        assert_eq!(inv.packages.len(), 2);
    }

    #[test]
    fn strict_mode_drops_base_image_packages() {
        let mut inv = Inventory::new();
        inv.packages = vec![pkg(1, 0), pkg(2, 1)];
        BaseImageEnricher::new(true).enrich(&mut inv).unwrap();
        assert_eq!(inv.packages.len(), 1);
        assert_eq!(inv.packages[0].id, PackageId(1));
    }

    #[test]
    fn strict_mode_keeps_packages_with_no_layer_metadata() {
        let mut inv = Inventory::new();
        let mut no_layer = pkg(1, 0);
        no_layer.layer_metadata = None;
        inv.packages = vec![no_layer];
        BaseImageEnricher::new(true).enrich(&mut inv).unwrap();
        assert_eq!(inv.packages.len(), 1);
    }

    #[test]
    fn default_mode_annotates_base_image_packages_instead_of_dropping() {
        let mut inv = Inventory::new();
        inv.packages = vec![pkg(1, 0), pkg(2, 1)];
        BaseImageEnricher::new(false).enrich(&mut inv).unwrap();
        assert_eq!(inv.packages.len(), 2);
        assert!(!inv.packages[0].layer_metadata.unwrap().attributed_base_image);
        assert!(inv.packages[1].layer_metadata.unwrap().attributed_base_image);
    }
}
