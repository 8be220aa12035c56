use serde::Serialize;

use crate::document::Document;
use crate::zone::ZoneKey;

/// One row of the layer panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layer {
    pub id: String,
    pub block_type: String,
    pub index: usize,
    pub zones: Vec<LayerZone>,
}

/// A zone owned by a layer, with its own layers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerZone {
    pub key: ZoneKey,
    pub name: String,
    pub layers: Vec<Layer>,
}

impl Document {
    /// Layer tree of the whole document, starting at the root zone.
    pub fn outline(&self) -> Vec<Layer> {
        self.outline_zone(&ZoneKey::root())
    }

    pub fn outline_zone(&self, zone: &ZoneKey) -> Vec<Layer> {
        self.outline_zone_bounded(zone, self.zones.len() + 1)
    }

    fn outline_zone_bounded(&self, zone: &ZoneKey, budget: usize) -> Vec<Layer> {
        if budget == 0 {
            return Vec::new();
        }
        self.zone_content(zone)
            .iter()
            .enumerate()
            .map(|(index, block)| Layer {
                id: block.id().to_string(),
                block_type: block.block_type.clone(),
                index,
                zones: self
                    .zones_of(block.id())
                    .into_iter()
                    .map(|key| LayerZone {
                        key: key.clone(),
                        name: key.zone_name().unwrap_or_default().to_string(),
                        layers: self.outline_zone_bounded(key, budget - 1),
                    })
                    .collect(),
            })
            .collect()
    }
}
