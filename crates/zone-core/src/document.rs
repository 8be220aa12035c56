use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::selector::ItemSelector;
use crate::zone::ZoneKey;

pub type Attrs = BTreeMap<String, Value>;
pub type ZoneMap = BTreeMap<ZoneKey, Vec<Block>>;

/// Block props: the mandatory `id` plus whatever the block type defines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Props {
    pub id: String,
    #[serde(flatten)]
    pub fields: Attrs,
}

impl Props {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Attrs::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "type")]
    pub block_type: String,
    pub props: Props,
    /// Detached zone contents keyed by zone name. Placed blocks keep their
    /// zones in [`Document::zones`] instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zones: Option<BTreeMap<String, Vec<Block>>>,
}

impl Block {
    pub fn new(block_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            block_type: block_type.into(),
            props: Props::new(id),
            zones: None,
        }
    }

    pub fn prop(mut self, key: impl Into<String>, value: Value) -> Self {
        self.props.fields.insert(key.into(), value);
        self
    }

    pub fn zone(mut self, name: impl Into<String>, blocks: Vec<Block>) -> Self {
        self.zones
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), blocks);
        self
    }

    pub fn id(&self) -> &str {
        &self.props.id
    }
}

/// The editable document: root props, the root zone and every nested zone,
/// flattened by zone key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Document {
    #[serde(default)]
    pub root: Attrs,
    #[serde(default)]
    pub content: Vec<Block>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub zones: ZoneMap,
}

impl Document {
    pub fn new(content: Vec<Block>) -> Self {
        Self {
            root: Attrs::new(),
            content,
            zones: ZoneMap::new(),
        }
    }

    /// Blocks in `zone`. Zones that never received an item read as empty.
    pub fn zone_content(&self, zone: &ZoneKey) -> &[Block] {
        if zone.is_root() {
            return &self.content;
        }
        self.zones.get(zone).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether the zone's owning block is placed in the document.
    pub fn zone_is_addressable(&self, zone: &ZoneKey) -> bool {
        match zone.parent_id() {
            None => true,
            Some(parent_id) => self.contains_block(parent_id),
        }
    }

    pub fn find_block(&self, id: &str) -> Option<ItemSelector> {
        if let Some(index) = self.content.iter().position(|b| b.id() == id) {
            return Some(ItemSelector::root(index));
        }
        self.zones.iter().find_map(|(zone, blocks)| {
            blocks
                .iter()
                .position(|b| b.id() == id)
                .map(|index| ItemSelector::in_zone(zone.clone(), index))
        })
    }

    pub fn block(&self, id: &str) -> Option<&Block> {
        let selector = self.find_block(id)?;
        self.zone_content(&selector.zone).get(selector.index)
    }

    pub fn contains_block(&self, id: &str) -> bool {
        self.blocks().any(|b| b.id() == id)
    }

    /// Every placed block, root zone first, then nested zones in key order.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.content
            .iter()
            .chain(self.zones.values().flat_map(|blocks| blocks.iter()))
    }

    pub fn block_ids(&self) -> HashSet<&str> {
        self.blocks().map(Block::id).collect()
    }

    pub fn block_count(&self) -> usize {
        self.content.len() + self.zones.values().map(Vec::len).sum::<usize>()
    }

    /// Zone keys owned directly by `parent_id`.
    pub fn zones_of(&self, parent_id: &str) -> Vec<&ZoneKey> {
        self.zones
            .keys()
            .filter(|key| key.parent_id() == Some(parent_id))
            .collect()
    }

    /// Zone keys owned by `block_id` or any block nested below it.
    pub fn descendant_zones(&self, block_id: &str) -> Vec<ZoneKey> {
        let mut out: Vec<ZoneKey> = Vec::new();
        let mut pending = vec![block_id.to_string()];
        while let Some(id) = pending.pop() {
            for key in self.zones_of(&id) {
                if out.contains(key) {
                    continue;
                }
                out.push(key.clone());
                pending.extend(self.zone_content(key).iter().map(|b| b.id().to_string()));
            }
        }
        out
    }

    /// Ids of `block_id` and every block nested below it, whether or not the
    /// zones in between have ever held an item.
    pub fn subtree_ids(&self, block_id: &str) -> HashSet<String> {
        let mut out = HashSet::new();
        let mut pending = vec![block_id.to_string()];
        while let Some(id) = pending.pop() {
            if !out.insert(id.clone()) {
                continue;
            }
            for key in self.zones_of(&id) {
                pending.extend(self.zone_content(key).iter().map(|b| b.id().to_string()));
            }
        }
        out
    }

    /// `zone` followed by each enclosing zone, ending at the root zone. Stops
    /// early when an owning block is not placed.
    pub fn zone_path(&self, zone: &ZoneKey) -> Vec<ZoneKey> {
        let mut path = vec![zone.clone()];
        let mut current = zone.clone();
        // Each step climbs one placed block, so the walk is bounded by the zone count.
        for _ in 0..=self.zones.len() {
            let Some(parent_id) = current.parent_id() else {
                return path;
            };
            let Some(location) = self.find_block(parent_id) else {
                return path;
            };
            if path.contains(&location.zone) {
                return path;
            }
            path.push(location.zone.clone());
            current = location.zone;
        }
        path
    }

    /// Nesting depth of a zone; the root zone is 0.
    pub fn zone_depth(&self, zone: &ZoneKey) -> usize {
        self.zone_path(zone).len().saturating_sub(1)
    }

    /// Move inline `zones` of placed blocks into the flattened zone map.
    pub fn hoist_inline_zones(&mut self) {
        let mut pending: Vec<(String, BTreeMap<String, Vec<Block>>)> = Vec::new();
        for block in self
            .content
            .iter_mut()
            .chain(self.zones.values_mut().flat_map(|blocks| blocks.iter_mut()))
        {
            if let Some(zones) = block.zones.take() {
                pending.push((block.id().to_string(), zones));
            }
        }

        while let Some((parent_id, zones)) = pending.pop() {
            for (name, mut blocks) in zones {
                for block in blocks.iter_mut() {
                    if let Some(nested) = block.zones.take() {
                        pending.push((block.id().to_string(), nested));
                    }
                }
                self.zones.insert(ZoneKey::of(&parent_id, &name), blocks);
            }
        }
    }

    /// A placed block with every zone it owns inlined, recursively.
    pub fn detached_block(&self, id: &str) -> Option<Block> {
        let block = self.block(id)?;
        Some(self.inline_zones(block.clone(), &mut HashSet::new()))
    }

    /// A block already on the current branch is emitted without zones, so a
    /// cyclic zone map cannot recurse forever.
    fn inline_zones(&self, mut block: Block, visited: &mut HashSet<String>) -> Block {
        if !visited.insert(block.id().to_string()) {
            return block;
        }
        let owned = self.zones_of(block.id());
        if owned.is_empty() {
            visited.remove(block.id());
            return block;
        }
        let mut zones = BTreeMap::new();
        for key in owned {
            let Some(name) = key.zone_name() else {
                continue;
            };
            let blocks = self
                .zone_content(key)
                .iter()
                .cloned()
                .map(|child| self.inline_zones(child, visited))
                .collect();
            zones.insert(name.to_string(), blocks);
        }
        visited.remove(block.id());
        block.zones = Some(zones);
        block
    }
}
