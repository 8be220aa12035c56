use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::document::{Attrs, Block, Document};
use crate::error::AddressError;
use crate::id::IdGenerator;
use crate::registry::BlockRegistry;
use crate::selector::{ItemSelector, check_zone, resolve};
use crate::zone::ZoneKey;

/// Structural edits understood by [`reduce`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Insert {
        block_type: String,
        #[serde(default)]
        zone: ZoneKey,
        index: usize,
    },
    Remove {
        #[serde(default)]
        zone: ZoneKey,
        index: usize,
    },
    Reorder {
        #[serde(default)]
        zone: ZoneKey,
        source: usize,
        destination: usize,
    },
    Move {
        source_zone: ZoneKey,
        source_index: usize,
        destination_zone: ZoneKey,
        destination_index: usize,
    },
    Duplicate {
        #[serde(default)]
        zone: ZoneKey,
        index: usize,
    },
    Replace {
        #[serde(default)]
        zone: ZoneKey,
        index: usize,
        block: Block,
    },
    Set {
        root: Attrs,
    },
}

impl Action {
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Insert { .. } => "insert",
            Action::Remove { .. } => "remove",
            Action::Reorder { .. } => "reorder",
            Action::Move { .. } => "move",
            Action::Duplicate { .. } => "duplicate",
            Action::Replace { .. } => "replace",
            Action::Set { .. } => "set",
        }
    }
}

/// Collaborators the reducer needs beyond the document itself.
pub struct ReduceContext<'a> {
    pub registry: &'a BlockRegistry,
    pub ids: &'a mut dyn IdGenerator,
}

impl<'a> ReduceContext<'a> {
    pub fn new(registry: &'a BlockRegistry, ids: &'a mut dyn IdGenerator) -> Self {
        Self { registry, ids }
    }
}

/// Apply `action` to a copy of `doc`. On error `doc` is untouched and no
/// partially edited copy escapes.
pub fn reduce(
    doc: &Document,
    action: Action,
    ctx: &mut ReduceContext<'_>,
) -> Result<Document, AddressError> {
    let kind = action.kind();
    let mut next = doc.clone();
    match apply_action(&mut next, action, ctx) {
        Ok(()) => {
            tracing::debug!(action = kind, blocks = next.block_count(), "applied action");
            Ok(next)
        }
        Err(err) => {
            tracing::debug!(action = kind, error = %err, "rejected action");
            Err(err)
        }
    }
}

/// Run `transform` against the sequence stored at `zone`, creating an empty
/// entry for nested zones that have never held an item.
///
/// Every structural action goes through here. Callers working on a shared
/// document should go through [`reduce`], which discards the copy on error.
pub fn apply_at<T>(
    doc: &mut Document,
    zone: &ZoneKey,
    transform: impl FnOnce(&mut Vec<Block>) -> Result<T, AddressError>,
) -> Result<T, AddressError> {
    check_zone(doc, zone)?;
    let blocks = if zone.is_root() {
        &mut doc.content
    } else {
        doc.zones.entry(zone.clone()).or_default()
    };
    transform(blocks)
}

fn apply_action(
    doc: &mut Document,
    action: Action,
    ctx: &mut ReduceContext<'_>,
) -> Result<(), AddressError> {
    match action {
        Action::Insert {
            block_type,
            zone,
            index,
        } => {
            let block = new_block(doc, ctx, &block_type);
            apply_at(doc, &zone, |blocks| {
                check_gap(&zone, blocks.len(), index)?;
                blocks.insert(index, block);
                Ok(())
            })
        }
        Action::Remove { zone, index } => {
            let removed = apply_at(doc, &zone, |blocks| {
                check_index(&zone, blocks.len(), index)?;
                Ok(blocks.remove(index))
            })?;
            drop_owned_zones(doc, removed.id());
            Ok(())
        }
        Action::Reorder {
            zone,
            source,
            destination,
        } => reorder(doc, &zone, source, destination),
        Action::Move {
            source_zone,
            source_index,
            destination_zone,
            destination_index,
        } => {
            if source_zone == destination_zone {
                return reorder(doc, &source_zone, source_index, destination_index);
            }

            check_zone(doc, &destination_zone)?;
            let moved_id = resolve(&ItemSelector::in_zone(source_zone.clone(), source_index), doc)?
                .id()
                .to_string();
            if destination_zone
                .parent_id()
                .is_some_and(|parent_id| doc.subtree_ids(&moved_id).contains(parent_id))
            {
                return Err(AddressError::MoveIntoSelf {
                    block_id: moved_id,
                    zone: destination_zone,
                });
            }
            check_gap(
                &destination_zone,
                doc.zone_content(&destination_zone).len(),
                destination_index,
            )?;

            let block = apply_at(doc, &source_zone, |blocks| Ok(blocks.remove(source_index)))?;
            apply_at(doc, &destination_zone, |blocks| {
                blocks.insert(destination_index, block);
                Ok(())
            })
        }
        Action::Duplicate { zone, index } => {
            let original_id = resolve(&ItemSelector::in_zone(zone.clone(), index), doc)?
                .id()
                .to_string();
            let Some(detached) = doc.detached_block(&original_id) else {
                return Err(AddressError::IndexOutOfBounds {
                    len: doc.zone_content(&zone).len(),
                    zone,
                    index,
                });
            };
            let mut taken: HashSet<String> = doc.blocks().map(|b| b.id().to_string()).collect();
            let copy = remap_ids(detached, ctx.ids, &mut taken);
            apply_at(doc, &zone, |blocks| {
                blocks.insert(index + 1, copy);
                Ok(())
            })?;
            doc.hoist_inline_zones();
            Ok(())
        }
        Action::Replace { zone, index, block } => {
            let current_id = resolve(&ItemSelector::in_zone(zone.clone(), index), doc)?
                .id()
                .to_string();
            let Block {
                block_type,
                mut props,
                zones,
            } = block;
            props.id = current_id.clone();
            if let Some(zones) = &zones {
                check_incoming_ids(doc, &current_id, zones)?;
            }

            let replaces_zones = zones.is_some();
            apply_at(doc, &zone, |blocks| {
                let len = blocks.len();
                let slot = blocks
                    .get_mut(index)
                    .ok_or_else(|| AddressError::IndexOutOfBounds {
                        zone: zone.clone(),
                        index,
                        len,
                    })?;
                slot.block_type = block_type;
                slot.props = props;
                slot.zones = zones;
                Ok(())
            })?;
            if replaces_zones {
                drop_owned_zones(doc, &current_id);
                doc.hoist_inline_zones();
            }
            Ok(())
        }
        Action::Set { root } => {
            doc.root = root;
            Ok(())
        }
    }
}

fn reorder(
    doc: &mut Document,
    zone: &ZoneKey,
    source: usize,
    destination: usize,
) -> Result<(), AddressError> {
    apply_at(doc, zone, |blocks| {
        check_index(zone, blocks.len(), source)?;
        check_index(zone, blocks.len(), destination)?;
        if source != destination {
            let block = blocks.remove(source);
            blocks.insert(destination, block);
        }
        Ok(())
    })
}

fn new_block(doc: &Document, ctx: &mut ReduceContext<'_>, block_type: &str) -> Block {
    let taken = doc.block_ids();
    let id = ctx.ids.next_id(block_type, &|id: &str| taken.contains(id));
    let mut block = Block::new(block_type, id);
    match ctx.registry.default_props(block_type) {
        Some(defaults) => {
            block.props.fields = defaults.clone();
            block.props.fields.remove("id");
        }
        None => {
            tracing::warn!(block_type, "inserting block type with no registered config");
        }
    }
    block
}

/// Give `block` and every block in its inline zones a fresh id.
fn remap_ids(mut block: Block, ids: &mut dyn IdGenerator, taken: &mut HashSet<String>) -> Block {
    let id = ids.next_id(&block.block_type, &|id: &str| taken.contains(id));
    taken.insert(id.clone());
    block.props.id = id;
    if let Some(zones) = block.zones.take() {
        let zones = zones
            .into_iter()
            .map(|(name, blocks)| {
                let blocks = blocks
                    .into_iter()
                    .map(|child| remap_ids(child, ids, taken))
                    .collect();
                (name, blocks)
            })
            .collect();
        block.zones = Some(zones);
    }
    block
}

fn drop_owned_zones(doc: &mut Document, block_id: &str) {
    for key in doc.descendant_zones(block_id) {
        doc.zones.remove(&key);
    }
}

/// Ids in incoming inline zones must not collide with each other or with any
/// block that survives the replacement.
fn check_incoming_ids(
    doc: &Document,
    owner_id: &str,
    zones: &BTreeMap<String, Vec<Block>>,
) -> Result<(), AddressError> {
    let replaced: HashSet<&str> = doc
        .descendant_zones(owner_id)
        .iter()
        .flat_map(|key| doc.zone_content(key).iter().map(Block::id))
        .collect();
    let mut seen: HashSet<String> = HashSet::new();
    let mut pending: Vec<&Block> = zones.values().flatten().collect();
    while let Some(block) = pending.pop() {
        let id = block.id();
        let survives_elsewhere = id == owner_id || (doc.contains_block(id) && !replaced.contains(id));
        if survives_elsewhere || !seen.insert(id.to_string()) {
            return Err(AddressError::DuplicateId(id.to_string()));
        }
        if let Some(nested) = &block.zones {
            pending.extend(nested.values().flatten());
        }
    }
    Ok(())
}

fn check_index(zone: &ZoneKey, len: usize, index: usize) -> Result<(), AddressError> {
    if index < len {
        return Ok(());
    }
    Err(AddressError::IndexOutOfBounds {
        zone: zone.clone(),
        index,
        len,
    })
}

fn check_gap(zone: &ZoneKey, len: usize, index: usize) -> Result<(), AddressError> {
    if index <= len {
        return Ok(());
    }
    Err(AddressError::IndexOutOfBounds {
        zone: zone.clone(),
        index,
        len,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::SequentialIds;
    use crate::registry::BlockConfig;

    fn ids(blocks: &[Block]) -> Vec<&str> {
        blocks.iter().map(Block::id).collect()
    }

    fn run(doc: &Document, action: Action) -> Result<Document, AddressError> {
        let registry = BlockRegistry::new().register(
            "Text",
            BlockConfig::new().default_prop("text", serde_json::json!("Text")),
        );
        let mut ids = SequentialIds::new();
        let mut ctx = ReduceContext::new(&registry, &mut ids);
        reduce(doc, action, &mut ctx)
    }

    #[test]
    fn insert_applies_default_props() {
        let doc = run(
            &Document::default(),
            Action::Insert {
                block_type: "Text".into(),
                zone: ZoneKey::root(),
                index: 0,
            },
        )
        .unwrap();
        assert_eq!(doc.content.len(), 1);
        assert_eq!(doc.content[0].id(), "Text-0");
        assert_eq!(doc.content[0].props.get("text"), Some(&serde_json::json!("Text")));
    }

    #[test]
    fn insert_creates_missing_zone_entry() {
        let doc = Document::new(vec![Block::new("Columns", "A")]);
        let doc = run(
            &doc,
            Action::Insert {
                block_type: "Text".into(),
                zone: ZoneKey::of("A", "left"),
                index: 0,
            },
        )
        .unwrap();
        assert_eq!(doc.zone_content(&ZoneKey::of("A", "left")).len(), 1);
    }

    #[test]
    fn insert_past_end_is_rejected() {
        let err = run(
            &Document::default(),
            Action::Insert {
                block_type: "Text".into(),
                zone: ZoneKey::root(),
                index: 1,
            },
        )
        .unwrap_err();
        assert!(matches!(err, AddressError::IndexOutOfBounds { index: 1, len: 0, .. }));
    }

    #[test]
    fn unknown_block_type_gets_only_an_id() {
        let doc = run(
            &Document::default(),
            Action::Insert {
                block_type: "Mystery".into(),
                zone: ZoneKey::root(),
                index: 0,
            },
        )
        .unwrap();
        assert!(doc.content[0].props.fields.is_empty());
    }

    #[test]
    fn reorder_moves_item_down_and_up() {
        let doc = Document::new(vec![
            Block::new("Text", "A"),
            Block::new("Text", "B"),
            Block::new("Text", "C"),
            Block::new("Text", "D"),
        ]);
        let down = run(
            &doc,
            Action::Reorder {
                zone: ZoneKey::root(),
                source: 1,
                destination: 3,
            },
        )
        .unwrap();
        assert_eq!(ids(&down.content), vec!["A", "C", "D", "B"]);

        let up = run(
            &doc,
            Action::Reorder {
                zone: ZoneKey::root(),
                source: 3,
                destination: 1,
            },
        )
        .unwrap();
        assert_eq!(ids(&up.content), vec!["A", "D", "B", "C"]);
    }

    #[test]
    fn move_within_one_zone_is_a_reorder() {
        let doc = Document::new(vec![Block::new("Text", "A"), Block::new("Text", "B")]);
        let moved = run(
            &doc,
            Action::Move {
                source_zone: ZoneKey::root(),
                source_index: 0,
                destination_zone: ZoneKey::root(),
                destination_index: 1,
            },
        )
        .unwrap();
        assert_eq!(ids(&moved.content), vec!["B", "A"]);
    }

    #[test]
    fn move_into_own_zone_is_rejected() {
        let mut doc = Document::new(vec![Block::new("Columns", "A")]);
        doc.zones
            .insert(ZoneKey::of("A", "left"), vec![Block::new("Card", "B")]);

        let err = run(
            &doc,
            Action::Move {
                source_zone: ZoneKey::root(),
                source_index: 0,
                destination_zone: ZoneKey::of("B", "body"),
                destination_index: 0,
            },
        )
        .unwrap_err();
        assert!(matches!(err, AddressError::MoveIntoSelf { .. }));
    }

    #[test]
    fn move_into_unpopulated_descendant_zone_is_rejected() {
        let mut doc = Document::new(vec![Block::new("Columns", "A")]);
        doc.zones
            .insert(ZoneKey::of("A", "left"), vec![Block::new("Card", "B")]);
        doc.zones
            .insert(ZoneKey::of("B", "body"), vec![Block::new("Text", "C")]);

        for zone in [ZoneKey::of("A", "right"), ZoneKey::of("C", "slot")] {
            let err = run(
                &doc,
                Action::Move {
                    source_zone: ZoneKey::root(),
                    source_index: 0,
                    destination_zone: zone.clone(),
                    destination_index: 0,
                },
            )
            .unwrap_err();
            assert_eq!(
                err,
                AddressError::MoveIntoSelf {
                    block_id: "A".into(),
                    zone,
                }
            );
        }
    }

    #[test]
    fn failed_action_leaves_document_untouched() {
        let doc = Document::new(vec![Block::new("Columns", "A")]);
        let before = doc.clone();
        assert!(
            run(
                &doc,
                Action::Remove {
                    zone: ZoneKey::of("A", "left"),
                    index: 0,
                },
            )
            .is_err()
        );
        assert_eq!(doc, before);
    }

    #[test]
    fn duplicate_remaps_descendant_ids() {
        let mut doc = Document::new(vec![Block::new("Columns", "A")]);
        doc.zones
            .insert(ZoneKey::of("A", "left"), vec![Block::new("Card", "B")]);
        doc.zones
            .insert(ZoneKey::of("B", "body"), vec![Block::new("Text", "C")]);

        let doc = run(
            &doc,
            Action::Duplicate {
                zone: ZoneKey::root(),
                index: 0,
            },
        )
        .unwrap();

        assert_eq!(doc.content.len(), 2);
        let copy_id = doc.content[1].id().to_string();
        assert_ne!(copy_id, "A");
        let copied_left = doc.zone_content(&ZoneKey::of(&copy_id, "left"));
        assert_eq!(copied_left.len(), 1);
        assert_ne!(copied_left[0].id(), "B");
        let copied_body = doc.zone_content(&ZoneKey::of(copied_left[0].id(), "body"));
        assert_eq!(copied_body.len(), 1);
        assert_ne!(copied_body[0].id(), "C");

        let ids = doc.block_ids();
        assert_eq!(ids.len(), doc.block_count());
        assert!(doc.content[1].zones.is_none());
    }

    #[test]
    fn replace_preserves_id_and_position() {
        let doc = Document::new(vec![Block::new("Text", "A"), Block::new("Text", "B")]);
        let doc = run(
            &doc,
            Action::Replace {
                zone: ZoneKey::root(),
                index: 1,
                block: Block::new("Text", "ignored").prop("text", serde_json::json!("hi")),
            },
        )
        .unwrap();
        assert_eq!(doc.content[1].id(), "B");
        assert_eq!(doc.content[1].props.get("text"), Some(&serde_json::json!("hi")));
    }

    #[test]
    fn replace_with_zones_swaps_owned_zones() {
        let mut doc = Document::new(vec![Block::new("Columns", "A")]);
        doc.zones
            .insert(ZoneKey::of("A", "left"), vec![Block::new("Text", "B")]);

        let doc = run(
            &doc,
            Action::Replace {
                zone: ZoneKey::root(),
                index: 0,
                block: Block::new("Columns", "A")
                    .zone("right", vec![Block::new("Text", "B"), Block::new("Text", "C")]),
            },
        )
        .unwrap();
        assert!(!doc.zones.contains_key(&ZoneKey::of("A", "left")));
        assert_eq!(ids(doc.zone_content(&ZoneKey::of("A", "right"))), vec!["B", "C"]);
        assert!(doc.content[0].zones.is_none());
    }

    #[test]
    fn replace_rejects_colliding_ids() {
        let doc = Document::new(vec![Block::new("Columns", "A"), Block::new("Text", "T")]);
        let err = run(
            &doc,
            Action::Replace {
                zone: ZoneKey::root(),
                index: 0,
                block: Block::new("Columns", "A").zone("left", vec![Block::new("Text", "T")]),
            },
        )
        .unwrap_err();
        assert_eq!(err, AddressError::DuplicateId("T".into()));
    }

    #[test]
    fn set_replaces_root_props() {
        let mut root = Attrs::new();
        root.insert("title".into(), serde_json::json!("Home"));
        let doc = run(&Document::default(), Action::Set { root: root.clone() }).unwrap();
        assert_eq!(doc.root, root);
    }

    #[test]
    fn actions_use_tagged_json() {
        let action: Action = serde_json::from_value(serde_json::json!({
            "type": "reorder",
            "source": 0,
            "destination": 2
        }))
        .unwrap();
        assert_eq!(
            action,
            Action::Reorder {
                zone: ZoneKey::root(),
                source: 0,
                destination: 2,
            }
        );
    }
}
