use serde::{Deserialize, Serialize};

use crate::document::{Block, Document};
use crate::error::AddressError;
use crate::zone::ZoneKey;

/// "The block at `index` within `zone`". Positional, so it goes stale after
/// any structural edit and must be re-resolved rather than cached.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemSelector {
    pub index: usize,
    #[serde(default)]
    pub zone: ZoneKey,
}

impl ItemSelector {
    pub fn root(index: usize) -> Self {
        Self {
            index,
            zone: ZoneKey::root(),
        }
    }

    pub fn in_zone(zone: ZoneKey, index: usize) -> Self {
        Self { index, zone }
    }

    pub fn nested(parent_id: &str, zone_name: &str, index: usize) -> Self {
        Self::in_zone(ZoneKey::of(parent_id, zone_name), index)
    }
}

/// Check that `zone` can be addressed: it is the root zone or its owner is placed.
pub(crate) fn check_zone(doc: &Document, zone: &ZoneKey) -> Result<(), AddressError> {
    if doc.zone_is_addressable(zone) {
        return Ok(());
    }
    Err(AddressError::UnknownParent {
        zone: zone.clone(),
        parent_id: zone.parent_id().unwrap_or_default().to_string(),
    })
}

pub fn resolve<'a>(selector: &ItemSelector, doc: &'a Document) -> Result<&'a Block, AddressError> {
    check_zone(doc, &selector.zone)?;
    let blocks = doc.zone_content(&selector.zone);
    blocks
        .get(selector.index)
        .ok_or_else(|| AddressError::IndexOutOfBounds {
            zone: selector.zone.clone(),
            index: selector.index,
            len: blocks.len(),
        })
}
