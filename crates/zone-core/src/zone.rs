use std::fmt;

use serde::{Deserialize, Serialize};

/// Reserved key of the document's root zone.
pub const ROOT_ZONE: &str = "root-zone";

const SEPARATOR: char = ':';

/// Compound address of a zone: `parentBlockId:zoneName`, or [`ROOT_ZONE`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneKey(String);

/// Decoded form of a [`ZoneKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneAddress<'a> {
    Root,
    Nested {
        parent_id: &'a str,
        zone_name: Option<&'a str>,
    },
}

impl ZoneKey {
    pub fn root() -> Self {
        Self(ROOT_ZONE.to_string())
    }

    /// Key of the zone `zone_name` owned by the block `parent_id`.
    ///
    /// Keys split at their last `:`, so zone names must not contain one.
    pub fn of(parent_id: &str, zone_name: &str) -> Self {
        debug_assert!(
            !zone_name.contains(SEPARATOR),
            "zone name {zone_name:?} contains {SEPARATOR:?}"
        );
        Self(format!("{parent_id}{SEPARATOR}{zone_name}"))
    }

    /// Wrap a raw key as reported by the gesture primitive or read from storage.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == ROOT_ZONE
    }

    /// Split the key at its last separator, so block ids may themselves contain `:`.
    pub fn parse(&self) -> ZoneAddress<'_> {
        if self.is_root() {
            return ZoneAddress::Root;
        }
        match self.0.rsplit_once(SEPARATOR) {
            Some((parent_id, zone_name)) => ZoneAddress::Nested {
                parent_id,
                zone_name: Some(zone_name),
            },
            None => ZoneAddress::Nested {
                parent_id: &self.0,
                zone_name: None,
            },
        }
    }

    /// Id of the owning block, `None` for the root zone.
    pub fn parent_id(&self) -> Option<&str> {
        match self.parse() {
            ZoneAddress::Root => None,
            ZoneAddress::Nested { parent_id, .. } => Some(parent_id),
        }
    }

    pub fn zone_name(&self) -> Option<&str> {
        match self.parse() {
            ZoneAddress::Root => None,
            ZoneAddress::Nested { zone_name, .. } => zone_name,
        }
    }

    /// Zones sharing an owning parent form a family; the root zone is its own family.
    pub fn family(&self) -> Option<&str> {
        self.parent_id()
    }

    pub fn same_family(&self, other: &ZoneKey) -> bool {
        self.family() == other.family()
    }
}

impl Default for ZoneKey {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for ZoneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ZoneKey {
    fn from(value: &str) -> Self {
        Self::from_raw(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_key_round_trips_through_parse() {
        let key = ZoneKey::of("Columns-1", "column-0");
        assert_eq!(key.as_str(), "Columns-1:column-0");
        assert_eq!(
            key.parse(),
            ZoneAddress::Nested {
                parent_id: "Columns-1",
                zone_name: Some("column-0"),
            }
        );
    }

    #[test]
    fn root_key_has_no_parent() {
        let key = ZoneKey::root();
        assert!(key.is_root());
        assert_eq!(key.parse(), ZoneAddress::Root);
        assert_eq!(key.family(), None);
        assert_eq!(ZoneKey::default(), key);
    }

    #[test]
    fn parent_ids_with_separator_split_at_last_colon() {
        let key = ZoneKey::of("ns:block", "slot");
        assert_eq!(key.parent_id(), Some("ns:block"));
        assert_eq!(key.zone_name(), Some("slot"));
    }

    #[test]
    fn key_without_separator_parses_as_parent_only() {
        let key = ZoneKey::from_raw("orphan");
        assert_eq!(
            key.parse(),
            ZoneAddress::Nested {
                parent_id: "orphan",
                zone_name: None,
            }
        );
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "contains")]
    fn zone_names_with_separator_are_refused() {
        ZoneKey::of("A", "left:top");
    }

    #[test]
    fn family_groups_zones_by_owner() {
        let left = ZoneKey::of("A", "left");
        let right = ZoneKey::of("A", "right");
        let other = ZoneKey::of("B", "left");
        assert!(left.same_family(&right));
        assert!(!left.same_family(&other));
        assert!(!left.same_family(&ZoneKey::root()));
    }
}
