use blockzone_core::ZoneKey;
use serde::{Deserialize, Serialize};

/// A position in a zone as reported by the gesture primitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DropLocation {
    pub zone: ZoneKey,
    pub index: usize,
}

impl DropLocation {
    pub fn new(zone: ZoneKey, index: usize) -> Self {
        Self { zone, index }
    }
}

/// What is being dragged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DragSource {
    /// A new block of `block_type` dragged out of the palette.
    Palette { block_type: String },
    /// A placed block being relocated.
    Existing { zone: ZoneKey, index: usize },
}

impl DragSource {
    pub fn palette(block_type: impl Into<String>) -> Self {
        DragSource::Palette {
            block_type: block_type.into(),
        }
    }

    pub fn existing(zone: ZoneKey, index: usize) -> Self {
        DragSource::Existing { zone, index }
    }

    pub fn is_new_from_palette(&self) -> bool {
        matches!(self, DragSource::Palette { .. })
    }

    /// Zone the dragged block currently sits in, if it is placed.
    pub fn zone(&self) -> Option<&ZoneKey> {
        match self {
            DragSource::Palette { .. } => None,
            DragSource::Existing { zone, .. } => Some(zone),
        }
    }
}

/// State of one in-progress gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub source: DragSource,
    /// Delivered hover: the most specific hovered zone followed by its
    /// ancestors. Empty when the pointer is over no zone.
    pub hover_path: Vec<ZoneKey>,
    /// Last destination reported by a drag update.
    pub destination: Option<DropLocation>,
}

impl DragSession {
    pub fn new(source: DragSource) -> Self {
        Self {
            source,
            hover_path: Vec::new(),
            destination: None,
        }
    }

    pub fn hovered(&self) -> Option<&ZoneKey> {
        self.hover_path.first()
    }

    /// The single zone a drop may land in right now.
    ///
    /// A palette drag targets the deepest hovered zone. A placed block can only
    /// land among the zones of its own family, so it targets the deepest
    /// hovered zone of that family.
    pub fn legal_target(&self) -> Option<&ZoneKey> {
        match &self.source {
            DragSource::Palette { .. } => self.hover_path.first(),
            DragSource::Existing { zone, .. } => {
                self.hover_path.iter().find(|hovered| hovered.same_family(zone))
            }
        }
    }

    pub fn in_source_family(&self, zone: &ZoneKey) -> bool {
        self.source
            .zone()
            .is_some_and(|source| source.same_family(zone))
    }
}
