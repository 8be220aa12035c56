use blockzone_core::{
    Action, AddressError, Block, BlockRegistry, Document, IdGenerator, ItemSelector,
    ReduceContext, SequentialIds, ZoneKey, reduce, resolve,
};
use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::config::EditorConfig;
use crate::resolver::{DragResolver, DropOutcome, ZoneState};
use crate::session::{DragSource, DropLocation};

/// Events from the gesture primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GestureEvent {
    DragStart {
        /// Block type for palette drags, otherwise the dragged element's id.
        draggable_id: String,
        source: DropLocation,
    },
    DragUpdate {
        #[serde(default)]
        destination: Option<DropLocation>,
    },
    DragEnd {
        #[serde(default)]
        destination: Option<DropLocation>,
    },
}

/// Owns the document and wires selection, drag resolution and the reducer.
pub struct EditorController {
    config: EditorConfig,
    doc: Document,
    registry: BlockRegistry,
    ids: Box<dyn IdGenerator>,
    resolver: DragResolver,
    selection: Option<ItemSelector>,
    on_change: Option<Box<dyn FnMut(&Document)>>,
}

impl EditorController {
    pub fn new(doc: Document, registry: BlockRegistry) -> Self {
        Self::with_config(doc, registry, EditorConfig::default())
    }

    pub fn with_config(mut doc: Document, registry: BlockRegistry, config: EditorConfig) -> Self {
        let config = config.with_defaults();
        doc.hoist_inline_zones();
        Self {
            resolver: DragResolver::new(config.resolver.clone()),
            config,
            doc,
            registry,
            ids: Box::new(SequentialIds::new()),
            selection: None,
            on_change: None,
        }
    }

    pub fn ids(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    /// Called with the new document after every successful action, including
    /// those produced by a drop.
    pub fn on_change(mut self, on_change: impl FnMut(&Document) + 'static) -> Self {
        self.on_change = Some(Box::new(on_change));
        self
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn into_document(self) -> Document {
        self.doc
    }

    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    pub fn resolver(&self) -> &DragResolver {
        &self.resolver
    }

    /// Apply one action. On error the document is unchanged.
    pub fn dispatch(&mut self, action: Action) -> Result<&Document, AddressError> {
        let follow_up = match &action {
            Action::Remove { .. } => Some(None),
            Action::Duplicate { zone, index } => {
                Some(Some(ItemSelector::in_zone(zone.clone(), index + 1)))
            }
            _ => None,
        };

        let mut ctx = ReduceContext::new(&self.registry, self.ids.as_mut());
        self.doc = reduce(&self.doc, action, &mut ctx)?;

        if let Some(selection) = follow_up {
            self.selection = selection;
        }
        if self
            .selection
            .as_ref()
            .is_some_and(|selector| resolve(selector, &self.doc).is_err())
        {
            self.selection = None;
        }
        if let Some(on_change) = self.on_change.as_mut() {
            on_change(&self.doc);
        }
        Ok(&self.doc)
    }

    pub fn resolve(&self, selector: &ItemSelector) -> Result<&Block, AddressError> {
        resolve(selector, &self.doc)
    }

    pub fn select(&mut self, selection: Option<ItemSelector>) {
        self.selection = selection;
    }

    pub fn selection(&self) -> Option<&ItemSelector> {
        self.selection.as_ref()
    }

    pub fn selected_block(&self) -> Option<&Block> {
        let selector = self.selection.as_ref()?;
        resolve(selector, &self.doc).ok()
    }

    pub fn begin_drag(&mut self, source: DragSource) {
        self.resolver.begin_drag(&self.doc, source);
    }

    pub fn report_hover(&mut self, zone: Option<ZoneKey>) {
        self.resolver.report_hover(&self.doc, zone);
    }

    pub fn report_hover_at(&mut self, zone: Option<ZoneKey>, now: Instant) {
        self.resolver.report_hover_at(&self.doc, zone, now);
    }

    pub fn zone_enter(&mut self, zone: ZoneKey) {
        self.resolver.zone_enter(&self.doc, zone);
    }

    pub fn zone_enter_at(&mut self, zone: ZoneKey, now: Instant) {
        self.resolver.zone_enter_at(&self.doc, zone, now);
    }

    pub fn zone_leave(&mut self, zone: &ZoneKey) {
        self.resolver.zone_leave(&self.doc, zone);
    }

    pub fn zone_leave_at(&mut self, zone: &ZoneKey, now: Instant) {
        self.resolver.zone_leave_at(&self.doc, zone, now);
    }

    pub fn tick(&mut self) {
        self.resolver.tick(&self.doc);
    }

    pub fn tick_at(&mut self, now: Instant) {
        self.resolver.tick_at(&self.doc, now);
    }

    /// End the drag and apply its action when the destination is legal. The
    /// dropped block becomes the selection.
    pub fn end_drag(
        &mut self,
        destination: Option<DropLocation>,
    ) -> Result<DropOutcome, AddressError> {
        let outcome = self.resolver.end_drag(&self.doc, destination);
        if let DropOutcome::Dropped(action) = &outcome {
            let dropped_at = match action {
                Action::Insert { zone, index, .. } => {
                    Some(ItemSelector::in_zone(zone.clone(), *index))
                }
                Action::Reorder {
                    zone, destination, ..
                } => Some(ItemSelector::in_zone(zone.clone(), *destination)),
                Action::Move {
                    destination_zone,
                    destination_index,
                    ..
                } => Some(ItemSelector::in_zone(
                    destination_zone.clone(),
                    *destination_index,
                )),
                _ => None,
            };
            self.dispatch(action.clone())?;
            self.selection = dropped_at;
        }
        Ok(outcome)
    }

    pub fn cancel_drag(&mut self) {
        self.resolver.cancel();
    }

    pub fn zone_state(&self, zone: &ZoneKey) -> ZoneState {
        self.resolver.zone_state(zone)
    }

    pub fn items_draggable(&self, zone: &ZoneKey) -> bool {
        self.resolver.items_draggable(zone)
    }

    pub fn placeholder(&self) -> Option<&DropLocation> {
        self.resolver.placeholder()
    }

    /// Feed one event from the gesture primitive. Returns the outcome on drag end.
    pub fn handle_gesture(
        &mut self,
        event: GestureEvent,
    ) -> Result<Option<DropOutcome>, AddressError> {
        match event {
            GestureEvent::DragStart {
                draggable_id,
                source,
            } => {
                let source = if source.zone.as_str() == self.config.palette_zone {
                    DragSource::palette(draggable_id)
                } else {
                    DragSource::existing(source.zone, source.index)
                };
                self.begin_drag(source);
                Ok(None)
            }
            GestureEvent::DragUpdate { destination } => {
                self.resolver.update_destination(destination);
                Ok(None)
            }
            GestureEvent::DragEnd { destination } => self.end_drag(destination).map(Some),
        }
    }
}
