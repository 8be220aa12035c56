use blockzone_core::{Action, Document, ZoneKey};
use web_time::Instant;

use crate::config::ResolverConfig;
use crate::hover::{HoverDebouncer, HoverTracker};
use crate::session::{DragSession, DragSource, DropLocation};

/// What a zone should look like and accept at this instant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ZoneState {
    /// The zone accepts a drop.
    pub enabled: bool,
    /// The zone is drawn as a candidate area.
    pub highlighted: bool,
    /// The zone is the most specific one under the pointer.
    pub hovered: bool,
}

impl ZoneState {
    const IDLE: ZoneState = ZoneState {
        enabled: true,
        highlighted: false,
        hovered: false,
    };
}

/// Result of ending a drag.
#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    /// The drop landed on the legal target; apply this action.
    Dropped(Action),
    /// The destination was a disabled zone. Nothing to apply.
    Rejected(DropLocation),
    /// No destination, or an explicit cancel.
    Cancelled,
    /// No drag was in progress.
    Ignored,
}

#[derive(Debug, Clone, Default)]
enum ResolverState {
    #[default]
    Idle,
    Dragging(DragSession),
}

/// Tracks the active drag and decides which zone may receive it.
///
/// Zones never hold drag state themselves: they report enter/leave/hover and
/// read [`DragResolver::zone_state`] back. Enter/leave counts follow the
/// pointer and outlive any single drag; only the session and the pending
/// hover are per gesture.
#[derive(Debug, Clone)]
pub struct DragResolver {
    state: ResolverState,
    tracker: HoverTracker,
    debouncer: HoverDebouncer<Option<ZoneKey>>,
}

impl DragResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            state: ResolverState::Idle,
            tracker: HoverTracker::new(),
            debouncer: HoverDebouncer::new(config.hover_debounce),
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, ResolverState::Dragging(_))
    }

    pub fn session(&self) -> Option<&DragSession> {
        match &self.state {
            ResolverState::Idle => None,
            ResolverState::Dragging(session) => Some(session),
        }
    }

    fn session_mut(&mut self) -> Option<&mut DragSession> {
        match &mut self.state {
            ResolverState::Idle => None,
            ResolverState::Dragging(session) => Some(session),
        }
    }

    /// Start a session. A placed block starts out targeting the zone it sits in.
    pub fn begin_drag(&mut self, doc: &Document, source: DragSource) {
        if let Some(previous) = self.session() {
            tracing::warn!(source = ?previous.source, "drag started while another was active");
        }
        let mut session = DragSession::new(source);
        if let Some(zone) = session.source.zone() {
            session.hover_path = doc.zone_path(zone);
        }
        tracing::debug!(source = ?session.source, "drag started");
        self.debouncer.clear();
        self.state = ResolverState::Dragging(session);
    }

    pub fn report_hover(&mut self, doc: &Document, zone: Option<ZoneKey>) {
        self.report_hover_at(doc, zone, Instant::now());
    }

    /// Report `zone` as the most specific zone under the pointer.
    pub fn report_hover_at(&mut self, doc: &Document, zone: Option<ZoneKey>, now: Instant) {
        if !self.is_dragging() {
            return;
        }
        if let Some(delivered) = self.debouncer.push(zone, now) {
            self.deliver_hover(doc, delivered);
        }
    }

    pub fn zone_enter(&mut self, doc: &Document, zone: ZoneKey) {
        self.zone_enter_at(doc, zone, Instant::now());
    }

    pub fn zone_enter_at(&mut self, doc: &Document, zone: ZoneKey, now: Instant) {
        self.tracker.enter(zone);
        let deepest = self.tracker.deepest(doc);
        self.report_hover_at(doc, deepest, now);
    }

    pub fn zone_leave(&mut self, doc: &Document, zone: &ZoneKey) {
        self.zone_leave_at(doc, zone, Instant::now());
    }

    pub fn zone_leave_at(&mut self, doc: &Document, zone: &ZoneKey, now: Instant) {
        self.tracker.leave(zone);
        let deepest = self.tracker.deepest(doc);
        self.report_hover_at(doc, deepest, now);
    }

    pub fn tick(&mut self, doc: &Document) {
        self.tick_at(doc, Instant::now());
    }

    /// Deliver a debounced hover whose window has elapsed.
    pub fn tick_at(&mut self, doc: &Document, now: Instant) {
        if let Some(delivered) = self.debouncer.poll(now) {
            self.deliver_hover(doc, delivered);
        }
    }

    /// Deliver any pending hover immediately.
    pub fn flush_hover(&mut self, doc: &Document) {
        if let Some(delivered) = self.debouncer.flush() {
            self.deliver_hover(doc, delivered);
        }
    }

    fn deliver_hover(&mut self, doc: &Document, zone: Option<ZoneKey>) {
        let Some(session) = self.session_mut() else {
            return;
        };
        let hover_path = zone.map(|zone| doc.zone_path(&zone)).unwrap_or_default();
        if session.hover_path != hover_path {
            tracing::debug!(hovered = ?hover_path.first(), "hover changed");
            session.hover_path = hover_path;
        }
    }

    /// Record the destination from a drag update, for placeholder rendering.
    pub fn update_destination(&mut self, destination: Option<DropLocation>) {
        if let Some(session) = self.session_mut() {
            session.destination = destination;
        }
    }

    /// The zone that would accept a drop right now.
    pub fn target(&self) -> Option<&ZoneKey> {
        self.session().and_then(DragSession::legal_target)
    }

    pub fn zone_state(&self, zone: &ZoneKey) -> ZoneState {
        let Some(session) = self.session() else {
            return ZoneState::IDLE;
        };
        let enabled = session.legal_target() == Some(zone);
        ZoneState {
            enabled,
            highlighted: enabled || session.in_source_family(zone),
            hovered: session.hovered() == Some(zone),
        }
    }

    /// Whether blocks inside `zone` can be picked up. During a drag of a placed
    /// block, only its own family stays interactive.
    pub fn items_draggable(&self, zone: &ZoneKey) -> bool {
        match self.session() {
            Some(session) if !session.source.is_new_from_palette() => {
                session.in_source_family(zone)
            }
            _ => true,
        }
    }

    /// The last reported destination, when it falls in the legal target.
    pub fn placeholder(&self) -> Option<&DropLocation> {
        let session = self.session()?;
        let destination = session.destination.as_ref()?;
        (session.legal_target() == Some(&destination.zone)).then_some(destination)
    }

    /// Finish the gesture. The session is cleared whatever the outcome.
    pub fn end_drag(&mut self, doc: &Document, destination: Option<DropLocation>) -> DropOutcome {
        if !self.is_dragging() {
            return DropOutcome::Ignored;
        }
        self.flush_hover(doc);
        let ResolverState::Dragging(session) = std::mem::take(&mut self.state) else {
            return DropOutcome::Ignored;
        };
        self.debouncer.clear();

        let Some(destination) = destination else {
            tracing::debug!("drag ended without a destination");
            return DropOutcome::Cancelled;
        };
        if session.legal_target() != Some(&destination.zone) {
            tracing::debug!(
                zone = %destination.zone,
                target = ?session.legal_target(),
                "drop on disabled zone rejected"
            );
            return DropOutcome::Rejected(destination);
        }

        let action = match session.source {
            DragSource::Palette { block_type } => Action::Insert {
                block_type,
                zone: destination.zone,
                index: destination.index,
            },
            DragSource::Existing { zone, index } if zone == destination.zone => Action::Reorder {
                zone,
                source: index,
                destination: destination.index,
            },
            DragSource::Existing { zone, index } => Action::Move {
                source_zone: zone,
                source_index: index,
                destination_zone: destination.zone,
                destination_index: destination.index,
            },
        };
        tracing::debug!(action = action.kind(), "drop accepted");
        DropOutcome::Dropped(action)
    }

    pub fn cancel(&mut self) {
        if self.is_dragging() {
            tracing::debug!("drag cancelled");
        }
        self.state = ResolverState::Idle;
        self.debouncer.clear();
    }
}

impl Default for DragResolver {
    fn default() -> Self {
        Self::new(ResolverConfig::default())
    }
}
