use std::time::Duration;

use blockzone_core::{Document, ZoneKey};
use web_time::Instant;

/// Reference-counted enter/leave bookkeeping for zones under the pointer.
///
/// Enter and leave notifications arrive for every zone the pointer crosses,
/// ancestors included, and may arrive more than once per zone. A zone stays
/// hovered while its count is positive.
#[derive(Debug, Clone, Default)]
pub struct HoverTracker {
    entries: Vec<HoverEntry>,
    next_seq: u64,
}

#[derive(Debug, Clone)]
struct HoverEntry {
    zone: ZoneKey,
    count: u32,
    seq: u64,
}

impl HoverTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&mut self, zone: ZoneKey) {
        let seq = self.next_seq;
        self.next_seq += 1;
        match self.entries.iter_mut().find(|entry| entry.zone == zone) {
            Some(entry) => {
                entry.count += 1;
                entry.seq = seq;
            }
            None => self.entries.push(HoverEntry {
                zone,
                count: 1,
                seq,
            }),
        }
    }

    pub fn leave(&mut self, zone: &ZoneKey) {
        let Some(ix) = self.entries.iter().position(|entry| &entry.zone == zone) else {
            return;
        };
        let entry = &mut self.entries[ix];
        entry.count = entry.count.saturating_sub(1);
        if entry.count == 0 {
            self.entries.remove(ix);
        }
    }

    pub fn is_hovered(&self, zone: &ZoneKey) -> bool {
        self.entries.iter().any(|entry| &entry.zone == zone)
    }

    /// The most deeply nested hovered zone; the most recently entered wins ties.
    pub fn deepest(&self, doc: &Document) -> Option<ZoneKey> {
        self.entries
            .iter()
            .max_by_key(|entry| (doc.zone_depth(&entry.zone), entry.seq))
            .map(|entry| entry.zone.clone())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Trailing-edge debounce: only the latest value pushed within the window is
/// delivered, once the window has passed without a newer push.
#[derive(Debug, Clone)]
pub struct HoverDebouncer<T> {
    window: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> HoverDebouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Queue `value`. Returns it straight back when the window is zero.
    pub fn push(&mut self, value: T, now: Instant) -> Option<T> {
        if self.window.is_zero() {
            self.pending = None;
            return Some(value);
        }
        self.pending = Some((value, now));
        None
    }

    /// Deliver the pending value if its window has elapsed at `now`.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let (_, pushed_at) = self.pending.as_ref()?;
        if now.saturating_duration_since(*pushed_at) < self.window {
            return None;
        }
        self.pending.take().map(|(value, _)| value)
    }

    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockzone_core::Block;

    fn doc() -> Document {
        let mut doc = Document::new(vec![Block::new("Columns", "A")]);
        doc.zones
            .insert(ZoneKey::of("A", "left"), vec![Block::new("Card", "B")]);
        doc.zones.insert(ZoneKey::of("B", "body"), vec![]);
        doc
    }

    #[test]
    fn deepest_follows_nesting_not_arrival_order() {
        let doc = doc();
        let mut tracker = HoverTracker::new();
        tracker.enter(ZoneKey::of("B", "body"));
        tracker.enter(ZoneKey::root());
        tracker.enter(ZoneKey::of("A", "left"));
        assert_eq!(tracker.deepest(&doc), Some(ZoneKey::of("B", "body")));
    }

    #[test]
    fn leaving_nested_zone_unnarrows_to_parent() {
        let doc = doc();
        let mut tracker = HoverTracker::new();
        tracker.enter(ZoneKey::root());
        tracker.enter(ZoneKey::of("A", "left"));
        // Child elements fire a second enter for the same zone.
        tracker.enter(ZoneKey::of("A", "left"));

        tracker.leave(&ZoneKey::of("A", "left"));
        assert_eq!(tracker.deepest(&doc), Some(ZoneKey::of("A", "left")));

        tracker.leave(&ZoneKey::of("A", "left"));
        assert_eq!(tracker.deepest(&doc), Some(ZoneKey::root()));

        tracker.leave(&ZoneKey::root());
        assert_eq!(tracker.deepest(&doc), None);
    }

    #[test]
    fn stray_leave_is_ignored() {
        let mut tracker = HoverTracker::new();
        tracker.leave(&ZoneKey::root());
        assert!(!tracker.is_hovered(&ZoneKey::root()));
    }

    #[test]
    fn debouncer_delivers_latest_after_window() {
        let start = Instant::now();
        let mut debouncer = HoverDebouncer::new(Duration::from_millis(75));
        assert_eq!(debouncer.push("a", start), None);
        assert_eq!(debouncer.push("b", start + Duration::from_millis(10)), None);
        assert_eq!(debouncer.poll(start + Duration::from_millis(50)), None);
        assert_eq!(debouncer.poll(start + Duration::from_millis(85)), Some("b"));
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.poll(start + Duration::from_millis(200)), None);
    }

    #[test]
    fn zero_window_passes_through() {
        let mut debouncer = HoverDebouncer::new(Duration::ZERO);
        assert_eq!(debouncer.push(1, Instant::now()), Some(1));
        assert_eq!(debouncer.flush(), None);
    }
}
