/// Source of fresh block ids.
///
/// `taken` reports whether an id is already used anywhere in the document;
/// implementations must never return an id for which it answers `true`.
pub trait IdGenerator {
    fn next_id(&mut self, block_type: &str, taken: &dyn Fn(&str) -> bool) -> String;
}

/// `{type}-{n}` ids from a monotonically increasing counter.
#[derive(Debug, Clone, Default)]
pub struct SequentialIds {
    next: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(next: u64) -> Self {
        Self { next }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self, block_type: &str, taken: &dyn Fn(&str) -> bool) -> String {
        loop {
            let candidate = format!("{block_type}-{}", self.next);
            self.next = self.next.wrapping_add(1);
            if !taken(&candidate) {
                return candidate;
            }
        }
    }
}
