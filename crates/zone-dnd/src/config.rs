use std::time::Duration;

/// Zone id the gesture primitive reports for drags that start in the palette.
pub const PALETTE_ZONE: &str = "component-list";

const DEFAULT_HOVER_DEBOUNCE: Duration = Duration::from_millis(75);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Trailing-edge window over which hover changes are coalesced. Zero
    /// delivers every hover immediately.
    pub hover_debounce: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            hover_debounce: DEFAULT_HOVER_DEBOUNCE,
        }
    }
}

impl ResolverConfig {
    pub fn hover_debounce(mut self, hover_debounce: Duration) -> Self {
        self.hover_debounce = hover_debounce;
        self
    }

    /// No coalescing; useful for scripted replays and tests.
    pub fn immediate() -> Self {
        Self::default().hover_debounce(Duration::ZERO)
    }
}

#[derive(Debug, Default)]
pub struct EditorConfig {
    pub resolver: ResolverConfig,
    pub palette_zone: String,
}

impl EditorConfig {
    pub fn with_defaults(mut self) -> Self {
        if self.palette_zone.is_empty() {
            self.palette_zone = PALETTE_ZONE.to_string();
        }
        self
    }

    pub fn resolver(mut self, resolver: ResolverConfig) -> Self {
        self.resolver = resolver;
        self
    }
}
