mod config;
mod controller;
mod hover;
mod resolver;
mod session;

pub use config::{EditorConfig, PALETTE_ZONE, ResolverConfig};
pub use controller::{EditorController, GestureEvent};
pub use hover::{HoverDebouncer, HoverTracker};
pub use resolver::{DragResolver, DropOutcome, ZoneState};
pub use session::{DragSession, DragSource, DropLocation};
