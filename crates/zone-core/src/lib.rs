mod document;
mod error;
mod id;
mod outline;
mod reducer;
mod registry;
mod selector;
mod value;
mod zone;

pub use crate::document::*;
pub use crate::error::*;
pub use crate::id::*;
pub use crate::outline::*;
pub use crate::reducer::*;
pub use crate::registry::*;
pub use crate::selector::*;
pub use crate::value::*;
pub use crate::zone::*;
