pub mod finder;
pub mod overlay;

pub use finder::{SearchEngine, SearchMatch};
pub use overlay::HighlightOverlay;
