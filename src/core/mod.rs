pub mod dwell;
pub mod layout;
pub mod primitives;
pub mod types;

pub use dwell::{DwellPolicy, compute_word_durations};
pub use layout::{LayoutMetrics, compute_word_boxes};
pub use types::{Canvas, PointerSample, WordBox, WordDuration};
