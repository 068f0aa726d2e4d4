//! Permission resolution
//!
//! Turns a subject's [`RawList`](crate::model::RawList) into a resolved
//! [`List`](crate::model::List) by folding group permissions in weight order
//! and the subject's overwrites last.
//!
//! ## Ordering
//!
//! ```text
//! groups (sorted by weight) → [preprocess flags → base → flags] per group → overwrites
//! ```
//!
//! With the default [`WeightOrder::Descending`] the group with the smallest
//! weight is applied last and therefore has precedence. A group lookup
//! failure aborts resolution immediately; later ids are not looked up.
//!
//! The processor keeps no state between calls and can be shared freely
//! across threads.

pub mod merge;
pub mod processor;

pub use merge::{apply_entry, merge_entries};
pub use processor::{Processor, WeightOrder};
