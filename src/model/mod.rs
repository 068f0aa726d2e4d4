//! Permission data model
//!
//! Plain value types shared by every other module:
//!
//! ```text
//! RawList (group ids + overwrites) ──resolve──▶ List (level + nodes)
//!            │
//!            └─▶ Group (weight, base Entry, flags: id → FlagEntry)
//! ```
//!
//! None of these types hold references or interior mutability; a resolved
//! [`List`] can be cloned and kept around freely.

pub mod entry;
pub mod group;
pub mod list;

pub use entry::{Entry, FlagEntry};
pub use group::Group;
pub use list::{List, RawList};
