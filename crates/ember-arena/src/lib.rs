//! Bump arena and arena-aware growable array for the Ember engine.
//!
//! [`GrowableArray`] is the default sequence type across the engine (event
//! queues, mesh and animation lists, physics bodies and constraints). It can
//! own heap storage like a standard vector, or draw its storage from an
//! [`Arena`] for bulk-lifetime data such as per-frame scratch lists.
//!
//! # Architecture
//!
//! ```text
//! Arena (region allocator, &self allocation, &mut self reset)
//! └── SegmentList → Segment[] (bump-allocated raw byte blocks)
//!
//! GrowableArray<'a, T>
//! ├── heap mode:  owns its buffer, releases it exactly once
//! └── arena mode: borrows storage from &'a Arena, never releases it
//! ```
//!
//! # Safety
//!
//! This is the only crate in the workspace that contains `unsafe` code.
//! It is confined to `raw.rs` (allocator calls) and `array.rs` (slot reads
//! and writes); every block carries a `// SAFETY:` comment.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod arena;
pub mod array;
pub mod config;
pub mod error;
mod macros;
mod raw;
pub mod segment;

// Public re-exports for the primary API surface.
pub use arena::Arena;
pub use array::{GrowableArray, IntoIter};
pub use config::ArenaConfig;
pub use error::{ArenaError, ArrayError};
