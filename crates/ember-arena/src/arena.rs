//! Bump arena for bulk-lifetime storage.
//!
//! [`Arena`] hands out uninitialised, correctly aligned storage from a
//! [`SegmentList`]. There is no per-allocation free: memory is reclaimed
//! collectively by [`Arena::reset`] (which keeps the segments for reuse)
//! or by dropping the arena.
//!
//! Allocation takes `&self`, so any number of
//! [`GrowableArray`](crate::GrowableArray)s can draw from the same arena.
//! `reset` takes `&mut self`, which the borrow checker only grants once
//! every array borrowing the arena is gone.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::mem;
use std::ptr::NonNull;

use crate::config::ArenaConfig;
use crate::error::ArenaError;
use crate::segment::SegmentList;

/// Region allocator with collective reclamation.
///
/// Single-threaded: the arena is neither `Sync` nor `Send`-shareable by
/// reference. Typical use is per-frame transient storage:
///
/// ```
/// use ember_arena::{Arena, GrowableArray};
///
/// let mut arena = Arena::default();
/// for _frame in 0..3 {
///     let mut events = GrowableArray::new_in(&arena);
///     events.push(42u32);
///     assert_eq!(events.len(), 1);
///     drop(events);
///     arena.reset();
/// }
/// ```
pub struct Arena {
    segments: RefCell<SegmentList>,
    /// Number of non-empty allocations served since creation or the last reset.
    allocations: Cell<usize>,
    config: ArenaConfig,
}

impl Arena {
    /// Create an arena with one pre-allocated segment.
    ///
    /// Returns `Err(ArenaError::InvalidConfig)` if `config` fails validation.
    pub fn new(config: ArenaConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        let segments = SegmentList::new(config.segment_bytes, config.max_segments)?;
        Ok(Self {
            segments: RefCell::new(segments),
            allocations: Cell::new(0),
            config,
        })
    }

    /// Allocate uninitialised storage for `count` values of `T`.
    ///
    /// The returned pointer is aligned for `T` and valid for `count` reads
    /// and writes until the arena is reset or dropped. Zero-sized requests
    /// return a dangling pointer and consume nothing.
    pub fn alloc_array<T>(&self, count: usize) -> Result<NonNull<T>, ArenaError> {
        let size = mem::size_of::<T>()
            .checked_mul(count)
            .filter(|&bytes| bytes <= isize::MAX as usize)
            .ok_or_else(|| ArenaError::CapacityExceeded {
                requested: count.saturating_mul(mem::size_of::<T>()),
                capacity: self.memory_bytes(),
            })?;
        if size == 0 {
            return Ok(NonNull::dangling());
        }
        let ptr = self
            .segments
            .borrow_mut()
            .alloc(size, mem::align_of::<T>())?;
        self.allocations.set(self.allocations.get() + 1);
        Ok(ptr.cast::<T>())
    }

    /// Reclaim every allocation at once, keeping the segments for reuse.
    pub fn reset(&mut self) {
        let segments = self.segments.get_mut();
        log::debug!(
            "arena reset: reclaiming {} bytes across {} segments",
            segments.total_used(),
            segments.segment_count(),
        );
        segments.reset();
        self.allocations.set(0);
    }

    /// Number of segments currently held.
    pub fn segment_count(&self) -> usize {
        self.segments.borrow().segment_count()
    }

    /// Bytes consumed since creation or the last reset, padding included.
    pub fn used_bytes(&self) -> usize {
        self.segments.borrow().total_used()
    }

    /// Total bytes held by the arena's segments.
    pub fn memory_bytes(&self) -> usize {
        self.segments.borrow().memory_bytes()
    }

    /// Number of non-empty allocations served since creation or the last reset.
    pub fn allocation_count(&self) -> usize {
        self.allocations.get()
    }

    /// The configuration this arena was built with.
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }
}

impl Default for Arena {
    /// An arena with [`ArenaConfig::default`].
    fn default() -> Self {
        let config = ArenaConfig::default();
        let segments = match SegmentList::new(config.segment_bytes, config.max_segments) {
            Ok(segments) => segments,
            Err(e) => panic!("default arena config failed: {e}"),
        };
        Self {
            segments: RefCell::new(segments),
            allocations: Cell::new(0),
            config,
        }
    }
}

impl fmt::Debug for Arena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("segments", &self.segment_count())
            .field("used_bytes", &self.used_bytes())
            .field("memory_bytes", &self.memory_bytes())
            .field("allocations", &self.allocation_count())
            .finish()
    }
}
