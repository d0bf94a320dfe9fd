//! Low-level allocation primitives.
//!
//! Everything here touches the global allocator directly. Two kinds of
//! storage are produced:
//!
//! - typed heap buffers for [`GrowableArray`](crate::GrowableArray) when it
//!   owns its memory (`heap_alloc` / `heap_release`, paired exactly once);
//! - untyped, aligned byte blocks ([`RawSegment`]) that back arena segments
//!   and are released only when the arena itself is dropped.
//!
//! Every `unsafe` block carries a `// SAFETY:` comment.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::mem;
use std::ptr::NonNull;

use crate::error::{ArenaError, ArrayError};

/// Base alignment of every arena segment.
pub(crate) const SEGMENT_ALIGN: usize = 16;

#[cfg(test)]
thread_local! {
    static HEAP_ALLOCS: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
    static HEAP_RELEASES: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

/// Per-thread count of `(heap_alloc, heap_release)` calls that reached the
/// global allocator.
#[cfg(test)]
pub(crate) fn heap_counters() -> (usize, usize) {
    (
        HEAP_ALLOCS.with(|c| c.get()),
        HEAP_RELEASES.with(|c| c.get()),
    )
}

/// Layout for `count` values of `T`, or `CapacityOverflow`.
pub(crate) fn array_layout<T>(count: usize) -> Result<Layout, ArrayError> {
    Layout::array::<T>(count).map_err(|_| ArrayError::CapacityOverflow { requested: count })
}

/// Allocate uninitialised heap storage for `count` values of `T`.
///
/// Zero-sized requests (either `count == 0` or a zero-sized `T`) do not
/// reach the allocator and return a dangling, well-aligned pointer.
pub(crate) fn heap_alloc<T>(count: usize) -> Result<NonNull<T>, ArrayError> {
    let layout = array_layout::<T>(count)?;
    if layout.size() == 0 {
        return Ok(NonNull::dangling());
    }
    // SAFETY: `layout` has non-zero size, checked above.
    let ptr = unsafe { alloc::alloc(layout) };
    #[cfg(test)]
    HEAP_ALLOCS.with(|c| c.set(c.get() + 1));
    NonNull::new(ptr.cast::<T>()).ok_or(ArrayError::AllocationFailed {
        bytes: layout.size(),
        align: layout.align(),
    })
}

/// Release storage obtained from [`heap_alloc`].
///
/// # Safety
///
/// `ptr` must have been returned by `heap_alloc::<T>(count)` with this exact
/// `count`, and must not have been released already. The contents are not
/// dropped.
pub(crate) unsafe fn heap_release<T>(ptr: NonNull<T>, count: usize) {
    let Ok(layout) = Layout::array::<T>(count) else {
        return;
    };
    if layout.size() == 0 {
        return;
    }
    #[cfg(test)]
    HEAP_RELEASES.with(|c| c.set(c.get() + 1));
    // SAFETY: caller guarantees `ptr` came from `alloc::alloc(layout)` with the
    // same layout and has not been freed.
    unsafe { alloc::dealloc(ptr.as_ptr().cast::<u8>(), layout) }
}

/// Whether `T` occupies no storage.
pub(crate) const fn is_zero_sized<T>() -> bool {
    mem::size_of::<T>() == 0
}

/// An owned, aligned, uninitialised block of bytes backing one arena segment.
///
/// Freed on drop. Pointers handed out by [`RawSegment::ptr_at`] stay valid
/// for as long as the segment is alive; the block never moves.
pub(crate) struct RawSegment {
    ptr: NonNull<u8>,
    layout: Layout,
}

impl RawSegment {
    /// Allocate a block of `size` bytes aligned to [`SEGMENT_ALIGN`].
    ///
    /// Returns `Err(ArenaError::AllocationFailed)` if the global allocator
    /// refuses the request.
    pub(crate) fn new(size: usize) -> Result<Self, ArenaError> {
        let layout = Layout::from_size_align(size.max(1), SEGMENT_ALIGN).map_err(|_| {
            ArenaError::CapacityExceeded {
                requested: size,
                capacity: isize::MAX as usize,
            }
        })?;
        // SAFETY: `layout` has non-zero size (`size.max(1)`).
        let ptr = unsafe { alloc::alloc(layout) };
        match NonNull::new(ptr) {
            Some(ptr) => Ok(Self { ptr, layout }),
            None => Err(ArenaError::AllocationFailed {
                bytes: layout.size(),
                align: layout.align(),
            }),
        }
    }

    /// Start address of the block.
    pub(crate) fn base_addr(&self) -> usize {
        self.ptr.as_ptr() as usize
    }

    /// Size of the block in bytes.
    pub(crate) fn len(&self) -> usize {
        self.layout.size()
    }

    /// Pointer `offset` bytes into the block.
    ///
    /// # Panics
    ///
    /// Panics if `offset` lies beyond the end of the block.
    pub(crate) fn ptr_at(&self, offset: usize) -> NonNull<u8> {
        assert!(
            offset <= self.len(),
            "segment offset {offset} beyond block of {} bytes",
            self.len()
        );
        // SAFETY: `offset <= len`, so the result stays within (or one past)
        // the allocated block and cannot wrap to null.
        unsafe { NonNull::new_unchecked(self.ptr.as_ptr().add(offset)) }
    }
}

impl Drop for RawSegment {
    fn drop(&mut self) {
        // SAFETY: `ptr` was allocated in `new` with exactly `self.layout`
        // and is freed only here.
        unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) }
    }
}
