//! Contiguous memory segments and growable segment lists.
//!
//! A [`Segment`] is a fixed-size block of raw bytes with bump allocation.
//! A [`SegmentList`] is a growable collection of segments that overflows
//! into new segments when the current one is full.

use std::ptr::NonNull;

use crate::error::ArenaError;
use crate::raw::{RawSegment, SEGMENT_ALIGN};

/// A single contiguous memory segment with bump allocation.
///
/// Segments are the fundamental storage unit of the arena. Memory handed
/// out is uninitialised. Segments are never freed during runtime, only
/// reset, or dropped together with the arena.
pub struct Segment {
    /// Backing storage, allocated to full size at creation.
    raw: RawSegment,
    /// Bump pointer: next free byte offset.
    cursor: usize,
}

impl Segment {
    /// Create a new segment of `bytes` bytes.
    pub fn new(bytes: usize) -> Result<Self, ArenaError> {
        Ok(Self {
            raw: RawSegment::new(bytes)?,
            cursor: 0,
        })
    }

    /// Bump-allocate `size` bytes aligned to `align`.
    ///
    /// `align` must be a power of two. Returns `None` if the aligned request
    /// does not fit in the remaining space.
    pub fn alloc(&mut self, size: usize, align: usize) -> Option<NonNull<u8>> {
        debug_assert!(align.is_power_of_two());
        let base = self.raw.base_addr();
        let unaligned = base.checked_add(self.cursor)?;
        let aligned = unaligned.checked_add(align - 1)? & !(align - 1);
        let offset = aligned - base;
        let end = offset.checked_add(size)?;
        if end > self.raw.len() {
            return None;
        }
        self.cursor = end;
        Some(self.raw.ptr_at(offset))
    }

    /// Reset the bump pointer to zero without deallocating.
    ///
    /// All previous allocations become invalid.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Number of bytes consumed, alignment padding included.
    pub fn used(&self) -> usize {
        self.cursor
    }

    /// Total capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.raw.len()
    }

    /// Remaining free bytes (before alignment padding).
    pub fn remaining(&self) -> usize {
        self.raw.len() - self.cursor
    }
}

/// A growable list of [`Segment`]s with overflow-based bump allocation.
///
/// When the current segment is full, later segments are tried and, failing
/// that, a new segment is appended (up to `max_segments`). Allocations are
/// never split across segments. A request that cannot fit in a regular
/// segment gets a dedicated segment sized to fit.
pub struct SegmentList {
    segments: Vec<Segment>,
    segment_bytes: usize,
    max_segments: u16,
    /// Index of the segment currently being filled.
    current: usize,
}

impl SegmentList {
    /// Create a new segment list with one pre-allocated segment.
    pub fn new(segment_bytes: usize, max_segments: u16) -> Result<Self, ArenaError> {
        let mut segments = Vec::with_capacity(max_segments as usize);
        segments.push(Segment::new(segment_bytes)?);
        Ok(Self {
            segments,
            segment_bytes,
            max_segments,
            current: 0,
        })
    }

    /// Bump-allocate `size` bytes aligned to `align`, growing if needed.
    ///
    /// Returns `Err(ArenaError::CapacityExceeded)` if a new segment is
    /// required and `max_segments` is already reached.
    pub fn alloc(&mut self, size: usize, align: usize) -> Result<NonNull<u8>, ArenaError> {
        // Try the current segment, then any later segment left over from
        // before a reset.
        for index in self.current..self.segments.len() {
            if let Some(ptr) = self.segments[index].alloc(size, align) {
                self.current = index;
                return Ok(ptr);
            }
        }

        if self.segments.len() >= self.max_segments as usize {
            return Err(ArenaError::CapacityExceeded {
                requested: size,
                capacity: self.memory_bytes(),
            });
        }

        // A fresh segment starts on a SEGMENT_ALIGN boundary, so padding is
        // only needed for over-aligned types.
        let padding = if align <= SEGMENT_ALIGN { 0 } else { align - 1 };
        let needed = size.checked_add(padding).ok_or(ArenaError::CapacityExceeded {
            requested: size,
            capacity: self.memory_bytes(),
        })?;
        let dedicated = needed > self.segment_bytes;
        let mut seg = Segment::new(needed.max(self.segment_bytes))?;
        let ptr = seg
            .alloc(size, align)
            .ok_or(ArenaError::CapacityExceeded {
                requested: size,
                capacity: seg.capacity(),
            })?;
        log::debug!(
            "arena opened {} segment #{} ({} bytes)",
            if dedicated { "dedicated" } else { "regular" },
            self.segments.len(),
            seg.capacity(),
        );
        self.segments.push(seg);
        // A dedicated segment is full by construction; keep filling the
        // regular segment we were on.
        if !dedicated {
            self.current = self.segments.len() - 1;
        }
        Ok(ptr)
    }

    /// Reset all segments' bump pointers without deallocating.
    ///
    /// After reset, allocations start from segment 0 again.
    pub fn reset(&mut self) {
        for seg in &mut self.segments {
            seg.reset();
        }
        self.current = 0;
    }

    /// Total number of segments currently allocated.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Total memory held across all segments in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.segments.iter().map(Segment::capacity).sum()
    }

    /// Total bytes consumed across all segments.
    pub fn total_used(&self) -> usize {
        self.segments.iter().map(Segment::used).sum()
    }
}
