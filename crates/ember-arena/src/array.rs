//! Contiguous growable array with heap or arena backing.
//!
//! [`GrowableArray`] behaves like a standard vector from the caller's point
//! of view, but its storage can come from an [`Arena`] instead of the global
//! heap. The ownership mode is decided at construction and never changes for
//! the lifetime of the storage:
//!
//! - **Heap mode** (`arena() == None`): the array owns its buffer and
//!   releases it exactly once, on reallocation or drop.
//! - **Arena mode** (`arena() == Some(_)`): every buffer is drawn from the
//!   arena and is never released by the array; the arena reclaims it on
//!   reset. The `'a` lifetime ties the array to the arena, so the arena
//!   cannot be reset or dropped while the array is alive.
//!
//! In both modes the *elements* are owned by the array and dropped when
//! they leave the logical range (`clear`, shrinking `resize`, `truncate`,
//! `clone_from`, drop).
//!
//! # Growth policy
//!
//! Appending to a full array doubles the capacity, starting at 1, so `n`
//! pushes from empty perform `⌈log2 n⌉ + 1` reallocations. Reallocation
//! moves the live elements bitwise into the new buffer and invalidates every
//! outstanding pointer into the old one; borrowed slices and iterators
//! cannot outlive such a call.

#![allow(unsafe_code)]

use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut, Index, IndexMut};
use std::ptr::{self, NonNull};
use std::slice;

use crate::arena::Arena;
use crate::error::{ArenaError, ArrayError};
use crate::raw;

/// Index-addressable, resizable sequence of `T` with optional arena backing.
///
/// See the [module documentation](self) for the ownership model.
///
/// # Thread safety
///
/// The array is single-threaded in both modes: it is neither `Send` nor
/// `Sync`, so it cannot be moved into another thread or shared behind a
/// `Mutex`. An arena-backed array holds `&Arena`, and the arena allocates
/// through interior mutability without synchronisation. Heap mode keeps the
/// same type, and therefore the same restriction. Keep each array on the
/// thread that created it, and exchange plain `Vec`s or slices across
/// threads.
///
/// ```compile_fail
/// fn require_send<T: Send>() {}
/// require_send::<ember_arena::GrowableArray<'static, u32>>();
/// ```
///
/// ```compile_fail
/// fn require_sync<T: Sync>() {}
/// require_sync::<ember_arena::GrowableArray<'static, u32>>();
/// ```
pub struct GrowableArray<'a, T> {
    /// Start of storage. Dangling when `cap == 0` or `T` is zero-sized.
    ptr: NonNull<T>,
    /// Number of initialised elements at the front of the buffer.
    len: usize,
    /// Number of slots in the buffer.
    cap: usize,
    /// Storage source for every allocation this array makes.
    arena: Option<&'a Arena>,
    _owns: PhantomData<T>,
}

impl<'a, T> GrowableArray<'a, T> {
    /// Create an empty heap-backed array. Does not allocate.
    pub const fn new() -> Self {
        Self {
            ptr: NonNull::dangling(),
            len: 0,
            cap: 0,
            arena: None,
            _owns: PhantomData,
        }
    }

    /// Create an empty array whose storage will be drawn from `arena`.
    /// Does not allocate.
    pub const fn new_in(arena: &'a Arena) -> Self {
        Self {
            ptr: NonNull::dangling(),
            len: 0,
            cap: 0,
            arena: Some(arena),
            _owns: PhantomData,
        }
    }

    /// Create an empty heap-backed array with room for `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut array = Self::new();
        array.reserve(capacity);
        array
    }

    /// Create an empty arena-backed array with room for `capacity` elements.
    pub fn with_capacity_in(capacity: usize, arena: &'a Arena) -> Self {
        let mut array = Self::new_in(arena);
        array.reserve(capacity);
        array
    }

    /// Build an array holding exactly `values`, in order, with
    /// `capacity() == N`.
    pub fn from_array_in<const N: usize>(values: [T; N], arena: &'a Arena) -> Self {
        let mut array = Self::with_capacity_in(N, arena);
        for value in values {
            array.push_within_capacity(value);
        }
        array
    }

    /// The arena backing this array, if any.
    pub fn arena(&self) -> Option<&'a Arena> {
        self.arena
    }

    /// Whether storage is drawn from an arena.
    pub fn is_arena_backed(&self) -> bool {
        self.arena.is_some()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the array holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots allocated.
    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// The elements as a shared slice.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `ptr` is non-null and aligned (dangling only when no slot
        // is read), and the first `len` slots are initialised.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// The elements as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as in `as_slice`; `&mut self` guarantees exclusivity.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Raw pointer to the first slot. Invalidated by any reallocation.
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    /// Mutable raw pointer to the first slot. Invalidated by any reallocation.
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Bounds-checked shared access.
    pub fn at(&self, index: usize) -> Result<&T, ArrayError> {
        self.as_slice().get(index).ok_or(ArrayError::IndexOutOfRange {
            index,
            len: self.len,
        })
    }

    /// Bounds-checked mutable access.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, ArrayError> {
        let len = self.len;
        self.as_mut_slice()
            .get_mut(index)
            .ok_or(ArrayError::IndexOutOfRange { index, len })
    }

    /// First element.
    ///
    /// # Panics
    ///
    /// Panics if the array is empty.
    #[track_caller]
    pub fn front(&self) -> &T {
        match self.as_slice().first() {
            Some(v) => v,
            None => panic!("front() called on an empty GrowableArray"),
        }
    }

    /// Mutable first element.
    ///
    /// # Panics
    ///
    /// Panics if the array is empty.
    #[track_caller]
    pub fn front_mut(&mut self) -> &mut T {
        match self.as_mut_slice().first_mut() {
            Some(v) => v,
            None => panic!("front_mut() called on an empty GrowableArray"),
        }
    }

    /// Last element.
    ///
    /// # Panics
    ///
    /// Panics if the array is empty.
    #[track_caller]
    pub fn back(&self) -> &T {
        match self.as_slice().last() {
            Some(v) => v,
            None => panic!("back() called on an empty GrowableArray"),
        }
    }

    /// Mutable last element.
    ///
    /// # Panics
    ///
    /// Panics if the array is empty.
    #[track_caller]
    pub fn back_mut(&mut self) -> &mut T {
        match self.as_mut_slice().last_mut() {
            Some(v) => v,
            None => panic!("back_mut() called on an empty GrowableArray"),
        }
    }

    /// Ensure `capacity() >= new_capacity`.
    ///
    /// Unlike `Vec::reserve`, the argument is the total capacity, not the
    /// additional room. Never shrinks.
    ///
    /// # Panics
    ///
    /// Allocation failure is fatal: heap exhaustion aborts through
    /// [`std::alloc::handle_alloc_error`], anything else panics. Use
    /// [`try_reserve`](Self::try_reserve) to observe the failure instead.
    #[track_caller]
    pub fn reserve(&mut self, new_capacity: usize) {
        if let Err(e) = self.try_reserve(new_capacity) {
            fatal(e);
        }
    }

    /// Fallible form of [`reserve`](Self::reserve).
    ///
    /// On error the array is left untouched.
    pub fn try_reserve(&mut self, new_capacity: usize) -> Result<(), ArrayError> {
        if new_capacity <= self.cap {
            return Ok(());
        }
        let new_ptr = self.allocate(new_capacity)?;
        // SAFETY: the old buffer holds `len` initialised values and the new
        // one has room for `new_capacity > len`; the buffers are distinct
        // allocations. The copy is a move: the old slots are not read again.
        unsafe { ptr::copy_nonoverlapping(self.ptr.as_ptr(), new_ptr.as_ptr(), self.len) };
        log::trace!(
            "growable array realloc: {} -> {} slots ({})",
            self.cap,
            new_capacity,
            if self.arena.is_some() { "arena" } else { "heap" },
        );
        self.release_storage();
        self.ptr = new_ptr;
        self.cap = new_capacity;
        Ok(())
    }

    /// Append `value`, doubling capacity if full.
    #[track_caller]
    pub fn push(&mut self, value: T) {
        if self.len == self.cap {
            self.grow_for_push();
        }
        self.push_within_capacity(value);
    }

    /// Append a clone of `value`.
    #[track_caller]
    pub fn push_from(&mut self, value: &T)
    where
        T: Clone,
    {
        self.push(value.clone());
    }

    /// Construct a new element at the end from `make` and return it.
    ///
    /// Capacity grows before `make` runs; if `make` panics the array is
    /// unchanged apart from that growth.
    #[track_caller]
    pub fn emplace_with<F>(&mut self, make: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        if self.len == self.cap {
            self.grow_for_push();
        }
        self.push_within_capacity(make());
        self.back_mut()
    }

    /// Remove and return the last element, or `None` if empty.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: slot `len` was initialised and is now outside the logical
        // range, so it is read exactly once.
        Some(unsafe { self.ptr.as_ptr().add(self.len).read() })
    }

    /// Drop every element past `new_len`. No-op if `new_len >= len()`.
    /// Capacity is unchanged.
    pub fn truncate(&mut self, new_len: usize) {
        if new_len >= self.len {
            return;
        }
        let tail_len = self.len - new_len;
        // Shorten first so a panicking destructor cannot cause a double drop.
        self.len = new_len;
        // SAFETY: slots `new_len..new_len + tail_len` are initialised and no
        // longer reachable through the array.
        unsafe {
            let tail = ptr::slice_from_raw_parts_mut(self.ptr.as_ptr().add(new_len), tail_len);
            ptr::drop_in_place(tail);
        }
    }

    /// Drop every element. Capacity and storage are kept.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Set the length to `new_len`, filling new slots with clones of `value`
    /// or dropping the surplus.
    #[track_caller]
    pub fn resize(&mut self, new_len: usize, value: T)
    where
        T: Clone,
    {
        if new_len <= self.len {
            self.truncate(new_len);
            return;
        }
        self.reserve(new_len);
        while self.len + 1 < new_len {
            self.push_within_capacity(value.clone());
        }
        self.push_within_capacity(value);
    }

    /// Set the length to `new_len`, filling new slots from `fill`.
    #[track_caller]
    pub fn resize_with<F>(&mut self, new_len: usize, mut fill: F)
    where
        F: FnMut() -> T,
    {
        if new_len <= self.len {
            self.truncate(new_len);
            return;
        }
        self.reserve(new_len);
        while self.len < new_len {
            self.push_within_capacity(fill());
        }
    }

    /// Set the length to `new_len`, filling new slots with `T::default()`.
    #[track_caller]
    pub fn resize_default(&mut self, new_len: usize)
    where
        T: Default,
    {
        self.resize_with(new_len, T::default);
    }

    /// Append clones of every element in `values`.
    #[track_caller]
    pub fn extend_from_slice(&mut self, values: &[T])
    where
        T: Clone,
    {
        self.reserve_for_append(values.len());
        for value in values {
            self.push_within_capacity(value.clone());
        }
    }

    /// Move the contents out, leaving `self` empty with zero capacity.
    ///
    /// The returned array keeps the storage and the arena reference. `self`
    /// keeps its arena reference too, so later pushes draw from the same
    /// source.
    pub fn take(&mut self) -> Self {
        let taken = Self {
            ptr: self.ptr,
            len: self.len,
            cap: self.cap,
            arena: self.arena,
            _owns: PhantomData,
        };
        self.ptr = NonNull::dangling();
        self.len = 0;
        self.cap = 0;
        taken
    }

    /// Write `value` into slot `len`. Caller guarantees `len < cap`.
    fn push_within_capacity(&mut self, value: T) {
        debug_assert!(self.len < self.cap || raw::is_zero_sized::<T>());
        // SAFETY: `len < cap`, so the slot lies inside the buffer and is
        // uninitialised.
        unsafe { self.ptr.as_ptr().add(self.len).write(value) };
        self.len += 1;
    }

    /// Doubling step: 0 -> 1 -> 2 -> 4 -> ...
    #[track_caller]
    fn grow_for_push(&mut self) {
        let new_cap = if self.cap == 0 {
            1
        } else {
            match self.cap.checked_mul(2) {
                Some(cap) => cap,
                None => fatal(ArrayError::CapacityOverflow {
                    requested: self.cap,
                }),
            }
        };
        self.reserve(new_cap);
    }

    /// Make room for `additional` more elements, keeping the doubling policy.
    #[track_caller]
    fn reserve_for_append(&mut self, additional: usize) {
        let Some(required) = self.len.checked_add(additional) else {
            fatal(ArrayError::CapacityOverflow {
                requested: usize::MAX,
            });
        };
        if required <= self.cap {
            return;
        }
        let doubled = self.cap.saturating_mul(2).max(1);
        self.reserve(required.max(doubled));
    }

    /// Allocate `count` uninitialised slots from the current storage source.
    fn allocate(&self, count: usize) -> Result<NonNull<T>, ArrayError> {
        raw::array_layout::<T>(count)?;
        match self.arena {
            Some(arena) => Ok(arena.alloc_array::<T>(count)?),
            None => raw::heap_alloc::<T>(count),
        }
    }

    /// Give the current buffer back to its owner, if the array owns it.
    ///
    /// The only place that branches on the ownership mode. Elements are
    /// not dropped.
    fn release_storage(&mut self) {
        if self.arena.is_none() && self.cap > 0 {
            // SAFETY: in heap mode every non-empty buffer came from
            // `heap_alloc::<T>(self.cap)`, and the caller replaces or
            // forgets `ptr` immediately after this call.
            unsafe { raw::heap_release(self.ptr, self.cap) };
        }
    }

    /// Drop every element and release storage, leaving the array empty.
    fn destroy(&mut self) {
        self.clear();
        self.release_storage();
        self.ptr = NonNull::dangling();
        self.cap = 0;
    }
}

impl<'a, T: Clone> GrowableArray<'a, T> {
    /// Heap-backed array of `count` clones of `value`, with
    /// `capacity() == count`.
    pub fn from_elem(count: usize, value: T) -> Self {
        let mut array = Self::new();
        array.resize(count, value);
        array
    }

    /// Arena-backed array of `count` clones of `value`, with
    /// `capacity() == count`.
    pub fn from_elem_in(count: usize, value: T, arena: &'a Arena) -> Self {
        let mut array = Self::new_in(arena);
        array.resize(count, value);
        array
    }

    /// Heap-backed copy of `values`, with `capacity() == values.len()`.
    pub fn from_slice(values: &[T]) -> Self {
        let mut array = Self::new();
        array.extend_from_slice(values);
        array
    }

    /// Arena-backed copy of `values`, with `capacity() == values.len()`.
    pub fn from_slice_in(values: &[T], arena: &'a Arena) -> Self {
        let mut array = Self::new_in(arena);
        array.extend_from_slice(values);
        array
    }
}

#[track_caller]
fn fatal(e: ArrayError) -> ! {
    match e {
        ArrayError::AllocationFailed { bytes, align }
        | ArrayError::Arena(ArenaError::AllocationFailed { bytes, align }) => {
            if let Ok(layout) = std::alloc::Layout::from_size_align(bytes, align) {
                std::alloc::handle_alloc_error(layout);
            }
        }
        _ => {}
    }
    panic!("GrowableArray: {e}");
}

impl<T> Drop for GrowableArray<'_, T> {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl<T> Default for GrowableArray<'_, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T: Clone> Clone for GrowableArray<'a, T> {
    /// Deep copy sharing the same arena; `capacity()` matches the source.
    fn clone(&self) -> Self {
        let mut copy = match self.arena {
            Some(arena) => Self::new_in(arena),
            None => Self::new(),
        };
        copy.reserve(self.cap);
        for value in self.iter() {
            copy.push_within_capacity(value.clone());
        }
        copy
    }

    /// Copy-assign: drops the current contents, releases storage under the
    /// current ownership mode, then adopts `source`'s arena and contents.
    fn clone_from(&mut self, source: &Self) {
        self.destroy();
        self.arena = source.arena;
        self.reserve(source.cap);
        for value in source.iter() {
            self.push_within_capacity(value.clone());
        }
    }
}

impl<T> Deref for GrowableArray<'_, T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> DerefMut for GrowableArray<'_, T> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T> Index<usize> for GrowableArray<'_, T> {
    type Output = T;

    #[track_caller]
    fn index(&self, index: usize) -> &T {
        match self.at(index) {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<T> IndexMut<usize> for GrowableArray<'_, T> {
    #[track_caller]
    fn index_mut(&mut self, index: usize) -> &mut T {
        match self.at_mut(index) {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for GrowableArray<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq<GrowableArray<'_, T>> for GrowableArray<'_, T> {
    fn eq(&self, other: &GrowableArray<'_, T>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq> Eq for GrowableArray<'_, T> {}

impl<T: PartialEq> PartialEq<[T]> for GrowableArray<'_, T> {
    fn eq(&self, other: &[T]) -> bool {
        self.as_slice() == other
    }
}

impl<T: PartialEq, const N: usize> PartialEq<[T; N]> for GrowableArray<'_, T> {
    fn eq(&self, other: &[T; N]) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T, const N: usize> From<[T; N]> for GrowableArray<'_, T> {
    /// Heap-backed array holding `values` in order, with `capacity() == N`.
    fn from(values: [T; N]) -> Self {
        let mut array = Self::with_capacity(N);
        for value in values {
            array.push_within_capacity(value);
        }
        array
    }
}

impl<T> Extend<T> for GrowableArray<'_, T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve_for_append(iter.size_hint().0);
        for value in iter {
            self.push(value);
        }
    }
}

impl<'b, T: Copy + 'b> Extend<&'b T> for GrowableArray<'_, T> {
    fn extend<I: IntoIterator<Item = &'b T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T> FromIterator<T> for GrowableArray<'_, T> {
    /// Heap-backed array of the iterator's items.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut array = Self::new();
        array.extend(iter);
        array
    }
}

impl<'b, T> IntoIterator for &'b GrowableArray<'_, T> {
    type Item = &'b T;
    type IntoIter = slice::Iter<'b, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'b, T> IntoIterator for &'b mut GrowableArray<'_, T> {
    type Item = &'b mut T;
    type IntoIter = slice::IterMut<'b, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<'a, T> IntoIterator for GrowableArray<'a, T> {
    type Item = T;
    type IntoIter = IntoIter<'a, T>;

    fn into_iter(mut self) -> Self::IntoIter {
        let end = self.len;
        // The iterator now owns the elements; the array only keeps the
        // storage so that its drop releases it under the right mode.
        self.len = 0;
        IntoIter {
            storage: self,
            next: 0,
            end,
        }
    }
}

/// Owning iterator over the elements of a [`GrowableArray`].
///
/// Elements not yielded are dropped with the iterator; the storage is
/// released (heap mode) or left to the arena.
pub struct IntoIter<'a, T> {
    /// Holds the buffer with `len == 0`; slots `next..end` are live.
    storage: GrowableArray<'a, T>,
    next: usize,
    end: usize,
}

impl<T> Iterator for IntoIter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.next == self.end {
            return None;
        }
        // SAFETY: slots `next..end` are initialised and each is read once,
        // because `next` advances past it.
        let value = unsafe { self.storage.ptr.as_ptr().add(self.next).read() };
        self.next += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.next;
        (remaining, Some(remaining))
    }
}

impl<T> DoubleEndedIterator for IntoIter<'_, T> {
    fn next_back(&mut self) -> Option<T> {
        if self.next == self.end {
            return None;
        }
        self.end -= 1;
        // SAFETY: slot `end` is initialised and now outside `next..end`.
        Some(unsafe { self.storage.ptr.as_ptr().add(self.end).read() })
    }
}

impl<T> ExactSizeIterator for IntoIter<'_, T> {}

impl<T> FusedIterator for IntoIter<'_, T> {}

impl<T> Drop for IntoIter<'_, T> {
    fn drop(&mut self) {
        let remaining = self.end - self.next;
        let start = self.next;
        self.next = self.end;
        // SAFETY: slots `start..start + remaining` are initialised and were
        // never yielded.
        unsafe {
            let rest =
                ptr::slice_from_raw_parts_mut(self.storage.ptr.as_ptr().add(start), remaining);
            ptr::drop_in_place(rest);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::config::ArenaConfig;

    /// Element that counts live instances through a shared counter.
    #[derive(Debug)]
    struct Tracked {
        live: Rc<Cell<usize>>,
        value: u32,
    }

    impl Tracked {
        fn new(live: &Rc<Cell<usize>>, value: u32) -> Self {
            live.set(live.get() + 1);
            Self {
                live: Rc::clone(live),
                value,
            }
        }
    }

    impl Clone for Tracked {
        fn clone(&self) -> Self {
            Self::new(&self.live, self.value)
        }
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.live.set(self.live.get() - 1);
        }
    }

    fn small_arena() -> Arena {
        Arena::new(ArenaConfig::new(256).with_max_segments(16)).unwrap()
    }

    #[test]
    fn new_is_empty_and_unallocated() {
        let before = raw::heap_counters();
        let a: GrowableArray<'_, u32> = GrowableArray::new();
        assert!(a.is_empty());
        assert_eq!(a.len(), 0);
        assert_eq!(a.capacity(), 0);
        assert!(!a.is_arena_backed());
        drop(a);
        assert_eq!(raw::heap_counters(), before);
    }

    #[test]
    fn new_in_records_arena_without_allocating() {
        let arena = small_arena();
        let a: GrowableArray<'_, u32> = GrowableArray::new_in(&arena);
        assert!(a.is_arena_backed());
        assert!(ptr::eq(a.arena().unwrap(), &arena));
        assert_eq!(arena.allocation_count(), 0);
    }

    #[test]
    fn from_elem_fills_every_slot() {
        let a = GrowableArray::from_elem(4, 7u8);
        assert_eq!(a, [7, 7, 7, 7]);
        assert_eq!(a.capacity(), 4);
    }

    #[test]
    fn from_elem_in_draws_from_arena() {
        let arena = small_arena();
        let a = GrowableArray::from_elem_in(3, 1.5f32, &arena);
        assert_eq!(a, [1.5, 1.5, 1.5]);
        assert_eq!(arena.allocation_count(), 1);
    }

    #[test]
    fn from_array_preserves_order_and_capacity() {
        let a = GrowableArray::from([1, 2, 3]);
        assert_eq!(a.len(), 3);
        assert_eq!(a.capacity(), 3);
        assert_eq!(a, [1, 2, 3]);
    }

    #[test]
    fn push_doubles_capacity_from_one() {
        let mut a = GrowableArray::new();
        let mut seen = Vec::new();
        for i in 0..9u32 {
            a.push(i);
            seen.push(a.capacity());
        }
        assert_eq!(seen, vec![1, 2, 4, 4, 8, 8, 8, 8, 16]);
    }

    #[test]
    fn pushes_reallocate_logarithmically() {
        let (allocs_before, _) = raw::heap_counters();
        let mut a = GrowableArray::new();
        for i in 0..1000u32 {
            a.push(i);
        }
        let (allocs_after, _) = raw::heap_counters();
        // 1, 2, 4, ..., 1024
        assert_eq!(allocs_after - allocs_before, 11);
        assert!(a.iter().copied().eq(0..1000));
    }

    #[test]
    fn heap_storage_released_exactly_once_per_allocation() {
        let (allocs, releases) = raw::heap_counters();
        {
            let mut a = GrowableArray::new();
            for i in 0..20u64 {
                a.push(i);
            }
        }
        let (allocs_after, releases_after) = raw::heap_counters();
        assert_eq!(allocs_after - allocs, releases_after - releases);
    }

    #[test]
    fn arena_mode_never_releases_through_heap() {
        let arena = small_arena();
        let before = raw::heap_counters();
        {
            let mut a = GrowableArray::new_in(&arena);
            for i in 0..100u32 {
                a.push(i);
            }
            let copy = a.clone();
            assert_eq!(copy.len(), 100);
            a.reserve(500);
            a.clear();
        }
        assert_eq!(raw::heap_counters(), before);
        assert!(arena.allocation_count() > 7);
    }

    #[test]
    fn at_reports_out_of_range() {
        let mut a = GrowableArray::from([10, 20]);
        assert_eq!(a.at(1), Ok(&20));
        assert_eq!(
            a.at(2),
            Err(ArrayError::IndexOutOfRange { index: 2, len: 2 })
        );
        *a.at_mut(0).unwrap() = 11;
        assert_eq!(a[0], 11);
        assert!(a.at_mut(5).is_err());
    }

    #[test]
    #[should_panic(expected = "index 3 out of range for array of length 3")]
    fn index_past_len_panics() {
        let a = GrowableArray::from([1, 2, 3]);
        let _ = a[3];
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn index_within_capacity_but_past_len_panics() {
        let mut a = GrowableArray::with_capacity(8);
        a.push(1u8);
        a[4] = 2;
    }

    #[test]
    fn front_and_back() {
        let mut a = GrowableArray::from(['a', 'b', 'c']);
        assert_eq!(*a.front(), 'a');
        assert_eq!(*a.back(), 'c');
        *a.back_mut() = 'z';
        *a.front_mut() = 'y';
        assert_eq!(a, ['y', 'b', 'z']);
    }

    #[test]
    #[should_panic(expected = "front() called on an empty GrowableArray")]
    fn front_on_empty_panics() {
        let a: GrowableArray<'_, u8> = GrowableArray::new();
        let _ = a.front();
    }

    #[test]
    #[should_panic(expected = "back() called on an empty GrowableArray")]
    fn back_on_empty_panics() {
        let a: GrowableArray<'_, u8> = GrowableArray::new();
        let _ = a.back();
    }

    #[test]
    fn reserve_never_shrinks() {
        let mut a: GrowableArray<'_, u16> = GrowableArray::with_capacity(10);
        a.reserve(4);
        assert_eq!(a.capacity(), 10);
        a.reserve(12);
        assert_eq!(a.capacity(), 12);
    }

    #[test]
    fn reserve_moves_elements_in_order() {
        let mut a = GrowableArray::from([String::from("x"), String::from("y")]);
        a.reserve(64);
        assert_eq!(a.capacity(), 64);
        assert_eq!(a, [String::from("x"), String::from("y")]);
    }

    #[test]
    fn try_reserve_overflow_leaves_array_intact() {
        let mut a = GrowableArray::from([1u64, 2]);
        let result = a.try_reserve(usize::MAX);
        assert!(matches!(result, Err(ArrayError::CapacityOverflow { .. })));
        assert_eq!(a, [1, 2]);
        assert_eq!(a.capacity(), 2);
    }

    #[test]
    fn try_reserve_reports_refused_arena_segment() {
        let arena = Arena::default();
        let mut a: GrowableArray<'_, u8> = GrowableArray::new_in(&arena);
        a.push(1);
        let result = a.try_reserve(1 << 62);
        let Err(ArrayError::Arena(ArenaError::AllocationFailed { bytes, .. })) = result else {
            panic!("expected a refused segment, got {result:?}");
        };
        assert_eq!(bytes, 1 << 62);
        assert_eq!(a, [1]);
        assert_eq!(a.capacity(), 1);
        // The arena is still usable after the refusal.
        a.push(2);
        assert_eq!(a, [1, 2]);
    }

    #[test]
    fn try_reserve_reports_refused_heap_allocation() {
        let mut a: GrowableArray<'_, u8> = GrowableArray::new();
        let result = a.try_reserve(1 << 62);
        assert!(matches!(result, Err(ArrayError::AllocationFailed { .. })));
        assert!(a.is_empty());
    }

    #[test]
    fn try_reserve_reports_arena_exhaustion() {
        let arena = Arena::new(ArenaConfig::new(256).with_max_segments(1)).unwrap();
        let mut a: GrowableArray<'_, u64> = GrowableArray::new_in(&arena);
        assert!(a.try_reserve(16).is_ok());
        let result = a.try_reserve(1024);
        assert!(matches!(result, Err(ArrayError::Arena(_))));
        assert_eq!(a.capacity(), 16);
    }

    #[test]
    #[should_panic(expected = "arena allocation failed")]
    fn reserve_panics_on_arena_exhaustion() {
        let arena = Arena::new(ArenaConfig::new(256).with_max_segments(1)).unwrap();
        let mut a: GrowableArray<'_, u64> = GrowableArray::new_in(&arena);
        a.reserve(1024);
    }

    #[test]
    fn resize_grow_shrink_grow() {
        let mut a = GrowableArray::new();
        a.resize(5, 9);
        a.resize(2, 0);
        a.resize(4, 7);
        assert_eq!(a.len(), 4);
        assert_eq!(a, [9, 9, 7, 7]);
        assert_eq!(a.capacity(), 5);
    }

    #[test]
    fn resize_default_fills_with_default() {
        let mut a: GrowableArray<'_, i32> = GrowableArray::new();
        a.resize_default(3);
        assert_eq!(a, [0, 0, 0]);
    }

    #[test]
    fn resize_with_calls_fill_per_new_slot() {
        let mut next = 0;
        let mut a = GrowableArray::new();
        a.resize_with(4, || {
            next += 1;
            next
        });
        assert_eq!(a, [1, 2, 3, 4]);
    }

    #[test]
    fn clear_keeps_capacity_and_drops_elements() {
        let live = Rc::new(Cell::new(0));
        let mut a = GrowableArray::new();
        for i in 0..5 {
            a.push(Tracked::new(&live, i));
        }
        let cap = a.capacity();
        a.clear();
        assert!(a.is_empty());
        assert_eq!(a.capacity(), cap);
        assert_eq!(live.get(), 0);
    }

    #[test]
    fn clear_and_pop_on_empty_are_no_ops() {
        let mut a: GrowableArray<'_, u8> = GrowableArray::new();
        a.clear();
        assert!(a.is_empty());
        assert_eq!(a.pop(), None);
        assert_eq!(a.len(), 0);
        assert_eq!(a.capacity(), 0);
    }

    #[test]
    fn pop_returns_last() {
        let mut a = GrowableArray::from([1, 2, 3]);
        assert_eq!(a.pop(), Some(3));
        assert_eq!(a.pop(), Some(2));
        assert_eq!(a, [1]);
        assert_eq!(a.capacity(), 3);
    }

    #[test]
    fn shrinking_resize_drops_surplus() {
        let live = Rc::new(Cell::new(0));
        let mut a = GrowableArray::new();
        a.resize(6, Tracked::new(&live, 1));
        assert_eq!(live.get(), 6);
        a.truncate(2);
        assert_eq!(live.get(), 2);
        a.resize(1, Tracked::new(&live, 2));
        assert_eq!(live.get(), 1);
    }

    #[test]
    fn drop_releases_elements_in_arena_mode() {
        let arena = small_arena();
        let live = Rc::new(Cell::new(0));
        {
            let mut a = GrowableArray::new_in(&arena);
            for i in 0..10 {
                a.push(Tracked::new(&live, i));
            }
            assert_eq!(live.get(), 10);
        }
        assert_eq!(live.get(), 0);
    }

    #[test]
    fn emplace_with_constructs_in_place() {
        struct NoDefault(u32);
        let mut a = GrowableArray::new();
        let slot = a.emplace_with(|| NoDefault(5));
        slot.0 += 1;
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].0, 6);
        a.emplace_with(|| NoDefault(9));
        assert_eq!(a.capacity(), 2);
    }

    #[test]
    fn push_from_copies() {
        let original = String::from("copy me");
        let mut a = GrowableArray::new();
        a.push_from(&original);
        assert_eq!(a[0], original);
    }

    #[test]
    fn clone_is_deep_and_matches_capacity() {
        let mut a = GrowableArray::with_capacity(10);
        a.extend_from_slice(&[String::from("a"), String::from("b")]);
        let mut b = a.clone();
        assert_eq!(b.capacity(), 10);
        b[0].push('!');
        b.push(String::from("c"));
        assert_eq!(a, [String::from("a"), String::from("b")]);
        assert_eq!(b.len(), 3);
    }

    #[test]
    fn clone_shares_arena() {
        let arena = small_arena();
        let mut a = GrowableArray::with_capacity_in(10, &arena);
        a.extend_from_slice(&[1, 2, 3]);
        let b = a.clone();
        assert!(ptr::eq(b.arena().unwrap(), &arena));
        assert_eq!(b.capacity(), a.capacity());
        assert_eq!(b.capacity(), 10);
        assert_eq!(b, [1, 2, 3]);
        assert_eq!(arena.allocation_count(), 2);
        assert_ne!(a.as_ptr(), b.as_ptr());
    }

    #[test]
    fn clone_from_adopts_source_arena_and_contents() {
        let arena = small_arena();
        let live = Rc::new(Cell::new(0));
        let source = GrowableArray::from_array_in(
            [Tracked::new(&live, 1), Tracked::new(&live, 2)],
            &arena,
        );
        let mut target = GrowableArray::new();
        for i in 0..4 {
            target.push(Tracked::new(&live, 10 + i));
        }
        assert_eq!(live.get(), 6);

        let (_, releases_before) = raw::heap_counters();
        target.clone_from(&source);
        let (_, releases_after) = raw::heap_counters();

        assert_eq!(releases_after - releases_before, 1, "old heap buffer released");
        assert!(target.is_arena_backed());
        assert_eq!(live.get(), 4);
        let values: Vec<u32> = target.iter().map(|t| t.value).collect();
        assert_eq!(values, vec![1, 2]);
    }

    #[test]
    fn take_empties_source() {
        let arena = small_arena();
        let mut a = GrowableArray::from_slice_in(&[4, 5, 6], &arena);
        let b = a.take();
        assert_eq!(b, [4, 5, 6]);
        assert!(b.is_arena_backed());
        assert_eq!(a.len(), 0);
        assert_eq!(a.capacity(), 0);
        assert!(a.is_arena_backed());
        a.push(1);
        assert_eq!(a, [1]);
    }

    #[test]
    fn move_assign_releases_previous_contents() {
        let live = Rc::new(Cell::new(0));
        let mut a = GrowableArray::from([Tracked::new(&live, 1)]);
        let mut b = GrowableArray::from([Tracked::new(&live, 2), Tracked::new(&live, 3)]);
        assert_eq!(live.get(), 3);
        assert_eq!(b.len(), 2);
        b = a.take();
        assert_eq!(live.get(), 1);
        assert_eq!(b.len(), 1);
        assert_eq!(b[0].value, 1);
        assert!(a.is_empty());
    }

    #[test]
    fn iteration_covers_logical_range_only() {
        let mut a = GrowableArray::with_capacity(16);
        a.extend([1, 2, 3]);
        let collected: Vec<_> = a.iter().copied().collect();
        assert_eq!(collected, vec![1, 2, 3]);
        for v in &mut a {
            *v *= 10;
        }
        assert_eq!(a, [10, 20, 30]);
        // Offset traversal, like `begin() + 1`.
        assert_eq!(a.iter().nth(1), Some(&20));
    }

    #[test]
    fn owning_iterator_drops_unyielded() {
        let live = Rc::new(Cell::new(0));
        let arena = small_arena();
        let mut a = GrowableArray::new_in(&arena);
        for i in 0..4 {
            a.push(Tracked::new(&live, i));
        }
        let mut iter = a.into_iter();
        let first = iter.next().unwrap();
        let last = iter.next_back().unwrap();
        assert_eq!((first.value, last.value), (0, 3));
        assert_eq!(iter.len(), 2);
        drop(iter);
        assert_eq!(live.get(), 2);
        drop((first, last));
        assert_eq!(live.get(), 0);
    }

    #[test]
    fn owning_iterator_releases_heap_storage() {
        let (allocs, releases) = raw::heap_counters();
        let a = GrowableArray::from([1u32, 2, 3]);
        let sum: u32 = a.into_iter().sum();
        assert_eq!(sum, 6);
        let (allocs_after, releases_after) = raw::heap_counters();
        assert_eq!(allocs_after - allocs, 1);
        assert_eq!(releases_after - releases, 1);
    }

    #[test]
    fn zero_sized_elements() {
        let mut a = GrowableArray::new();
        for _ in 0..10 {
            a.push(());
        }
        assert_eq!(a.len(), 10);
        assert_eq!(a.capacity(), 16);
        assert_eq!(a.pop(), Some(()));
    }

    #[test]
    fn collect_and_extend() {
        let mut a: GrowableArray<'_, u32> = (1..=3).collect();
        a.extend(&[4, 5]);
        assert_eq!(a, [1, 2, 3, 4, 5]);
        assert!(!a.is_arena_backed());
    }

    #[test]
    fn debug_formats_as_list() {
        let a = GrowableArray::from([1, 2]);
        assert_eq!(format!("{a:?}"), "[1, 2]");
    }

    #[test]
    fn over_aligned_elements_in_arena() {
        #[derive(Clone, Copy, Debug, PartialEq)]
        #[repr(align(64))]
        struct Wide(u8);

        let arena = small_arena();
        let mut a = GrowableArray::new_in(&arena);
        for i in 0..5 {
            a.push(Wide(i));
        }
        assert_eq!(a.as_ptr() as usize % 64, 0);
        assert_eq!(a[4], Wide(4));
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Clone, Debug)]
        enum Op {
            Push(u16),
            Pop,
            Clear,
            Reserve(u8),
            Resize(u8, u16),
            Truncate(u8),
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                4 => any::<u16>().prop_map(Op::Push),
                1 => Just(Op::Pop),
                1 => Just(Op::Clear),
                1 => any::<u8>().prop_map(Op::Reserve),
                1 => (any::<u8>(), any::<u16>()).prop_map(|(n, v)| Op::Resize(n, v)),
                1 => any::<u8>().prop_map(Op::Truncate),
            ]
        }

        fn apply(a: &mut GrowableArray<'_, u16>, model: &mut Vec<u16>, op: &Op) {
            match *op {
                Op::Push(v) => {
                    a.push(v);
                    model.push(v);
                }
                Op::Pop => {
                    assert_eq!(a.pop(), model.pop());
                }
                Op::Clear => {
                    a.clear();
                    model.clear();
                }
                Op::Reserve(n) => a.reserve(n as usize),
                Op::Resize(n, v) => {
                    a.resize(n as usize, v);
                    model.resize(n as usize, v);
                }
                Op::Truncate(n) => {
                    a.truncate(n as usize);
                    model.truncate(n as usize);
                }
            }
        }

        proptest! {
            #[test]
            fn heap_array_matches_vec_model(ops in proptest::collection::vec(op(), 0..64)) {
                let mut a = GrowableArray::new();
                let mut model = Vec::new();
                for op in &ops {
                    apply(&mut a, &mut model, op);
                    prop_assert!(a.len() <= a.capacity());
                    prop_assert_eq!(a.as_slice(), model.as_slice());
                }
            }

            #[test]
            fn arena_array_matches_vec_model(ops in proptest::collection::vec(op(), 0..64)) {
                let arena = Arena::default();
                let before = raw::heap_counters();
                let mut a = GrowableArray::new_in(&arena);
                let mut model = Vec::new();
                for op in &ops {
                    apply(&mut a, &mut model, op);
                    prop_assert!(a.len() <= a.capacity());
                    prop_assert_eq!(a.as_slice(), model.as_slice());
                }
                drop(a);
                prop_assert_eq!(raw::heap_counters(), before);
            }

            #[test]
            fn push_capacity_is_next_power_of_two(n in 1usize..2000) {
                let mut a = GrowableArray::new();
                for i in 0..n {
                    a.push(i);
                }
                prop_assert_eq!(a.len(), n);
                prop_assert_eq!(a.capacity(), n.next_power_of_two());
                for (i, v) in a.iter().enumerate() {
                    prop_assert_eq!(*v, i);
                }
            }

            #[test]
            fn clone_is_independent(values in proptest::collection::vec(any::<i32>(), 0..50)) {
                let a: GrowableArray<'_, i32> = values.iter().copied().collect();
                let mut b = a.clone();
                b.push(1);
                for v in b.iter_mut() {
                    *v = v.wrapping_add(1);
                }
                prop_assert_eq!(a.as_slice(), values.as_slice());
                prop_assert!(b.capacity() >= a.capacity());
            }
        }
    }
}
