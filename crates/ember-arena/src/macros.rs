//! Literal construction of [`GrowableArray`](crate::GrowableArray)s.

/// Build a [`GrowableArray`](crate::GrowableArray) from a literal list.
///
/// - `growable_array![a, b, c]`: heap-backed, `capacity() == 3`
/// - `growable_array![in &arena; a, b, c]`: arena-backed, `capacity() == 3`
/// - `growable_array![value; n]`: heap-backed, `n` clones of `value`
///
/// ```
/// use ember_arena::{growable_array, Arena};
///
/// let arena = Arena::default();
/// let heap = growable_array![1, 2, 3];
/// let framed = growable_array![in &arena; 1, 2, 3];
/// assert_eq!(heap, framed);
/// assert_eq!(growable_array![0u8; 4], [0, 0, 0, 0]);
/// ```
#[macro_export]
macro_rules! growable_array {
    () => {
        $crate::GrowableArray::new()
    };
    (in $arena:expr; $($x:expr),* $(,)?) => {
        $crate::GrowableArray::from_array_in([$($x),*], $arena)
    };
    ($elem:expr; $n:expr) => {
        $crate::GrowableArray::from_elem($n, $elem)
    };
    ($($x:expr),* $(,)?) => {
        $crate::GrowableArray::from([$($x),*])
    };
}
