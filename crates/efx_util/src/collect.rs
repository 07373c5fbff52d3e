//! Small helpers over `Vec` that tolerate out-of-range arguments.

use std::cmp::Ordering;

/// Removes the first element matching `cond`. Returns whether one was removed.
pub fn remove<T>(list: &mut Vec<T>, cond: impl Fn(&T) -> bool) -> bool {
    match list.iter().position(cond) {
        Some(idx) => {
            list.remove(idx);
            true
        }
        None => false,
    }
}

/// Inserts at `idx`, or appends when `idx` is `None` or past the end.
pub fn insert<T>(list: &mut Vec<T>, element: T, idx: Option<usize>) {
    let idx = idx.map_or(list.len(), |idx| idx.min(list.len()));
    list.insert(idx, element);
}

/// Sorts by a "comes before" predicate.
pub fn sort<T>(list: &mut [T], less: impl Fn(&T, &T) -> bool) {
    list.sort_by(|a, b| {
        if less(a, b) {
            Ordering::Less
        } else if less(b, a) {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    });
}

pub fn exist<T>(list: &[T], cond: impl Fn(&T) -> bool) -> bool {
    list.iter().any(cond)
}

pub fn find<T>(list: &[T], cond: impl Fn(&T) -> bool) -> Option<&T> {
    list.iter().find(|item| cond(item))
}

pub fn index<T>(list: &[T], cond: impl Fn(&T) -> bool) -> Option<usize> {
    list.iter().position(cond)
}

/// Deletes the element at `idx`, ignoring indices past the end.
pub fn delete<T>(list: &mut Vec<T>, idx: usize) {
    if idx < list.len() {
        list.remove(idx);
    }
}

/// Clones the elements from `start` through `end`, both inclusive.
///
/// `end` of `None` means the last element. Ranges past the end are clamped.
pub fn sub_range<T: Clone>(list: &[T], start: usize, end: Option<usize>) -> Vec<T> {
    let Some(last) = list.len().checked_sub(1) else {
        return Vec::new();
    };
    let end = end.map_or(last, |end| end.min(last));
    if start > end {
        return Vec::new();
    }
    list[start..=end].to_vec()
}

pub fn add_range<T>(list: &mut Vec<T>, elements: impl IntoIterator<Item = T>) {
    list.extend(elements);
}

/// Deletes `length` elements from `idx`, or everything from `idx` when
/// `length` is `None`.
pub fn delete_range<T>(list: &mut Vec<T>, idx: usize, length: Option<usize>) {
    if idx >= list.len() {
        return;
    }
    let end = length.map_or(list.len(), |length| idx.saturating_add(length).min(list.len()));
    list.drain(idx..end);
}
