//! Growable slot array backing the keymap and matrix transform.
//!
//! Writing past the end never fails: the gap is padded with explicit empty
//! slots, so a keymap can be authored out of order (key 7 before key 3) and
//! still line up positionally with the physical layout.

use crate::error::{Result, ZmkError};
use serde::{Deserialize, Serialize};
use std::ops::{Bound, RangeBounds};

/// Ordered, 0-indexed sequence of optional entries.
///
/// `None` is the empty marker. It is stored, counted by [`len`](Self::len)
/// and serialized as `null`.
///
/// Indices are `isize`: negative values count from the end, the way
/// `-1` addresses the last slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DynamicArray<T> {
    slots: Vec<Option<T>>,
}

impl<T> Default for DynamicArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DynamicArray<T> {
    /// Creates an empty array.
    #[must_use]
    pub const fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Wraps existing slots, keeping empty markers as they are.
    #[must_use]
    pub const fn from_slots(slots: Vec<Option<T>>) -> Self {
        Self { slots }
    }

    /// Number of slots, empty ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true when there are no slots at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Resolves a possibly negative index to a position inside `[0, len)`.
    fn resolve(&self, index: isize) -> Result<usize> {
        let len = self.slots.len();
        let resolved = if index < 0 {
            len.checked_sub(index.unsigned_abs())
        } else {
            Some(index.unsigned_abs())
        };

        match resolved {
            Some(position) if position < len => Ok(position),
            _ => Err(ZmkError::invalid_value(
                "index",
                format!("{index} is out of range for length {len}"),
            )),
        }
    }

    /// Reads the slot at `index`. `Ok(None)` means the slot exists but is empty.
    pub fn get(&self, index: isize) -> Result<Option<&T>> {
        let position = self.resolve(index)?;
        Ok(self.slots[position].as_ref())
    }

    /// Mutable access to the slot at `index`.
    pub fn get_mut(&mut self, index: isize) -> Result<Option<&mut T>> {
        let position = self.resolve(index)?;
        Ok(self.slots[position].as_mut())
    }

    /// Stores `slot` at `index`, extending with empty markers when `index`
    /// is at or past the end.
    ///
    /// After the call `len() == max(old_len, index + 1)` for non-negative
    /// indices. Negative indices must address an existing slot.
    pub fn insert_slot(&mut self, index: isize, slot: Option<T>) -> Result<()> {
        let position = if index < 0 {
            self.resolve(index)?
        } else {
            index.unsigned_abs()
        };

        if position >= self.slots.len() {
            self.slots.resize_with(position + 1, || None);
        }
        self.slots[position] = slot;
        Ok(())
    }

    /// Stores `value` at `index` (overwrite or extend).
    pub fn insert(&mut self, index: isize, value: T) -> Result<()> {
        self.insert_slot(index, Some(value))
    }

    /// Alias of [`insert`](Self::insert) for index-assignment call sites.
    pub fn set(&mut self, index: isize, value: T) -> Result<()> {
        self.insert(index, value)
    }

    /// Marks the slot at `index` empty, extending the array if needed.
    pub fn clear_slot(&mut self, index: isize) -> Result<()> {
        self.insert_slot(index, None)
    }

    /// Removes the slot at `index`, shifting later slots down by one.
    pub fn delete(&mut self, index: isize) -> Result<Option<T>> {
        let position = self.resolve(index)?;
        Ok(self.slots.remove(position))
    }

    /// Appends a filled slot.
    pub fn append(&mut self, value: T) {
        self.slots.push(Some(value));
    }

    /// Appends an empty slot.
    pub fn append_empty(&mut self) {
        self.slots.push(None);
    }

    /// Removes and returns the slot at `index` (the last one when `None`).
    pub fn pop(&mut self, index: Option<isize>) -> Result<Option<T>> {
        self.delete(index.unwrap_or(-1))
    }

    /// Removes every slot.
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Iterates over slots in index order.
    pub fn iter(&self) -> std::slice::Iter<'_, Option<T>> {
        self.slots.iter()
    }

    /// All slots as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Option<T>] {
        &self.slots
    }

    /// Reads a sub-range of slots. Bounds are clamped to the array length.
    pub fn slice<R: RangeBounds<usize>>(&self, range: R) -> &[Option<T>] {
        let len = self.slots.len();
        let start = match range.start_bound() {
            Bound::Included(&s) => s,
            Bound::Excluded(&s) => s.saturating_add(1),
            Bound::Unbounded => 0,
        }
        .min(len);
        let end = match range.end_bound() {
            Bound::Included(&e) => e.saturating_add(1),
            Bound::Excluded(&e) => e,
            Bound::Unbounded => len,
        }
        .clamp(start, len);

        &self.slots[start..end]
    }

    /// Index of the first empty slot, if any.
    #[must_use]
    pub fn first_unset(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    /// Returns true when every slot is filled.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.first_unset().is_none()
    }
}

impl<T> From<Vec<Option<T>>> for DynamicArray<T> {
    fn from(slots: Vec<Option<T>>) -> Self {
        Self::from_slots(slots)
    }
}

impl<T> FromIterator<T> for DynamicArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            slots: iter.into_iter().map(Some).collect(),
        }
    }
}

impl<'a, T> IntoIterator for &'a DynamicArray<T> {
    type Item = &'a Option<T>;
    type IntoIter = std::slice::Iter<'a, Option<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.iter()
    }
}
