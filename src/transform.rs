//! Matrix transform: maps each key index to a (row, col) matrix position.

use crate::build::BuildFragment;
use crate::error::{Result, ZmkError};
use crate::models::DynamicArray;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a switch in the electrical matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowCol {
    /// Matrix row
    pub row: u32,
    /// Matrix column
    pub col: u32,
}

impl RowCol {
    /// Creates a matrix position.
    #[must_use]
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for RowCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RC({},{})", self.row, self.col)
    }
}

/// Key index to matrix position table.
///
/// Slot `i` belongs to physical key `i`. Slots may stay empty while the
/// table is being authored but [`build`](Self::build) requires all of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatrixTransform {
    keys: DynamicArray<RowCol>,
}

impl MatrixTransform {
    /// Creates an empty transform.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            keys: DynamicArray::new(),
        }
    }

    /// Records a matrix position. Without `index` the position is appended,
    /// otherwise the slot at `index` is overwritten (padding if needed).
    pub fn add_key(&mut self, row: u32, col: u32, index: Option<isize>) -> Result<()> {
        let position = RowCol::new(row, col);
        match index {
            Some(index) => self.keys.insert(index, position),
            None => {
                self.keys.append(position);
                Ok(())
            }
        }
    }

    /// Reads the position at `index`. `Ok(None)` is an unset slot.
    pub fn get_key(&self, index: isize) -> Result<Option<RowCol>> {
        self.keys.get(index).map(Option::<&RowCol>::copied)
    }

    /// Empties the slot at `index`.
    pub fn clear_key(&mut self, index: isize) -> Result<()> {
        self.keys.clear_slot(index)
    }

    /// Number of slots, unset ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true when there are no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Highest row and column referenced, if any slot is set.
    #[must_use]
    pub fn extent(&self) -> Option<RowCol> {
        self.keys.iter().flatten().fold(None, |acc, key| {
            Some(match acc {
                None => *key,
                Some(max) => RowCol::new(max.row.max(key.row), max.col.max(key.col)),
            })
        })
    }

    /// Builds `{matrix_transform: [...]}`, failing with `IncompleteState`
    /// when any slot is unset.
    pub fn build(&self) -> Result<BuildFragment> {
        let keys = self
            .keys
            .iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| {
                    ZmkError::incomplete(format!("matrix transform key {index} is not set"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(BuildFragment {
            matrix_transform: Some(keys),
            ..BuildFragment::default()
        })
    }

    /// The raw backing array, unset slots included.
    #[must_use]
    pub const fn export(&self) -> &DynamicArray<RowCol> {
        &self.keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_key_appends_without_index() {
        let mut transform = MatrixTransform::new();
        transform.add_key(0, 0, None).unwrap();
        transform.add_key(0, 1, None).unwrap();

        assert_eq!(transform.len(), 2);
        assert_eq!(transform.get_key(1).unwrap(), Some(RowCol::new(0, 1)));
    }

    #[test]
    fn test_add_key_with_index_extends() {
        let mut transform = MatrixTransform::new();
        transform.add_key(1, 2, Some(3)).unwrap();

        assert_eq!(transform.len(), 4);
        assert_eq!(transform.get_key(0).unwrap(), None);
        assert_eq!(transform.get_key(3).unwrap(), Some(RowCol::new(1, 2)));
    }

    #[test]
    fn test_get_key_out_of_range() {
        let transform = MatrixTransform::new();
        assert!(matches!(
            transform.get_key(0),
            Err(ZmkError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_build_fails_on_unset_slot() {
        let mut transform = MatrixTransform::new();
        transform.add_key(0, 0, Some(1)).unwrap();

        let err = transform.build().unwrap_err();
        assert!(matches!(err, ZmkError::IncompleteState(_)));

        transform.add_key(0, 1, Some(0)).unwrap();
        let fragment = transform.build().unwrap();
        assert_eq!(
            fragment.matrix_transform.unwrap(),
            vec![RowCol::new(0, 1), RowCol::new(0, 0)]
        );
    }

    #[test]
    fn test_extent() {
        let mut transform = MatrixTransform::new();
        assert_eq!(transform.extent(), None);

        transform.add_key(2, 0, None).unwrap();
        transform.add_key(0, 5, Some(3)).unwrap();
        assert_eq!(transform.extent(), Some(RowCol::new(2, 5)));
    }

    #[test]
    fn test_export_is_raw_array() {
        let mut transform = MatrixTransform::new();
        transform.add_key(0, 1, Some(1)).unwrap();
        let json = serde_json::to_value(transform.export()).unwrap();
        assert_eq!(json, serde_json::json!([null, {"row": 0, "col": 1}]));
    }
}
