//! Build fragments: per-destination snippets produced by `build()`.
//!
//! Every entity builds into a [`BuildFragment`] whose sections are keyed by
//! the destination file they end up in (`.keymap`, `.conf`, `build.yaml`,
//! ...). The aggregate folds them together with [`BuildFragment::merge`].

use crate::transform::RowCol;
use serde::{Deserialize, Serialize};

/// Order-preserving set union of two lists.
///
/// Each element appears once in the result, at the position where it was
/// first seen, even if either input repeats it.
pub fn list_union<T: PartialEq + Clone>(first: &[T], second: &[T]) -> Vec<T> {
    let mut merged: Vec<T> = Vec::with_capacity(first.len() + second.len());
    for item in first.iter().chain(second) {
        if !merged.contains(item) {
            merged.push(item.clone());
        }
    }
    merged
}

/// `.keymap` section: headers to include and the binding text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeymapFragment {
    /// Header files, without the `#include <...>` wrapper
    pub include: Vec<String>,
    /// Devicetree binding text (e.g. `&kp A`)
    #[serde(rename = "return")]
    pub binding: String,
}

impl KeymapFragment {
    /// Creates a keymap fragment.
    pub fn new<S: Into<String>>(include: impl IntoIterator<Item = S>, binding: impl Into<String>) -> Self {
        Self {
            include: include.into_iter().map(Into::into).collect(),
            binding: binding.into(),
        }
    }
}

/// `build.yaml` section selecting the board to build for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardFragment {
    /// Zephyr board name (e.g. `nice_nano_v2`)
    pub board: String,
}

/// `keyboard.zmk.yml` section naming the board the shield requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiresFragment {
    /// Required board or interconnect
    pub requires: String,
}

/// `.overlay` section describing the kscan matrix node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct KscanFragment {
    /// Devicetree `compatible` string
    pub compatible: String,
    /// `col2row` or `row2col`
    pub diode_direction: String,
    /// Full GPIO specifiers for the rows
    pub row_gpios: Vec<String>,
    /// Full GPIO specifiers for the columns
    pub col_gpios: Vec<String>,
}

/// Output of a single `build()` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildFragment {
    /// `.keymap` section
    #[serde(rename = ".keymap", default, skip_serializing_if = "Option::is_none")]
    pub keymap: Option<KeymapFragment>,
    /// `.conf` lines (`CONFIG_X=y`)
    #[serde(rename = ".conf", default, skip_serializing_if = "Vec::is_empty")]
    pub conf: Vec<String>,
    /// `.overlay` kscan node
    #[serde(rename = ".overlay", default, skip_serializing_if = "Option::is_none")]
    pub overlay: Option<KscanFragment>,
    /// `build.yaml` board selection
    #[serde(rename = "build.yaml", default, skip_serializing_if = "Option::is_none")]
    pub build_yaml: Option<BoardFragment>,
    /// `keyboard.zmk.yml` requirement
    #[serde(rename = "keyboard.zmk.yml", default, skip_serializing_if = "Option::is_none")]
    pub keyboard_zmk_yml: Option<RequiresFragment>,
    /// Matrix transform map, in key index order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix_transform: Option<Vec<RowCol>>,
}

impl BuildFragment {
    /// Fragment holding only a `.keymap` section.
    #[must_use]
    pub const fn from_keymap(keymap: KeymapFragment) -> Self {
        Self {
            keymap: Some(keymap),
            conf: Vec::new(),
            overlay: None,
            build_yaml: None,
            keyboard_zmk_yml: None,
            matrix_transform: None,
        }
    }

    /// Fragment holding a single `.conf` line.
    pub fn from_conf_line(line: impl Into<String>) -> Self {
        Self {
            conf: vec![line.into()],
            ..Self::default()
        }
    }

    /// Returns the `.keymap` section, if any.
    #[must_use]
    pub const fn keymap(&self) -> Option<&KeymapFragment> {
        self.keymap.as_ref()
    }

    /// Returns true when no section is populated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Folds `other` into `self`.
    ///
    /// Keymap includes are unioned and binding texts joined by a space;
    /// `.conf` lines are appended unless already present; single-valued
    /// sections from `other` replace those in `self`.
    pub fn merge(&mut self, other: Self) {
        self.keymap = match (self.keymap.take(), other.keymap) {
            (Some(mine), Some(theirs)) => Some(KeymapFragment {
                include: list_union(&mine.include, &theirs.include),
                binding: [mine.binding, theirs.binding]
                    .into_iter()
                    .filter(|b| !b.is_empty())
                    .collect::<Vec<_>>()
                    .join(" "),
            }),
            (mine, theirs) => theirs.or(mine),
        };
        self.conf = list_union(&self.conf, &other.conf);
        if other.overlay.is_some() {
            self.overlay = other.overlay;
        }
        if other.build_yaml.is_some() {
            self.build_yaml = other.build_yaml;
        }
        if other.keyboard_zmk_yml.is_some() {
            self.keyboard_zmk_yml = other.keyboard_zmk_yml;
        }
        if other.matrix_transform.is_some() {
            self.matrix_transform = other.matrix_transform;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_union_preserves_first_seen_order() {
        let merged = list_union(&["b", "a"], &["a", "c", "b"]);
        assert_eq!(merged, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_list_union_drops_duplicates_within_inputs() {
        let merged = list_union(&["x", "x", "y"], &["y", "z", "z"]);
        assert_eq!(merged, vec!["x", "y", "z"]);

        let empty: Vec<&str> = list_union(&[], &[]);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_keymap_fragment_serializes_return_key() {
        let fragment = BuildFragment::from_keymap(KeymapFragment::new(["behaviors.dtsi"], "&mo 1"));
        assert_eq!(
            serde_json::to_value(&fragment).unwrap(),
            json!({".keymap": {"include": ["behaviors.dtsi"], "return": "&mo 1"}})
        );
    }

    #[test]
    fn test_merge_unions_includes_and_joins_bindings() {
        let mut first = BuildFragment::from_keymap(KeymapFragment::new(
            ["behaviors.dtsi", "dt-bindings/zmk/keys.h"],
            "&kp A",
        ));
        first.merge(BuildFragment::from_keymap(KeymapFragment::new(
            ["behaviors.dtsi", "dt-bindings/zmk/bt.h"],
            "&bt BT_CLR",
        )));

        let keymap = first.keymap().unwrap();
        assert_eq!(
            keymap.include,
            vec!["behaviors.dtsi", "dt-bindings/zmk/keys.h", "dt-bindings/zmk/bt.h"]
        );
        assert_eq!(keymap.binding, "&kp A &bt BT_CLR");
    }

    #[test]
    fn test_merge_replaces_single_valued_sections() {
        let mut fragment = BuildFragment::from_conf_line("CONFIG_A=y");
        fragment.merge(BuildFragment {
            build_yaml: Some(BoardFragment {
                board: "nice_nano_v2".to_string(),
            }),
            ..BuildFragment::from_conf_line("CONFIG_A=y")
        });

        assert_eq!(fragment.conf, vec!["CONFIG_A=y"]);
        assert_eq!(fragment.build_yaml.unwrap().board, "nice_nano_v2");
        assert!(BuildFragment::default().is_empty());
    }
}
