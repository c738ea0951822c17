//! Build output: fragments produced by entities and the text renderers for
//! the files a ZMK user config repository needs.

pub mod fragment;
pub mod render;

pub use fragment::{
    list_union, BoardFragment, BuildFragment, KeymapFragment, KscanFragment, RequiresFragment,
};
pub use render::{ConfigBuild, KeymapSection};
