//! Data containers shared by the configuration entities.
//!
//! Models here carry no ZMK semantics of their own: the slot array that
//! backs keymaps and transforms, and the physical key descriptors that come
//! from the layout parser.

pub mod dynamic_array;
pub mod physical_key;

pub use dynamic_array::DynamicArray;
pub use physical_key::PhysicalKey;
