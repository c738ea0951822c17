//! ZMK Configurator Library
//!
//! This library provides the validated object model for ZMK keyboard
//! configurations: code catalogs, behaviours, config options, matrix
//! transforms, controller hardware and the `ZmkConfig` aggregate that ties
//! them together, exports them as JSON and merges them into build files.

// Module declarations
pub mod behaviours;
pub mod build;
pub mod catalog;
pub mod cli;
pub mod codes;
pub mod config;
pub mod constants;
pub mod error;
pub mod hardware;
pub mod models;
pub mod options;
pub mod properties;
pub mod shields;
pub mod transform;
pub mod zmk;

pub use error::{Result, ZmkError};
pub use zmk::ZmkConfig;
