//! Controller boards, pin headers and scan drivers.

pub mod driver;
pub mod interconnect;
pub mod mcu;

pub use driver::{DiodeDirection, Driver, DriverUpdate, MatrixDriver};
pub use interconnect::Interconnect;
pub use mcu::Mcu;
