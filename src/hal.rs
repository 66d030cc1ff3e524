//! Hardware Abstraction Layer
//!
//! Safe wrappers over the board peripherals. `gpio` is generic over
//! `embedded-hal`; `timer` needs the embassy time driver.

pub mod gpio;
#[cfg(feature = "embedded")]
pub mod timer;
