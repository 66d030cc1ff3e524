//! Peripheral Drivers
//!
//! Drivers for external ICs. These sit on `embedded-hal` traits rather than
//! a specific HAL so they build for the host test suite too.

pub mod nrf24;
