//! nRF24L01+ Link Firmware Library
//!
//! This library provides the core of a point-to-point 2.4GHz telemetry node
//! built on an STM32G474 and an nRF24L01+ transceiver. One image transmits
//! tagged text frames, the other receives and logs them; which one is built
//! is decided by the `receiver` cargo feature.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    APPLICATION LAYER                         │
//! │   RadioSession (Idle → Sending | Receiving | Failed)         │
//! │   Diagnostics (status banners, per-frame lines)              │
//! ├─────────────────────────────────────────────────────────────┤
//! │                   DRIVER / LINK LAYER                        │
//! │   RadioLink trait  │  nRF24L01+ driver (embedded-hal SPI)    │
//! ├─────────────────────────────────────────────────────────────┤
//! │                        HAL LAYER                             │
//! │   SPI1  │  GPIO (CSN, CE, LED)  │  Heartbeat timer           │
//! ├─────────────────────────────────────────────────────────────┤
//! │                    RTOS / SCHEDULER                          │
//! │   embassy-rs: thread executor + interrupt executor           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Principles
//!
//! - **Type-driven design**: the role is a type parameter, frames are
//!   always 32 bytes, channels are range-checked
//! - **No unsafe in application code**: all unsafe isolated in the entry point
//! - **Functional core, imperative shell**: the session returns what to wait
//!   for; the firmware task does the waiting
//! - **Fail-stop**: a radio that does not come up parks the node for good

#![cfg_attr(feature = "embedded", no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export dependencies needed by applications (only in embedded mode)
#[cfg(feature = "embedded")]
pub use embassy_executor;
#[cfg(feature = "embedded")]
pub use embassy_stm32;
#[cfg(feature = "embedded")]
pub use embassy_time;

/// Hardware Abstraction Layer
///
/// LED/heartbeat wrappers and embassy timing.
pub mod hal;

/// Peripheral Drivers
///
/// The nRF24L01+ transceiver driver.
pub mod drivers;

/// Radio Control Logic
///
/// Link seam and session state machine.
pub mod radio;

/// Operator-facing status output
pub mod diagnostics;

/// Shared types used across modules
pub mod types;

/// System configuration and constants
pub mod config;

/// Prelude module for common imports
#[cfg(feature = "embedded")]
pub mod prelude {
    //! Convenient re-exports for common types and traits.

    pub use crate::config::*;
    pub use crate::types::*;

    pub use crate::diagnostics::{DefmtConsole, Diagnostics, Status};
    pub use crate::drivers::nrf24::Nrf24;
    pub use crate::hal::gpio::Heartbeat;
    pub use crate::hal::timer::{pause, HeartbeatTimer};
    pub use crate::radio::link::RadioLink;
    pub use crate::radio::session::{RadioSession, SessionState, Step};

    // Embassy
    pub use embassy_time::{Delay, Duration, Timer};

    // Logging
    pub use defmt::{debug, error, info, trace, warn};
}
