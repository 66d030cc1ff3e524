//! Radio Control Logic
//!
//! The link seam to the transceiver and the session state machine that
//! drives it. This is the functional core of the firmware.

pub mod link;
pub mod session;
