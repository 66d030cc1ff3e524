//! Timer Abstractions
//!
//! Periodic timing for the heartbeat and the blocking pauses between
//! session steps.

use embassy_time::{Duration, Ticker, Timer};
use embedded_hal::digital::OutputPin;

use crate::hal::gpio::Heartbeat;
use crate::radio::session::Step;

/// Periodic heartbeat driver
#[derive(Clone, Copy, Debug)]
pub struct HeartbeatTimer {
    /// Period between expiries in milliseconds
    period_ms: u64,
}

impl HeartbeatTimer {
    /// Create a heartbeat timer from its period
    #[must_use]
    pub const fn from_period_ms(period_ms: u64) -> Self {
        Self { period_ms }
    }

    /// Get period duration
    #[must_use]
    pub const fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    /// Toggle `heartbeat` on every expiry, forever
    pub async fn run<P: OutputPin>(self, mut heartbeat: Heartbeat<P>) -> ! {
        let mut ticker = Ticker::every(self.period());
        loop {
            ticker.next().await;
            heartbeat.on_expiry();
        }
    }
}

impl defmt::Format for HeartbeatTimer {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "HeartbeatTimer({}ms)", self.period_ms);
    }
}

/// Wait out a session step
///
/// `Poll` returns at once so the caller spins on the radio; `Halt` never
/// returns.
pub async fn pause(step: Step) {
    match step {
        Step::Sleep(ms) => Timer::after_millis(u64::from(ms)).await,
        Step::Poll => {}
        Step::Halt => core::future::pending::<()>().await,
    }
}
