//! GPIO Abstractions
//!
//! Type-safe GPIO pin wrappers for the link firmware. Generic over the
//! `embedded-hal` output pin trait so the heartbeat logic can be exercised
//! off-target.

use embedded_hal::digital::OutputPin;

/// Status LED state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LedState {
    /// LED is off
    #[default]
    Off,
    /// LED is on
    On,
}

impl LedState {
    /// Toggle the LED state
    #[must_use]
    pub const fn toggle(self) -> Self {
        match self {
            Self::Off => Self::On,
            Self::On => Self::Off,
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for LedState {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Off => defmt::write!(f, "OFF"),
            Self::On => defmt::write!(f, "ON"),
        }
    }
}

/// Status LED driver
///
/// Pin errors are ignored: the LED is an indicator, nothing depends on it.
pub struct StatusLed<P> {
    pin: P,
    state: LedState,
}

impl<P: OutputPin> StatusLed<P> {
    /// Create a new status LED (driven off)
    pub fn new(mut pin: P) -> Self {
        let _ = pin.set_low();
        Self {
            pin,
            state: LedState::Off,
        }
    }

    /// Turn LED on
    pub fn on(&mut self) {
        let _ = self.pin.set_high();
        self.state = LedState::On;
    }

    /// Turn LED off
    pub fn off(&mut self) {
        let _ = self.pin.set_low();
        self.state = LedState::Off;
    }

    /// Toggle LED state
    pub fn toggle(&mut self) {
        match self.state {
            LedState::Off => self.on(),
            LedState::On => self.off(),
        }
    }

    /// Get current state
    #[must_use]
    pub const fn state(&self) -> LedState {
        self.state
    }
}

/// Liveness indicator flipped on every heartbeat timer expiry
///
/// Owns only the LED; it never sees radio or session state.
pub struct Heartbeat<P> {
    led: StatusLed<P>,
    beats: u32,
}

impl<P: OutputPin> Heartbeat<P> {
    /// Create a heartbeat on `pin`
    pub fn new(pin: P) -> Self {
        Self {
            led: StatusLed::new(pin),
            beats: 0,
        }
    }

    /// Timer expiry callback
    pub fn on_expiry(&mut self) {
        self.led.toggle();
        self.beats = self.beats.wrapping_add(1);
    }

    /// Current LED state
    #[must_use]
    pub const fn state(&self) -> LedState {
        self.led.state()
    }

    /// Expiries handled so far (wrapping)
    #[must_use]
    pub const fn beats(&self) -> u32 {
        self.beats
    }
}
