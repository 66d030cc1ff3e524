//! Diagnostics Output
//!
//! Operator-facing status lines emitted at fixed points: after peripheral
//! bring-up, after radio init (with a configuration dump), on init failure,
//! and once per frame sent or received. The text is not a protocol.

use core::fmt::{self, Write};

use crate::radio::link::RadioConfig;
use crate::types::Frame;

/// Width of the `#` rule framing the radio banners
pub const BANNER_WIDTH: usize = 63;

/// A status event worth telling the operator about
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status<'a> {
    /// Timer and interrupts are running
    PeripheralsReady,
    /// Radio came up with this configuration
    RadioReady(&'a RadioConfig),
    /// Radio did not come up
    RadioFailed,
    /// A frame is about to be handed to the radio
    FrameSent(&'a Frame),
    /// A frame was read from the radio
    FrameReceived(&'a Frame),
}

impl Status<'_> {
    /// Check if this event reports a fault
    #[must_use]
    pub const fn is_fault(&self) -> bool {
        matches!(self, Self::RadioFailed)
    }

    /// Render the event as text, one `\n`-terminated line at a time
    pub fn render<W: Write>(&self, out: &mut W) -> fmt::Result {
        match self {
            Self::PeripheralsReady => writeln!(out, "Timer0 init Done"),
            Self::RadioReady(config) => {
                rule(out)?;
                writeln!(out, "NRF24L01 Initialize successful")?;
                render_config(config, out)?;
                rule(out)
            }
            Self::RadioFailed => {
                rule(out)?;
                writeln!(out, "Failed Initialize NRF24L01")?;
                rule(out)
            }
            Self::FrameSent(frame) => writeln!(out, "NRF24 Send Data: {}", frame.text()),
            Self::FrameReceived(frame) => writeln!(out, "NRF24 Receive Data: {}", frame.text()),
        }
    }
}

fn rule<W: Write>(out: &mut W) -> fmt::Result {
    for _ in 0..BANNER_WIDTH {
        out.write_char('#')?;
    }
    out.write_char('\n')
}

fn render_config<W: Write>(config: &RadioConfig, out: &mut W) -> fmt::Result {
    writeln!(out, "Mode: {}", config.mode.label())?;
    writeln!(out, "RF channel: {}", config.channel)?;
    writeln!(out, "Data rate: {}", config.data_rate.label())?;
    writeln!(out, "TX power: {} dBm", config.power.dbm())?;
    writeln!(out, "CRC: {} byte(s)", config.crc.bytes())?;
    writeln!(out, "Payload width: {} bytes", config.payload_width)?;
    writeln!(
        out,
        "Auto retransmit: {} x {} us",
        config.retransmit_count, config.retransmit_delay_us
    )?;
    let [a0, a1, a2, a3, a4] = config.address;
    writeln!(out, "Address: {a0:02X}:{a1:02X}:{a2:02X}:{a3:02X}:{a4:02X}")
}

/// Sink for status events
pub trait Diagnostics {
    /// Report one event
    fn report(&mut self, status: &Status<'_>);
}

impl<D: Diagnostics + ?Sized> Diagnostics for &mut D {
    fn report(&mut self, status: &Status<'_>) {
        (**self).report(status);
    }
}

/// Diagnostics over defmt/RTT
#[cfg(feature = "embedded")]
#[derive(Clone, Copy, Debug, Default)]
pub struct DefmtConsole;

#[cfg(feature = "embedded")]
impl DefmtConsole {
    /// Longest rendered event (the configuration banner)
    const TEXT_CAPACITY: usize = 512;
}

#[cfg(feature = "embedded")]
impl Diagnostics for DefmtConsole {
    fn report(&mut self, status: &Status<'_>) {
        let mut text: heapless::String<{ Self::TEXT_CAPACITY }> = heapless::String::new();
        if status.render(&mut text).is_err() {
            defmt::warn!("status text truncated");
        }

        for line in text.lines() {
            if status.is_fault() {
                defmt::error!("{=str}", line);
            } else {
                defmt::info!("{=str}", line);
            }
        }
    }
}
