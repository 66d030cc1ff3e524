//! Shared types used across the link firmware
//!
//! This module defines domain-specific types that enforce invariants
//! at compile time and provide type safety throughout the codebase.

use core::fmt;

/// Operating role of the node
///
/// Fixed at build time, see [`crate::config::ActiveRole`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Primary transmitter (PTX)
    Transmitter,
    /// Primary receiver (PRX)
    Receiver,
}

impl Mode {
    /// Short label used in status output
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Transmitter => "TX",
            Self::Receiver => "RX",
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Mode {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=str}", self.label());
    }
}

/// RF channel as an offset from the 2400 MHz base frequency
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChannelOffset(u8);

impl ChannelOffset {
    /// Base frequency of channel 0
    pub const BASE_MHZ: u16 = 2400;

    /// Highest channel the transceiver can tune (2525 MHz)
    pub const MAX: u8 = 125;

    /// Create a channel offset, returns None if out of range
    #[must_use]
    pub const fn new(offset: u8) -> Option<Self> {
        if offset <= Self::MAX {
            Some(Self(offset))
        } else {
            None
        }
    }

    /// Create a channel offset, clamping to the highest channel
    #[must_use]
    pub const fn saturating(offset: u8) -> Self {
        if offset > Self::MAX {
            Self(Self::MAX)
        } else {
            Self(offset)
        }
    }

    /// Raw offset (value of the `RF_CH` register)
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Carrier frequency in MHz
    #[must_use]
    pub const fn frequency_mhz(self) -> u16 {
        Self::BASE_MHZ + self.0 as u16
    }
}

impl fmt::Debug for ChannelOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChannelOffset({} -> {} MHz)", self.0, self.frequency_mhz())
    }
}

impl fmt::Display for ChannelOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} MHz)", self.0, self.frequency_mhz())
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for ChannelOffset {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "ch{} ({} MHz)", self.0, self.frequency_mhz());
    }
}

/// Outcome of the one-shot radio initialization
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RadioInitResult {
    /// Radio configured and ready for its role
    Ok,
    /// Radio did not come up; fatal
    Failed,
}

impl RadioInitResult {
    /// Check if initialization succeeded
    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl<T, E> From<Result<T, E>> for RadioInitResult {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(_) => Self::Ok,
            Err(_) => Self::Failed,
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for RadioInitResult {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Ok => defmt::write!(f, "OK"),
            Self::Failed => defmt::write!(f, "FAILED"),
        }
    }
}

/// Fixed-size radio payload
///
/// Always exactly [`Frame::LEN`] bytes. Shorter payloads are zero-filled,
/// longer ones are truncated.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Frame([u8; Frame::LEN]);

impl Frame {
    /// Payload width in bytes
    pub const LEN: usize = 32;

    /// Create an all-zero frame
    #[must_use]
    pub const fn empty() -> Self {
        Self([0; Self::LEN])
    }

    /// Create a frame from raw payload bytes, truncating past [`Frame::LEN`]
    #[must_use]
    pub fn from_bytes(payload: &[u8]) -> Self {
        let mut frame = Self::empty();
        let len = payload.len().min(Self::LEN);
        frame.0[..len].copy_from_slice(&payload[..len]);
        frame
    }

    /// Create a frame from formatted text, truncating past [`Frame::LEN`]
    #[must_use]
    pub fn from_fmt(args: fmt::Arguments<'_>) -> Self {
        let mut frame = Self::empty();
        frame.write_text(args);
        frame
    }

    /// Overwrite the frame with formatted text
    ///
    /// Returns the number of payload bytes written.
    pub fn write_text(&mut self, args: fmt::Arguments<'_>) -> usize {
        self.0.fill(0);
        let mut writer = FrameWriter {
            buf: &mut self.0,
            pos: 0,
        };
        // FrameWriter never reports an error, it truncates instead
        let _ = fmt::write(&mut writer, args);
        writer.pos
    }

    /// Raw payload
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }

    /// Mutable raw payload, for drivers reading into the frame
    pub fn as_mut_bytes(&mut self) -> &mut [u8; Self::LEN] {
        &mut self.0
    }

    /// Length of the text payload (up to the first NUL)
    #[must_use]
    pub fn text_len(&self) -> usize {
        self.0.iter().position(|&b| b == 0).unwrap_or(Self::LEN)
    }

    /// Text payload up to the first NUL
    ///
    /// Invalid UTF-8 cuts the text at the last valid character.
    #[must_use]
    pub fn text(&self) -> &str {
        let bytes = &self.0[..self.text_len()];
        match core::str::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => core::str::from_utf8(&bytes[..e.valid_up_to()]).unwrap_or_default(),
        }
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame({:?})", self.text())
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Frame {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Frame({=str})", self.text());
    }
}

/// Truncating writer over a frame buffer
struct FrameWriter<'a> {
    buf: &'a mut [u8; Frame::LEN],
    pos: usize,
}

impl fmt::Write for FrameWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let n = s.len().min(Frame::LEN - self.pos);
        self.buf[self.pos..self.pos + n].copy_from_slice(&s.as_bytes()[..n]);
        self.pos += n;
        Ok(())
    }
}

/// Per-frame sequence number embedded by the transmitter
///
/// Wraps from 255 back to 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SequenceCounter(u8);

impl SequenceCounter {
    /// Start at zero
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Current value
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Advance by one (wrapping)
    pub fn advance(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for SequenceCounter {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "seq {}", self.0);
    }
}
