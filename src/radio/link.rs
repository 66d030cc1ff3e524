//! Radio Link
//!
//! The seam between the session controller and the transceiver driver.
//! Anything that can bring up a 2.4GHz link and move 32-byte frames
//! implements [`RadioLink`].

use crate::types::{ChannelOffset, Frame, Mode, RadioInitResult};

/// On-air data rate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DataRate {
    /// 250 kbps (longest range)
    Kbps250,
    /// 1 Mbps
    #[default]
    Mbps1,
    /// 2 Mbps
    Mbps2,
}

impl DataRate {
    /// Human readable rate
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Kbps250 => "250 kbps",
            Self::Mbps1 => "1 Mbps",
            Self::Mbps2 => "2 Mbps",
        }
    }
}

/// Transmit output power
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TxPower {
    /// -18 dBm
    Minus18Dbm,
    /// -12 dBm
    Minus12Dbm,
    /// -6 dBm
    Minus6Dbm,
    /// 0 dBm (maximum)
    #[default]
    ZeroDbm,
}

impl TxPower {
    /// Output power in dBm
    #[must_use]
    pub const fn dbm(self) -> i8 {
        match self {
            Self::Minus18Dbm => -18,
            Self::Minus12Dbm => -12,
            Self::Minus6Dbm => -6,
            Self::ZeroDbm => 0,
        }
    }
}

/// Packet CRC length
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CrcLength {
    /// No CRC
    Disabled,
    /// 8-bit CRC
    #[default]
    OneByte,
    /// 16-bit CRC
    TwoBytes,
}

impl CrcLength {
    /// CRC size in bytes
    #[must_use]
    pub const fn bytes(self) -> u8 {
        match self {
            Self::Disabled => 0,
            Self::OneByte => 1,
            Self::TwoBytes => 2,
        }
    }
}

/// Snapshot of the active radio configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RadioConfig {
    /// Role the radio was configured for
    pub mode: Mode,
    /// RF channel
    pub channel: ChannelOffset,
    /// On-air data rate
    pub data_rate: DataRate,
    /// Output power
    pub power: TxPower,
    /// CRC length
    pub crc: CrcLength,
    /// Static payload width of pipe 0
    pub payload_width: u8,
    /// Delay between hardware retransmits
    pub retransmit_delay_us: u16,
    /// Hardware retransmit count
    pub retransmit_count: u8,
    /// Pipe 0 / TX address
    pub address: [u8; 5],
}

#[cfg(feature = "embedded")]
impl defmt::Format for RadioConfig {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "RadioConfig({} {} {=str} {}dBm)",
            self.mode,
            self.channel,
            self.data_rate.label(),
            self.power.dbm()
        );
    }
}

/// Transceiver operations used by the session controller
///
/// `send` and `receive` are infallible at this seam: a transfer that fails
/// does so silently and the session carries on.
pub trait RadioLink {
    /// One-shot initialization for a role and channel (no retries)
    fn init(&mut self, mode: Mode, channel: ChannelOffset) -> RadioInitResult;

    /// Transmit one frame, blocking until the transfer completes or gives up
    fn send(&mut self, frame: &Frame);

    /// Check whether a received frame is waiting
    fn is_data_available(&mut self) -> bool;

    /// Read one received frame into `frame`
    fn receive(&mut self, frame: &mut Frame);

    /// Query the active configuration
    fn config(&mut self) -> RadioConfig;
}

impl<R: RadioLink + ?Sized> RadioLink for &mut R {
    fn init(&mut self, mode: Mode, channel: ChannelOffset) -> RadioInitResult {
        (**self).init(mode, channel)
    }

    fn send(&mut self, frame: &Frame) {
        (**self).send(frame);
    }

    fn is_data_available(&mut self) -> bool {
        (**self).is_data_available()
    }

    fn receive(&mut self, frame: &mut Frame) {
        (**self).receive(frame);
    }

    fn config(&mut self) -> RadioConfig {
        (**self).config()
    }
}
