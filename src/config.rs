//! System configuration and hardware constants
//!
//! This module defines compile-time constants for the link firmware.
//! All pin mappings, radio parameters and loop timings are centralized here.
//! The node's role is picked with the `receiver` cargo feature.

use crate::radio::link::{CrcLength, DataRate, TxPower};
use crate::types::ChannelOffset;

/// Role this firmware image runs as
#[cfg(not(feature = "receiver"))]
pub type ActiveRole = crate::radio::session::Transmitter;

/// Role this firmware image runs as
#[cfg(feature = "receiver")]
pub type ActiveRole = crate::radio::session::Receiver;

/// RF channel offset used by both nodes (2400 + 115 MHz)
pub const CHANNEL_OFFSET: ChannelOffset = match ChannelOffset::new(115) {
    Some(channel) => channel,
    None => panic!("channel offset out of range"),
};

/// Delay after each transmitted frame
pub const SEND_DELAY_MS: u32 = 100;

/// Delay after each received frame
pub const RECEIVE_DELAY_MS: u32 = 10;

/// Heartbeat LED toggle period
pub const HEARTBEAT_PERIOD_MS: u64 = 500;

/// Text prefix of every transmitted frame, followed by the sequence number
pub const TX_PAYLOAD_PREFIX: &str = "Hello Arduino ";

/// SPI clock for the transceiver (chip maximum is 10 MHz)
pub const SPI_FREQUENCY_HZ: u32 = 4_000_000;

/// Pipe 0 / TX address shared by both nodes
pub const LINK_ADDRESS: [u8; 5] = [0xE7, 0xE7, 0xE7, 0xE7, 0xE7];

/// On-air data rate
pub const DATA_RATE: DataRate = DataRate::Mbps1;

/// Transmit power
pub const TX_POWER: TxPower = TxPower::ZeroDbm;

/// Packet CRC
pub const CRC_LENGTH: CrcLength = CrcLength::OneByte;

/// Hardware auto-retransmit delay (250 us steps, 250..=4000)
pub const RETRANSMIT_DELAY_US: u16 = 1750;

/// Hardware auto-retransmit count (0..=15)
pub const RETRANSMIT_COUNT: u8 = 8;

/// Pin assignments for GPIO
pub mod pins {
    //! GPIO pin assignments matching the wiring

    /// Status LED (heartbeat)
    pub const LED_STATUS: &str = "PA5";

    /// SPI1 SCK to the transceiver
    pub const SPI1_SCK: &str = "PB3";

    /// SPI1 MISO from the transceiver
    pub const SPI1_MISO: &str = "PB4";

    /// SPI1 MOSI to the transceiver
    pub const SPI1_MOSI: &str = "PB5";

    /// Transceiver chip select (active low)
    pub const NRF_CSN: &str = "PA4";

    /// Transceiver chip enable
    pub const NRF_CE: &str = "PB0";
}
