//! nRF24L01+ Transceiver Driver
//!
//! Blocking register-level driver for the Nordic nRF24L01+ 2.4GHz
//! transceiver. Generic over the `embedded-hal` 1.0 SPI bus, the CSN and CE
//! output pins and a delay source, so it runs on the board and against a
//! fake chip on the host.
//!
//! Every command is a single CSN-framed `transfer_in_place`: the command
//! byte goes out first and the chip clocks its `STATUS` register back in
//! the same position.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

use crate::config::{
    CRC_LENGTH, DATA_RATE, LINK_ADDRESS, RETRANSMIT_COUNT, RETRANSMIT_DELAY_US, TX_POWER,
};
use crate::radio::link::{CrcLength, DataRate, RadioConfig, RadioLink, TxPower};
use crate::types::{ChannelOffset, Frame, Mode, RadioInitResult};

/// nRF24L01+ register addresses
pub mod reg {
    /// Mode, CRC and power control
    pub const CONFIG: u8 = 0x00;
    /// Auto acknowledgement per pipe
    pub const EN_AA: u8 = 0x01;
    /// Enabled RX pipes
    pub const EN_RXADDR: u8 = 0x02;
    /// Address width
    pub const SETUP_AW: u8 = 0x03;
    /// Auto retransmit delay and count
    pub const SETUP_RETR: u8 = 0x04;
    /// RF channel
    pub const RF_CH: u8 = 0x05;
    /// Data rate and output power
    pub const RF_SETUP: u8 = 0x06;
    /// Interrupt flags
    pub const STATUS: u8 = 0x07;
    /// Pipe 0 receive address (5 bytes)
    pub const RX_ADDR_P0: u8 = 0x0A;
    /// Transmit address (5 bytes)
    pub const TX_ADDR: u8 = 0x10;
    /// Pipe 0 static payload width
    pub const RX_PW_P0: u8 = 0x11;
    /// FIFO flags
    pub const FIFO_STATUS: u8 = 0x17;
    /// Dynamic payload per pipe
    pub const DYNPD: u8 = 0x1C;
}

/// SPI command bytes
pub mod cmd {
    /// Read register (OR with address)
    pub const R_REGISTER: u8 = 0x00;
    /// Write register (OR with address)
    pub const W_REGISTER: u8 = 0x20;
    /// Read RX payload
    pub const R_RX_PAYLOAD: u8 = 0x61;
    /// Write TX payload
    pub const W_TX_PAYLOAD: u8 = 0xA0;
    /// Flush TX FIFO
    pub const FLUSH_TX: u8 = 0xE1;
    /// Flush RX FIFO
    pub const FLUSH_RX: u8 = 0xE2;
    /// No operation, returns STATUS
    pub const NOP: u8 = 0xFF;
}

/// Register bit fields
pub mod bits {
    /// CONFIG: enable CRC
    pub const EN_CRC: u8 = 0x08;
    /// CONFIG: 2-byte CRC
    pub const CRCO: u8 = 0x04;
    /// CONFIG: power up
    pub const PWR_UP: u8 = 0x02;
    /// CONFIG: primary receiver
    pub const PRIM_RX: u8 = 0x01;
    /// STATUS: RX data ready
    pub const RX_DR: u8 = 0x40;
    /// STATUS: TX data sent (acked)
    pub const TX_DS: u8 = 0x20;
    /// STATUS: maximum retransmits reached
    pub const MAX_RT: u8 = 0x10;
    /// FIFO_STATUS: RX FIFO empty
    pub const RX_EMPTY: u8 = 0x01;
    /// RF_SETUP: 250 kbps
    pub const RF_DR_LOW: u8 = 0x20;
    /// RF_SETUP: 2 Mbps
    pub const RF_DR_HIGH: u8 = 0x08;
    /// SETUP_AW: 5-byte addresses
    pub const AW_5_BYTES: u8 = 0b11;
}

/// Power-on reset settle time
const POWER_ON_RESET_MS: u32 = 5;

/// Power down to standby transition
const POWER_UP_US: u32 = 1500;

/// Standby to RX mode settle
const RX_SETTLE_US: u32 = 130;

/// Minimum CE high pulse to start a transmission
const CE_PULSE_US: u32 = 15;

/// Driver error
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Nrf24Error<SpiE, PinE> {
    /// SPI bus error
    Spi(SpiE),
    /// CSN or CE pin error
    Pin(PinE),
    /// Register read-back did not match (chip absent or miswired)
    NotResponding,
}

/// Driver operation result
pub type Nrf24Result<T, SpiE, PinE> = Result<T, Nrf24Error<SpiE, PinE>>;

/// What happened to a transmitted frame
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxOutcome {
    /// Acknowledged by the receiver
    Delivered,
    /// Hardware retransmits exhausted without an ack
    RetriesExhausted,
    /// Neither flag appeared within the polling window
    TimedOut,
}

/// RF parameters written at init
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Nrf24Settings {
    /// On-air data rate
    pub data_rate: DataRate,
    /// Output power
    pub power: TxPower,
    /// CRC length
    pub crc: CrcLength,
    /// Auto retransmit delay, rounded down to a 250 us step
    pub retransmit_delay_us: u16,
    /// Auto retransmit count (max 15)
    pub retransmit_count: u8,
    /// Pipe 0 / TX address
    pub address: [u8; 5],
}

impl Default for Nrf24Settings {
    fn default() -> Self {
        Self {
            data_rate: DATA_RATE,
            power: TX_POWER,
            crc: CRC_LENGTH,
            retransmit_delay_us: RETRANSMIT_DELAY_US,
            retransmit_count: RETRANSMIT_COUNT,
            address: LINK_ADDRESS,
        }
    }
}

impl Nrf24Settings {
    /// `RF_SETUP` register value
    #[must_use]
    pub const fn rf_setup(&self) -> u8 {
        let rate = match self.data_rate {
            DataRate::Kbps250 => bits::RF_DR_LOW,
            DataRate::Mbps1 => 0,
            DataRate::Mbps2 => bits::RF_DR_HIGH,
        };
        let power = match self.power {
            TxPower::Minus18Dbm => 0b000,
            TxPower::Minus12Dbm => 0b010,
            TxPower::Minus6Dbm => 0b100,
            TxPower::ZeroDbm => 0b110,
        };
        rate | power
    }

    /// `SETUP_RETR` register value
    #[must_use]
    pub fn setup_retr(&self) -> u8 {
        let delay_code = (self.retransmit_delay_us / 250).saturating_sub(1).min(15) as u8;
        (delay_code << 4) | self.retransmit_count.min(15)
    }

    /// CRC bits of the `CONFIG` register
    #[must_use]
    pub const fn config_crc(&self) -> u8 {
        match self.crc {
            CrcLength::Disabled => 0,
            CrcLength::OneByte => bits::EN_CRC,
            CrcLength::TwoBytes => bits::EN_CRC | bits::CRCO,
        }
    }
}

/// Decode the readable configuration registers
fn decode_config(
    config: u8,
    rf_ch: u8,
    rf_setup: u8,
    setup_retr: u8,
    payload_width: u8,
    address: [u8; 5],
) -> RadioConfig {
    let mode = if config & bits::PRIM_RX == 0 {
        Mode::Transmitter
    } else {
        Mode::Receiver
    };
    let crc = if config & bits::EN_CRC == 0 {
        CrcLength::Disabled
    } else if config & bits::CRCO == 0 {
        CrcLength::OneByte
    } else {
        CrcLength::TwoBytes
    };
    let data_rate = if rf_setup & bits::RF_DR_LOW != 0 {
        DataRate::Kbps250
    } else if rf_setup & bits::RF_DR_HIGH != 0 {
        DataRate::Mbps2
    } else {
        DataRate::Mbps1
    };
    let power = match (rf_setup >> 1) & 0b11 {
        0 => TxPower::Minus18Dbm,
        1 => TxPower::Minus12Dbm,
        2 => TxPower::Minus6Dbm,
        _ => TxPower::ZeroDbm,
    };

    RadioConfig {
        mode,
        channel: ChannelOffset::saturating(rf_ch),
        data_rate,
        power,
        crc,
        payload_width,
        retransmit_delay_us: (u16::from(setup_retr >> 4) + 1) * 250,
        retransmit_count: setup_retr & 0x0F,
        address,
    }
}

/// nRF24L01+ driver
pub struct Nrf24<SPI, CSN, CE, D> {
    spi: SPI,
    csn: CSN,
    ce: CE,
    delay: D,
    settings: Nrf24Settings,
    mode: Mode,
    channel: ChannelOffset,
}

impl<SPI, CSN, CE, D> Nrf24<SPI, CSN, CE, D>
where
    SPI: SpiBus,
    CSN: OutputPin,
    CE: OutputPin<Error = CSN::Error>,
    D: DelayNs,
{
    /// Interval between STATUS polls while a frame is in flight
    pub const TX_POLL_INTERVAL_US: u32 = 100;

    /// STATUS polls before giving up on a frame (covers 15 x 4 ms retransmits)
    pub const TX_POLL_LIMIT: u32 = 650;

    /// Create a driver with the default link settings
    #[must_use]
    pub fn new(spi: SPI, csn: CSN, ce: CE, delay: D) -> Self {
        Self::with_settings(spi, csn, ce, delay, Nrf24Settings::default())
    }

    /// Create a driver with explicit settings
    #[must_use]
    pub fn with_settings(spi: SPI, csn: CSN, ce: CE, delay: D, settings: Nrf24Settings) -> Self {
        Self {
            spi,
            csn,
            ce,
            delay,
            settings,
            mode: Mode::Transmitter,
            channel: ChannelOffset::saturating(0),
        }
    }

    /// Settings written at init
    #[must_use]
    pub const fn settings(&self) -> &Nrf24Settings {
        &self.settings
    }

    /// Give the bus and pins back
    pub fn release(self) -> (SPI, CSN, CE, D) {
        (self.spi, self.csn, self.ce, self.delay)
    }

    /// Bring the chip up for `mode` on `channel`
    pub fn configure(
        &mut self,
        mode: Mode,
        channel: ChannelOffset,
    ) -> Nrf24Result<(), SPI::Error, CSN::Error> {
        self.mode = mode;
        self.channel = channel;

        self.ce.set_low().map_err(Nrf24Error::Pin)?;
        self.csn.set_high().map_err(Nrf24Error::Pin)?;
        self.delay.delay_ms(POWER_ON_RESET_MS);

        // Presence check: a missing chip reads back 0x00 or 0xFF
        self.write_reg(reg::SETUP_AW, bits::AW_5_BYTES)?;
        if self.read_reg(reg::SETUP_AW)? != bits::AW_5_BYTES {
            return Err(Nrf24Error::NotResponding);
        }

        let address = self.settings.address;
        self.write_reg(reg::DYNPD, 0)?;
        self.write_reg(reg::SETUP_RETR, self.settings.setup_retr())?;
        self.write_reg(reg::RF_SETUP, self.settings.rf_setup())?;
        self.write_reg(reg::EN_AA, 0b11)?;
        self.write_reg(reg::RF_CH, channel.value())?;
        self.write_regs(reg::RX_ADDR_P0, &address)?;
        self.write_reg(reg::RX_PW_P0, Frame::LEN as u8)?;
        self.write_reg(reg::EN_RXADDR, 0b01)?;
        self.clear_status()?;
        self.flush_rx()?;
        self.flush_tx()?;

        let crc = self.settings.config_crc();
        match mode {
            Mode::Transmitter => {
                self.write_regs(reg::TX_ADDR, &address)?;
                self.write_reg(reg::CONFIG, crc | bits::PWR_UP)?;
                self.delay.delay_us(POWER_UP_US);
            }
            Mode::Receiver => {
                self.write_reg(reg::CONFIG, crc | bits::PWR_UP | bits::PRIM_RX)?;
                self.delay.delay_us(POWER_UP_US);
                self.ce.set_high().map_err(Nrf24Error::Pin)?;
                self.delay.delay_us(RX_SETTLE_US);
            }
        }

        Ok(())
    }

    /// Send one frame and wait for the ack or the retransmit limit
    pub fn transmit(&mut self, frame: &Frame) -> Nrf24Result<TxOutcome, SPI::Error, CSN::Error> {
        let mut buf = [0u8; Frame::LEN + 1];
        buf[0] = cmd::W_TX_PAYLOAD;
        buf[1..].copy_from_slice(frame.as_bytes());
        self.command(&mut buf)?;

        self.ce.set_high().map_err(Nrf24Error::Pin)?;
        self.delay.delay_us(CE_PULSE_US);
        self.ce.set_low().map_err(Nrf24Error::Pin)?;

        for _ in 0..Self::TX_POLL_LIMIT {
            let status = self.status()?;
            if status & (bits::TX_DS | bits::MAX_RT) != 0 {
                self.clear_status()?;
                if status & bits::TX_DS != 0 {
                    return Ok(TxOutcome::Delivered);
                }
                // MAX_RT leaves the payload in the FIFO
                self.flush_tx()?;
                return Ok(TxOutcome::RetriesExhausted);
            }
            self.delay.delay_us(Self::TX_POLL_INTERVAL_US);
        }

        self.flush_tx()?;
        Ok(TxOutcome::TimedOut)
    }

    /// Check the RX FIFO
    pub fn rx_available(&mut self) -> Nrf24Result<bool, SPI::Error, CSN::Error> {
        Ok(self.read_reg(reg::FIFO_STATUS)? & bits::RX_EMPTY == 0)
    }

    /// Pop one payload from the RX FIFO into `frame`
    pub fn read_frame(&mut self, frame: &mut Frame) -> Nrf24Result<(), SPI::Error, CSN::Error> {
        let mut buf = [cmd::NOP; Frame::LEN + 1];
        buf[0] = cmd::R_RX_PAYLOAD;
        self.command(&mut buf)?;
        frame.as_mut_bytes().copy_from_slice(&buf[1..]);
        self.write_reg(reg::STATUS, bits::RX_DR)
    }

    /// Read the active configuration back from the chip
    pub fn read_config(&mut self) -> Nrf24Result<RadioConfig, SPI::Error, CSN::Error> {
        let config = self.read_reg(reg::CONFIG)?;
        let rf_ch = self.read_reg(reg::RF_CH)?;
        let rf_setup = self.read_reg(reg::RF_SETUP)?;
        let setup_retr = self.read_reg(reg::SETUP_RETR)?;
        let payload_width = self.read_reg(reg::RX_PW_P0)?;
        let mut address = [0u8; 5];
        self.read_regs(reg::RX_ADDR_P0, &mut address)?;

        Ok(decode_config(
            config,
            rf_ch,
            rf_setup,
            setup_retr,
            payload_width,
            address,
        ))
    }

    /// Configuration as last written, without touching the bus
    #[must_use]
    pub fn written_config(&self) -> RadioConfig {
        RadioConfig {
            mode: self.mode,
            channel: self.channel,
            data_rate: self.settings.data_rate,
            power: self.settings.power,
            crc: self.settings.crc,
            payload_width: Frame::LEN as u8,
            retransmit_delay_us: self.settings.retransmit_delay_us / 250 * 250,
            retransmit_count: self.settings.retransmit_count.min(15),
            address: self.settings.address,
        }
    }

    fn command(&mut self, buf: &mut [u8]) -> Nrf24Result<u8, SPI::Error, CSN::Error> {
        self.csn.set_low().map_err(Nrf24Error::Pin)?;
        let transfer = self
            .spi
            .transfer_in_place(buf)
            .and_then(|()| self.spi.flush());
        // Release CSN even when the transfer failed
        self.csn.set_high().map_err(Nrf24Error::Pin)?;
        transfer.map_err(Nrf24Error::Spi)?;
        Ok(buf[0])
    }

    fn status(&mut self) -> Nrf24Result<u8, SPI::Error, CSN::Error> {
        self.command(&mut [cmd::NOP])
    }

    fn read_reg(&mut self, reg: u8) -> Nrf24Result<u8, SPI::Error, CSN::Error> {
        let mut buf = [cmd::R_REGISTER | (reg & 0x1F), cmd::NOP];
        self.command(&mut buf)?;
        Ok(buf[1])
    }

    fn read_regs(&mut self, reg: u8, out: &mut [u8; 5]) -> Nrf24Result<(), SPI::Error, CSN::Error> {
        let mut buf = [cmd::NOP; 6];
        buf[0] = cmd::R_REGISTER | (reg & 0x1F);
        self.command(&mut buf)?;
        out.copy_from_slice(&buf[1..]);
        Ok(())
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Nrf24Result<(), SPI::Error, CSN::Error> {
        self.command(&mut [cmd::W_REGISTER | (reg & 0x1F), value])?;
        Ok(())
    }

    fn write_regs(&mut self, reg: u8, values: &[u8; 5]) -> Nrf24Result<(), SPI::Error, CSN::Error> {
        let mut buf = [0u8; 6];
        buf[0] = cmd::W_REGISTER | (reg & 0x1F);
        buf[1..].copy_from_slice(values);
        self.command(&mut buf)?;
        Ok(())
    }

    fn clear_status(&mut self) -> Nrf24Result<(), SPI::Error, CSN::Error> {
        self.write_reg(reg::STATUS, bits::RX_DR | bits::TX_DS | bits::MAX_RT)
    }

    fn flush_rx(&mut self) -> Nrf24Result<(), SPI::Error, CSN::Error> {
        self.command(&mut [cmd::FLUSH_RX])?;
        Ok(())
    }

    fn flush_tx(&mut self) -> Nrf24Result<(), SPI::Error, CSN::Error> {
        self.command(&mut [cmd::FLUSH_TX])?;
        Ok(())
    }
}

impl<SPI, CSN, CE, D> RadioLink for Nrf24<SPI, CSN, CE, D>
where
    SPI: SpiBus,
    CSN: OutputPin,
    CE: OutputPin<Error = CSN::Error>,
    D: DelayNs,
{
    fn init(&mut self, mode: Mode, channel: ChannelOffset) -> RadioInitResult {
        self.configure(mode, channel).into()
    }

    fn send(&mut self, frame: &Frame) {
        // Delivery status is not reported to the session
        let _ = self.transmit(frame);
    }

    fn is_data_available(&mut self) -> bool {
        self.rx_available().unwrap_or(false)
    }

    fn receive(&mut self, frame: &mut Frame) {
        let _ = self.read_frame(frame);
    }

    fn config(&mut self) -> RadioConfig {
        self.read_config()
            .unwrap_or_else(|_| self.written_config())
    }
}
