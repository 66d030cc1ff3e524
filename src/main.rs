//! nRF24L01+ Link Main Application
//!
//! Entry point for the link firmware. Brings up the peripherals, starts the
//! heartbeat at interrupt priority and runs the radio session in thread
//! mode.

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use defmt::unwrap;
use embassy_executor::{Executor, InterruptExecutor};
use embassy_stm32::gpio::{Level, Output, Speed};
use embassy_stm32::interrupt;
use embassy_stm32::interrupt::{InterruptExt, Priority};
use embassy_stm32::mode::Blocking;
use embassy_stm32::spi::{self, Spi};
use embassy_stm32::time::Hertz;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use nrf24_link::prelude::*;

/// Transceiver on SPI1 with CSN and CE on plain outputs
type Radio = Nrf24<Spi<'static, Blocking>, Output<'static>, Output<'static>, Delay>;

/// Runs the heartbeat; preempts the session loop
static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();

/// Runs the session loop
static EXECUTOR_LOW: StaticCell<Executor> = StaticCell::new();

// USART1 is unused on this board; its vector drives the high-priority executor
#[interrupt]
unsafe fn USART1() {
    EXECUTOR_HIGH.on_interrupt();
}

/// Main entry point
#[entry]
fn main() -> ! {
    info!(
        "nRF24 link firmware v{} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("NRF24_LINK_ROLE")
    );

    // Initialize STM32G474 peripherals with default clock configuration
    let p = embassy_stm32::init(embassy_stm32::Config::default());

    // Heartbeat LED at interrupt priority, independent of the session
    let led = Output::new(p.PA5, Level::Low, Speed::Low);
    interrupt::USART1.set_priority(Priority::P6);
    let spawner = EXECUTOR_HIGH.start(interrupt::USART1);
    unwrap!(spawner.spawn(heartbeat_task(led)));

    let mut console = DefmtConsole;
    console.report(&Status::PeripheralsReady);

    // SPI1 to the transceiver: PB3 = SCK, PB5 = MOSI, PB4 = MISO
    let mut spi_config = spi::Config::default();
    spi_config.frequency = Hertz(SPI_FREQUENCY_HZ);
    let spi = Spi::new_blocking(p.SPI1, p.PB3, p.PB5, p.PB4, spi_config);
    let csn = Output::new(p.PA4, Level::High, Speed::VeryHigh);
    let ce = Output::new(p.PB0, Level::Low, Speed::VeryHigh);
    let radio = Nrf24::new(spi, csn, ce, Delay);

    let executor = EXECUTOR_LOW.init(Executor::new());
    executor.run(|spawner| {
        unwrap!(spawner.spawn(session_task(radio, console)));
    })
}

/// Heartbeat task - toggles the status LED every period
#[embassy_executor::task]
async fn heartbeat_task(led: Output<'static>) {
    HeartbeatTimer::from_period_ms(HEARTBEAT_PERIOD_MS)
        .run(Heartbeat::new(led))
        .await
}

/// Session task - one radio init attempt, then the role's loop forever
#[embassy_executor::task]
async fn session_task(mut radio: Radio, mut console: DefmtConsole) {
    let mut session = RadioSession::<ActiveRole>::new(CHANNEL_OFFSET);
    session.start(&mut radio, &mut console);

    loop {
        let step = session.step(&mut radio, &mut console);
        pause(step).await;
    }
}
