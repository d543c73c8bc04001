//! Firmware for a bedside digital clock with alarm, timer and
//! temperature display.
//!
//! # Overview
//!
//! This firmware drives a mains-powered bedside clock featuring:
//! - 6-digit multiplexed 7-segment display (shift register + BCD
//!   digit decoder)
//! - Battery-backed DS1307 real-time clock over I2C
//! - DHT11 temperature/humidity sensor
//! - Four-button settings interface with a blinking edit cursor
//! - Alarm with a triple-beep pattern and a countdown timer
//! - Serial maintenance console on USART2
//!
//! # Hardware
//!
//! - **MCU**: STM32L031G6U6 (Cortex-M0+)
//! - **RTC**: DS1307 with CR2032 backup cell
//! - **Display**: 6x common-cathode 7-segment digits, 74HC595 segment
//!   shift register, CD4511-style BCD digit select
//! - **Sensor**: DHT11 on a single pulled-up data line
//! - **Alert**: active buzzer behind an NPN driver
//!
//! # Control Loop
//!
//! All clock behavior runs in one cooperative loop: drain console
//! commands, sample buttons, run the mode state machine, advance the
//! alarm and timer, step the buzzer pattern, then scan the display
//! once. The display scan doubles as the loop pacing, one full pass
//! holds each digit for 2 ms. Only the console UART runs as a
//! separate task.
//!
//! # Module Organization
//!
//! - [`hardware`] - Pin mappings and peripheral initialization
//! - [`buzzer`] - Alarm beep pattern driver
//! - [`rtc`] - DS1307 driver
//! - [`sensor`] - DHT11 driver
//! - [`console`] - Serial command plumbing
//!
//! The portable behavior (state machines, rendering, persistence
//! format) lives in the `clock-core` crate, which this binary wires
//! to real peripherals.

#![no_std]
#![no_main]

mod buzzer;
mod console;
mod hardware;
mod rtc;
mod sensor;

use embassy_executor::Spawner;
use embassy_stm32::{
    Config,
    rcc::{LsConfig, LseConfig, mux::ClockMux},
    time::Hertz,
};
use embassy_time::{Instant, Timer};
use {defmt_rtt as _, panic_probe as _};

use clock_core::{Clock, ModeController};

use hardware::Board;

/// Creates the clock configuration for STM32L031.
///
/// # Clock Settings
///
/// - **MSI**: 2.097 MHz (no PLL)
/// - **System clock**: MSI
/// - **LSE**: 32.768 kHz external crystal for the embassy time driver
/// - **Voltage scale**: Range 1
///
/// The display multiplexing and the DHT11 bit-banging both busy-wait
/// on microsecond-scale edges, so the sub-MHz MSI ranges are not an
/// option here.
///
/// # Returns
///
/// Configured RCC settings for embassy-stm32 initialization
fn create_clock_config() -> embassy_stm32::rcc::Config {
    embassy_stm32::rcc::Config {
        msi: Some(embassy_stm32::rcc::MSIRange::RANGE2M),
        hsi: false,
        hse: None,
        pll: None,
        sys: embassy_stm32::rcc::Sysclk::MSI,
        ahb_pre: embassy_stm32::rcc::AHBPrescaler::DIV1,
        apb1_pre: embassy_stm32::rcc::APBPrescaler::DIV1,
        apb2_pre: embassy_stm32::rcc::APBPrescaler::DIV1,
        ls: LsConfig {
            rtc: embassy_stm32::rcc::RtcClockSource::LSE,
            lsi: false,
            lse: Some(LseConfig {
                frequency: Hertz::hz(32768),
                mode: embassy_stm32::rcc::LseMode::Oscillator(embassy_stm32::rcc::LseDrive::Low),
            }),
        },
        voltage_scale: embassy_stm32::rcc::VoltageScale::RANGE1,
        mux: ClockMux::default(),
    }
}

/// Main entry point for the bedside clock firmware.
///
/// # Initialization Sequence
///
/// 1. Configure clocks (2.097 MHz MSI, LSE time driver)
/// 2. Initialize STM32 peripherals and hardware drivers
/// 3. Restore persisted settings from flash (alarm only, the DS1307
///    keeps time through power loss on its own)
/// 4. Spawn the console task
/// 5. Enter the control loop
///
/// # Spawned Tasks
///
/// - **console_task**: Pumps USART2 bytes to/from the command queues
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let mut config = Config::default();
    config.rcc = create_clock_config();

    let p = embassy_stm32::init(config);

    #[cfg(feature = "debug-mode")]
    defmt::info!("Bedside clock firmware starting...");

    let Board {
        mut buttons,
        mut display,
        mut buzzer,
        rtc,
        sensor,
        mut store,
        console,
    } = Board::new(p);

    let mut clock = Clock::new(rtc, sensor);

    #[cfg(feature = "debug-mode")]
    defmt::info!("Restoring persisted settings...");

    clock.load_settings(&mut store);

    let mut mode = ModeController::new(Instant::now());

    #[cfg(feature = "debug-mode")]
    defmt::info!("Spawning console task...");

    spawner.spawn(console::console_task(console)).unwrap();

    #[cfg(feature = "debug-mode")]
    defmt::info!("Entering control loop...");

    loop {
        let now = Instant::now();

        console::service(&mut clock);
        buttons.update(now);
        mode.update(&mut buttons, &mut clock, &mut display, &mut store, now);
        clock.update(now, &mut buzzer);
        buzzer.update(now);
        display.update();

        // The scan above holds each digit for 2 ms; this await is what
        // lets the console task run between scans.
        Timer::after_millis(2).await;
    }
}
