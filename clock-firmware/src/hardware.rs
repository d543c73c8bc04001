//! Hardware abstraction and peripheral initialization.
//!
//! This module defines the pin mappings and peripheral initialization
//! for the bedside clock hardware.
//!
//! # Pin Assignments
//!
//! ## Buttons (active-low, internal pull-ups)
//! - **PA0**: SELECT - mode toggle / field select / date view
//! - **PA1**: ADJ_A - first adjust / temperature-humidity view
//! - **PA4**: ADJ_B - second adjust / alarm view
//! - **PA5**: ADJ_C - third adjust / timer view
//!
//! ## Display (6-digit 7-segment, shift register + BCD decoder)
//! - **PB1**: SEL0 - digit address bit 0 (LSB)
//! - **PB3**: SEL1 - digit address bit 1
//! - **PB4**: SEL2 - digit address bit 2
//! - **PB5**: SEL3 - digit address bit 3
//! - **PA15**: SDATA - segment shift register data
//! - **PB0**: SCLK - segment shift register clock
//!
//! ## Sensors & Alert
//! - **PA6**: DHT - DHT11 data line (external 5.1 kΩ pull-up)
//! - **PA7**: BUZZ - active buzzer drive (high = sounding)
//!
//! ## RTC (DS1307 @ 0x68)
//! - **PA9**: I2C1_SCL
//! - **PA10**: I2C1_SDA
//!
//! ## Console
//! - **PA2**: USART2_TX
//! - **PA3**: USART2_RX
//!
//! ## Debug (SWD)
//! - **PA13**: SWDIO
//! - **PA14**: SWCLK
//!
//! # Settings Storage
//!
//! The persisted settings record lives in the last 128-byte page of
//! the 32 KiB program flash. The linker script must keep the image
//! clear of that page.

use embassy_stm32::flash::{Blocking, Flash};
use embassy_stm32::gpio::{Flex, Input, Level, Output, Pull, Speed};
use embassy_stm32::i2c::I2c;
use embassy_stm32::time::Hertz;
use embassy_stm32::usart::{self, BufferedUart};
use embassy_stm32::{bind_interrupts, peripherals};
use embassy_time::Delay;
use static_cell::StaticCell;

use clock_core::mode::Buttons;
use clock_core::storage::FlashSettingsStore;
use clock_core::SegmentDisplay;

use crate::buzzer::PatternBuzzer;
use crate::rtc::Ds1307;
use crate::sensor::Dht11;

bind_interrupts!(struct Irqs {
    USART2 => usart::BufferedInterruptHandler<peripherals::USART2>;
});

/// Byte offset of the settings page within program flash.
///
/// Last page of the STM32L031G6's 32 KiB flash.
const SETTINGS_OFFSET: u32 = 32 * 1024 - 128;

/// Console line rate.
const CONSOLE_BAUD: u32 = 115_200;

static CONSOLE_TX_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static CONSOLE_RX_BUF: StaticCell<[u8; 64]> = StaticCell::new();

/// Top-level peripheral container for the bedside clock.
///
/// Owns every hardware driver the control loop and the console task
/// need, constructed in one place from the STM32 peripheral
/// singleton.
pub struct Board {
    /// The four debounced front-panel buttons.
    pub buttons: Buttons<Input<'static>>,
    /// Multiplexed 7-segment display driver.
    pub display: SegmentDisplay<Output<'static>, Delay>,
    /// Alarm buzzer pattern driver.
    pub buzzer: PatternBuzzer,
    /// Battery-backed real-time clock.
    pub rtc: Ds1307,
    /// Temperature/humidity sensor.
    pub sensor: Dht11,
    /// Settings persistence in the last flash page.
    pub store: FlashSettingsStore<Flash<'static, Blocking>>,
    /// Maintenance console UART, handed to the console task.
    pub console: BufferedUart<'static>,
}

impl Board {
    /// Initializes all peripherals from the STM32 peripheral singleton.
    ///
    /// # Arguments
    ///
    /// * `p` - STM32 peripheral singleton from embassy_stm32::init()
    ///
    /// # Panics
    ///
    /// On invalid UART configuration, which cannot happen with the
    /// constants used here.
    pub fn new(p: embassy_stm32::Peripherals) -> Self {
        let mut console_config = usart::Config::default();
        console_config.baudrate = CONSOLE_BAUD;
        let console = BufferedUart::new(
            p.USART2,
            Irqs,
            p.PA3,
            p.PA2,
            CONSOLE_TX_BUF.init([0; 64]),
            CONSOLE_RX_BUF.init([0; 64]),
            console_config,
        )
        .unwrap();

        Self {
            buttons: Buttons::new(
                Input::new(p.PA0, Pull::Up),
                Input::new(p.PA1, Pull::Up),
                Input::new(p.PA4, Pull::Up),
                Input::new(p.PA5, Pull::Up),
            ),
            display: SegmentDisplay::new(
                [
                    Output::new(p.PB1, Level::Low, Speed::Low),
                    Output::new(p.PB3, Level::Low, Speed::Low),
                    Output::new(p.PB4, Level::Low, Speed::Low),
                    Output::new(p.PB5, Level::Low, Speed::Low),
                ],
                Output::new(p.PA15, Level::Low, Speed::Low),
                Output::new(p.PB0, Level::Low, Speed::Low),
                Delay,
            ),
            buzzer: PatternBuzzer::new(Output::new(p.PA7, Level::Low, Speed::Low)),
            rtc: Ds1307::new(I2c::new_blocking(
                p.I2C1,
                p.PA9,
                p.PA10,
                Hertz::khz(100),
                Default::default(),
            )),
            sensor: Dht11::new(Flex::new(p.PA6)),
            store: FlashSettingsStore::new(Flash::new_blocking(p.FLASH), SETTINGS_OFFSET),
            console,
        }
    }
}
