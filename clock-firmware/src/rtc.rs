//! DS1307 real-time clock driver.
//!
//! Battery-backed timekeeping over I2C. The chip keeps counting
//! through power cycles from its coin cell, which is why the stored
//! settings never need to carry a time snapshot forward.
//!
//! # Hardware Design
//!
//! - DS1307 at 7-bit address 0x68 on I2C1 (100 kHz)
//! - CR2032 backup cell on V_BAT
//! - Registers 0x00-0x06 hold seconds through year in BCD
//! - Bit 7 of the seconds register is the clock-halt flag; it powers
//!   up set on a fresh cell and must be cleared once to start the
//!   oscillator
//!
//! # Failure Masking
//!
//! A failed bus transfer returns the last successfully read value, so
//! a transient NACK never puts garbage on the display. The masked
//! value ages at most one control-loop iteration.

use embassy_stm32::i2c::I2c;
use embassy_stm32::mode::Blocking;

use clock_core::types::{Date, Rtc, Time};

/// 7-bit I2C slave address of the DS1307.
const ADDRESS: u8 = 0x68;

/// Clock-halt flag in the seconds register.
const CH_BIT: u8 = 0x80;

/// The year register holds two BCD digits. They are mapped into the
/// 2024-2123 window the settings UI cycles through: 24-99 mean 20xx,
/// 00-23 mean 21xx.
const YEAR_WINDOW_START: u16 = 2024;

fn to_bcd(value: u8) -> u8 {
    (value / 10) << 4 | (value % 10)
}

fn from_bcd(value: u8) -> u8 {
    (value >> 4) * 10 + (value & 0x0F)
}

fn year_from_register(raw: u8) -> u16 {
    let raw = u16::from(from_bcd(raw));
    if raw >= YEAR_WINDOW_START % 100 {
        2000 + raw
    } else {
        2100 + raw
    }
}

/// DS1307 driver with last-known-good read masking.
pub struct Ds1307 {
    i2c: I2c<'static, Blocking>,
    last_time: Time,
    last_date: Date,
}

impl Ds1307 {
    /// Wraps the bus and starts the oscillator if it was halted.
    ///
    /// # Arguments
    ///
    /// * `i2c` - Blocking I2C1 bus with the DS1307 attached
    pub fn new(i2c: I2c<'static, Blocking>) -> Self {
        let mut rtc = Self {
            i2c,
            last_time: Time::default(),
            last_date: Date::default(),
        };
        rtc.ensure_running();
        rtc
    }

    /// Clears the clock-halt flag so the oscillator counts.
    ///
    /// Preserves the seconds value alongside the flag. A bus failure
    /// here is left for the next read to surface.
    fn ensure_running(&mut self) {
        let mut seconds = [0u8];
        if self.i2c.blocking_write_read(ADDRESS, &[0x00], &mut seconds).is_ok()
            && seconds[0] & CH_BIT != 0
        {
            let _ = self
                .i2c
                .blocking_write(ADDRESS, &[0x00, seconds[0] & !CH_BIT]);
        }
    }

    /// Burst-reads registers 0x00-0x06.
    fn read_registers(&mut self) -> Option<[u8; 7]> {
        let mut raw = [0u8; 7];
        self.i2c
            .blocking_write_read(ADDRESS, &[0x00], &mut raw)
            .ok()?;
        Some(raw)
    }
}

impl Rtc for Ds1307 {
    fn time(&mut self) -> Time {
        if let Some(raw) = self.read_registers() {
            let time = Time::new(
                // 24-hour mode is assumed; bit 6 selects 12-hour mode
                // and is never written by this driver.
                from_bcd(raw[2] & 0x3F),
                from_bcd(raw[1] & 0x7F),
                from_bcd(raw[0] & !CH_BIT),
            );
            if time.is_valid() {
                self.last_time = time;
            }
        }
        self.last_time
    }

    fn date(&mut self) -> Date {
        if let Some(raw) = self.read_registers() {
            let date = Date::new(
                from_bcd(raw[4] & 0x3F),
                from_bcd(raw[5] & 0x1F),
                year_from_register(raw[6]),
            );
            if date.is_valid() {
                self.last_date = date;
            }
        }
        self.last_date
    }

    fn set_time(&mut self, time: Time) {
        let frame = [
            0x00,
            to_bcd(time.second),
            to_bcd(time.minute),
            to_bcd(time.hour),
        ];
        if self.i2c.blocking_write(ADDRESS, &frame).is_ok() {
            self.last_time = time;
        }
    }

    fn set_date(&mut self, date: Date) {
        // Register 0x03 is the day-of-week counter, unused here but
        // part of the burst; pin it to 1.
        let frame = [
            0x03,
            1,
            to_bcd(date.day),
            to_bcd(date.month),
            to_bcd((date.year % 100) as u8),
        ];
        if self.i2c.blocking_write(ADDRESS, &frame).is_ok() {
            self.last_date = date;
        }
    }
}
