//! Shared value types and collaborator interfaces.
//!
//! The core never owns wall-clock time or sensor readings; it reads
//! them through the [`Rtc`] and [`Sensor`] traits and drives the
//! audible alert through [`Buzzer`]. The firmware crate provides the
//! hardware implementations, tests provide fakes.

/// Wall-clock reading sourced from the external RTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Time {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl Time {
    pub const fn new(hour: u8, minute: u8, second: u8) -> Self {
        Self {
            hour,
            minute,
            second,
        }
    }

    /// Structural range check: 0-23 / 0-59 / 0-59.
    pub fn is_valid(&self) -> bool {
        self.hour <= 23 && self.minute <= 59 && self.second <= 59
    }
}

/// Calendar date sourced from the external RTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Date {
    pub day: u8,
    pub month: u8,
    pub year: u16,
}

impl Date {
    pub const fn new(day: u8, month: u8, year: u16) -> Self {
        Self { day, month, year }
    }

    /// Structural range check: 1-31 / 1-12 / 2020 onward.
    pub fn is_valid(&self) -> bool {
        (1..=31).contains(&self.day) && (1..=12).contains(&self.month) && self.year >= 2020
    }
}

impl Default for Date {
    fn default() -> Self {
        Self::new(1, 1, 2024)
    }
}

/// Real-time-clock collaborator.
///
/// Masking unavailable readings with last-known-good values is the
/// implementation's concern; callers treat every read as good.
pub trait Rtc {
    fn time(&mut self) -> Time;
    fn date(&mut self) -> Date;
    fn set_time(&mut self, time: Time);
    fn set_date(&mut self, date: Date);
}

/// Temperature/humidity sensor collaborator.
///
/// Refresh throttling and failure masking happen behind this trait.
pub trait Sensor {
    /// Degrees Celsius.
    fn temperature(&mut self) -> i8;
    /// Relative humidity in percent.
    fn humidity(&mut self) -> i8;
}

/// Tone-generation collaborator.
///
/// `play_alarm` starts the alert pattern, `stop_alarm` silences it.
/// Both must be safe to call in any order; pattern playback itself is
/// the implementation's concern.
pub trait Buzzer {
    fn play_alarm(&mut self);
    fn stop_alarm(&mut self);
}
