//! Clock orchestrator: owns the alarm and timer, fronts the RTC and
//! sensor collaborators, and renders every view as a fixed 6-character
//! frame.
//!
//! The settings UI funnels every edit through [`Clock::adjust`] with an
//! [`Adjustment`] variant, so the mode controller stays ignorant of
//! field semantics and invalid (field, part) combinations cannot be
//! expressed at all.

use embassy_time::Instant;

use crate::alarm::Alarm;
use crate::storage::{PersistedSettings, SettingsStore};
use crate::timer::Timer;
use crate::types::{Buzzer, Date, Rtc, Sensor, Time};

/// One settings-UI increment. Each variant names the exact field part
/// it bumps; all of them wrap within their valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Adjustment {
    TimeHour,
    TimeMinute,
    TimeSecond,
    DateDay,
    DateMonth,
    DateYear,
    AlarmHour,
    AlarmMinute,
    AlarmToggle,
    TimerHour,
    TimerMinute,
    TimerSecond,
}

pub struct Clock<R: Rtc, S: Sensor> {
    rtc: R,
    sensor: S,
    alarm: Alarm,
    timer: Timer,
}

impl<R: Rtc, S: Sensor> Clock<R, S> {
    pub fn new(rtc: R, sensor: S) -> Self {
        Self {
            rtc,
            sensor,
            alarm: Alarm::new(),
            timer: Timer::new(),
        }
    }

    /// Advances the owned alarm and timer by the current tick.
    pub fn update<B: Buzzer>(&mut self, now: Instant, buzzer: &mut B) {
        self.timer.update(now);
        let wall = self.rtc.time();
        self.alarm.update(wall, now, buzzer);
    }

    pub fn time(&mut self) -> Time {
        self.rtc.time()
    }

    pub fn date(&mut self) -> Date {
        self.rtc.date()
    }

    pub fn set_time(&mut self, time: Time) {
        self.rtc.set_time(time);
    }

    pub fn set_date(&mut self, date: Date) {
        self.rtc.set_date(date);
    }

    pub fn temperature(&mut self) -> i8 {
        self.sensor.temperature()
    }

    pub fn humidity(&mut self) -> i8 {
        self.sensor.humidity()
    }

    pub fn alarm(&self) -> &Alarm {
        &self.alarm
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn is_alarm_triggered(&self) -> bool {
        self.alarm.is_triggered()
    }

    pub fn stop_alarm<B: Buzzer>(&mut self, buzzer: &mut B) {
        self.alarm.stop(buzzer);
    }

    pub fn set_alarm_time(&mut self, hour: u8, minute: u8) {
        self.alarm.set_time(hour, minute);
    }

    pub fn enable_alarm(&mut self) {
        self.alarm.enable();
    }

    /// Disarms the alarm; a ring in progress is silenced on the next
    /// `update`.
    pub fn disable_alarm(&mut self) {
        self.alarm.disable();
    }

    pub fn start_timer(&mut self, now: Instant) {
        self.timer.start(now);
    }

    pub fn set_timer_time(&mut self, hour: u8, minute: u8, second: u8) {
        self.timer.set_time(hour, minute, second);
    }

    pub fn stop_timer(&mut self) {
        self.timer.stop();
    }

    pub fn reset_timer(&mut self, now: Instant) {
        self.timer.reset(now);
    }

    /// Applies one settings-UI increment.
    pub fn adjust(&mut self, adjustment: Adjustment) {
        match adjustment {
            Adjustment::TimeHour => {
                let mut t = self.rtc.time();
                t.hour = (t.hour + 1) % 24;
                self.rtc.set_time(t);
            }
            Adjustment::TimeMinute => {
                let mut t = self.rtc.time();
                t.minute = (t.minute + 1) % 60;
                self.rtc.set_time(t);
            }
            Adjustment::TimeSecond => {
                let mut t = self.rtc.time();
                t.second = (t.second + 1) % 60;
                self.rtc.set_time(t);
            }
            Adjustment::DateDay => {
                let mut d = self.rtc.date();
                d.day = d.day % 31 + 1;
                self.rtc.set_date(d);
            }
            Adjustment::DateMonth => {
                let mut d = self.rtc.date();
                d.month = d.month % 12 + 1;
                self.rtc.set_date(d);
            }
            Adjustment::DateYear => {
                let mut d = self.rtc.date();
                d.year = d.year % 100 + 2024;
                self.rtc.set_date(d);
            }
            Adjustment::AlarmHour => self.alarm.adjust_hour(),
            Adjustment::AlarmMinute => self.alarm.adjust_minute(),
            Adjustment::AlarmToggle => self.alarm.toggle(),
            Adjustment::TimerHour => self.timer.adjust_hour(),
            Adjustment::TimerMinute => self.timer.adjust_minute(),
            Adjustment::TimerSecond => self.timer.adjust_second(),
        }
    }

    /// Loads persisted settings, applying only what survived
    /// validation. The RTC keeps its own battery-backed time; only the
    /// alarm configuration is restored from the payload.
    pub fn load_settings<St: SettingsStore>(&mut self, store: &mut St) {
        if let Ok(Some(settings)) = store.load() {
            self.alarm.set_setting(settings.alarm);
        }
    }

    /// Snapshots the durable subset and writes it through the store.
    pub fn save_settings<St: SettingsStore>(&mut self, store: &mut St) -> Result<(), St::Error> {
        let settings = PersistedSettings {
            time: self.rtc.time(),
            date: self.rtc.date(),
            alarm: self.alarm.setting(),
        };
        store.save(&settings)
    }

    /// Current time as `HHMMSS`.
    pub fn time_text(&mut self) -> [u8; 6] {
        let t = self.rtc.time();
        let mut frame = [0u8; 6];
        put2(&mut frame, 0, t.hour);
        put2(&mut frame, 2, t.minute);
        put2(&mut frame, 4, t.second);
        frame
    }

    /// Current date as `DDMMYY`.
    pub fn date_text(&mut self) -> [u8; 6] {
        let d = self.rtc.date();
        let mut frame = [0u8; 6];
        put2(&mut frame, 0, d.day);
        put2(&mut frame, 2, d.month);
        put2(&mut frame, 4, (d.year % 100) as u8);
        frame
    }

    /// Alarm time as `HHMM00`.
    pub fn alarm_text(&self) -> [u8; 6] {
        self.alarm.text()
    }

    /// Timer remainder as `HHMMSS`.
    pub fn timer_text(&self) -> [u8; 6] {
        self.timer.text()
    }

    /// Temperature as `␣␣NN*C` (`*` renders as the degree glyph).
    pub fn temperature_text(&mut self) -> [u8; 6] {
        reading_text(self.sensor.temperature(), b'C')
    }

    /// Humidity as `␣␣NN*H`.
    pub fn humidity_text(&mut self) -> [u8; 6] {
        reading_text(self.sensor.humidity(), b'H')
    }
}

fn put2(frame: &mut [u8; 6], at: usize, value: u8) {
    frame[at] = b'0' + value / 10;
    frame[at + 1] = b'0' + value % 10;
}

fn reading_text(value: i8, unit: u8) -> [u8; 6] {
    // The display has two digits for the reading; clamp instead of
    // showing garbage for out-of-range sensor values.
    let v = value.clamp(0, 99) as u8;
    let mut frame = [b' ', b' ', 0, 0, b'*', unit];
    put2(&mut frame, 2, v);
    frame
}
