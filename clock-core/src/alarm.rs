//! Daily alarm: `Disabled → Armed → Triggered → Armed`.
//!
//! The alarm fires when the wall clock enters the first half of the
//! configured minute and rings for a fixed duration, then re-arms on
//! its own; it never rings indefinitely. `enable`/`disable` toggle
//! Disabled ↔ Armed, `stop` forces Triggered → Armed early.

use embassy_time::{Duration, Instant};

use crate::types::{Buzzer, Time};

/// How long a triggered alarm rings before it silences itself.
pub const RING_DURATION: Duration = Duration::from_secs(10);

/// The alarm only fires while `second` is below this bound. Keeps the
/// detection window inside the first half of the target minute so a
/// sub-minute sampling cadence cannot miss it.
pub const TRIGGER_WINDOW_SECONDS: u8 = 30;

/// Persistable alarm configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmSetting {
    pub hour: u8,
    pub minute: u8,
    pub enabled: bool,
}

impl AlarmSetting {
    pub fn is_valid(&self) -> bool {
        self.hour <= 23 && self.minute <= 59
    }
}

impl Default for AlarmSetting {
    fn default() -> Self {
        Self {
            hour: 7,
            minute: 0,
            enabled: false,
        }
    }
}

/// Alarm state machine.
///
/// `ringing` is transient runtime state and is never persisted;
/// `fired_this_minute` latches after a trigger so an early stop cannot
/// re-fire inside the same target minute.
pub struct Alarm {
    setting: AlarmSetting,
    ringing: Option<Instant>,
    fired_this_minute: bool,
    /// Whether the buzzer has been commanded on.
    sounding: bool,
}

impl Alarm {
    pub fn new() -> Self {
        Self {
            setting: AlarmSetting::default(),
            ringing: None,
            fired_this_minute: false,
            sounding: false,
        }
    }

    pub fn enable(&mut self) {
        self.setting.enabled = true;
    }

    pub fn disable(&mut self) {
        self.setting.enabled = false;
        self.ringing = None;
    }

    /// Force Triggered → Armed and silence the buzzer immediately.
    pub fn stop<B: Buzzer>(&mut self, buzzer: &mut B) {
        self.ringing = None;
        if self.sounding {
            buzzer.stop_alarm();
            self.sounding = false;
        }
    }

    pub fn set_time(&mut self, hour: u8, minute: u8) {
        self.setting.hour = hour;
        self.setting.minute = minute;
    }

    /// Applies a full configuration, e.g. from persisted settings.
    pub fn set_setting(&mut self, setting: AlarmSetting) {
        self.setting = setting;
        self.ringing = None;
    }

    /// Increment the alarm hour, wrapping at 24. Settings UI hook.
    pub fn adjust_hour(&mut self) {
        self.setting.hour = (self.setting.hour + 1) % 24;
    }

    /// Increment the alarm minute, wrapping at 60. Settings UI hook.
    pub fn adjust_minute(&mut self) {
        self.setting.minute = (self.setting.minute + 1) % 60;
    }

    pub fn toggle(&mut self) {
        if self.setting.enabled {
            self.disable();
        } else {
            self.enable();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.setting.enabled
    }

    pub fn is_triggered(&self) -> bool {
        self.ringing.is_some()
    }

    pub fn setting(&self) -> AlarmSetting {
        self.setting
    }

    /// True iff armed, not yet fired this minute, and the wall clock is
    /// inside the first [`TRIGGER_WINDOW_SECONDS`] of the target minute.
    pub fn should_trigger(&self, now: Time) -> bool {
        self.setting.enabled
            && self.ringing.is_none()
            && !self.fired_this_minute
            && now.hour == self.setting.hour
            && now.minute == self.setting.minute
            && now.second < TRIGGER_WINDOW_SECONDS
    }

    /// Advances the state machine and reconciles the buzzer.
    pub fn update<B: Buzzer>(&mut self, wall: Time, now: Instant, buzzer: &mut B) {
        // The same-minute latch releases once the wall clock leaves the
        // target minute.
        if wall.hour != self.setting.hour || wall.minute != self.setting.minute {
            self.fired_this_minute = false;
        }

        if self.should_trigger(wall) {
            self.ringing = Some(now);
            self.fired_this_minute = true;
        }

        if let Some(started) = self.ringing {
            if now - started >= RING_DURATION {
                self.ringing = None;
            }
        }

        let should_sound = self.ringing.is_some();
        if should_sound && !self.sounding {
            buzzer.play_alarm();
        } else if !should_sound && self.sounding {
            buzzer.stop_alarm();
        }
        self.sounding = should_sound;
    }

    /// Alarm time as a display frame, `HHMM00`.
    pub fn text(&self) -> [u8; 6] {
        [
            b'0' + self.setting.hour / 10,
            b'0' + self.setting.hour % 10,
            b'0' + self.setting.minute / 10,
            b'0' + self.setting.minute % 10,
            b'0',
            b'0',
        ]
    }
}

impl Default for Alarm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeBuzzer {
        playing: bool,
        plays: u32,
        stops: u32,
    }

    impl Buzzer for FakeBuzzer {
        fn play_alarm(&mut self) {
            self.playing = true;
            self.plays += 1;
        }

        fn stop_alarm(&mut self) {
            self.playing = false;
            self.stops += 1;
        }
    }

    fn at(secs: u64) -> Instant {
        Instant::from_secs(secs)
    }

    fn armed_at(hour: u8, minute: u8) -> Alarm {
        let mut alarm = Alarm::new();
        alarm.set_time(hour, minute);
        alarm.enable();
        alarm
    }

    #[test]
    fn trigger_window_is_first_half_of_minute() {
        let alarm = armed_at(7, 0);

        assert!(!alarm.should_trigger(Time::new(6, 59, 58)));
        assert!(alarm.should_trigger(Time::new(7, 0, 0)));
        assert!(alarm.should_trigger(Time::new(7, 0, 5)));
        assert!(alarm.should_trigger(Time::new(7, 0, 29)));
        assert!(!alarm.should_trigger(Time::new(7, 0, 30)));
        assert!(!alarm.should_trigger(Time::new(7, 0, 59)));
        assert!(!alarm.should_trigger(Time::new(7, 1, 0)));
        assert!(!alarm.should_trigger(Time::new(8, 0, 0)));
    }

    #[test]
    fn disabled_alarm_never_triggers() {
        let mut alarm = armed_at(7, 0);
        alarm.disable();
        assert!(!alarm.should_trigger(Time::new(7, 0, 5)));
    }

    #[test]
    fn rings_then_auto_stops_after_ten_seconds() {
        let mut alarm = armed_at(7, 0);
        let mut buzzer = FakeBuzzer::default();

        alarm.update(Time::new(6, 59, 58), at(0), &mut buzzer);
        assert!(!alarm.is_triggered());

        alarm.update(Time::new(7, 0, 5), at(7), &mut buzzer);
        assert!(alarm.is_triggered());
        assert!(buzzer.playing);

        // Ten simulated seconds later it re-arms without stop().
        alarm.update(Time::new(7, 0, 15), at(17), &mut buzzer);
        assert!(!alarm.is_triggered());
        assert!(!buzzer.playing);
        assert!(alarm.is_enabled());
    }

    #[test]
    fn does_not_refire_in_the_same_minute_after_stop() {
        let mut alarm = armed_at(7, 0);
        let mut buzzer = FakeBuzzer::default();

        alarm.update(Time::new(7, 0, 2), at(2), &mut buzzer);
        assert!(alarm.is_triggered());

        alarm.stop(&mut buzzer);
        assert!(!alarm.is_triggered());
        assert!(!buzzer.playing);

        alarm.update(Time::new(7, 0, 10), at(10), &mut buzzer);
        assert!(!alarm.is_triggered());

        // Next day, same minute: fires again.
        alarm.update(Time::new(7, 1, 0), at(60), &mut buzzer);
        alarm.update(Time::new(7, 0, 3), at(86_400), &mut buzzer);
        assert!(alarm.is_triggered());
    }

    #[test]
    fn play_commanded_once_per_ring() {
        let mut alarm = armed_at(7, 0);
        let mut buzzer = FakeBuzzer::default();

        alarm.update(Time::new(7, 0, 1), at(1), &mut buzzer);
        alarm.update(Time::new(7, 0, 2), at(2), &mut buzzer);
        alarm.update(Time::new(7, 0, 3), at(3), &mut buzzer);
        assert_eq!(buzzer.plays, 1);
        assert_eq!(buzzer.stops, 0);
    }

    #[test]
    fn hour_and_minute_adjust_wrap() {
        let mut alarm = Alarm::new();
        alarm.set_time(23, 59);
        alarm.adjust_hour();
        alarm.adjust_minute();
        let setting = alarm.setting();
        assert_eq!((setting.hour, setting.minute), (0, 0));
    }

    #[test]
    fn text_is_hhmm00() {
        let mut alarm = Alarm::new();
        alarm.set_time(7, 5);
        assert_eq!(&alarm.text(), b"070500");
    }
}
