//! Display-mode / settings-mode state machine.
//!
//! The controller consumes button edge events, mutates the clock
//! through its adjustment API and decides what the display shows each
//! cycle. It owns no domain data, only transient UI state.
//!
//! # State Machine
//!
//! ```text
//!                 long-press (select)
//!  DisplayMode ◄────────────────────► SettingsMode
//!      │                                   │
//!      │ view recomputed every cycle       │ single-press cycles the
//!      │ from held buttons                 │ field, adjust buttons
//!      │                                   │ bump its parts
//!      └── Time | Date | TempHum |         └── 30 s timeout or the
//!          Alarm | Timer                       toggle exits, saving
//!                                              settings first
//! ```
//!
//! In settings mode the edited field blinks: its frame is shown only
//! while the blink phase is on, the display is fully blanked otherwise.

use embassy_time::{Duration, Instant};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::button::Button;
use crate::clock::{Adjustment, Clock};
use crate::display::SegmentDisplay;
use crate::storage::SettingsStore;
use crate::types::{Rtc, Sensor};

/// Settings mode exits on its own this long after entry.
pub const SETTINGS_TIMEOUT: Duration = Duration::from_secs(30);

/// Blink cadence of the edited field.
pub const BLINK_INTERVAL: Duration = Duration::from_millis(100);

/// Temperature and humidity alternate at this cadence while their
/// shared view is active.
pub const READING_SWAP_INTERVAL: Duration = Duration::from_secs(3);

/// Colon-dot blink cadence in the time view.
pub const DOT_INTERVAL: Duration = Duration::from_millis(500);

/// What the display currently shows in display mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayView {
    Time,
    Date,
    TempHumidity,
    Alarm,
    Timer,
}

/// The field being edited in settings mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingField {
    Time,
    Date,
    Alarm,
    Timer,
}

impl SettingField {
    /// Cyclic successor; the cycle length is four.
    pub fn next(self) -> Self {
        match self {
            SettingField::Time => SettingField::Date,
            SettingField::Date => SettingField::Alarm,
            SettingField::Alarm => SettingField::Timer,
            SettingField::Timer => SettingField::Time,
        }
    }
}

/// Which of the three adjust buttons fired.
#[derive(Debug, Clone, Copy)]
enum AdjustSlot {
    A,
    B,
    C,
}

/// Maps (field, adjust button) to the concrete clock mutation.
fn adjustment_for(field: SettingField, slot: AdjustSlot) -> Adjustment {
    match (field, slot) {
        (SettingField::Time, AdjustSlot::A) => Adjustment::TimeHour,
        (SettingField::Time, AdjustSlot::B) => Adjustment::TimeMinute,
        (SettingField::Time, AdjustSlot::C) => Adjustment::TimeSecond,
        (SettingField::Date, AdjustSlot::A) => Adjustment::DateDay,
        (SettingField::Date, AdjustSlot::B) => Adjustment::DateMonth,
        (SettingField::Date, AdjustSlot::C) => Adjustment::DateYear,
        (SettingField::Alarm, AdjustSlot::A) => Adjustment::AlarmHour,
        (SettingField::Alarm, AdjustSlot::B) => Adjustment::AlarmMinute,
        (SettingField::Alarm, AdjustSlot::C) => Adjustment::AlarmToggle,
        (SettingField::Timer, AdjustSlot::A) => Adjustment::TimerHour,
        (SettingField::Timer, AdjustSlot::B) => Adjustment::TimerMinute,
        (SettingField::Timer, AdjustSlot::C) => Adjustment::TimerSecond,
    }
}

/// The four physical buttons, named by their role.
///
/// `select` doubles as the mode toggle (long press) and the date view
/// (held); the three adjust buttons double as the remaining view
/// overrides.
pub struct Buttons<I: InputPin> {
    pub select: Button<I>,
    pub adjust_a: Button<I>,
    pub adjust_b: Button<I>,
    pub adjust_c: Button<I>,
}

impl<I: InputPin> Buttons<I> {
    pub fn new(select: I, adjust_a: I, adjust_b: I, adjust_c: I) -> Self {
        Self {
            select: Button::new(select),
            adjust_a: Button::new(adjust_a),
            adjust_b: Button::new(adjust_b),
            adjust_c: Button::new(adjust_c),
        }
    }

    /// Samples all four inputs once.
    pub fn update(&mut self, now: Instant) {
        self.select.update(now);
        self.adjust_a.update(now);
        self.adjust_b.update(now);
        self.adjust_c.update(now);
    }

    fn drain_events(&mut self) {
        self.select.drain_events();
        self.adjust_a.drain_events();
        self.adjust_b.drain_events();
        self.adjust_c.drain_events();
    }
}

enum Mode {
    Display,
    Settings {
        field: SettingField,
        entered_at: Instant,
        blink_on: bool,
        last_blink: Instant,
    },
}

/// The settings/display mode controller.
pub struct ModeController {
    mode: Mode,
    view: DisplayView,
    /// Which half of the shared temp/humidity slot is showing.
    show_temperature: bool,
    last_reading_swap: Instant,
    dot_on: bool,
    last_dot_toggle: Instant,
}

impl ModeController {
    pub fn new(now: Instant) -> Self {
        Self {
            mode: Mode::Display,
            view: DisplayView::Time,
            show_temperature: true,
            last_reading_swap: now,
            dot_on: false,
            last_dot_toggle: now,
        }
    }

    pub fn is_settings_mode(&self) -> bool {
        matches!(self.mode, Mode::Settings { .. })
    }

    /// Active field while in settings mode.
    pub fn setting_field(&self) -> Option<SettingField> {
        match self.mode {
            Mode::Settings { field, .. } => Some(field),
            Mode::Display => None,
        }
    }

    /// View chosen on the last display-mode cycle.
    pub fn view(&self) -> DisplayView {
        self.view
    }

    /// One mode-logic pass. Must run after the buttons were sampled
    /// and before the clock advances, every control-loop iteration.
    pub fn update<I, R, S, St, P, D>(
        &mut self,
        buttons: &mut Buttons<I>,
        clock: &mut Clock<R, S>,
        display: &mut SegmentDisplay<P, D>,
        store: &mut St,
        now: Instant,
    ) where
        I: InputPin,
        R: Rtc,
        S: Sensor,
        St: SettingsStore,
        P: OutputPin,
        D: DelayNs,
    {
        // The toggle gesture is consumed here and nowhere else, so one
        // long press flips the mode exactly once.
        if buttons.select.take_long_press() {
            match self.mode {
                Mode::Display => self.enter_settings(buttons, now),
                Mode::Settings { .. } => self.exit_settings(clock, store),
            }
        }

        if let Mode::Settings { entered_at, .. } = self.mode {
            if now - entered_at > SETTINGS_TIMEOUT {
                self.exit_settings(clock, store);
            }
        }

        match &mut self.mode {
            Mode::Settings {
                field,
                blink_on,
                last_blink,
                ..
            } => {
                if buttons.select.take_single_press() {
                    *field = field.next();
                    // Restart the blink cycle so the new field shows
                    // from a blank phase, same as on entry.
                    *blink_on = false;
                    *last_blink = now;
                }

                if buttons.adjust_a.take_single_press() {
                    clock.adjust(adjustment_for(*field, AdjustSlot::A));
                }
                if buttons.adjust_b.take_single_press() {
                    clock.adjust(adjustment_for(*field, AdjustSlot::B));
                }
                if buttons.adjust_c.take_single_press() {
                    clock.adjust(adjustment_for(*field, AdjustSlot::C));
                }

                if now - *last_blink > BLINK_INTERVAL {
                    *blink_on = !*blink_on;
                    *last_blink = now;
                }

                if *blink_on {
                    let frame = match field {
                        SettingField::Time => clock.time_text(),
                        SettingField::Date => clock.date_text(),
                        SettingField::Alarm => clock.alarm_text(),
                        SettingField::Timer => clock.timer_text(),
                    };
                    display.print(&frame);
                    display.set_dot(false);
                } else {
                    display.clear();
                }
            }
            Mode::Display => {
                // Level-sensitive view selection: an auxiliary view
                // holds only while its button is physically held.
                let view = if buttons.select.is_pressed() && !buttons.adjust_a.is_pressed() {
                    DisplayView::Date
                } else if buttons.adjust_a.is_pressed() {
                    DisplayView::TempHumidity
                } else if buttons.adjust_b.is_pressed() {
                    DisplayView::Alarm
                } else if buttons.adjust_c.is_pressed() {
                    DisplayView::Timer
                } else {
                    DisplayView::Time
                };

                // The alternation runs only while its view is shown,
                // restarting on temperature at every entry; an
                // inactive-period timestamp must not shorten the first
                // phase.
                if view == DisplayView::TempHumidity {
                    if self.view != DisplayView::TempHumidity {
                        self.show_temperature = true;
                        self.last_reading_swap = now;
                    } else if now - self.last_reading_swap >= READING_SWAP_INTERVAL {
                        self.show_temperature = !self.show_temperature;
                        self.last_reading_swap = now;
                    }
                }
                self.view = view;
                if now - self.last_dot_toggle >= DOT_INTERVAL {
                    self.dot_on = !self.dot_on;
                    self.last_dot_toggle = now;
                }

                let frame = match self.view {
                    DisplayView::Time => clock.time_text(),
                    DisplayView::Date => clock.date_text(),
                    DisplayView::TempHumidity => {
                        if self.show_temperature {
                            clock.temperature_text()
                        } else {
                            clock.humidity_text()
                        }
                    }
                    DisplayView::Alarm => clock.alarm_text(),
                    DisplayView::Timer => clock.timer_text(),
                };
                display.print(&frame);
                display.set_dot(self.view == DisplayView::Time && self.dot_on);
            }
        }
    }

    fn enter_settings<I: InputPin>(&mut self, buttons: &mut Buttons<I>, now: Instant) {
        // Gestures latched in display mode must not fire as edits.
        buttons.drain_events();
        self.mode = Mode::Settings {
            field: SettingField::Time,
            entered_at: now,
            blink_on: false,
            last_blink: now,
        };
    }

    /// Exit always persists the current settings; a storage failure
    /// degrades to unsaved settings, never to a stalled loop.
    fn exit_settings<R, S, St>(&mut self, clock: &mut Clock<R, S>, store: &mut St)
    where
        R: Rtc,
        S: Sensor,
        St: SettingsStore,
    {
        let _ = clock.save_settings(store);
        self.mode = Mode::Display;
        self.view = DisplayView::Time;
    }
}
