//! Debounced button with gesture classification.
//!
//! Converts a raw active-low input into three edge-triggered events:
//! press, single-press and long-press. A level change is accepted only
//! after it holds for the debounce window, so contact bounce never
//! reaches the gesture logic.
//!
//! # State Machine
//!
//! ```text
//!            level change        stable >= 50 ms
//!  Idle ──────────────────► DebounceWait ─────────► Pressed
//!                                                      │
//!                    released (50 ms, 3 s) ── single ──┤
//!                    held >= 3 s ──────────── long ────┘
//! ```
//!
//! Each event lands in a depth-1 slot and is consumed by its `take_*`
//! accessor, so one physical gesture is observed exactly once by
//! exactly one consumer. [`Button::is_pressed`] is the only
//! level-sensitive query and never clears anything.

use embassy_time::{Duration, Instant};
use embedded_hal::digital::InputPin;

/// A new level must persist this long before it is accepted.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(50);

/// Holding past this duration fires the long-press event.
pub const LONG_PRESS_HOLD: Duration = Duration::from_millis(3000);

/// Releases at or under this duration are treated as residual bounce.
const MIN_PRESS: Duration = Duration::from_millis(50);

/// Debounced button over an active-low input (external pull-up).
pub struct Button<I: InputPin> {
    pin: I,
    /// Raw level of the previous sample.
    last_raw: bool,
    /// Accepted (debounced) level.
    pressed: bool,
    /// Last raw level change, start of the debounce window.
    last_change: Instant,
    press_started: Instant,
    /// Long-press fires once per hold.
    long_fired: bool,
    pressed_event: bool,
    single_press_event: bool,
    long_press_event: bool,
}

impl<I: InputPin> Button<I> {
    pub fn new(pin: I) -> Self {
        Self {
            pin,
            last_raw: false,
            pressed: false,
            last_change: Instant::from_ticks(0),
            press_started: Instant::from_ticks(0),
            long_fired: false,
            pressed_event: false,
            single_press_event: false,
            long_press_event: false,
        }
    }

    /// Samples the input once and advances the debounce/gesture logic.
    ///
    /// Must be called at a fixed cadence shorter than the debounce
    /// window; the control loop iteration satisfies that.
    pub fn update(&mut self, now: Instant) {
        // An unreadable pin counts as released; the button cannot fail.
        let raw = matches!(self.pin.is_low(), Ok(true));

        if raw != self.last_raw {
            self.last_change = now;
        }

        if now - self.last_change >= DEBOUNCE_WINDOW && raw != self.pressed {
            self.pressed = raw;
            if raw {
                self.press_started = now;
                self.long_fired = false;
                self.pressed_event = true;
            } else {
                let held = now - self.press_started;
                if held > MIN_PRESS && held < LONG_PRESS_HOLD {
                    self.single_press_event = true;
                }
            }
        }

        if self.pressed && !self.long_fired && now - self.press_started >= LONG_PRESS_HOLD {
            self.long_fired = true;
            self.long_press_event = true;
        }

        self.last_raw = raw;
    }

    /// Live debounced level. Idempotent, clears nothing.
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// How long the button has been held, zero when released.
    pub fn press_duration(&self, now: Instant) -> Duration {
        if self.pressed {
            now - self.press_started
        } else {
            Duration::from_ticks(0)
        }
    }

    /// Consumes the press edge event.
    pub fn take_pressed(&mut self) -> bool {
        core::mem::take(&mut self.pressed_event)
    }

    /// Consumes the single-press edge event.
    pub fn take_single_press(&mut self) -> bool {
        core::mem::take(&mut self.single_press_event)
    }

    /// Consumes the long-press edge event.
    pub fn take_long_press(&mut self) -> bool {
        core::mem::take(&mut self.long_press_event)
    }

    /// Drops any latched events without reporting them.
    ///
    /// Used on mode transitions so gestures made in one mode cannot
    /// leak into the other.
    pub fn drain_events(&mut self) {
        self.pressed_event = false;
        self.single_press_event = false;
        self.long_press_event = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;

    /// Active-low input whose level the test flips from outside.
    #[derive(Clone)]
    struct FakePin(Rc<Cell<bool>>);

    impl FakePin {
        fn new() -> (Self, Rc<Cell<bool>>) {
            let level = Rc::new(Cell::new(false));
            (Self(level.clone()), level)
        }
    }

    impl ErrorType for FakePin {
        type Error = Infallible;
    }

    impl InputPin for FakePin {
        fn is_high(&mut self) -> Result<bool, Infallible> {
            Ok(!self.0.get())
        }

        fn is_low(&mut self) -> Result<bool, Infallible> {
            Ok(self.0.get())
        }
    }

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    /// Press at `from`, sampling every 10 ms until `to`.
    fn run(button: &mut Button<FakePin>, from: u64, to: u64) {
        let mut t = from;
        while t <= to {
            button.update(at(t));
            t += 10;
        }
    }

    #[test]
    fn short_glitch_is_filtered() {
        let (pin, level) = FakePin::new();
        let mut button = Button::new(pin);

        run(&mut button, 0, 100);
        level.set(true);
        button.update(at(110));
        level.set(false);
        run(&mut button, 120, 300);

        assert!(!button.is_pressed());
        assert!(!button.take_pressed());
        assert!(!button.take_single_press());
    }

    #[test]
    fn debounced_press_and_release_reports_single_press() {
        let (pin, level) = FakePin::new();
        let mut button = Button::new(pin);

        run(&mut button, 0, 100);
        level.set(true);
        run(&mut button, 110, 400);
        assert!(button.is_pressed());
        assert!(button.take_pressed());

        level.set(false);
        run(&mut button, 410, 600);
        assert!(!button.is_pressed());
        assert!(button.take_single_press());
        assert!(!button.take_long_press());
    }

    #[test]
    fn take_is_read_and_clear() {
        let (pin, level) = FakePin::new();
        let mut button = Button::new(pin);

        run(&mut button, 0, 100);
        level.set(true);
        run(&mut button, 110, 400);
        level.set(false);
        run(&mut button, 410, 600);

        assert!(button.take_single_press());
        assert!(!button.take_single_press());

        // Stays clear until the next qualifying gesture.
        run(&mut button, 610, 1000);
        assert!(!button.take_single_press());
    }

    #[test]
    fn long_hold_fires_long_press_once() {
        let (pin, level) = FakePin::new();
        let mut button = Button::new(pin);

        run(&mut button, 0, 100);
        level.set(true);
        run(&mut button, 110, 5000);

        assert!(button.take_long_press());
        assert!(!button.take_long_press());

        // Releasing after a long hold is not a single press.
        level.set(false);
        run(&mut button, 5010, 5200);
        assert!(!button.take_single_press());
        assert!(!button.take_long_press());
    }

    #[test]
    fn separate_slots_clear_independently() {
        let (pin, level) = FakePin::new();
        let mut button = Button::new(pin);

        run(&mut button, 0, 100);
        level.set(true);
        run(&mut button, 110, 400);
        level.set(false);
        run(&mut button, 410, 600);

        // Consuming the press edge leaves the single-press latched.
        assert!(button.take_pressed());
        assert!(button.take_single_press());
    }

    #[test]
    fn press_duration_tracks_hold() {
        let (pin, level) = FakePin::new();
        let mut button = Button::new(pin);

        run(&mut button, 0, 100);
        level.set(true);
        run(&mut button, 110, 500);

        assert!(button.press_duration(at(500)) >= Duration::from_millis(300));
        level.set(false);
        run(&mut button, 510, 700);
        assert_eq!(button.press_duration(at(700)), Duration::from_ticks(0));
    }
}
