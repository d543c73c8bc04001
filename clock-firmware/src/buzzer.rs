//! Alarm buzzer pattern driver.
//!
//! Drives an active buzzer (on-board oscillator, DC input) through a
//! single GPIO. The alert is not a steady tone but a repeating
//! triple-beep: within each 1.2 second cycle the buzzer is on for
//! 0-200 ms, 300-500 ms and 600-800 ms, and silent for the rest.
//!
//! # Hardware Design
//!
//! - Active buzzer driven through an NPN transistor on PA7
//! - GPIO high = buzzer sounding
//!
//! The driver is commanded through the [`Buzzer`] trait by the clock
//! core and stepped once per control-loop iteration by [`update`].
//!
//! [`update`]: PatternBuzzer::update

use embassy_stm32::gpio::Output;
use embassy_time::Instant;

use clock_core::types::Buzzer;

/// Length of one beep pattern cycle in milliseconds.
const PATTERN_CYCLE_MS: u64 = 1200;

/// On/off windows within one cycle, as (start, end) milliseconds.
const BEEP_WINDOWS: [(u64, u64); 3] = [(0, 200), (300, 500), (600, 800)];

/// Active buzzer with a gated beep pattern.
pub struct PatternBuzzer {
    /// Buzzer drive GPIO (high = sounding).
    pin: Output<'static>,
    /// Start of the current pattern, `None` while silenced.
    started: Option<Instant>,
    /// Whether the alert has been commanded on.
    active: bool,
}

impl PatternBuzzer {
    /// Creates the driver with the buzzer silenced.
    ///
    /// # Arguments
    ///
    /// * `pin` - Buzzer drive GPIO, initialized low
    pub fn new(pin: Output<'static>) -> Self {
        Self {
            pin,
            started: None,
            active: false,
        }
    }

    /// Advances the beep pattern by one control-loop iteration.
    ///
    /// The pattern phase is derived from the time since `play_alarm`
    /// took effect, so the cadence stays correct however often this
    /// runs.
    pub fn update(&mut self, now: Instant) {
        if !self.active {
            self.pin.set_low();
            return;
        }

        let started = *self.started.get_or_insert(now);
        let phase = (now - started).as_millis() % PATTERN_CYCLE_MS;
        let sounding = BEEP_WINDOWS
            .iter()
            .any(|&(start, end)| phase >= start && phase < end);

        if sounding {
            self.pin.set_high();
        } else {
            self.pin.set_low();
        }
    }
}

impl Buzzer for PatternBuzzer {
    /// Starts the beep pattern from its first beep.
    fn play_alarm(&mut self) {
        if !self.active {
            self.active = true;
            self.started = None;
        }
    }

    /// Silences the buzzer immediately.
    fn stop_alarm(&mut self) {
        self.active = false;
        self.started = None;
        self.pin.set_low();
    }
}
