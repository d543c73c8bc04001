//! Countdown timer: `Idle → Running → (Completed | Idle)`.
//!
//! Counts down in whole seconds, self-paced by a stored last-tick
//! instant so the decrement rate is one per elapsed real second no
//! matter how often `update` is called. Timer state is never
//! persisted; the appliance always boots with an idle, zeroed timer.

use embassy_time::{Duration, Instant};

const TICK: Duration = Duration::from_secs(1);

pub struct Timer {
    hour: u8,
    minute: u8,
    second: u8,
    running: bool,
    completed: bool,
    last_tick: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            hour: 0,
            minute: 0,
            second: 0,
            running: false,
            completed: false,
            last_tick: Instant::from_ticks(0),
        }
    }

    /// Starts the countdown. A zero duration or an already-completed
    /// timer makes this a no-op.
    pub fn start(&mut self, now: Instant) {
        if !self.completed && (self.hour > 0 || self.minute > 0 || self.second > 0) {
            self.running = true;
            self.last_tick = now;
        }
    }

    /// Pauses without resetting the remaining duration.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Clears to Idle/zero regardless of current state.
    pub fn reset(&mut self, now: Instant) {
        self.running = false;
        self.completed = false;
        self.hour = 0;
        self.minute = 0;
        self.second = 0;
        self.last_tick = now;
    }

    /// Reconfigures the duration and clears any prior completion.
    pub fn set_time(&mut self, hour: u8, minute: u8, second: u8) {
        self.hour = hour;
        self.minute = minute;
        self.second = second;
        self.completed = false;
    }

    /// Advances the countdown by one second once a second has elapsed.
    pub fn update(&mut self, now: Instant) {
        if !self.running || self.completed {
            return;
        }

        if now - self.last_tick >= TICK {
            // Borrow-chain subtraction: second -> minute -> hour.
            if self.second > 0 {
                self.second -= 1;
            } else if self.minute > 0 {
                self.minute -= 1;
                self.second = 59;
            } else if self.hour > 0 {
                self.hour -= 1;
                self.minute = 59;
                self.second = 59;
            }

            if self.hour == 0 && self.minute == 0 && self.second == 0 {
                self.completed = true;
                self.running = false;
            }

            self.last_tick = now;
        }
    }

    pub fn adjust_hour(&mut self) {
        self.hour = (self.hour + 1) % 24;
    }

    pub fn adjust_minute(&mut self) {
        self.minute = (self.minute + 1) % 60;
    }

    pub fn adjust_second(&mut self) {
        self.second = (self.second + 1) % 60;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Remaining duration as (hour, minute, second).
    pub fn remaining(&self) -> (u8, u8, u8) {
        (self.hour, self.minute, self.second)
    }

    /// Remaining duration as a display frame, `HHMMSS`.
    pub fn text(&self) -> [u8; 6] {
        [
            b'0' + self.hour / 10,
            b'0' + self.hour % 10,
            b'0' + self.minute / 10,
            b'0' + self.minute % 10,
            b'0' + self.second / 10,
            b'0' + self.second % 10,
        ]
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
