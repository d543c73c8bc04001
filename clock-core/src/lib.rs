//! Core logic of a bedside digital clock appliance.
//!
//! # Overview
//!
//! The appliance keeps wall-clock time, one daily alarm and one
//! countdown timer, renders everything on a 6-digit multiplexed
//! seven-segment display and is operated through four buttons. This
//! crate holds all of the state-transition logic and the display
//! driver; the hardware it runs on is abstracted behind `embedded-hal`
//! pin/delay traits, an `embedded-storage` flash trait and the
//! collaborator traits in [`types`], so everything here builds and
//! tests on the host.
//!
//! # Control Flow
//!
//! One cooperative loop iteration, in order: buttons are sampled, the
//! mode controller consumes edge events and picks what to render, the
//! clock domain advances by elapsed time, and the display performs one
//! hardware scan. Later stages read state the earlier ones mutate, so
//! the order is part of the contract.
//!
//! # Module Organization
//!
//! - [`button`] - debounce and press/single-press/long-press gestures
//! - [`alarm`] - daily alarm state machine
//! - [`timer`] - countdown timer state machine
//! - [`clock`] - orchestrator over alarm, timer, RTC and sensor
//! - [`display`] - multiplexed seven-segment driver
//! - [`mode`] - display-mode / settings-mode state machine
//! - [`storage`] - persisted settings codec and flash store
//! - [`console`] - serial command parsing and execution
//! - [`types`] - shared value types and collaborator traits

#![cfg_attr(not(test), no_std)]

pub mod alarm;
pub mod button;
pub mod clock;
pub mod console;
pub mod display;
pub mod mode;
pub mod storage;
pub mod timer;
pub mod types;

pub use alarm::{Alarm, AlarmSetting};
pub use button::Button;
pub use clock::{Adjustment, Clock};
pub use display::SegmentDisplay;
pub use mode::{Buttons, DisplayView, ModeController, SettingField};
pub use storage::{FlashSettingsStore, PersistedSettings, SettingsStore};
pub use timer::Timer;
pub use types::{Buzzer, Date, Rtc, Sensor, Time};
