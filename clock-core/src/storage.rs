//! Persisted settings: codec, validation and the flash-backed store.
//!
//! The durable payload is the wall-clock time, the date and the alarm
//! configuration, never the timer, which always boots idle. A record
//! is a fixed 16-byte block: a magic word, the little-endian fields
//! and padding. Corrupt or unrecognized records are discarded
//! wholesale at load time; a half-applied settings block must be
//! impossible.

use embedded_storage::nor_flash::NorFlash;

use crate::alarm::AlarmSetting;
use crate::types::{Date, Time};

/// Marks a record written by this firmware.
pub const SETTINGS_MAGIC: u16 = 0x1234;

/// On-flash record size. Covers the write granularity of the supported
/// parts; must not exceed one erase unit.
pub const RECORD_LEN: usize = 16;

/// The durable subset of the appliance state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PersistedSettings {
    pub time: Time,
    pub date: Date,
    pub alarm: AlarmSetting,
}

impl PersistedSettings {
    /// Structural validity: every field in range. A record failing this
    /// check is treated as stale garbage, not partially applied.
    pub fn is_valid(&self) -> bool {
        self.time.is_valid() && self.date.is_valid() && self.alarm.is_valid()
    }

    pub fn encode(&self) -> [u8; RECORD_LEN] {
        let mut raw = [0xFF; RECORD_LEN];
        raw[0..2].copy_from_slice(&SETTINGS_MAGIC.to_le_bytes());
        raw[2] = self.time.hour;
        raw[3] = self.time.minute;
        raw[4] = self.time.second;
        raw[5] = self.date.day;
        raw[6] = self.date.month;
        raw[7..9].copy_from_slice(&self.date.year.to_le_bytes());
        raw[9] = self.alarm.hour;
        raw[10] = self.alarm.minute;
        raw[11] = self.alarm.enabled as u8;
        raw
    }

    /// Decodes a record, returning `None` for a missing magic word, an
    /// out-of-range field or a mangled flag byte.
    pub fn decode(raw: &[u8; RECORD_LEN]) -> Option<Self> {
        if u16::from_le_bytes([raw[0], raw[1]]) != SETTINGS_MAGIC {
            return None;
        }
        let enabled = match raw[11] {
            0 => false,
            1 => true,
            _ => return None,
        };
        let settings = Self {
            time: Time::new(raw[2], raw[3], raw[4]),
            date: Date::new(raw[5], raw[6], u16::from_le_bytes([raw[7], raw[8]])),
            alarm: AlarmSetting {
                hour: raw[9],
                minute: raw[10],
                enabled,
            },
        };
        settings.is_valid().then_some(settings)
    }
}

/// Durable settings storage.
///
/// `load` yields `Ok(None)` for an empty or corrupt store; only a
/// transport-level failure is an error.
pub trait SettingsStore {
    type Error;

    fn save(&mut self, settings: &PersistedSettings) -> Result<(), Self::Error>;
    fn load(&mut self) -> Result<Option<PersistedSettings>, Self::Error>;
}

/// Settings store over a NOR-flash region.
///
/// `offset` must be aligned to the part's erase unit; the record lives
/// at the start of that unit and the rest of it is left erased.
pub struct FlashSettingsStore<F: NorFlash> {
    flash: F,
    offset: u32,
}

impl<F: NorFlash> FlashSettingsStore<F> {
    pub fn new(flash: F, offset: u32) -> Self {
        Self { flash, offset }
    }
}

impl<F: NorFlash> SettingsStore for FlashSettingsStore<F> {
    type Error = F::Error;

    fn save(&mut self, settings: &PersistedSettings) -> Result<(), Self::Error> {
        self.flash
            .erase(self.offset, self.offset + F::ERASE_SIZE as u32)?;
        self.flash.write(self.offset, &settings.encode())
    }

    fn load(&mut self) -> Result<Option<PersistedSettings>, Self::Error> {
        let mut raw = [0u8; RECORD_LEN];
        self.flash.read(self.offset, &mut raw)?;
        Ok(PersistedSettings::decode(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_storage::nor_flash::{
        ErrorType, NorFlashErrorKind, ReadNorFlash,
    };

    /// 256-byte RAM-backed flash with 64-byte erase units.
    struct MemFlash {
        data: [u8; 256],
    }

    impl MemFlash {
        fn new() -> Self {
            Self { data: [0xFF; 256] }
        }
    }

    impl ErrorType for MemFlash {
        type Error = NorFlashErrorKind;
    }

    impl ReadNorFlash for MemFlash {
        const READ_SIZE: usize = 1;

        fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
            let offset = offset as usize;
            if offset + bytes.len() > self.data.len() {
                return Err(NorFlashErrorKind::OutOfBounds);
            }
            bytes.copy_from_slice(&self.data[offset..offset + bytes.len()]);
            Ok(())
        }

        fn capacity(&self) -> usize {
            self.data.len()
        }
    }

    impl NorFlash for MemFlash {
        const WRITE_SIZE: usize = 1;
        const ERASE_SIZE: usize = 64;

        fn erase(&mut self, from: u32, to: u32) -> Result<(), Self::Error> {
            if from % 64 != 0 || to % 64 != 0 || to as usize > self.data.len() {
                return Err(NorFlashErrorKind::NotAligned);
            }
            self.data[from as usize..to as usize].fill(0xFF);
            Ok(())
        }

        fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
            let offset = offset as usize;
            if offset + bytes.len() > self.data.len() {
                return Err(NorFlashErrorKind::OutOfBounds);
            }
            self.data[offset..offset + bytes.len()].copy_from_slice(bytes);
            Ok(())
        }
    }

    fn sample() -> PersistedSettings {
        PersistedSettings {
            time: Time::new(13, 37, 42),
            date: Date::new(25, 12, 2024),
            alarm: AlarmSetting {
                hour: 6,
                minute: 30,
                enabled: true,
            },
        }
    }

    #[test]
    fn save_then_load_round_trips_exactly() {
        let mut store = FlashSettingsStore::new(MemFlash::new(), 64);
        store.save(&sample()).unwrap();
        assert_eq!(store.load().unwrap(), Some(sample()));
    }

    #[test]
    fn empty_flash_loads_nothing() {
        let mut store = FlashSettingsStore::new(MemFlash::new(), 0);
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn corrupt_field_rejects_whole_record() {
        let mut flash = MemFlash::new();
        let mut raw = sample().encode();
        raw[2] = 77; // hour out of range
        flash.write(0, &raw).unwrap();

        let mut store = FlashSettingsStore::new(flash, 0);
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn wrong_magic_rejects_record() {
        let mut flash = MemFlash::new();
        let mut raw = sample().encode();
        raw[0] = 0x00;
        flash.write(0, &raw).unwrap();

        let mut store = FlashSettingsStore::new(flash, 0);
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn mangled_enable_flag_rejects_record() {
        let mut raw = sample().encode();
        raw[11] = 0xA5;
        assert_eq!(PersistedSettings::decode(&raw), None);
    }

    #[test]
    fn saving_twice_keeps_latest() {
        let mut store = FlashSettingsStore::new(MemFlash::new(), 0);
        store.save(&sample()).unwrap();

        let mut second = sample();
        second.alarm.enabled = false;
        second.time = Time::new(0, 0, 1);
        store.save(&second).unwrap();

        assert_eq!(store.load().unwrap(), Some(second));
    }
}
