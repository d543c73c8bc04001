//! DHT11 temperature/humidity sensor driver.
//!
//! Single-wire bit-banged protocol on one GPIO. A read is requested
//! by holding the line low for 18 ms; the sensor answers with a
//! response pulse and 40 data bits, where the high-pulse width
//! encodes the bit value (roughly 27 us for 0, 70 us for 1).
//!
//! # Hardware Design
//!
//! - DHT11 data line on PA6 with an external 5.1 kΩ pull-up
//! - Open-drain style signalling: the pin switches between push-pull
//!   output for the start pulse and pulled-up input for the reply
//!
//! # Failure Masking
//!
//! The sensor needs at least 2 seconds between reads and its frames
//! occasionally fail the checksum. Reads are throttled to that
//! interval and a failed frame keeps the previous values, so callers
//! always get a plausible reading.

use embassy_stm32::gpio::{Flex, Pull, Speed};
use embassy_time::{block_for, Duration, Instant};

use clock_core::types::Sensor;

/// Minimum spacing between sensor transactions.
const READ_INTERVAL: Duration = Duration::from_secs(2);

/// Start-signal low time requested from the host.
const START_PULSE: Duration = Duration::from_millis(18);

/// High pulses longer than this decode as a 1 bit.
const ONE_THRESHOLD: Duration = Duration::from_micros(49);

/// Per-edge timeout while receiving the reply.
const EDGE_TIMEOUT: Duration = Duration::from_micros(200);

/// DHT11 driver with read throttling and last-known-good masking.
pub struct Dht11 {
    pin: Flex<'static>,
    last_attempt: Option<Instant>,
    temperature: i8,
    humidity: i8,
}

impl Dht11 {
    /// Wraps the data line, idle high until the first read.
    ///
    /// # Arguments
    ///
    /// * `pin` - Data GPIO shared for both directions
    pub fn new(mut pin: Flex<'static>) -> Self {
        pin.set_as_input(Pull::Up);
        Self {
            pin,
            last_attempt: None,
            temperature: 0,
            humidity: 0,
        }
    }

    /// Runs a transaction if the read interval has elapsed.
    fn refresh(&mut self) {
        let now = Instant::now();
        if let Some(last) = self.last_attempt {
            if now - last < READ_INTERVAL {
                return;
            }
        }
        // A failed attempt still counts against the interval, the
        // sensor needs the recovery time either way.
        self.last_attempt = Some(now);

        if let Some(frame) = self.read_frame() {
            self.humidity = frame[0] as i8;
            self.temperature = frame[2] as i8;
        }
    }

    /// One full transaction: start pulse, response, 40 data bits.
    ///
    /// Returns the four payload bytes (integral/decimal humidity,
    /// integral/decimal temperature) after checksum verification.
    fn read_frame(&mut self) -> Option<[u8; 4]> {
        self.pin.set_as_output(Speed::Low);
        self.pin.set_low();
        block_for(START_PULSE);
        self.pin.set_as_input(Pull::Up);

        // Response: ~80 us low, ~80 us high, then the first bit.
        self.wait_for(false)?;
        self.wait_for(true)?;
        self.wait_for(false)?;

        let mut bytes = [0u8; 5];
        for bit in 0..40 {
            let high_at = self.wait_for(true)?;
            let low_at = self.wait_for(false)?;
            if low_at - high_at > ONE_THRESHOLD {
                bytes[bit / 8] |= 0x80 >> (bit % 8);
            }
        }

        let sum = bytes[0]
            .wrapping_add(bytes[1])
            .wrapping_add(bytes[2])
            .wrapping_add(bytes[3]);
        if sum != bytes[4] {
            return None;
        }
        Some([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// Busy-waits for the line to reach `level`, returning when it
    /// did, or `None` on timeout.
    fn wait_for(&mut self, level: bool) -> Option<Instant> {
        let deadline = Instant::now() + EDGE_TIMEOUT;
        loop {
            let now = Instant::now();
            if self.pin.is_high() == level {
                return Some(now);
            }
            if now > deadline {
                return None;
            }
        }
    }
}

impl Sensor for Dht11 {
    fn temperature(&mut self) -> i8 {
        self.refresh();
        self.temperature
    }

    fn humidity(&mut self) -> i8 {
        self.refresh();
        self.humidity
    }
}
