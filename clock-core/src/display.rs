//! Multiplexed 6-digit seven-segment display driver.
//!
//! # Hardware Design
//!
//! Six common-cathode digits share one set of segment drivers. A
//! 2-wire shift register (data + clock) carries the 8-bit segment
//! pattern, and four BCD address lines select which digit sinks
//! current. [`SegmentDisplay::update`] performs one full scan: it
//! walks the digits right to left, latches each pattern and holds it
//! briefly before advancing. The hold is a blocking delay, and six of
//! them bound how fast the surrounding control loop can run.
//!
//! Rendering is stateless per position: the scan re-emits whatever is
//! buffered, so callers re-set all six cells every cycle they want
//! content shown. Unsupported characters render blank, never an error.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

/// Number of digit positions.
pub const DIGITS: usize = 6;

/// Per-digit hold during one scan pass, in milliseconds.
pub const SCAN_HOLD_MS: u32 = 2;

/// Segment bit for the decimal point.
const DP_BIT: u8 = 0b1000_0000;

/// Segment patterns for 0-9 plus a few specials (degree at 10, 'C' at
/// 11, blank at 12, 'H' at 13). Bit 0 is segment a.
const DIGIT_PATTERNS: [u8; 14] = [
    0b00111111, // 0
    0b00000110, // 1
    0b01011011, // 2
    0b01001111, // 3
    0b01100110, // 4
    0b01101101, // 5
    0b01111101, // 6
    0b00100111, // 7
    0b01111111, // 8
    0b01101111, // 9
    0b01100011, // degree
    0b00111001, // C
    0b00000000, // blank
    0b01110110, // H
];

/// Segment patterns for A-Z; unsupported letters are zero and render
/// blank.
const LETTER_PATTERNS: [u8; 26] = [
    0b11101110, // A
    0b00111110, // b
    0b00111001, // C
    0b01111010, // d
    0b10011110, // E
    0b10001110, // F
    0b10111100, // G
    0b01110110, // H
    0b01100000, // I
    0b01110000, // J
    0b00000000, // K (not supported)
    0b00011100, // L
    0b00000000, // M (not supported)
    0b00101010, // n
    0b11111100, // O
    0b11001110, // P
    0b00000000, // Q (not supported)
    0b11001110, // R
    0b10110110, // S
    0b00000000, // T (not supported)
    0b01111100, // U
    0b00000000, // V (not supported)
    0b00000000, // W (not supported)
    0b00000000, // X (not supported)
    0b01100110, // Y
    0b11011010, // Z
];

/// Maps an ASCII character to its segment pattern.
pub fn glyph(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => DIGIT_PATTERNS[(c - b'0') as usize],
        b'*' => DIGIT_PATTERNS[10],
        b' ' => DIGIT_PATTERNS[12],
        b'A'..=b'Z' => LETTER_PATTERNS[(c - b'A') as usize],
        b'a'..=b'z' => LETTER_PATTERNS[(c - b'a') as usize],
        _ => DIGIT_PATTERNS[12],
    }
}

/// The multiplexed display.
///
/// Owns the four BCD digit-select lines and the shift-register pins.
/// Pin failures are swallowed; the display degrades to garbage pixels
/// rather than stalling the appliance.
pub struct SegmentDisplay<P: OutputPin, D: DelayNs> {
    /// BCD digit-select lines, least-significant bit first.
    select: [P; 4],
    /// Shift-register serial data line.
    data: P,
    /// Shift-register clock line.
    clock: P,
    delay: D,
    cells: [u8; DIGITS],
    dot: bool,
}

impl<P: OutputPin, D: DelayNs> SegmentDisplay<P, D> {
    pub fn new(mut select: [P; 4], mut data: P, mut clock: P, delay: D) -> Self {
        for pin in &mut select {
            drive(pin, false);
        }
        drive(&mut data, false);
        drive(&mut clock, false);
        Self {
            select,
            data,
            clock,
            delay,
            cells: [b' '; DIGITS],
            dot: false,
        }
    }

    /// Buffers a full 6-character frame, leftmost character first.
    pub fn print(&mut self, text: &[u8; DIGITS]) {
        self.cells = *text;
    }

    /// Buffers one character; out-of-range positions are ignored.
    pub fn set_cell(&mut self, position: usize, c: u8) {
        if let Some(cell) = self.cells.get_mut(position) {
            *cell = c;
        }
    }

    /// Decimal points light on the two colon positions while set.
    pub fn set_dot(&mut self, on: bool) {
        self.dot = on;
    }

    /// Blanks the frame and the dots.
    pub fn clear(&mut self) {
        self.cells = [b' '; DIGITS];
        self.dot = false;
    }

    pub fn cells(&self) -> &[u8; DIGITS] {
        &self.cells
    }

    pub fn dot(&self) -> bool {
        self.dot
    }

    /// One hardware scan pass over all six digits, rightmost first.
    pub fn update(&mut self) {
        for position in (0..DIGITS).rev() {
            // The BCD address counts from 1 at the rightmost digit.
            let address = (DIGITS - position) as u8;
            for bit in 0..4 {
                drive(&mut self.select[bit], address & (1 << bit) != 0);
            }

            let mut pattern = glyph(self.cells[position]);
            // Dots sit on digits 2 and 4, the colon positions of HHMMSS.
            if self.dot && (position == 1 || position == 3) {
                pattern |= DP_BIT;
            }
            self.shift_out(pattern);
            self.delay.delay_ms(SCAN_HOLD_MS);
        }
    }

    /// Clocks one pattern into the shift register, MSB first.
    fn shift_out(&mut self, pattern: u8) {
        for bit in (0..8).rev() {
            drive(&mut self.data, pattern & (1 << bit) != 0);
            drive(&mut self.clock, true);
            drive(&mut self.clock, false);
        }
    }
}

fn drive<P: OutputPin>(pin: &mut P, high: bool) {
    let _ = if high { pin.set_high() } else { pin.set_low() };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::vec::Vec;

    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;

    /// Records every level change into a shared trace so tests can
    /// reconstruct the scan sequence.
    #[derive(Clone)]
    struct TracePin {
        id: &'static str,
        level: Rc<RefCell<bool>>,
        trace: Rc<RefCell<Vec<(&'static str, bool)>>>,
    }

    impl TracePin {
        fn new(id: &'static str, trace: &Rc<RefCell<Vec<(&'static str, bool)>>>) -> Self {
            Self {
                id,
                level: Rc::new(RefCell::new(false)),
                trace: trace.clone(),
            }
        }
    }

    impl ErrorType for TracePin {
        type Error = Infallible;
    }

    impl OutputPin for TracePin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            *self.level.borrow_mut() = false;
            self.trace.borrow_mut().push((self.id, false));
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            *self.level.borrow_mut() = true;
            self.trace.borrow_mut().push((self.id, true));
            Ok(())
        }
    }

    struct CountingDelay {
        total_ms: Rc<RefCell<u32>>,
    }

    impl DelayNs for CountingDelay {
        fn delay_ns(&mut self, ns: u32) {
            *self.total_ms.borrow_mut() += ns / 1_000_000;
        }
    }

    fn build() -> (
        SegmentDisplay<TracePin, CountingDelay>,
        Rc<RefCell<Vec<(&'static str, bool)>>>,
        Rc<RefCell<u32>>,
    ) {
        let trace = Rc::new(RefCell::new(Vec::new()));
        let total_ms = Rc::new(RefCell::new(0));
        let display = SegmentDisplay::new(
            [
                TracePin::new("s0", &trace),
                TracePin::new("s1", &trace),
                TracePin::new("s2", &trace),
                TracePin::new("s3", &trace),
            ],
            TracePin::new("data", &trace),
            TracePin::new("clk", &trace),
            CountingDelay {
                total_ms: total_ms.clone(),
            },
        );
        (display, trace, total_ms)
    }

    /// Reconstructs the bytes shifted out during a trace, in order.
    fn shifted_bytes(trace: &[(&'static str, bool)]) -> Vec<u8> {
        let mut bytes = Vec::new();
        let mut current = 0u8;
        let mut bits = 0;
        let mut data = false;
        for &(id, level) in trace {
            match id {
                "data" => data = level,
                "clk" if level => {
                    current = (current << 1) | data as u8;
                    bits += 1;
                    if bits == 8 {
                        bytes.push(current);
                        current = 0;
                        bits = 0;
                    }
                }
                _ => {}
            }
        }
        bytes
    }

    #[test]
    fn digit_glyphs_match_the_segment_table() {
        assert_eq!(glyph(b'0'), 0b00111111);
        assert_eq!(glyph(b'8'), 0b01111111);
        assert_eq!(glyph(b'*'), 0b01100011);
        assert_eq!(glyph(b'C'), 0b00111001);
        assert_eq!(glyph(b'c'), glyph(b'C'));
    }

    #[test]
    fn unsupported_characters_render_blank() {
        assert_eq!(glyph(b'?'), 0);
        assert_eq!(glyph(b'M'), 0);
        assert_eq!(glyph(0xFE), 0);
        assert_eq!(glyph(b' '), 0);
    }

    #[test]
    fn scan_emits_six_patterns_rightmost_first() {
        let (mut display, trace, _) = build();
        display.print(b"123456");
        trace.borrow_mut().clear();
        display.update();

        let bytes = shifted_bytes(&trace.borrow());
        assert_eq!(
            bytes,
            std::vec![
                glyph(b'6'),
                glyph(b'5'),
                glyph(b'4'),
                glyph(b'3'),
                glyph(b'2'),
                glyph(b'1'),
            ]
        );
    }

    #[test]
    fn dot_lights_only_the_colon_positions() {
        let (mut display, trace, _) = build();
        display.print(b"123456");
        display.set_dot(true);
        trace.borrow_mut().clear();
        display.update();

        let bytes = shifted_bytes(&trace.borrow());
        // Scan order is digit 6..1, so positions 3 and 1 are the 3rd
        // and 5th bytes out.
        assert_eq!(bytes[2], glyph(b'4') | 0b1000_0000);
        assert_eq!(bytes[4], glyph(b'2') | 0b1000_0000);
        assert_eq!(bytes[0], glyph(b'6'));
        assert_eq!(bytes[5], glyph(b'1'));
    }

    #[test]
    fn select_lines_address_each_digit() {
        let (mut display, trace, _) = build();
        display.print(b"      ");
        trace.borrow_mut().clear();
        display.update();

        // Collect the select-line state at each clock byte boundary.
        let mut addresses = Vec::new();
        let mut select = [false; 4];
        let mut clocked = 0;
        for &(id, level) in trace.borrow().iter() {
            match id {
                "s0" => select[0] = level,
                "s1" => select[1] = level,
                "s2" => select[2] = level,
                "s3" => select[3] = level,
                "clk" if level => {
                    clocked += 1;
                    if clocked % 8 == 1 {
                        let addr = select
                            .iter()
                            .enumerate()
                            .fold(0u8, |a, (i, &b)| a | ((b as u8) << i));
                        addresses.push(addr);
                    }
                }
                _ => {}
            }
        }
        assert_eq!(addresses, std::vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn scan_holds_each_digit_for_the_fixed_time() {
        let (mut display, _, total_ms) = build();
        display.update();
        assert_eq!(*total_ms.borrow(), DIGITS as u32 * SCAN_HOLD_MS);
    }

    #[test]
    fn clear_blanks_cells_and_dot() {
        let (mut display, _, _) = build();
        display.print(b"888888");
        display.set_dot(true);
        display.clear();
        assert_eq!(display.cells(), b"      ");
        assert!(!display.dot());
    }

    #[test]
    fn out_of_range_cell_write_is_ignored() {
        let (mut display, _, _) = build();
        display.set_cell(3, b'7');
        display.set_cell(9, b'9');
        assert_eq!(display.cells(), b"   7  ");
    }
}
