//! Serial maintenance console.
//!
//! Line-oriented command interface on USART2: set the RTC from a host
//! machine, arm or disarm the alarm, and control the countdown timer
//! without touching the buttons. Commands and replies are defined by
//! [`clock_core::console`]; this module only moves bytes.
//!
//! # Design
//!
//! The UART runs in its own task so the control loop never blocks on
//! serial I/O. Completed lines travel to the control loop through
//! [`COMMANDS`] and replies travel back through [`REPLIES`]; the
//! control loop drains both queues once per iteration via [`service`],
//! which is where the command actually touches the clock.

use core::fmt::Write as _;

use embassy_futures::select::{select, Either};
use embassy_stm32::usart::BufferedUart;
use embassy_time::Instant;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embedded_io_async::{Read, Write};
use heapless::String;

use clock_core::console::{self, Response};
use clock_core::types::{Rtc, Sensor};
use clock_core::Clock;

/// Longest accepted command line, excluding the terminator.
const LINE_CAPACITY: usize = 64;

type Line = String<LINE_CAPACITY>;

/// Completed command lines, console task to control loop.
static COMMANDS: Channel<CriticalSectionRawMutex, Line, 2> = Channel::new();

/// Command replies, control loop to console task.
static REPLIES: Channel<CriticalSectionRawMutex, Response, 2> = Channel::new();

/// Executes every queued command against the clock.
///
/// Runs inside the control loop, never blocks. Replies that do not
/// fit the queue are dropped rather than stalling the loop.
pub fn service<R: Rtc, S: Sensor>(clock: &mut Clock<R, S>) {
    while let Ok(line) = COMMANDS.try_receive() {
        let reply = match console::parse(line.as_str()) {
            Ok(command) => console::execute(command, clock, Instant::now()),
            Err(error) => {
                let mut reply = Response::new();
                let _ = writeln!(reply, "error: {}", error);
                reply
            }
        };
        let _ = REPLIES.try_send(reply);
    }
}

/// Pumps bytes between the UART and the command/reply queues.
///
/// Lines terminate on CR or LF; empty lines are ignored. Input
/// overrunning [`LINE_CAPACITY`] is discarded up to the next
/// terminator and answered with an error.
#[embassy_executor::task]
pub async fn console_task(mut uart: BufferedUart<'static>) {
    let mut line = Line::new();
    let mut overflowed = false;
    let mut byte = [0u8; 1];

    loop {
        match select(uart.read(&mut byte), REPLIES.receive()).await {
            Either::First(Ok(1..)) => {
                let c = byte[0];
                if c == b'\r' || c == b'\n' {
                    if overflowed {
                        let mut reply = Response::new();
                        let _ = writeln!(reply, "error: line too long");
                        let _ = uart.write_all(reply.as_bytes()).await;
                    } else if !line.is_empty() {
                        // Queue full means the loop stopped draining;
                        // dropping the line is all that can be done.
                        let _ = COMMANDS.try_send(line.clone());
                    }
                    line.clear();
                    overflowed = false;
                } else if line.push(c as char).is_err() {
                    overflowed = true;
                }
            }
            Either::First(_) => {}
            Either::Second(reply) => {
                let _ = uart.write_all(reply.as_bytes()).await;
            }
        }
    }
}
