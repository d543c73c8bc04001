//! Serial console commands.
//!
//! One command per line: `TIME HHMM`, `DATE DDMMYYYY`,
//! `ALARM ON|OFF|SET HHMM`, `TIMER START|STOP|RESET|SET HHMMSS`,
//! `STATUS`, `HELP`. Parsing is separated from execution so the
//! firmware's UART task can parse off the control loop and hand the
//! command over for execution against the clock.

use core::fmt::{self, Write};

use embassy_time::Instant;
use heapless::String;

use crate::clock::Clock;
use crate::types::{Date, Rtc, Sensor, Time};

/// Upper bound for a formatted console reply; HELP is the longest.
pub const RESPONSE_CAPACITY: usize = 512;

pub type Response = String<RESPONSE_CAPACITY>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SetTime { hour: u8, minute: u8 },
    SetDate { day: u8, month: u8, year: u16 },
    Alarm(AlarmCommand),
    Timer(TimerCommand),
    Status,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmCommand {
    On,
    Off,
    Set { hour: u8, minute: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    Start,
    Stop,
    Reset,
    Set { hour: u8, minute: u8, second: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    Empty,
    UnknownCommand,
    MissingArgument,
    /// Argument malformed or out of range.
    BadArgument,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Empty => write!(f, "empty command"),
            ParseError::UnknownCommand => {
                write!(f, "unknown command, type 'help' for available commands")
            }
            ParseError::MissingArgument => write!(f, "missing argument"),
            ParseError::BadArgument => write!(f, "invalid argument"),
        }
    }
}

/// Parses one console line.
pub fn parse(line: &str) -> Result<Command, ParseError> {
    let mut words = line.split_whitespace();
    let keyword = words.next().ok_or(ParseError::Empty)?;
    let argument = words.next();

    if keyword.eq_ignore_ascii_case("time") || keyword.eq_ignore_ascii_case("settime") {
        let arg = argument.ok_or(ParseError::MissingArgument)?;
        let (hour, minute) = parse_hhmm(arg)?;
        Ok(Command::SetTime { hour, minute })
    } else if keyword.eq_ignore_ascii_case("date") || keyword.eq_ignore_ascii_case("setdate") {
        let arg = argument.ok_or(ParseError::MissingArgument)?;
        let (day, month, year) = parse_ddmmyyyy(arg)?;
        Ok(Command::SetDate { day, month, year })
    } else if keyword.eq_ignore_ascii_case("alarm") {
        parse_alarm(argument, words.next())
    } else if keyword.eq_ignore_ascii_case("timer") {
        parse_timer(argument, words.next())
    } else if keyword.eq_ignore_ascii_case("status") || keyword.eq_ignore_ascii_case("info") {
        Ok(Command::Status)
    } else if keyword.eq_ignore_ascii_case("help") || keyword == "?" {
        Ok(Command::Help)
    } else {
        Err(ParseError::UnknownCommand)
    }
}

fn parse_alarm(action: Option<&str>, argument: Option<&str>) -> Result<Command, ParseError> {
    let action = action.ok_or(ParseError::MissingArgument)?;
    if action.eq_ignore_ascii_case("on") {
        Ok(Command::Alarm(AlarmCommand::On))
    } else if action.eq_ignore_ascii_case("off") {
        Ok(Command::Alarm(AlarmCommand::Off))
    } else if action.eq_ignore_ascii_case("set") {
        let arg = argument.ok_or(ParseError::MissingArgument)?;
        let (hour, minute) = parse_hhmm(arg)?;
        Ok(Command::Alarm(AlarmCommand::Set { hour, minute }))
    } else {
        Err(ParseError::BadArgument)
    }
}

fn parse_timer(action: Option<&str>, argument: Option<&str>) -> Result<Command, ParseError> {
    let action = action.ok_or(ParseError::MissingArgument)?;
    if action.eq_ignore_ascii_case("start") {
        Ok(Command::Timer(TimerCommand::Start))
    } else if action.eq_ignore_ascii_case("stop") {
        Ok(Command::Timer(TimerCommand::Stop))
    } else if action.eq_ignore_ascii_case("reset") {
        Ok(Command::Timer(TimerCommand::Reset))
    } else if action.eq_ignore_ascii_case("set") {
        let arg = argument.ok_or(ParseError::MissingArgument)?;
        let (hour, minute, second) = parse_hhmmss(arg)?;
        Ok(Command::Timer(TimerCommand::Set {
            hour,
            minute,
            second,
        }))
    } else {
        Err(ParseError::BadArgument)
    }
}

/// Runs a parsed command against the clock and formats the reply.
///
/// `now` paces the timer commands; it is whatever instant the caller's
/// control loop is on.
pub fn execute<R: Rtc, S: Sensor>(
    command: Command,
    clock: &mut Clock<R, S>,
    now: Instant,
) -> Response {
    let mut out = Response::new();
    // Capacity is sized for the longest reply; a truncated line is
    // still preferable to dropping the reply entirely.
    let _ = match command {
        Command::SetTime { hour, minute } => {
            clock.set_time(Time::new(hour, minute, 0));
            writeln!(out, "time set to {:02}:{:02}:00", hour, minute)
        }
        Command::SetDate { day, month, year } => {
            clock.set_date(Date::new(day, month, year));
            writeln!(out, "date set to {:02}/{:02}/{}", day, month, year)
        }
        Command::Alarm(AlarmCommand::On) => {
            clock.enable_alarm();
            writeln!(out, "alarm enabled")
        }
        Command::Alarm(AlarmCommand::Off) => {
            clock.disable_alarm();
            writeln!(out, "alarm disabled")
        }
        Command::Alarm(AlarmCommand::Set { hour, minute }) => {
            clock.set_alarm_time(hour, minute);
            writeln!(out, "alarm set to {:02}:{:02}", hour, minute)
        }
        Command::Timer(TimerCommand::Start) => {
            clock.start_timer(now);
            if clock.timer().is_running() {
                writeln!(out, "timer started")
            } else {
                writeln!(out, "timer not started, set a duration first")
            }
        }
        Command::Timer(TimerCommand::Stop) => {
            clock.stop_timer();
            writeln!(out, "timer stopped")
        }
        Command::Timer(TimerCommand::Reset) => {
            clock.reset_timer(now);
            writeln!(out, "timer reset")
        }
        Command::Timer(TimerCommand::Set {
            hour,
            minute,
            second,
        }) => {
            clock.set_timer_time(hour, minute, second);
            writeln!(out, "timer set to {:02}:{:02}:{:02}", hour, minute, second)
        }
        Command::Status => {
            let t = clock.time();
            let d = clock.date();
            let temperature = clock.temperature();
            let humidity = clock.humidity();
            (|| {
                writeln!(out, "time: {:02}:{:02}:{:02}", t.hour, t.minute, t.second)?;
                writeln!(out, "date: {:02}/{:02}/{}", d.day, d.month, d.year)?;
                writeln!(out, "temperature: {} C", temperature)?;
                writeln!(out, "humidity: {} %", humidity)
            })()
        }
        Command::Help => (|| {
            writeln!(out, "commands:")?;
            writeln!(out, "  time HHMM        - set the clock, e.g. time 1430")?;
            writeln!(out, "  date DDMMYYYY    - set the date, e.g. date 25122024")?;
            writeln!(out, "  alarm on|off     - arm or disarm the alarm")?;
            writeln!(out, "  alarm set HHMM   - set the alarm time")?;
            writeln!(out, "  timer set HHMMSS - set the countdown duration")?;
            writeln!(out, "  timer start|stop|reset")?;
            writeln!(out, "  status           - show time, date and sensor readings")?;
            writeln!(out, "  help             - this message")
        })(),
    };
    out
}

fn digits(arg: &str, len: usize) -> Result<&str, ParseError> {
    if arg.len() == len && arg.bytes().all(|b| b.is_ascii_digit()) {
        Ok(arg)
    } else {
        Err(ParseError::BadArgument)
    }
}

fn parse_hhmm(arg: &str) -> Result<(u8, u8), ParseError> {
    let arg = digits(arg, 4)?;
    let hour: u8 = arg[0..2].parse().map_err(|_| ParseError::BadArgument)?;
    let minute: u8 = arg[2..4].parse().map_err(|_| ParseError::BadArgument)?;
    if hour <= 23 && minute <= 59 {
        Ok((hour, minute))
    } else {
        Err(ParseError::BadArgument)
    }
}

fn parse_ddmmyyyy(arg: &str) -> Result<(u8, u8, u16), ParseError> {
    let arg = digits(arg, 8)?;
    let day: u8 = arg[0..2].parse().map_err(|_| ParseError::BadArgument)?;
    let month: u8 = arg[2..4].parse().map_err(|_| ParseError::BadArgument)?;
    let year: u16 = arg[4..8].parse().map_err(|_| ParseError::BadArgument)?;
    if (1..=31).contains(&day) && (1..=12).contains(&month) && (2020..=2100).contains(&year) {
        Ok((day, month, year))
    } else {
        Err(ParseError::BadArgument)
    }
}

fn parse_hhmmss(arg: &str) -> Result<(u8, u8, u8), ParseError> {
    let arg = digits(arg, 6)?;
    let hour: u8 = arg[0..2].parse().map_err(|_| ParseError::BadArgument)?;
    let minute: u8 = arg[2..4].parse().map_err(|_| ParseError::BadArgument)?;
    let second: u8 = arg[4..6].parse().map_err(|_| ParseError::BadArgument)?;
    if hour <= 23 && minute <= 59 && second <= 59 {
        Ok((hour, minute, second))
    } else {
        Err(ParseError::BadArgument)
    }
}
