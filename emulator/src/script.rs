//! Line commands accepted by the scripted front-end.

use std::fmt;
use std::time::Duration;

use clock_core::input::Button;

/// Upper bound for `<button> <count>` repeats.
pub const MAX_REPEAT: u32 = 100;

pub const HELP_TOPICS: &[(&str, &str)] = &[
    (
        "press",
        "<up|down|select|back|mode> [count]  - tap a button (1-100 times)",
    ),
    (
        "hold",
        "hold <button> <seconds>             - keep a button down",
    ),
    (
        "wait",
        "wait <seconds|Nms>                  - let simulated time pass",
    ),
    (
        "show",
        "show                                - print the LCD",
    ),
    (
        "tasks",
        "tasks                               - list scheduler tasks",
    ),
    (
        "status",
        "status                              - uptime, idle and link state",
    ),
    (
        "help",
        "help                                - show this list",
    ),
];

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Command {
    Press { button: Button, count: u32 },
    Hold { button: Button, duration: Duration },
    Wait(Duration),
    Show,
    Tasks,
    Status,
    Help,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseError {
    Empty,
    UnknownCommand(String),
    MissingArgument(&'static str),
    InvalidCount(String),
    InvalidDuration(String),
    TrailingInput(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Empty => f.write_str("empty command"),
            ParseError::UnknownCommand(word) => write!(f, "unknown command `{word}`"),
            ParseError::MissingArgument(what) => write!(f, "missing {what}"),
            ParseError::InvalidCount(value) => {
                write!(f, "count `{value}` must be 1-{MAX_REPEAT}")
            }
            ParseError::InvalidDuration(value) => write!(f, "bad duration `{value}`"),
            ParseError::TrailingInput(rest) => write!(f, "unexpected `{rest}`"),
        }
    }
}

pub fn parse(line: &str) -> Result<Command, ParseError> {
    let mut words = line.split_whitespace();
    let head = words.next().ok_or(ParseError::Empty)?;

    let command = if let Some(button) = Button::from_label(head) {
        let count = match words.next() {
            Some(value) => parse_count(value)?,
            None => 1,
        };
        Command::Press { button, count }
    } else {
        match head.to_ascii_lowercase().as_str() {
            "wait" => {
                let value = words.next().ok_or(ParseError::MissingArgument("duration"))?;
                Command::Wait(parse_duration(value)?)
            }
            "hold" => {
                let label = words.next().ok_or(ParseError::MissingArgument("button"))?;
                let button = Button::from_label(label)
                    .ok_or_else(|| ParseError::UnknownCommand(label.to_string()))?;
                let value = words.next().ok_or(ParseError::MissingArgument("duration"))?;
                Command::Hold {
                    button,
                    duration: parse_duration(value)?,
                }
            }
            "show" => Command::Show,
            "tasks" => Command::Tasks,
            "status" => Command::Status,
            "help" => Command::Help,
            _ => return Err(ParseError::UnknownCommand(head.to_string())),
        }
    };

    let rest: Vec<&str> = words.collect();
    if !rest.is_empty() {
        return Err(ParseError::TrailingInput(rest.join(" ")));
    }
    Ok(command)
}

fn parse_count(value: &str) -> Result<u32, ParseError> {
    value
        .parse::<u32>()
        .ok()
        .filter(|count| (1..=MAX_REPEAT).contains(count))
        .ok_or_else(|| ParseError::InvalidCount(value.to_string()))
}

/// Accepts `1.5` (seconds) or `250ms`.
fn parse_duration(value: &str) -> Result<Duration, ParseError> {
    let invalid = || ParseError::InvalidDuration(value.to_string());
    if let Some(millis) = value.strip_suffix("ms") {
        return millis
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| invalid());
    }
    let seconds = value.strip_suffix('s').unwrap_or(value);
    seconds
        .parse::<f64>()
        .ok()
        .and_then(|seconds| Duration::try_from_secs_f64(seconds).ok())
        .ok_or_else(invalid)
}
