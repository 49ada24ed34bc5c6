//! Real-time terminal front-end.
//!
//! Keys map to buttons; terminals rarely report releases, so each key press
//! holds its button for [`KEY_HOLD`].

use std::io::{self, Write};
use std::time::Duration;

use clock_core::input::Button;
use clock_core::scheduler::{Instant, Monotonic, NextWake};
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::style::Print;
use crossterm::terminal::{
    Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
    enable_raw_mode,
};
use crossterm::{execute, queue};

use crate::session::Emulator;
use crate::time::HostClock;

const KEY_HOLD: Duration = Duration::from_millis(80);
const KEY_POLL: Duration = Duration::from_millis(10);

const KEY_HELP: &str = "arrows: up/down  enter: select  esc/backspace: back  tab/m: mode  q: quit";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum KeyAction {
    Press(Button),
    Quit,
}

fn key_action(code: KeyCode) -> Option<KeyAction> {
    let button = match code {
        KeyCode::Up => Button::Up,
        KeyCode::Down => Button::Down,
        KeyCode::Enter => Button::Select,
        KeyCode::Backspace | KeyCode::Esc => Button::Back,
        KeyCode::Tab | KeyCode::Char('m' | 'M') => Button::Mode,
        KeyCode::Char('q' | 'Q') => return Some(KeyAction::Quit),
        _ => return None,
    };
    Some(KeyAction::Press(button))
}

pub fn run(emulator: &mut Emulator<'_>) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, Hide)?;

    let result = event_loop(emulator, &mut stdout);

    disable_raw_mode()?;
    execute!(stdout, Show, LeaveAlternateScreen)?;
    result
}

fn event_loop<W: Write>(emulator: &mut Emulator<'_>, out: &mut W) -> io::Result<()> {
    let clock = HostClock::new();
    let mut release_at: Option<Instant> = None;
    let mut drawn: Option<u64> = None;

    loop {
        let wake = emulator.run_cycle(&clock);
        if emulator.reset_requested() {
            return Ok(());
        }

        let revision = emulator.app().display().revision();
        if drawn != Some(revision) {
            draw(out, emulator)?;
            drawn = Some(revision);
        }

        if let Some(at) = release_at
            && clock.now() >= at
        {
            emulator.app_mut().input_mut().release_all();
            release_at = None;
        }

        let timeout = match wake {
            NextWake::Immediate => Duration::ZERO,
            NextWake::At(deadline) => deadline
                .saturating_duration_since(clock.now())
                .min(KEY_POLL),
            NextWake::Idle => KEY_POLL,
        };
        if !event::poll(timeout)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key_action(key.code) {
            Some(KeyAction::Quit) => return Ok(()),
            Some(KeyAction::Press(button)) => {
                emulator.app_mut().input_mut().press(button);
                release_at = Some(clock.now() + KEY_HOLD);
            }
            None => {}
        }
    }
}

fn draw<W: Write>(out: &mut W, emulator: &Emulator<'_>) -> io::Result<()> {
    queue!(out, Clear(ClearType::All))?;
    let lines = emulator.app().display().render();
    for (row, line) in (0u16..).zip(lines.iter().map(String::as_str).chain([KEY_HELP])) {
        queue!(out, MoveTo(0, row), Print(line))?;
    }
    out.flush()
}
