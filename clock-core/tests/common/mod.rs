#![allow(dead_code)]

use core::cell::Cell;
use core::time::Duration;

use clock_core::appliance::{Appliance, Board, Hardware};
use clock_core::clock::{DateTime, SoftClock, TimeStore};
use clock_core::config::Config;
use clock_core::display::{DisplaySink, Glyph, LCD_COLUMNS, LCD_ROWS};
use clock_core::error::{Peripheral, ServiceError};
use clock_core::input::{Button, ButtonSet, InputSource};
use clock_core::scheduler::{Instant, Monotonic, Sleeper};
use clock_core::services::{NetworkLink, PowerStatus, SystemControl};

#[derive(Default)]
pub struct MockInput {
    pub levels: ButtonSet,
}

impl InputSource for MockInput {
    fn is_pressed(&self, button: Button) -> bool {
        self.levels.contains(button)
    }
}

pub struct MockDisplay {
    pub rows: [String; LCD_ROWS],
    pub glyphs: [Option<Glyph>; 8],
    pub backlight: Option<bool>,
    pub row_writes: usize,
    pub failing: bool,
}

impl Default for MockDisplay {
    fn default() -> Self {
        Self {
            rows: core::array::from_fn(|_| " ".repeat(LCD_COLUMNS)),
            glyphs: [None; 8],
            backlight: None,
            row_writes: 0,
            failing: false,
        }
    }
}

impl MockDisplay {
    pub fn row(&self, row: usize) -> &str {
        &self.rows[row]
    }
}

impl DisplaySink for MockDisplay {
    type Error = &'static str;

    fn clear(&mut self) -> Result<(), Self::Error> {
        if self.failing {
            return Err("bus error");
        }
        for row in &mut self.rows {
            *row = " ".repeat(LCD_COLUMNS);
        }
        Ok(())
    }

    fn write(&mut self, row: u8, col: u8, text: &str) -> Result<(), Self::Error> {
        if self.failing {
            return Err("bus error");
        }
        let line = &mut self.rows[usize::from(row)];
        let col = usize::from(col);
        let mut chars: Vec<char> = line.chars().collect();
        for (offset, ch) in text.chars().enumerate() {
            if let Some(cell) = chars.get_mut(col + offset) {
                *cell = ch;
            }
        }
        *line = chars.into_iter().collect();
        self.row_writes += 1;
        Ok(())
    }

    fn define_glyph(&mut self, slot: u8, bitmap: &Glyph) -> Result<(), Self::Error> {
        if self.failing {
            return Err("bus error");
        }
        self.glyphs[usize::from(slot)] = Some(*bitmap);
        Ok(())
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), Self::Error> {
        self.backlight = Some(on);
        Ok(())
    }
}

#[derive(Default)]
pub struct MockStore {
    pub present: bool,
    pub saved: Option<DateTime>,
    pub saves: usize,
}

impl MockStore {
    pub fn with_card(saved: Option<DateTime>) -> Self {
        Self {
            present: true,
            saved,
            saves: 0,
        }
    }
}

impl TimeStore for MockStore {
    fn load_time(&mut self) -> Result<DateTime, ServiceError> {
        if !self.present {
            return Err(ServiceError::Unavailable(Peripheral::Storage));
        }
        self.saved.ok_or(ServiceError::Failed("no saved time"))
    }

    fn save_time(&mut self, time: &DateTime) -> Result<(), ServiceError> {
        if !self.present {
            return Err(ServiceError::Unavailable(Peripheral::Storage));
        }
        self.saved = Some(*time);
        self.saves += 1;
        Ok(())
    }
}

#[derive(Default)]
pub struct MockNetwork {
    pub connected: bool,
    pub refuse_connect: bool,
    pub network_time: Option<DateTime>,
    pub connect_calls: usize,
    pub sync_calls: usize,
}

impl NetworkLink for MockNetwork {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn connect(&mut self) -> Result<(), ServiceError> {
        self.connect_calls += 1;
        if self.refuse_connect {
            return Err(ServiceError::Failed("association refused"));
        }
        self.connected = true;
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), ServiceError> {
        self.connected = false;
        Ok(())
    }

    fn sync_time(&mut self) -> Result<DateTime, ServiceError> {
        self.sync_calls += 1;
        self.network_time.ok_or(ServiceError::Failed("ntp timeout"))
    }
}

#[derive(Default)]
pub struct MockSystem {
    pub resets: usize,
    pub power: Option<PowerStatus>,
    pub temperature: Option<i16>,
}

impl SystemControl for MockSystem {
    fn reset(&mut self) {
        self.resets += 1;
    }

    fn power(&mut self) -> Option<PowerStatus> {
        self.power
    }

    fn temperature_decicelsius(&mut self) -> Option<i16> {
        self.temperature
    }
}

pub struct MockBoard;

impl Board for MockBoard {
    type Input = MockInput;
    type Display = MockDisplay;
    type Clock = SoftClock;
    type Store = MockStore;
    type Network = MockNetwork;
    type System = MockSystem;
}

pub fn hardware() -> Hardware<MockBoard> {
    Hardware {
        input: MockInput::default(),
        display: MockDisplay::default(),
        clock: SoftClock::default(),
        store: MockStore::default(),
        network: MockNetwork::default(),
        system: MockSystem::default(),
    }
}

pub fn appliance() -> Appliance<MockBoard> {
    Appliance::new(hardware(), Config::default())
}

/// Monotonic clock advanced by hand or by the scheduler's sleeps.
#[derive(Default)]
pub struct ManualClock {
    now: Cell<Instant>,
}

impl ManualClock {
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Monotonic for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

impl Sleeper for ManualClock {
    fn sleep_until(&mut self, deadline: Instant) {
        if deadline > self.now.get() {
            self.now.set(deadline);
        }
    }
}

pub fn frame_text(app: &Appliance<MockBoard>) -> Option<String> {
    app.buffer().peek().map(ToString::to_string)
}

pub fn frame_row(app: &Appliance<MockBoard>, row: usize) -> String {
    app.buffer()
        .peek()
        .map(|frame| frame.row(row).to_string())
        .unwrap_or_default()
}
