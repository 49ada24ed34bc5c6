//! Simulated collaborators for the host emulator.

use std::convert::Infallible;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{Datelike, Local, Timelike};
use clock_core::appliance::{Board, Hardware};
use clock_core::clock::{DateTime, SoftClock, TimeStore};
use clock_core::display::{DisplaySink, GLYPH_SLOTS, Glyph, LCD_COLUMNS, LCD_ROWS, glyphs};
use clock_core::error::{Peripheral, ServiceError};
use clock_core::input::{Button, ButtonSet, InputSource};
use clock_core::services::{NetworkLink, PowerStatus, SystemControl};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// Supply reading reported by the simulated board: on USB power.
const SIMULATED_POWER: PowerStatus = PowerStatus {
    millivolts: 4_150,
    external_power: true,
};
const SIMULATED_TEMPERATURE_DC: i16 = 235;

pub struct HostBoard;

impl Board for HostBoard {
    type Input = HostInput;
    type Display = LcdGrid;
    type Clock = SoftClock;
    type Store = JsonTimeStore;
    type Network = SimulatedNetwork;
    type System = HostSystem;
}

/// Collaborators for one emulator run.
pub fn hardware(store: Option<PathBuf>, online: bool) -> Hardware<HostBoard> {
    Hardware {
        input: HostInput::default(),
        display: LcdGrid::new(),
        clock: SoftClock::default(),
        store: JsonTimeStore::new(store),
        network: SimulatedNetwork::new(online),
        system: HostSystem::default(),
    }
}

/// Button levels set by the front-end.
#[derive(Debug, Default)]
pub struct HostInput {
    levels: ButtonSet,
}

impl HostInput {
    pub fn press(&mut self, button: Button) {
        self.levels.insert(button);
    }

    pub fn release_all(&mut self) {
        self.levels = ButtonSet::EMPTY;
    }
}

impl InputSource for HostInput {
    fn is_pressed(&self, button: Button) -> bool {
        self.levels.contains(button)
    }
}

/// 20x4 character grid standing in for the LCD.
#[derive(Debug)]
pub struct LcdGrid {
    cells: [[char; LCD_COLUMNS]; LCD_ROWS],
    glyphs: [Option<Glyph>; GLYPH_SLOTS],
    backlight: bool,
    revision: u64,
}

impl LcdGrid {
    pub fn new() -> Self {
        Self {
            cells: [[' '; LCD_COLUMNS]; LCD_ROWS],
            glyphs: [None; GLYPH_SLOTS],
            backlight: false,
            revision: 0,
        }
    }

    pub fn backlight(&self) -> bool {
        self.backlight
    }

    /// Bumped on every visible change so front-ends can redraw lazily.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Row text with custom glyphs replaced by printable stand-ins.
    pub fn row_text(&self, row: usize) -> String {
        self.cells[row]
            .iter()
            .map(|&cell| {
                usize::try_from(u32::from(cell))
                    .ok()
                    .and_then(|code| self.glyphs.get(code))
                    .map_or(cell, |slot| glyph_symbol(slot.as_ref()))
            })
            .collect()
    }

    /// The panel inside a box, one string per terminal line.
    pub fn render(&self) -> Vec<String> {
        let border = format!("+{}+", "-".repeat(LCD_COLUMNS));
        let mut lines = Vec::with_capacity(LCD_ROWS + 3);
        lines.push(border.clone());
        for row in 0..LCD_ROWS {
            lines.push(format!("|{}|", self.row_text(row)));
        }
        lines.push(border);
        if !self.backlight {
            lines.push("(backlight off)".to_string());
        }
        lines
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

impl Default for LcdGrid {
    fn default() -> Self {
        Self::new()
    }
}

fn glyph_symbol(bitmap: Option<&Glyph>) -> char {
    let Some(bitmap) = bitmap else {
        return ' ';
    };
    let known = [
        (glyphs::CURSOR, '>'),
        (glyphs::BATTERY_FULL, 'B'),
        (glyphs::BATTERY_MEDIUM, 'b'),
        (glyphs::BATTERY_LOW, '_'),
        (glyphs::BATTERY_PLUGGED, '+'),
        (glyphs::WIFI_ON, 'W'),
        (glyphs::WIFI_OFF, 'x'),
        (glyphs::PAUSE, '"'),
    ];
    known
        .iter()
        .find(|(candidate, _)| candidate == bitmap)
        .map_or('#', |(_, symbol)| *symbol)
}

impl DisplaySink for LcdGrid {
    type Error = Infallible;

    fn clear(&mut self) -> Result<(), Self::Error> {
        self.cells = [[' '; LCD_COLUMNS]; LCD_ROWS];
        self.touch();
        Ok(())
    }

    fn write(&mut self, row: u8, col: u8, text: &str) -> Result<(), Self::Error> {
        let Some(cells) = self.cells.get_mut(usize::from(row)) else {
            return Ok(());
        };
        for (cell, ch) in cells.iter_mut().skip(usize::from(col)).zip(text.chars()) {
            *cell = ch;
        }
        self.touch();
        Ok(())
    }

    fn define_glyph(&mut self, slot: u8, bitmap: &Glyph) -> Result<(), Self::Error> {
        if let Some(entry) = self.glyphs.get_mut(usize::from(slot)) {
            *entry = Some(*bitmap);
            self.touch();
        }
        Ok(())
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), Self::Error> {
        self.backlight = on;
        self.touch();
        Ok(())
    }
}

/// On-disk layout of the saved time.
#[derive(Debug, Serialize, Deserialize)]
struct StoredTime {
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
}

impl From<&DateTime> for StoredTime {
    fn from(time: &DateTime) -> Self {
        Self {
            year: time.year(),
            month: time.month(),
            day: time.day(),
            hour: time.hour(),
            minute: time.minute(),
            second: time.second(),
        }
    }
}

/// Saved time as a small JSON file. Without a path the store behaves like a
/// missing card.
#[derive(Debug)]
pub struct JsonTimeStore {
    path: Option<PathBuf>,
}

impl JsonTimeStore {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    fn path(&self) -> Result<&Path, ServiceError> {
        self.path
            .as_deref()
            .ok_or(ServiceError::Unavailable(Peripheral::Storage))
    }
}

impl TimeStore for JsonTimeStore {
    fn load_time(&mut self) -> Result<DateTime, ServiceError> {
        let path = self.path()?;
        let text = fs::read_to_string(path).map_err(|err| {
            debug!("reading {}: {err}", path.display());
            if err.kind() == io::ErrorKind::NotFound {
                ServiceError::Failed("no saved time")
            } else {
                ServiceError::Unavailable(Peripheral::Storage)
            }
        })?;
        let stored: StoredTime = serde_json::from_str(&text).map_err(|err| {
            warn!("{} is not a saved time: {err}", path.display());
            ServiceError::Failed("corrupt time file")
        })?;
        DateTime::new(
            stored.year,
            stored.month,
            stored.day,
            stored.hour,
            stored.minute,
            stored.second,
        )
        .ok_or(ServiceError::Failed("saved time out of range"))
    }

    fn save_time(&mut self, time: &DateTime) -> Result<(), ServiceError> {
        let path = self.path()?;
        let text = serde_json::to_string(&StoredTime::from(time))
            .map_err(|_| ServiceError::Failed("encoding time failed"))?;
        fs::write(path, text).map_err(|err| {
            debug!("writing {}: {err}", path.display());
            ServiceError::Failed("writing time failed")
        })
    }
}

/// WiFi link that syncs from the host clock.
#[derive(Debug)]
pub struct SimulatedNetwork {
    reachable: bool,
    connected: bool,
}

impl SimulatedNetwork {
    pub fn new(reachable: bool) -> Self {
        Self {
            reachable,
            connected: false,
        }
    }
}

impl NetworkLink for SimulatedNetwork {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn connect(&mut self) -> Result<(), ServiceError> {
        if !self.reachable {
            return Err(ServiceError::Failed("access point unreachable"));
        }
        info!("simulated link up");
        self.connected = true;
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), ServiceError> {
        info!("simulated link down");
        self.connected = false;
        Ok(())
    }

    fn sync_time(&mut self) -> Result<DateTime, ServiceError> {
        if !self.connected {
            return Err(ServiceError::Unavailable(Peripheral::Network));
        }
        host_time()
    }
}

fn host_time() -> Result<DateTime, ServiceError> {
    const OUT_OF_RANGE: ServiceError = ServiceError::Failed("host clock out of range");
    let now = Local::now().naive_local();
    let narrow = |value: u32| u8::try_from(value).map_err(|_| OUT_OF_RANGE);
    let year = u16::try_from(now.year()).map_err(|_| OUT_OF_RANGE)?;
    DateTime::new(
        year,
        narrow(now.month())?,
        narrow(now.day())?,
        narrow(now.hour())?,
        narrow(now.minute())?,
        narrow(now.second())?,
    )
    .ok_or(OUT_OF_RANGE)
}

/// Fixed sensor readings plus a latch for reset requests.
#[derive(Debug, Default)]
pub struct HostSystem {
    reset_requested: bool,
}

impl HostSystem {
    pub fn reset_requested(&self) -> bool {
        self.reset_requested
    }
}

impl SystemControl for HostSystem {
    fn reset(&mut self) {
        warn!("reset requested");
        self.reset_requested = true;
    }

    fn power(&mut self) -> Option<PowerStatus> {
        Some(SIMULATED_POWER)
    }

    fn temperature_decicelsius(&mut self) -> Option<i16> {
        Some(SIMULATED_TEMPERATURE_DC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("clock-emulator-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[test]
    fn saved_time_uses_flat_json_fields() {
        let path = scratch_path("shape.json");
        let mut store = JsonTimeStore::new(Some(path.clone()));
        store.save_time(&DateTime::DEFAULT).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            r#"{"year":2024,"month":11,"day":4,"hour":21,"minute":30,"second":0}"#
        );
        assert_eq!(store.load_time(), Ok(DateTime::DEFAULT));
    }

    #[test]
    fn store_without_path_is_a_missing_card() {
        let mut store = JsonTimeStore::new(None);
        assert_eq!(
            store.load_time(),
            Err(ServiceError::Unavailable(Peripheral::Storage))
        );
        assert_eq!(
            store.save_time(&DateTime::DEFAULT),
            Err(ServiceError::Unavailable(Peripheral::Storage))
        );
    }

    #[test]
    fn missing_or_invalid_files_are_failures() {
        let mut store = JsonTimeStore::new(Some(scratch_path("absent.json")));
        assert_eq!(store.load_time(), Err(ServiceError::Failed("no saved time")));

        let path = scratch_path("invalid.json");
        fs::write(
            &path,
            r#"{"year":2024,"month":2,"day":30,"hour":0,"minute":0,"second":0}"#,
        )
        .unwrap();
        let mut store = JsonTimeStore::new(Some(path));
        assert_eq!(
            store.load_time(),
            Err(ServiceError::Failed("saved time out of range"))
        );
    }

    #[test]
    fn offline_network_refuses_to_connect() {
        let mut network = SimulatedNetwork::new(false);
        assert!(network.connect().is_err());
        assert!(!network.is_connected());
        assert_eq!(
            network.sync_time(),
            Err(ServiceError::Unavailable(Peripheral::Network))
        );
    }

    #[test]
    fn grid_shows_glyph_stand_ins() {
        let mut grid = LcdGrid::new();
        grid.define_glyph(0, &glyphs::CURSOR).unwrap();
        grid.write(1, 0, "\u{0} Settings").unwrap();
        grid.write(1, 19, "xyz").unwrap();
        assert_eq!(grid.row_text(1), "> Settings         x");
        assert_eq!(grid.render().last().unwrap(), "(backlight off)");
    }
}
