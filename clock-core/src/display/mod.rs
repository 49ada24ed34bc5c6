//! Character display model shared by producers and the render task.
//!
//! Producers compose a full [`Frame`] and publish it into the single-slot
//! [`DisplayBuffer`]. The render task takes whatever is pending and pushes it
//! to a [`DisplaySink`] through a [`Renderer`], which only transfers rows and
//! glyph slots that changed since the last flush. An empty buffer means there
//! is nothing new to draw.

use core::convert::Infallible;
use core::fmt;

use heapless::String;

pub mod glyphs;

/// Characters per LCD row.
pub const LCD_COLUMNS: usize = 20;
/// Rows on the LCD.
pub const LCD_ROWS: usize = 4;
/// User-definable character slots.
pub const GLYPH_SLOTS: usize = 8;

/// 5x8 bitmap, one byte per pixel row (low five bits used).
pub type Glyph = [u8; 8];

/// One padded LCD row.
pub type Line = String<LCD_COLUMNS>;

/// Character display driven by the render task.
pub trait DisplaySink {
    type Error: fmt::Debug;

    /// Blanks every cell.
    fn clear(&mut self) -> Result<(), Self::Error>;

    /// Writes `text` starting at `row`/`col`. Characters `'\u{0}'`-`'\u{7}'`
    /// address the custom glyph slots.
    fn write(&mut self, row: u8, col: u8, text: &str) -> Result<(), Self::Error>;

    /// Loads a custom glyph into `slot` (0-7).
    fn define_glyph(&mut self, slot: u8, bitmap: &Glyph) -> Result<(), Self::Error>;

    /// Switches the backlight.
    fn set_backlight(&mut self, on: bool) -> Result<(), Self::Error>;
}

/// Display sink that discards everything.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopDisplay;

impl DisplaySink for NoopDisplay {
    type Error = Infallible;

    fn clear(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn write(&mut self, _: u8, _: u8, _: &str) -> Result<(), Self::Error> {
        Ok(())
    }

    fn define_glyph(&mut self, _: u8, _: &Glyph) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_backlight(&mut self, _: bool) -> Result<(), Self::Error> {
        Ok(())
    }
}

fn blank_line() -> Line {
    let mut line = Line::new();
    for _ in 0..LCD_COLUMNS {
        let _ = line.push(' ');
    }
    line
}

fn display_char(ch: char) -> char {
    if ch.is_ascii() { ch } else { '?' }
}

/// Complete 20x4 screen plus the glyph slots it relies on.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Frame {
    rows: [Line; LCD_ROWS],
    glyphs: [Option<Glyph>; GLYPH_SLOTS],
}

impl Frame {
    /// Frame with every cell blank and no glyph requirements.
    pub fn blank() -> Self {
        Self {
            rows: core::array::from_fn(|_| blank_line()),
            glyphs: [None; GLYPH_SLOTS],
        }
    }

    /// Lays out free text the way the LCD would print it.
    ///
    /// `'\n'` starts a new row and text past the last column continues on the
    /// next row. Anything beyond the fourth row is dropped.
    pub fn from_text(text: &str) -> Self {
        let mut frame = Self::blank();
        let mut row = 0;
        let mut col = 0;
        for ch in text.chars() {
            if ch == '\n' {
                row += 1;
                col = 0;
                continue;
            }
            if col == LCD_COLUMNS {
                row += 1;
                col = 0;
            }
            if row >= LCD_ROWS {
                break;
            }
            frame.put(row, col, ch);
            col += 1;
        }
        frame
    }

    fn put(&mut self, row: usize, col: usize, ch: char) {
        let mut line = Line::new();
        for (index, existing) in self.rows[row].chars().enumerate() {
            let _ = line.push(if index == col {
                display_char(ch)
            } else {
                existing
            });
        }
        self.rows[row] = line;
    }

    /// Replaces `row` with `text`, truncated or space-padded to the row width.
    ///
    /// Out-of-range rows are ignored.
    pub fn set_row(&mut self, row: usize, text: &str) {
        let Some(slot) = self.rows.get_mut(row) else {
            return;
        };
        let mut line = Line::new();
        for ch in text.chars().take(LCD_COLUMNS) {
            let _ = line.push(display_char(ch));
        }
        while line.len() < LCD_COLUMNS {
            let _ = line.push(' ');
        }
        *slot = line;
    }

    /// Returns the padded text of `row`.
    pub fn row(&self, row: usize) -> &str {
        self.rows.get(row).map_or("", Line::as_str)
    }

    pub fn rows(&self) -> &[Line] {
        &self.rows
    }

    /// Requires `bitmap` to be loaded in `slot` when this frame is shown.
    pub fn set_glyph(&mut self, slot: u8, bitmap: Glyph) {
        if let Some(entry) = self.glyphs.get_mut(usize::from(slot)) {
            *entry = Some(bitmap);
        }
    }

    #[must_use]
    pub fn with_glyph(mut self, slot: u8, bitmap: Glyph) -> Self {
        self.set_glyph(slot, bitmap);
        self
    }

    /// Bitmap this frame requires in `slot`, if any.
    pub fn glyph(&self, slot: u8) -> Option<&Glyph> {
        self.glyphs.get(usize::from(slot)).and_then(Option::as_ref)
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::blank()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, row) in self.rows.iter().enumerate() {
            if index > 0 {
                f.write_str("\n")?;
            }
            f.write_str(row)?;
        }
        Ok(())
    }
}

/// Single-slot hand-off between frame producers and the render task.
#[derive(Clone, Debug, Default)]
pub struct DisplayBuffer {
    pending: Option<Frame>,
}

impl DisplayBuffer {
    pub const fn new() -> Self {
        Self { pending: None }
    }

    /// Replaces any frame not yet drawn.
    pub fn publish(&mut self, frame: Frame) {
        self.pending = Some(frame);
    }

    /// Takes the pending frame, leaving the buffer empty.
    pub fn take(&mut self) -> Option<Frame> {
        self.pending.take()
    }

    pub fn peek(&self) -> Option<&Frame> {
        self.pending.as_ref()
    }

    pub const fn is_empty(&self) -> bool {
        self.pending.is_none()
    }
}

/// Pushes frames to a sink, skipping rows and glyphs that are already shown.
#[derive(Clone, Debug, Default)]
pub struct Renderer {
    shown: Option<[Line; LCD_ROWS]>,
    loaded: [Option<Glyph>; GLYPH_SLOTS],
}

impl Renderer {
    pub const fn new() -> Self {
        Self {
            shown: None,
            loaded: [None; GLYPH_SLOTS],
        }
    }

    /// Forgets what the sink shows so the next flush redraws everything.
    pub fn invalidate(&mut self) {
        self.shown = None;
        self.loaded = [None; GLYPH_SLOTS];
    }

    /// Draws `frame` onto `sink`.
    ///
    /// Glyph slots are loaded before any text so a row never flashes with a
    /// stale bitmap. On error the renderer forgets the sink contents.
    pub fn flush<S: DisplaySink>(&mut self, sink: &mut S, frame: &Frame) -> Result<(), S::Error> {
        let result = self.draw(sink, frame);
        if result.is_err() {
            self.invalidate();
        }
        result
    }

    fn draw<S: DisplaySink>(&mut self, sink: &mut S, frame: &Frame) -> Result<(), S::Error> {
        for (slot, wanted) in frame.glyphs.iter().enumerate() {
            if let Some(bitmap) = wanted
                && self.loaded[slot].as_ref() != Some(bitmap)
            {
                let index = u8::try_from(slot).unwrap_or(u8::MAX);
                sink.define_glyph(index, bitmap)?;
                self.loaded[slot] = Some(*bitmap);
            }
        }

        if self.shown.is_none() {
            sink.clear()?;
        }
        for (row, line) in frame.rows.iter().enumerate() {
            let unchanged = self
                .shown
                .as_ref()
                .is_some_and(|shown| shown[row] == *line);
            if !unchanged {
                let index = u8::try_from(row).unwrap_or(u8::MAX);
                sink.write(index, 0, line)?;
            }
        }
        self.shown = Some(frame.rows.clone());
        Ok(())
    }
}
