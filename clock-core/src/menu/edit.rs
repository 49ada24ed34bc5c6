//! Field-by-field editing of the wall clock.

use core::fmt::Write;

use crate::clock::DateTime;
use crate::display::{LCD_COLUMNS, Line};
use crate::input::{Button, ButtonSet};

/// Date/time component selected for editing.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EditField {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

impl EditField {
    pub const ALL: [Self; 6] = [
        Self::Year,
        Self::Month,
        Self::Day,
        Self::Hour,
        Self::Minute,
        Self::Second,
    ];

    pub const fn index(self) -> usize {
        match self {
            Self::Year => 0,
            Self::Month => 1,
            Self::Day => 2,
            Self::Hour => 3,
            Self::Minute => 4,
            Self::Second => 5,
        }
    }

    /// Size of the value domain. Month and day skip zero within it.
    pub const fn modulus(self) -> u16 {
        match self {
            Self::Year => 10_000,
            Self::Month => 13,
            Self::Day => 32,
            Self::Hour => 24,
            Self::Minute | Self::Second => 60,
        }
    }

    pub const fn skips_zero(self) -> bool {
        matches!(self, Self::Month | Self::Day)
    }

    /// Column of the field's first digit in `YYYY-MM-DD  HH:MM:SS`.
    pub const fn caret_column(self) -> usize {
        match self {
            Self::Year => 0,
            Self::Month => 5,
            Self::Day => 8,
            Self::Hour => 12,
            Self::Minute => 15,
            Self::Second => 18,
        }
    }

    fn step(self, value: u16, forward: bool) -> u16 {
        let modulus = self.modulus();
        let value = value % modulus;
        let next = if forward {
            (value + 1) % modulus
        } else {
            (value + modulus - 1) % modulus
        };
        match (next, self.skips_zero(), forward) {
            (0, true, true) => 1,
            (0, true, false) => modulus - 1,
            _ => next,
        }
    }
}

/// Pending values while the clock is being edited.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ClockEditState {
    field_index: usize,
    pending: [u16; 6],
    committed: [u16; 6],
}

impl ClockEditState {
    /// Starts editing from the currently committed time, on the year field.
    pub fn begin(current: DateTime) -> Self {
        let fields = current.fields();
        Self {
            field_index: 0,
            pending: fields,
            committed: fields,
        }
    }

    pub const fn field(&self) -> EditField {
        EditField::ALL[self.field_index % EditField::ALL.len()]
    }

    pub const fn pending_values(&self) -> [u16; 6] {
        self.pending
    }

    /// Returns `true` when the pending values differ from the committed time.
    pub fn is_dirty(&self) -> bool {
        self.pending != self.committed
    }

    pub fn next_field(&mut self) {
        self.field_index = (self.field_index + 1) % EditField::ALL.len();
    }

    pub fn previous_field(&mut self) {
        self.field_index = (self.field_index + EditField::ALL.len() - 1) % EditField::ALL.len();
    }

    pub fn increment(&mut self) {
        let field = self.field();
        let slot = &mut self.pending[field.index()];
        *slot = field.step(*slot, true);
    }

    pub fn decrement(&mut self) {
        let field = self.field();
        let slot = &mut self.pending[field.index()];
        *slot = field.step(*slot, false);
    }

    /// Applies one poll's press edges.
    ///
    /// Select and Back move between fields; Down raises and Up lowers the
    /// value.
    pub fn apply(&mut self, edges: ButtonSet) {
        if edges.contains(Button::Select) {
            self.next_field();
        }
        if edges.contains(Button::Back) {
            self.previous_field();
        }
        if edges.contains(Button::Down) {
            self.increment();
        }
        if edges.contains(Button::Up) {
            self.decrement();
        }
    }

    /// Time to commit, or `None` when nothing changed.
    pub fn commit(&self) -> Option<DateTime> {
        self.is_dirty()
            .then(|| DateTime::from_fields_clamped(self.pending))
    }

    /// Pending values as `YYYY-MM-DD  HH:MM:SS`.
    pub fn pending_text(&self) -> Line {
        let [year, month, day, hour, minute, second] = self.pending;
        let mut text = Line::new();
        let _ = write!(
            text,
            "{year:04}-{month:02}-{day:02}  {hour:02}:{minute:02}:{second:02}"
        );
        text
    }

    /// Row of dashes with a caret under the active field.
    pub fn caret_row(&self) -> Line {
        let column = self.field().caret_column();
        let mut row = Line::new();
        for index in 0..LCD_COLUMNS {
            let _ = row.push(if index == column { '^' } else { '-' });
        }
        row
    }
}
