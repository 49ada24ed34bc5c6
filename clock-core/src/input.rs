//! Logical buttons and press-edge tracking.
//!
//! [`InputSource`] reports debounced levels for the five buttons on the front
//! panel. Navigation reacts to press edges (a button that was up on the
//! previous poll and is down now) via [`EdgeDetector`]; the idle monitor reacts
//! to raw levels.

use core::fmt;

/// One of the five front-panel buttons.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Button {
    Up,
    Down,
    Select,
    Back,
    Mode,
}

impl Button {
    /// Every button, in panel order.
    pub const ALL: [Self; 5] = [Self::Up, Self::Down, Self::Select, Self::Back, Self::Mode];

    const fn bit(self) -> u8 {
        match self {
            Self::Up => 1 << 0,
            Self::Down => 1 << 1,
            Self::Select => 1 << 2,
            Self::Back => 1 << 3,
            Self::Mode => 1 << 4,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Select => "select",
            Self::Back => "back",
            Self::Mode => "mode",
        }
    }

    /// Parses a label produced by [`Button::label`], ignoring ASCII case.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|button| button.label().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Compact set of buttons.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct ButtonSet(u8);

impl ButtonSet {
    pub const EMPTY: Self = Self(0);

    pub const fn of(button: Button) -> Self {
        Self(button.bit())
    }

    #[must_use]
    pub const fn with(self, button: Button) -> Self {
        Self(self.0 | button.bit())
    }

    pub fn insert(&mut self, button: Button) {
        self.0 |= button.bit();
    }

    pub const fn contains(self, button: Button) -> bool {
        self.0 & button.bit() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Buttons present in `self` but not in `previous`.
    #[must_use]
    pub const fn newly_pressed(self, previous: Self) -> Self {
        Self(self.0 & !previous.0)
    }

    pub fn iter(self) -> impl Iterator<Item = Button> {
        Button::ALL
            .into_iter()
            .filter(move |button| self.contains(*button))
    }
}

impl FromIterator<Button> for ButtonSet {
    fn from_iter<I: IntoIterator<Item = Button>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}

/// Debounced button levels supplied by the board.
pub trait InputSource {
    /// Returns `true` while the button is held.
    fn is_pressed(&self, button: Button) -> bool;

    /// Samples every button at once.
    fn snapshot(&self) -> ButtonSet {
        Button::ALL
            .into_iter()
            .filter(|button| self.is_pressed(*button))
            .collect()
    }
}

/// Input source with every button released.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoInput;

impl InputSource for NoInput {
    fn is_pressed(&self, _: Button) -> bool {
        false
    }
}

/// Turns successive level samples into press edges.
#[derive(Copy, Clone, Debug, Default)]
pub struct EdgeDetector {
    previous: ButtonSet,
}

impl EdgeDetector {
    pub const fn new() -> Self {
        Self {
            previous: ButtonSet::EMPTY,
        }
    }

    /// Records `levels` and returns the buttons pressed since the last sample.
    pub fn update(&mut self, levels: ButtonSet) -> ButtonSet {
        let edges = levels.newly_pressed(self.previous);
        self.previous = levels;
        edges
    }

    /// Records `levels` without reporting edges, swallowing held presses.
    pub fn resync(&mut self, levels: ButtonSet) {
        self.previous = levels;
    }
}
