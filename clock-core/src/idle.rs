//! Inactivity tracking that blanks the backlight.

/// Change reported by [`IdleState::observe`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum IdleTransition {
    /// Nothing changed.
    Steady,
    /// The threshold was reached; the backlight should go off.
    FellAsleep,
    /// A press arrived while asleep; the backlight should come back.
    Woke,
}

/// Cycles since the last press and whether the display sleeps.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct IdleState {
    ticks_since_input: u32,
    asleep: bool,
}

impl IdleState {
    pub const fn new() -> Self {
        Self {
            ticks_since_input: 0,
            asleep: false,
        }
    }

    pub const fn ticks_since_input(&self) -> u32 {
        self.ticks_since_input
    }

    pub const fn is_asleep(&self) -> bool {
        self.asleep
    }

    /// Feeds one poll of the buttons.
    ///
    /// A press resets the counter and wakes the display. Otherwise the counter
    /// grows, and the poll on which it reaches `threshold` puts the display to
    /// sleep.
    pub fn observe(&mut self, any_pressed: bool, threshold: u32) -> IdleTransition {
        if any_pressed {
            self.ticks_since_input = 0;
            if self.asleep {
                self.asleep = false;
                return IdleTransition::Woke;
            }
            return IdleTransition::Steady;
        }

        self.ticks_since_input = self.ticks_since_input.saturating_add(1);
        if !self.asleep && self.ticks_since_input >= threshold {
            self.asleep = true;
            return IdleTransition::FellAsleep;
        }
        IdleTransition::Steady
    }
}
