//! Optional collaborators: network link and system control.
//!
//! Boards without a radio or sensors plug in [`NoNetwork`] / [`NoopSystem`];
//! every dependent feature then degrades instead of halting.

use log::warn;

use crate::clock::DateTime;
use crate::display::{Glyph, glyphs};
use crate::error::{Peripheral, ServiceError};

/// Network association and time synchronisation.
pub trait NetworkLink {
    /// Returns `true` while associated.
    fn is_connected(&self) -> bool;

    fn connect(&mut self) -> Result<(), ServiceError>;

    fn disconnect(&mut self) -> Result<(), ServiceError>;

    /// Fetches the current time from a network source.
    fn sync_time(&mut self) -> Result<DateTime, ServiceError>;
}

/// Network link for boards without a radio.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoNetwork;

impl NetworkLink for NoNetwork {
    fn is_connected(&self) -> bool {
        false
    }

    fn connect(&mut self) -> Result<(), ServiceError> {
        Err(ServiceError::Unavailable(Peripheral::Network))
    }

    fn disconnect(&mut self) -> Result<(), ServiceError> {
        Err(ServiceError::Unavailable(Peripheral::Network))
    }

    fn sync_time(&mut self) -> Result<DateTime, ServiceError> {
        Err(ServiceError::Unavailable(Peripheral::Network))
    }
}

/// Supply readings used for the battery icon.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PowerStatus {
    pub millivolts: u16,
    pub external_power: bool,
}

/// Battery icon classification.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BatteryLevel {
    Low,
    Medium,
    Full,
    Plugged,
}

/// Below this the battery shows as low.
pub const BATTERY_LOW_MILLIVOLTS: u16 = 3_200;
/// Below this the battery shows as medium.
pub const BATTERY_MEDIUM_MILLIVOLTS: u16 = 3_700;

impl BatteryLevel {
    pub const fn classify(status: PowerStatus) -> Self {
        if status.external_power {
            Self::Plugged
        } else if status.millivolts < BATTERY_LOW_MILLIVOLTS {
            Self::Low
        } else if status.millivolts < BATTERY_MEDIUM_MILLIVOLTS {
            Self::Medium
        } else {
            Self::Full
        }
    }

    pub const fn glyph(self) -> Glyph {
        match self {
            Self::Low => glyphs::BATTERY_LOW,
            Self::Medium => glyphs::BATTERY_MEDIUM,
            Self::Full => glyphs::BATTERY_FULL,
            Self::Plugged => glyphs::BATTERY_PLUGGED,
        }
    }
}

/// Whole-system services: reset and health readings.
pub trait SystemControl {
    /// Restarts the device. Hardware implementations never return.
    fn reset(&mut self);

    /// Latest supply reading, if the board can measure it.
    fn power(&mut self) -> Option<PowerStatus>;

    /// Die temperature in tenths of a degree Celsius.
    fn temperature_decicelsius(&mut self) -> Option<i16>;
}

/// System control for boards without sensors or a reset line.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopSystem;

impl SystemControl for NoopSystem {
    fn reset(&mut self) {
        warn!("reset requested but not supported on this board");
    }

    fn power(&mut self) -> Option<PowerStatus> {
        None
    }

    fn temperature_decicelsius(&mut self) -> Option<i16> {
        None
    }
}
