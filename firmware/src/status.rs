#![cfg_attr(not(target_os = "none"), allow(dead_code))]

//! Shared readings for the firmware target.
//!
//! The power task publishes battery, VBUS and die-temperature samples through
//! lightweight atomics; the clock face reads them back via the board's system
//! control without sharing the ADC.

use clock_core::services::PowerStatus;
use portable_atomic::{AtomicBool, AtomicI32, AtomicU32, Ordering};

const UNKNOWN_BATTERY: u32 = 0;
const UNKNOWN_TEMPERATURE: i32 = i32::MIN;

/// Cell voltage in millivolts (0 == unknown).
static BATTERY_MV: AtomicU32 = AtomicU32::new(UNKNOWN_BATTERY);
/// Die temperature in tenths of a degree Celsius.
static TEMPERATURE_DC: AtomicI32 = AtomicI32::new(UNKNOWN_TEMPERATURE);
/// Whether VBUS is present.
static EXTERNAL_POWER: AtomicBool = AtomicBool::new(false);

/// Stores the latest cell voltage (`None` marks unknown).
pub fn record_battery_sample(millivolts: Option<u16>) {
    let stored = millivolts.map_or(UNKNOWN_BATTERY, u32::from);
    BATTERY_MV.store(stored, Ordering::Relaxed);
}

/// Returns the most recent cell voltage, if any.
pub fn battery_sample() -> Option<u16> {
    match BATTERY_MV.load(Ordering::Relaxed) {
        UNKNOWN_BATTERY => None,
        value => u16::try_from(value).ok(),
    }
}

pub fn record_external_power(present: bool) {
    EXTERNAL_POWER.store(present, Ordering::Relaxed);
}

pub fn record_temperature(decicelsius: Option<i16>) {
    let stored = decicelsius.map_or(UNKNOWN_TEMPERATURE, i32::from);
    TEMPERATURE_DC.store(stored, Ordering::Relaxed);
}

pub fn temperature() -> Option<i16> {
    match TEMPERATURE_DC.load(Ordering::Relaxed) {
        UNKNOWN_TEMPERATURE => None,
        value => i16::try_from(value).ok(),
    }
}

/// Supply state for the status row, once a battery sample exists.
pub fn power_status() -> Option<PowerStatus> {
    battery_sample().map(|millivolts| PowerStatus {
        millivolts,
        external_power: EXTERNAL_POWER.load(Ordering::Relaxed),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // The cells are process-wide, so one test walks through every transition.
    #[test]
    fn readings_round_trip_through_the_cells() {
        assert_eq!(power_status(), None);
        assert_eq!(temperature(), None);

        record_battery_sample(Some(3_910));
        record_external_power(true);
        record_temperature(Some(-45));
        assert_eq!(
            power_status(),
            Some(PowerStatus {
                millivolts: 3_910,
                external_power: true,
            })
        );
        assert_eq!(temperature(), Some(-45));

        record_battery_sample(None);
        record_temperature(None);
        assert_eq!(power_status(), None);
        assert_eq!(temperature(), None);
    }
}
