#![cfg_attr(not(target_os = "none"), allow(dead_code))]

//! Supply, battery and die-temperature sampling on the STM32G0 ADC.
//!
//! VDD is derived from the internal voltage reference against its factory
//! calibration; the temperature sensor reading is rescaled to the calibration
//! supply before applying the datasheet slope. The cell is read on PA5 behind
//! a resistor divider, so its reading is scaled by VDD and the divider ratio.

/// Supply voltage the factory calibration values were taken at.
const CALIBRATION_MV: i64 = 3_000;
const FULL_SCALE: i64 = 4_095;
/// Temperature at which `TS_CAL1` was taken.
const TS_CAL1_DECICELSIUS: i64 = 300;
/// Sensor slope, 2.5 mV/°C, in microvolts per tenth of a degree.
const SLOPE_UV_PER_DECICELSIUS: i64 = 250;
/// The battery sense pin sits on a 1:1 divider and sees half the cell voltage.
pub const BATTERY_DIVIDER: u16 = 2;

/// Supply voltage implied by a VREFINT reading.
pub fn supply_millivolts(vrefint_cal: u16, reading: u16) -> Option<u16> {
    if reading == 0 {
        return None;
    }
    let millivolts = CALIBRATION_MV * i64::from(vrefint_cal) / i64::from(reading);
    u16::try_from(millivolts).ok()
}

/// Die temperature in tenths of a degree for a sensor reading taken at
/// `vdd_mv`.
pub fn die_temperature_decicelsius(ts_cal1: u16, reading: u16, vdd_mv: u16) -> i16 {
    let sensed_uv = i64::from(reading) * i64::from(vdd_mv) * 1_000 / FULL_SCALE;
    let calibrated_uv = i64::from(ts_cal1) * CALIBRATION_MV * 1_000 / FULL_SCALE;
    let tenths = (sensed_uv - calibrated_uv) / SLOPE_UV_PER_DECICELSIUS + TS_CAL1_DECICELSIUS;
    let clamped = tenths.clamp(i64::from(i16::MIN), i64::from(i16::MAX));
    i16::try_from(clamped).unwrap_or_default()
}

/// Cell voltage behind a `divider`:1 divider for a reading taken at `vdd_mv`.
pub fn battery_millivolts(reading: u16, vdd_mv: u16, divider: u16) -> Option<u16> {
    let sensed = i64::from(reading) * i64::from(vdd_mv) / FULL_SCALE;
    u16::try_from(sensed * i64::from(divider)).ok()
}

/// One supply, battery and temperature sample.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PowerSample {
    pub vdd_mv: u16,
    pub battery_mv: Option<u16>,
    pub temperature_dc: i16,
}

#[cfg(target_os = "none")]
pub use adc::PowerAdc;

#[cfg(target_os = "none")]
mod adc {
    use core::ptr;

    use embassy_stm32::Peri;
    use embassy_stm32::adc::{Adc, SampleTime, Temperature, VrefInt};
    use embassy_stm32::peripherals::{ADC1, PA5};

    use super::{
        BATTERY_DIVIDER, PowerSample, battery_millivolts, die_temperature_decicelsius,
        supply_millivolts,
    };

    /// Factory VREFINT reading at 3.0 V.
    const VREFINT_CAL_ADDR: *const u16 = 0x1FFF_75AA as *const u16;
    /// Factory temperature-sensor reading at 30 °C and 3.0 V.
    const TS_CAL1_ADDR: *const u16 = 0x1FFF_75A8 as *const u16;

    fn read_calibration(address: *const u16) -> u16 {
        // SAFETY: both addresses lie in the system-memory calibration area,
        // which is always mapped and read-only.
        unsafe { ptr::read_volatile(address) }
    }

    /// Embassy ADC wrapper reading VREFINT, the temperature sensor and the
    /// battery divider.
    pub struct PowerAdc<'d> {
        adc: Adc<'d, ADC1>,
        vrefint: VrefInt,
        temperature: Temperature,
        battery: Peri<'d, PA5>,
        discard_next: bool,
    }

    impl<'d> PowerAdc<'d> {
        /// Enables the internal channels with the slow sample time they need.
        pub fn new(mut adc: Adc<'d, ADC1>, battery: Peri<'d, PA5>) -> Self {
            adc.set_sample_time(SampleTime::CYCLES160_5);
            let vrefint = adc.enable_vrefint();
            let temperature = adc.enable_temperature();
            Self {
                adc,
                vrefint,
                temperature,
                battery,
                discard_next: true,
            }
        }

        pub fn sample(&mut self) -> Option<PowerSample> {
            if self.discard_next {
                let _ = self.adc.blocking_read(&mut self.vrefint);
                self.discard_next = false;
            }

            let vrefint = self.adc.blocking_read(&mut self.vrefint);
            let sensor = self.adc.blocking_read(&mut self.temperature);
            let cell = self.adc.blocking_read(&mut self.battery);
            let vdd_mv = supply_millivolts(read_calibration(VREFINT_CAL_ADDR), vrefint)?;
            Some(PowerSample {
                vdd_mv,
                battery_mv: battery_millivolts(cell, vdd_mv, BATTERY_DIVIDER),
                temperature_dc: die_temperature_decicelsius(
                    read_calibration(TS_CAL1_ADDR),
                    sensor,
                    vdd_mv,
                ),
            })
        }
    }
}
