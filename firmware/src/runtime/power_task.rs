use embassy_stm32::gpio::Input;
use embassy_time::{Duration, Ticker};
use log::warn;

use crate::hw::power::PowerAdc;
use crate::status;

const SAMPLE_PERIOD: Duration = Duration::from_secs(5);

/// Samples the battery, VBUS and die temperature into the status cells.
#[embassy_executor::task]
pub async fn run(mut adc: PowerAdc<'static>, vbus: Input<'static>) -> ! {
    let mut ticker = Ticker::every(SAMPLE_PERIOD);
    loop {
        if let Some(sample) = adc.sample() {
            if sample.battery_mv.is_none() {
                warn!("battery reading out of range at VDD {} mV", sample.vdd_mv);
            }
            status::record_battery_sample(sample.battery_mv);
            status::record_temperature(Some(sample.temperature_dc));
        } else {
            warn!("VREFINT read back zero");
            status::record_battery_sample(None);
        }
        status::record_external_power(vbus.is_high());
        ticker.next().await;
    }
}
