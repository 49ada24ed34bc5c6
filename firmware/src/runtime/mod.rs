use cortex_m::interrupt;
use cortex_m::register::primask;
use critical_section::{self, RawRestoreState};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_stm32 as hal;
use embassy_stm32::adc::Adc;
use embassy_stm32::gpio::{Input, Pull};
use embassy_stm32::i2c::{self, I2c};
use embassy_stm32::time::Hertz;
use embassy_time::Delay;
use log::{LevelFilter, error, info};
use static_cell::StaticCell;

use clock_core::appliance::{Appliance, Hardware};
use clock_core::clock::{NoTimeStore, SoftClock};
use clock_core::config::Config;
use clock_core::menu::tree::ROOT_MENU;
use clock_core::services::NoNetwork;
use clock_core::tasks::TaskSet;

use crate::board::ClockBoard;
use crate::hw::power::PowerAdc;
use crate::hw::{Buttons, McuSystem};
use crate::lcd::{self, Hd44780};
use crate::logger;

mod clock_task;
mod power_task;

const LCD_BUS_HZ: u32 = 100_000;

critical_section::set_impl!(InterruptCriticalSection);

struct InterruptCriticalSection;

unsafe impl critical_section::Impl for InterruptCriticalSection {
    unsafe fn acquire() -> RawRestoreState {
        let primask = primask::read();
        interrupt::disable();
        primask.is_active()
    }

    unsafe fn release(restore_state: RawRestoreState) {
        if restore_state {
            unsafe {
                interrupt::enable();
            }
        }
    }
}

static APPLIANCE: StaticCell<Appliance<ClockBoard>> = StaticCell::new();
static TASKS: StaticCell<TaskSet> = StaticCell::new();

#[embassy_executor::main]
pub async fn main(spawner: Spawner) {
    logger::init(LevelFilter::Info);

    let config = hal::Config::default();
    let hal::Peripherals {
        ADC1,
        I2C1,
        PA0,
        PA1,
        PA2,
        PA3,
        PA4,
        PA5,
        PA9,
        PB6,
        PB7,
        ..
    } = hal::init(config);

    let mut bus_config = i2c::Config::default();
    bus_config.frequency = Hertz(LCD_BUS_HZ);
    let bus = I2c::new_blocking(I2C1, PB6, PB7, bus_config);
    let mut display = Hd44780::new(bus, Delay, lcd::DEFAULT_ADDRESS);
    if let Err(err) = display.init() {
        error!("LCD init failed: {err:?}");
    }

    let buttons = Buttons::new(
        Input::new(PA0, Pull::Up),
        Input::new(PA1, Pull::Up),
        Input::new(PA2, Pull::Up),
        Input::new(PA3, Pull::Up),
        Input::new(PA4, Pull::Up),
    );

    let hardware = Hardware {
        input: buttons,
        display,
        clock: SoftClock::default(),
        store: NoTimeStore,
        network: NoNetwork,
        system: McuSystem,
    };
    let appliance = APPLIANCE.init(Appliance::new(hardware, Config::default()));
    let tasks = TASKS.init(TaskSet::new(&ROOT_MENU));
    info!("clock starting");

    spawner
        .spawn(power_task::run(
            PowerAdc::new(Adc::new(ADC1), PA5),
            Input::new(PA9, Pull::Down),
        ))
        .expect("failed to spawn power task");

    spawner
        .spawn(clock_task::run(appliance, tasks))
        .expect("failed to spawn clock task");

    core::future::pending::<()>().await;
}
