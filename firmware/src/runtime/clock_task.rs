use clock_core::appliance::Appliance;
use clock_core::scheduler::{IDLE_BACKOFF, Instant, Monotonic, NextWake, Scheduler};
use clock_core::tasks::TaskSet;
use embassy_futures::yield_now;
use embassy_time::Timer;
use log::error;

use crate::board::ClockBoard;

/// Monotonic time from the embassy time driver.
struct EmbassyClock;

impl Monotonic for EmbassyClock {
    fn now(&self) -> Instant {
        Instant::from_micros(embassy_time::Instant::now().as_micros())
    }
}

fn to_embassy(instant: Instant) -> embassy_time::Instant {
    embassy_time::Instant::from_micros(instant.as_micros())
}

/// Drives the cooperative scheduler, parking on the time driver between cycles.
#[embassy_executor::task]
pub async fn run(app: &'static mut Appliance<ClockBoard>, tasks: &'static mut TaskSet) -> ! {
    let mut scheduler: Scheduler<'static, Appliance<ClockBoard>> = Scheduler::new();
    if let Err(err) = tasks.register(&mut scheduler) {
        error!("task registration failed: {err}");
    }

    let clock = EmbassyClock;
    loop {
        scheduler.run_cycle(app, &clock);
        match scheduler.next_wake() {
            NextWake::Immediate => yield_now().await,
            NextWake::At(deadline) => Timer::at(to_embassy(deadline)).await,
            NextWake::Idle => Timer::at(to_embassy(clock.now() + IDLE_BACKOFF)).await,
        }
    }
}
