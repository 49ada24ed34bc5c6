//! Whole-appliance runs on a simulated clock.

mod common;

use core::time::Duration;

use clock_core::appliance::Appliance;
use clock_core::clock::DateTime;
use clock_core::config::Config;
use clock_core::input::{Button, ButtonSet};
use clock_core::menu::tree::ROOT_MENU;
use clock_core::error::Error;
use clock_core::scheduler::{Instant, Monotonic, Scheduler, TaskFault, TaskState};
use clock_core::tasks::{
    CLOCK_TASK, IDLE_TASK, PERSIST_TASK, PROCESS_TASK, RENDER_TASK, TaskSet,
};
use common::{ManualClock, MockBoard, MockStore, appliance, hardware};

type AppScheduler<'t> = Scheduler<'t, Appliance<MockBoard>>;

const LAST_AWAKE_POLL_US: u64 = 199 * 16_667;

fn ms(millis: u64) -> Instant {
    Instant::from_millis(millis)
}

/// Holds `button` for 100 ms, then releases it for 100 ms.
fn tap(
    app: &mut Appliance<MockBoard>,
    scheduler: &mut AppScheduler<'_>,
    clock: &mut ManualClock,
    button: Button,
) {
    app.input_mut().levels = ButtonSet::of(button);
    let released_at = clock.now() + Duration::from_millis(100);
    scheduler.run_until(app, clock, released_at);
    app.input_mut().levels = ButtonSet::EMPTY;
    let settled_at = clock.now() + Duration::from_millis(100);
    scheduler.run_until(app, clock, settled_at);
}

#[test]
fn boot_lights_the_panel_and_draws_the_clock() {
    let mut app = appliance();
    let mut clock = ManualClock::default();
    let mut tasks = TaskSet::new(&ROOT_MENU);
    let mut scheduler = AppScheduler::new();
    tasks.register(&mut scheduler).unwrap();

    scheduler.run_until(&mut app, &mut clock, ms(100));
    let display = app.display();
    assert_eq!(display.backlight, Some(true));
    assert_eq!(display.row(0), "                  \u{1} ");
    assert_eq!(display.row(1), "2024-11-04  21:30:00");
    assert!(display.glyphs[1].is_some());
}

#[test]
fn clock_face_follows_the_wall_clock() {
    let mut app = appliance();
    let mut clock = ManualClock::default();
    let mut tasks = TaskSet::new(&ROOT_MENU);
    let mut scheduler = AppScheduler::new();
    tasks.register(&mut scheduler).unwrap();

    scheduler.run_until(&mut app, &mut clock, ms(3_100));
    assert_eq!(app.display().row(1), "2024-11-04  21:30:03");
}

#[test]
fn unchanged_rows_are_not_rewritten() {
    let mut app = appliance();
    let mut clock = ManualClock::default();
    let mut tasks = TaskSet::new(&ROOT_MENU);
    let mut scheduler = AppScheduler::new();
    tasks.register(&mut scheduler).unwrap();

    scheduler.run_until(&mut app, &mut clock, ms(100));
    let writes = app.display().row_writes;
    scheduler.run_until(&mut app, &mut clock, ms(900));
    assert_eq!(app.display().row_writes, writes);
    scheduler.run_until(&mut app, &mut clock, ms(1_100));
    assert_eq!(app.display().row_writes, writes + 1);
}

#[test]
fn display_sleeps_on_the_two_hundredth_idle_poll() {
    let mut app = appliance();
    let mut clock = ManualClock::default();
    let mut tasks = TaskSet::new(&ROOT_MENU);
    let mut scheduler = AppScheduler::new();
    tasks.register(&mut scheduler).unwrap();

    scheduler.run_until(&mut app, &mut clock, Instant::from_micros(LAST_AWAKE_POLL_US));
    assert!(!app.idle().is_asleep());
    assert_eq!(app.idle().ticks_since_input(), 199);

    scheduler.run_until(&mut app, &mut clock, Instant::from_micros(LAST_AWAKE_POLL_US + 1));
    assert!(app.idle().is_asleep());
    assert_eq!(app.display().backlight, Some(false));
}

#[test]
fn presses_restart_the_idle_count() {
    let mut app = appliance();
    let mut clock = ManualClock::default();
    let mut tasks = TaskSet::new(&ROOT_MENU);
    let mut scheduler = AppScheduler::new();
    tasks.register(&mut scheduler).unwrap();

    scheduler.run_until(&mut app, &mut clock, ms(3_000));
    app.input_mut().levels = ButtonSet::of(Button::Down);
    scheduler.run_until(&mut app, &mut clock, ms(3_050));
    app.input_mut().levels = ButtonSet::EMPTY;
    scheduler.run_until(&mut app, &mut clock, ms(5_000));
    assert!(!app.idle().is_asleep());
    assert_eq!(app.display().backlight, Some(true));
}

#[test]
fn waking_press_does_not_navigate() {
    let mut app = appliance();
    let mut clock = ManualClock::default();
    let mut tasks = TaskSet::new(&ROOT_MENU);
    let mut scheduler = AppScheduler::new();
    tasks.register(&mut scheduler).unwrap();

    scheduler.run_until(&mut app, &mut clock, ms(4_000));
    assert!(app.idle().is_asleep());

    app.input_mut().levels = ButtonSet::of(Button::Mode);
    scheduler.run_until(&mut app, &mut clock, ms(4_600));
    app.input_mut().levels = ButtonSet::EMPTY;
    scheduler.run_until(&mut app, &mut clock, ms(5_200));
    assert_eq!(app.display().backlight, Some(true));
    assert!(app.display().row(1).starts_with("2024-11-04"));

    app.input_mut().levels = ButtonSet::of(Button::Mode);
    scheduler.run_until(&mut app, &mut clock, ms(5_300));
    app.input_mut().levels = ButtonSet::EMPTY;
    scheduler.run_until(&mut app, &mut clock, ms(5_400));
    assert!(app.display().row(0).starts_with("\u{0} Settings"));
}

#[test]
fn held_button_navigates_once() {
    let mut app = appliance();
    let mut clock = ManualClock::default();
    let mut tasks = TaskSet::new(&ROOT_MENU);
    let mut scheduler = AppScheduler::new();
    tasks.register(&mut scheduler).unwrap();

    scheduler.run_until(&mut app, &mut clock, ms(100));
    app.input_mut().levels = ButtonSet::of(Button::Mode);
    scheduler.run_until(&mut app, &mut clock, ms(1_000));
    assert!(app.display().row(0).starts_with("\u{0} Settings"));

    app.input_mut().levels = ButtonSet::EMPTY;
    scheduler.run_until(&mut app, &mut clock, ms(1_100));
    app.input_mut().levels = ButtonSet::of(Button::Down);
    scheduler.run_until(&mut app, &mut clock, ms(1_500));
    assert!(app.display().row(1).starts_with("\u{0} Set clock"));
}

#[test]
fn saved_time_is_restored_and_persisted() {
    let saved = DateTime::new(2025, 7, 1, 6, 45, 0).unwrap();
    let mut hw = hardware();
    hw.store = MockStore::with_card(Some(saved));
    let mut app = Appliance::new(hw, Config::default());
    let mut clock = ManualClock::default();
    let mut tasks = TaskSet::new(&ROOT_MENU);
    let mut scheduler = AppScheduler::new();
    tasks.register(&mut scheduler).unwrap();

    scheduler.run_until(&mut app, &mut clock, ms(2_500));
    assert_eq!(app.snapshot(), saved.add_seconds(2));
    assert_eq!(app.store().saves, 3);
    assert_eq!(app.store().saved, Some(saved.add_seconds(2)));
    assert_eq!(app.display().row(1), "2025-07-01  06:45:02");
}

#[test]
fn persistence_stops_without_storage() {
    let mut app = appliance();
    let mut clock = ManualClock::default();
    let mut tasks = TaskSet::new(&ROOT_MENU);
    let mut scheduler = AppScheduler::new();
    tasks.register(&mut scheduler).unwrap();

    scheduler.run_until(&mut app, &mut clock, ms(3_000));
    let persist = scheduler.task(PERSIST_TASK.name).unwrap();
    assert_eq!(persist.state, TaskState::Completed);
    assert_eq!(persist.resumes, 1);
    assert_eq!(app.store().saves, 0);
}

#[test]
fn dead_display_suspends_only_the_render_task() {
    let mut hw = hardware();
    hw.display.failing = true;
    let mut app = Appliance::new(hw, Config::default());
    let mut clock = ManualClock::default();
    let mut tasks = TaskSet::new(&ROOT_MENU);
    let mut scheduler = AppScheduler::new();
    tasks.register(&mut scheduler).unwrap();

    scheduler.run_until(&mut app, &mut clock, ms(500));
    let render = scheduler.task(RENDER_TASK.name).unwrap();
    assert!(matches!(render.state, TaskState::Faulted(_)));
    assert!(render.resumes >= 3);

    let process = scheduler.task(PROCESS_TASK.name).unwrap();
    assert!(process.state.is_live());
    assert!(process.resumes > 20);

    let faults: Vec<Error> = scheduler.faults().collect();
    assert_eq!(
        faults,
        vec![Error::SchedulerTaskFault {
            task: "render",
            fault: TaskFault::new("display not responding"),
        }]
    );
    assert_eq!(
        faults[0].to_string(),
        "task `render` faulted: display not responding"
    );

    scheduler.run_until(&mut app, &mut clock, ms(2_500));
    assert!(scheduler.task(IDLE_TASK.name).unwrap().state.is_live());
    assert!(scheduler.task(CLOCK_TASK.name).unwrap().state.is_live());
    assert_eq!(app.snapshot(), DateTime::new(2024, 11, 4, 21, 30, 2).unwrap());
    assert_eq!(scheduler.faults().count(), 1);
}

#[test]
fn reset_from_the_menu_reaches_the_system() {
    let mut app = appliance();
    let mut clock = ManualClock::default();
    let mut tasks = TaskSet::new(&ROOT_MENU);
    let mut scheduler = AppScheduler::new();
    tasks.register(&mut scheduler).unwrap();
    scheduler.run_until(&mut app, &mut clock, ms(100));

    tap(&mut app, &mut scheduler, &mut clock, Button::Mode);
    tap(&mut app, &mut scheduler, &mut clock, Button::Select);
    for _ in 0..6 {
        tap(&mut app, &mut scheduler, &mut clock, Button::Down);
    }
    tap(&mut app, &mut scheduler, &mut clock, Button::Select);
    assert_eq!(app.display().row(0).trim_end(), "Resetting...");
    assert_eq!(app.system().resets, 0);

    for _ in 0..15 {
        tap(&mut app, &mut scheduler, &mut clock, Button::Up);
    }
    assert_eq!(app.system().resets, 1);
}
