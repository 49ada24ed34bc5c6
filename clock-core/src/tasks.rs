//! The appliance's scheduled tasks.
//!
//! | task            | priority | role                                        |
//! |-----------------|----------|---------------------------------------------|
//! | `boot_restore`  | 0        | one-shot: restore saved time, backlight on  |
//! | `render`        | 1        | drain the display buffer onto the LCD       |
//! | `clock_refresh` | 2        | advance the clock and refresh the snapshot  |
//! | `persist_time`  | 10       | save the clock until storage is unavailable |
//! | `process`       | 20       | buttons -> menu state machine -> frames     |
//! | `idle_monitor`  | 30       | backlight timeout                           |
//!
//! Render and process coarsen to the sleep poll while the display sleeps; the
//! idle monitor keeps its normal cadence so a press wakes the panel promptly.

use log::{info, warn};

use crate::appliance::{Appliance, Board};
use crate::clock::TimeStore;
use crate::display::{DisplaySink, Renderer};
use crate::error::{Error, ServiceError};
use crate::idle::IdleTransition;
use crate::input::{ButtonSet, EdgeDetector, InputSource};
use crate::menu::{MenuNode, MenuStateMachine};
use crate::scheduler::{Control, Instant, Scheduler, SchedulerError, Task, TaskFault, TaskSpec};

pub const BOOT_TASK: TaskSpec = TaskSpec::new("boot_restore", 0);
pub const RENDER_TASK: TaskSpec = TaskSpec::new("render", 1);
pub const CLOCK_TASK: TaskSpec = TaskSpec::new("clock_refresh", 2);
pub const PERSIST_TASK: TaskSpec = TaskSpec::new("persist_time", 10);
pub const PROCESS_TASK: TaskSpec = TaskSpec::new("process", 20);
pub const IDLE_TASK: TaskSpec = TaskSpec::new("idle_monitor", 30);

/// Consecutive failed flushes after which the render task gives up.
pub const MAX_DISPLAY_FAILURES: u8 = 3;

/// Restores the persisted time once at startup.
#[derive(Debug, Default)]
pub struct BootTask;

impl<B: Board> Task<Appliance<B>> for BootTask {
    fn resume(&mut self, app: &mut Appliance<B>, now: Instant) -> Control {
        if let Err(err) = app.display_mut().set_backlight(true) {
            warn!("backlight unavailable: {err:?}");
        }
        match app.store_mut().load_time() {
            Ok(time) => {
                info!("restored time {time}");
                app.commit_time(time, now);
            }
            Err(err) => warn!("{}", Error::from(err)),
        }
        Control::Done
    }
}

/// Moves published frames onto the display.
#[derive(Debug, Default)]
pub struct RenderTask {
    renderer: Renderer,
    failures: u8,
}

impl RenderTask {
    pub const fn new() -> Self {
        Self {
            renderer: Renderer::new(),
            failures: 0,
        }
    }
}

impl<B: Board> Task<Appliance<B>> for RenderTask {
    fn resume(&mut self, app: &mut Appliance<B>, _now: Instant) -> Control {
        let config = *app.config();
        if app.idle().is_asleep() {
            return Control::after(config.sleep_poll);
        }

        if let Some(frame) = app.take_frame() {
            match self.renderer.flush(app.display_mut(), &frame) {
                Ok(()) => self.failures = 0,
                Err(err) => {
                    self.failures = self.failures.saturating_add(1);
                    warn!("display write failed ({}): {err:?}", self.failures);
                    if self.failures >= MAX_DISPLAY_FAILURES {
                        return Control::Failed(TaskFault::new("display not responding"));
                    }
                }
            }
        }
        Control::after(config.render_interval)
    }
}

/// Keeps the wall clock and its snapshot current.
#[derive(Debug, Default)]
pub struct ClockRefreshTask;

impl<B: Board> Task<Appliance<B>> for ClockRefreshTask {
    fn resume(&mut self, app: &mut Appliance<B>, now: Instant) -> Control {
        app.refresh_snapshot(now);
        Control::after(app.config().clock_refresh)
    }
}

/// Saves the clock periodically; stops for good without storage.
#[derive(Debug, Default)]
pub struct PersistTimeTask;

impl<B: Board> Task<Appliance<B>> for PersistTimeTask {
    fn resume(&mut self, app: &mut Appliance<B>, _now: Instant) -> Control {
        let time = app.snapshot();
        match app.store_mut().save_time(&time) {
            Ok(()) => {}
            Err(ServiceError::Unavailable(peripheral)) => {
                info!("time persistence disabled: {peripheral} unavailable");
                return Control::Done;
            }
            Err(err) => warn!("saving time failed: {err}"),
        }
        Control::after(app.config().persist_interval)
    }
}

/// Feeds button edges to the menu state machine.
#[derive(Debug)]
pub struct ProcessTask {
    menu: MenuStateMachine,
    edges: EdgeDetector,
    dozing: bool,
}

impl ProcessTask {
    pub const fn new(root: &'static [MenuNode]) -> Self {
        Self {
            menu: MenuStateMachine::new(root),
            edges: EdgeDetector::new(),
            dozing: false,
        }
    }

    pub const fn menu(&self) -> &MenuStateMachine {
        &self.menu
    }
}

impl<B: Board> Task<Appliance<B>> for ProcessTask {
    fn resume(&mut self, app: &mut Appliance<B>, now: Instant) -> Control {
        let levels = app.input().snapshot();
        if app.idle().is_asleep() {
            self.dozing = true;
            self.edges.resync(levels);
            return Control::after(app.config().sleep_poll);
        }

        let edges = if self.dozing {
            // The press that woke the display does not navigate.
            self.dozing = false;
            self.edges.resync(levels);
            ButtonSet::EMPTY
        } else {
            self.edges.update(levels)
        };
        Control::Continue(self.menu.update(app, edges, now))
    }
}

/// Turns the backlight off after a stretch without input.
#[derive(Debug, Default)]
pub struct IdleMonitor;

impl<B: Board> Task<Appliance<B>> for IdleMonitor {
    fn resume(&mut self, app: &mut Appliance<B>, _now: Instant) -> Control {
        let pressed = !app.input().snapshot().is_empty();
        let threshold = app.config().idle_threshold;
        let backlight = match app.idle_mut().observe(pressed, threshold) {
            IdleTransition::Steady => None,
            IdleTransition::FellAsleep => {
                info!("display sleeping");
                Some(false)
            }
            IdleTransition::Woke => {
                info!("display waking");
                Some(true)
            }
        };
        if let Some(on) = backlight
            && let Err(err) = app.display_mut().set_backlight(on)
        {
            warn!("backlight switch failed: {err:?}");
        }
        Control::after(app.config().idle_poll)
    }
}

/// Every appliance task, ready to be lent to a scheduler.
#[derive(Debug)]
pub struct TaskSet {
    boot: BootTask,
    render: RenderTask,
    clock: ClockRefreshTask,
    persist: PersistTimeTask,
    process: ProcessTask,
    idle: IdleMonitor,
}

impl TaskSet {
    pub const fn new(root: &'static [MenuNode]) -> Self {
        Self {
            boot: BootTask,
            render: RenderTask::new(),
            clock: ClockRefreshTask,
            persist: PersistTimeTask,
            process: ProcessTask::new(root),
            idle: IdleMonitor,
        }
    }

    /// Registers every task with `scheduler`.
    pub fn register<'t, B: Board, const N: usize>(
        &'t mut self,
        scheduler: &mut Scheduler<'t, Appliance<B>, N>,
    ) -> Result<(), SchedulerError> {
        scheduler.register(BOOT_TASK, &mut self.boot)?;
        scheduler.register(RENDER_TASK, &mut self.render)?;
        scheduler.register(CLOCK_TASK, &mut self.clock)?;
        scheduler.register(PERSIST_TASK, &mut self.persist)?;
        scheduler.register(PROCESS_TASK, &mut self.process)?;
        scheduler.register(IDLE_TASK, &mut self.idle)?;
        Ok(())
    }
}
