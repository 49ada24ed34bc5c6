//! Cooperative, priority-ordered task scheduler.
//!
//! Every task is a resumable state machine implementing [`Task`]. A call to
//! [`Scheduler::run_cycle`] walks the registered tasks in ascending priority
//! (registration order breaks ties) and resumes each one whose wake condition
//! has been met. A task keeps the CPU until `resume` returns; the returned
//! [`Control`] is its only suspension point.
//!
//! Wake conditions are judged against the instant the cycle started, so a
//! deadline that expires while another task is running waits for the next
//! cycle. Durations are measured from the moment the task yielded, which keeps
//! periodic tasks from drifting when earlier tasks run long.

use core::fmt;
use core::time::Duration;

use heapless::Vec;
use log::{debug, error, info};

use crate::error::Error;

mod time;

pub use time::{Instant, Monotonic, Sleeper};

/// Maximum number of tasks a default scheduler can hold.
pub const MAX_TASKS: usize = 8;

/// Backoff used by [`Scheduler::run_forever`] once every task has finished.
pub const IDLE_BACKOFF: Duration = Duration::from_secs(1);

/// Condition under which a yielding task becomes eligible again.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Wake {
    /// Eligible on the next cycle.
    Ready,
    /// Eligible once the duration has elapsed since the yield.
    After(Duration),
    /// Eligible after the given number of scheduler cycles (zero acts as one).
    AfterTicks(u32),
}

/// Unexpected condition that stops a task for good.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TaskFault {
    reason: &'static str,
}

impl TaskFault {
    pub const fn new(reason: &'static str) -> Self {
        Self { reason }
    }

    pub const fn reason(&self) -> &'static str {
        self.reason
    }
}

impl fmt::Display for TaskFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason)
    }
}

/// Value returned from a task's suspension point.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Control {
    /// Keep the task scheduled under the given wake condition.
    Continue(Wake),
    /// The task ran to completion and is removed from scheduling.
    Done,
    /// The task hit an unexpected condition and is suspended permanently.
    Failed(TaskFault),
}

impl Control {
    /// Shorthand for `Continue(Wake::After(duration))`.
    pub const fn after(duration: Duration) -> Self {
        Self::Continue(Wake::After(duration))
    }

    /// Shorthand for `Continue(Wake::Ready)`.
    pub const fn ready() -> Self {
        Self::Continue(Wake::Ready)
    }
}

/// Resumable unit of work driven by the [`Scheduler`].
///
/// `C` is the shared context handed to every task on each resume.
pub trait Task<C> {
    /// Runs the task until its next suspension point.
    fn resume(&mut self, ctx: &mut C, now: Instant) -> Control;
}

/// Registration metadata for a task.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TaskSpec {
    pub name: &'static str,
    /// Lower values run earlier within a cycle.
    pub priority: u8,
}

impl TaskSpec {
    pub const fn new(name: &'static str, priority: u8) -> Self {
        Self { name, priority }
    }
}

/// Scheduling state of a registered task.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TaskState {
    /// Eligible on the next cycle.
    Runnable,
    /// Eligible once a cycle starts at or after the deadline.
    Sleeping(Instant),
    /// Eligible once the scheduler reaches the given cycle number.
    WaitingCycles(u64),
    /// Returned [`Control::Done`].
    Completed,
    /// Returned [`Control::Failed`].
    Faulted(TaskFault),
}

impl TaskState {
    /// Returns `true` while the task can still be resumed.
    pub const fn is_live(self) -> bool {
        !matches!(self, Self::Completed | Self::Faulted(_))
    }
}

/// Read-only view of a registered task.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TaskInfo {
    pub spec: TaskSpec,
    pub state: TaskState,
    pub resumes: u32,
}

/// Errors surfaced while registering tasks.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SchedulerError {
    /// The scheduler has no free task slots.
    RegistryFull,
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RegistryFull => f.write_str("task registry full"),
        }
    }
}

impl core::error::Error for SchedulerError {}

/// Summary of a single scheduler cycle.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct CycleReport {
    pub cycle: u64,
    pub started_at: Instant,
    pub resumed: u8,
    pub completed: u8,
    pub faulted: u8,
}

/// Earliest point at which another cycle has work to do.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum NextWake {
    /// At least one task is eligible on the very next cycle.
    Immediate,
    /// No task is eligible before this instant.
    At(Instant),
    /// Every task has completed or faulted.
    Idle,
}

struct Slot<'t, C> {
    spec: TaskSpec,
    state: TaskState,
    resumes: u32,
    task: &'t mut dyn Task<C>,
}

impl<C> Slot<'_, C> {
    fn is_due(&self, started_at: Instant, cycle: u64) -> bool {
        match self.state {
            TaskState::Runnable => true,
            TaskState::Sleeping(deadline) => deadline <= started_at,
            TaskState::WaitingCycles(target) => cycle >= target,
            TaskState::Completed | TaskState::Faulted(_) => false,
        }
    }

    fn fault_error(&self, fault: TaskFault) -> Error {
        Error::SchedulerTaskFault {
            task: self.spec.name,
            fault,
        }
    }

    fn info(&self) -> TaskInfo {
        TaskInfo {
            spec: self.spec,
            state: self.state,
            resumes: self.resumes,
        }
    }
}

/// Single-threaded cooperative scheduler over borrowed tasks.
pub struct Scheduler<'t, C, const N: usize = MAX_TASKS> {
    slots: Vec<Slot<'t, C>, N>,
    cycle: u64,
}

impl<'t, C, const N: usize> Scheduler<'t, C, N> {
    /// Creates an empty scheduler.
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            cycle: 0,
        }
    }

    /// Registers a task; it is eligible on the next cycle.
    ///
    /// Tasks sharing a priority keep their registration order.
    pub fn register(
        &mut self,
        spec: TaskSpec,
        task: &'t mut dyn Task<C>,
    ) -> Result<(), SchedulerError> {
        let index = self
            .slots
            .iter()
            .position(|slot| slot.spec.priority > spec.priority)
            .unwrap_or(self.slots.len());
        let slot = Slot {
            spec,
            state: TaskState::Runnable,
            resumes: 0,
            task,
        };
        self.slots
            .insert(index, slot)
            .map_err(|_| SchedulerError::RegistryFull)?;
        debug!(
            "registered task `{}` at priority {}",
            spec.name, spec.priority
        );
        Ok(())
    }

    /// Number of cycles run so far.
    pub const fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Number of registered tasks, finished ones included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Iterates registered tasks in execution order.
    pub fn tasks(&self) -> impl Iterator<Item = TaskInfo> + '_ {
        self.slots.iter().map(Slot::info)
    }

    /// Looks up a task by name.
    pub fn task(&self, name: &str) -> Option<TaskInfo> {
        self.tasks().find(|info| info.spec.name == name)
    }

    /// Every task suspended by a fault, as appliance errors.
    pub fn faults(&self) -> impl Iterator<Item = Error> + '_ {
        self.slots.iter().filter_map(|slot| match slot.state {
            TaskState::Faulted(fault) => Some(slot.fault_error(fault)),
            _ => None,
        })
    }

    /// Runs one pass over every eligible task.
    pub fn run_cycle<M>(&mut self, ctx: &mut C, clock: &M) -> CycleReport
    where
        M: Monotonic + ?Sized,
    {
        self.cycle = self.cycle.wrapping_add(1);
        let cycle = self.cycle;
        let started_at = clock.now();
        let mut report = CycleReport {
            cycle,
            started_at,
            ..CycleReport::default()
        };

        for slot in &mut self.slots {
            if !slot.is_due(started_at, cycle) {
                continue;
            }

            let control = slot.task.resume(ctx, clock.now());
            let yielded_at = clock.now();
            slot.resumes = slot.resumes.saturating_add(1);
            report.resumed = report.resumed.saturating_add(1);

            slot.state = match control {
                Control::Continue(Wake::Ready) => TaskState::Runnable,
                Control::Continue(Wake::After(delay)) => TaskState::Sleeping(yielded_at + delay),
                Control::Continue(Wake::AfterTicks(ticks)) => {
                    TaskState::WaitingCycles(cycle.saturating_add(u64::from(ticks.max(1))))
                }
                Control::Done => {
                    info!("task `{}` completed", slot.spec.name);
                    report.completed = report.completed.saturating_add(1);
                    TaskState::Completed
                }
                Control::Failed(fault) => {
                    error!("{}", slot.fault_error(fault));
                    report.faulted = report.faulted.saturating_add(1);
                    TaskState::Faulted(fault)
                }
            };
        }

        report
    }

    /// Reports when the next cycle has work to do.
    pub fn next_wake(&self) -> NextWake {
        let mut earliest: Option<Instant> = None;
        for slot in &self.slots {
            match slot.state {
                TaskState::Runnable | TaskState::WaitingCycles(_) => return NextWake::Immediate,
                TaskState::Sleeping(deadline) => {
                    earliest = Some(earliest.map_or(deadline, |current| current.min(deadline)));
                }
                TaskState::Completed | TaskState::Faulted(_) => {}
            }
        }
        earliest.map_or(NextWake::Idle, NextWake::At)
    }

    /// Runs cycles until the clock reaches `deadline`, sleeping between them.
    ///
    /// Tasks that keep yielding [`Wake::Ready`] run back to back; with a
    /// simulated clock that never advances on its own this would not return.
    pub fn run_until<M: Sleeper>(&mut self, ctx: &mut C, clock: &mut M, deadline: Instant) {
        while clock.now() < deadline {
            self.run_cycle(ctx, &*clock);
            match self.next_wake() {
                NextWake::Immediate => {}
                NextWake::At(wake) => clock.sleep_until(wake.min(deadline)),
                NextWake::Idle => clock.sleep_until(deadline),
            }
        }
    }

    /// Runs the scheduler for the lifetime of the device.
    pub fn run_forever<M: Sleeper>(&mut self, ctx: &mut C, clock: &mut M) -> ! {
        loop {
            self.run_cycle(ctx, &*clock);
            match self.next_wake() {
                NextWake::Immediate => {}
                NextWake::At(wake) => clock.sleep_until(wake),
                NextWake::Idle => {
                    let wake = clock.now() + IDLE_BACKOFF;
                    clock.sleep_until(wake);
                }
            }
        }
    }
}

impl<C, const N: usize> Default for Scheduler<'_, C, N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    struct Counter {
        wake: Wake,
    }

    impl Task<u32> for Counter {
        fn resume(&mut self, ctx: &mut u32, _now: Instant) -> Control {
            *ctx += 1;
            Control::Continue(self.wake)
        }
    }

    struct FixedClock(Cell<Instant>);

    impl Monotonic for FixedClock {
        fn now(&self) -> Instant {
            self.0.get()
        }
    }

    #[test]
    fn registry_reports_capacity() {
        let mut first = Counter { wake: Wake::Ready };
        let mut second = Counter { wake: Wake::Ready };
        let mut scheduler: Scheduler<'_, u32, 1> = Scheduler::new();
        scheduler
            .register(TaskSpec::new("first", 1), &mut first)
            .unwrap();
        assert_eq!(
            scheduler.register(TaskSpec::new("second", 1), &mut second),
            Err(SchedulerError::RegistryFull)
        );
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn zero_ticks_waits_one_cycle() {
        let clock = FixedClock(Cell::new(Instant::ZERO));
        let mut task = Counter {
            wake: Wake::AfterTicks(0),
        };
        let mut scheduler: Scheduler<'_, u32> = Scheduler::new();
        scheduler
            .register(TaskSpec::new("ticks", 1), &mut task)
            .unwrap();

        let mut runs = 0;
        scheduler.run_cycle(&mut runs, &clock);
        scheduler.run_cycle(&mut runs, &clock);
        scheduler.run_cycle(&mut runs, &clock);
        assert_eq!(runs, 3);
    }

    #[test]
    fn next_wake_tracks_earliest_sleeper() {
        let clock = FixedClock(Cell::new(Instant::ZERO));
        let mut slow = Counter {
            wake: Wake::After(Duration::from_millis(40)),
        };
        let mut fast = Counter {
            wake: Wake::After(Duration::from_millis(15)),
        };
        let mut scheduler: Scheduler<'_, u32> = Scheduler::new();
        scheduler
            .register(TaskSpec::new("slow", 1), &mut slow)
            .unwrap();
        scheduler
            .register(TaskSpec::new("fast", 2), &mut fast)
            .unwrap();

        assert_eq!(scheduler.next_wake(), NextWake::Immediate);
        let mut runs = 0;
        scheduler.run_cycle(&mut runs, &clock);
        assert_eq!(
            scheduler.next_wake(),
            NextWake::At(Instant::from_millis(15))
        );
    }
}
