//! Drives the shared task set on the host.

use std::io;
use std::time::Duration;

use clock_core::appliance::{Appliance, Hardware};
use clock_core::config::Config;
use clock_core::input::Button;
use clock_core::scheduler::{
    Instant, Monotonic, NextWake, Scheduler, Sleeper, TaskInfo, TaskState,
};
use clock_core::services::NetworkLink;
use clock_core::tasks::TaskSet;
use log::{debug, info};

use crate::board::HostBoard;
use crate::script::{self, Command, HELP_TOPICS};
use crate::time::VirtualClock;
use crate::transcript::{TranscriptLogger, TranscriptRole};

/// Simulated time a scripted session runs before taking its first command.
const BOOT_SETTLE: Duration = Duration::from_millis(100);
/// How long a scripted tap keeps a button down, and then up.
const TAP_PHASE: Duration = Duration::from_millis(100);

/// The appliance plus the scheduler lending it the task set.
pub struct Emulator<'t> {
    app: Appliance<HostBoard>,
    scheduler: Scheduler<'t, Appliance<HostBoard>>,
}

impl<'t> Emulator<'t> {
    pub fn new(
        tasks: &'t mut TaskSet,
        hardware: Hardware<HostBoard>,
        config: Config,
    ) -> io::Result<Self> {
        let mut scheduler: Scheduler<'t, Appliance<HostBoard>> = Scheduler::new();
        tasks.register(&mut scheduler).map_err(io::Error::other)?;
        info!("{} tasks registered", scheduler.len());
        Ok(Self {
            app: Appliance::new(hardware, config),
            scheduler,
        })
    }

    pub fn app(&self) -> &Appliance<HostBoard> {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut Appliance<HostBoard> {
        &mut self.app
    }

    pub fn run_until<M: Sleeper>(&mut self, clock: &mut M, deadline: Instant) {
        self.scheduler.run_until(&mut self.app, clock, deadline);
    }

    /// One scheduler pass at the clock's current time.
    pub fn run_cycle<M: Monotonic>(&mut self, clock: &M) -> NextWake {
        let report = self.scheduler.run_cycle(&mut self.app, clock);
        if report.faulted > 0 {
            debug!("cycle {} faulted {} task(s)", report.cycle, report.faulted);
        }
        self.scheduler.next_wake()
    }

    pub fn reset_requested(&self) -> bool {
        self.app.system().reset_requested()
    }

    pub fn cycle(&self) -> u64 {
        self.scheduler.cycle()
    }

    pub fn task_lines(&self, now: Instant) -> Vec<String> {
        self.scheduler
            .tasks()
            .map(|task| describe_task(&task, now))
            .collect()
    }
}

/// Line-oriented session on simulated time.
pub struct Session<'t> {
    emulator: Emulator<'t>,
    clock: VirtualClock,
    transcript: Option<TranscriptLogger>,
    finished: bool,
}

impl<'t> Session<'t> {
    pub fn new(
        tasks: &'t mut TaskSet,
        hardware: Hardware<HostBoard>,
        config: Config,
        transcript: Option<TranscriptLogger>,
    ) -> io::Result<Self> {
        let mut session = Self {
            emulator: Emulator::new(tasks, hardware, config)?,
            clock: VirtualClock::default(),
            transcript,
            finished: false,
        };
        session.advance(BOOT_SETTLE);
        Ok(session)
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn handle_command(&mut self, line: &str) -> io::Result<Vec<String>> {
        self.record(TranscriptRole::Host, &[line.to_string()])?;

        let mut lines = match script::parse(line) {
            Ok(command) => self.execute(command),
            Err(err) => vec![format!("ERR {err}")],
        };

        if self.emulator.reset_requested() && !self.finished {
            self.finished = true;
            lines.push("System reset requested; session ended.".to_string());
        }

        self.record(TranscriptRole::Emulator, &lines)?;
        Ok(lines)
    }

    fn execute(&mut self, command: Command) -> Vec<String> {
        match command {
            Command::Press { button, count } => {
                for _ in 0..count {
                    self.tap(button);
                    if self.emulator.reset_requested() {
                        break;
                    }
                }
                self.screen()
            }
            Command::Hold { button, duration } => {
                self.emulator.app_mut().input_mut().press(button);
                self.advance(duration);
                self.emulator.app_mut().input_mut().release_all();
                self.advance(TAP_PHASE);
                self.screen()
            }
            Command::Wait(duration) => {
                self.advance(duration);
                self.screen()
            }
            Command::Show => self.screen(),
            Command::Tasks => self.emulator.task_lines(self.clock.now()),
            Command::Status => vec![self.status_line()],
            Command::Help => HELP_TOPICS
                .iter()
                .map(|(_, detail)| format!("  {detail}"))
                .collect(),
        }
    }

    fn tap(&mut self, button: Button) {
        self.emulator.app_mut().input_mut().press(button);
        self.advance(TAP_PHASE);
        self.emulator.app_mut().input_mut().release_all();
        self.advance(TAP_PHASE);
    }

    fn advance(&mut self, by: Duration) {
        let deadline = self.clock.now() + by;
        self.emulator.run_until(&mut self.clock, deadline);
    }

    fn screen(&self) -> Vec<String> {
        self.emulator.app().display().render()
    }

    fn status_line(&self) -> String {
        let app = self.emulator.app();
        let idle = app.idle();
        format!(
            "uptime={} cycle={} clock={} idle={}{} backlight={} wifi={}",
            format_elapsed(self.elapsed()),
            self.emulator.cycle(),
            app.snapshot(),
            idle.ticks_since_input(),
            if idle.is_asleep() { " (asleep)" } else { "" },
            if app.display().backlight() { "on" } else { "off" },
            if app.network().is_connected() {
                "up"
            } else {
                "down"
            },
        )
    }

    fn elapsed(&self) -> Duration {
        Duration::from_micros(self.clock.now().as_micros())
    }

    fn record(&mut self, role: TranscriptRole, lines: &[String]) -> io::Result<()> {
        let elapsed = self.elapsed();
        if let Some(transcript) = self.transcript.as_mut() {
            for line in lines {
                transcript.append_line(elapsed, role, line)?;
            }
        }
        Ok(())
    }
}

fn describe_task(task: &TaskInfo, now: Instant) -> String {
    let state = match task.state {
        TaskState::Runnable => "runnable".to_string(),
        TaskState::Sleeping(deadline) => format!(
            "sleeping {}",
            format_elapsed(deadline.saturating_duration_since(now))
        ),
        TaskState::WaitingCycles(cycle) => format!("waiting for cycle {cycle}"),
        TaskState::Completed => "completed".to_string(),
        TaskState::Faulted(fault) => format!("faulted ({fault})"),
    };
    format!(
        "  {:<14} prio={:<3} resumes={:<6} {state}",
        task.spec.name, task.spec.priority, task.resumes
    )
}

fn format_elapsed(duration: Duration) -> String {
    if duration.as_secs() == 0 {
        format!("{}ms", duration.as_millis())
    } else {
        format!("{:.3}s", duration.as_secs_f64())
    }
}
