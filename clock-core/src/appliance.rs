//! Shared context handed to every scheduled task.
//!
//! A [`Board`] names the concrete collaborator types; [`Appliance`] owns one of
//! each together with the shared UI state. Each shared field has one writer:
//!
//! - the display buffer is written by frame producers ([`Appliance::publish`])
//!   and drained only by the render task;
//! - the idle state is written only by the idle monitor;
//! - the committed clock is written only by clock edit, network sync and time
//!   restore.
//!
//! Crate-private accessors enforce the writer side; everything else is
//! read-only from outside the crate.

use crate::clock::{DateTime, TimeStore, WallClock};
use crate::config::Config;
use crate::display::{DisplayBuffer, DisplaySink, Frame};
use crate::idle::IdleState;
use crate::input::InputSource;
use crate::scheduler::Instant;
use crate::services::{NetworkLink, SystemControl};

/// Concrete collaborator types for one hardware target.
pub trait Board {
    type Input: InputSource;
    type Display: DisplaySink;
    type Clock: WallClock;
    type Store: TimeStore;
    type Network: NetworkLink;
    type System: SystemControl;
}

/// Collaborator instances handed to [`Appliance::new`].
pub struct Hardware<B: Board> {
    pub input: B::Input,
    pub display: B::Display,
    pub clock: B::Clock,
    pub store: B::Store,
    pub network: B::Network,
    pub system: B::System,
}

/// Collaborators plus the state shared between tasks.
pub struct Appliance<B: Board> {
    hw: Hardware<B>,
    config: Config,
    buffer: DisplayBuffer,
    idle: IdleState,
    snapshot: DateTime,
}

impl<B: Board> Appliance<B> {
    pub fn new(hw: Hardware<B>, config: Config) -> Self {
        let snapshot = hw.clock.now();
        Self {
            hw,
            config,
            buffer: DisplayBuffer::new(),
            idle: IdleState::new(),
            snapshot,
        }
    }

    pub const fn config(&self) -> &Config {
        &self.config
    }

    pub const fn input(&self) -> &B::Input {
        &self.hw.input
    }

    /// Host glue uses this to inject simulated button levels.
    pub const fn input_mut(&mut self) -> &mut B::Input {
        &mut self.hw.input
    }

    pub const fn display(&self) -> &B::Display {
        &self.hw.display
    }

    pub(crate) const fn display_mut(&mut self) -> &mut B::Display {
        &mut self.hw.display
    }

    pub const fn clock(&self) -> &B::Clock {
        &self.hw.clock
    }

    pub const fn network(&self) -> &B::Network {
        &self.hw.network
    }

    /// Host glue uses this to simulate link drops.
    pub const fn network_mut(&mut self) -> &mut B::Network {
        &mut self.hw.network
    }

    pub const fn store(&self) -> &B::Store {
        &self.hw.store
    }

    pub(crate) const fn store_mut(&mut self) -> &mut B::Store {
        &mut self.hw.store
    }

    pub const fn system(&self) -> &B::System {
        &self.hw.system
    }

    pub(crate) const fn system_mut(&mut self) -> &mut B::System {
        &mut self.hw.system
    }

    pub const fn buffer(&self) -> &DisplayBuffer {
        &self.buffer
    }

    /// Hands a complete frame to the render task.
    pub fn publish(&mut self, frame: Frame) {
        self.buffer.publish(frame);
    }

    pub(crate) fn take_frame(&mut self) -> Option<Frame> {
        self.buffer.take()
    }

    pub const fn idle(&self) -> &IdleState {
        &self.idle
    }

    pub(crate) const fn idle_mut(&mut self) -> &mut IdleState {
        &mut self.idle
    }

    /// Date/time captured at the last clock refresh.
    pub const fn snapshot(&self) -> DateTime {
        self.snapshot
    }

    /// Advances the wall clock and captures a fresh snapshot.
    pub(crate) fn refresh_snapshot(&mut self, now: Instant) {
        self.hw.clock.tick(now);
        self.snapshot = self.hw.clock.now();
    }

    /// Commits a new wall-clock time as of the monotonic instant `at`.
    pub(crate) fn commit_time(&mut self, time: DateTime, at: Instant) {
        self.hw.clock.set(time, at);
        self.snapshot = time;
    }
}
