//! Leaf actions reachable from the menu.
//!
//! Each action is a small state machine resumed once per process tick. A
//! resume yields an [`ActionStep`]: a wait the scheduler should honour before
//! the next resume, a back request, completion, or a failure whose message the
//! menu shows before returning to the owning list. Nothing here blocks; slow
//! collaborator calls happen on their own resume so the screen announcing them
//! is drawn first.

use core::time::Duration;

use log::warn;

use crate::appliance::{Appliance, Board};
use crate::clock::TimeStore;
use crate::display::Frame;
use crate::error::{ActionFailure, ServiceError};
use crate::input::{Button, ButtonSet};
use crate::scheduler::Instant;
use crate::services::{NetworkLink, SystemControl};

pub const CREDITS_TEXT: &str = "-=-=-=-=-=-=-=-=-=-=      ByteBand    \n       by Buko    \n-=-=-=-=-=-=-=-=-=-=";
pub const EDIT_MODE_TEXT: &str = "     EDIT MODE      ";

pub const ALREADY_CONNECTED: &str = "Already connected!";
pub const CONNECTING: &str = "Connecting...";
pub const CONNECTED: &str = "Connected!";
pub const ALREADY_DISCONNECTED: &str = "Already disconnected!";
pub const DISCONNECTED: &str = "Disconnected!";
pub const SYNCING: &str = "Syncing...";
pub const SYNCED: &str = "Synced";
pub const TIME_RESTORED: &str = "Time restored";
pub const RESETTING: &str = "Resetting...";
pub const NOT_IMPLEMENTED: &str = "Not implemented yet";

pub const CONNECT_FAILED: ActionFailure = ActionFailure::new("Failed to connect");
pub const DISCONNECT_FAILED: ActionFailure = ActionFailure::new("Failed to\ndisconnect");
pub const NOT_CONNECTED: ActionFailure = ActionFailure::new("Connect to WiFi\nfirst!");
pub const SYNC_FAILED: ActionFailure = ActionFailure::new("Sync failed");
pub const NO_STORAGE: ActionFailure = ActionFailure::new("No SD card");
pub const NO_SAVED_TIME: ActionFailure = ActionFailure::new("No saved time");

/// Identifier of a leaf action in the menu tree.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ActionId {
    /// Switches the state machine into clock edit instead of running here.
    SetClock,
    Credits,
    ConnectWifi,
    DisconnectWifi,
    /// Placeholder for editing the stored WiFi credentials.
    EditConnection,
    SyncTime,
    /// Placeholder for the on-device configuration web page.
    HostPage,
    LoadSavedTime,
    Reset,
}

/// Outcome of one action resume.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ActionStep {
    /// Resume again after the duration.
    Wait(Duration),
    /// The user asked to leave the action.
    Back,
    /// The action finished.
    Done,
    /// The action could not finish; show the message, then leave.
    Failed(ActionFailure),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Phase {
    Start,
    Working,
    Linger,
}

/// In-flight action.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct RunningAction {
    id: ActionId,
    phase: Phase,
}

impl RunningAction {
    pub const fn new(id: ActionId) -> Self {
        Self {
            id,
            phase: Phase::Start,
        }
    }

    pub const fn id(&self) -> ActionId {
        self.id
    }

    /// Ends the action on its next resume.
    pub(crate) fn linger(&mut self) {
        self.phase = Phase::Linger;
    }

    /// Runs the action up to its next step.
    pub fn resume<B: Board>(
        &mut self,
        app: &mut Appliance<B>,
        edges: ButtonSet,
        now: Instant,
    ) -> ActionStep {
        if self.phase == Phase::Linger {
            return ActionStep::Done;
        }
        match self.id {
            ActionId::Credits => Self::hold(app, edges, CREDITS_TEXT),
            ActionId::ConnectWifi => self.connect(app),
            ActionId::DisconnectWifi => self.disconnect(app),
            ActionId::EditConnection => Self::hold(app, edges, EDIT_MODE_TEXT),
            ActionId::SyncTime => self.sync_time(app, now),
            ActionId::HostPage => self.host_page(app),
            ActionId::LoadSavedTime => self.load_saved_time(app, now),
            ActionId::Reset => self.reset(app),
            // Handled by the state machine before an action is started.
            ActionId::SetClock => ActionStep::Done,
        }
    }

    fn notice<B: Board>(&mut self, app: &mut Appliance<B>, text: &str) -> ActionStep {
        app.publish(Frame::from_text(text));
        self.phase = Phase::Linger;
        ActionStep::Wait(app.config().notice_duration)
    }

    fn announce<B: Board>(&mut self, app: &mut Appliance<B>, text: &str) -> ActionStep {
        app.publish(Frame::from_text(text));
        self.phase = Phase::Working;
        ActionStep::Wait(Duration::ZERO)
    }

    fn fail(&self, cause: ServiceError, failure: ActionFailure) -> ActionStep {
        warn!("{:?} failed: {}", self.id, cause);
        ActionStep::Failed(failure)
    }

    /// Redraws `text` every frame until Back.
    fn hold<B: Board>(app: &mut Appliance<B>, edges: ButtonSet, text: &str) -> ActionStep {
        if edges.contains(Button::Back) {
            return ActionStep::Back;
        }
        app.publish(Frame::from_text(text));
        ActionStep::Wait(app.config().frame_interval)
    }

    fn connect<B: Board>(&mut self, app: &mut Appliance<B>) -> ActionStep {
        match self.phase {
            Phase::Start if app.network().is_connected() => self.notice(app, ALREADY_CONNECTED),
            Phase::Start => self.announce(app, CONNECTING),
            _ => match app.network_mut().connect() {
                Ok(()) => self.notice(app, CONNECTED),
                Err(err) => self.fail(err, CONNECT_FAILED),
            },
        }
    }

    fn disconnect<B: Board>(&mut self, app: &mut Appliance<B>) -> ActionStep {
        if !app.network().is_connected() {
            return self.notice(app, ALREADY_DISCONNECTED);
        }
        match app.network_mut().disconnect() {
            Ok(()) => self.notice(app, DISCONNECTED),
            Err(err) => self.fail(err, DISCONNECT_FAILED),
        }
    }

    fn sync_time<B: Board>(&mut self, app: &mut Appliance<B>, now: Instant) -> ActionStep {
        if !app.network().is_connected() {
            return ActionStep::Failed(NOT_CONNECTED);
        }
        match self.phase {
            Phase::Start => self.announce(app, SYNCING),
            _ => match app.network_mut().sync_time() {
                Ok(time) => {
                    app.commit_time(time, now);
                    self.notice(app, SYNCED)
                }
                Err(err) => self.fail(err, SYNC_FAILED),
            },
        }
    }

    fn host_page<B: Board>(&mut self, app: &mut Appliance<B>) -> ActionStep {
        if !app.network().is_connected() {
            return ActionStep::Failed(NOT_CONNECTED);
        }
        self.notice(app, NOT_IMPLEMENTED)
    }

    fn load_saved_time<B: Board>(&mut self, app: &mut Appliance<B>, now: Instant) -> ActionStep {
        match app.store_mut().load_time() {
            Ok(time) => {
                app.commit_time(time, now);
                self.notice(app, TIME_RESTORED)
            }
            Err(err @ ServiceError::Unavailable(_)) => self.fail(err, NO_STORAGE),
            Err(err) => self.fail(err, NO_SAVED_TIME),
        }
    }

    fn reset<B: Board>(&mut self, app: &mut Appliance<B>) -> ActionStep {
        match self.phase {
            Phase::Start => {
                app.publish(Frame::from_text(RESETTING));
                self.phase = Phase::Working;
                ActionStep::Wait(app.config().notice_duration)
            }
            _ => {
                app.system_mut().reset();
                ActionStep::Done
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appliance::Hardware;
    use crate::clock::{NoTimeStore, SoftClock};
    use crate::config::Config;
    use crate::display::NoopDisplay;
    use crate::input::NoInput;
    use crate::services::{NoNetwork, NoopSystem};

    struct BareBoard;

    impl Board for BareBoard {
        type Input = NoInput;
        type Display = NoopDisplay;
        type Clock = SoftClock;
        type Store = NoTimeStore;
        type Network = NoNetwork;
        type System = NoopSystem;
    }

    fn bare() -> Appliance<BareBoard> {
        let hw = Hardware {
            input: NoInput,
            display: NoopDisplay,
            clock: SoftClock::default(),
            store: NoTimeStore,
            network: NoNetwork,
            system: NoopSystem,
        };
        Appliance::new(hw, Config::default())
    }

    #[test]
    fn credits_banner_is_republished_every_frame() {
        let mut app = bare();
        let frame_interval = app.config().frame_interval;
        let mut credits = RunningAction::new(ActionId::Credits);
        for _ in 0..3 {
            let step = credits.resume(&mut app, ButtonSet::EMPTY, Instant::ZERO);
            assert_eq!(step, ActionStep::Wait(frame_interval));
            assert_eq!(app.take_frame(), Some(Frame::from_text(CREDITS_TEXT)));
        }

        let step = credits.resume(&mut app, ButtonSet::of(Button::Back), Instant::ZERO);
        assert_eq!(step, ActionStep::Back);
        assert_eq!(app.take_frame(), None);
    }

    #[test]
    fn edit_connection_screen_survives_a_consumed_frame() {
        let mut app = bare();
        let mut edit = RunningAction::new(ActionId::EditConnection);
        edit.resume(&mut app, ButtonSet::EMPTY, Instant::ZERO);
        assert!(app.take_frame().is_some());
        edit.resume(&mut app, ButtonSet::of(Button::Up), Instant::ZERO);
        assert_eq!(app.take_frame(), Some(Frame::from_text(EDIT_MODE_TEXT)));
    }

    #[test]
    fn host_page_without_a_link_fails() {
        let mut app = bare();
        let mut page = RunningAction::new(ActionId::HostPage);
        assert_eq!(
            page.resume(&mut app, ButtonSet::EMPTY, Instant::ZERO),
            ActionStep::Failed(NOT_CONNECTED)
        );
    }
}
