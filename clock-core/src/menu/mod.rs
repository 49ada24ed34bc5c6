//! Navigation state machine for the clock face, clock edit, menus and actions.
//!
//! The machine starts on the clock face. Mode toggles between the clock face
//! and the menu from anywhere; leaving a menu or action this way abandons it
//! and drops the navigation stack back to the root list. Inside the menu,
//! Up/Down move the cursor, Select confirms and Back pops one level. Confirming
//! a sub-menu pushes it; confirming a leaf action runs it until it finishes,
//! asks to go back, or fails.
//!
//! [`MenuStateMachine::update`] is called once per process tick with that
//! tick's press edges and instant, publishes the resulting frame, and returns the wake
//! condition for the process task.

use heapless::Vec;
use log::{debug, warn};

use crate::appliance::{Appliance, Board};
use crate::display::Frame;
use crate::input::{Button, ButtonSet};
use crate::list::{Direction, ListEntry, ScrollableList};
use crate::scheduler::{Instant, Wake};

pub mod actions;
pub mod edit;
pub mod face;
pub mod tree;

use actions::{ActionId, ActionStep, RunningAction};
use edit::ClockEditState;
use face::StatusLine;

/// Maximum navigation depth, root list included.
pub const MAX_NAV_DEPTH: usize = 6;

/// Entry in the menu tree.
#[derive(Debug)]
pub struct MenuNode {
    pub label: &'static str,
    pub behavior: MenuBehavior,
}

/// What confirming a [`MenuNode`] does.
#[derive(Copy, Clone, Debug)]
pub enum MenuBehavior {
    Submenu(&'static [MenuNode]),
    Action(ActionId),
}

impl MenuNode {
    pub const fn submenu(label: &'static str, items: &'static [MenuNode]) -> Self {
        Self {
            label,
            behavior: MenuBehavior::Submenu(items),
        }
    }

    pub const fn action(label: &'static str, id: ActionId) -> Self {
        Self {
            label,
            behavior: MenuBehavior::Action(id),
        }
    }
}

impl ListEntry for MenuNode {
    fn label(&self) -> &str {
        self.label
    }
}

/// List over menu nodes.
pub type MenuList = ScrollableList<MenuNode>;

/// Level above the root list.
#[derive(Copy, Clone, Debug)]
pub enum NavEntry {
    Menu(MenuList),
    Action(ActionId),
}

/// Errors raised by [`NavigationStack::push`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum NavigationError {
    TooDeep,
}

/// Menus and actions entered from the root list. The root is never popped.
#[derive(Clone, Debug)]
pub struct NavigationStack {
    root: MenuList,
    above: Vec<NavEntry, { MAX_NAV_DEPTH - 1 }>,
}

impl NavigationStack {
    pub const fn new(root: &'static [MenuNode]) -> Self {
        Self {
            root: ScrollableList::new(root),
            above: Vec::new(),
        }
    }

    /// Levels on the stack, root included.
    pub fn depth(&self) -> usize {
        1 + self.above.len()
    }

    pub fn push(&mut self, entry: NavEntry) -> Result<(), NavigationError> {
        self.above.push(entry).map_err(|_| NavigationError::TooDeep)
    }

    /// Pops one level. Returns `false` at the root.
    pub fn pop(&mut self) -> bool {
        self.above.pop().is_some()
    }

    /// Drops every level above the root and moves the root cursor to the top.
    pub fn clear_to_root(&mut self) {
        self.above.clear();
        self.root.reset();
    }

    /// Action on top of the stack, if any.
    pub fn top_action(&self) -> Option<ActionId> {
        match self.above.last() {
            Some(NavEntry::Action(id)) => Some(*id),
            _ => None,
        }
    }

    /// Innermost list on the stack.
    pub fn current_list(&self) -> &MenuList {
        self.above
            .iter()
            .rev()
            .find_map(|entry| match entry {
                NavEntry::Menu(list) => Some(list),
                NavEntry::Action(_) => None,
            })
            .unwrap_or(&self.root)
    }

    pub fn current_list_mut(&mut self) -> &mut MenuList {
        for entry in self.above.iter_mut().rev() {
            if let NavEntry::Menu(list) = entry {
                return list;
            }
        }
        &mut self.root
    }
}

/// Top-level UI mode.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Mode {
    ClockDisplay,
    ClockEdit(ClockEditState),
    MenuBrowse,
    ActionRunning(RunningAction),
}

/// Owner of the UI mode and the navigation stack.
#[derive(Clone, Debug)]
pub struct MenuStateMachine {
    mode: Mode,
    stack: NavigationStack,
}

impl MenuStateMachine {
    pub const fn new(root: &'static [MenuNode]) -> Self {
        Self {
            mode: Mode::ClockDisplay,
            stack: NavigationStack::new(root),
        }
    }

    pub const fn mode(&self) -> Mode {
        self.mode
    }

    pub const fn stack(&self) -> &NavigationStack {
        &self.stack
    }

    /// Handles one process tick and returns when it should run again.
    pub fn update<B: Board>(
        &mut self,
        app: &mut Appliance<B>,
        edges: ButtonSet,
        now: Instant,
    ) -> Wake {
        if edges.contains(Button::Mode) {
            self.toggle(app, now);
            self.render(app);
            return Wake::After(app.config().mode_settle);
        }

        match self.mode {
            Mode::ClockDisplay => {
                if edges.contains(Button::Select) && app.config().clock_edit_shortcut {
                    self.begin_edit(app);
                }
            }
            Mode::ClockEdit(mut edit) => {
                edit.apply(edges);
                self.mode = Mode::ClockEdit(edit);
            }
            Mode::MenuBrowse => {
                if let Some(wake) = self.browse(app, edges, now) {
                    return wake;
                }
            }
            Mode::ActionRunning(action) => return self.step_action(app, action, edges, now),
        }

        self.render(app);
        Wake::After(app.config().frame_interval)
    }

    fn toggle<B: Board>(&mut self, app: &mut Appliance<B>, now: Instant) {
        let next = match self.mode {
            Mode::ClockDisplay => Mode::MenuBrowse,
            Mode::ClockEdit(edit) => {
                if let Some(time) = edit.commit() {
                    debug!("clock set to {time}");
                    app.commit_time(time, now);
                }
                Mode::ClockDisplay
            }
            Mode::MenuBrowse => Mode::ClockDisplay,
            Mode::ActionRunning(action) => {
                debug!("abandoning {:?}", action.id());
                Mode::ClockDisplay
            }
        };
        debug!("mode {:?} -> {:?}", self.mode, next);
        self.stack.clear_to_root();
        self.mode = next;
    }

    fn begin_edit<B: Board>(&mut self, app: &Appliance<B>) {
        self.stack.clear_to_root();
        self.mode = Mode::ClockEdit(ClockEditState::begin(app.snapshot()));
    }

    /// Returns a wake when an action took over the tick.
    fn browse<B: Board>(
        &mut self,
        app: &mut Appliance<B>,
        edges: ButtonSet,
        now: Instant,
    ) -> Option<Wake> {
        let list = self.stack.current_list_mut();
        if edges.contains(Button::Up) {
            list.advance(Direction::Previous);
        }
        if edges.contains(Button::Down) {
            list.advance(Direction::Next);
        }
        let selected = list.selected();
        if edges.contains(Button::Back) {
            self.stack.pop();
            return None;
        }
        if !edges.contains(Button::Select) {
            return None;
        }

        let node = selected?;
        match node.behavior {
            MenuBehavior::Submenu(items) => {
                if self
                    .stack
                    .push(NavEntry::Menu(ScrollableList::new(items)))
                    .is_err()
                {
                    warn!("menu `{}` nested too deeply", node.label);
                }
                None
            }
            MenuBehavior::Action(ActionId::SetClock) => {
                self.begin_edit(app);
                None
            }
            MenuBehavior::Action(id) => {
                if self.stack.push(NavEntry::Action(id)).is_err() {
                    warn!("no room to start {id:?}");
                    return None;
                }
                debug!("starting {id:?}");
                Some(self.step_action(app, RunningAction::new(id), ButtonSet::EMPTY, now))
            }
        }
    }

    fn step_action<B: Board>(
        &mut self,
        app: &mut Appliance<B>,
        mut action: RunningAction,
        edges: ButtonSet,
        now: Instant,
    ) -> Wake {
        match action.resume(app, edges, now) {
            ActionStep::Wait(delay) => {
                self.mode = Mode::ActionRunning(action);
                Wake::After(delay)
            }
            ActionStep::Back | ActionStep::Done => {
                self.stack.pop();
                self.mode = Mode::MenuBrowse;
                self.render(app);
                Wake::After(app.config().frame_interval)
            }
            ActionStep::Failed(failure) => {
                warn!("{:?}: {}", action.id(), failure);
                app.publish(Frame::from_text(failure.message()));
                action.linger();
                self.mode = Mode::ActionRunning(action);
                Wake::After(app.config().failure_notice)
            }
        }
    }

    /// Publishes the screen for the current mode. Actions draw their own.
    fn render<B: Board>(&self, app: &mut Appliance<B>) {
        let frame = match self.mode {
            Mode::ClockDisplay => face::clock_face(&StatusLine::sample(app), &app.snapshot()),
            Mode::ClockEdit(edit) => face::edit_face(&StatusLine::sample(app), &edit),
            Mode::MenuBrowse => self.stack.current_list().render(),
            Mode::ActionRunning(_) => return,
        };
        app.publish(frame);
    }
}
