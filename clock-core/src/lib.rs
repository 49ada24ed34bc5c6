#![no_std]

// Shared logic for the ByteBand desk clock.
//
// The crate owns the cooperative scheduler, the menu/clock state machine and
// the idle monitor. Hardware lives behind the collaborator traits in
// `appliance` and `services`, so firmware and the host emulator drive the same
// task set without the Rust standard library.

pub mod appliance;
pub mod clock;
pub mod config;
pub mod display;
pub mod error;
pub mod idle;
pub mod input;
pub mod list;
pub mod menu;
pub mod scheduler;
pub mod services;
pub mod tasks;
