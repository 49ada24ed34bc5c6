//! Concrete collaborators for the STM32G0 clock board.
//!
//! The board has no storage medium and no radio, so persistence and the
//! network actions report their peripheral as unavailable.

use clock_core::appliance::Board;
use clock_core::clock::{NoTimeStore, SoftClock};
use clock_core::services::NoNetwork;
use embassy_stm32::i2c::I2c;
use embassy_stm32::mode::Blocking;
use embassy_time::Delay;

use crate::hw::{Buttons, McuSystem};
use crate::lcd::Hd44780;

pub type Lcd = Hd44780<I2c<'static, Blocking>, Delay>;

pub struct ClockBoard;

impl Board for ClockBoard {
    type Input = Buttons<'static>;
    type Display = Lcd;
    type Clock = SoftClock;
    type Store = NoTimeStore;
    type Network = NoNetwork;
    type System = McuSystem;
}
