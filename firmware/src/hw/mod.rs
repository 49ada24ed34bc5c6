//! Board peripherals behind the clock-core collaborator traits.

pub mod power;

#[cfg(target_os = "none")]
pub use target::{Buttons, McuSystem};

#[cfg(target_os = "none")]
mod target {
    use clock_core::input::{Button, InputSource};
    use clock_core::services::{PowerStatus, SystemControl};
    use embassy_stm32::gpio::Input;

    use crate::status;

    /// Front-panel buttons, wired active-low with internal pull-ups.
    pub struct Buttons<'d> {
        up: Input<'d>,
        down: Input<'d>,
        select: Input<'d>,
        back: Input<'d>,
        mode: Input<'d>,
    }

    impl<'d> Buttons<'d> {
        pub fn new(
            up: Input<'d>,
            down: Input<'d>,
            select: Input<'d>,
            back: Input<'d>,
            mode: Input<'d>,
        ) -> Self {
            Self {
                up,
                down,
                select,
                back,
                mode,
            }
        }
    }

    impl InputSource for Buttons<'_> {
        fn is_pressed(&self, button: Button) -> bool {
            let pin = match button {
                Button::Up => &self.up,
                Button::Down => &self.down,
                Button::Select => &self.select,
                Button::Back => &self.back,
                Button::Mode => &self.mode,
            };
            pin.is_low()
        }
    }

    /// Reset and sensor access for the MCU itself.
    pub struct McuSystem;

    impl SystemControl for McuSystem {
        fn reset(&mut self) {
            log::warn!("system reset requested");
            cortex_m::peripheral::SCB::sys_reset();
        }

        fn power(&mut self) -> Option<PowerStatus> {
            status::power_status()
        }

        fn temperature_decicelsius(&mut self) -> Option<i16> {
            status::temperature()
        }
    }
}
