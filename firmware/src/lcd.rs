#![cfg_attr(not(target_os = "none"), allow(dead_code))]

//! HD44780 character LCD behind a PCF8574 I2C backpack.
//!
//! The expander drives the controller in 4-bit mode. Its output port maps as
//! P0 = RS, P1 = RW, P2 = EN, P3 = backlight and P4..P7 = D4..D7; every byte
//! travels as two strobed nibbles, high nibble first.

use clock_core::display::{DisplaySink, GLYPH_SLOTS, Glyph, LCD_COLUMNS, LCD_ROWS};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

/// Address of the common PCF8574 backpack with A0..A2 pulled high.
pub const DEFAULT_ADDRESS: u8 = 0x27;

const REGISTER_SELECT: u8 = 0x01;
const ENABLE: u8 = 0x04;
const BACKLIGHT: u8 = 0x08;

const CLEAR_DISPLAY: u8 = 0x01;
const ENTRY_MODE_INCREMENT: u8 = 0x06;
const DISPLAY_ON_CURSOR_OFF: u8 = 0x0C;
const FUNCTION_4BIT_2LINE_5X8: u8 = 0x28;
const SET_CGRAM_ADDRESS: u8 = 0x40;
const SET_DDRAM_ADDRESS: u8 = 0x80;

/// DDRAM address of the first cell of each row on a 20x4 panel.
const ROW_OFFSETS: [u8; LCD_ROWS] = [0x00, 0x40, 0x14, 0x54];

const POWER_ON_DELAY_MS: u32 = 50;
const WAKE_DELAY_US: u32 = 4_500;
const CLEAR_DELAY_US: u32 = 2_000;
const PULSE_US: u32 = 1;
const SETTLE_US: u32 = 50;

/// Failures reported by [`Hd44780`].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum LcdError<E> {
    /// The I2C transfer to the expander failed.
    Bus(E),
    /// A row, column or glyph slot outside the panel.
    OutOfBounds,
}

/// Driver for a 20x4 HD44780 panel on a PCF8574 expander.
pub struct Hd44780<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    backlight: u8,
}

impl<I2C, D> Hd44780<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    pub fn new(i2c: I2C, delay: D, address: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
            backlight: BACKLIGHT,
        }
    }

    /// Runs the 4-bit initialisation sequence and clears the panel.
    pub fn init(&mut self) -> Result<(), LcdError<I2C::Error>> {
        self.delay.delay_ms(POWER_ON_DELAY_MS);
        for _ in 0..3 {
            self.write_nibble(0x30, false)?;
            self.delay.delay_us(WAKE_DELAY_US);
        }
        self.write_nibble(0x20, false)?;

        self.command(FUNCTION_4BIT_2LINE_5X8)?;
        self.command(DISPLAY_ON_CURSOR_OFF)?;
        self.command(CLEAR_DISPLAY)?;
        self.command(ENTRY_MODE_INCREMENT)
    }

    #[cfg(test)]
    fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    fn expander_write(&mut self, bits: u8) -> Result<(), LcdError<I2C::Error>> {
        self.i2c
            .write(self.address, &[bits | self.backlight])
            .map_err(LcdError::Bus)
    }

    /// Strobes the high nibble of `bits` into the controller.
    fn write_nibble(&mut self, bits: u8, data: bool) -> Result<(), LcdError<I2C::Error>> {
        let mut port = bits & 0xF0;
        if data {
            port |= REGISTER_SELECT;
        }
        self.expander_write(port | ENABLE)?;
        self.delay.delay_us(PULSE_US);
        self.expander_write(port)?;
        self.delay.delay_us(SETTLE_US);
        Ok(())
    }

    fn send(&mut self, byte: u8, data: bool) -> Result<(), LcdError<I2C::Error>> {
        self.write_nibble(byte, data)?;
        self.write_nibble(byte << 4, data)
    }

    fn command(&mut self, command: u8) -> Result<(), LcdError<I2C::Error>> {
        self.send(command, false)?;
        if command == CLEAR_DISPLAY {
            self.delay.delay_us(CLEAR_DELAY_US);
        }
        Ok(())
    }

    fn set_cursor(&mut self, row: u8, col: u8) -> Result<(), LcdError<I2C::Error>> {
        let offset = ROW_OFFSETS
            .get(usize::from(row))
            .ok_or(LcdError::OutOfBounds)?;
        if usize::from(col) >= LCD_COLUMNS {
            return Err(LcdError::OutOfBounds);
        }
        self.command(SET_DDRAM_ADDRESS | (offset + col))
    }
}

/// Character ROM code for `ch`. Codes 0..=7 select the custom glyphs.
fn char_code(ch: char) -> u8 {
    u8::try_from(ch)
        .ok()
        .filter(u8::is_ascii)
        .unwrap_or(b'?')
}

impl<I2C, D> DisplaySink for Hd44780<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    type Error = LcdError<I2C::Error>;

    fn clear(&mut self) -> Result<(), Self::Error> {
        self.command(CLEAR_DISPLAY)
    }

    fn write(&mut self, row: u8, col: u8, text: &str) -> Result<(), Self::Error> {
        self.set_cursor(row, col)?;
        let room = LCD_COLUMNS - usize::from(col);
        for ch in text.chars().take(room) {
            self.send(char_code(ch), true)?;
        }
        Ok(())
    }

    fn define_glyph(&mut self, slot: u8, bitmap: &Glyph) -> Result<(), Self::Error> {
        if usize::from(slot) >= GLYPH_SLOTS {
            return Err(LcdError::OutOfBounds);
        }
        self.command(SET_CGRAM_ADDRESS | (slot << 3))?;
        for row in bitmap {
            self.send(row & 0x1F, true)?;
        }
        // Leave the address counter in DDRAM for the next text write.
        self.command(SET_DDRAM_ADDRESS)
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), Self::Error> {
        self.backlight = if on { BACKLIGHT } else { 0 };
        self.expander_write(0)
    }
}
