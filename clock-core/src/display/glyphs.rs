//! Custom 5x8 character bitmaps.
//!
//! The HD44780 keeps eight user-definable characters (CGRAM slots 0-7),
//! addressed in text as the characters `'\u{0}'` through `'\u{7}'`.

use super::Glyph;

/// Slot that holds the menu cursor on list screens.
pub const CURSOR_SLOT: u8 = 0;
/// Slot that holds the battery icon on the clock face.
pub const BATTERY_SLOT: u8 = 0;
/// Slot that holds the WiFi icon on the clock face.
pub const WIFI_SLOT: u8 = 1;

/// Text character referencing [`CURSOR_SLOT`].
pub const CURSOR_CHAR: char = '\u{0}';
/// Text character referencing [`BATTERY_SLOT`].
pub const BATTERY_CHAR: char = '\u{0}';
/// Text character referencing [`WIFI_SLOT`].
pub const WIFI_CHAR: char = '\u{1}';

pub const CURSOR: Glyph = [0x08, 0x0C, 0x0E, 0x0F, 0x0E, 0x0C, 0x08, 0x00];
pub const BATTERY_FULL: Glyph = [0x0E, 0x1F, 0x1F, 0x1F, 0x1F, 0x1F, 0x1F, 0x1F];
pub const BATTERY_MEDIUM: Glyph = [0x0E, 0x11, 0x11, 0x1F, 0x1F, 0x1F, 0x1F, 0x1F];
pub const BATTERY_LOW: Glyph = [0x0E, 0x11, 0x11, 0x11, 0x11, 0x1F, 0x1F, 0x1F];
pub const BATTERY_PLUGGED: Glyph = [0x0A, 0x0A, 0x1F, 0x1F, 0x1F, 0x0E, 0x04, 0x04];
pub const WIFI_ON: Glyph = [0x00, 0x0E, 0x11, 0x04, 0x0A, 0x00, 0x04, 0x00];
pub const WIFI_OFF: Glyph = [0x00, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x04, 0x00];
pub const PAUSE: Glyph = [0x00, 0x1B, 0x1B, 0x1B, 0x1B, 0x1B, 0x1B, 0x00];
