//! Clock face and clock-edit screens.

use core::fmt::Write;

use crate::appliance::{Appliance, Board};
use crate::clock::DateTime;
use crate::display::glyphs::{self, BATTERY_CHAR, BATTERY_SLOT, WIFI_CHAR, WIFI_SLOT};
use crate::display::{Frame, LCD_COLUMNS, Line};
use crate::menu::edit::ClockEditState;
use crate::services::{BatteryLevel, NetworkLink, SystemControl};

/// Readings shown on the top row of the clock face.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct StatusLine {
    pub temperature_decicelsius: Option<i16>,
    pub battery: Option<BatteryLevel>,
    pub wifi_connected: bool,
}

impl StatusLine {
    pub(crate) fn sample<B: Board>(app: &mut Appliance<B>) -> Self {
        let wifi_connected = app.network().is_connected();
        let system = app.system_mut();
        Self {
            temperature_decicelsius: system.temperature_decicelsius(),
            battery: system.power().map(BatteryLevel::classify),
            wifi_connected,
        }
    }

    /// Temperature on the left, WiFi and battery icons in the last two cells.
    fn render_into(&self, frame: &mut Frame) {
        let mut row = Line::new();
        if let Some(tenths) = self.temperature_decicelsius {
            let sign = if tenths < 0 { "-" } else { "" };
            let magnitude = tenths.unsigned_abs();
            let _ = write!(row, "{sign}{}.{}C", magnitude / 10, magnitude % 10);
        }
        while row.len() < LCD_COLUMNS - 2 {
            let _ = row.push(' ');
        }
        let _ = row.push(WIFI_CHAR);
        let _ = row.push(if self.battery.is_some() {
            BATTERY_CHAR
        } else {
            ' '
        });
        frame.set_row(0, &row);

        let wifi = if self.wifi_connected {
            glyphs::WIFI_ON
        } else {
            glyphs::WIFI_OFF
        };
        frame.set_glyph(WIFI_SLOT, wifi);
        if let Some(level) = self.battery {
            frame.set_glyph(BATTERY_SLOT, level.glyph());
        }
    }
}

/// Status row, then the date and time.
pub fn clock_face(status: &StatusLine, time: &DateTime) -> Frame {
    let mut frame = Frame::blank();
    status.render_into(&mut frame);
    let mut text = Line::new();
    let _ = write!(text, "{time}");
    frame.set_row(1, &text);
    frame
}

/// Status row, the pending date and time, and a caret under the active field.
pub fn edit_face(status: &StatusLine, edit: &ClockEditState) -> Frame {
    let mut frame = Frame::blank();
    status.render_into(&mut frame);
    frame.set_row(1, &edit.pending_text());
    frame.set_row(2, &edit.caret_row());
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::edit::EditField;

    #[test]
    fn face_shows_status_and_time() {
        let status = StatusLine {
            temperature_decicelsius: Some(235),
            battery: Some(BatteryLevel::Medium),
            wifi_connected: true,
        };
        let frame = clock_face(&status, &DateTime::DEFAULT);
        assert_eq!(frame.row(0), "23.5C             \u{1}\u{0}");
        assert_eq!(frame.row(1), "2024-11-04  21:30:00");
        assert_eq!(frame.row(2), "                    ");
        assert_eq!(frame.glyph(WIFI_SLOT), Some(&glyphs::WIFI_ON));
        assert_eq!(frame.glyph(BATTERY_SLOT), Some(&glyphs::BATTERY_MEDIUM));
    }

    #[test]
    fn missing_readings_render_blank() {
        let frame = clock_face(&StatusLine::default(), &DateTime::DEFAULT);
        assert_eq!(frame.row(0), "                  \u{1} ");
        assert_eq!(frame.glyph(WIFI_SLOT), Some(&glyphs::WIFI_OFF));
        assert_eq!(frame.glyph(BATTERY_SLOT), None);
    }

    #[test]
    fn negative_temperatures_keep_their_sign() {
        let status = StatusLine {
            temperature_decicelsius: Some(-5),
            ..StatusLine::default()
        };
        let frame = clock_face(&status, &DateTime::DEFAULT);
        assert!(frame.row(0).starts_with("-0.5C "));
    }

    #[test]
    fn edit_face_marks_active_field() {
        let mut edit = ClockEditState::begin(DateTime::DEFAULT);
        edit.next_field();
        edit.next_field();
        edit.next_field();
        assert_eq!(edit.field(), EditField::Hour);
        let frame = edit_face(&StatusLine::default(), &edit);
        assert_eq!(frame.row(1), "2024-11-04  21:30:00");
        assert_eq!(frame.row(2), "------------^-------");
    }
}
