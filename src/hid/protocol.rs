//! # HID Gamepad Protocol Constants and Types
//!
//! Core definitions for the gamepad input report.

use crate::input::buttons::ButtonId;

/// Size of the gamepad input report in bytes.
/// Report structure: buttons(2) + x(1) + y(1) + z(1) + rz(1)
pub const GAMEPAD_REPORT_LEN: usize = 6;

/// HID report descriptor for the gamepad.
///
/// 16 buttons followed by X, Y, Z and Rz axes in `-127..=127`. There is no
/// report id, so a report is written to the gadget as-is.
pub const REPORT_DESCRIPTOR: [u8; 43] = [
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x05, // Usage (Game Pad)
    0xA1, 0x01, // Collection (Application)
    0x05, 0x09, //   Usage Page (Button)
    0x19, 0x01, //   Usage Minimum (1)
    0x29, 0x10, //   Usage Maximum (16)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x75, 0x01, //   Report Size (1)
    0x95, 0x10, //   Report Count (16)
    0x81, 0x02, //   Input (Data, Var, Abs)
    0x05, 0x01, //   Usage Page (Generic Desktop)
    0x15, 0x81, //   Logical Minimum (-127)
    0x25, 0x7F, //   Logical Maximum (127)
    0x09, 0x30, //   Usage (X)
    0x09, 0x31, //   Usage (Y)
    0x09, 0x32, //   Usage (Z)
    0x09, 0x35, //   Usage (Rz)
    0x75, 0x08, //   Report Size (8)
    0x95, 0x04, //   Report Count (4)
    0x81, 0x02, //   Input (Data, Var, Abs)
    0xC0, //       End Collection
];

/// Gamepad state sent to the host.
///
/// Only buttons 1-10 and the X/Y axes are driven; Z and Rz stay centered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GamepadReport {
    /// Pressed buttons, bit `id - 1` per button.
    pub buttons: u16,
    /// Steering wheel position.
    pub x: i8,
    /// Gear lever position.
    pub y: i8,
}

impl GamepadReport {
    /// Creates a report with no buttons pressed and both axes centered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the bit of `button`.
    pub fn press(&mut self, button: ButtonId) {
        self.buttons |= button.mask();
    }

    /// Clears the bit of `button`.
    pub fn release(&mut self, button: ButtonId) {
        self.buttons &= !button.mask();
    }

    /// Checks whether `button` is pressed.
    #[must_use]
    pub fn is_pressed(&self, button: ButtonId) -> bool {
        self.buttons & button.mask() != 0
    }

    /// Sets both joystick axes.
    pub fn set_axes(&mut self, x: i8, y: i8) {
        self.x = x;
        self.y = y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u8) -> ButtonId {
        ButtonId::new(n).unwrap()
    }

    #[test]
    fn test_report_starts_neutral() {
        let report = GamepadReport::new();
        assert_eq!(report.buttons, 0);
        assert_eq!(report.x, 0);
        assert_eq!(report.y, 0);
    }

    #[test]
    fn test_press_and_release() {
        let mut report = GamepadReport::new();
        report.press(id(1));
        report.press(id(10));
        assert!(report.is_pressed(id(1)));
        assert!(report.is_pressed(id(10)));
        assert!(!report.is_pressed(id(5)));
        assert_eq!(report.buttons, 0b10_0000_0001);

        report.release(id(1));
        assert!(!report.is_pressed(id(1)));
        assert_eq!(report.buttons, 0b10_0000_0000);
    }

    #[test]
    fn test_release_unpressed_is_noop() {
        let mut report = GamepadReport::new();
        report.release(id(4));
        assert_eq!(report, GamepadReport::new());
    }

    #[test]
    fn test_descriptor_items_are_complete() {
        // 21 two-byte items and the one-byte End Collection
        assert_eq!(REPORT_DESCRIPTOR.len(), 43);
        let (items, end) = REPORT_DESCRIPTOR.split_at(42);
        assert!(items.chunks(2).all(|item| item.len() == 2 && item[0] & 0x03 == 0x01));
        assert_eq!(end, &[0xC0]);
    }

    #[test]
    fn test_descriptor_input_size_matches_report() {
        let descriptor = &REPORT_DESCRIPTOR;
        assert_eq!(descriptor.last(), Some(&0xC0));

        // Sum report size * count for every Input item
        let mut size = 0usize;
        let mut count = 0usize;
        let mut bits = 0usize;
        for item in descriptor.chunks(2) {
            match item {
                [0x75, n] => size = usize::from(*n),
                [0x95, n] => count = usize::from(*n),
                [0x81, _] => bits += size * count,
                _ => {}
            }
        }
        assert_eq!(bits, GAMEPAD_REPORT_LEN * 8);
    }
}
