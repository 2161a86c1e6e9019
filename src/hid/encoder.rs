//! # HID Report Encoder
//!
//! Encodes a [`GamepadReport`] into the bytes written to the host.

use bytes::{BufMut, Bytes, BytesMut};

use super::protocol::{GamepadReport, GAMEPAD_REPORT_LEN};

/// Encode a gamepad report into its 6-byte wire form
///
/// # Arguments
///
/// * `report` - Gamepad state to encode
///
/// # Returns
///
/// * `Bytes` - Buttons (u16, little-endian), then X, Y, Z, Rz as signed bytes
///
/// # Examples
///
/// ```
/// use wheel_gamepad::hid::encoder::encode_report;
/// use wheel_gamepad::hid::protocol::GamepadReport;
///
/// let report = GamepadReport { buttons: 0x0201, x: -127, y: 127 };
/// let bytes = encode_report(&report);
/// assert_eq!(&bytes[..], &[0x01, 0x02, 0x81, 0x7F, 0x00, 0x00]);
/// ```
pub fn encode_report(report: &GamepadReport) -> Bytes {
    let mut buf = BytesMut::with_capacity(GAMEPAD_REPORT_LEN);
    buf.put_u16_le(report.buttons);
    buf.put_i8(report.x);
    buf.put_i8(report.y);
    buf.put_i8(0); // Z
    buf.put_i8(0); // Rz
    buf.freeze()
}
