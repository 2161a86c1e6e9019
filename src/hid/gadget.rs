//! # USB HID Gadget
//!
//! Sends gamepad reports through a Linux USB gadget HID function
//! (`/dev/hidgN`), configured with [`REPORT_DESCRIPTOR`](super::protocol::REPORT_DESCRIPTOR).
//!
//! Every call on the [`GamepadSink`] updates the held report. The report is
//! written only when it differs from the last one that reached the host, so
//! an idle gamepad produces no USB traffic.

use std::fs::{File, OpenOptions};
use std::io::Write;

use bytes::Bytes;
use tracing::{debug, info};

use super::encoder::encode_report;
use super::protocol::GamepadReport;
use crate::error::{GamepadError, Result};
use crate::hal::GamepadSink;
use crate::input::buttons::ButtonId;

/// Default gadget device path.
pub const DEFAULT_HID_DEVICE: &str = "/dev/hidg0";

/// HID gamepad backed by a writable report endpoint.
pub struct HidGadget<W: Write = File> {
    writer: W,
    device_path: String,
    report: GamepadReport,
    last_sent: Option<Bytes>,
    reports_sent: u64,
}

impl<W: Write> std::fmt::Debug for HidGadget<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HidGadget")
            .field("device_path", &self.device_path)
            .field("report", &self.report)
            .field("reports_sent", &self.reports_sent)
            .finish_non_exhaustive()
    }
}

impl HidGadget<File> {
    /// Open the gadget report device
    ///
    /// # Arguments
    ///
    /// * `path` - Device path (e.g., "/dev/hidg0")
    ///
    /// # Errors
    ///
    /// Returns error if the device does not exist or is not writable
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use wheel_gamepad::hid::gadget::HidGadget;
    ///
    /// let gadget = HidGadget::open("/dev/hidg0")?;
    /// # Ok::<(), wheel_gamepad::error::GamepadError>(())
    /// ```
    pub fn open(path: &str) -> Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .open(path)
            .map_err(|e| GamepadError::Hardware(format!("Failed to open {}: {}", path, e)))?;

        info!("Opened HID gadget at {}", path);
        Ok(Self::new(file, path))
    }
}

impl<W: Write> HidGadget<W> {
    /// Wraps an already opened report endpoint.
    pub fn new(writer: W, device_path: &str) -> Self {
        Self {
            writer,
            device_path: device_path.to_string(),
            report: GamepadReport::new(),
            last_sent: None,
            reports_sent: 0,
        }
    }

    /// Write the current report if it changed since the last write
    ///
    /// # Returns
    ///
    /// * `Result<bool>` - Whether a report was written
    ///
    /// # Errors
    ///
    /// Returns error if the write fails. The report is retried on the next
    /// update.
    pub fn send_report(&mut self) -> Result<bool> {
        let encoded = encode_report(&self.report);
        if self.last_sent.as_ref() == Some(&encoded) {
            return Ok(false);
        }

        self.writer
            .write_all(&encoded)
            .and_then(|()| self.writer.flush())
            .map_err(|e| {
                GamepadError::Hardware(format!("Failed to write report to {}: {}", self.device_path, e))
            })?;

        self.last_sent = Some(encoded);
        self.reports_sent += 1;
        Ok(true)
    }

    /// Sends the report, logging instead of failing.
    fn flush_report(&mut self) {
        if let Err(e) = self.send_report() {
            debug!("Failed to send report: {}", e);
        }
    }

    /// Returns the report currently held.
    #[must_use]
    pub fn report(&self) -> GamepadReport {
        self.report
    }

    /// Returns the number of reports written so far.
    #[must_use]
    pub fn reports_sent(&self) -> u64 {
        self.reports_sent
    }

    /// Returns the device path.
    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    /// Returns the underlying writer.
    pub fn writer(&self) -> &W {
        &self.writer
    }
}

impl<W: Write> GamepadSink for HidGadget<W> {
    fn press(&mut self, button: ButtonId) {
        self.report.press(button);
        self.flush_report();
    }

    fn release(&mut self, button: ButtonId) {
        self.report.release(button);
        self.flush_report();
    }

    fn move_joysticks(&mut self, x: i8, y: i8) {
        self.report.set_axes(x, y);
        self.flush_report();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn id(n: u8) -> ButtonId {
        ButtonId::new(n).unwrap()
    }

    fn gadget() -> HidGadget<Vec<u8>> {
        HidGadget::new(Vec::new(), "/dev/hidg-test")
    }

    /// Writer failing every write.
    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "host not connected"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_first_update_is_sent() {
        let mut gadget = gadget();
        gadget.move_joysticks(0, 0);
        assert_eq!(gadget.reports_sent(), 1);
        assert_eq!(gadget.writer().len(), 6);
    }

    #[test]
    fn test_unchanged_report_not_resent() {
        let mut gadget = gadget();
        gadget.move_joysticks(25, -51);
        gadget.move_joysticks(25, -51);
        gadget.move_joysticks(25, -51);
        assert_eq!(gadget.reports_sent(), 1);
    }

    #[test]
    fn test_press_release_sends_both_reports() {
        let mut gadget = gadget();
        gadget.press(id(7));
        gadget.release(id(7));

        assert_eq!(gadget.reports_sent(), 2);
        let written = gadget.writer();
        assert_eq!(&written[..6], &[0x40, 0x00, 0x00, 0x00, 0x00, 0x00]);
        assert_eq!(&written[6..], &[0x00; 6]);
    }

    #[test]
    fn test_report_tracks_state() {
        let mut gadget = gadget();
        gadget.press(id(2));
        gadget.move_joysticks(-127, 127);

        let report = gadget.report();
        assert!(report.is_pressed(id(2)));
        assert_eq!(report.x, -127);
        assert_eq!(report.y, 127);
    }

    #[test]
    fn test_write_failure_is_retried() {
        let mut gadget = HidGadget::new(BrokenPipe, "/dev/hidg-test");
        gadget.press(id(1));
        assert_eq!(gadget.reports_sent(), 0);

        match gadget.send_report() {
            Err(GamepadError::Hardware(msg)) => {
                assert!(msg.contains("/dev/hidg-test"));
            }
            other => panic!("Expected Hardware error, got: {:?}", other),
        }
        assert!(gadget.report().is_pressed(id(1)));
    }

    #[test]
    fn test_open_missing_device_fails() {
        let result = HidGadget::open("/dev/nonexistent_hidg_12345");
        match result {
            Err(GamepadError::Hardware(msg)) => {
                assert!(msg.contains("Failed to open"));
            }
            other => panic!("Expected Hardware error, got: {:?}", other),
        }
    }

    #[test]
    fn test_default_device_path() {
        assert_eq!(DEFAULT_HID_DEVICE, "/dev/hidg0");
    }
}
