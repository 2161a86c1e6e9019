//! # Calibration Module
//!
//! Finds the mechanical extremes of a potentiometer by sampling it while the
//! user sweeps it end to end.
//!
//! The helper busy-waits for the whole sampling window and blocks the poll
//! loop, so it only runs at startup when `calibration.enabled` is set. The
//! observed extremes are logged and can be applied to a
//! [`Slicer`](super::slicer::Slicer) or copied into the config table.
//!
//! ## Usage
//!
//! ```no_run
//! use std::time::Duration;
//! use wheel_gamepad::hal::sysfs::IioAdc;
//! use wheel_gamepad::input::calibration::calibrate;
//!
//! let mut adc = IioAdc::open("/sys/bus/iio/devices/iio:device0", 12, &[0])?;
//! let result = calibrate(&mut adc, 0, Duration::from_secs(5));
//! println!("min {} max {}", result.min, result.max);
//! # Ok::<(), wheel_gamepad::error::GamepadError>(())
//! ```

use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::hal::{AnalogInput, ChannelId};

/// Default length of the sampling window.
pub const DEFAULT_CALIBRATION_DURATION: Duration = Duration::from_secs(5);

/// Extremes observed during calibration.
///
/// `min >= max` when the pot was not moved; such a result is rejected when
/// applied to a slicer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationResult {
    /// Lowest sample seen.
    pub min: u16,
    /// Highest sample seen.
    pub max: u16,
    /// Number of samples taken.
    pub samples: u64,
}

impl CalibrationResult {
    /// Checks whether the result spans a usable range.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.min < self.max
    }
}

/// Samples `channel` continuously for `duration` and returns the extremes.
///
/// # Arguments
///
/// * `input` - Analog source to sample
/// * `channel` - Channel the potentiometer is wired to
/// * `duration` - Sampling window; at least one sample is always taken
pub fn calibrate<A: AnalogInput + ?Sized>(
    input: &mut A,
    channel: ChannelId,
    duration: Duration,
) -> CalibrationResult {
    info!(
        "Calibrating channel {} for {:?}: sweep the control end to end",
        channel, duration
    );

    let start = Instant::now();
    let mut result = CalibrationResult {
        min: u16::MAX,
        max: u16::MIN,
        samples: 0,
    };

    loop {
        let value = input.read_analog(channel);
        result.min = result.min.min(value);
        result.max = result.max.max(value);
        result.samples += 1;

        if start.elapsed() >= duration {
            break;
        }
    }

    info!(
        "Calibration of channel {} done. Max: {} || Min: {} ({} samples)",
        channel, result.max, result.min, result.samples
    );
    if !result.is_usable() {
        warn!("Channel {} did not move during calibration", channel);
    }

    result
}
