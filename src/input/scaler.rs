//! # Voltage Scaler
//!
//! Maps a raw analog sample onto a signed output range using the known
//! extremes of the sensor.
//!
//! The formula used is:
//! `output = lower + (upper - lower) * (raw - min) / (max - min)`
//!
//! The result is clamped to `lower..=upper` and truncated toward zero.
//!
//! ## Usage
//!
//! ```
//! use wheel_gamepad::input::scaler::{scale, AxisRange};
//!
//! let range = AxisRange::new(3520, 61712)?;
//!
//! assert_eq!(scale(3520, &range), -127);
//! assert_eq!(scale(32616, &range), 0);
//! assert_eq!(scale(61712, &range), 127);
//! # Ok::<(), wheel_gamepad::error::GamepadError>(())
//! ```

use crate::error::{GamepadError, Result};

/// Lowest joystick coordinate reported to the host.
pub const OUTPUT_MIN: i32 = -127;

/// Highest joystick coordinate reported to the host.
pub const OUTPUT_MAX: i32 = 127;

/// Known extremes of a raw analog signal.
///
/// `min` is always strictly below `max`, so scaling against an `AxisRange`
/// can never divide by zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisRange {
    min: u16,
    max: u16,
}

impl AxisRange {
    /// Creates a range from its extremes.
    ///
    /// # Errors
    ///
    /// Returns [`GamepadError::DegenerateRange`] if `min >= max`.
    ///
    /// # Examples
    ///
    /// ```
    /// use wheel_gamepad::input::scaler::AxisRange;
    ///
    /// assert!(AxisRange::new(100, 200).is_ok());
    /// assert!(AxisRange::new(200, 200).is_err());
    /// ```
    pub fn new(min: u16, max: u16) -> Result<Self> {
        if min >= max {
            return Err(GamepadError::DegenerateRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Lower bound of the range.
    #[must_use]
    pub fn min(&self) -> u16 {
        self.min
    }

    /// Upper bound of the range.
    #[must_use]
    pub fn max(&self) -> u16 {
        self.max
    }

    /// Checks whether `raw` lies within the bounds (inclusive).
    #[must_use]
    pub fn contains(&self, raw: u16) -> bool {
        (self.min..=self.max).contains(&raw)
    }

    /// Returns the smallest range covering both `self` and `raw`.
    ///
    /// Returns `None` when `raw` already lies within the bounds.
    #[must_use]
    pub fn widened_to(&self, raw: u16) -> Option<Self> {
        if self.contains(raw) {
            return None;
        }
        Some(Self {
            min: self.min.min(raw),
            max: self.max.max(raw),
        })
    }
}

/// Scales a raw sample to a joystick coordinate (-127 to 127).
///
/// # Arguments
///
/// * `raw` - Raw analog sample
/// * `range` - Known extremes of the sensor
///
/// # Returns
///
/// Joystick coordinate, `-127` at `range.min()` and `127` at `range.max()`.
/// Samples outside the range are clamped.
#[must_use]
pub fn scale(raw: u16, range: &AxisRange) -> i8 {
    // Clamped to -127..=127 so the narrowing is lossless
    scale_between(raw, range, OUTPUT_MIN, OUTPUT_MAX) as i8
}

/// Scales a raw sample onto an arbitrary output range.
///
/// # Arguments
///
/// * `raw` - Raw analog sample
/// * `range` - Known extremes of the sensor
/// * `lower` - Output at `range.min()`
/// * `upper` - Output at `range.max()`
///
/// # Examples
///
/// ```
/// use wheel_gamepad::input::scaler::{scale_between, AxisRange};
///
/// let range = AxisRange::new(0, 1000)?;
/// assert_eq!(scale_between(250, &range, 0, 100), 25);
/// assert_eq!(scale_between(5000, &range, 0, 100), 100); // Clamped
/// # Ok::<(), wheel_gamepad::error::GamepadError>(())
/// ```
#[must_use]
pub fn scale_between(raw: u16, range: &AxisRange, lower: i32, upper: i32) -> i32 {
    let span = f64::from(range.max) - f64::from(range.min);
    let position = (f64::from(raw) - f64::from(range.min)) / span;
    let result = f64::from(upper - lower).mul_add(position, f64::from(lower));

    // `as` truncates toward zero
    result.clamp(f64::from(lower), f64::from(upper)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wheel_range() -> AxisRange {
        AxisRange::new(3520, 61712).unwrap()
    }

    // ==================== AxisRange Tests ====================

    #[test]
    fn test_range_rejects_equal_bounds() {
        match AxisRange::new(4000, 4000) {
            Err(GamepadError::DegenerateRange { min, max }) => {
                assert_eq!(min, 4000);
                assert_eq!(max, 4000);
            }
            other => panic!("Expected DegenerateRange, got: {:?}", other),
        }
    }

    #[test]
    fn test_range_rejects_inverted_bounds() {
        assert!(AxisRange::new(5000, 4000).is_err());
    }

    #[test]
    fn test_range_widened_to() {
        let range = wheel_range();
        assert_eq!(range.widened_to(30000), None);

        let wider = range.widened_to(65000).unwrap();
        assert_eq!(wider.min(), 3520);
        assert_eq!(wider.max(), 65000);

        let wider = range.widened_to(100).unwrap();
        assert_eq!(wider.min(), 100);
        assert_eq!(wider.max(), 61712);
    }

    // ==================== Scaling Tests ====================

    #[test]
    fn test_scale_boundaries_exact() {
        let range = wheel_range();
        assert_eq!(scale(3520, &range), -127);
        assert_eq!(scale(61712, &range), 127);
    }

    #[test]
    fn test_scale_midpoint() {
        let range = wheel_range();
        assert_eq!(scale(32616, &range), 0);
    }

    #[test]
    fn test_gear_lever_boundaries() {
        let range = AxisRange::new(16720, 50016).unwrap();
        assert_eq!(scale(16720, &range), -127);
        assert_eq!(scale(50016, &range), 127);
        assert_eq!(scale(33368, &range), 0);
    }

    #[test]
    fn test_scale_clamps_out_of_range() {
        let range = wheel_range();
        assert_eq!(scale(0, &range), -127);
        assert_eq!(scale(u16::MAX, &range), 127);
    }

    #[test]
    fn test_scale_truncates_toward_zero() {
        // -127 + raw / 100 on 0..=25400
        let range = AxisRange::new(0, 25400).unwrap();
        assert_eq!(scale(50, &range), -126); // -126.5
        assert_eq!(scale(25350, &range), 126); // 126.5
    }

    #[test]
    fn test_scale_monotonic_and_bounded() {
        let range = wheel_range();
        let mut previous = i8::MIN;
        for raw in range.min()..=range.max() {
            let value = scale(raw, &range);
            assert!((-127..=127).contains(&value));
            assert!(value >= previous, "scale decreased at raw {}", raw);
            previous = value;
        }
    }

    #[test]
    fn test_scale_between_custom_limits() {
        let range = AxisRange::new(0, 1000).unwrap();
        assert_eq!(scale_between(0, &range, -10, 10), -10);
        assert_eq!(scale_between(500, &range, -10, 10), 0);
        assert_eq!(scale_between(1000, &range, -10, 10), 10);
    }

    #[test]
    fn test_output_constants() {
        assert_eq!(OUTPUT_MIN, -127);
        assert_eq!(OUTPUT_MAX, 127);
    }
}
