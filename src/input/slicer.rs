//! # Slicer Module
//!
//! Quantizes a scaled axis into coarse slices and tracks the axis range at
//! runtime.
//!
//! ## Slicing
//!
//! The output range `-127..=127` is cut into `slice_count` slices of
//! `254 / slice_count` each. A sample is reported as the value of the slice
//! it falls in, so potentiometer noise does not show up as a constantly
//! changing coordinate.
//!
//! ## Hysteresis
//!
//! Near a slice boundary a noisy pot would still flicker between two slices.
//! The reported slice therefore only changes once the scaled value has moved
//! past the boundary by more than `hysteresis_factor * slice_width`.
//!
//! ## Adaptive Range
//!
//! In [`SlicerMode::Adaptive`] every sample outside the known range widens it,
//! and the scaling is rebuilt from the wider range. Until both mechanical
//! extremes have been visited once the mapping is under-scaled.
//!
//! ## Usage
//!
//! ```
//! use wheel_gamepad::input::scaler::AxisRange;
//! use wheel_gamepad::input::slicer::{Slicer, SlicerConfig, SlicerMode};
//!
//! let range = AxisRange::new(3520, 61712)?;
//! let mut slicer = Slicer::new(SlicerConfig::new(range, 10, 0.25), SlicerMode::Adaptive);
//!
//! assert_eq!(slicer.update(32616), 0);
//!
//! // A new extreme widens the range and maps to full deflection
//! assert_eq!(slicer.update(65000), 127);
//! assert_eq!(slicer.range().max(), 65000);
//! # Ok::<(), wheel_gamepad::error::GamepadError>(())
//! ```

use serde::Deserialize;
use tracing::{debug, warn};

use super::calibration::CalibrationResult;
use super::scaler::{scale, AxisRange, OUTPUT_MAX, OUTPUT_MIN};
use crate::error::Result;

/// Default number of output slices.
pub const DEFAULT_SLICE_COUNT: u16 = 10;

/// Default hysteresis, as a fraction of one slice width.
pub const DEFAULT_HYSTERESIS_FACTOR: f64 = 0.25;

/// Largest slice count; at 254 every slice is one output step wide.
pub const MAX_SLICE_COUNT: u16 = 254;

/// Largest hysteresis factor. Keeping the band below half a slice stops the
/// escape bands of neighbouring slices from overlapping.
pub const MAX_HYSTERESIS_FACTOR: f64 = 0.45;

/// How the slicer treats samples outside its range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlicerMode {
    /// Widen the range to include every sample seen.
    #[default]
    Adaptive,
    /// Keep the range frozen and clamp outliers.
    Fixed,
}

/// Scaling parameters derived from an [`AxisRange`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlicerConfig {
    range: AxisRange,
    out_min: i32,
    out_max: i32,
    slice_count: u16,
    hysteresis_factor: f64,
    slice_width: f64,
    hysteresis_band: f64,
}

impl SlicerConfig {
    /// Creates a slicer configuration for the `-127..=127` output range.
    ///
    /// # Arguments
    ///
    /// * `range` - Known extremes of the raw signal
    /// * `slice_count` - Number of slices (1 to 254). Values outside this range are clamped.
    /// * `hysteresis_factor` - Fraction of a slice width (0.0 to 0.45). Values outside this range are clamped.
    ///
    /// # Examples
    ///
    /// ```
    /// use wheel_gamepad::input::scaler::AxisRange;
    /// use wheel_gamepad::input::slicer::SlicerConfig;
    ///
    /// let config = SlicerConfig::new(AxisRange::new(0, 1000)?, 10, 0.25);
    /// assert!((config.slice_width() - 25.4).abs() < 0.001);
    /// # Ok::<(), wheel_gamepad::error::GamepadError>(())
    /// ```
    #[must_use]
    pub fn new(range: AxisRange, slice_count: u16, hysteresis_factor: f64) -> Self {
        let slice_count = slice_count.clamp(1, MAX_SLICE_COUNT);
        let hysteresis_factor = hysteresis_factor.clamp(0.0, MAX_HYSTERESIS_FACTOR);
        let slice_width = f64::from(OUTPUT_MAX - OUTPUT_MIN) / f64::from(slice_count);

        Self {
            range,
            out_min: OUTPUT_MIN,
            out_max: OUTPUT_MAX,
            slice_count,
            hysteresis_factor,
            slice_width,
            hysteresis_band: hysteresis_factor * slice_width,
        }
    }

    /// Returns the same configuration over a different range.
    #[must_use]
    pub fn rebuilt(&self, range: AxisRange) -> Self {
        Self::new(range, self.slice_count, self.hysteresis_factor)
    }

    /// Returns the raw range this configuration scales from.
    #[must_use]
    pub fn range(&self) -> &AxisRange {
        &self.range
    }

    /// Returns the configured slice count.
    #[must_use]
    pub fn slice_count(&self) -> u16 {
        self.slice_count
    }

    /// Returns the configured hysteresis factor.
    #[must_use]
    pub fn hysteresis_factor(&self) -> f64 {
        self.hysteresis_factor
    }

    /// Width of one slice in output units.
    #[must_use]
    pub fn slice_width(&self) -> f64 {
        self.slice_width
    }

    /// Index of the slice nearest to a scaled value.
    fn slice_of(&self, scaled: i32) -> i32 {
        let edge = (i32::from(self.slice_count) + 1) / 2;
        if scaled >= self.out_max {
            edge
        } else if scaled <= self.out_min {
            -edge
        } else {
            (f64::from(scaled) / self.slice_width).round() as i32
        }
    }

    /// Output coordinate reported for a slice.
    fn slice_value(&self, slice: i32) -> i8 {
        let value = (f64::from(slice) * self.slice_width).round();
        value.clamp(f64::from(self.out_min), f64::from(self.out_max)) as i8
    }

    /// Checks whether `scaled` has left `slice` by more than the hysteresis band.
    fn escapes(&self, slice: i32, scaled: i32) -> bool {
        // With an odd slice count the edge slices are half-width and only
        // reachable at full deflection.
        if scaled == self.out_min || scaled == self.out_max {
            return self.slice_of(scaled) != slice;
        }

        let center = f64::from(slice) * self.slice_width;
        let reach = self.slice_width / 2.0 + self.hysteresis_band;
        (f64::from(scaled) - center).abs() > reach
    }
}

/// Adaptive range tracker and quantizer for one axis.
#[derive(Debug, Clone)]
pub struct Slicer {
    mode: SlicerMode,
    config: SlicerConfig,
    /// Extremes seen so far; differ from the config range only while dirty.
    seen_min: u16,
    seen_max: u16,
    dirty: bool,
    /// Last reported slice, `None` until the first sample.
    slice: Option<i32>,
}

impl Slicer {
    /// Creates a slicer starting from the range held in `config`.
    #[must_use]
    pub fn new(config: SlicerConfig, mode: SlicerMode) -> Self {
        Self {
            mode,
            seen_min: config.range().min(),
            seen_max: config.range().max(),
            config,
            dirty: false,
            slice: None,
        }
    }

    /// Feeds one raw sample and returns the joystick coordinate to report.
    ///
    /// # Arguments
    ///
    /// * `raw` - Raw analog sample
    ///
    /// # Returns
    ///
    /// Coordinate in `-127..=127`, quantized to a slice value.
    pub fn update(&mut self, raw: u16) -> i8 {
        if self.mode == SlicerMode::Adaptive {
            if raw > self.seen_max {
                self.seen_max = raw;
                self.dirty = true;
            }
            if raw < self.seen_min {
                self.seen_min = raw;
                self.dirty = true;
            }
        }

        if self.dirty {
            self.dirty = false;
            if let Err(e) = self.rebuild(self.seen_min, self.seen_max) {
                warn!("Rejected axis rebuild, keeping previous range: {}", e);
            }
        }

        let scaled = i32::from(scale(raw, self.config.range()));
        let slice = match self.slice {
            Some(current) if !self.config.escapes(current, scaled) => current,
            _ => self.config.slice_of(scaled),
        };
        self.slice = Some(slice);

        self.config.slice_value(slice)
    }

    /// Replaces the range with extremes found by the calibration helper.
    ///
    /// # Errors
    ///
    /// Returns [`GamepadError::DegenerateRange`](crate::error::GamepadError::DegenerateRange)
    /// if the calibration saw no movement. The previous range is kept.
    pub fn apply_calibration(&mut self, result: &CalibrationResult) -> Result<()> {
        self.rebuild(result.min, result.max)?;
        self.slice = None;
        Ok(())
    }

    /// Rebuilds the config from new extremes, keeping the old one on failure.
    fn rebuild(&mut self, min: u16, max: u16) -> Result<()> {
        let range = match AxisRange::new(min, max) {
            Ok(range) => range,
            Err(e) => {
                self.seen_min = self.config.range().min();
                self.seen_max = self.config.range().max();
                return Err(e);
            }
        };

        debug!(
            "Axis range rebuilt: {}..{} -> {}..{}",
            self.config.range().min(),
            self.config.range().max(),
            range.min(),
            range.max()
        );

        self.config = self.config.rebuilt(range);
        self.seen_min = range.min();
        self.seen_max = range.max();
        Ok(())
    }

    /// Returns the current raw range.
    #[must_use]
    pub fn range(&self) -> &AxisRange {
        self.config.range()
    }

    /// Returns the current scaling configuration.
    #[must_use]
    pub fn config(&self) -> &SlicerConfig {
        &self.config
    }

    /// Returns the range tracking mode.
    #[must_use]
    pub fn mode(&self) -> SlicerMode {
        self.mode
    }
}
