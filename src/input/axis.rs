//! # Axis Module
//!
//! Binds a [`Slicer`] to the analog channel it reads from.

use super::calibration::CalibrationResult;
use super::slicer::Slicer;
use crate::error::Result;
use crate::hal::{AnalogInput, ChannelId};

/// One analog control (steering wheel or gear lever).
#[derive(Debug, Clone)]
pub struct Axis {
    name: &'static str,
    channel: ChannelId,
    slicer: Slicer,
    position: i8,
}

impl Axis {
    /// Creates an axis reading `channel` through `slicer`.
    #[must_use]
    pub fn new(name: &'static str, channel: ChannelId, slicer: Slicer) -> Self {
        Self {
            name,
            channel,
            slicer,
            position: 0,
        }
    }

    /// Reads the channel once and returns the new joystick coordinate.
    pub fn sample<A: AnalogInput + ?Sized>(&mut self, input: &mut A) -> i8 {
        let raw = input.read_analog(self.channel);
        self.position = self.slicer.update(raw);
        self.position
    }

    /// Applies a calibration result to the slicer.
    ///
    /// # Errors
    ///
    /// Returns an error if the result does not span a usable range.
    pub fn apply_calibration(&mut self, result: &CalibrationResult) -> Result<()> {
        self.slicer.apply_calibration(result)
    }

    /// Returns the axis name used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the analog channel.
    #[must_use]
    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    /// Returns the last reported coordinate.
    #[must_use]
    pub fn position(&self) -> i8 {
        self.position
    }

    /// Returns the underlying slicer.
    #[must_use]
    pub fn slicer(&self) -> &Slicer {
        &self.slicer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::MockAnalogInput;
    use crate::input::scaler::AxisRange;
    use crate::input::slicer::{SlicerConfig, SlicerMode};

    fn steering() -> Axis {
        let range = AxisRange::new(3520, 61712).unwrap();
        Axis::new(
            "steering",
            0,
            Slicer::new(SlicerConfig::new(range, 10, 0.25), SlicerMode::Adaptive),
        )
    }

    #[test]
    fn test_sample_reads_own_channel() {
        let mut axis = steering();
        let mut adc = MockAnalogInput::new();
        adc.expect_read_analog()
            .withf(|channel| *channel == 0)
            .times(1)
            .return_const(61712u16);

        assert_eq!(axis.sample(&mut adc), 127);
        assert_eq!(axis.position(), 127);
    }

    #[test]
    fn test_new_axis_is_centered() {
        let axis = steering();
        assert_eq!(axis.position(), 0);
        assert_eq!(axis.name(), "steering");
        assert_eq!(axis.channel(), 0);
        assert_eq!(axis.slicer().range().min(), 3520);
    }

    #[test]
    fn test_apply_degenerate_calibration_fails() {
        let mut axis = steering();
        let result = CalibrationResult { min: 9, max: 9, samples: 1 };
        assert!(axis.apply_calibration(&result).is_err());
        assert_eq!(axis.slicer().range().max(), 61712);
    }
}
