//! # Poll Loop
//!
//! Owns the gamepad state and drives one tick at a time:
//! buttons first, then both axes, then a single joystick update.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::hal::{AnalogInput, DigitalInput, GamepadSink};
use crate::hid::protocol::GamepadReport;
use crate::input::axis::Axis;
use crate::input::buttons::{ButtonBank, ButtonEvent};
use crate::input::calibration::calibrate;
use crate::input::slicer::Slicer;

/// Number of ticks between status log messages
pub const LOG_INTERVAL_TICKS: u64 = 10_000;

/// All state carried from one tick to the next.
#[derive(Debug, Clone)]
pub struct PollContext {
    buttons: ButtonBank,
    steering: Axis,
    gear: Axis,
    ticks: u64,
    events: Vec<ButtonEvent>,
}

impl PollContext {
    /// Creates a context from its parts.
    #[must_use]
    pub fn new(buttons: ButtonBank, steering: Axis, gear: Axis) -> Self {
        Self {
            buttons,
            steering,
            gear,
            ticks: 0,
            events: Vec::new(),
        }
    }

    /// Builds the context described by a configuration
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if the pin table or an axis range is invalid
    ///
    /// # Examples
    ///
    /// ```
    /// use wheel_gamepad::config::Config;
    /// use wheel_gamepad::poll::PollContext;
    ///
    /// let config = Config::builtin()?;
    /// let ctx = PollContext::from_config(&config)?;
    /// assert_eq!(ctx.ticks(), 0);
    /// # Ok::<(), wheel_gamepad::error::GamepadError>(())
    /// ```
    pub fn from_config(config: &Config) -> Result<Self> {
        let buttons = ButtonBank::new(config.button_pins()?);

        let steering = Axis::new(
            "steering",
            config.steering.channel,
            Slicer::new(config.slicer_config(&config.steering)?, config.steering.mode),
        );
        let gear = Axis::new(
            "gear",
            config.gear.channel,
            Slicer::new(config.slicer_config(&config.gear)?, config.gear.mode),
        );

        Ok(Self::new(buttons, steering, gear))
    }

    /// Run one tick of the loop
    ///
    /// Button edges are forwarded to the sink in id order, then both axes
    /// are sampled and sent with one joystick update.
    ///
    /// # Returns
    ///
    /// * `GamepadReport` - State the host sees after this tick
    pub fn poll_once<D, A, G>(&mut self, digital: &mut D, analog: &mut A, sink: &mut G) -> GamepadReport
    where
        D: DigitalInput + ?Sized,
        A: AnalogInput + ?Sized,
        G: GamepadSink + ?Sized,
    {
        self.buttons.poll(digital, &mut self.events);
        for event in self.events.drain(..) {
            match event {
                ButtonEvent::Pressed(id) => {
                    info!("Button {} pressed!", id);
                    sink.press(id);
                }
                ButtonEvent::Released(id) => {
                    info!("Button {} released!", id);
                    sink.release(id);
                }
            }
        }

        let x = self.steering.sample(analog);
        let y = self.gear.sample(analog);
        sink.move_joysticks(x, y);

        self.ticks += 1;

        GamepadReport {
            buttons: self.buttons.pressed_mask(),
            x,
            y,
        }
    }

    /// Calibrate both axes from live samples
    ///
    /// Each axis is sampled for `duration` in turn. A result that does not
    /// span a usable range is logged and the configured bounds are kept.
    pub fn calibrate_axes<A: AnalogInput + ?Sized>(&mut self, analog: &mut A, duration: Duration) {
        for axis in [&mut self.steering, &mut self.gear] {
            let result = calibrate(analog, axis.channel(), duration);
            if let Err(e) = axis.apply_calibration(&result) {
                warn!("Keeping configured {} range: {}", axis.name(), e);
            }
        }
    }

    /// Run the poll loop forever
    pub fn run<D, A, G>(&mut self, digital: &mut D, analog: &mut A, sink: &mut G) -> !
    where
        D: DigitalInput + ?Sized,
        A: AnalogInput + ?Sized,
        G: GamepadSink + ?Sized,
    {
        info!("Starting poll loop");

        loop {
            let report = self.poll_once(digital, analog, sink);

            if self.ticks % LOG_INTERVAL_TICKS == 0 {
                debug!(
                    "Tick {}: buttons {:#06x}, steering {}, gear {}",
                    self.ticks, report.buttons, report.x, report.y
                );
            }
        }
    }

    /// Returns the number of ticks run so far.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Returns the button bank.
    #[must_use]
    pub fn buttons(&self) -> &ButtonBank {
        &self.buttons
    }

    /// Returns the steering axis.
    #[must_use]
    pub fn steering(&self) -> &Axis {
        &self.steering
    }

    /// Returns the gear axis.
    #[must_use]
    pub fn gear(&self) -> &Axis {
        &self.gear
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::mocks::{RecordingSink, ScriptedAnalog, ScriptedDigital, SinkCall};
    use crate::hal::MockGamepadSink;
    use crate::input::buttons::ButtonId;
    use mockall::predicate::eq;
    use mockall::Sequence;

    // Pins of the built-in table
    const BUTTON_2_PIN: u32 = 9;
    const BUTTON_7_PIN: u32 = 11;

    fn id(n: u8) -> ButtonId {
        ButtonId::new(n).unwrap()
    }

    fn context() -> PollContext {
        PollContext::from_config(&Config::builtin().unwrap()).unwrap()
    }

    fn centered_analog() -> ScriptedAnalog {
        let mut analog = ScriptedAnalog::new();
        analog.push(0, &[32616]);
        analog.push(1, &[33368]);
        analog
    }

    #[test]
    fn test_log_interval_constant() {
        assert_eq!(LOG_INTERVAL_TICKS, 10_000);
    }

    #[test]
    fn test_button_bounce_sends_press_then_release() {
        let mut ctx = context();
        let mut digital = ScriptedDigital::new();
        let mut analog = centered_analog();
        let mut sink = RecordingSink::new();

        digital.set(BUTTON_7_PIN, true);
        ctx.poll_once(&mut digital, &mut analog, &mut sink);
        digital.set(BUTTON_7_PIN, false);
        ctx.poll_once(&mut digital, &mut analog, &mut sink);

        assert_eq!(
            sink.button_calls(),
            vec![SinkCall::Press(id(7)), SinkCall::Release(id(7))]
        );
        assert_eq!(ctx.ticks(), 2);
    }

    #[test]
    fn test_sink_call_order() {
        let mut ctx = context();
        let mut digital = ScriptedDigital::new();
        let mut analog = centered_analog();
        let mut sink = MockGamepadSink::new();
        let mut seq = Sequence::new();

        sink.expect_press()
            .with(eq(id(7)))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        sink.expect_move_joysticks()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        sink.expect_release()
            .with(eq(id(7)))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        sink.expect_move_joysticks()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());

        digital.set(BUTTON_7_PIN, true);
        ctx.poll_once(&mut digital, &mut analog, &mut sink);
        digital.set(BUTTON_7_PIN, false);
        ctx.poll_once(&mut digital, &mut analog, &mut sink);
    }

    #[test]
    fn test_steady_input_sends_only_moves() {
        let mut ctx = context();
        let mut digital = ScriptedDigital::new();
        let mut analog = centered_analog();
        let mut sink = RecordingSink::new();

        for _ in 0..5 {
            ctx.poll_once(&mut digital, &mut analog, &mut sink);
        }

        assert!(sink.button_calls().is_empty());
        assert_eq!(sink.calls.len(), 5);
    }

    #[test]
    fn test_report_contents() {
        let mut ctx = context();
        let mut digital = ScriptedDigital::new();
        let mut analog = ScriptedAnalog::new();
        let mut sink = RecordingSink::new();

        digital.set(BUTTON_2_PIN, true);
        digital.set(BUTTON_7_PIN, true);
        analog.push(0, &[61712]);
        analog.push(1, &[16720]);

        let report = ctx.poll_once(&mut digital, &mut analog, &mut sink);

        assert_eq!(report.buttons, 0x0042);
        assert_eq!(report.x, 127);
        assert_eq!(report.y, -127);
        assert_eq!(sink.calls.last(), Some(&SinkCall::Move(127, -127)));
    }

    #[test]
    fn test_centered_axes() {
        let mut ctx = context();
        let mut digital = ScriptedDigital::new();
        let mut analog = centered_analog();
        let mut sink = RecordingSink::new();

        let report = ctx.poll_once(&mut digital, &mut analog, &mut sink);
        assert_eq!(report.x, 0);
        assert_eq!(report.y, 0);
    }

    #[test]
    fn test_out_of_range_sample_widens_axis() {
        let mut ctx = context();
        let mut digital = ScriptedDigital::new();
        let mut analog = ScriptedAnalog::new();
        let mut sink = RecordingSink::new();

        analog.push(0, &[3520, 1000]);
        analog.push(1, &[33368]);

        ctx.poll_once(&mut digital, &mut analog, &mut sink);
        assert_eq!(ctx.steering().slicer().range().min(), 3520);

        let report = ctx.poll_once(&mut digital, &mut analog, &mut sink);
        assert_eq!(ctx.steering().slicer().range().min(), 1000);
        assert_eq!(report.x, -127);
    }

    #[test]
    fn test_calibrate_axes_applies_sweep() {
        let mut ctx = context();
        let mut analog = ScriptedAnalog::new();
        analog.push(0, &[1000, 60000]);
        analog.push(1, &[20000, 40000]);

        ctx.calibrate_axes(&mut analog, Duration::from_millis(5));

        assert_eq!(ctx.steering().slicer().range().min(), 1000);
        assert_eq!(ctx.steering().slicer().range().max(), 60000);
        assert_eq!(ctx.gear().slicer().range().min(), 20000);
        assert_eq!(ctx.gear().slicer().range().max(), 40000);
    }

    #[test]
    fn test_calibrate_axes_keeps_range_when_unmoved() {
        let mut ctx = context();
        let mut analog = ScriptedAnalog::new();
        analog.push(0, &[30000]);
        analog.push(1, &[30000]);

        ctx.calibrate_axes(&mut analog, Duration::ZERO);

        assert_eq!(ctx.steering().slicer().range().min(), 3520);
        assert_eq!(ctx.steering().slicer().range().max(), 61712);
        assert_eq!(ctx.gear().slicer().range().min(), 16720);
    }

    #[test]
    fn test_from_config_uses_pin_table() {
        let ctx = context();
        let pins: Vec<u32> = ctx.buttons().iter().map(|b| b.pin).collect();
        assert_eq!(pins, vec![4, 9, 2, 3, 6, 5, 11, 13, 12, 7]);
        assert_eq!(ctx.steering().channel(), 0);
        assert_eq!(ctx.gear().channel(), 1);
    }
}
