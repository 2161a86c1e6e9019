//! # Hardware Abstraction Module
//!
//! Narrow traits between the gamepad logic and the board it runs on.
//!
//! This module handles:
//! - Reading pull-down digital inputs (buttons)
//! - Reading analog inputs (potentiometers) on a 16-bit scale
//! - Driving digital outputs (status LED, button supply pin)
//! - Sending button and joystick updates to the HID gamepad
//!
//! The traits are infallible. Implementations log I/O failures and fall back
//! to a safe value so the poll loop keeps running.

pub mod sysfs;

use crate::input::buttons::ButtonId;

/// Physical pin identifier (GPIO line number).
pub type PinId = u32;

/// Analog channel identifier (ADC input number).
pub type ChannelId = u32;

/// Digital input source.
#[cfg_attr(test, mockall::automock)]
pub trait DigitalInput {
    /// Reads the level of `pin`. `true` means the button closes the circuit.
    fn read_digital(&mut self, pin: PinId) -> bool;
}

/// Analog input source.
#[cfg_attr(test, mockall::automock)]
pub trait AnalogInput {
    /// Reads `channel`, left-aligned to the full `0..=65535` range.
    fn read_analog(&mut self, channel: ChannelId) -> u16;
}

/// Digital output, such as the status LED.
#[cfg_attr(test, mockall::automock)]
pub trait DigitalOutput {
    /// Drives the output high (`true`) or low (`false`).
    fn set(&mut self, on: bool);
}

/// Destination for gamepad state changes.
#[cfg_attr(test, mockall::automock)]
pub trait GamepadSink {
    /// Marks `button` as pressed.
    fn press(&mut self, button: ButtonId);

    /// Marks `button` as released.
    fn release(&mut self, button: ButtonId);

    /// Moves the joystick to `x` (steering) and `y` (gear lever).
    fn move_joysticks(&mut self, x: i8, y: i8);
}
