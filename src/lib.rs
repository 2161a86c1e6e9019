//! # Wheel Gamepad Library
//!
//! Turn a potentiometer steering wheel, a gear lever and ten buttons into a
//! USB HID gamepad.
//!
//! This library provides the input pipeline (button edges, adaptive axis
//! scaling with hysteresis), the HID report codec and the Linux hardware
//! bindings used by the `wheel-gamepad` binary.

pub mod config;
pub mod error;
pub mod hal;
pub mod hid;
pub mod input;
pub mod poll;
