//! # Input Module
//!
//! Steering wheel, gear lever and button input handling.
//!
//! This module handles:
//! - Scaling raw potentiometer samples to joystick coordinates
//! - Quantizing axes into slices with hysteresis
//! - Widening axis ranges when new extremes are seen
//! - Turning button levels into press/release events
//! - The startup calibration helper

pub mod axis;
pub mod buttons;
pub mod calibration;
pub mod scaler;
pub mod slicer;
