//! # HID Gamepad Module
//!
//! Implementation of the USB HID gamepad the host sees.
//!
//! This module handles:
//! - The 6-byte input report (16 buttons, X/Y/Z/Rz axes)
//! - The matching HID report descriptor
//! - Writing reports to a Linux USB gadget, only when they change

pub mod encoder;
pub mod gadget;
pub mod protocol;
