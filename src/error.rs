//! # Error Types
//!
//! Custom error types for Wheel Gamepad using `thiserror`.

use thiserror::Error;

/// Main error type for Wheel Gamepad
#[derive(Debug, Error)]
pub enum GamepadError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An axis range whose lower bound is not below its upper bound
    #[error("Degenerate axis range: min {min} must be below max {max}")]
    DegenerateRange { min: u16, max: u16 },

    /// Hardware setup errors (GPIO export, ADC, HID gadget)
    #[error("Hardware error: {0}")]
    Hardware(String),
}

/// Result type alias for Wheel Gamepad
pub type Result<T> = std::result::Result<T, GamepadError>;
