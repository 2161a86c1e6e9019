//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! The default table in `config/default.toml` is compiled into the binary, so
//! the pin assignments and calibrated bounds are fixed at build time.

use serde::de::Error;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{GamepadError, Result};
use crate::hal::{ChannelId, PinId};
use crate::input::buttons::BUTTON_COUNT;
use crate::input::scaler::AxisRange;
use crate::input::slicer::{SlicerConfig, SlicerMode, MAX_HYSTERESIS_FACTOR, MAX_SLICE_COUNT};

/// Configuration table compiled into the binary.
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../config/default.toml");

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub buttons: ButtonConfig,
    pub steering: AxisConfig,
    pub gear: AxisConfig,
    pub slicer: SlicerSettings,
    pub hardware: HardwareConfig,
    pub calibration: CalibrationConfig,
}

/// Button wiring
#[derive(Debug, Deserialize, Clone)]
pub struct ButtonConfig {
    /// GPIO of each button, button 1 first.
    pub pins: Vec<PinId>,

    /// Output driven high to power the buttons.
    #[serde(default)]
    pub supply_pin: Option<PinId>,
}

/// One analog axis
#[derive(Debug, Deserialize, Clone)]
pub struct AxisConfig {
    pub channel: ChannelId,
    pub min: u16,
    pub max: u16,

    #[serde(default)]
    pub mode: SlicerMode,
}

/// Quantization settings shared by both axes
#[derive(Debug, Deserialize, Clone)]
pub struct SlicerSettings {
    #[serde(default = "default_slice_count")]
    pub slice_count: u16,

    #[serde(default = "default_hysteresis_factor")]
    pub hysteresis_factor: f64,
}

/// Device paths
#[derive(Debug, Deserialize, Clone)]
pub struct HardwareConfig {
    #[serde(default = "default_gpio_root")]
    pub gpio_root: String,

    #[serde(default = "default_iio_device")]
    pub iio_device: String,

    #[serde(default = "default_adc_bits")]
    pub adc_bits: u8,

    #[serde(default = "default_hid_device")]
    pub hid_device: String,

    #[serde(default = "default_status_led")]
    pub status_led: String,
}

/// Startup calibration helper
#[derive(Debug, Deserialize, Clone)]
pub struct CalibrationConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_calibration_duration_s")]
    pub duration_s: u64,
}

// Default value functions
fn default_slice_count() -> u16 { crate::input::slicer::DEFAULT_SLICE_COUNT }
fn default_hysteresis_factor() -> f64 { crate::input::slicer::DEFAULT_HYSTERESIS_FACTOR }

fn default_gpio_root() -> String { crate::hal::sysfs::DEFAULT_GPIO_ROOT.to_string() }
fn default_iio_device() -> String { crate::hal::sysfs::DEFAULT_IIO_DEVICE.to_string() }
fn default_adc_bits() -> u8 { 12 }
fn default_hid_device() -> String { crate::hid::gadget::DEFAULT_HID_DEVICE.to_string() }
fn default_status_led() -> String { "/sys/class/leds/led0/brightness".to_string() }

fn default_calibration_duration_s() -> u64 { crate::input::calibration::DEFAULT_CALIBRATION_DURATION.as_secs() }

/// Shorthand for a validation failure.
fn invalid(msg: impl std::fmt::Display) -> GamepadError {
    GamepadError::Config(toml::de::Error::custom(msg))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use wheel_gamepad::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns error if TOML parsing or validation fails
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Returns the configuration compiled into the binary
    ///
    /// # Errors
    ///
    /// Returns error if the embedded table is invalid
    ///
    /// # Examples
    ///
    /// ```
    /// use wheel_gamepad::config::Config;
    ///
    /// let config = Config::builtin()?;
    /// assert_eq!(config.buttons.pins.len(), 10);
    /// # Ok::<(), wheel_gamepad::error::GamepadError>(())
    /// ```
    pub fn builtin() -> Result<Self> {
        Self::parse(DEFAULT_CONFIG_TOML)
    }

    /// Button pins as a fixed-size table
    ///
    /// # Errors
    ///
    /// Returns error if there are not exactly ten pins
    pub fn button_pins(&self) -> Result<[PinId; BUTTON_COUNT]> {
        self.buttons.pins.as_slice().try_into().map_err(|_| {
            invalid(format!(
                "exactly {} button pins are required, got {}",
                BUTTON_COUNT,
                self.buttons.pins.len()
            ))
        })
    }

    /// Slicer configuration for one axis
    ///
    /// # Errors
    ///
    /// Returns error if the axis bounds are degenerate
    pub fn slicer_config(&self, axis: &AxisConfig) -> Result<SlicerConfig> {
        let range = AxisRange::new(axis.min, axis.max)?;
        Ok(SlicerConfig::new(
            range,
            self.slicer.slice_count,
            self.slicer.hysteresis_factor,
        ))
    }

    /// Calibration sampling window
    pub fn calibration_duration(&self) -> Duration {
        Duration::from_secs(self.calibration.duration_s)
    }

    /// Validate configuration values
    ///
    /// # Returns
    ///
    /// * `Result<()>` - Ok if valid, Err if invalid
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    fn validate(&self) -> Result<()> {
        // Validate button pins
        self.button_pins()?;

        let mut seen = HashSet::new();
        for &pin in &self.buttons.pins {
            if !seen.insert(pin) {
                return Err(invalid(format!("button pin {} is assigned twice", pin)));
            }
        }

        if let Some(supply) = self.buttons.supply_pin {
            if seen.contains(&supply) {
                return Err(invalid(format!("supply_pin {} is also a button pin", supply)));
            }
        }

        // Validate axes
        for (name, axis) in [("steering", &self.steering), ("gear", &self.gear)] {
            if axis.min >= axis.max {
                return Err(invalid(format!(
                    "{} min ({}) must be less than max ({})",
                    name, axis.min, axis.max
                )));
            }
        }

        if self.steering.channel == self.gear.channel {
            return Err(invalid("steering and gear must use different analog channels"));
        }

        // Validate slicer
        if self.slicer.slice_count == 0 || self.slicer.slice_count > MAX_SLICE_COUNT {
            return Err(invalid(format!(
                "slice_count must be between 1 and {}",
                MAX_SLICE_COUNT
            )));
        }

        if !(0.0..=MAX_HYSTERESIS_FACTOR).contains(&self.slicer.hysteresis_factor) {
            return Err(invalid(format!(
                "hysteresis_factor must be between 0.0 and {}",
                MAX_HYSTERESIS_FACTOR
            )));
        }

        // Validate hardware
        if !(1..=16).contains(&self.hardware.adc_bits) {
            return Err(invalid("adc_bits must be between 1 and 16"));
        }

        for (name, path) in [
            ("gpio_root", &self.hardware.gpio_root),
            ("iio_device", &self.hardware.iio_device),
            ("hid_device", &self.hardware.hid_device),
            ("status_led", &self.hardware.status_led),
        ] {
            if path.is_empty() {
                return Err(invalid(format!("{} cannot be empty", name)));
            }
        }

        // Validate calibration
        if self.calibration.duration_s == 0 || self.calibration.duration_s > 60 {
            return Err(invalid("calibration duration_s must be between 1 and 60"));
        }

        Ok(())
    }
}
