//! # Wheel Gamepad
//!
//! Presents a steering wheel, a gear lever and ten buttons to a host as a
//! USB HID gamepad.

use anyhow::{Context, Result};
use tracing::info;

use wheel_gamepad::config::Config;
use wheel_gamepad::hal::sysfs::{IioAdc, SysfsGpio, SysfsOutput};
use wheel_gamepad::hal::DigitalOutput;
use wheel_gamepad::hid::gadget::HidGadget;
use wheel_gamepad::poll::PollContext;

/// Environment variable naming a configuration file to use instead of the
/// built-in table
const CONFIG_ENV_VAR: &str = "WHEEL_GAMEPAD_CONFIG";

/// Load the configuration named by [`CONFIG_ENV_VAR`], or the built-in one.
fn load_config() -> Result<Config> {
    match std::env::var_os(CONFIG_ENV_VAR) {
        Some(path) => {
            info!("Loading configuration from {}", path.to_string_lossy());
            Config::load(&path)
                .with_context(|| format!("Failed to load {}", path.to_string_lossy()))
        }
        None => Config::builtin().context("Built-in configuration is invalid"),
    }
}

/// Main entry point for Wheel Gamepad
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up logging with a non-blocking tracing subscriber
///    - Load configuration
///    - Light the status LED and power the buttons
///    - Open GPIO inputs, the ADC and the HID gadget
///
/// 2. **Calibration** (when enabled)
///    - Sample each pot while the user sweeps it end to end
///
/// 3. **Main Loop**
///    - Poll buttons and axes as fast as I/O allows, forever
///
/// # Errors
///
/// Returns error if the configuration is invalid or a device cannot be opened
///
/// # Examples
///
/// Expected output:
/// ```text
/// INFO wheel_gamepad: Wheel Gamepad v0.1.0 starting...
/// INFO wheel_gamepad::hal::sysfs: Configured 10 GPIO inputs under /sys/class/gpio
/// INFO wheel_gamepad::hid::gadget: Opened HID gadget at /dev/hidg0
/// INFO wheel_gamepad::poll: Starting poll loop
/// INFO wheel_gamepad::poll: Button 7 pressed!
/// ```
fn main() -> Result<()> {
    // Initialize logging off the poll loop
    let (writer, _guard) = tracing_appender::non_blocking(std::io::stdout());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(writer)
        .init();

    info!("Wheel Gamepad v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;
    let hardware = &config.hardware;

    let mut status_led = SysfsOutput::open(&hardware.status_led)?;
    status_led.set(true);

    let _supply = match config.buttons.supply_pin {
        Some(pin) => {
            let mut supply = SysfsOutput::gpio(&hardware.gpio_root, pin)?;
            supply.set(true);
            info!("Button supply on GPIO {}", pin);
            Some(supply)
        }
        None => None,
    };

    let mut gpio = SysfsGpio::open(&hardware.gpio_root, &config.buttons.pins)?;
    let mut adc = IioAdc::open(
        &hardware.iio_device,
        hardware.adc_bits,
        &[config.steering.channel, config.gear.channel],
    )?;
    let mut gadget = HidGadget::open(&hardware.hid_device)?;

    let mut ctx = PollContext::from_config(&config)?;

    if config.calibration.enabled {
        ctx.calibrate_axes(&mut adc, config.calibration_duration());
    } else {
        info!(
            "Using configured axis ranges (steering {:?}, gear {:?})",
            config.steering.mode, config.gear.mode
        );
    }

    ctx.run(&mut gpio, &mut adc, &mut gadget)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_env_var_name() {
        assert_eq!(CONFIG_ENV_VAR, "WHEEL_GAMEPAD_CONFIG");
    }

    #[test]
    fn test_builtin_config_is_valid() {
        assert!(Config::builtin().is_ok());
    }
}
