//! # Linux sysfs Hardware Backend
//!
//! Implements the HAL traits on top of Linux sysfs attributes.
//!
//! This module handles:
//! - Exporting GPIO lines and configuring them as inputs or outputs
//! - Reading button levels from `gpioN/value`
//! - Reading potentiometers from IIO `in_voltageN_raw` attributes
//! - Driving the status LED through `leds/<name>/brightness`
//!
//! Pull-down resistors cannot be configured through sysfs; they are expected
//! to be set up by the device tree (or fitted on the board).

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::{AnalogInput, ChannelId, DigitalInput, DigitalOutput, PinId};
use crate::error::{GamepadError, Result};

/// Default sysfs GPIO class directory.
pub const DEFAULT_GPIO_ROOT: &str = "/sys/class/gpio";

/// Default IIO ADC device directory.
pub const DEFAULT_IIO_DEVICE: &str = "/sys/bus/iio/devices/iio:device0";

/// Consecutive failed reads between repeated warnings for one input.
pub const FAULT_LOG_INTERVAL: u64 = 10_000;

/// Consecutive read failures of one input.
#[derive(Debug, Default, Clone, Copy)]
struct FaultCounter {
    failures: u64,
}

impl FaultCounter {
    /// Counts a failure. Returns `true` for the first one and every
    /// [`FAULT_LOG_INTERVAL`]th after it.
    fn failed(&mut self) -> bool {
        self.failures += 1;
        self.failures == 1 || self.failures % FAULT_LOG_INTERVAL == 0
    }

    /// Clears the count, returning how many failures preceded this success.
    fn recovered(&mut self) -> Option<u64> {
        (self.failures > 0).then(|| std::mem::take(&mut self.failures))
    }
}

/// Reads a whole attribute from the start.
fn read_attribute(file: &mut File) -> std::io::Result<String> {
    file.seek(SeekFrom::Start(0))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Exports `pin` under `root` (if needed) and sets its direction.
///
/// # Returns
///
/// * `Result<PathBuf>` - Path of the pin's `value` attribute
fn export_pin(root: &Path, pin: PinId, direction: &str) -> Result<PathBuf> {
    let pin_dir = root.join(format!("gpio{}", pin));

    if !pin_dir.exists() {
        debug!("Exporting GPIO {}", pin);
        fs::write(root.join("export"), pin.to_string())
            .map_err(|e| GamepadError::Hardware(format!("Failed to export GPIO {}: {}", pin, e)))?;
    }

    fs::write(pin_dir.join("direction"), direction).map_err(|e| {
        GamepadError::Hardware(format!("Failed to set GPIO {} direction to {}: {}", pin, direction, e))
    })?;

    Ok(pin_dir.join("value"))
}

#[derive(Debug)]
struct GpioLine {
    value: File,
    level: bool,
    faults: FaultCounter,
}

/// Button inputs read through sysfs GPIO.
#[derive(Debug)]
pub struct SysfsGpio {
    lines: HashMap<PinId, GpioLine>,
}

impl SysfsGpio {
    /// Export `pins` as inputs and open their value attributes.
    ///
    /// # Arguments
    ///
    /// * `root` - GPIO class directory (e.g., "/sys/class/gpio")
    /// * `pins` - GPIO line numbers to read
    ///
    /// # Errors
    ///
    /// Returns error if a pin cannot be exported, configured or opened
    pub fn open<P: AsRef<Path>>(root: P, pins: &[PinId]) -> Result<Self> {
        let root = root.as_ref();
        let mut lines = HashMap::with_capacity(pins.len());

        for &pin in pins {
            let path = export_pin(root, pin, "in")?;
            let value = File::open(&path).map_err(|e| {
                GamepadError::Hardware(format!("Failed to open {}: {}", path.display(), e))
            })?;
            lines.insert(
                pin,
                GpioLine {
                    value,
                    level: false,
                    faults: FaultCounter::default(),
                },
            );
        }

        info!("Configured {} GPIO inputs under {}", pins.len(), root.display());
        Ok(Self { lines })
    }
}

impl DigitalInput for SysfsGpio {
    fn read_digital(&mut self, pin: PinId) -> bool {
        let Some(line) = self.lines.get_mut(&pin) else {
            warn!("GPIO {} was not configured as an input", pin);
            return false;
        };

        match read_attribute(&mut line.value) {
            Ok(contents) => {
                if let Some(failures) = line.faults.recovered() {
                    info!("GPIO {} readable again after {} failed reads", pin, failures);
                }
                line.level = contents.trim() == "1";
            }
            Err(e) => {
                if line.faults.failed() {
                    warn!(
                        "Failed to read GPIO {} ({} in a row), holding last level: {}",
                        pin, line.faults.failures, e
                    );
                }
            }
        }

        line.level
    }
}

/// Writable sysfs attribute driven to `1` or `0`.
#[derive(Debug)]
pub struct SysfsOutput {
    path: PathBuf,
    file: File,
}

impl SysfsOutput {
    /// Open an attribute such as `/sys/class/leds/led0/brightness`.
    ///
    /// # Errors
    ///
    /// Returns error if the attribute cannot be opened for writing
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().write(true).open(&path).map_err(|e| {
            GamepadError::Hardware(format!("Failed to open {}: {}", path.display(), e))
        })?;
        Ok(Self { path, file })
    }

    /// Export `pin` under `root` as an output and open its value attribute.
    ///
    /// # Errors
    ///
    /// Returns error if the pin cannot be exported or configured
    pub fn gpio<P: AsRef<Path>>(root: P, pin: PinId) -> Result<Self> {
        let path = export_pin(root.as_ref(), pin, "out")?;
        Self::open(path)
    }

    /// Returns the attribute path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DigitalOutput for SysfsOutput {
    fn set(&mut self, on: bool) {
        let value: &[u8] = if on { b"1" } else { b"0" };
        let result = self
            .file
            .seek(SeekFrom::Start(0))
            .and_then(|_| self.file.write_all(value))
            .and_then(|()| self.file.flush());
        if let Err(e) = result {
            warn!("Failed to write {}: {}", self.path.display(), e);
        }
    }
}

#[derive(Debug)]
struct AdcChannel {
    raw: File,
    last: u16,
    faults: FaultCounter,
}

/// Potentiometer inputs read through an IIO ADC.
#[derive(Debug)]
pub struct IioAdc {
    shift: u32,
    channels: HashMap<ChannelId, AdcChannel>,
}

impl IioAdc {
    /// Open an IIO ADC device and the raw attribute of each channel
    ///
    /// # Arguments
    ///
    /// * `device` - Device directory (e.g., "/sys/bus/iio/devices/iio:device0")
    /// * `adc_bits` - ADC resolution (1 to 16); samples are left-aligned to 16 bits
    /// * `channels` - Channels to read; each needs an `in_voltage{N}_raw` attribute
    ///
    /// # Errors
    ///
    /// Returns error if `adc_bits` is out of range, the device directory does
    /// not exist or a channel attribute cannot be opened
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use wheel_gamepad::hal::sysfs::IioAdc;
    ///
    /// let adc = IioAdc::open("/sys/bus/iio/devices/iio:device0", 12, &[0, 1])?;
    /// # Ok::<(), wheel_gamepad::error::GamepadError>(())
    /// ```
    pub fn open<P: AsRef<Path>>(device: P, adc_bits: u8, channels: &[ChannelId]) -> Result<Self> {
        let device = device.as_ref().to_path_buf();

        if !(1..=16).contains(&adc_bits) {
            return Err(GamepadError::Hardware(format!(
                "ADC resolution must be between 1 and 16 bits, got {}",
                adc_bits
            )));
        }

        if !device.is_dir() {
            return Err(GamepadError::Hardware(format!(
                "IIO device {} not found",
                device.display()
            )));
        }

        let mut opened = HashMap::with_capacity(channels.len());
        for &channel in channels {
            let path = device.join(format!("in_voltage{}_raw", channel));
            let raw = File::open(&path).map_err(|e| {
                GamepadError::Hardware(format!("Failed to open {}: {}", path.display(), e))
            })?;
            opened.insert(
                channel,
                AdcChannel {
                    raw,
                    last: 0,
                    faults: FaultCounter::default(),
                },
            );
        }

        info!(
            "Opened IIO ADC at {} ({} bits, {} channels)",
            device.display(),
            adc_bits,
            channels.len()
        );
        Ok(Self {
            shift: 16 - u32::from(adc_bits),
            channels: opened,
        })
    }
}

/// Reads one raw sample and left-aligns it by `shift` bits.
fn read_sample(file: &mut File, shift: u32) -> Result<u16> {
    let contents = read_attribute(file)?;
    let raw: u32 = contents
        .trim()
        .parse()
        .map_err(|e| GamepadError::Hardware(format!("Invalid sample {:?}: {}", contents.trim(), e)))?;

    let sample = u64::from(raw) << shift;
    Ok(sample.min(u64::from(u16::MAX)) as u16)
}

impl AnalogInput for IioAdc {
    fn read_analog(&mut self, channel: ChannelId) -> u16 {
        let Some(adc) = self.channels.get_mut(&channel) else {
            warn!("ADC channel {} was not opened", channel);
            return 0;
        };

        match read_sample(&mut adc.raw, self.shift) {
            Ok(sample) => {
                if let Some(failures) = adc.faults.recovered() {
                    info!("ADC channel {} readable again after {} failed reads", channel, failures);
                }
                adc.last = sample;
            }
            Err(e) => {
                if adc.faults.failed() {
                    warn!(
                        "Failed to read ADC channel {} ({} in a row), holding last sample: {}",
                        channel, adc.faults.failures, e
                    );
                }
            }
        }

        adc.last
    }
}
