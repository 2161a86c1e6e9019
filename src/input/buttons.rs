//! # Button Edge Tracker
//!
//! Latches the state of the ten gamepad buttons and turns raw digital levels
//! into press/release events.
//!
//! There is no debounce timer. The inputs are pulled down and sampled once
//! per poll tick, so a bounce lasting a single tick shows up as a genuine
//! press followed by a release.
//!
//! ## Button Assignments
//!
//! | Buttons | Location |
//! |---------|----------|
//! | 1-6 | Steering wheel |
//! | 7-10 | Gear lever |
//!
//! ## Usage
//!
//! ```
//! use wheel_gamepad::input::buttons::{ButtonBank, ButtonEvent, ButtonId};
//!
//! let mut bank = ButtonBank::new([4, 9, 2, 3, 6, 5, 11, 13, 12, 7]);
//! let button = ButtonId::new(7).unwrap();
//!
//! assert_eq!(bank.button_mut(button).update(true), Some(ButtonEvent::Pressed(button)));
//! assert_eq!(bank.button_mut(button).update(true), None);
//! assert_eq!(bank.button_mut(button).update(false), Some(ButtonEvent::Released(button)));
//! ```

use std::fmt;

use crate::hal::{DigitalInput, PinId};

/// Number of buttons on the gamepad.
pub const BUTTON_COUNT: usize = 10;

/// Logical button number, 1 to 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ButtonId(u8);

impl ButtonId {
    /// Creates a button id, returning `None` outside `1..=10`.
    #[must_use]
    pub fn new(id: u8) -> Option<Self> {
        (1..=BUTTON_COUNT as u8).contains(&id).then_some(Self(id))
    }

    /// Returns the 1-based button number.
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }

    /// Returns the bit mask of this button in the HID report.
    #[must_use]
    pub fn mask(self) -> u16 {
        1 << (self.0 - 1)
    }
}

impl fmt::Display for ButtonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Edge detected on a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    Pressed(ButtonId),
    Released(ButtonId),
}

/// Latched state of one button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonState {
    id: ButtonId,
    pressed: bool,
}

impl ButtonState {
    /// Creates a released button.
    #[must_use]
    pub fn new(id: ButtonId) -> Self {
        Self { id, pressed: false }
    }

    /// Returns the button id.
    #[must_use]
    pub fn id(&self) -> ButtonId {
        self.id
    }

    /// Returns whether the button is currently latched as pressed.
    #[must_use]
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Feeds the current level and returns the edge, if any.
    pub fn update(&mut self, level: bool) -> Option<ButtonEvent> {
        match (level, self.pressed) {
            (true, false) => {
                self.pressed = true;
                Some(ButtonEvent::Pressed(self.id))
            }
            (false, true) => {
                self.pressed = false;
                Some(ButtonEvent::Released(self.id))
            }
            _ => None,
        }
    }
}

/// A button paired with the pin it is wired to.
#[derive(Debug, Clone, Copy)]
pub struct ButtonDescriptor {
    pub pin: PinId,
    pub state: ButtonState,
}

/// All ten buttons, indexed by [`ButtonId`].
#[derive(Debug, Clone)]
pub struct ButtonBank {
    buttons: [ButtonDescriptor; BUTTON_COUNT],
}

impl ButtonBank {
    /// Creates a bank of released buttons.
    ///
    /// # Arguments
    ///
    /// * `pins` - Pin of each button, in button order (button 1 first)
    #[must_use]
    pub fn new(pins: [PinId; BUTTON_COUNT]) -> Self {
        let mut index = 0u8;
        let buttons = pins.map(|pin| {
            index += 1;
            ButtonDescriptor {
                pin,
                state: ButtonState::new(ButtonId(index)),
            }
        });
        Self { buttons }
    }

    /// Reads every button once, in id order, and appends the edges to `events`.
    pub fn poll<D: DigitalInput + ?Sized>(&mut self, input: &mut D, events: &mut Vec<ButtonEvent>) {
        for button in &mut self.buttons {
            let level = input.read_digital(button.pin);
            if let Some(event) = button.state.update(level) {
                events.push(event);
            }
        }
    }

    /// Returns the descriptor of `id`.
    #[must_use]
    pub fn button(&self, id: ButtonId) -> &ButtonDescriptor {
        &self.buttons[usize::from(id.0 - 1)]
    }

    /// Returns the latched state of `id` for direct updates.
    pub fn button_mut(&mut self, id: ButtonId) -> &mut ButtonState {
        &mut self.buttons[usize::from(id.0 - 1)].state
    }

    /// Iterates over all buttons in id order.
    pub fn iter(&self) -> impl Iterator<Item = &ButtonDescriptor> {
        self.buttons.iter()
    }

    /// Returns the set of pressed buttons as a report bit mask.
    #[must_use]
    pub fn pressed_mask(&self) -> u16 {
        self.buttons
            .iter()
            .filter(|b| b.state.is_pressed())
            .fold(0, |mask, b| mask | b.state.id().mask())
    }
}
