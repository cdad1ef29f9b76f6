use bitflags::bitflags;
use embedded_hal::digital::v2::InputPin;

use crate::config::BUTTON_DEBOUNCE_POLLS;

bitflags! {
    /// Button pad bitmask, one bit per button
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Buttons: u8 {
        const A = 1 << 0;
        const B = 1 << 1;
        const X = 1 << 2;
        const Y = 1 << 3;
        const UP = 1 << 4;
        const DOWN = 1 << 5;
        const LEFT = 1 << 6;
        const RIGHT = 1 << 7;
    }
}

pub const BUTTON_COUNT: usize = 8;

/// Eight active-low buttons, wired in bit order A, B, X, Y, Up, Down, Left, Right.
///
/// Each call to [`poll`](Self::poll) samples every pin once. A level change
/// must hold for `BUTTON_DEBOUNCE_POLLS` consecutive polls before it counts.
pub struct ButtonMatrix<P> {
    pins: [P; BUTTON_COUNT],
    states: [bool; BUTTON_COUNT],
    debounce_counters: [u8; BUTTON_COUNT],
}

impl<P: InputPin> ButtonMatrix<P> {
    pub fn new(pins: [P; BUTTON_COUNT]) -> Self {
        Self {
            pins,
            states: [false; BUTTON_COUNT],
            debounce_counters: [0; BUTTON_COUNT],
        }
    }

    /// Sample the pad and return the buttons that went down this poll.
    pub fn poll(&mut self) -> Buttons {
        let mut pressed = Buttons::empty();

        for (idx, pin) in self.pins.iter().enumerate() {
            // Unreadable pins count as released
            let raw_state = pin.is_low().unwrap_or(false);

            if raw_state != self.states[idx] {
                self.debounce_counters[idx] = self.debounce_counters[idx].saturating_add(1);
                if self.debounce_counters[idx] >= BUTTON_DEBOUNCE_POLLS {
                    self.states[idx] = raw_state;
                    self.debounce_counters[idx] = 0;
                    if raw_state {
                        pressed |= Buttons::from_bits_retain(1 << idx);
                    }
                }
            } else {
                self.debounce_counters[idx] = 0;
            }
        }

        pressed
    }

    /// Buttons currently held down after debouncing
    pub fn held(&self) -> Buttons {
        self.states
            .iter()
            .enumerate()
            .filter(|(_, down)| **down)
            .fold(Buttons::empty(), |acc, (idx, _)| {
                acc | Buttons::from_bits_retain(1 << idx)
            })
    }

    pub fn release(self) -> [P; BUTTON_COUNT] {
        self.pins
    }
}
