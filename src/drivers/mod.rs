pub mod buttons;
pub mod buzzer;
pub mod display;
pub mod led;
pub mod peripherals;
#[cfg(all(target_arch = "avr", feature = "atmega128"))]
pub mod serial_console;

pub use buttons::{ButtonMatrix, Buttons};
pub use buzzer::{Audio, Buzzer, Envelope, PlayTone, Waveform};
pub use display::{ConsoleDisplay, Display, TextAlign};
pub use led::{RgbLed, StatusLed};
pub use peripherals::{HalPeripherals, Peripherals, StubPeripherals};

#[cfg(all(target_arch = "avr", feature = "atmega128"))]
pub use serial_console::SerialConsole;
