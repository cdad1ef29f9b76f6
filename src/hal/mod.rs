//! ATmega128 register-level drivers behind `embedded-hal` traits.

pub mod adc;
pub mod gpio;
pub mod pwm;
pub mod timer;
pub mod uart;

pub use adc::{Adc, AdcPin};
pub use gpio::board;
pub use gpio::{Input, Output, Pin, PortPin};
pub use pwm::{Backlight, ToneTimer};
pub use timer::{delay_ms, init_millis, millis};
