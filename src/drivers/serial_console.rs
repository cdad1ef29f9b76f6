use core::convert::Infallible;
use ufmt::uWrite;

use crate::hal::uart;

/// Handle to the USART0 transmit queue.
///
/// Holds no state, so the logger and the console display can each own a copy.
#[derive(Clone, Copy, Debug, Default)]
pub struct SerialConsole;

impl SerialConsole {
    pub fn new() -> Self {
        Self
    }

    pub fn write_byte(&mut self, byte: u8) {
        uart::write_byte(byte);
    }
}

impl uWrite for SerialConsole {
    type Error = Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Infallible> {
        for byte in s.bytes() {
            self.write_byte(byte);
        }
        Ok(())
    }
}
