use avr_device::atmega128a::{PORTA, PORTB, PORTC, PORTD, PORTE};
use core::convert::Infallible;
use core::marker::PhantomData;
use embedded_hal::digital::v2::{InputPin, OutputPin};

pub trait PinMode {}
pub struct Input;
pub struct Output;
impl PinMode for Input {}
impl PinMode for Output {}

/// Pin `PIN` of port `PORT`, mode tracked in the type
#[derive(Debug)]
pub struct Pin<PORT, const PIN: u8, MODE> {
    _port: PhantomData<PORT>,
    _mode: PhantomData<MODE>,
}

/// Pin with the bit number moved to runtime, so pins of one port share a type
#[derive(Debug)]
pub struct PortPin<PORT, MODE> {
    bit: u8,
    _port: PhantomData<PORT>,
    _mode: PhantomData<MODE>,
}

impl<PORT, const P: u8> Pin<PORT, P, Input> {
    /// Pins come out of reset as floating inputs
    pub const fn new() -> Self {
        Pin {
            _port: PhantomData,
            _mode: PhantomData,
        }
    }
}

macro_rules! impl_port {
    ($PORT:ident, $port:ident, $ddr:ident, $pin:ident) => {
        impl<const P: u8, MODE: PinMode> Pin<$PORT, P, MODE> {
            pub fn into_output(self) -> Pin<$PORT, P, Output> {
                unsafe {
                    (*$PORT::ptr()).$ddr.modify(|r, w| w.bits(r.bits() | (1 << P)));
                }
                Pin {
                    _port: PhantomData,
                    _mode: PhantomData,
                }
            }

            pub fn into_floating_input(self) -> Pin<$PORT, P, Input> {
                unsafe {
                    (*$PORT::ptr()).$ddr.modify(|r, w| w.bits(r.bits() & !(1 << P)));
                    (*$PORT::ptr()).$port.modify(|r, w| w.bits(r.bits() & !(1 << P)));
                }
                Pin {
                    _port: PhantomData,
                    _mode: PhantomData,
                }
            }

            pub fn into_pull_up_input(self) -> Pin<$PORT, P, Input> {
                unsafe {
                    (*$PORT::ptr()).$ddr.modify(|r, w| w.bits(r.bits() & !(1 << P)));
                    (*$PORT::ptr()).$port.modify(|r, w| w.bits(r.bits() | (1 << P)));
                }
                Pin {
                    _port: PhantomData,
                    _mode: PhantomData,
                }
            }

            pub fn downgrade(self) -> PortPin<$PORT, MODE> {
                PortPin {
                    bit: P,
                    _port: PhantomData,
                    _mode: PhantomData,
                }
            }
        }

        impl<const P: u8> InputPin for Pin<$PORT, P, Input> {
            type Error = Infallible;

            #[inline]
            fn is_high(&self) -> Result<bool, Infallible> {
                Ok(unsafe { (*$PORT::ptr()).$pin.read().bits() } & (1 << P) != 0)
            }

            #[inline]
            fn is_low(&self) -> Result<bool, Infallible> {
                self.is_high().map(|high| !high)
            }
        }

        impl<const P: u8> OutputPin for Pin<$PORT, P, Output> {
            type Error = Infallible;

            #[inline]
            fn set_high(&mut self) -> Result<(), Infallible> {
                unsafe {
                    (*$PORT::ptr()).$port.modify(|r, w| w.bits(r.bits() | (1 << P)));
                }
                Ok(())
            }

            #[inline]
            fn set_low(&mut self) -> Result<(), Infallible> {
                unsafe {
                    (*$PORT::ptr()).$port.modify(|r, w| w.bits(r.bits() & !(1 << P)));
                }
                Ok(())
            }
        }

        impl InputPin for PortPin<$PORT, Input> {
            type Error = Infallible;

            #[inline]
            fn is_high(&self) -> Result<bool, Infallible> {
                Ok(unsafe { (*$PORT::ptr()).$pin.read().bits() } & (1 << self.bit) != 0)
            }

            #[inline]
            fn is_low(&self) -> Result<bool, Infallible> {
                self.is_high().map(|high| !high)
            }
        }
    };
}

impl_port!(PORTA, porta, ddra, pina);
impl_port!(PORTB, portb, ddrb, pinb);
impl_port!(PORTC, portc, ddrc, pinc);
impl_port!(PORTD, portd, ddrd, pind);
impl_port!(PORTE, porte, ddre, pine);

/// Self-test board wiring
pub mod board {
    use super::*;

    // RGB status LED (PORTA)
    pub type LedRed = Pin<PORTA, 0, Input>;
    pub type LedGreen = Pin<PORTA, 1, Input>;
    pub type LedBlue = Pin<PORTA, 2, Input>;

    // Timer compare outputs
    pub type BacklightPin = Pin<PORTB, 5, Input>;
    pub type BuzzerPin = Pin<PORTE, 3, Input>;

    // Button pad (PORTC), active low
    pub type BtnA = Pin<PORTC, 0, Input>;
    pub type BtnB = Pin<PORTC, 1, Input>;
    pub type BtnX = Pin<PORTC, 2, Input>;
    pub type BtnY = Pin<PORTC, 3, Input>;
    pub type BtnUp = Pin<PORTC, 4, Input>;
    pub type BtnDown = Pin<PORTC, 5, Input>;
    pub type BtnLeft = Pin<PORTC, 6, Input>;
    pub type BtnRight = Pin<PORTC, 7, Input>;

    // Power sense (PORTD)
    pub type VbusDetect = Pin<PORTD, { crate::config::VBUS_DETECT_PIN }, Input>;
    pub type ChargeStatus = Pin<PORTD, { crate::config::CHARGE_STATUS_PIN }, Input>;
}
