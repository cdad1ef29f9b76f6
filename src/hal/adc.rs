use avr_device::atmega128a::ADC;
use core::convert::Infallible;
use embedded_hal::adc::{Channel, OneShot};

const ADSC: u8 = 0x40;

/// Single-ended input `CH` (ADC0..ADC7 on port F)
pub struct AdcPin<const CH: u8>;

impl<const CH: u8> Channel<Adc> for AdcPin<CH> {
    type ID = u8;

    fn channel() -> u8 {
        CH
    }
}

/// 10-bit converter presented as 12-bit samples.
///
/// Results are shifted left by two so callers see the same 0..=4095 range
/// as the 12-bit converter the battery thresholds were defined against.
pub struct Adc {
    adc: ADC,
    converting: Option<u8>,
}

impl Adc {
    pub fn new(adc: ADC) -> Self {
        unsafe {
            // Enable ADC, prescaler div128 (125kHz @ 16MHz)
            adc.adcsra.write(|w| w.bits(0x87));
            // Reference voltage = AVCC
            adc.admux.write(|w| w.bits(0x40));
        }
        Self {
            adc,
            converting: None,
        }
    }

    fn start(&mut self, channel: u8) {
        unsafe {
            self.adc
                .admux
                .modify(|r, w| w.bits((r.bits() & 0xE0) | (channel & 0x07)));
            self.adc.adcsra.modify(|r, w| w.bits(r.bits() | ADSC));
        }
        self.converting = Some(channel);
    }
}

impl<const CH: u8> OneShot<Adc, u16, AdcPin<CH>> for Adc {
    type Error = Infallible;

    fn read(&mut self, _pin: &mut AdcPin<CH>) -> nb::Result<u16, Infallible> {
        match self.converting {
            Some(channel) if channel == CH => {
                if self.adc.adcsra.read().bits() & ADSC != 0 {
                    return Err(nb::Error::WouldBlock);
                }
                self.converting = None;
                let raw = self.adc.adc.read().bits() & 0x03FF;
                Ok(raw << 2)
            }
            Some(_) if self.adc.adcsra.read().bits() & ADSC != 0 => Err(nb::Error::WouldBlock),
            // Idle, or a finished conversion for another channel nobody collected
            _ => {
                self.start(CH);
                Err(nb::Error::WouldBlock)
            }
        }
    }
}
