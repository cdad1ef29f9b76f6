//! Timer-driven outputs.
//!
//! Timer1 channel A drives the backlight with 16-bit fast PWM, Timer3
//! channel A toggles the buzzer in CTC mode.

use avr_device::atmega128a::{PORTB, PORTE, TC1, TC3};
use embedded_hal::PwmPin;

use super::gpio::{Output, Pin};
use crate::config::CPU_FREQ_HZ;
use crate::drivers::PlayTone;

const COM1A1: u8 = 0x80;
const WGM11: u8 = 0x02;
const WGM13_12: u8 = 0x18;
const CS_DIV1: u8 = 0x01;

const COM3A0: u8 = 0x40;
const WGM32: u8 = 0x08;
const CS_DIV8: u8 = 0x02;
const TONE_PRESCALER: u32 = 8;

/// Backlight on OC1A (PB5). Fast PWM, TOP = ICR1 = 0xFFFF, ~244Hz.
pub struct Backlight {
    tc1: TC1,
    _pin: Pin<PORTB, 5, Output>,
}

impl Backlight {
    pub fn new(tc1: TC1, pin: Pin<PORTB, 5, Output>) -> Self {
        unsafe {
            tc1.tccr1a.write(|w| w.bits(WGM11));
            tc1.tccr1b.write(|w| w.bits(WGM13_12 | CS_DIV1));
            tc1.icr1.write(|w| w.bits(0xFFFF));
            tc1.ocr1a.write(|w| w.bits(0));
        }
        Self { tc1, _pin: pin }
    }
}

impl PwmPin for Backlight {
    type Duty = u16;

    fn disable(&mut self) {
        unsafe {
            self.tc1.tccr1a.modify(|r, w| w.bits(r.bits() & !COM1A1));
        }
    }

    fn enable(&mut self) {
        unsafe {
            self.tc1.tccr1a.modify(|r, w| w.bits(r.bits() | COM1A1));
        }
    }

    fn get_duty(&self) -> u16 {
        self.tc1.ocr1a.read().bits()
    }

    fn get_max_duty(&self) -> u16 {
        0xFFFF
    }

    fn set_duty(&mut self, duty: u16) {
        unsafe {
            self.tc1.ocr1a.write(|w| w.bits(duty));
        }
    }
}

/// Buzzer on OC3A (PE3), square wave by toggling on compare match.
pub struct ToneTimer {
    tc3: TC3,
    _pin: Pin<PORTE, 3, Output>,
}

impl ToneTimer {
    pub fn new(tc3: TC3, pin: Pin<PORTE, 3, Output>) -> Self {
        let mut tone = Self { tc3, _pin: pin };
        tone.play_tone(0);
        tone
    }

    /// Compare value giving `freq` with one toggle per half period
    fn compare_value(freq: u16) -> u32 {
        (CPU_FREQ_HZ / (2 * TONE_PRESCALER * freq as u32)).saturating_sub(1)
    }
}

impl PlayTone for ToneTimer {
    fn play_tone(&mut self, freq: u16) {
        unsafe {
            if freq == 0 {
                self.tc3.tccr3b.write(|w| w.bits(0));
                self.tc3.tccr3a.write(|w| w.bits(0));
                return;
            }
            let top = Self::compare_value(freq).min(0xFFFF) as u16;
            self.tc3.tccr3b.write(|w| w.bits(0));
            self.tc3.tcnt3.write(|w| w.bits(0));
            self.tc3.ocr3a.write(|w| w.bits(top));
            self.tc3.tccr3a.write(|w| w.bits(COM3A0));
            self.tc3.tccr3b.write(|w| w.bits(WGM32 | CS_DIV8));
        }
    }

    fn can_play_tone(&self, freq: u16) -> bool {
        freq != 0 && Self::compare_value(freq) <= 0xFFFF
    }
}
