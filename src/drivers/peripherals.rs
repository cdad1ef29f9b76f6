//! Peripheral access used by the test sequence.
//!
//! Two implementations: [`StubPeripherals`] for builds without the board
//! attached, and [`HalPeripherals`] over any `embedded-hal` pins, ADC and
//! PWM channel.

use core::marker::PhantomData;

use embedded_hal::adc::{Channel, OneShot};
use embedded_hal::digital::v2::InputPin;
use embedded_hal::PwmPin;

use crate::diagnostics::{Diagnostics, Fault};

/// Largest value of a 12-bit battery sample
pub const ADC_MAX: u16 = 4095;

pub trait Peripherals {
    /// One-time peripheral setup
    fn init(&mut self) {}

    fn usb_power_detected(&mut self) -> bool;

    fn charging(&mut self) -> bool;

    /// Raw 12-bit battery sense sample, 0..=4095
    fn battery_sample(&mut self) -> u16;

    /// Backlight brightness, 0..=65535
    fn set_backlight(&mut self, level: u16);

    /// Fault recorded since the last call, if any
    fn take_fault(&mut self) -> Option<Fault> {
        None
    }
}

/// Board-less stand-in: no USB, no charge, empty battery, no backlight.
#[derive(Debug, Default, Clone, Copy)]
pub struct StubPeripherals;

impl Peripherals for StubPeripherals {
    fn usb_power_detected(&mut self) -> bool {
        false
    }

    fn charging(&mut self) -> bool {
        false
    }

    fn battery_sample(&mut self) -> u16 {
        0
    }

    fn set_backlight(&mut self, _level: u16) {}
}

/// Peripherals backed by real pins.
///
/// VBUS detect is active high, charge status active low. Read failures fall
/// back to the stub defaults and are recorded in [`Diagnostics`].
pub struct HalPeripherals<VBUS, CHG, ADC, CH, BL, A> {
    vbus: VBUS,
    charge: CHG,
    adc: ADC,
    channel: CH,
    backlight: BL,
    diagnostics: Diagnostics,
    _adc: PhantomData<A>,
}

impl<VBUS, CHG, ADC, CH, BL, A> HalPeripherals<VBUS, CHG, ADC, CH, BL, A>
where
    VBUS: InputPin,
    CHG: InputPin,
    ADC: OneShot<A, u16, CH>,
    CH: Channel<A>,
    BL: PwmPin<Duty = u16>,
{
    pub fn new(vbus: VBUS, charge: CHG, adc: ADC, channel: CH, backlight: BL) -> Self {
        Self {
            vbus,
            charge,
            adc,
            channel,
            backlight,
            diagnostics: Diagnostics::new(),
            _adc: PhantomData,
        }
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn release(self) -> (VBUS, CHG, ADC, CH, BL) {
        (self.vbus, self.charge, self.adc, self.channel, self.backlight)
    }
}

impl<VBUS, CHG, ADC, CH, BL, A> Peripherals for HalPeripherals<VBUS, CHG, ADC, CH, BL, A>
where
    VBUS: InputPin,
    CHG: InputPin,
    ADC: OneShot<A, u16, CH>,
    CH: Channel<A>,
    BL: PwmPin<Duty = u16>,
{
    fn init(&mut self) {
        self.backlight.enable();
    }

    fn usb_power_detected(&mut self) -> bool {
        match self.vbus.is_high() {
            Ok(level) => level,
            Err(_) => {
                self.diagnostics.report(Fault::VbusRead);
                false
            }
        }
    }

    fn charging(&mut self) -> bool {
        match self.charge.is_low() {
            Ok(level) => level,
            Err(_) => {
                self.diagnostics.report(Fault::ChargeStatusRead);
                false
            }
        }
    }

    fn battery_sample(&mut self) -> u16 {
        match nb::block!(self.adc.read(&mut self.channel)) {
            Ok(raw) => raw.min(ADC_MAX),
            Err(_) => {
                self.diagnostics.report(Fault::BatteryAdc);
                0
            }
        }
    }

    fn set_backlight(&mut self, level: u16) {
        let max = self.backlight.get_max_duty() as u32;
        let duty = level as u32 * max / u16::MAX as u32;
        self.backlight.set_duty(duty as u16);
    }

    fn take_fault(&mut self) -> Option<Fault> {
        self.diagnostics.take_unreported()
    }
}
