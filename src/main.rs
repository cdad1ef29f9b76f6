#![no_std]
#![no_main]

use panic_halt as _;
use avr_device::atmega128a::{Peripherals, PORTC};

use handheld_selftest::config::{ADC_BAT_SENSE_CHANNEL, FRAME_MS, TONE_ENVELOPE};
use handheld_selftest::drivers::{
    ButtonMatrix, Buzzer, ConsoleDisplay, HalPeripherals, RgbLed, SerialConsole, StatusLed,
};
use handheld_selftest::hal::board::*;
use handheld_selftest::hal::{self, Adc, AdcPin, Backlight, Input, PortPin, ToneTimer};
use handheld_selftest::logger::Logger;
use handheld_selftest::Sequencer;

#[avr_device::entry]
fn main() -> ! {
    let dp = Peripherals::take().unwrap();

    hal::init_millis(dp.TC0);
    hal::uart::init(dp.USART0);

    let console = SerialConsole::new();
    let mut log = Logger::new(console);
    let mut display = ConsoleDisplay::new(console);

    let mut board = HalPeripherals::new(
        VbusDetect::new().into_floating_input(),
        ChargeStatus::new().into_pull_up_input(),
        Adc::new(dp.ADC),
        AdcPin::<ADC_BAT_SENSE_CHANNEL>,
        Backlight::new(dp.TC1, BacklightPin::new().into_output()),
    );
    let mut buzzer = Buzzer::new(ToneTimer::new(dp.TC3, BuzzerPin::new().into_output()), TONE_ENVELOPE);

    let pad: [PortPin<PORTC, Input>; 8] = [
        BtnA::new().into_pull_up_input().downgrade(),
        BtnB::new().into_pull_up_input().downgrade(),
        BtnX::new().into_pull_up_input().downgrade(),
        BtnY::new().into_pull_up_input().downgrade(),
        BtnUp::new().into_pull_up_input().downgrade(),
        BtnDown::new().into_pull_up_input().downgrade(),
        BtnLeft::new().into_pull_up_input().downgrade(),
        BtnRight::new().into_pull_up_input().downgrade(),
    ];
    let mut buttons = ButtonMatrix::new(pad);

    let mut led = RgbLed::new(
        LedRed::new().into_output(),
        LedGreen::new().into_output(),
        LedBlue::new().into_output(),
    );

    // Enable interrupts globally
    unsafe { avr_device::interrupt::enable() };

    let mut seq = Sequencer::new();
    seq.init(hal::millis(), &mut board, &mut buzzer, &mut log);

    loop {
        let frame_start = hal::millis();

        buzzer.tick(frame_start);
        seq.tick(frame_start, &mut log);

        let pressed = buttons.poll();
        seq.update(frame_start, pressed, &mut board, &mut buzzer, &mut log);

        led.set_color(seq.led());
        seq.render(frame_start, &mut display);

        let elapsed = hal::millis().wrapping_sub(frame_start);
        if elapsed < FRAME_MS {
            hal::delay_ms(FRAME_MS - elapsed);
        }
    }
}
