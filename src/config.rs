//! Configuration constants for the self-test firmware

use smart_leds::RGB8;

use crate::drivers::buttons::Buttons;
use crate::drivers::buzzer::{Envelope, Waveform};
use crate::sequencer::button_test::ButtonFeedback;
use crate::sequencer::scheduler::RearmPolicy;

/// CPU frequency in Hz
pub const CPU_FREQ_HZ: u32 = 16_000_000;

/// UART baud rate
pub const UART_BAUD: u32 = 9600;

// Board pins (ATmega128). Port D bit numbers.
pub const VBUS_DETECT_PIN: u8 = 2;
pub const CHARGE_STATUS_PIN: u8 = 4;
/// ADC input wired to the battery divider
pub const ADC_BAT_SENSE_CHANNEL: u8 = 0;

/// Battery ADC contract: 12-bit samples against a 3.3V reference
pub const ADC_BITS: u32 = 12;
pub const ADC_VREF: f32 = 3.3;
pub const ADC_VREF_MV: u32 = 3300;
/// Battery voltage divider compensation
pub const BATTERY_DIVIDER: u32 = 3;
pub const BATTERY_DIVIDER_RATIO: f32 = BATTERY_DIVIDER as f32;

/// Acceptance band for the battery, exclusive on both ends
pub const BATTERY_MIN_VOLTS: f32 = 2.5;
pub const BATTERY_MAX_VOLTS: f32 = 4.5;

/// Backlight PWM levels
pub const BACKLIGHT_MAX: u16 = u16::MAX;
pub const BACKLIGHT_MID: f32 = 32768.0;

/// Settle delays before a requested state change takes effect
pub const SETTLE_MS: u32 = 500;
pub const SHORT_SETTLE_MS: u32 = 100;

/// Main loop period
pub const FRAME_MS: u32 = 10;

/// What to do when a different target is requested mid-countdown
pub const REARM_POLICY: RearmPolicy = RearmPolicy::KeepDeadline;

/// Consecutive polls a raw button level must hold before it is accepted
pub const BUTTON_DEBOUNCE_POLLS: u8 = 3;

/// Display text buffer capacity in bytes
pub const TEXT_CAPACITY: usize = 32;

/// Buzzer frequency limits
pub const BUZZER_MIN_FREQ: u16 = 35;
pub const BUZZER_MAX_FREQ: u16 = 7000;

/// Tone channel 0 configuration applied at init
pub const TONE_ENVELOPE: Envelope = Envelope {
    waveform: Waveform::Square,
    attack_ms: 250,
    decay_ms: 250,
    sustain: 0,
    release_ms: 0,
};

pub const LED_RED: RGB8 = RGB8 { r: 255, g: 0, b: 0 };
pub const LED_GREEN: RGB8 = RGB8 { r: 0, g: 255, b: 0 };
pub const LED_BLUE: RGB8 = RGB8 { r: 0, g: 0, b: 255 };
pub const LED_DIM_BLUE: RGB8 = RGB8 { r: 0, g: 0, b: 128 };
pub const LED_DIM_GREEN: RGB8 = RGB8 { r: 0, g: 128, b: 0 };
pub const TEXT_COLOR: RGB8 = RGB8 { r: 255, g: 255, b: 255 };

/// Per-button feedback, in priority order
pub static BUTTON_FEEDBACK: [ButtonFeedback; 8] = [
    ButtonFeedback { button: Buttons::A, name: "A", color: LED_RED, frequency_hz: 988 },
    ButtonFeedback { button: Buttons::B, name: "B", color: LED_GREEN, frequency_hz: 1047 },
    ButtonFeedback { button: Buttons::X, name: "X", color: LED_BLUE, frequency_hz: 1175 },
    ButtonFeedback { button: Buttons::Y, name: "Y", color: LED_RED, frequency_hz: 1319 },
    ButtonFeedback { button: Buttons::UP, name: "Up", color: LED_GREEN, frequency_hz: 988 },
    ButtonFeedback { button: Buttons::DOWN, name: "Down", color: LED_BLUE, frequency_hz: 1319 },
    ButtonFeedback { button: Buttons::LEFT, name: "Left", color: LED_RED, frequency_hz: 1175 },
    ButtonFeedback { button: Buttons::RIGHT, name: "Right", color: LED_GREEN, frequency_hz: 1047 },
];

pub const TEXT_STARTUP: &str = "Self Test";
pub const TEXT_REMOVE_USB: &str = "Remove USB cable!";
pub const TEXT_BUTTON_PROMPT: &str = "Test D-pad\nand ABXY buttons...";
pub const TEXT_FAIL: &str = "FAIL!";
pub const TEXT_PASS: &str = "Pass";
