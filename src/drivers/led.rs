use embedded_hal::digital::v2::OutputPin;
use smart_leds::RGB8;

pub trait StatusLed {
    fn set_color(&mut self, color: RGB8);
}

/// Three discrete LEDs standing in for an RGB status LED.
/// A channel lights whenever its component is non-zero.
pub struct RgbLed<R, G, B> {
    red: R,
    green: G,
    blue: B,
    color: RGB8,
}

impl<R: OutputPin, G: OutputPin, B: OutputPin> RgbLed<R, G, B> {
    pub fn new(red: R, green: G, blue: B) -> Self {
        let mut led = Self {
            red,
            green,
            blue,
            color: RGB8::default(),
        };
        led.set_color(RGB8::default());
        led
    }

    pub fn color(&self) -> RGB8 {
        self.color
    }
}

fn drive<P: OutputPin>(pin: &mut P, on: bool) {
    if on {
        pin.set_high().ok();
    } else {
        pin.set_low().ok();
    }
}

impl<R: OutputPin, G: OutputPin, B: OutputPin> StatusLed for RgbLed<R, G, B> {
    fn set_color(&mut self, color: RGB8) {
        drive(&mut self.red, color.r > 0);
        drive(&mut self.green, color.g > 0);
        drive(&mut self.blue, color.b > 0);
        self.color = color;
    }
}
