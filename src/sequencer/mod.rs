//! The self-test sequence.
//!
//! START -> TEST_BATTERY -> TEST_BUTTONS -> PASS, with FAIL on a battery
//! outside the acceptance band and a REMOVE_USB loop while USB power is
//! present. Each frame the host calls [`Sequencer::tick`] to fire a pending
//! transition, then [`Sequencer::update`] and [`Sequencer::render`].
//! `update` only ever requests transitions; `current_state` changes in `tick`.

pub mod button_test;
pub mod scheduler;
mod state;

use heapless::String;
use smart_leds::RGB8;
use ufmt::{uWrite, uwrite};

use crate::config::{
    ADC_BITS, ADC_VREF, ADC_VREF_MV, BACKLIGHT_MAX, BACKLIGHT_MID, BATTERY_DIVIDER,
    BATTERY_DIVIDER_RATIO, BATTERY_MAX_VOLTS, BATTERY_MIN_VOLTS, LED_DIM_BLUE, LED_DIM_GREEN,
    LED_GREEN, LED_RED, REARM_POLICY, SETTLE_MS, SHORT_SETTLE_MS, TEXT_BUTTON_PROMPT,
    TEXT_CAPACITY, TEXT_COLOR, TEXT_FAIL, TEXT_PASS, TEXT_REMOVE_USB, TEXT_STARTUP,
    TONE_ENVELOPE,
};
use crate::drivers::{Audio, Buttons, Display, Peripherals, TextAlign};
use crate::logger::Logger;

use scheduler::{RearmPolicy, TransitionScheduler};
pub use state::State;

/// Battery voltage for a raw 12-bit sample, after divider compensation.
pub fn battery_voltage(raw: u16) -> f32 {
    let volts_per_step = ADC_VREF / (1u32 << ADC_BITS) as f32;
    raw as f32 * volts_per_step * BATTERY_DIVIDER_RATIO
}

/// Same conversion in whole millivolts, for display and logs.
pub fn battery_millivolts(raw: u16) -> u32 {
    (raw as u32 * ADC_VREF_MV * BATTERY_DIVIDER) >> ADC_BITS
}

/// Acceptance band check, exclusive at both ends.
pub fn battery_in_range(volts: f32) -> bool {
    volts > BATTERY_MIN_VOLTS && volts < BATTERY_MAX_VOLTS
}

/// Backlight level for the FAIL/PASS pulse
pub fn pulse_level(now: u32) -> u16 {
    let phase = libm::sinf((now >> 8) as f32);
    // float -> int casts saturate, so the +1.0 peak lands on u16::MAX
    (BACKLIGHT_MID + phase * BACKLIGHT_MID) as u16
}

/// Self-test state machine and the frame state it renders
pub struct Sequencer {
    current: State,
    scheduler: TransitionScheduler,
    text: String<TEXT_CAPACITY>,
    led: RGB8,
    pressed_buttons: Buttons,
    now: u32,
}

impl Sequencer {
    pub const fn new() -> Self {
        Self::with_policy(REARM_POLICY)
    }

    pub const fn with_policy(policy: RearmPolicy) -> Self {
        Self {
            current: State::Start,
            scheduler: TransitionScheduler::new(State::Start, policy),
            text: String::new(),
            led: RGB8 { r: 0, g: 0, b: 0 },
            pressed_buttons: Buttons::empty(),
            now: 0,
        }
    }

    /// One-time setup: peripherals, tone channel, and a clean START state.
    pub fn init<P, A, W>(&mut self, now: u32, peripherals: &mut P, audio: &mut A, log: &mut Logger<W>)
    where
        P: Peripherals,
        A: Audio,
        W: uWrite,
    {
        peripherals.init();
        audio.configure(TONE_ENVELOPE);

        self.now = now;
        self.current = State::Start;
        self.scheduler.reset(State::Start);
        self.text.clear();
        self.pressed_buttons = Buttons::empty();

        log.log_system(now, "self test ready");
    }

    /// Fire the settle timer if it has expired. Returns the state entered.
    pub fn tick<W: uWrite>(&mut self, now: u32, log: &mut Logger<W>) -> Option<State> {
        self.now = now;
        let next = self.scheduler.poll(now)?;
        let previous = core::mem::replace(&mut self.current, next);
        log.log_transition(now, previous, next);
        Some(next)
    }

    /// Ask for `target` to become current once `delay_ms` has passed.
    ///
    /// Requesting the already pending target does nothing. Requesting a
    /// different one while a countdown runs redirects it; whether the
    /// countdown restarts is governed by the [`RearmPolicy`].
    pub fn request_transition(&mut self, target: State, delay_ms: u32) {
        self.scheduler.request(target, delay_ms, self.now);
    }

    /// Per-frame step of the current state.
    pub fn update<P, A, W>(
        &mut self,
        now: u32,
        pressed: Buttons,
        peripherals: &mut P,
        audio: &mut A,
        log: &mut Logger<W>,
    ) where
        P: Peripherals,
        A: Audio,
        W: uWrite,
    {
        self.now = now;

        match self.current {
            State::Start => {
                peripherals.set_backlight(BACKLIGHT_MAX);
                self.set_text(TEXT_STARTUP);
                self.led = LED_GREEN;
                self.request_transition(State::TestBattery, SETTLE_MS);
            }
            State::TestBattery => {
                self.led = LED_RED;
                if peripherals.usb_power_detected() {
                    if self.scheduler.next_state() != State::RemoveUsb {
                        let charging = peripherals.charging();
                        log.log_sensor(now, "usb", 1, "");
                        log.log_sensor(now, "charging", charging as u32, "");
                    }
                    self.request_transition(State::RemoveUsb, SHORT_SETTLE_MS);
                } else {
                    self.check_battery(peripherals, log);
                }
                if let Some(fault) = peripherals.take_fault() {
                    log.log_error(now, fault);
                }
            }
            State::RemoveUsb => {
                self.led = LED_RED;
                self.set_text(TEXT_REMOVE_USB);
                self.request_transition(State::TestBattery, SHORT_SETTLE_MS);
            }
            State::TestButtons => {
                if self.pressed_buttons.is_empty() {
                    self.led = LED_DIM_BLUE;
                    self.set_text(TEXT_BUTTON_PROMPT);
                }
                self.poll_buttons(pressed, audio, log);
                if self.pressed_buttons == Buttons::all() {
                    self.request_transition(State::Pass, SETTLE_MS);
                }
            }
            State::Fail => {
                self.led = LED_RED;
                self.set_text(TEXT_FAIL);
                peripherals.set_backlight(pulse_level(now));
                if !pressed.is_empty() {
                    self.request_transition(State::Start, SHORT_SETTLE_MS);
                }
            }
            State::Pass => {
                self.pressed_buttons = Buttons::empty();
                self.led = LED_DIM_GREEN;
                self.set_text(TEXT_PASS);
                peripherals.set_backlight(pulse_level(now));
                if !pressed.is_empty() {
                    self.request_transition(State::Start, SHORT_SETTLE_MS);
                }
            }
        }
    }

    /// Draw the current text over the LED colour.
    pub fn render<D: Display>(&self, _now: u32, display: &mut D) {
        display.clear(self.led);
        display.draw_text(&self.text, TEXT_COLOR, TextAlign::CenterCenter);
    }

    fn check_battery<P: Peripherals, W: uWrite>(&mut self, peripherals: &mut P, log: &mut Logger<W>) {
        let raw = peripherals.battery_sample();
        let volts = battery_voltage(raw);
        let millivolts = battery_millivolts(raw);

        let (verdict, target) = if battery_in_range(volts) {
            ("PASS!", State::TestButtons)
        } else {
            ("FAIL!", State::Fail)
        };
        self.show_battery(verdict, millivolts);

        if self.scheduler.next_state() != target {
            log.log_sensor(self.now, "battery_raw", raw as u32, "");
            log.log_sensor(self.now, "battery", millivolts, "mV");
        }
        self.request_transition(target, SETTLE_MS);
    }

    /// `Battery: PASS!\n3.712v`. Millivolt resolution; the bench display
    /// used to print six decimals, which the 12-bit sample cannot support.
    fn show_battery(&mut self, verdict: &str, millivolts: u32) {
        self.text.clear();
        uwrite!(self.text, "Battery: {}\n{}.", verdict, millivolts / 1000).ok();
        let frac = millivolts % 1000;
        if frac < 100 {
            self.text.push('0').ok();
        }
        if frac < 10 {
            self.text.push('0').ok();
        }
        uwrite!(self.text, "{}v", frac).ok();
    }

    /// Replace the display text, truncating at the buffer capacity.
    fn set_text(&mut self, text: &str) {
        self.text.clear();
        for c in text.chars() {
            if self.text.push(c).is_err() {
                break;
            }
        }
    }

    pub fn current_state(&self) -> State {
        self.current
    }

    pub fn next_state(&self) -> State {
        self.scheduler.next_state()
    }

    pub fn transition_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn led(&self) -> RGB8 {
        self.led
    }

    pub fn pressed_buttons(&self) -> Buttons {
        self.pressed_buttons
    }
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::Envelope;
    use crate::logger::NullSink;

    #[derive(Default)]
    struct Board {
        usb: bool,
        sample: u16,
        backlight: Vec<u16>,
    }

    impl Peripherals for Board {
        fn usb_power_detected(&mut self) -> bool {
            self.usb
        }

        fn charging(&mut self) -> bool {
            self.usb
        }

        fn battery_sample(&mut self) -> u16 {
            self.sample
        }

        fn set_backlight(&mut self, level: u16) {
            self.backlight.push(level);
        }
    }

    #[derive(Default)]
    struct Tones {
        envelope: Option<Envelope>,
        played: Vec<u16>,
    }

    impl Audio for Tones {
        fn configure(&mut self, envelope: Envelope) {
            self.envelope = Some(envelope);
        }

        fn trigger_tone(&mut self, frequency_hz: u16) {
            self.played.push(frequency_hz);
        }
    }

    struct Rig {
        seq: Sequencer,
        board: Board,
        tones: Tones,
        log: Logger<NullSink>,
        now: u32,
    }

    impl Rig {
        fn new() -> Self {
            let mut rig = Self {
                seq: Sequencer::new(),
                board: Board::default(),
                tones: Tones::default(),
                log: Logger::new(NullSink),
                now: 0,
            };
            rig.seq.init(0, &mut rig.board, &mut rig.tones, &mut rig.log);
            rig
        }

        /// One frame: timers, then state update
        fn frame(&mut self, pressed: Buttons) {
            self.seq.tick(self.now, &mut self.log);
            self.seq
                .update(self.now, pressed, &mut self.board, &mut self.tones, &mut self.log);
        }

        /// Run idle frames every 10ms for `ms` milliseconds
        fn run(&mut self, ms: u32) {
            let end = self.now + ms;
            while self.now < end {
                self.now += 10;
                self.frame(Buttons::empty());
            }
        }

        fn press(&mut self, buttons: Buttons) {
            self.now += 10;
            self.frame(buttons);
        }

        fn reach_battery_test(&mut self) {
            self.frame(Buttons::empty());
            self.run(500);
            assert_eq!(self.seq.current_state(), State::TestBattery);
        }
    }

    #[test]
    fn voltage_conversion() {
        assert!((battery_voltage(1024) - 2.475).abs() < 1e-4);
        assert!((battery_voltage(1536) - 3.7125).abs() < 1e-4);
        assert!((battery_voltage(2048) - 4.95).abs() < 1e-4);
        assert!(!battery_in_range(2.5));
        assert!(!battery_in_range(4.5));
        assert!(battery_in_range(2.51));

        assert_eq!(battery_millivolts(1024), 2475);
        assert_eq!(battery_millivolts(1536), 3712);
        assert_eq!(battery_millivolts(4095), 9897);
    }

    #[test]
    fn pulse_follows_time_slices() {
        assert_eq!(pulse_level(0), 32768);
        assert_eq!(pulse_level(255), 32768);
        // sin(6) is negative
        assert!(pulse_level(6 << 8) < 32768);
    }

    #[test]
    fn init_configures_tone_channel() {
        let rig = Rig::new();
        assert_eq!(rig.tones.envelope, Some(TONE_ENVELOPE));
        assert_eq!(rig.seq.current_state(), State::Start);
    }

    #[test]
    fn start_shows_splash_then_moves_to_battery() {
        let mut rig = Rig::new();
        rig.frame(Buttons::empty());

        assert_eq!(rig.seq.text(), TEXT_STARTUP);
        assert_eq!(rig.seq.led(), LED_GREEN);
        assert_eq!(rig.board.backlight, vec![BACKLIGHT_MAX]);
        assert_eq!(rig.seq.next_state(), State::TestBattery);

        rig.run(490);
        assert_eq!(rig.seq.current_state(), State::Start);
        rig.run(10);
        assert_eq!(rig.seq.current_state(), State::TestBattery);
    }

    #[test]
    fn update_never_switches_state_itself() {
        let mut rig = Rig::new();
        rig.seq
            .update(10_000, Buttons::empty(), &mut rig.board, &mut rig.tones, &mut rig.log);
        rig.seq
            .update(20_000, Buttons::empty(), &mut rig.board, &mut rig.tones, &mut rig.log);
        assert_eq!(rig.seq.current_state(), State::Start);
        assert!(rig.seq.transition_pending());
    }

    #[test]
    fn low_battery_fails() {
        let mut rig = Rig::new();
        rig.board.sample = 1024;
        rig.reach_battery_test();
        rig.press(Buttons::empty());

        assert_eq!(rig.seq.text(), "Battery: FAIL!\n2.475v");
        assert_eq!(rig.seq.next_state(), State::Fail);
        rig.run(500);
        assert_eq!(rig.seq.current_state(), State::Fail);
    }

    #[test]
    fn good_battery_moves_to_buttons() {
        let mut rig = Rig::new();
        rig.board.sample = 1536;
        rig.reach_battery_test();
        rig.press(Buttons::empty());

        assert_eq!(rig.seq.text(), "Battery: PASS!\n3.712v");
        assert_eq!(rig.seq.led(), LED_RED);
        rig.run(500);
        assert_eq!(rig.seq.current_state(), State::TestButtons);
    }

    #[test]
    fn high_battery_fails() {
        let mut rig = Rig::new();
        rig.board.sample = 2048;
        rig.reach_battery_test();
        rig.press(Buttons::empty());

        assert_eq!(rig.seq.next_state(), State::Fail);
        assert_eq!(rig.seq.text(), "Battery: FAIL!\n4.950v");
    }

    #[test]
    fn usb_loops_until_removed() {
        let mut rig = Rig::new();
        rig.board.usb = true;
        rig.board.sample = 1536;
        rig.reach_battery_test();

        let mut visited = Vec::new();
        for _ in 0..100 {
            rig.press(Buttons::empty());
            if visited.last() != Some(&rig.seq.current_state()) {
                visited.push(rig.seq.current_state());
            }
        }
        assert!(visited.len() > 4);
        assert!(visited
            .iter()
            .all(|s| *s == State::TestBattery || *s == State::RemoveUsb));
        assert_ne!(rig.seq.next_state(), State::TestButtons);

        rig.board.usb = false;
        rig.run(400);
        assert_eq!(rig.seq.current_state(), State::TestButtons);
    }

    #[test]
    fn remove_usb_prompt() {
        let mut rig = Rig::new();
        rig.board.usb = true;
        rig.reach_battery_test();
        rig.run(100);

        assert_eq!(rig.seq.current_state(), State::RemoveUsb);
        rig.press(Buttons::empty());
        assert_eq!(rig.seq.text(), TEXT_REMOVE_USB);
        assert_eq!(rig.seq.led(), LED_RED);
    }

    #[test]
    fn prompt_only_before_first_press() {
        let mut rig = Rig::new();
        rig.board.sample = 1536;
        rig.reach_battery_test();
        rig.run(510);
        assert_eq!(rig.seq.current_state(), State::TestButtons);

        assert_eq!(rig.seq.text(), TEXT_BUTTON_PROMPT);
        assert_eq!(rig.seq.led(), LED_DIM_BLUE);

        rig.press(Buttons::B);
        rig.run(50);
        assert_eq!(rig.seq.text(), "B");
        assert_eq!(rig.seq.led(), LED_GREEN);
    }

    #[test]
    fn all_buttons_in_any_order_pass() {
        let order = [
            Buttons::RIGHT,
            Buttons::Y,
            Buttons::DOWN | Buttons::A,
            Buttons::LEFT,
            Buttons::X,
            Buttons::UP,
        ];

        let mut rig = Rig::new();
        rig.board.sample = 1536;
        rig.reach_battery_test();
        rig.run(510);

        for buttons in order {
            rig.press(buttons);
            assert_ne!(rig.seq.next_state(), State::Pass);
        }
        rig.press(Buttons::B);
        assert_eq!(rig.seq.pressed_buttons(), Buttons::all());
        assert_eq!(rig.seq.next_state(), State::Pass);

        rig.run(500);
        assert_eq!(rig.seq.current_state(), State::Pass);
        rig.press(Buttons::empty());
        assert_eq!(rig.seq.pressed_buttons(), Buttons::empty());
        assert_eq!(rig.seq.text(), TEXT_PASS);
        assert_eq!(rig.seq.led(), LED_DIM_GREEN);
    }

    #[test]
    fn fail_waits_for_a_press_then_restarts() {
        let mut rig = Rig::new();
        rig.reach_battery_test();
        rig.run(510);
        assert_eq!(rig.seq.current_state(), State::Fail);

        rig.run(5_000);
        assert_eq!(rig.seq.current_state(), State::Fail);
        assert_eq!(rig.seq.text(), TEXT_FAIL);

        rig.press(Buttons::Y);
        rig.run(100);
        assert_eq!(rig.seq.current_state(), State::Start);
    }

    #[test]
    fn fail_pulses_backlight() {
        let mut rig = Rig::new();
        rig.reach_battery_test();
        rig.run(510);
        rig.board.backlight.clear();

        rig.run(2_000);
        let distinct = rig
            .board
            .backlight
            .windows(2)
            .filter(|w| w[0] != w[1])
            .count();
        assert!(distinct > 2);
    }

    #[test]
    fn render_clears_to_led_color() {
        struct Screen {
            cleared: Option<RGB8>,
            text: std::string::String,
        }

        impl Display for Screen {
            fn clear(&mut self, color: RGB8) {
                self.cleared = Some(color);
            }

            fn draw_text(&mut self, text: &str, color: RGB8, align: TextAlign) {
                assert_eq!(color, TEXT_COLOR);
                assert_eq!(align, TextAlign::CenterCenter);
                self.text = text.into();
            }
        }

        let mut rig = Rig::new();
        rig.frame(Buttons::empty());

        let mut screen = Screen { cleared: None, text: std::string::String::new() };
        rig.seq.render(rig.now, &mut screen);
        assert_eq!(screen.cleared, Some(LED_GREEN));
        assert_eq!(screen.text, TEXT_STARTUP);
    }
}
