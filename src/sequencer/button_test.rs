//! Button pad check: every button must be pressed at least once.

use smart_leds::RGB8;
use ufmt::uWrite;

use super::Sequencer;
use crate::config::BUTTON_FEEDBACK;
use crate::drivers::{Audio, Buttons};
use crate::logger::Logger;

/// Feedback given when a button is pressed during the pad check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonFeedback {
    pub button: Buttons,
    pub name: &'static str,
    pub color: RGB8,
    pub frequency_hz: u16,
}

/// Highest-priority button in `pressed`, A first and Right last.
pub fn first_match(pressed: Buttons) -> Option<&'static ButtonFeedback> {
    BUTTON_FEEDBACK.iter().find(|f| pressed.contains(f.button))
}

impl Sequencer {
    /// Fold this frame's presses into the accumulator and give feedback for
    /// at most one of them.
    pub(super) fn poll_buttons<A, W>(&mut self, pressed: Buttons, audio: &mut A, log: &mut Logger<W>)
    where
        A: Audio,
        W: uWrite,
    {
        self.pressed_buttons |= pressed;

        if let Some(feedback) = first_match(pressed) {
            self.led = feedback.color;
            audio.trigger_tone(feedback.frequency_hz);
            self.set_text(feedback.name);
            log.log_debug(self.now, "button", feedback.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LED_BLUE, LED_RED};
    use crate::drivers::Envelope;
    use crate::logger::NullSink;

    #[derive(Default)]
    struct Tones(Vec<u16>);

    impl Audio for Tones {
        fn configure(&mut self, _envelope: Envelope) {}

        fn trigger_tone(&mut self, frequency_hz: u16) {
            self.0.push(frequency_hz);
        }
    }

    #[test]
    fn priority_order() {
        assert_eq!(first_match(Buttons::A | Buttons::UP).map(|f| f.name), Some("A"));
        assert_eq!(first_match(Buttons::RIGHT | Buttons::Y).map(|f| f.name), Some("Y"));
        assert_eq!(first_match(Buttons::LEFT | Buttons::DOWN).map(|f| f.name), Some("Down"));
        assert_eq!(first_match(Buttons::empty()), None);
    }

    #[test]
    fn simultaneous_presses_give_one_feedback() {
        let mut seq = Sequencer::new();
        let mut tones = Tones::default();
        let mut log = Logger::new(NullSink);

        seq.poll_buttons(Buttons::A | Buttons::UP, &mut tones, &mut log);

        assert_eq!(seq.text(), "A");
        assert_eq!(seq.led(), LED_RED);
        assert_eq!(tones.0, vec![988]);
        assert_eq!(seq.pressed_buttons(), Buttons::A | Buttons::UP);
    }

    #[test]
    fn accumulator_is_or_of_frames() {
        let mut seq = Sequencer::new();
        let mut tones = Tones::default();
        let mut log = Logger::new(NullSink);

        let frames = [
            Buttons::X,
            Buttons::empty(),
            Buttons::X | Buttons::DOWN,
            Buttons::B,
            Buttons::empty(),
        ];
        let mut expected = Buttons::empty();
        for frame in frames {
            seq.poll_buttons(frame, &mut tones, &mut log);
            assert!(seq.pressed_buttons().contains(expected));
            expected |= frame;
            assert_eq!(seq.pressed_buttons(), expected);
        }

        // Feedback comes from the frame mask, not the accumulator
        assert_eq!(tones.0, vec![1175, 1175, 1047]);
        assert_eq!(seq.text(), "B");
    }

    #[test]
    fn empty_frame_leaves_feedback_untouched() {
        let mut seq = Sequencer::new();
        let mut tones = Tones::default();
        let mut log = Logger::new(NullSink);

        seq.poll_buttons(Buttons::X, &mut tones, &mut log);
        seq.poll_buttons(Buttons::empty(), &mut tones, &mut log);

        assert_eq!(seq.text(), "X");
        assert_eq!(seq.led(), LED_BLUE);
        assert_eq!(tones.0.len(), 1);
    }
}
