//! Single tone channel on a piezo buzzer.

use crate::config::{BUZZER_MAX_FREQ, BUZZER_MIN_FREQ};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    /// The only shape a timer-driven piezo can produce
    Square,
}

/// Amplitude envelope of the tone channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Envelope {
    pub waveform: Waveform,
    pub attack_ms: u16,
    pub decay_ms: u16,
    /// Sustain level, 0 silences the tone once the decay ends
    pub sustain: u8,
    pub release_ms: u16,
}

impl Envelope {
    /// How long a triggered tone sounds, `None` when it sustains indefinitely.
    pub fn gate_ms(&self) -> Option<u32> {
        if self.sustain == 0 {
            Some(self.attack_ms as u32 + self.decay_ms as u32)
        } else {
            None
        }
    }
}

/// Hardware able to produce a square wave at a given frequency. 0 Hz stops it.
pub trait PlayTone {
    fn play_tone(&mut self, freq: u16);
    fn can_play_tone(&self, freq: u16) -> bool;
}

/// Audio seam used by the sequencer
pub trait Audio {
    fn configure(&mut self, envelope: Envelope);
    fn trigger_tone(&mut self, frequency_hz: u16);
}

/// Tone channel that clamps to the buzzer's range and gates each tone by its envelope
pub struct Buzzer<T> {
    output: T,
    envelope: Envelope,
    min_freq: u16,
    max_freq: u16,
    now: u32,
    sounding: bool,
    silence_at: Option<u32>,
}

impl<T: PlayTone> Buzzer<T> {
    pub fn new(output: T, envelope: Envelope) -> Self {
        Self {
            output,
            envelope,
            min_freq: BUZZER_MIN_FREQ,
            max_freq: BUZZER_MAX_FREQ,
            now: 0,
            sounding: false,
            silence_at: None,
        }
    }

    /// Advance the envelope; silences a finished tone.
    pub fn tick(&mut self, now: u32) {
        self.now = now;
        if let Some(at) = self.silence_at {
            if now.wrapping_sub(at) < u32::MAX / 2 {
                self.output.play_tone(0);
                self.sounding = false;
                self.silence_at = None;
            }
        }
    }

    pub fn is_sounding(&self) -> bool {
        self.sounding
    }

    pub fn release(self) -> T {
        self.output
    }
}

impl<T: PlayTone> Audio for Buzzer<T> {
    fn configure(&mut self, envelope: Envelope) {
        self.envelope = envelope;
    }

    fn trigger_tone(&mut self, frequency_hz: u16) {
        let freq = frequency_hz.clamp(self.min_freq, self.max_freq);
        if !self.output.can_play_tone(freq) {
            return;
        }
        self.output.play_tone(freq);
        self.sounding = true;
        self.silence_at = self.envelope.gate_ms().map(|gate| self.now.wrapping_add(gate));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TONE_ENVELOPE;

    #[derive(Default)]
    struct Recorder {
        played: Vec<u16>,
    }

    impl PlayTone for Recorder {
        fn play_tone(&mut self, freq: u16) {
            self.played.push(freq);
        }

        fn can_play_tone(&self, freq: u16) -> bool {
            freq != 0
        }
    }

    #[test]
    fn tone_stops_after_attack_and_decay() {
        let mut buzzer = Buzzer::new(Recorder::default(), TONE_ENVELOPE);
        buzzer.tick(1_000);
        buzzer.trigger_tone(988);
        assert!(buzzer.is_sounding());

        buzzer.tick(1_499);
        assert!(buzzer.is_sounding());
        buzzer.tick(1_500);
        assert!(!buzzer.is_sounding());

        assert_eq!(buzzer.release().played, vec![988, 0]);
    }

    #[test]
    fn sustained_tone_keeps_playing() {
        let envelope = Envelope { sustain: 200, ..TONE_ENVELOPE };
        let mut buzzer = Buzzer::new(Recorder::default(), envelope);
        buzzer.trigger_tone(1047);
        buzzer.tick(60_000);

        assert!(buzzer.is_sounding());
        assert_eq!(buzzer.release().played, vec![1047]);
    }

    #[test]
    fn retrigger_extends_gate() {
        let mut buzzer = Buzzer::new(Recorder::default(), TONE_ENVELOPE);
        buzzer.trigger_tone(988);
        buzzer.tick(400);
        buzzer.trigger_tone(1319);
        buzzer.tick(600);
        assert!(buzzer.is_sounding());
        buzzer.tick(900);

        assert_eq!(buzzer.release().played, vec![988, 1319, 0]);
    }

    #[test]
    fn frequency_is_clamped() {
        let mut buzzer = Buzzer::new(Recorder::default(), TONE_ENVELOPE);
        buzzer.trigger_tone(20_000);
        buzzer.trigger_tone(1);

        assert_eq!(buzzer.release().played, vec![BUZZER_MAX_FREQ, BUZZER_MIN_FREQ]);
    }
}
