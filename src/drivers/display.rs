use heapless::String;
use smart_leds::RGB8;
use ufmt::uWrite;

use crate::config::TEXT_CAPACITY;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    CenterCenter,
}

/// Screen primitives the sequencer draws with
pub trait Display {
    fn clear(&mut self, color: RGB8);
    fn draw_text(&mut self, text: &str, color: RGB8, align: TextAlign);
}

/// Mirrors the screen onto a serial terminal.
///
/// Redrawing the same text every frame would flood the link, so the terminal
/// is only cleared and rewritten when the text changes.
pub struct ConsoleDisplay<W> {
    out: W,
    shown: String<TEXT_CAPACITY>,
    background: RGB8,
}

impl<W: uWrite> ConsoleDisplay<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            shown: String::new(),
            background: RGB8::default(),
        }
    }

    pub fn background(&self) -> RGB8 {
        self.background
    }

    pub fn output(&self) -> &W {
        &self.out
    }
}

impl<W: uWrite> Display for ConsoleDisplay<W> {
    fn clear(&mut self, color: RGB8) {
        self.background = color;
    }

    fn draw_text(&mut self, text: &str, _color: RGB8, _align: TextAlign) {
        if self.shown.as_str() == text {
            return;
        }
        self.shown.clear();
        for c in text.chars() {
            if self.shown.push(c).is_err() {
                break;
            }
        }

        // ANSI clear screen + home
        self.out.write_str("\x1b[2J\x1b[H").ok();
        for (idx, line) in text.split('\n').enumerate() {
            if idx > 0 {
                self.out.write_str("\r\n").ok();
            }
            self.out.write_str(line).ok();
        }
        self.out.write_str("\r\n").ok();
    }
}
