//! Line-oriented event log.
//!
//! Every entry is one line, `[<millis>] <TAG> <message>`, written to any
//! `ufmt::uWrite` sink (the USART console on the board). Sink errors are
//! dropped: logging must never change what the test sequence does.

use core::convert::Infallible;

use ufmt::{uWrite, uwrite};

use crate::diagnostics::Fault;
use crate::sequencer::State;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogType {
    System = 0,
    Sensor = 1,
    Error = 2,
    Debug = 3,
}

impl LogType {
    pub const fn tag(self) -> &'static str {
        match self {
            LogType::System => "SYS",
            LogType::Sensor => "SEN",
            LogType::Error => "ERR",
            LogType::Debug => "DBG",
        }
    }
}

/// Sink that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl uWrite for NullSink {
    type Error = Infallible;

    fn write_str(&mut self, _s: &str) -> Result<(), Infallible> {
        Ok(())
    }
}

pub struct Logger<W> {
    sink: W,
    debug: bool,
}

impl<W: uWrite> Logger<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            debug: cfg!(feature = "debug"),
        }
    }

    /// Force debug lines on or off regardless of the `debug` feature
    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    pub fn sink(&self) -> &W {
        &self.sink
    }

    pub fn into_inner(self) -> W {
        self.sink
    }

    fn begin(&mut self, now: u32, log_type: LogType) {
        uwrite!(self.sink, "[{}] {} ", now, log_type.tag()).ok();
    }

    fn write_hex(&mut self, val: u16) {
        const HEX_CHARS: [u8; 16] = *b"0123456789ABCDEF";
        let mut digits = [0u8; 4];
        for (i, digit) in digits.iter_mut().enumerate() {
            *digit = HEX_CHARS[((val >> (12 - 4 * i)) & 0xF) as usize];
        }
        if let Ok(s) = core::str::from_utf8(&digits) {
            self.sink.write_str(s).ok();
        }
    }

    fn end(&mut self) {
        self.sink.write_str("\r\n").ok();
    }

    pub fn log_system(&mut self, now: u32, msg: &str) {
        self.begin(now, LogType::System);
        self.sink.write_str(msg).ok();
        self.end();
    }

    pub fn log_transition(&mut self, now: u32, from: State, to: State) {
        self.begin(now, LogType::System);
        uwrite!(self.sink, "state {} -> {}", from, to).ok();
        self.end();
    }

    pub fn log_sensor(&mut self, now: u32, name: &str, value: u32, unit: &str) {
        self.begin(now, LogType::Sensor);
        uwrite!(self.sink, "{}={}{}", name, value, unit).ok();
        self.end();
    }

    pub fn log_error(&mut self, now: u32, fault: Fault) {
        self.begin(now, LogType::Error);
        uwrite!(self.sink, "{} (0x", fault).ok();
        self.write_hex(fault.code());
        self.sink.write_str(")").ok();
        self.end();
    }

    pub fn log_debug(&mut self, now: u32, msg: &str, detail: &str) {
        if !self.debug {
            return;
        }
        self.begin(now, LogType::Debug);
        uwrite!(self.sink, "{} {}", msg, detail).ok();
        self.end();
    }
}
