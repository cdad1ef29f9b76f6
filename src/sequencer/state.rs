use ufmt::{uDisplay, uWrite, Formatter};

/// Steps of the self-test sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Start,
    TestBattery,
    RemoveUsb,
    TestButtons,
    Fail,
    Pass,
}

impl State {
    pub const fn name(self) -> &'static str {
        match self {
            State::Start => "START",
            State::TestBattery => "TEST_BATTERY",
            State::RemoveUsb => "REMOVE_USB",
            State::TestButtons => "TEST_BUTTONS",
            State::Fail => "FAIL",
            State::Pass => "PASS",
        }
    }
}

impl uDisplay for State {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        f.write_str(self.name())
    }
}
