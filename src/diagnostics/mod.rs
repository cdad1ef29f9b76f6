//! Peripheral fault tracking.
//!
//! Faults never reach the test sequence as errors: the peripheral shim
//! substitutes its stub default and records the fault here so it can be
//! logged.

use ufmt::{uDisplay, uWrite, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    VbusRead,
    ChargeStatusRead,
    BatteryAdc,
}

impl Fault {
    pub const fn code(self) -> u16 {
        match self {
            Fault::VbusRead => 0x1001,
            Fault::ChargeStatusRead => 0x1002,
            Fault::BatteryAdc => 0x2001,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Fault::VbusRead => "vbus detect read",
            Fault::ChargeStatusRead => "charge status read",
            Fault::BatteryAdc => "battery adc read",
        }
    }
}

impl uDisplay for Fault {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        f.write_str(self.name())
    }
}

#[derive(Debug, Default)]
pub struct Diagnostics {
    fault_count: u32,
    unreported: Option<Fault>,
}

impl Diagnostics {
    pub const fn new() -> Self {
        Self {
            fault_count: 0,
            unreported: None,
        }
    }

    pub fn report(&mut self, fault: Fault) {
        self.fault_count = self.fault_count.saturating_add(1);
        self.unreported = Some(fault);
    }

    /// Most recent fault not yet handed out by this call.
    pub fn take_unreported(&mut self) -> Option<Fault> {
        self.unreported.take()
    }

    pub fn fault_count(&self) -> u32 {
        self.fault_count
    }

}
