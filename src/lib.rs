//! Factory self-test for the handheld: battery sense, USB detect, backlight,
//! buzzer and button pad, sequenced by a debounced state machine.
#![cfg_attr(not(test), no_std)]
#![cfg_attr(all(target_arch = "avr", feature = "atmega128"), feature(abi_avr_interrupt))]

pub mod config;
pub mod diagnostics;
pub mod drivers;
pub mod logger;
pub mod os;
pub mod sequencer;

#[cfg(all(target_arch = "avr", feature = "atmega128"))]
pub mod hal;

pub use sequencer::{Sequencer, State};
