//! Millisecond system tick on Timer0.

use avr_device::atmega128a::TC0;
use avr_device::interrupt::{self, Mutex};
use core::cell::Cell;

const WGM01: u8 = 0x08;
// Timer0 has its own prescaler table: CS02 alone selects clk/64
const CS_DIV64: u8 = 0x04;
const OCIE0: u8 = 0x02;
// 16MHz / 64 / 250 = 1kHz
const TICKS_PER_MS: u8 = 250;

static MILLIS: Mutex<Cell<u32>> = Mutex::new(Cell::new(0));

/// Start the 1kHz tick. Interrupts must be enabled for it to advance.
pub fn init_millis(tc0: TC0) {
    unsafe {
        tc0.tccr0.write(|w| w.bits(WGM01 | CS_DIV64));
        tc0.ocr0.write(|w| w.bits(TICKS_PER_MS - 1));
        tc0.tcnt0.write(|w| w.bits(0));
        tc0.timsk.modify(|r, w| w.bits(r.bits() | OCIE0));
    }
    interrupt::free(|cs| MILLIS.borrow(cs).set(0));
}

/// Milliseconds since `init_millis`, wrapping after ~49 days
pub fn millis() -> u32 {
    interrupt::free(|cs| MILLIS.borrow(cs).get())
}

pub fn delay_ms(ms: u32) {
    let start = millis();
    while millis().wrapping_sub(start) < ms {}
}

#[avr_device::interrupt(atmega128a)]
fn TIMER0_COMP() {
    interrupt::free(|cs| {
        let counter = MILLIS.borrow(cs);
        counter.set(counter.get().wrapping_add(1));
    });
}
