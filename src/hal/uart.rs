use avr_device::atmega128a::USART0;
use avr_device::interrupt::Mutex;
use core::cell::RefCell;

use crate::config::{CPU_FREQ_HZ, UART_BAUD};

// Buffer size must be power of 2 for efficient masking
const BUFFER_SIZE: usize = 64;
const BUFFER_MASK: usize = BUFFER_SIZE - 1;

const UBRR: u16 = (CPU_FREQ_HZ / (16 * UART_BAUD) - 1) as u16;

const TXEN: u8 = 0x08;
const UDRIE: u8 = 0x20;

struct Buffer {
    data: [u8; BUFFER_SIZE],
    write_idx: usize,
    read_idx: usize,
}

impl Buffer {
    const fn new() -> Self {
        Self {
            data: [0; BUFFER_SIZE],
            write_idx: 0,
            read_idx: 0,
        }
    }

    fn write(&mut self, byte: u8) -> bool {
        let next_write = (self.write_idx + 1) & BUFFER_MASK;
        if next_write != self.read_idx {
            self.data[self.write_idx] = byte;
            self.write_idx = next_write;
            true
        } else {
            false
        }
    }

    fn read(&mut self) -> Option<u8> {
        if self.read_idx != self.write_idx {
            let byte = self.data[self.read_idx];
            self.read_idx = (self.read_idx + 1) & BUFFER_MASK;
            Some(byte)
        } else {
            None
        }
    }
}

// Transmit queue drained by the UDRE interrupt
static TX_BUFFER: Mutex<RefCell<Buffer>> = Mutex::new(RefCell::new(Buffer::new()));

/// Configure USART0 for transmit-only 8N1 at `UART_BAUD`. The peripheral
/// stays owned by the interrupt handlers from here on.
pub fn init(usart: USART0) {
    unsafe {
        usart.ubrr0h.write(|w| w.bits((UBRR >> 8) as u8));
        usart.ubrr0l.write(|w| w.bits(UBRR as u8));
        // 8 data bits
        usart.ucsr0c.write(|w| w.bits(0x06));
        usart.ucsr0b.write(|w| w.bits(TXEN));
    }
}

/// Queue a byte, spinning while the TX buffer is full.
pub fn write_byte(byte: u8) {
    loop {
        let queued = avr_device::interrupt::free(|cs| {
            let queued = TX_BUFFER.borrow(cs).borrow_mut().write(byte);
            unsafe {
                (*USART0::ptr()).ucsr0b.modify(|r, w| w.bits(r.bits() | UDRIE));
            }
            queued
        });
        if queued {
            return;
        }
    }
}

#[avr_device::interrupt(atmega128a)]
fn USART0_UDRE() {
    avr_device::interrupt::free(|cs| {
        let usart = unsafe { &*USART0::ptr() };
        if let Some(byte) = TX_BUFFER.borrow(cs).borrow_mut().read() {
            unsafe {
                usart.udr0.write(|w| w.bits(byte));
            }
        } else {
            // Buffer empty - disable TX interrupt
            unsafe {
                usart.ucsr0b.modify(|r, w| w.bits(r.bits() & !UDRIE));
            }
        }
    });
}
