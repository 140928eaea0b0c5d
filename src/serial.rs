//! COM1 serial output.
use core::fmt::Write;

use spin::Mutex;
use uart_16550::SerialPort;

const COM1: u16 = 0x3F8;

pub static SERIAL: Mutex<SerialPort> = Mutex::new(unsafe { SerialPort::new(COM1) });

pub fn init() {
    SERIAL.lock().init();
}

/// Write one line, breaking the lock if an interrupted holder still owns it.
pub fn write_line(text: &str) {
    let mut serial = match SERIAL.try_lock() {
        Some(guard) => guard,
        None => {
            // Safety: only reached with interrupts off, from a context that
            // preempted the holder; the holder cannot run until we finish
            unsafe { SERIAL.force_unlock() };
            SERIAL.lock()
        }
    };
    let _ = serial.write_str(text);
    let _ = serial.write_str("\n");
}

