//! # Early Kernel
//!
//! The bring-up layer of the kernel: interrupt descriptor table, vector
//! stubs, interrupt dispatch and the panic path that every fatal condition
//! ends in.
//!
//! ## Modules
//!
//! - `interrupts`: trap frame, vector stubs, IDT, PIC and dispatch
//! - `panic`: failure reports (register and memory dumps) and the halt
//! - `klog`: leveled log records routed to the console
//! - `console`: fixed character grid mirrored to framebuffer and serial
//! - `kernel`: initialization phases and the status board
//!
//! The crate is `no_std` on the kernel target. Unit tests build against `std`
//! on an x86_64 host and reach hardware only through the traits in
//! `interrupts::dispatch` and `panic`.

#![cfg_attr(not(test), no_std)]

pub mod console;
pub mod format;
pub mod framebuffer;
pub mod interrupts;
pub mod kernel;
pub mod klog;
pub mod panic;
pub mod serial;

#[cfg(test)]
pub(crate) mod testing;
