/// Kernel initialization phases
use bootloader_api::info::FrameBuffer;

use crate::framebuffer::FramebufferWriter;
use crate::interrupts::pic::PICS;
use crate::interrupts::{self, dispatch, idt};
use crate::kernel::status::{
    get_all_statuses, register_component, update_component_status, InitStatus,
};
use crate::{console, kerror, kinfo, kwarn, serial};

const SERIAL_PORT: &str = "Serial Port";
const DISPLAY: &str = "Display";
const INTERRUPTS: &str = "Interrupt System";

/// Initialize kernel in proper order with error handling
///
/// A missing framebuffer is tolerated (serial only). Anything going wrong
/// with the interrupt system is returned to the caller.
pub fn init_kernel(framebuffer: Option<&'static mut FrameBuffer>) -> Result<(), &'static str> {
    register_component(SERIAL_PORT);
    register_component(DISPLAY);
    register_component(INTERRUPTS);

    init_phase(SERIAL_PORT, || {
        serial::init();
        Ok(())
    })?;

    let display = init_phase(DISPLAY, || {
        framebuffer
            .map(FramebufferWriter::new)
            .ok_or("bootloader provided no framebuffer")
    });
    let display_error = display.as_ref().err().copied();
    console::init(display.ok());

    kinfo!("Early kernel bring-up");
    if let Some(e) = display_error {
        kwarn!("Display unavailable ({}), console is serial only", e);
    }

    init_phase(INTERRUPTS, init_interrupts)?;

    report_statuses();
    Ok(())
}

fn init_phase<T>(
    name: &'static str,
    init_fn: impl FnOnce() -> Result<T, &'static str>,
) -> Result<T, &'static str> {
    update_component_status(name, InitStatus::InProgress);

    match init_fn() {
        Ok(value) => {
            update_component_status(name, InitStatus::Completed);
            Ok(value)
        }
        Err(e) => {
            kerror!("{} initialization failed: {}", name, e);
            update_component_status(name, InitStatus::Failed(e));
            Err(e)
        }
    }
}

fn init_interrupts() -> Result<(), &'static str> {
    interrupts::init()?;
    if !idt::is_installed() {
        return Err("IDTR does not point at the kernel IDT");
    }
    let base = idt::table().pointer().base;
    kinfo!("IDT loaded at {:#x} (limit {:#x})", base.as_u64(), idt::IDT_LIMIT);

    let [primary, secondary] = PICS.lock().masks();
    kinfo!("PIC masks: {:#04x} {:#04x}", primary, secondary);

    x86_64::instructions::interrupts::enable();
    kinfo!("Interrupts enabled, ticks so far: {}", dispatch::ticks());
    Ok(())
}

fn report_statuses() {
    for comp in get_all_statuses().iter().flatten() {
        match comp.status {
            InitStatus::Completed => kinfo!("  [ok] {}", comp.name),
            status => kwarn!("  [--] {}: {}", comp.name, status),
        }
    }
}
