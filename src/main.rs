#![no_std]
#![no_main]

extern crate rlibc;

use bootloader_api::{entry_point, BootInfo};
use core::panic::{Location, PanicInfo};

use early_kernel::interrupts::dispatch;
use early_kernel::panic::{self as kpanic, RegisterSnapshot};
use early_kernel::{kassert, kernel, kinfo};

entry_point!(kernel_main);

pub fn kernel_main(boot_info: &'static mut BootInfo) -> ! {
    let framebuffer = boot_info.framebuffer.as_mut();
    let has_display = framebuffer.is_some();

    if let Err(e) = kernel::init_kernel(framebuffer) {
        kpanic::report_failure(
            Location::caller(),
            format_args!("Kernel initialization failed: {}", e),
            RegisterSnapshot::capture(),
            None,
        );
    }

    welcome_message();
    kassert!(kernel::status::all_components_ready() || !has_display);

    let mut reported = 0;
    loop {
        x86_64::instructions::hlt();
        // one line every ~10 s at the PIT's default 18.2 Hz
        let ticks = dispatch::ticks();
        if ticks / 182 > reported {
            reported = ticks / 182;
            kinfo!(
                "uptime ticks: {} (spurious IRQ7: {})",
                ticks,
                dispatch::spurious_count()
            );
        }
    }
}

fn welcome_message() {
    kinfo!("");
    kinfo!("    *         *              *        *");
    kinfo!("         Early kernel - interrupts online");
    kinfo!("    *              *                *");
    kinfo!("");
    kinfo!("System initialization complete.");
}

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    kpanic::handle_panic(info)
}
