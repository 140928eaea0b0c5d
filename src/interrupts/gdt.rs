// gdt.rs
use spin::Lazy;
use x86_64::structures::gdt::{Descriptor, GlobalDescriptorTable, SegmentSelector};

use super::vectors::KERNEL_CODE_SELECTOR;

struct Selectors {
    code_selector: SegmentSelector,
    data_selector: SegmentSelector,
}

// No TSS: every gate runs on the current stack (IST index 0)
static GDT: Lazy<(GlobalDescriptorTable, Selectors)> = Lazy::new(|| {
    let mut gdt = GlobalDescriptorTable::new();

    let code_selector = gdt.append(Descriptor::kernel_code_segment());
    let data_selector = gdt.append(Descriptor::kernel_data_segment());

    (
        gdt,
        Selectors {
            code_selector,
            data_selector,
        },
    )
});

/// Kernel code selector of the loaded GDT; every IDT gate names it.
pub fn code_selector() -> u16 {
    GDT.1.code_selector.0
}

pub fn init() -> Result<(), &'static str> {
    let (ref gdt, ref selectors) = *GDT;
    if selectors.code_selector.0 != KERNEL_CODE_SELECTOR {
        return Err("kernel code segment is not at selector 0x08");
    }
    gdt.load();

    unsafe {
        use x86_64::instructions::segmentation::{Segment, CS, DS, ES, SS};

        CS::set_reg(selectors.code_selector);
        DS::set_reg(selectors.data_selector);
        ES::set_reg(selectors.data_selector);
        SS::set_reg(selectors.data_selector);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_segment_matches_gate_selector() {
        assert_eq!(code_selector(), KERNEL_CODE_SELECTOR);
    }
}
