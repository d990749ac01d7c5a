//! Local interrupt masking around spin lock critical sections.

#[cfg(all(target_arch = "aarch64", target_os = "none"))]
mod arch {
    use core::arch::asm;

    pub fn save() -> usize {
        let flags: usize;
        unsafe {
            asm!("mrs {}, daif", "msr daifset, #2", out(reg) flags);
        }
        flags
    }

    pub fn restore(flags: usize) {
        unsafe {
            asm!("msr daif, {}", in(reg) flags);
        }
    }
}

// Hosted builds have no local interrupts to mask.
#[cfg(not(all(target_arch = "aarch64", target_os = "none")))]
mod arch {
    pub fn save() -> usize {
        0
    }

    pub fn restore(_flags: usize) {}
}

/// Masks IRQs on the current CPU and returns the previous mask state.
#[inline]
pub fn local_irq_save() -> usize {
    arch::save()
}

/// Restores a mask state returned by [`local_irq_save`].
#[inline]
pub fn local_irq_restore(flags: usize) {
    arch::restore(flags)
}
