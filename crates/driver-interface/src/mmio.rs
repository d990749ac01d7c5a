use alloc::boxed::Box;
use core::ptr::NonNull;

pub type BoxRegisterIo = Box<dyn RegisterIo>;

/// A window of 32-bit device registers addressed by byte offset.
pub trait RegisterIo: Send {
    fn read32(&self, offset: usize) -> u32;
    fn write32(&mut self, offset: usize, value: u32);
}

/// Volatile access to a memory mapped register region.
pub struct Mmio {
    base: NonNull<u8>,
    size: usize,
}

unsafe impl Send for Mmio {}

impl Mmio {
    /// # Safety
    ///
    /// `base` must point to a mapped device region of at least `size` bytes
    /// that stays mapped for the lifetime of the returned value.
    pub unsafe fn new(base: NonNull<u8>, size: usize) -> Self {
        Self { base, size }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    fn reg(&self, offset: usize) -> *mut u32 {
        assert!(
            offset % 4 == 0 && offset + 4 <= self.size,
            "register offset {offset:#x} out of window"
        );
        unsafe { self.base.as_ptr().add(offset) as *mut u32 }
    }
}

impl RegisterIo for Mmio {
    fn read32(&self, offset: usize) -> u32 {
        unsafe { self.reg(offset).read_volatile() }
    }

    fn write32(&mut self, offset: usize, value: u32) {
        unsafe { self.reg(offset).write_volatile(value) }
    }
}
