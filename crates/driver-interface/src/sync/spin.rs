use core::{
    hint::spin_loop,
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

use lock_api::GuardNoSend;

use super::{local_irq_restore, local_irq_save};

/// Spin lock usable from interrupt handlers, timer callbacks and thread
/// context alike. Local IRQs stay masked while it is held.
pub type SpinNoIrq<T> = lock_api::Mutex<RawSpinNoIrq, T>;

pub type SpinNoIrqGuard<'a, T> = lock_api::MutexGuard<'a, RawSpinNoIrq, T>;

pub struct RawSpinNoIrq {
    lock: AtomicBool,
    irq_state: AtomicUsize,
}

unsafe impl lock_api::RawMutex for RawSpinNoIrq {
    #[allow(clippy::declare_interior_mutable_const)]
    const INIT: RawSpinNoIrq = RawSpinNoIrq {
        lock: AtomicBool::new(false),
        irq_state: AtomicUsize::new(0),
    };

    // The saved IRQ state belongs to the CPU that took the lock.
    type GuardMarker = GuardNoSend;

    #[inline]
    fn lock(&self) {
        let flags = local_irq_save();
        while self
            .lock
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            while self.lock.load(Ordering::Relaxed) {
                spin_loop();
            }
        }
        self.irq_state.store(flags, Ordering::Relaxed);
    }

    #[inline]
    fn try_lock(&self) -> bool {
        let flags = local_irq_save();
        if self
            .lock
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
        {
            self.irq_state.store(flags, Ordering::Relaxed);
            true
        } else {
            local_irq_restore(flags);
            false
        }
    }

    #[inline]
    unsafe fn unlock(&self) {
        let flags = self.irq_state.load(Ordering::Relaxed);
        self.lock.store(false, Ordering::Release);
        local_irq_restore(flags);
    }

    #[inline]
    fn is_locked(&self) -> bool {
        self.lock.load(Ordering::Relaxed)
    }
}
