use alloc::sync::{Arc, Weak};

use driver_interface::{
    irq::IrqHandleResult,
    rc::BoxRcDevice,
    sync::SpinNoIrq,
    timer::{Deadline, Timer},
};
use log::trace;

use crate::regs::{IrRegs, Reg, STATUS};

pub(crate) struct Inner {
    pub rc: BoxRcDevice,
    pub regs: IrRegs,
    /// Set once detach has disabled the decoder.
    pub detached: bool,
}

/// State shared between the edge interrupt, the flush timer and the
/// power management callbacks.
pub(crate) struct Shared {
    pub inner: SpinNoIrq<Inner>,
    pub flush: Deadline,
}

impl Shared {
    pub fn new(regs: IrRegs, rc: BoxRcDevice, timer: &Arc<Timer>) -> Arc<Self> {
        Arc::new_cyclic(|this: &Weak<Self>| {
            let this = this.clone();
            let flush = timer.deadline(move || {
                if let Some(shared) = this.upgrade() {
                    shared.handle_flush();
                }
            });

            Self {
                inner: SpinNoIrq::new(Inner {
                    rc,
                    regs,
                    detached: false,
                }),
                flush,
            }
        })
    }

    /// Edge interrupt: report the new input level and push the end of the
    /// frame out by one timeout.
    pub fn handle_edge(&self) -> IrqHandleResult {
        let mut inner = self.inner.lock();
        if inner.detached {
            return IrqHandleResult::Handled;
        }

        let level = inner.regs.is_set(Reg::Status, STATUS::IR_DEC_IN);
        inner.rc.store_edge(level);

        self.flush.arm(inner.rc.descriptor().timeout());

        inner.rc.handle();
        IrqHandleResult::Handled
    }

    /// Flush timer: no edge for a whole timeout, the frame is complete.
    pub fn handle_flush(&self) {
        let mut inner = self.inner.lock();
        if inner.detached {
            return;
        }
        let timeout = inner.rc.descriptor().timeout();
        trace!("frame flushed after {timeout:?}");

        inner.rc.store_timeout(timeout);
        inner.rc.handle();
    }
}
