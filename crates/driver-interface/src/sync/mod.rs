mod irq_save;
mod spin;

pub use irq_save::{local_irq_restore, local_irq_save};
pub use spin::{RawSpinNoIrq, SpinNoIrq, SpinNoIrqGuard};
