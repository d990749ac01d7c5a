#![cfg_attr(not(test), no_std)]

extern crate alloc;

#[macro_use]
mod _macro;

mod err;
pub mod irq;
pub mod mmio;
pub mod platform;
pub mod rc;
pub mod register;
pub mod sync;
pub mod timer;

pub use err::{DriverError, DriverResult};

/// Power management hooks of a bound driver instance.
///
/// Dropping the instance detaches it from the hardware.
pub trait DriverGeneric: Send {
    fn suspend(&mut self) -> DriverResult;
    fn resume(&mut self) -> DriverResult;
    /// Leaves the hardware in a state the firmware can wake the system from.
    fn shutdown(&mut self);
}
