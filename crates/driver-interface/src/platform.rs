use alloc::{boxed::Box, sync::Arc};
use core::any::Any;

use crate::{irq::BoxIrqLine, mmio::BoxRegisterIo, rc::BoxRcDevice, timer::Timer, DriverResult};

/// Keeps a pin configuration selected until dropped.
pub type PinctrlHandle = Box<dyn Any + Send>;

/// A device node as seen by the driver binding to it.
///
/// Every acquired resource is released when its handle is dropped.
pub trait PlatformDevice {
    fn name(&self) -> &str;
    fn is_compatible(&self, compatible: &str) -> bool;
    /// Whether the boolean property `name` is present.
    fn property_bool(&self, name: &str) -> bool;
    fn property_str(&self, name: &str) -> Option<&str>;
    /// Maps register region `index`.
    fn iomap(&mut self, index: usize) -> DriverResult<BoxRegisterIo>;
    fn irq(&mut self, index: usize) -> DriverResult<BoxIrqLine>;
    fn pinctrl_select_default(&mut self) -> DriverResult<PinctrlHandle>;
    fn allocate_rc(&mut self) -> DriverResult<BoxRcDevice>;
    /// The system software timer.
    fn timer(&self) -> Arc<Timer>;
}
