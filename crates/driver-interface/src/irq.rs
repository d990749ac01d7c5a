use alloc::boxed::Box;

use crate::DriverResult;

custom_type!(IrqId, usize, "{:#x}");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqHandleResult {
    Handled,
    None,
}

/// 在中断中调用，不可睡眠
pub type IrqHandler = Box<dyn Fn(IrqId) -> IrqHandleResult + Send + Sync>;

pub type BoxIrqLine = Box<dyn IrqLine>;

/// An interrupt line handed out by the platform for one device.
///
/// The platform delivers the handler exactly once per qualifying event.
/// Dropping a requested line frees it the same way [`IrqLine::free`] does.
pub trait IrqLine: Send {
    fn id(&self) -> IrqId;
    /// Binds `handler` to the line and unmasks it.
    fn request(&mut self, handler: IrqHandler) -> DriverResult;
    fn enable(&mut self);
    /// Masks the line and waits until running handlers have returned.
    fn disable(&mut self);
    /// Allows or forbids the line to wake the system from suspend.
    fn set_wake(&mut self, enable: bool);
    /// Disables the line and drops the handler.
    fn free(&mut self);
}
