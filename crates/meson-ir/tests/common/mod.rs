#![allow(dead_code)]

use std::{
    any::Any,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use driver_interface::{
    irq::{BoxIrqLine, IrqHandleResult, IrqHandler, IrqId, IrqLine},
    mmio::{BoxRegisterIo, RegisterIo},
    platform::{PinctrlHandle, PlatformDevice},
    rc::{BoxRcDevice, RawEvent, RawFifo, RcDescriptor, RcDevice},
    timer::{TickSource, Timer},
    DriverError, DriverResult,
};
use meson_ir::regs::{Reg, REGION_SIZE};

pub const IRQ: usize = 0x3f;

pub type Log = Arc<Mutex<Vec<String>>>;

pub fn init_log() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn push(log: &Log, entry: impl Into<String>) {
    log.lock().unwrap().push(entry.into());
}

/// Register file shared between the driver and the test.
#[derive(Clone, Default)]
pub struct RegFile(Arc<Mutex<[u32; REGION_SIZE / 4]>>);

impl RegFile {
    pub fn get(&self, reg: Reg) -> u32 {
        self.0.lock().unwrap()[reg.offset() / 4]
    }

    pub fn set(&self, reg: Reg, value: u32) {
        self.0.lock().unwrap()[reg.offset() / 4] = value;
    }

    pub fn bits(&self, reg: Reg, shift: u32, width: u32) -> u32 {
        (self.get(reg) >> shift) & ((1 << width) - 1)
    }

    pub fn set_input_level(&self, level: bool) {
        let status = self.get(Reg::Status) & !(1 << 8);
        self.set(Reg::Status, status | ((level as u32) << 8));
    }

    /// Simulates the register contents lost over a power cycle.
    pub fn power_loss(&self) {
        *self.0.lock().unwrap() = [0; REGION_SIZE / 4];
    }
}

struct FakeMmio {
    file: RegFile,
    log: Log,
}

impl RegisterIo for FakeMmio {
    fn read32(&self, offset: usize) -> u32 {
        self.file.0.lock().unwrap()[offset / 4]
    }

    fn write32(&mut self, offset: usize, value: u32) {
        self.file.0.lock().unwrap()[offset / 4] = value;
    }
}

impl Drop for FakeMmio {
    fn drop(&mut self) {
        push(&self.log, "release regs");
    }
}

#[derive(Default)]
pub struct IrqState {
    handler: Mutex<Option<IrqHandler>>,
    enabled: AtomicBool,
    wake: AtomicBool,
    fail_request: AtomicBool,
    pub ops: Mutex<Vec<&'static str>>,
}

impl IrqState {
    /// Delivers one interrupt if the line is requested and unmasked.
    pub fn fire(&self) -> Option<IrqHandleResult> {
        let handler = self.handler.lock().unwrap();
        if !self.enabled.load(Ordering::SeqCst) {
            return None;
        }
        handler.as_ref().map(|h| h(IrqId::from(IRQ)))
    }

    pub fn is_requested(&self) -> bool {
        self.handler.lock().unwrap().is_some()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn is_wake(&self) -> bool {
        self.wake.load(Ordering::SeqCst)
    }

    pub fn ops(&self) -> Vec<&'static str> {
        self.ops.lock().unwrap().clone()
    }

    fn op(&self, op: &'static str) {
        self.ops.lock().unwrap().push(op);
    }
}

struct FakeIrq {
    state: Arc<IrqState>,
    log: Log,
}

impl IrqLine for FakeIrq {
    fn id(&self) -> IrqId {
        IrqId::from(IRQ)
    }

    fn request(&mut self, handler: IrqHandler) -> DriverResult {
        if self.state.fail_request.load(Ordering::SeqCst) {
            return Err(DriverError::ResourceUnavailable("irq"));
        }
        self.state.op("request");
        *self.state.handler.lock().unwrap() = Some(handler);
        self.state.enabled.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn enable(&mut self) {
        self.state.op("enable");
        self.state.enabled.store(true, Ordering::SeqCst);
    }

    fn disable(&mut self) {
        self.state.op("disable");
        // Taking the handler lock waits for a running handler.
        let _running = self.state.handler.lock().unwrap();
        self.state.enabled.store(false, Ordering::SeqCst);
    }

    fn set_wake(&mut self, enable: bool) {
        self.state.op(if enable { "wake on" } else { "wake off" });
        self.state.wake.store(enable, Ordering::SeqCst);
    }

    fn free(&mut self) {
        self.state.op("free");
        let handler = {
            let mut handler = self.state.handler.lock().unwrap();
            self.state.enabled.store(false, Ordering::SeqCst);
            handler.take()
        };
        if handler.is_some() {
            push(&self.log, "release irq");
        }
    }
}

impl Drop for FakeIrq {
    fn drop(&mut self) {
        if self.state.is_requested() {
            self.free();
        }
    }
}

struct TrackedRc {
    fifo: RawFifo,
    fail_register: bool,
    registered: Arc<Mutex<Option<RcDescriptor>>>,
    log: Log,
}

impl RcDevice for TrackedRc {
    fn descriptor(&self) -> &RcDescriptor {
        self.fifo.descriptor()
    }

    fn descriptor_mut(&mut self) -> &mut RcDescriptor {
        self.fifo.descriptor_mut()
    }

    fn register(&mut self) -> DriverResult {
        if self.fail_register {
            return Err(DriverError::RegistrationFailed);
        }
        self.fifo.register()?;
        *self.registered.lock().unwrap() = Some(self.fifo.descriptor().clone());
        Ok(())
    }

    fn store_edge(&mut self, level: bool) {
        self.fifo.store_edge(level);
    }

    fn store_timeout(&mut self, duration: Duration) {
        self.fifo.store_timeout(duration);
    }

    fn handle(&mut self) {
        self.fifo.handle();
    }
}

impl Drop for TrackedRc {
    fn drop(&mut self) {
        push(&self.log, "release rc");
    }
}

struct PinGuard(Log);

impl Drop for PinGuard {
    fn drop(&mut self) {
        push(&self.0, "release pinctrl");
    }
}

pub struct Ticks(pub Arc<AtomicU64>);

impl TickSource for Ticks {
    fn current_ticks(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    fn tick_hz(&self) -> u64 {
        1_000_000
    }

    fn set_timeval(&self, _ticks: u64) {}

    fn set_irq_enable(&self, _enable: bool) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Iomap,
    Irq,
    AllocateRc,
    RegisterRc,
    RequestIrq,
    Pinctrl,
}

/// A device node plus the platform services behind it.
pub struct MockDevice {
    pub compatible: &'static str,
    pub pulse_inverted: bool,
    pub map_name: Option<&'static str>,
    pub fail: Option<Step>,
    pub regs: RegFile,
    pub irq: Arc<IrqState>,
    pub now: Arc<AtomicU64>,
    pub timer: Arc<Timer>,
    pub events: Arc<Mutex<Vec<RawEvent>>>,
    pub registered: Arc<Mutex<Option<RcDescriptor>>>,
    pub log: Log,
}

impl MockDevice {
    pub fn new(compatible: &'static str) -> Self {
        init_log();
        let now = Arc::new(AtomicU64::new(0));
        Self {
            compatible,
            pulse_inverted: false,
            map_name: None,
            fail: None,
            regs: RegFile::default(),
            irq: Arc::new(IrqState::default()),
            timer: Arc::new(Timer::new(Box::new(Ticks(now.clone())))),
            now,
            events: Default::default(),
            registered: Default::default(),
            log: Default::default(),
        }
    }

    /// A second receiver on the same clock and software timer as `other`.
    pub fn sharing_timer(compatible: &'static str, other: &MockDevice) -> Self {
        let mut dev = Self::new(compatible);
        dev.now = other.now.clone();
        dev.timer = other.timer.clone();
        dev
    }

    pub fn failing_at(compatible: &'static str, step: Step) -> Self {
        let mut dev = Self::new(compatible);
        dev.fail = Some(step);
        dev.irq
            .fail_request
            .store(step == Step::RequestIrq, Ordering::SeqCst);
        dev
    }

    /// Moves the clock to `us` and runs expired timers.
    pub fn advance_to(&self, us: u64) {
        self.now.store(us, Ordering::SeqCst);
        self.timer.handle_irq();
    }

    /// Moves the clock to `us` and raises an edge interrupt with the input
    /// at `level`.
    pub fn edge_at(&self, us: u64, level: bool) -> Option<IrqHandleResult> {
        self.advance_to(us);
        self.regs.set_input_level(level);
        self.irq.fire()
    }

    pub fn events(&self) -> Vec<RawEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn timeouts(&self) -> usize {
        self.events().iter().filter(|e| e.is_timeout()).count()
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    fn check(&self, step: Step, name: &'static str) -> DriverResult {
        if self.fail == Some(step) {
            return Err(DriverError::ResourceUnavailable(name));
        }
        Ok(())
    }
}

impl PlatformDevice for MockDevice {
    fn name(&self) -> &str {
        "c8100580.ir"
    }

    fn is_compatible(&self, compatible: &str) -> bool {
        self.compatible == compatible
    }

    fn property_bool(&self, name: &str) -> bool {
        name == "pulse-inverted" && self.pulse_inverted
    }

    fn property_str(&self, name: &str) -> Option<&str> {
        match name {
            "linux,rc-map-name" => self.map_name,
            _ => None,
        }
    }

    fn iomap(&mut self, index: usize) -> DriverResult<BoxRegisterIo> {
        assert_eq!(index, 0);
        self.check(Step::Iomap, "reg")?;
        push(&self.log, "acquire regs");
        Ok(Box::new(FakeMmio {
            file: self.regs.clone(),
            log: self.log.clone(),
        }))
    }

    fn irq(&mut self, index: usize) -> DriverResult<BoxIrqLine> {
        assert_eq!(index, 0);
        self.check(Step::Irq, "irq")?;
        Ok(Box::new(FakeIrq {
            state: self.irq.clone(),
            log: self.log.clone(),
        }))
    }

    fn pinctrl_select_default(&mut self) -> DriverResult<PinctrlHandle> {
        self.check(Step::Pinctrl, "pinctrl")?;
        push(&self.log, "acquire pinctrl");
        let guard: Box<dyn Any + Send> = Box::new(PinGuard(self.log.clone()));
        Ok(guard)
    }

    fn allocate_rc(&mut self) -> DriverResult<BoxRcDevice> {
        if self.fail == Some(Step::AllocateRc) {
            return Err(DriverError::DecoderAllocationFailed);
        }
        push(&self.log, "acquire rc");
        let events = self.events.clone();
        let fifo = RawFifo::new(
            self.timer.clone(),
            Box::new(move |e: RawEvent| events.lock().unwrap().push(e)),
        );
        Ok(Box::new(TrackedRc {
            fifo,
            fail_register: self.fail == Some(Step::RegisterRc),
            registered: self.registered.clone(),
            log: self.log.clone(),
        }))
    }

    fn timer(&self) -> Arc<Timer> {
        self.timer.clone()
    }
}
