//! Raw IR event sink shared by receiver drivers and protocol decoders.

use alloc::{
    boxed::Box,
    collections::VecDeque,
    string::{String, ToString},
    sync::Arc,
};
use core::time::Duration;

use bitflags::bitflags;
use log::debug;

use crate::{timer::Timer, DriverError, DriverResult};

pub const RC_MAP_EMPTY: &str = "rc-empty";

/// Timeout a decoder uses before a driver configures its own.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(125);

pub type BoxRcDevice = Box<dyn RcDevice>;

/// One sample of the demodulated IR signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawEvent {
    /// The input changed to `level` after `duration` at the previous level.
    Edge { level: bool, duration: Duration },
    /// No edge for `duration`, the frame is over.
    Timeout { duration: Duration },
}

impl RawEvent {
    pub fn duration(&self) -> Duration {
        match self {
            RawEvent::Edge { duration, .. } | RawEvent::Timeout { duration } => *duration,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, RawEvent::Timeout { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusType {
    Host,
    Usb,
    Virtual,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Protocols: u64 {
        const RC5 = 1 << 2;
        const RC5X_20 = 1 << 3;
        const RC5_SZ = 1 << 4;
        const JVC = 1 << 5;
        const SONY12 = 1 << 6;
        const SONY15 = 1 << 7;
        const SONY20 = 1 << 8;
        const NEC = 1 << 9;
        const NECX = 1 << 10;
        const NEC32 = 1 << 11;
        const SANYO = 1 << 12;
        const MCIR2_KBD = 1 << 13;
        const MCIR2_MSE = 1 << 14;
        const RC6_0 = 1 << 15;
        const RC6_6A_20 = 1 << 16;
        const RC6_6A_24 = 1 << 17;
        const RC6_6A_32 = 1 << 18;
        const RC6_MCE = 1 << 19;
        const SHARP = 1 << 20;
        const XMP = 1 << 21;
        const IMON = 1 << 23;
        const RCMM12 = 1 << 24;
        const RCMM24 = 1 << 25;
        const RCMM32 = 1 << 26;

        const ALL_IR_DECODER = Self::RC5.bits() | Self::RC5X_20.bits() | Self::RC5_SZ.bits()
            | Self::JVC.bits() | Self::SONY12.bits() | Self::SONY15.bits() | Self::SONY20.bits()
            | Self::NEC.bits() | Self::NECX.bits() | Self::NEC32.bits() | Self::SANYO.bits()
            | Self::MCIR2_KBD.bits() | Self::MCIR2_MSE.bits() | Self::RC6_0.bits()
            | Self::RC6_6A_20.bits() | Self::RC6_6A_24.bits() | Self::RC6_6A_32.bits()
            | Self::RC6_MCE.bits() | Self::SHARP.bits() | Self::XMP.bits() | Self::IMON.bits()
            | Self::RCMM12.bits() | Self::RCMM24.bits() | Self::RCMM32.bits();
    }
}

/// Fields a receiver driver fills in before registering its sink.
#[derive(Debug, Clone)]
pub struct RcDescriptor {
    pub device_name: &'static str,
    pub driver_name: &'static str,
    pub input_phys: String,
    pub bus_type: BusType,
    pub map_name: String,
    pub allowed_protocols: Protocols,
    /// Sample granularity of the reported durations.
    pub rx_resolution: Duration,
    pub min_timeout: Duration,
    pub max_timeout: Duration,
    timeout: Duration,
}

impl Default for RcDescriptor {
    fn default() -> Self {
        Self {
            device_name: "",
            driver_name: "",
            input_phys: String::new(),
            bus_type: BusType::Host,
            map_name: RC_MAP_EMPTY.to_string(),
            allowed_protocols: Protocols::empty(),
            rx_resolution: Duration::ZERO,
            min_timeout: Duration::ZERO,
            max_timeout: Duration::MAX,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl RcDescriptor {
    /// Inactivity after which a frame is considered complete.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) -> DriverResult {
        if timeout < self.min_timeout || timeout > self.max_timeout {
            return Err(DriverError::InvalidParameter { name: "timeout" });
        }
        self.timeout = timeout;
        Ok(())
    }
}

/// The decoder side of a raw IR receiver.
///
/// Drivers call the store functions from interrupt or timer context and then
/// [`RcDevice::handle`], so implementations must not sleep.
pub trait RcDevice: Send {
    fn descriptor(&self) -> &RcDescriptor;
    fn descriptor_mut(&mut self) -> &mut RcDescriptor;
    fn register(&mut self) -> DriverResult;
    /// Records an edge; the duration is measured by the sink's own clock.
    fn store_edge(&mut self, level: bool);
    fn store_timeout(&mut self, duration: Duration);
    /// Hands the stored events to the decoders.
    fn handle(&mut self);
}

/// Decoder callback fed by [`RawFifo`].
pub type Decoder = Box<dyn FnMut(RawEvent) + Send>;

/// An [`RcDevice`] that timestamps edges with a [`Timer`] and forwards the
/// events in order to a decoder callback.
pub struct RawFifo {
    descriptor: RcDescriptor,
    clock: Arc<Timer>,
    last_event: Option<Duration>,
    pending: VecDeque<RawEvent>,
    registered: bool,
    decoder: Decoder,
}

impl RawFifo {
    pub fn new(clock: Arc<Timer>, decoder: Decoder) -> Self {
        Self {
            descriptor: RcDescriptor::default(),
            clock,
            last_event: None,
            pending: VecDeque::new(),
            registered: false,
            decoder,
        }
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    fn elapsed(&mut self) -> Duration {
        let now = self.clock.since_boot();
        let elapsed = self
            .last_event
            .map(|last| now.saturating_sub(last))
            .unwrap_or_default();
        self.last_event = Some(now);
        elapsed
    }
}

impl RcDevice for RawFifo {
    fn descriptor(&self) -> &RcDescriptor {
        &self.descriptor
    }

    fn descriptor_mut(&mut self) -> &mut RcDescriptor {
        &mut self.descriptor
    }

    fn register(&mut self) -> DriverResult {
        if self.registered {
            return Err(DriverError::RegistrationFailed);
        }
        debug!(
            "rc device {} registered, map {}",
            self.descriptor.device_name, self.descriptor.map_name
        );
        self.registered = true;
        Ok(())
    }

    fn store_edge(&mut self, level: bool) {
        let duration = self.elapsed();
        self.pending.push_back(RawEvent::Edge { level, duration });
    }

    fn store_timeout(&mut self, duration: Duration) {
        self.last_event = Some(self.clock.since_boot());
        self.pending.push_back(RawEvent::Timeout { duration });
    }

    fn handle(&mut self) {
        while let Some(event) = self.pending.pop_front() {
            (self.decoder)(event);
        }
    }
}
