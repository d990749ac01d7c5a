use alloc::{boxed::Box, format, string::ToString, sync::Arc};
use core::time::Duration;

use driver_interface::{
    irq::{BoxIrqLine, IrqId},
    platform::{PinctrlHandle, PlatformDevice},
    rc::{BusType, Protocols, RC_MAP_EMPTY},
    register::DriverRegister,
    DriverError, DriverGeneric, DriverResult,
};
use log::{debug, error, info, warn};

use crate::{
    capture::Shared,
    config::{
        DecoderConfig, ModeField, COMPATIBLE_GXBB, COMPATIBLE_MESON6, COMPATIBLE_MESON8B,
        SAMPLE_PERIOD,
    },
    regs::IrRegs,
    snapshot::RegisterSnapshot,
};

pub const DRIVER_NAME: &str = "meson-ir";

pub const COMPATIBLES: &[&str] = &[COMPATIBLE_MESON6, COMPATIBLE_MESON8B, COMPATIBLE_GXBB];

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(125);
pub const MIN_TIMEOUT: Duration = Duration::from_micros(1);
pub const MAX_TIMEOUT: Duration = Duration::from_millis(1250);

const PROP_PULSE_INVERTED: &str = "pulse-inverted";
const PROP_MAP_NAME: &str = "linux,rc-map-name";

/// What happens to the interrupt line across suspend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakePolicy {
    /// Drop the line's wake capability, keep it requested and unmasked.
    DisableWake,
    /// Mask the line entirely.
    MaskLine,
}

impl Default for WakePolicy {
    fn default() -> Self {
        if cfg!(feature = "mask-irq-on-suspend") {
            Self::MaskLine
        } else {
            Self::DisableWake
        }
    }
}

#[derive(Debug, Clone)]
pub struct DriverConfig {
    pub wake_policy: WakePolicy,
    /// Initial inactivity timeout, within [`MIN_TIMEOUT`, `MAX_TIMEOUT`].
    pub timeout: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            wake_policy: WakePolicy::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerState {
    Active,
    Suspended,
}

/// A bound Meson IR receiver.
///
/// Dropping the receiver detaches it, see [`MesonIr::remove`].
pub struct MesonIr {
    shared: Arc<Shared>,
    irq: BoxIrqLine,
    config: DecoderConfig,
    snapshot: RegisterSnapshot,
    wake_policy: WakePolicy,
    power: PowerState,
    detached: bool,
    pinctrl: Option<PinctrlHandle>,
}

impl MesonIr {
    pub fn probe(dev: &mut dyn PlatformDevice) -> DriverResult<Self> {
        Self::probe_with(dev, DriverConfig::default())
    }

    /// Binds to `dev`. On error every resource taken so far is released in
    /// reverse order before returning.
    pub fn probe_with(dev: &mut dyn PlatformDevice, cfg: DriverConfig) -> DriverResult<Self> {
        let mode_field = COMPATIBLES
            .iter()
            .filter(|c| dev.is_compatible(c))
            .find_map(|c| ModeField::from_compatible(c))
            .ok_or(DriverError::NotSupported)
            .inspect_err(|_| error!("{}: no supported compatible", dev.name()))?;

        let regs = dev
            .iomap(0)
            .inspect_err(|e| error!("{}: failed to map registers: {e}", dev.name()))?;
        let mut irq = dev.irq(0)?;

        let mut rc = dev
            .allocate_rc()
            .inspect_err(|_| error!("{}: failed to allocate rc device", dev.name()))?;
        {
            let desc = rc.descriptor_mut();
            desc.device_name = DRIVER_NAME;
            desc.driver_name = DRIVER_NAME;
            desc.input_phys = format!("{DRIVER_NAME}/input0");
            desc.bus_type = BusType::Host;
            desc.map_name = dev
                .property_str(PROP_MAP_NAME)
                .unwrap_or(RC_MAP_EMPTY)
                .to_string();
            desc.allowed_protocols = Protocols::ALL_IR_DECODER;
            desc.rx_resolution = SAMPLE_PERIOD;
            desc.min_timeout = MIN_TIMEOUT;
            desc.max_timeout = MAX_TIMEOUT;
            desc.set_timeout(cfg.timeout)?;
        }

        let config = DecoderConfig::new(mode_field, dev.property_bool(PROP_PULSE_INVERTED));

        rc.register()
            .inspect_err(|_| error!("{}: failed to register rc device", dev.name()))?;

        let shared = Shared::new(IrRegs::new(regs), rc, &dev.timer());

        let edge = shared.clone();
        irq.request(Box::new(move |_irq: IrqId| edge.handle_edge()))
            .inspect_err(|_| error!("{}: failed to request irq", dev.name()))?;

        let pinctrl = dev
            .pinctrl_select_default()
            .inspect_err(|e| error!("{}: pinctrl error, {e}", dev.name()))?;

        let snapshot = {
            let mut inner = shared.inner.lock();
            config.apply(&mut inner.regs);
            RegisterSnapshot::capture(&inner.regs)
        };

        info!("{}: receiver initialized", dev.name());
        debug!("irq {:?}, {:?}", irq.id(), config);

        Ok(Self {
            shared,
            irq,
            config,
            snapshot,
            wake_policy: cfg.wake_policy,
            power: PowerState::Active,
            detached: false,
            pinctrl: Some(pinctrl),
        })
    }

    pub fn irq_id(&self) -> IrqId {
        self.irq.id()
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn snapshot(&self) -> &RegisterSnapshot {
        &self.snapshot
    }

    pub fn power_state(&self) -> PowerState {
        self.power
    }

    pub fn wake_policy(&self) -> WakePolicy {
        self.wake_policy
    }

    pub fn timeout(&self) -> Duration {
        self.shared.inner.lock().rc.descriptor().timeout()
    }

    /// Changes the inactivity timeout; takes effect at the next edge.
    pub fn set_timeout(&self, timeout: Duration) -> DriverResult {
        self.shared
            .inner
            .lock()
            .rc
            .descriptor_mut()
            .set_timeout(timeout)
    }

    pub fn suspend(&mut self) -> DriverResult {
        if self.power == PowerState::Suspended {
            warn!("{DRIVER_NAME}: already suspended");
            return Ok(());
        }

        match self.wake_policy {
            WakePolicy::DisableWake => {
                let _inner = self.shared.inner.lock();
                self.irq.set_wake(false);
            }
            // Waits for a running handler, so not under the lock.
            WakePolicy::MaskLine => self.irq.disable(),
        }

        self.power = PowerState::Suspended;
        info!("{DRIVER_NAME}: receiver suspend");
        Ok(())
    }

    pub fn resume(&mut self) -> DriverResult {
        if self.power == PowerState::Active {
            warn!("{DRIVER_NAME}: resume while active");
            return Ok(());
        }

        {
            let mut inner = self.shared.inner.lock();
            self.snapshot.restore(&mut inner.regs);
            self.config.apply(&mut inner.regs);

            match self.wake_policy {
                WakePolicy::DisableWake => self.irq.set_wake(true),
                WakePolicy::MaskLine => self.irq.enable(),
            }
        }

        self.power = PowerState::Active;
        info!("{DRIVER_NAME}: receiver resumed");
        Ok(())
    }

    /// Leaves the decoder in hardware NEC mode so the firmware can wake the
    /// system. The driver instance stays bound.
    pub fn shutdown(&mut self) {
        let mut inner = self.shared.inner.lock();
        self.config.enter_low_power_mode(&mut inner.regs);
    }

    /// Detaches from the hardware. No flush timeout fires after this returns.
    pub fn remove(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if self.detached {
            return;
        }
        self.detached = true;

        // Disable first, an edge after this point can no longer re-arm the
        // flush timer.
        {
            let mut inner = self.shared.inner.lock();
            self.config.disable(&mut inner.regs);
            inner.detached = true;
        }
        self.shared.flush.cancel_sync();
        drop(self.pinctrl.take());
        self.irq.free();

        debug!("{DRIVER_NAME}: removed");
    }
}

impl Drop for MesonIr {
    fn drop(&mut self) {
        self.detach();
    }
}

impl DriverGeneric for MesonIr {
    fn suspend(&mut self) -> DriverResult {
        MesonIr::suspend(self)
    }

    fn resume(&mut self) -> DriverResult {
        MesonIr::resume(self)
    }

    fn shutdown(&mut self) {
        MesonIr::shutdown(self)
    }
}

pub fn register() -> DriverRegister {
    DriverRegister {
        name: DRIVER_NAME,
        compatibles: COMPATIBLES,
        on_probe: probe_boxed,
    }
}

fn probe_boxed(dev: &mut dyn PlatformDevice) -> DriverResult<Box<dyn DriverGeneric>> {
    Ok(Box::new(MesonIr::probe(dev)?))
}
