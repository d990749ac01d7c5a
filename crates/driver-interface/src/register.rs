use alloc::boxed::Box;

use crate::{platform::PlatformDevice, DriverGeneric, DriverResult};

pub type OnProbe = fn(dev: &mut dyn PlatformDevice) -> DriverResult<Box<dyn DriverGeneric>>;

#[derive(Clone)]
pub struct DriverRegister {
    pub name: &'static str,
    pub compatibles: &'static [&'static str],
    pub on_probe: OnProbe,
}

impl DriverRegister {
    pub fn compatible_matched(&self, compatible: &str) -> bool {
        self.compatibles.iter().any(|one| *one == compatible)
    }

    /// Probes `dev` if it matches one of the driver's compatibles.
    pub fn probe(
        &self,
        dev: &mut dyn PlatformDevice,
    ) -> Option<DriverResult<Box<dyn DriverGeneric>>> {
        if !self.compatibles.iter().any(|c| dev.is_compatible(c)) {
            return None;
        }
        Some((self.on_probe)(dev))
    }
}
