use core::time::Duration;

use log::debug;

use crate::regs::{IrRegs, Reg, REG0, REG1, REG2};

/// Sample period of the decoder in raw mode.
pub const SAMPLE_PERIOD: Duration = Duration::from_micros(10);

/// REG0 rate the firmware expects after shutdown.
pub const SHUTDOWN_RATE: u32 = 0x13;

pub const COMPATIBLE_MESON6: &str = "amlogic,meson6-ir";
pub const COMPATIBLE_MESON8B: &str = "amlogic,meson8b-ir";
pub const COMPATIBLE_GXBB: &str = "amlogic,meson-gxbb-ir";

/// Where the decode mode select lives on a given SoC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeField {
    /// REG1 bits [8:7], Meson 6.
    Legacy,
    /// REG2 bits [3:0], Meson 8b and newer.
    Extended,
}

impl ModeField {
    pub fn from_compatible(compatible: &str) -> Option<Self> {
        match compatible {
            COMPATIBLE_MESON6 => Some(Self::Legacy),
            COMPATIBLE_MESON8B | COMPATIBLE_GXBB => Some(Self::Extended),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeMode {
    /// The hardware decodes NEC frames itself.
    Nec,
    /// Only edges are reported, decoding happens in software.
    Raw,
}

/// Everything needed to bring the decoder into raw capture mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    pub mode_field: ModeField,
    pub pulse_inverted: bool,
}

impl DecoderConfig {
    pub fn new(mode_field: ModeField, pulse_inverted: bool) -> Self {
        Self {
            mode_field,
            pulse_inverted,
        }
    }

    /// Resets the decoder and programs raw capture on both edges.
    pub fn apply(&self, regs: &mut IrRegs) {
        regs.modify(Reg::Reg1, REG1::RESET::SET);
        regs.modify(Reg::Reg1, REG1::RESET::CLEAR);

        self.set_mode(regs, DecodeMode::Raw);

        let rate = SAMPLE_PERIOD.as_micros() as u32 - 1;
        regs.modify(Reg::Reg0, REG0::RATE.val(rate));
        regs.modify(Reg::Reg1, REG1::IRQSEL::RiseFall);
        regs.modify(
            Reg::Reg1,
            if self.pulse_inverted {
                REG1::POL::SET
            } else {
                REG1::POL::CLEAR
            },
        );
        regs.modify(Reg::Reg1, REG1::ENABLE::SET);

        // Reading STATUS and FRAME clears a stale pending status.
        regs.read(Reg::Status);
        regs.read(Reg::Frame);

        debug!(
            "decoder configured: {:?}, rate {}, inverted {}",
            self.mode_field, rate, self.pulse_inverted
        );
    }

    /// Hands the receiver back to the hardware NEC decoder so the firmware
    /// can power the system on from a remote.
    pub fn enter_low_power_mode(&self, regs: &mut IrRegs) {
        self.set_mode(regs, DecodeMode::Nec);
        regs.modify(Reg::Reg0, REG0::RATE.val(SHUTDOWN_RATE));
    }

    pub fn disable(&self, regs: &mut IrRegs) {
        regs.modify(Reg::Reg1, REG1::ENABLE::CLEAR);
    }

    fn set_mode(&self, regs: &mut IrRegs, mode: DecodeMode) {
        match (self.mode_field, mode) {
            (ModeField::Legacy, DecodeMode::Nec) => regs.modify(Reg::Reg1, REG1::MODE::Nec),
            (ModeField::Legacy, DecodeMode::Raw) => regs.modify(Reg::Reg1, REG1::MODE::Raw),
            (ModeField::Extended, DecodeMode::Nec) => regs.modify(Reg::Reg2, REG2::MODE::Nec),
            (ModeField::Extended, DecodeMode::Raw) => regs.modify(Reg::Reg2, REG2::MODE::Raw),
        }
    }
}
