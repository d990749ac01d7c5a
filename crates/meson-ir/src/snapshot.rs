use crate::regs::{IrRegs, Reg};

const SAVED: [Reg; 6] = [
    Reg::Reg0,
    Reg::Reg1,
    Reg::LdrActive,
    Reg::LdrIdle,
    Reg::Bit0,
    Reg::LdrRepeat,
];

/// Decoder setup taken right after attach, re-applied on resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterSnapshot {
    values: [u32; SAVED.len()],
}

impl RegisterSnapshot {
    pub fn capture(regs: &IrRegs) -> Self {
        Self {
            values: SAVED.map(|reg| regs.read(reg)),
        }
    }

    pub fn get(&self, reg: Reg) -> Option<u32> {
        self.iter().find(|(r, _)| *r == reg).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Reg, u32)> + '_ {
        SAVED.iter().copied().zip(self.values.iter().copied())
    }

    /// Sets every bit that was set at capture time. Bits cleared since then
    /// stay untouched.
    pub fn restore(&self, regs: &mut IrRegs) {
        for (reg, value) in self.iter() {
            regs.update(reg, value, value);
        }
    }
}
