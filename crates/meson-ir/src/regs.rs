use driver_interface::mmio::BoxRegisterIo;
use tock_registers::{
    fields::{Field, FieldValue},
    register_bitfields, RegisterLongName,
};

/// Decoder registers, valid on all Meson SoCs except `Reg2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum Reg {
    LdrActive = 0x00,
    LdrIdle = 0x04,
    LdrRepeat = 0x08,
    Bit0 = 0x0c,
    Reg0 = 0x10,
    Frame = 0x14,
    Status = 0x18,
    Reg1 = 0x1c,
    /// Meson 8b and newer only.
    Reg2 = 0x20,
}

impl Reg {
    pub const fn offset(self) -> usize {
        self as usize
    }
}

/// Size of the register window the driver touches.
pub const REGION_SIZE: usize = 0x24;

register_bitfields! [
    u32,
    pub REG0 [
        // Sample period minus one, in microseconds.
        RATE OFFSET(0) NUMBITS(12) []
    ],
    pub STATUS [
        // Current level of the demodulated input.
        IR_DEC_IN OFFSET(8) NUMBITS(1) []
    ],
    pub REG1 [
        RESET OFFSET(0) NUMBITS(1) [],
        POL OFFSET(1) NUMBITS(1) [],
        IRQSEL OFFSET(2) NUMBITS(2) [
            NecMode = 0,
            RiseFall = 1,
            Fall = 2,
            Rise = 3
        ],
        // Decode mode on Meson 6.
        MODE OFFSET(7) NUMBITS(2) [
            Nec = 0,
            Raw = 2
        ],
        ENABLE OFFSET(15) NUMBITS(1) [],
        TIME_IV OFFSET(16) NUMBITS(13) []
    ],
    pub REG2 [
        // Decode mode on Meson 8b and GXBB.
        MODE OFFSET(0) NUMBITS(4) [
            Nec = 0,
            Raw = 2
        ]
    ]
];

/// Masked access to the decoder register window.
///
/// Writes hit the hardware immediately and are never read back.
pub struct IrRegs {
    io: BoxRegisterIo,
}

impl IrRegs {
    pub fn new(io: BoxRegisterIo) -> Self {
        Self { io }
    }

    pub fn read(&self, reg: Reg) -> u32 {
        self.io.read32(reg.offset())
    }

    /// Clears the `mask` bits of `reg`, then sets `value & mask`.
    pub fn update(&mut self, reg: Reg, mask: u32, value: u32) {
        let data = (self.read(reg) & !mask) | (value & mask);
        self.io.write32(reg.offset(), data);
    }

    pub fn modify<R: RegisterLongName>(&mut self, reg: Reg, field: FieldValue<u32, R>) {
        self.update(reg, field.mask(), field.value);
    }

    pub fn read_field<R: RegisterLongName>(&self, reg: Reg, field: Field<u32, R>) -> u32 {
        field.read(self.read(reg))
    }

    pub fn is_set<R: RegisterLongName>(&self, reg: Reg, field: Field<u32, R>) -> bool {
        field.is_set(self.read(reg))
    }
}
