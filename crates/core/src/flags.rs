//! # Processor Status Register
//!
//! The live status byte is kept in one packed value. The unused bit always
//! reads as 1 and the break bit is never held in the live register: it only
//! exists in the copy pushed to the stack by PHP, BRK, IRQ and NMI.

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Flag {
    Carry      = 0b00000001,
    Zero       = 0b00000010,
    IrqDisable = 0b00000100,
    Decimal    = 0b00001000,
    Break      = 0b00010000,
    Unused     = 0b00100000,
    Overflow   = 0b01000000,
    Negative   = 0b10000000,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Status(u8);

impl Status {
    pub const fn new() -> Self {
        Status(Flag::Unused as u8)
    }

    /// Builds a live status from a raw byte, e.g. one pulled by PLP or RTI.
    pub const fn from_bits(bits: u8) -> Self {
        Status((bits | Flag::Unused as u8) & !(Flag::Break as u8))
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// The byte written to the stack. `brk` is true for BRK and PHP, false
    /// for hardware interrupts.
    pub const fn pushed(self, brk: bool) -> u8 {
        if brk {
            self.0 | Flag::Break as u8
        } else {
            self.0 & !(Flag::Break as u8)
        }
    }

    pub fn get(self, flag: Flag) -> bool {
        self.0 & flag as u8 != 0
    }

    pub fn set(&mut self, flag: Flag, value: bool) {
        match flag {
            Flag::Unused | Flag::Break => {}
            _ if value => self.0 |= flag as u8,
            _ => self.0 &= !(flag as u8),
        }
    }

    pub fn carry(self) -> bool {
        self.get(Flag::Carry)
    }

    pub fn zero(self) -> bool {
        self.get(Flag::Zero)
    }

    pub fn irq_disabled(self) -> bool {
        self.get(Flag::IrqDisable)
    }

    pub fn decimal(self) -> bool {
        self.get(Flag::Decimal)
    }

    pub fn overflow(self) -> bool {
        self.get(Flag::Overflow)
    }

    pub fn negative(self) -> bool {
        self.get(Flag::Negative)
    }

    /// Loads, transfers, logical ops, increments and decrements.
    pub fn update_zero_negative(&mut self, value: u8) {
        self.set(Flag::Zero, value == 0);
        self.set(Flag::Negative, value & 0b1000_0000 != 0);
    }

    /// Binary add with carry. `sum` is the 9-bit result of `a + operand + c`;
    /// subtraction passes the one's complement of its operand.
    pub fn update_add(&mut self, a: u8, operand: u8, sum: u16) {
        let result = sum as u8;
        self.set(Flag::Carry, sum > 0xFF);
        self.set(
            Flag::Overflow,
            (a ^ result) & (operand ^ result) & 0x80 != 0,
        );
        self.update_zero_negative(result);
    }

    /// CMP, CPX and CPY: flags of `register - operand`, result discarded.
    pub fn update_compare(&mut self, register: u8, operand: u8) {
        self.set(Flag::Carry, register >= operand);
        self.update_zero_negative(register.wrapping_sub(operand));
    }

    pub fn update_shift(&mut self, result: u8, carry_out: bool) {
        self.set(Flag::Carry, carry_out);
        self.update_zero_negative(result);
    }

    pub fn update_bit(&mut self, a: u8, operand: u8) {
        self.set(Flag::Zero, a & operand == 0);
        self.set(Flag::Overflow, operand & 0b0100_0000 != 0);
        self.set(Flag::Negative, operand & 0b1000_0000 != 0);
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::new()
    }
}
