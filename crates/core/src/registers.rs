//! # Register File

use crate::flags::Status;

/// First byte of the hardware stack page.
pub const STACK_BASE: u16 = 0x0100;

/// A, X, Y, SP, PC and P. Every field is stored at its hardware width, so any
/// write wraps silently.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Registers {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub status: Status,
}

impl Registers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Address SP currently points at inside page 1.
    pub fn stack_address(&self) -> u16 {
        STACK_BASE | self.sp as u16
    }

    pub fn advance_pc(&mut self, count: u16) {
        self.pc = self.pc.wrapping_add(count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_address() {
        let mut regs = Registers::new();
        regs.sp = 0x32;
        assert_eq!(regs.stack_address(), 0x0132);
        regs.sp = regs.sp.wrapping_sub(0x33);
        assert_eq!(regs.stack_address(), 0x01FF);
    }

    #[test]
    fn test_pc_wraps() {
        let mut regs = Registers::new();
        regs.pc = 0xFFFF;
        regs.advance_pc(1);
        assert_eq!(regs.pc, 0x0000);
        regs.advance_pc(0xFFFF);
        assert_eq!(regs.pc, 0xFFFF);
    }
}
