//! # Addressing Modes
//!
//! Effective-address resolution. `resolve` expects `regs.pc` to point at the
//! first operand byte (the opcode has already been consumed) and never moves
//! it; the engine advances PC by `Mode::operand_len` afterwards.

use crate::bus::Bus;
use crate::registers::Registers;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Mode {
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    IndirectX,
    IndirectY,
    Relative,
}

impl Mode {
    pub const fn operand_len(self) -> u16 {
        match self {
            Mode::Implied | Mode::Accumulator => 0,
            Mode::Immediate
            | Mode::ZeroPage
            | Mode::ZeroPageX
            | Mode::ZeroPageY
            | Mode::IndirectX
            | Mode::IndirectY
            | Mode::Relative => 1,
            Mode::Absolute | Mode::AbsoluteX | Mode::AbsoluteY | Mode::Indirect => 2,
        }
    }
}

/// Result of resolving a mode. `address` is `None` for Implied and
/// Accumulator.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Operand {
    pub address: Option<u16>,
    pub page_crossed: bool,
}

impl Operand {
    const NONE: Operand = Operand {
        address: None,
        page_crossed: false,
    };

    fn at(address: u16) -> Self {
        Operand {
            address: Some(address),
            page_crossed: false,
        }
    }

    fn indexed(base: u16, index: u8) -> Self {
        Operand {
            address: Some(offset(base, index)),
            page_crossed: cross(base, index),
        }
    }
}

pub fn resolve(mode: Mode, regs: &Registers, bus: &mut Bus) -> Operand {
    let pc = regs.pc;
    match mode {
        Mode::Implied | Mode::Accumulator => Operand::NONE,
        Mode::Immediate => Operand::at(pc),
        Mode::ZeroPage => Operand::at(bus.read_byte(pc) as u16),
        Mode::ZeroPageX => Operand::at(zero_page_indexed(bus.read_byte(pc), regs.x)),
        Mode::ZeroPageY => Operand::at(zero_page_indexed(bus.read_byte(pc), regs.y)),
        Mode::Absolute => Operand::at(bus.read_word(pc)),
        Mode::AbsoluteX => Operand::indexed(bus.read_word(pc), regs.x),
        Mode::AbsoluteY => Operand::indexed(bus.read_word(pc), regs.y),
        Mode::Indirect => {
            let pointer = bus.read_word(pc);
            Operand::at(indirect(bus, pointer))
        }
        Mode::IndirectX => {
            let pointer = bus.read_byte(pc).wrapping_add(regs.x);
            Operand::at(zero_page_word(bus, pointer))
        }
        Mode::IndirectY => {
            let pointer = bus.read_byte(pc);
            let base = zero_page_word(bus, pointer);
            Operand::indexed(base, regs.y)
        }
        Mode::Relative => {
            let displacement = bus.read_byte(pc) as i8;
            let next = pc.wrapping_add(1);
            let target = next.wrapping_add(displacement as u16);
            Operand {
                address: Some(target),
                page_crossed: high_byte(next) != high_byte(target),
            }
        }
    }
}

/// JMP ($xxFF) reads its high byte from $xx00, not from the next page.
pub fn indirect(bus: &mut Bus, pointer: u16) -> u16 {
    bus.read_noncontinuous_word(pointer, high_byte(pointer) | low_byte(pointer.wrapping_add(1)))
}

fn zero_page_indexed(base: u8, index: u8) -> u16 {
    base.wrapping_add(index) as u16
}

/// Little-endian pointer held in zero page; the high byte wraps to $00.
fn zero_page_word(bus: &mut Bus, pointer: u8) -> u16 {
    bus.read_noncontinuous_word(pointer as u16, pointer.wrapping_add(1) as u16)
}

fn cross(base: u16, offset: u8) -> bool {
    (base & 0xFF) + offset as u16 > 0xFF
}

fn offset(base: u16, offset: u8) -> u16 {
    base.wrapping_add(offset as u16)
}

fn low_byte(value: u16) -> u16 {
    value & 0xFF
}

fn high_byte(value: u16) -> u16 {
    value & 0xFF00
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(operand: &[u8]) -> (Registers, Bus) {
        let mut bus = Bus::new();
        bus.load(operand, 0x0200).unwrap();
        let regs = Registers {
            pc: 0x0200,
            ..Registers::default()
        };
        (regs, bus)
    }

    #[test]
    fn test_implied_has_no_address() {
        let (regs, mut bus) = setup(&[]);
        assert_eq!(resolve(Mode::Implied, &regs, &mut bus), Operand::NONE);
        assert_eq!(resolve(Mode::Accumulator, &regs, &mut bus).address, None);
    }

    #[test]
    fn test_immediate_points_at_operand() {
        let (regs, mut bus) = setup(&[0x42]);
        assert_eq!(resolve(Mode::Immediate, &regs, &mut bus).address, Some(0x0200));
    }

    #[test]
    fn test_zero_page_x_wraps() {
        let (mut regs, mut bus) = setup(&[0xF0]);
        regs.x = 0x20;
        assert_eq!(resolve(Mode::ZeroPageX, &regs, &mut bus).address, Some(0x0010));
        regs.y = 0x10;
        assert_eq!(resolve(Mode::ZeroPageY, &regs, &mut bus).address, Some(0x0000));
    }

    #[test]
    fn test_absolute_indexed_page_cross() {
        let (mut regs, mut bus) = setup(&[0xF0, 0x12]);
        regs.x = 0x0F;
        let operand = resolve(Mode::AbsoluteX, &regs, &mut bus);
        assert_eq!(operand.address, Some(0x12FF));
        assert!(!operand.page_crossed);

        regs.y = 0x10;
        let operand = resolve(Mode::AbsoluteY, &regs, &mut bus);
        assert_eq!(operand.address, Some(0x1300));
        assert!(operand.page_crossed);
    }

    #[test]
    fn test_absolute_indexed_wraps_address_space() {
        let (mut regs, mut bus) = setup(&[0xFF, 0xFF]);
        regs.x = 0x02;
        let operand = resolve(Mode::AbsoluteX, &regs, &mut bus);
        assert_eq!(operand.address, Some(0x0001));
        assert!(operand.page_crossed);
    }

    #[test]
    fn test_indirect_page_bug() {
        let (regs, mut bus) = setup(&[0xFF, 0x30]);
        bus.write_byte(0x30FF, 0x80);
        bus.write_byte(0x3000, 0x50);
        bus.write_byte(0x3100, 0x40);
        assert_eq!(resolve(Mode::Indirect, &regs, &mut bus).address, Some(0x5080));
    }

    #[test]
    fn test_indirect_x_wraps_in_zero_page() {
        let (mut regs, mut bus) = setup(&[0xFE]);
        regs.x = 0x01;
        bus.write_byte(0x00FF, 0x34);
        bus.write_byte(0x0000, 0x12);
        assert_eq!(resolve(Mode::IndirectX, &regs, &mut bus).address, Some(0x1234));
    }

    #[test]
    fn test_indirect_y_page_cross() {
        let (mut regs, mut bus) = setup(&[0x40]);
        regs.y = 0x20;
        bus.write_byte(0x0040, 0xF0);
        bus.write_byte(0x0041, 0x20);
        let operand = resolve(Mode::IndirectY, &regs, &mut bus);
        assert_eq!(operand.address, Some(0x2110));
        assert!(operand.page_crossed);
    }

    #[test]
    fn test_indirect_y_pointer_wraps_in_zero_page() {
        let (mut regs, mut bus) = setup(&[0xFF]);
        regs.y = 0x10;
        bus.write_byte(0x00FF, 0xF0);
        bus.write_byte(0x0000, 0x12);
        bus.write_byte(0x0100, 0x99);
        let operand = resolve(Mode::IndirectY, &regs, &mut bus);
        assert_eq!(operand.address, Some(0x1300));
        assert!(operand.page_crossed);
    }

    #[test]
    fn test_relative() {
        let (regs, mut bus) = setup(&[0x10]);
        let operand = resolve(Mode::Relative, &regs, &mut bus);
        assert_eq!(operand.address, Some(0x0211));
        assert!(!operand.page_crossed);

        let (regs, mut bus) = setup(&[0xFC]);
        let operand = resolve(Mode::Relative, &regs, &mut bus);
        assert_eq!(operand.address, Some(0x01FD));
        assert!(operand.page_crossed);
    }
}
