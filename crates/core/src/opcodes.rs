//! # Instruction Decoder
//!
//! A flat 256-entry table indexed by opcode byte. Opcodes outside the 151
//! documented NMOS 6502 instructions decode to an `Undefined` record.

use crate::addressing::Mode;
use std::fmt;

#[rustfmt::skip]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs, Clc,
    Cld, Cli, Clv, Cmp, Cpx, Cpy, Dec, Dex, Dey, Eor, Inc, Inx, Iny, Jmp,
    Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Pla, Plp, Rol, Ror, Rti,
    Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay, Tsx, Txa, Txs, Tya,
    Undefined,
}

impl Mnemonic {
    #[rustfmt::skip]
    pub fn name(self) -> &'static str {
        use Mnemonic::*;
        match self {
            Adc => "ADC", And => "AND", Asl => "ASL", Bcc => "BCC", Bcs => "BCS",
            Beq => "BEQ", Bit => "BIT", Bmi => "BMI", Bne => "BNE", Bpl => "BPL",
            Brk => "BRK", Bvc => "BVC", Bvs => "BVS", Clc => "CLC", Cld => "CLD",
            Cli => "CLI", Clv => "CLV", Cmp => "CMP", Cpx => "CPX", Cpy => "CPY",
            Dec => "DEC", Dex => "DEX", Dey => "DEY", Eor => "EOR", Inc => "INC",
            Inx => "INX", Iny => "INY", Jmp => "JMP", Jsr => "JSR", Lda => "LDA",
            Ldx => "LDX", Ldy => "LDY", Lsr => "LSR", Nop => "NOP", Ora => "ORA",
            Pha => "PHA", Php => "PHP", Pla => "PLA", Plp => "PLP", Rol => "ROL",
            Ror => "ROR", Rti => "RTI", Rts => "RTS", Sbc => "SBC", Sec => "SEC",
            Sed => "SED", Sei => "SEI", Sta => "STA", Stx => "STX", Sty => "STY",
            Tax => "TAX", Tay => "TAY", Tsx => "TSX", Txa => "TXA", Txs => "TXS",
            Tya => "TYA", Undefined => "???",
        }
    }

    pub fn is_branch(self) -> bool {
        matches!(
            self,
            Mnemonic::Bcc
                | Mnemonic::Bcs
                | Mnemonic::Beq
                | Mnemonic::Bmi
                | Mnemonic::Bne
                | Mnemonic::Bpl
                | Mnemonic::Bvc
                | Mnemonic::Bvs
        )
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: u8,
    pub mnemonic: Mnemonic,
    pub mode: Mode,
    /// Cycles before any page-cross or branch-taken penalty.
    pub cycles: u8,
    /// Indexed reads add a cycle when the effective address crosses a page.
    /// Branches add one when taken and another when the target crosses.
    pub page_penalty: bool,
}

impl Instruction {
    const fn undefined(opcode: u8) -> Self {
        Instruction {
            opcode,
            mnemonic: Mnemonic::Undefined,
            mode: Mode::Implied,
            cycles: 0,
            page_penalty: false,
        }
    }

    pub fn is_defined(&self) -> bool {
        self.mnemonic != Mnemonic::Undefined
    }

    /// Encoded size in bytes, opcode included.
    pub fn len(&self) -> u16 {
        1 + self.mode.operand_len()
    }
}

const fn op(
    opcode: u8,
    mnemonic: Mnemonic,
    mode: Mode,
    cycles: u8,
    page_penalty: bool,
) -> Instruction {
    Instruction {
        opcode,
        mnemonic,
        mode,
        cycles,
        page_penalty,
    }
}

#[rustfmt::skip]
const DOCUMENTED: [Instruction; 151] = {
    use Mnemonic::*;
    use Mode::*;

    [
        // Loads
        op(0xA9, Lda, Immediate, 2, false),
        op(0xA5, Lda, ZeroPage, 3, false),
        op(0xB5, Lda, ZeroPageX, 4, false),
        op(0xAD, Lda, Absolute, 4, false),
        op(0xBD, Lda, AbsoluteX, 4, true),
        op(0xB9, Lda, AbsoluteY, 4, true),
        op(0xA1, Lda, IndirectX, 6, false),
        op(0xB1, Lda, IndirectY, 5, true),

        op(0xA2, Ldx, Immediate, 2, false),
        op(0xA6, Ldx, ZeroPage, 3, false),
        op(0xB6, Ldx, ZeroPageY, 4, false),
        op(0xAE, Ldx, Absolute, 4, false),
        op(0xBE, Ldx, AbsoluteY, 4, true),

        op(0xA0, Ldy, Immediate, 2, false),
        op(0xA4, Ldy, ZeroPage, 3, false),
        op(0xB4, Ldy, ZeroPageX, 4, false),
        op(0xAC, Ldy, Absolute, 4, false),
        op(0xBC, Ldy, AbsoluteX, 4, true),

        // Stores
        op(0x85, Sta, ZeroPage, 3, false),
        op(0x95, Sta, ZeroPageX, 4, false),
        op(0x8D, Sta, Absolute, 4, false),
        op(0x9D, Sta, AbsoluteX, 5, false),
        op(0x99, Sta, AbsoluteY, 5, false),
        op(0x81, Sta, IndirectX, 6, false),
        op(0x91, Sta, IndirectY, 6, false),

        op(0x86, Stx, ZeroPage, 3, false),
        op(0x96, Stx, ZeroPageY, 4, false),
        op(0x8E, Stx, Absolute, 4, false),

        op(0x84, Sty, ZeroPage, 3, false),
        op(0x94, Sty, ZeroPageX, 4, false),
        op(0x8C, Sty, Absolute, 4, false),

        // Arithmetic
        op(0x69, Adc, Immediate, 2, false),
        op(0x65, Adc, ZeroPage, 3, false),
        op(0x75, Adc, ZeroPageX, 4, false),
        op(0x6D, Adc, Absolute, 4, false),
        op(0x7D, Adc, AbsoluteX, 4, true),
        op(0x79, Adc, AbsoluteY, 4, true),
        op(0x61, Adc, IndirectX, 6, false),
        op(0x71, Adc, IndirectY, 5, true),

        op(0xE9, Sbc, Immediate, 2, false),
        op(0xE5, Sbc, ZeroPage, 3, false),
        op(0xF5, Sbc, ZeroPageX, 4, false),
        op(0xED, Sbc, Absolute, 4, false),
        op(0xFD, Sbc, AbsoluteX, 4, true),
        op(0xF9, Sbc, AbsoluteY, 4, true),
        op(0xE1, Sbc, IndirectX, 6, false),
        op(0xF1, Sbc, IndirectY, 5, true),

        // Comparisons
        op(0xC9, Cmp, Immediate, 2, false),
        op(0xC5, Cmp, ZeroPage, 3, false),
        op(0xD5, Cmp, ZeroPageX, 4, false),
        op(0xCD, Cmp, Absolute, 4, false),
        op(0xDD, Cmp, AbsoluteX, 4, true),
        op(0xD9, Cmp, AbsoluteY, 4, true),
        op(0xC1, Cmp, IndirectX, 6, false),
        op(0xD1, Cmp, IndirectY, 5, true),

        op(0xE0, Cpx, Immediate, 2, false),
        op(0xE4, Cpx, ZeroPage, 3, false),
        op(0xEC, Cpx, Absolute, 4, false),

        op(0xC0, Cpy, Immediate, 2, false),
        op(0xC4, Cpy, ZeroPage, 3, false),
        op(0xCC, Cpy, Absolute, 4, false),

        // Bitwise operations
        op(0x29, And, Immediate, 2, false),
        op(0x25, And, ZeroPage, 3, false),
        op(0x35, And, ZeroPageX, 4, false),
        op(0x2D, And, Absolute, 4, false),
        op(0x3D, And, AbsoluteX, 4, true),
        op(0x39, And, AbsoluteY, 4, true),
        op(0x21, And, IndirectX, 6, false),
        op(0x31, And, IndirectY, 5, true),

        op(0x09, Ora, Immediate, 2, false),
        op(0x05, Ora, ZeroPage, 3, false),
        op(0x15, Ora, ZeroPageX, 4, false),
        op(0x0D, Ora, Absolute, 4, false),
        op(0x1D, Ora, AbsoluteX, 4, true),
        op(0x19, Ora, AbsoluteY, 4, true),
        op(0x01, Ora, IndirectX, 6, false),
        op(0x11, Ora, IndirectY, 5, true),

        op(0x49, Eor, Immediate, 2, false),
        op(0x45, Eor, ZeroPage, 3, false),
        op(0x55, Eor, ZeroPageX, 4, false),
        op(0x4D, Eor, Absolute, 4, false),
        op(0x5D, Eor, AbsoluteX, 4, true),
        op(0x59, Eor, AbsoluteY, 4, true),
        op(0x41, Eor, IndirectX, 6, false),
        op(0x51, Eor, IndirectY, 5, true),

        op(0x24, Bit, ZeroPage, 3, false),
        op(0x2C, Bit, Absolute, 4, false),

        // Shifts and rotates
        op(0x0A, Asl, Accumulator, 2, false),
        op(0x06, Asl, ZeroPage, 5, false),
        op(0x16, Asl, ZeroPageX, 6, false),
        op(0x0E, Asl, Absolute, 6, false),
        op(0x1E, Asl, AbsoluteX, 7, false),

        op(0x4A, Lsr, Accumulator, 2, false),
        op(0x46, Lsr, ZeroPage, 5, false),
        op(0x56, Lsr, ZeroPageX, 6, false),
        op(0x4E, Lsr, Absolute, 6, false),
        op(0x5E, Lsr, AbsoluteX, 7, false),

        op(0x2A, Rol, Accumulator, 2, false),
        op(0x26, Rol, ZeroPage, 5, false),
        op(0x36, Rol, ZeroPageX, 6, false),
        op(0x2E, Rol, Absolute, 6, false),
        op(0x3E, Rol, AbsoluteX, 7, false),

        op(0x6A, Ror, Accumulator, 2, false),
        op(0x66, Ror, ZeroPage, 5, false),
        op(0x76, Ror, ZeroPageX, 6, false),
        op(0x6E, Ror, Absolute, 6, false),
        op(0x7E, Ror, AbsoluteX, 7, false),

        // Increments and decrements
        op(0xE6, Inc, ZeroPage, 5, false),
        op(0xF6, Inc, ZeroPageX, 6, false),
        op(0xEE, Inc, Absolute, 6, false),
        op(0xFE, Inc, AbsoluteX, 7, false),

        op(0xC6, Dec, ZeroPage, 5, false),
        op(0xD6, Dec, ZeroPageX, 6, false),
        op(0xCE, Dec, Absolute, 6, false),
        op(0xDE, Dec, AbsoluteX, 7, false),

        op(0xE8, Inx, Implied, 2, false),
        op(0xCA, Dex, Implied, 2, false),
        op(0xC8, Iny, Implied, 2, false),
        op(0x88, Dey, Implied, 2, false),

        // Register moves
        op(0xAA, Tax, Implied, 2, false),
        op(0xA8, Tay, Implied, 2, false),
        op(0x8A, Txa, Implied, 2, false),
        op(0x98, Tya, Implied, 2, false),
        op(0x9A, Txs, Implied, 2, false),
        op(0xBA, Tsx, Implied, 2, false),

        // Flag operations
        op(0x18, Clc, Implied, 2, false),
        op(0x38, Sec, Implied, 2, false),
        op(0x58, Cli, Implied, 2, false),
        op(0x78, Sei, Implied, 2, false),
        op(0xB8, Clv, Implied, 2, false),
        op(0xD8, Cld, Implied, 2, false),
        op(0xF8, Sed, Implied, 2, false),

        // Branches
        op(0x10, Bpl, Relative, 2, true),
        op(0x30, Bmi, Relative, 2, true),
        op(0x50, Bvc, Relative, 2, true),
        op(0x70, Bvs, Relative, 2, true),
        op(0x90, Bcc, Relative, 2, true),
        op(0xB0, Bcs, Relative, 2, true),
        op(0xD0, Bne, Relative, 2, true),
        op(0xF0, Beq, Relative, 2, true),

        // Jumps
        op(0x4C, Jmp, Absolute, 3, false),
        op(0x6C, Jmp, Indirect, 5, false),

        // Procedure calls
        op(0x20, Jsr, Absolute, 6, false),
        op(0x60, Rts, Implied, 6, false),
        op(0x00, Brk, Implied, 7, false),
        op(0x40, Rti, Implied, 6, false),

        // Stack operations
        op(0x48, Pha, Implied, 3, false),
        op(0x68, Pla, Implied, 4, false),
        op(0x08, Php, Implied, 3, false),
        op(0x28, Plp, Implied, 4, false),

        op(0xEA, Nop, Implied, 2, false),
    ]
};

const fn build_table() -> [Instruction; 256] {
    let mut table = [Instruction::undefined(0); 256];
    let mut i = 0;
    while i < 256 {
        table[i] = Instruction::undefined(i as u8);
        i += 1;
    }

    let mut i = 0;
    while i < DOCUMENTED.len() {
        let instruction = DOCUMENTED[i];
        table[instruction.opcode as usize] = instruction;
        i += 1;
    }
    table
}

pub static INSTRUCTIONS: [Instruction; 256] = build_table();

pub fn decode(opcode: u8) -> Instruction {
    INSTRUCTIONS[opcode as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_documented_count() {
        let defined = INSTRUCTIONS.iter().filter(|i| i.is_defined()).count();
        assert_eq!(defined, 151);

        let unique: HashSet<u8> = DOCUMENTED.iter().map(|i| i.opcode).collect();
        assert_eq!(unique.len(), 151);

        let mnemonics: HashSet<Mnemonic> = DOCUMENTED.iter().map(|i| i.mnemonic).collect();
        assert_eq!(mnemonics.len(), 56);
    }

    #[test]
    fn test_table_indexed_by_opcode() {
        for (index, instruction) in INSTRUCTIONS.iter().enumerate() {
            assert_eq!(instruction.opcode as usize, index);
        }
    }

    #[test]
    fn test_undefined_records() {
        for opcode in [0x02, 0x03, 0x1A, 0x80, 0xEB, 0xFF] {
            let instruction = decode(opcode);
            assert!(!instruction.is_defined());
            assert_eq!(instruction.mnemonic.name(), "???");
            assert_eq!(instruction.len(), 1);
        }
    }

    #[test]
    fn test_page_penalty_only_on_indexed_reads_and_branches() {
        for instruction in INSTRUCTIONS.iter().filter(|i| i.page_penalty) {
            assert!(
                matches!(
                    instruction.mode,
                    Mode::AbsoluteX | Mode::AbsoluteY | Mode::IndirectY | Mode::Relative
                ),
                "{:#04x} {}",
                instruction.opcode,
                instruction.mnemonic
            );
            assert!(!matches!(
                instruction.mnemonic,
                Mnemonic::Sta | Mnemonic::Asl | Mnemonic::Lsr | Mnemonic::Rol | Mnemonic::Ror
                    | Mnemonic::Inc | Mnemonic::Dec
            ));
        }
    }

    #[test]
    fn test_lengths() {
        assert_eq!(decode(0xEA).len(), 1);
        assert_eq!(decode(0xA9).len(), 2);
        assert_eq!(decode(0xD0).len(), 2);
        assert_eq!(decode(0x6C).len(), 3);
        assert_eq!(decode(0x20).len(), 3);
    }
}
