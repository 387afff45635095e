//! エラー型の定義

use thiserror::Error;

/// 6502コアのエラー型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EmuError {
    /// Opcode outside the documented instruction set, met while the engine
    /// runs in strict mode. `address` is where the opcode byte was fetched.
    #[error("Unknown opcode {opcode:#04x} at ${address:04X}")]
    UnknownOpcode { opcode: u8, address: u16 },

    /// `load()` span runs past the end of the 64 KiB address space.
    #[error("Invalid load address: {len} bytes at ${start:04X} exceed the address space")]
    InvalidLoadAddress { start: u16, len: usize },
}

/// Result型のエイリアス
pub type Result<T> = std::result::Result<T, EmuError>;
