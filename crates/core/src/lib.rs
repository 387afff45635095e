//! # MOS 6502 Core
//!
//! 6502 命令実行コア: レジスタ、64KB メモリバス、デコードテーブル、
//! アドレッシングモード、割り込み処理。
//!
//! ```
//! use mos6502_core::Cpu;
//!
//! let mut cpu = Cpu::new();
//! // LDA #$64; PHA
//! cpu.load(&[0xA9, 0x64, 0x48], 0x0000).unwrap();
//! cpu.run_instructions(2).unwrap();
//! assert_eq!(cpu.registers().a, 0x64);
//! ```

pub mod addressing;
pub mod bus;
pub mod config;
pub mod cpu;
pub mod error;
pub mod flags;
pub mod interrupt;
pub mod opcodes;
pub mod registers;

pub use addressing::{Mode, Operand};
pub use bus::Bus;
pub use config::CpuConfig;
pub use cpu::{Cpu, RunSummary, StopHandle, StopReason};
pub use error::{EmuError, Result};
pub use flags::{Flag, Status};
pub use interrupt::Interrupt;
pub use opcodes::{decode, Instruction, Mnemonic};
pub use registers::Registers;
