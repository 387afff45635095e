//! # CPU Configuration

use serde::{Deserialize, Serialize};

/// Engine settings. Missing fields take their defaults when deserialised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuConfig {
    /// Fail `step()` with `UnknownOpcode` on undocumented opcodes. When off,
    /// they execute as a one-byte, two-cycle NOP.
    pub strict: bool,
    /// Honour the D flag in ADC/SBC. Disable for 2A03-style cores.
    pub decimal_mode: bool,
    /// SP installed by `reset()`.
    pub reset_sp: u8,
}

impl Default for CpuConfig {
    fn default() -> Self {
        CpuConfig {
            strict: true,
            decimal_mode: true,
            reset_sp: 0xFD,
        }
    }
}
