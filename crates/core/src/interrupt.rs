//! # Interrupt Controller
//!
//! NMI is edge-latched: a rising edge on the line queues exactly one service.
//! IRQ is level-sensitive: it is serviced every time it is polled while the
//! line is asserted and the I flag is clear.

pub const NMI_VECTOR: u16 = 0xFFFA;
pub const RESET_VECTOR: u16 = 0xFFFC;
pub const IRQ_VECTOR: u16 = 0xFFFE;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Interrupt {
    Nmi,
    Reset,
    Irq,
    Break,
}

impl Interrupt {
    pub fn vector(self) -> u16 {
        match self {
            Interrupt::Nmi => NMI_VECTOR,
            Interrupt::Reset => RESET_VECTOR,
            Interrupt::Irq | Interrupt::Break => IRQ_VECTOR,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InterruptController {
    nmi_line: bool,
    nmi_pending: bool,
    irq_line: bool,
}

impl InterruptController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_nmi_line(&mut self, asserted: bool) {
        if asserted && !self.nmi_line {
            self.nmi_pending = true;
        }
        self.nmi_line = asserted;
    }

    /// Latches one NMI regardless of the line state.
    pub fn trigger_nmi(&mut self) {
        self.nmi_pending = true;
    }

    pub fn set_irq_line(&mut self, asserted: bool) {
        self.irq_line = asserted;
    }

    pub fn nmi_pending(&self) -> bool {
        self.nmi_pending
    }

    pub fn irq_line(&self) -> bool {
        self.irq_line
    }

    /// Interrupt to service before the next instruction, if any. Taking an
    /// NMI clears its latch.
    pub fn poll(&mut self, irq_disabled: bool) -> Option<Interrupt> {
        if self.nmi_pending {
            self.nmi_pending = false;
            Some(Interrupt::Nmi)
        } else if self.irq_line && !irq_disabled {
            Some(Interrupt::Irq)
        } else {
            None
        }
    }

    /// Drops pending requests. The NMI line level is kept so a line that is
    /// still held high does not fire again.
    pub fn clear(&mut self) {
        self.nmi_pending = false;
        self.irq_line = false;
    }
}
