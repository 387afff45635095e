//! # 6502 Execution Engine
//!
//! Fetch, decode, resolve, execute, account. Interrupts are only looked at
//! between instructions, and an instruction is never split: a `step()` either
//! completes or, for an undefined opcode in strict mode, returns an error
//! before touching registers or memory.

use crate::addressing::{self, Operand};
use crate::bus::Bus;
use crate::config::CpuConfig;
use crate::error::{EmuError, Result};
use crate::flags::{Flag, Status};
use crate::interrupt::{Interrupt, InterruptController};
use crate::opcodes::{self, Instruction, Mnemonic};
use crate::registers::Registers;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

const INTERRUPT_CYCLES: u32 = 7;
const RESET_CYCLES: u32 = 7;
const UNDEFINED_NOP_CYCLES: u32 = 2;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StopReason {
    BudgetExhausted,
    StopRequested,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    pub reason: StopReason,
}

/// Shared stop request. `Cpu::run` checks it between instructions and clears
/// it when it stops. Clones may be handed to another thread or captured by a
/// device handler.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct Cpu {
    pub bus: Bus,
    regs: Registers,
    config: CpuConfig,
    interrupts: InterruptController,
    cycles: u64,
    stop: StopHandle,
}

impl Cpu {
    pub fn new() -> Self {
        Self::with_config(CpuConfig::default())
    }

    pub fn with_config(config: CpuConfig) -> Self {
        Cpu {
            bus: Bus::new(),
            regs: Registers {
                sp: config.reset_sp,
                status: Status::from_bits(Flag::IrqDisable as u8),
                ..Registers::default()
            },
            config,
            interrupts: InterruptController::new(),
            cycles: 0,
            stop: StopHandle::default(),
        }
    }

    pub fn config(&self) -> &CpuConfig {
        &self.config
    }

    pub fn registers(&self) -> &Registers {
        &self.regs
    }

    pub fn registers_mut(&mut self) -> &mut Registers {
        &mut self.regs
    }

    pub fn pc(&self) -> u16 {
        self.regs.pc
    }

    pub fn sp(&self) -> u8 {
        self.regs.sp
    }

    pub fn status(&self) -> Status {
        self.regs.status
    }

    /// Total cycles consumed since construction, resets included.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn load(&mut self, data: &[u8], start: u16) -> Result<()> {
        self.bus.load(data, start)
    }

    pub fn map_region<R, W>(&mut self, start: u16, end: u16, read: R, write: W)
    where
        R: FnMut(u16) -> u8 + Send + 'static,
        W: FnMut(u16, u8) + Send + 'static,
    {
        self.bus.map_region(start, end, read, write);
    }

    pub fn set_nmi_line(&mut self, asserted: bool) {
        self.interrupts.set_nmi_line(asserted);
    }

    pub fn trigger_nmi(&mut self) {
        self.interrupts.trigger_nmi();
    }

    pub fn set_irq_line(&mut self, asserted: bool) {
        self.interrupts.set_irq_line(asserted);
    }

    pub fn nmi_pending(&self) -> bool {
        self.interrupts.nmi_pending()
    }

    pub fn irq_line(&self) -> bool {
        self.interrupts.irq_line()
    }

    pub fn reset(&mut self) {
        self.regs.a = 0;
        self.regs.x = 0;
        self.regs.y = 0;
        self.regs.sp = self.config.reset_sp;
        self.regs.status = Status::from_bits(Flag::IrqDisable as u8);
        self.regs.pc = self.bus.read_word(Interrupt::Reset.vector());
        self.interrupts.clear();
        self.cycles += RESET_CYCLES as u64;
        log::debug!("Reset: PC=${:04X} SP=${:02X}", self.regs.pc, self.regs.sp);
    }

    /// Executes one instruction, or services one pending interrupt, and
    /// returns the cycles it took.
    pub fn step(&mut self) -> Result<u32> {
        if let Some(kind) = self.interrupts.poll(self.regs.status.irq_disabled()) {
            self.interrupt(kind);
            self.cycles += INTERRUPT_CYCLES as u64;
            return Ok(INTERRUPT_CYCLES);
        }

        let pc = self.regs.pc;
        let opcode = self.bus.read_byte(pc);
        let instruction = opcodes::decode(opcode);
        if !instruction.is_defined() {
            return self.undefined_opcode(opcode, pc);
        }

        log::trace!("${:04X}: {:02X} {}", pc, opcode, instruction.mnemonic);

        self.regs.advance_pc(1);
        let operand = addressing::resolve(instruction.mode, &self.regs, &mut self.bus);
        self.regs.advance_pc(instruction.mode.operand_len());

        let mut cycles = instruction.cycles as u32 + self.execute(&instruction, operand);
        if instruction.page_penalty && operand.page_crossed && !instruction.mnemonic.is_branch() {
            cycles += 1;
        }

        self.cycles += cycles as u64;
        Ok(cycles)
    }

    /// Steps until `budget` cycles have been consumed by this call or a stop
    /// is requested. The last instruction may run past the budget. A stop
    /// requested during that last instruction is reported by this call, not
    /// carried into the next one.
    pub fn run(&mut self, budget: u64) -> Result<RunSummary> {
        let mut consumed = 0u64;
        loop {
            if self.stop.take() {
                log::info!("Stop requested at ${:04X} after {} cycles", self.regs.pc, consumed);
                return Ok(RunSummary {
                    cycles: consumed,
                    reason: StopReason::StopRequested,
                });
            }
            if consumed >= budget {
                return Ok(RunSummary {
                    cycles: consumed,
                    reason: StopReason::BudgetExhausted,
                });
            }
            consumed += self.step()? as u64;
        }
    }

    /// Executes `count` steps and returns the cycles they took.
    pub fn run_instructions(&mut self, count: usize) -> Result<u64> {
        let mut consumed = 0u64;
        for _ in 0..count {
            consumed += self.step()? as u64;
        }
        Ok(consumed)
    }

    pub fn push_byte(&mut self, value: u8) {
        let address = self.regs.stack_address();
        self.bus.write_byte(address, value);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
    }

    pub fn pull_byte(&mut self) -> u8 {
        self.regs.sp = self.regs.sp.wrapping_add(1);
        let address = self.regs.stack_address();
        self.bus.read_byte(address)
    }

    fn push_word(&mut self, value: u16) {
        self.push_byte((value >> 8) as u8);
        self.push_byte(value as u8);
    }

    fn pull_word(&mut self) -> u16 {
        let lo = self.pull_byte() as u16;
        let hi = self.pull_byte() as u16;
        (hi << 8) | lo
    }

    fn undefined_opcode(&mut self, opcode: u8, address: u16) -> Result<u32> {
        if self.config.strict {
            return Err(EmuError::UnknownOpcode { opcode, address });
        }

        log::warn!("Undefined opcode 0x{:02X} at ${:04X}, treating as NOP", opcode, address);
        self.regs.advance_pc(1);
        self.cycles += UNDEFINED_NOP_CYCLES as u64;
        Ok(UNDEFINED_NOP_CYCLES)
    }

    fn interrupt(&mut self, kind: Interrupt) {
        log::debug!("Servicing {:?} from ${:04X}", kind, self.regs.pc);
        self.push_word(self.regs.pc);
        let status = self.regs.status.pushed(kind == Interrupt::Break);
        self.push_byte(status);
        self.regs.status.set(Flag::IrqDisable, true);
        self.regs.pc = self.bus.read_word(kind.vector());
    }

    /// Runs the operation and returns any cycles beyond the table's base
    /// count that depend on the outcome (taken branches).
    fn execute(&mut self, instruction: &Instruction, operand: Operand) -> u32 {
        let status = self.regs.status;
        match instruction.mnemonic {
            // Loads and stores
            Mnemonic::Lda => self.regs.a = self.load_register(operand),
            Mnemonic::Ldx => self.regs.x = self.load_register(operand),
            Mnemonic::Ldy => self.regs.y = self.load_register(operand),
            Mnemonic::Sta => self.store(operand, self.regs.a),
            Mnemonic::Stx => self.store(operand, self.regs.x),
            Mnemonic::Sty => self.store(operand, self.regs.y),

            // Arithmetic
            Mnemonic::Adc => {
                let value = self.read_operand(operand);
                self.add_with_carry(value);
            }
            Mnemonic::Sbc => {
                let value = self.read_operand(operand);
                self.subtract_with_carry(value);
            }

            // Comparisons
            Mnemonic::Cmp => self.compare(operand, self.regs.a),
            Mnemonic::Cpx => self.compare(operand, self.regs.x),
            Mnemonic::Cpy => self.compare(operand, self.regs.y),

            // Bitwise operations
            Mnemonic::And => self.logical(operand, |a, m| a & m),
            Mnemonic::Ora => self.logical(operand, |a, m| a | m),
            Mnemonic::Eor => self.logical(operand, |a, m| a ^ m),
            Mnemonic::Bit => {
                let value = self.read_operand(operand);
                self.regs.status.update_bit(self.regs.a, value);
            }

            // Shifts and rotates
            Mnemonic::Asl => self.shift(operand, |value, _| (value << 1, value & 0x80 != 0)),
            Mnemonic::Lsr => self.shift(operand, |value, _| (value >> 1, value & 0x01 != 0)),
            Mnemonic::Rol => self.shift(operand, |value, carry| {
                ((value << 1) | carry as u8, value & 0x80 != 0)
            }),
            Mnemonic::Ror => self.shift(operand, |value, carry| {
                ((value >> 1) | (carry as u8) << 7, value & 0x01 != 0)
            }),

            // Increments and decrements
            Mnemonic::Inc => self.modify(operand, |value| value.wrapping_add(1)),
            Mnemonic::Dec => self.modify(operand, |value| value.wrapping_sub(1)),
            Mnemonic::Inx => self.regs.x = self.transfer(self.regs.x.wrapping_add(1)),
            Mnemonic::Dex => self.regs.x = self.transfer(self.regs.x.wrapping_sub(1)),
            Mnemonic::Iny => self.regs.y = self.transfer(self.regs.y.wrapping_add(1)),
            Mnemonic::Dey => self.regs.y = self.transfer(self.regs.y.wrapping_sub(1)),

            // Register moves
            Mnemonic::Tax => self.regs.x = self.transfer(self.regs.a),
            Mnemonic::Tay => self.regs.y = self.transfer(self.regs.a),
            Mnemonic::Txa => self.regs.a = self.transfer(self.regs.x),
            Mnemonic::Tya => self.regs.a = self.transfer(self.regs.y),
            Mnemonic::Tsx => self.regs.x = self.transfer(self.regs.sp),
            Mnemonic::Txs => self.regs.sp = self.regs.x,

            // Flag operations
            Mnemonic::Clc => self.regs.status.set(Flag::Carry, false),
            Mnemonic::Sec => self.regs.status.set(Flag::Carry, true),
            Mnemonic::Cli => self.regs.status.set(Flag::IrqDisable, false),
            Mnemonic::Sei => self.regs.status.set(Flag::IrqDisable, true),
            Mnemonic::Clv => self.regs.status.set(Flag::Overflow, false),
            Mnemonic::Cld => self.regs.status.set(Flag::Decimal, false),
            Mnemonic::Sed => self.regs.status.set(Flag::Decimal, true),

            // Branches
            Mnemonic::Bpl => return self.branch(!status.negative(), operand),
            Mnemonic::Bmi => return self.branch(status.negative(), operand),
            Mnemonic::Bvc => return self.branch(!status.overflow(), operand),
            Mnemonic::Bvs => return self.branch(status.overflow(), operand),
            Mnemonic::Bcc => return self.branch(!status.carry(), operand),
            Mnemonic::Bcs => return self.branch(status.carry(), operand),
            Mnemonic::Bne => return self.branch(!status.zero(), operand),
            Mnemonic::Beq => return self.branch(status.zero(), operand),

            // Jumps
            Mnemonic::Jmp => self.jump(operand),

            // Procedure calls
            Mnemonic::Jsr => {
                let return_address = self.regs.pc.wrapping_sub(1);
                self.push_word(return_address);
                self.jump(operand);
            }
            Mnemonic::Rts => self.regs.pc = self.pull_word().wrapping_add(1),
            Mnemonic::Brk => {
                // BRK skips a padding byte
                self.regs.advance_pc(1);
                self.interrupt(Interrupt::Break);
            }
            Mnemonic::Rti => {
                self.regs.status = Status::from_bits(self.pull_byte());
                self.regs.pc = self.pull_word();
            }

            // Stack operations
            Mnemonic::Pha => self.push_byte(self.regs.a),
            Mnemonic::Pla => {
                let value = self.pull_byte();
                self.regs.a = self.transfer(value);
            }
            Mnemonic::Php => self.push_byte(self.regs.status.pushed(true)),
            Mnemonic::Plp => self.regs.status = Status::from_bits(self.pull_byte()),

            Mnemonic::Nop | Mnemonic::Undefined => {}
        }
        0
    }

    /// Operand value; `None` is the accumulator.
    fn read_operand(&mut self, operand: Operand) -> u8 {
        match operand.address {
            Some(address) => self.bus.read_byte(address),
            None => self.regs.a,
        }
    }

    fn write_operand(&mut self, operand: Operand, value: u8) {
        match operand.address {
            Some(address) => self.bus.write_byte(address, value),
            None => self.regs.a = value,
        }
    }

    fn load_register(&mut self, operand: Operand) -> u8 {
        let value = self.read_operand(operand);
        self.regs.status.update_zero_negative(value);
        value
    }

    fn store(&mut self, operand: Operand, value: u8) {
        if let Some(address) = operand.address {
            self.bus.write_byte(address, value);
        }
    }

    fn transfer(&mut self, value: u8) -> u8 {
        self.regs.status.update_zero_negative(value);
        value
    }

    fn compare(&mut self, operand: Operand, register: u8) {
        let value = self.read_operand(operand);
        self.regs.status.update_compare(register, value);
    }

    fn logical(&mut self, operand: Operand, op: fn(u8, u8) -> u8) {
        let value = self.read_operand(operand);
        let result = op(self.regs.a, value);
        self.regs.status.update_zero_negative(result);
        self.regs.a = result;
    }

    /// Shift or rotate in place. `op` gets the value and the incoming carry and
    /// returns the result and the bit shifted out.
    fn shift(&mut self, operand: Operand, op: fn(u8, bool) -> (u8, bool)) {
        let value = self.read_operand(operand);
        let (result, carry_out) = op(value, self.regs.status.carry());
        self.regs.status.update_shift(result, carry_out);
        self.write_operand(operand, result);
    }

    fn modify(&mut self, operand: Operand, op: fn(u8) -> u8) {
        let result = op(self.read_operand(operand));
        self.regs.status.update_zero_negative(result);
        self.write_operand(operand, result);
    }

    fn jump(&mut self, operand: Operand) {
        if let Some(target) = operand.address {
            self.regs.pc = target;
        }
    }

    fn branch(&mut self, condition: bool, operand: Operand) -> u32 {
        match operand.address {
            Some(target) if condition => {
                self.regs.pc = target;
                1 + operand.page_crossed as u32
            }
            _ => 0,
        }
    }

    fn add_with_carry(&mut self, value: u8) {
        if self.decimal_active() {
            self.add_decimal(value);
        } else {
            self.add_binary(value);
        }
    }

    fn subtract_with_carry(&mut self, value: u8) {
        if self.decimal_active() {
            self.subtract_decimal(value);
        } else {
            // A - M - !C == A + !M + C
            self.add_binary(!value);
        }
    }

    fn decimal_active(&self) -> bool {
        self.config.decimal_mode && self.regs.status.decimal()
    }

    fn add_binary(&mut self, value: u8) {
        let a = self.regs.a;
        let sum = a as u16 + value as u16 + self.regs.status.carry() as u16;
        self.regs.status.update_add(a, value, sum);
        self.regs.a = sum as u8;
    }

    /// NMOS BCD add: Z follows the binary sum, N and V the intermediate high
    /// digit, C the decimal carry.
    fn add_decimal(&mut self, value: u8) {
        let a = self.regs.a;
        let carry = self.regs.status.carry() as u8;

        let mut lo = (a & 0x0F) + (value & 0x0F) + carry;
        if lo > 9 {
            lo += 6;
        }
        let mut hi = (a >> 4) + (value >> 4) + (lo > 0x0F) as u8;

        let binary = (a as u16 + value as u16 + carry as u16) as u8;
        let status = &mut self.regs.status;
        status.set(Flag::Zero, binary == 0);
        status.set(Flag::Negative, hi & 0x08 != 0);
        status.set(
            Flag::Overflow,
            (a ^ (hi << 4)) & (value ^ (hi << 4)) & 0x80 != 0,
        );

        if hi > 9 {
            hi += 6;
        }
        status.set(Flag::Carry, hi > 0x0F);
        self.regs.a = (hi << 4) | (lo & 0x0F);
    }

    /// NMOS BCD subtract: all flags follow the binary difference.
    fn subtract_decimal(&mut self, value: u8) {
        let a = self.regs.a;
        let borrow = !self.regs.status.carry() as i16;

        let binary = a as i16 - value as i16 - borrow;
        let status = &mut self.regs.status;
        status.set(Flag::Carry, binary >= 0);
        status.set(Flag::Zero, binary as u8 == 0);
        status.set(Flag::Negative, binary & 0x80 != 0);
        status.set(
            Flag::Overflow,
            (a as i16 ^ binary) & (a as i16 ^ value as i16) & 0x80 != 0,
        );

        let mut lo = (a & 0x0F) as i16 - (value & 0x0F) as i16 - borrow;
        let mut hi = (a >> 4) as i16 - (value >> 4) as i16;
        if lo < 0 {
            lo -= 6;
            hi -= 1;
        }
        if hi < 0 {
            hi -= 6;
        }
        self.regs.a = ((hi << 4) as u8) | (lo as u8 & 0x0F);
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}
