use log::{debug, LevelFilter};
use mos6502_core::Cpu;

#[allow(unused)]
pub fn init() {
    let _ = env_logger::builder()
        .filter(None, LevelFilter::Debug)
        .is_test(true)
        .try_init();
    debug!("Logger initialized")
}

/// CPU with `program` loaded at `origin` and PC pointing at it.
#[allow(unused)]
pub fn cpu_with_program(program: &[u8], origin: u16) -> Cpu {
    let mut cpu = Cpu::new();
    cpu.load(program, origin).expect("Loading program");
    cpu.registers_mut().pc = origin;
    cpu
}
