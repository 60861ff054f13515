//! Game Boy system facade, the entry point the embedder drives.
//!
//! Owns the CPU (which in turn owns the memory map and every
//! peripheral collaborator) and exposes power-on, ROM loading,
//! stepping, frame pacing, input forwarding and register/clock
//! introspection. Wall-clock pacing stays with the embedder.

use std::fmt::{self, Display, Formatter};

use crate::{
    consts::{CPU_FREQ, FRAME_T_STATES, LCDC_ADDR},
    cpu::Cpu,
    error::Error,
    mmu::Mmu,
    pad::PadKey,
    rom::{Cartridge, ROM_BANK_SIZE},
    state::StateComponent,
    util::read_file,
};

/// Plain snapshot of the register file, exposed for debugging
/// and embedder introspection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Registers {
    pub pc: u16,
    pub sp: u16,
    pub a: u8,
    pub f: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
}

pub struct GameBoy {
    cpu: Cpu,

    /// T-states accumulated toward the current video frame, reset
    /// every time `frame()` completes one refresh worth of work.
    frame_clock: u32,
}

impl GameBoy {
    /// Base frequency of the emulated system clock, in T-states
    /// per second.
    pub const CPU_FREQ: u32 = CPU_FREQ;

    pub fn new() -> Self {
        Self {
            cpu: Cpu::new(Mmu::new()),
            frame_clock: 0,
        }
    }

    /// Returns the system to its power-on state: all RAM zeroed,
    /// boot overlay enabled, no cartridge inserted.
    pub fn reset(&mut self) {
        self.cpu.mmu().reset();
        self.cpu.reset();
        self.frame_clock = 0;
    }

    /// Skips the boot ROM, placing registers, flags and the LCD
    /// control register in the state the boot program leaves behind
    /// and handing control straight to the cartridge.
    pub fn boot(&mut self) {
        self.cpu.boot();
        self.cpu.mmu().write(LCDC_ADDR, 0x91);
    }

    pub fn load_rom(&mut self, data: &[u8]) -> Result<&Cartridge, Error> {
        self.cpu.mmu().load_cartridge(data)
    }

    pub fn load_rom_file(&mut self, path: &str) -> Result<&Cartridge, Error> {
        let data = read_file(path)?;
        self.load_rom(&data)
    }

    /// Loads a blank 32 KB unbanked cartridge, useful for tests
    /// and benchmarks that only exercise the core.
    pub fn load_rom_empty(&mut self) -> Result<&Cartridge, Error> {
        self.load_rom(&vec![0x00; 2 * ROM_BANK_SIZE])
    }

    /// Installs a replacement 256 byte boot ROM image.
    pub fn load_boot(&mut self, data: &[u8]) -> Result<(), Error> {
        self.cpu.mmu().load_boot(data)
    }

    /// Executes at most one instruction, returning the T-states
    /// elapsed (zero only when the CPU is stopped).
    pub fn step(&mut self) -> u8 {
        let cycles = self.cpu.step();
        self.frame_clock += cycles as u32;
        cycles
    }

    /// Runs steps until one vertical refresh worth of T-states
    /// (70,224) has accumulated, returning the T-states executed.
    pub fn frame(&mut self) -> u32 {
        let start = self.frame_clock;
        while self.frame_clock < FRAME_T_STATES {
            if self.step() == 0 {
                break;
            }
        }
        let elapsed = self.frame_clock - start;
        self.frame_clock = 0;
        elapsed
    }

    /// Runs steps until PC lands on the given address (or the CPU
    /// stops), returning the T-states executed.
    pub fn step_to(&mut self, addr: u16) -> u32 {
        let mut cycles = 0u32;
        while self.cpu.pc() != addr {
            let step_cycles = self.step();
            if step_cycles == 0 {
                break;
            }
            cycles += step_cycles as u32;
        }
        cycles
    }

    pub fn key_press(&mut self, key: PadKey) {
        self.cpu.mmu().key_press(key);
    }

    pub fn key_lift(&mut self, key: PadKey) {
        self.cpu.mmu().key_lift(key);
    }

    pub fn registers(&self) -> Registers {
        Registers {
            pc: self.cpu.pc(),
            sp: self.cpu.sp(),
            a: self.cpu.a,
            f: self.cpu.f(),
            b: self.cpu.b,
            c: self.cpu.c,
            d: self.cpu.d,
            e: self.cpu.e,
            h: self.cpu.h,
            l: self.cpu.l,
        }
    }

    /// The T-state clock, advanced by four on every machine cycle
    /// since power-on.
    pub fn t_clock(&self) -> u64 {
        self.cpu.mmu_i().t_clock()
    }

    /// Captures the register, flag and interrupt latch state of
    /// the CPU into an opaque buffer.
    pub fn snapshot(&self) -> Result<Vec<u8>, Error> {
        self.cpu.state()
    }

    /// Restores CPU state captured by `snapshot()`.
    pub fn restore(&mut self, data: &[u8]) -> Result<(), Error> {
        self.cpu.set_state(data)
    }

    pub fn cpu(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    pub fn cpu_i(&self) -> &Cpu {
        &self.cpu
    }

    pub fn mmu(&mut self) -> &mut Mmu {
        self.cpu.mmu()
    }

    pub fn mmu_i(&self) -> &Mmu {
        self.cpu.mmu_i()
    }

    pub fn rom_i(&self) -> &Cartridge {
        self.cpu.mmu_i().rom_i()
    }
}

impl Default for GameBoy {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for GameBoy {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "GameBoy [{}] {}", self.rom_i(), self.cpu)
    }
}
