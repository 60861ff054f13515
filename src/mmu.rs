//! MMU (Memory Management Unit) functions and structures.
//!
//! Owns the 16-bit address routing, the boot ROM overlay, the
//! interrupt enable/flag registers and the tick bus that keeps
//! every peripheral collaborator in lockstep with the CPU.

use crate::{
    apu::Apu,
    boot::{BOOT_SIZE, DMG_BOOT},
    consts::{
        BOOT_ADDR, IE_ADDR, IF_ADDR, INT_MASK, JOYP_ADDR, SB_ADDR, SC_ADDR,
        T_STATES_PER_M_CYCLE,
    },
    error::Error,
    pad::{Pad, PadKey},
    ppu::Ppu,
    rom::Cartridge,
    serial::Serial,
    timer::Timer,
    warnln,
};

pub const RAM_SIZE: usize = 8192;
pub const HRAM_SIZE: usize = 128;

/// Contract every peripheral collaborator satisfies: memory
/// mapped register access plus a per-machine-cycle `step()`
/// whose return value carries the interrupt request bits to be
/// ORed into IF.
pub trait BusComponent {
    fn read(&self, addr: u16) -> u8;
    fn write(&mut self, addr: u16, value: u8);
    fn step(&mut self) -> u8;
}

pub struct Mmu {
    /// Register that controls the interrupts that are considered
    /// to be enabled, memory mapped at 0xffff.
    ie: u8,

    /// Pending interrupt flags, memory mapped at 0xff0f. Only the
    /// low five bits are meaningful.
    intf: u8,

    /// The display collaborator, owner of VRAM and OAM.
    ppu: Ppu,

    /// The sound collaborator, owner of the audio register range.
    apu: Apu,

    /// The timer and divider collaborator.
    timer: Timer,

    /// The serial link collaborator.
    serial: Serial,

    /// The joypad collaborator.
    pad: Pad,

    /// The cartridge currently inserted into the system, accessed
    /// for ROM and external RAM banks.
    rom: Cartridge,

    /// Flag that controls access to the boot section in the
    /// 0x0000-0x00ff memory area, unset by the write to 0xff50
    /// at the end of the boot sequence.
    boot_active: bool,

    /// The 256 byte boot ROM image overlaid while `boot_active`.
    boot: [u8; BOOT_SIZE],

    /// Work RAM, mapped at 0xc000-0xdfff and echoed through
    /// 0xe000-0xfdff.
    ram: [u8; RAM_SIZE],

    /// High RAM, mapped at 0xff80-0xfffe.
    hram: [u8; HRAM_SIZE],

    /// The T-state clock, advanced by four on every tick.
    t_clock: u64,
}

impl Mmu {
    pub fn new() -> Self {
        Self {
            ie: 0x0,
            intf: 0x0,
            ppu: Ppu::new(),
            apu: Apu::new(),
            timer: Timer::new(),
            serial: Serial::new(),
            pad: Pad::new(),
            rom: Cartridge::new(),
            boot_active: true,
            boot: DMG_BOOT,
            ram: [0x00; RAM_SIZE],
            hram: [0x00; HRAM_SIZE],
            t_clock: 0,
        }
    }

    pub fn reset(&mut self) {
        self.ie = 0x0;
        self.intf = 0x0;
        self.ppu.reset();
        self.apu.reset();
        self.timer.reset();
        self.serial.reset();
        self.pad.reset();
        self.rom = Cartridge::new();
        self.boot_active = true;
        self.boot = DMG_BOOT;
        self.ram = [0x00; RAM_SIZE];
        self.hram = [0x00; HRAM_SIZE];
        self.t_clock = 0;
    }

    /// Advances the system clock by four T-states (one machine
    /// cycle) and steps every peripheral collaborator in a fixed
    /// order, folding the interrupt requests they raise into IF.
    ///
    /// The instruction core calls this exactly once per memory
    /// access and once per internal delay cycle.
    pub fn tick(&mut self) {
        self.t_clock = self.t_clock.wrapping_add(T_STATES_PER_M_CYCLE as u64);
        self.intf |= self.timer.step();
        self.intf |= self.ppu.step();
        self.intf |= self.apu.step();
        self.intf |= self.serial.step();
        self.intf |= self.pad.step();
    }

    /// Interrupts both enabled and pending, the value that drives
    /// HALT release and service dispatch.
    #[inline(always)]
    pub fn pending(&self) -> u8 {
        self.ie & self.intf & INT_MASK
    }

    /// Clears the given interrupt bit, acknowledging that its
    /// service routine has been dispatched.
    #[inline(always)]
    pub fn ack_interrupt(&mut self, bit: u8) {
        self.intf &= !bit;
    }

    /// ORs the given bits into the pending interrupt flags, the
    /// path used by the embedder facing input API.
    #[inline(always)]
    pub fn raise_interrupt(&mut self, bits: u8) {
        self.intf |= bits & INT_MASK;
    }

    pub fn read(&self, addr: u16) -> u8 {
        match addr {
            // 0x0000-0x00FF - Boot ROM overlay (while enabled)
            // 0x0000-0x3FFF - ROM bank 0
            // 0x4000-0x7FFF - ROM bank N
            0x0000..=0x7fff => {
                if self.boot_active && addr < BOOT_SIZE as u16 {
                    return self.boot[addr as usize];
                }
                self.rom.read(addr)
            }

            // 0x8000-0x9FFF - Video RAM
            0x8000..=0x9fff => self.ppu.read(addr),

            // 0xA000-0xBFFF - External (cartridge) RAM
            0xa000..=0xbfff => self.rom.read(addr),

            // 0xC000-0xDFFF - Work RAM
            // 0xE000-0xFDFF - Echo of work RAM
            0xc000..=0xfdff => self.ram[(addr & 0x1fff) as usize],

            // 0xFE00-0xFE9F - Object attribute memory (OAM)
            0xfe00..=0xfe9f => self.ppu.read(addr),

            // 0xFEA0-0xFEFF - Unusable
            0xfea0..=0xfeff => 0x00,

            // 0xFF00 - Joypad input
            JOYP_ADDR => self.pad.read(addr),

            // 0xFF01-0xFF02 - Serial data transfer
            SB_ADDR..=SC_ADDR => self.serial.read(addr),

            // 0xFF04-0xFF07 - Timer and divider
            0xff04..=0xff07 => self.timer.read(addr),

            // 0xFF0F — IF: Interrupt flags, upper three bits read as one
            IF_ADDR => self.intf | 0xe0,

            // 0xFF10-0xFF3F — Audio registers and wave pattern RAM
            0xff10..=0xff3f => self.apu.read(addr),

            // 0xFF40-0xFF45, 0xFF47-0xFF4B - PPU registers
            0xff40..=0xff45 | 0xff47..=0xff4b => self.ppu.read(addr),

            // 0xFF50 - Boot overlay flag
            BOOT_ADDR => u8::from(!self.boot_active),

            // 0xFF80-0xFFFE - High RAM (HRAM)
            0xff80..=0xfffe => self.hram[(addr & 0x7f) as usize],

            // 0xFFFF — IE: Interrupt enable
            IE_ADDR => self.ie,

            addr => {
                warnln!("Reading from unknown location 0x{:04x}", addr);
                0xff
            }
        }
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        match addr {
            // 0x0000-0x7FFF - Cartridge control (bank switching)
            0x0000..=0x7fff => self.rom.write(addr, value),

            // 0x8000-0x9FFF - Video RAM
            0x8000..=0x9fff => self.ppu.write(addr, value),

            // 0xA000-0xBFFF - External (cartridge) RAM
            0xa000..=0xbfff => self.rom.write(addr, value),

            // 0xC000-0xDFFF - Work RAM
            // 0xE000-0xFDFF - Echo of work RAM
            0xc000..=0xfdff => self.ram[(addr & 0x1fff) as usize] = value,

            // 0xFE00-0xFE9F - Object attribute memory (OAM)
            0xfe00..=0xfe9f => self.ppu.write(addr, value),

            // 0xFEA0-0xFEFF - Unusable
            0xfea0..=0xfeff => {}

            // 0xFF00 - Joypad input
            JOYP_ADDR => self.pad.write(addr, value),

            // 0xFF01-0xFF02 - Serial data transfer
            SB_ADDR..=SC_ADDR => self.serial.write(addr, value),

            // 0xFF04-0xFF07 - Timer and divider
            0xff04..=0xff07 => self.timer.write(addr, value),

            // 0xFF0F — IF: Interrupt flags
            IF_ADDR => self.intf = value & INT_MASK,

            // 0xFF10-0xFF3F — Audio registers and wave pattern RAM
            0xff10..=0xff3f => self.apu.write(addr, value),

            // 0xFF40-0xFF45, 0xFF47-0xFF4B - PPU registers
            0xff40..=0xff45 | 0xff47..=0xff4b => self.ppu.write(addr, value),

            // 0xFF50 - any write removes the boot overlay for good
            BOOT_ADDR => self.boot_active = false,

            // 0xFF80-0xFFFE - High RAM (HRAM)
            0xff80..=0xfffe => self.hram[(addr & 0x7f) as usize] = value,

            // 0xFFFF — IE: Interrupt enable
            IE_ADDR => self.ie = value,

            addr => warnln!("Writing to unknown location 0x{:04x}", addr),
        }
    }

    pub fn load_cartridge(&mut self, data: &[u8]) -> Result<&Cartridge, Error> {
        self.rom = Cartridge::from_data(data)?;
        Ok(&self.rom)
    }

    pub fn load_boot(&mut self, data: &[u8]) -> Result<(), Error> {
        if data.len() != BOOT_SIZE {
            return Err(Error::InvalidBootRomLength(data.len()));
        }
        self.boot.copy_from_slice(data);
        Ok(())
    }

    pub fn key_press(&mut self, key: PadKey) {
        self.pad.key_press(key);
    }

    pub fn key_lift(&mut self, key: PadKey) {
        self.pad.key_lift(key);
    }

    #[inline(always)]
    pub fn t_clock(&self) -> u64 {
        self.t_clock
    }

    #[inline(always)]
    pub fn ie(&self) -> u8 {
        self.ie
    }

    #[inline(always)]
    pub fn intf(&self) -> u8 {
        self.intf
    }

    #[inline(always)]
    pub fn boot_active(&self) -> bool {
        self.boot_active
    }

    pub fn set_boot_active(&mut self, value: bool) {
        self.boot_active = value;
    }

    pub fn ppu(&mut self) -> &mut Ppu {
        &mut self.ppu
    }

    pub fn ppu_i(&self) -> &Ppu {
        &self.ppu
    }

    pub fn apu(&mut self) -> &mut Apu {
        &mut self.apu
    }

    pub fn apu_i(&self) -> &Apu {
        &self.apu
    }

    pub fn timer(&mut self) -> &mut Timer {
        &mut self.timer
    }

    pub fn timer_i(&self) -> &Timer {
        &self.timer
    }

    pub fn serial(&mut self) -> &mut Serial {
        &mut self.serial
    }

    pub fn serial_i(&self) -> &Serial {
        &self.serial
    }

    pub fn pad(&mut self) -> &mut Pad {
        &mut self.pad
    }

    pub fn pad_i(&self) -> &Pad {
        &self.pad
    }

    pub fn rom(&mut self) -> &mut Cartridge {
        &mut self.rom
    }

    pub fn rom_i(&self) -> &Cartridge {
        &self.rom
    }
}

impl Default for Mmu {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use crate::consts::{BOOT_ADDR, IE_ADDR, IF_ADDR, INT_TIMER, INT_VBLANK};

    use super::Mmu;

    #[test]
    fn test_ram_round_trip() {
        let mut mmu = Mmu::new();
        mmu.write(0xc000, 0x12);
        assert_eq!(mmu.read(0xc000), 0x12);
        mmu.write(0xdfff, 0x34);
        assert_eq!(mmu.read(0xdfff), 0x34);
        mmu.write(0xff80, 0x56);
        assert_eq!(mmu.read(0xff80), 0x56);
        mmu.write(0xfffe, 0x78);
        assert_eq!(mmu.read(0xfffe), 0x78);
    }

    #[test]
    fn test_echo_ram() {
        let mut mmu = Mmu::new();
        mmu.write(0xc123, 0xab);
        assert_eq!(mmu.read(0xe123), 0xab);
        mmu.write(0xfdff, 0xcd);
        assert_eq!(mmu.read(0xddff), 0xcd);
    }

    #[test]
    fn test_unusable_range() {
        let mut mmu = Mmu::new();
        mmu.write(0xfea0, 0xff);
        assert_eq!(mmu.read(0xfea0), 0x00);
        assert_eq!(mmu.read(0xfeff), 0x00);
    }

    #[test]
    fn test_interrupt_registers() {
        let mut mmu = Mmu::new();
        mmu.write(IF_ADDR, 0xff);
        // only five flag bits stick, the upper three read as one
        assert_eq!(mmu.read(IF_ADDR), 0xff);
        mmu.write(IF_ADDR, 0x00);
        assert_eq!(mmu.read(IF_ADDR), 0xe0);

        mmu.write(IE_ADDR, 0x15);
        assert_eq!(mmu.read(IE_ADDR), 0x15);

        mmu.raise_interrupt(INT_VBLANK | INT_TIMER);
        assert_eq!(mmu.pending(), INT_VBLANK | INT_TIMER);
        mmu.ack_interrupt(INT_VBLANK);
        assert_eq!(mmu.pending(), INT_TIMER);
    }

    #[test]
    fn test_boot_overlay() {
        let mut mmu = Mmu::new();
        assert!(mmu.boot_active());
        // first boot ROM byte is LD SP,d16
        assert_eq!(mmu.read(0x0000), 0x31);
        assert_eq!(mmu.read(BOOT_ADDR), 0x00);

        mmu.write(BOOT_ADDR, 0x01);
        assert!(!mmu.boot_active());
        assert_eq!(mmu.read(BOOT_ADDR), 0x01);
        // with no cartridge loaded the underlying byte reads open bus
        assert_eq!(mmu.read(0x0000), 0xff);
    }

    #[test]
    fn test_tick_advances_clock() {
        let mut mmu = Mmu::new();
        assert_eq!(mmu.t_clock(), 0);
        mmu.tick();
        mmu.tick();
        assert_eq!(mmu.t_clock(), 8);
    }
}
