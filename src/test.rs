//! Reusable building blocks for tests and benchmarks.

use crate::{
    gb::GameBoy,
    rom::{RomType, ROM_BANK_SIZE},
};

#[derive(Default)]
pub struct TestOptions {
    /// Runs the built-in boot ROM from reset instead of fast
    /// forwarding to the post-boot state.
    pub boot_rom: bool,
}

/// Builds a ready-to-run system, with the boot sequence already
/// skipped unless the options ask for it.
pub fn build_test(options: TestOptions) -> GameBoy {
    let mut game_boy = GameBoy::new();
    if !options.boot_rom {
        game_boy.boot();
    }
    game_boy
}

/// Builds a 32 KB unbanked cartridge image with the given code
/// placed at the entry point (0x0100).
pub fn build_test_rom(code: &[u8]) -> Vec<u8> {
    let mut data = vec![0x00; 2 * ROM_BANK_SIZE];
    data[0x0147] = RomType::RomOnly as u8;
    data[0x0100..0x0100 + code.len()].copy_from_slice(code);
    data
}

/// Writes the program into work RAM at 0xc000, points PC at it
/// and executes one step per instruction, returning the T-states
/// consumed.
pub fn run_program(game_boy: &mut GameBoy, program: &[u8], steps: usize) -> u32 {
    for (index, byte) in program.iter().enumerate() {
        game_boy.mmu().write(0xc000 + index as u16, *byte);
    }
    game_boy.cpu().set_pc(0xc000);
    let mut cycles = 0u32;
    for _ in 0..steps {
        cycles += game_boy.step() as u32;
    }
    cycles
}

#[cfg(test)]
mod tests {
    use super::{build_test, build_test_rom, run_program, TestOptions};

    #[test]
    fn test_run_program() {
        let mut game_boy = build_test(TestOptions::default());
        game_boy.load_rom(&build_test_rom(&[])).unwrap();

        // LD A,0x07; LD B,0x03; ADD A,B
        let cycles = run_program(&mut game_boy, &[0x3e, 0x07, 0x06, 0x03, 0x80], 3);
        assert_eq!(cycles, 20);
        assert_eq!(game_boy.registers().a, 0x0a);
    }
}
