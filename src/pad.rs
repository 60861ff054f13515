//! Joypad input functions and structures.

use crate::{
    consts::{INT_JOYPAD, JOYP_ADDR},
    mmu::BusComponent,
    warnln,
};

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum PadSelection {
    Action,
    Direction,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PadKey {
    Up,
    Down,
    Left,
    Right,
    Start,
    Select,
    A,
    B,
}

pub struct Pad {
    down: bool,
    up: bool,
    left: bool,
    right: bool,
    start: bool,
    select: bool,
    b: bool,
    a: bool,
    selection: PadSelection,
    int_pending: u8,
}

impl Pad {
    pub fn new() -> Self {
        Self {
            down: false,
            up: false,
            left: false,
            right: false,
            start: false,
            select: false,
            b: false,
            a: false,
            selection: PadSelection::Action,
            int_pending: 0x0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Forwards the joypad interrupt raised by the most recent
    /// key press, if any. The matrix itself is level based and
    /// needs no per-cycle work.
    pub fn step(&mut self) -> u8 {
        let irqs = self.int_pending;
        self.int_pending = 0x0;
        irqs
    }

    pub fn read(&self, addr: u16) -> u8 {
        match addr {
            JOYP_ADDR => {
                let mut value = match self.selection {
                    PadSelection::Action => {
                        (if self.a { 0x00 } else { 0x01 })
                            | (if self.b { 0x00 } else { 0x02 })
                            | (if self.select { 0x00 } else { 0x04 })
                            | (if self.start { 0x00 } else { 0x08 })
                    }
                    PadSelection::Direction => {
                        (if self.right { 0x00 } else { 0x01 })
                            | (if self.left { 0x00 } else { 0x02 })
                            | (if self.up { 0x00 } else { 0x04 })
                            | (if self.down { 0x00 } else { 0x08 })
                    }
                };
                value |= match self.selection {
                    PadSelection::Action => 0x10,
                    PadSelection::Direction => 0x20,
                };
                value | 0xc0
            }
            _ => {
                warnln!("Reading from unknown Pad location 0x{:04x}", addr);
                0xff
            }
        }
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        match addr {
            JOYP_ADDR => {
                self.selection = if value & 0x10 == 0x00 {
                    PadSelection::Direction
                } else {
                    PadSelection::Action
                }
            }
            _ => warnln!("Writing to unknown Pad location 0x{:04x}", addr),
        }
    }

    pub fn key_press(&mut self, key: PadKey) {
        match key {
            PadKey::Up => self.up = true,
            PadKey::Down => self.down = true,
            PadKey::Left => self.left = true,
            PadKey::Right => self.right = true,
            PadKey::Start => self.start = true,
            PadKey::Select => self.select = true,
            PadKey::A => self.a = true,
            PadKey::B => self.b = true,
        }
        self.int_pending = INT_JOYPAD;
    }

    pub fn key_lift(&mut self, key: PadKey) {
        match key {
            PadKey::Up => self.up = false,
            PadKey::Down => self.down = false,
            PadKey::Left => self.left = false,
            PadKey::Right => self.right = false,
            PadKey::Start => self.start = false,
            PadKey::Select => self.select = false,
            PadKey::A => self.a = false,
            PadKey::B => self.b = false,
        }
    }
}

impl BusComponent for Pad {
    fn read(&self, addr: u16) -> u8 {
        self.read(addr)
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.write(addr, value);
    }

    fn step(&mut self) -> u8 {
        self.step()
    }
}

impl Default for Pad {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use crate::consts::{INT_JOYPAD, JOYP_ADDR};

    use super::{Pad, PadKey};

    #[test]
    fn test_matrix_read() {
        let mut pad = Pad::new();
        // direction keys selected, all released
        pad.write(JOYP_ADDR, 0x20);
        assert_eq!(pad.read(JOYP_ADDR) & 0x0f, 0x0f);

        pad.key_press(PadKey::Left);
        assert_eq!(pad.read(JOYP_ADDR) & 0x0f, 0x0d);

        // the action group must not see the direction press
        pad.write(JOYP_ADDR, 0x10);
        assert_eq!(pad.read(JOYP_ADDR) & 0x0f, 0x0f);

        pad.write(JOYP_ADDR, 0x20);
        pad.key_lift(PadKey::Left);
        assert_eq!(pad.read(JOYP_ADDR) & 0x0f, 0x0f);
    }

    #[test]
    fn test_press_interrupt() {
        let mut pad = Pad::new();
        assert_eq!(pad.step(), 0x0);
        pad.key_press(PadKey::A);
        assert_eq!(pad.step(), INT_JOYPAD);
        assert_eq!(pad.step(), 0x0);
    }
}
