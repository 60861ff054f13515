//! Error related data structures.

use std::{
    fmt::{self, Display, Formatter},
    io,
};

/// Top level enum for error handling within dotmatrix.
///
/// All errors are reported at load or snapshot boundaries, the
/// instruction execution hot path is infallible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    InvalidRomLength(usize),
    UnsupportedMbc(u8),
    InvalidBootRomLength(usize),
    InvalidData,
    InvalidParameter(String),
    CustomError(String),
}

impl Error {
    pub fn description(&self) -> String {
        match self {
            Error::InvalidRomLength(size) => {
                format!("ROM size {} is not a multiple of 16 KiB", size)
            }
            Error::UnsupportedMbc(rom_type) => {
                format!("Unsupported MBC for cartridge type 0x{:02x}", rom_type)
            }
            Error::InvalidBootRomLength(size) => {
                format!("Boot ROM size {} is not 256 bytes", size)
            }
            Error::InvalidData => String::from("Invalid data format"),
            Error::InvalidParameter(message) => format!("Invalid parameter: {}", message),
            Error::CustomError(message) => String::from(message),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Error::CustomError(error.to_string())
    }
}
