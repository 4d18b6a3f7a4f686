//! IR protocol identifiers
//!
//! Transmitted as a single byte in the first command step.

use std::fmt;
use std::str::FromStr;

use crate::error::LinkError;

/// IR protocol understood by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ProtocolCode {
    Unknown = 0,
    Nec = 1,
    Sony = 2,
    NecX = 7,
}

impl ProtocolCode {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl From<ProtocolCode> for u8 {
    fn from(code: ProtocolCode) -> u8 {
        code as u8
    }
}

impl TryFrom<u8> for ProtocolCode {
    type Error = LinkError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            0 => Ok(ProtocolCode::Unknown),
            1 => Ok(ProtocolCode::Nec),
            2 => Ok(ProtocolCode::Sony),
            7 => Ok(ProtocolCode::NecX),
            _ => Err(LinkError::Config(format!(
                "Unknown protocol code: 0x{:02x}",
                byte
            ))),
        }
    }
}

impl FromStr for ProtocolCode {
    type Err = LinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unknown" => Ok(ProtocolCode::Unknown),
            "nec" => Ok(ProtocolCode::Nec),
            "sony" => Ok(ProtocolCode::Sony),
            "necx" => Ok(ProtocolCode::NecX),
            other => Err(LinkError::Config(format!("Unknown protocol: {}", other))),
        }
    }
}

impl fmt::Display for ProtocolCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProtocolCode::Unknown => "UNKNOWN",
            ProtocolCode::Nec => "NEC",
            ProtocolCode::Sony => "SONY",
            ProtocolCode::NecX => "NECX",
        };
        f.write_str(name)
    }
}
