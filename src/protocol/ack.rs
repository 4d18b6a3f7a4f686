//! Acknowledgments
//!
//! The outcome of one protocol step, and the byte-by-byte check that
//! produces it.

use std::fmt;

use crate::channel::Channel;
use crate::error::Result;

/// Outcome of one protocol step
///
/// An ACK when `nac_info` is `None`, a NAC carrying the failure reason
/// otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    /// Which step produced this outcome
    pub label: String,

    /// Why the step failed
    pub nac_info: Option<String>,
}

impl Ack {
    /// A positive acknowledgment
    pub fn ack(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            nac_info: None,
        }
    }

    /// A negative acknowledgment with a reason
    pub fn nac(label: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            nac_info: Some(reason.into()),
        }
    }

    pub fn is_ack(&self) -> bool {
        self.nac_info.is_none()
    }

    pub fn is_nac(&self) -> bool {
        self.nac_info.is_some()
    }
}

impl fmt::Display for Ack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.nac_info {
            None => write!(f, "[ACK] {}", self.label),
            Some(reason) => write!(f, "[NAC] {} -- Reason: {}", self.label, reason),
        }
    }
}

/// Read back `expected` one byte at a time and compare
///
/// Stops at the first empty read (timeout) or the first mismatch, so the
/// NAC reason names the exact offset. Channel I/O errors propagate; a
/// timeout does not.
pub fn verify(channel: &mut dyn Channel, expected: &[u8], label: &str) -> Result<Ack> {
    for (index, &want) in expected.iter().enumerate() {
        let got = channel.read(1)?;
        match got.first() {
            None => {
                return Ok(Ack::nac(label, format!("timeout at byte index {}", index)));
            }
            Some(&byte) if byte != want => {
                return Ok(Ack::nac(
                    label,
                    format!("index {}: expected {:#04x}, got {:#04x}", index, want, byte),
                ));
            }
            Some(_) => {}
        }
    }

    Ok(Ack::ack(label))
}
