//! Error types for irlink
//!
//! Provides a unified error type for all operations.
//!
//! A negative acknowledgment is not an error by itself: it is an [`Ack`]
//! value. It only becomes a [`LinkError::Transport`] or
//! [`LinkError::Handshake`] once the controller's fail-fast policy escalates it.

use thiserror::Error;

use crate::protocol::Ack;

/// Result type alias using LinkError
pub type Result<T> = std::result::Result<T, LinkError>;

/// Unified error type for irlink operations
#[derive(Debug, Error)]
pub enum LinkError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("Channel is closed")]
    ChannelClosed,

    // -------------------------------------------------------------------------
    // Session Errors
    // -------------------------------------------------------------------------
    /// Operation attempted while the controller is disconnected
    #[error("Not connected: {0}")]
    NotConnected(String),

    /// A step was negatively acknowledged under fail-fast policy
    #[error("Transport failure: {0}")]
    Transport(Ack),

    /// The session-opening handshake was negatively acknowledged
    #[error("Handshake failed: {0}")]
    Handshake(Ack),

    // -------------------------------------------------------------------------
    // Encoding Errors
    // -------------------------------------------------------------------------
    #[error("Value {value} does not fit in {length} byte(s)")]
    Overflow { value: u64, length: usize },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LinkError {
    /// The negative acknowledgment behind a transport or handshake failure
    pub fn nac(&self) -> Option<&Ack> {
        match self {
            LinkError::Transport(ack) | LinkError::Handshake(ack) => Some(ack),
            _ => None,
        }
    }
}
