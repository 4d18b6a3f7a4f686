//! Protocol Module
//!
//! Defines the host side of the serial link protocol.
//!
//! ## Handshake
//! ```text
//! host                      device
//!  │ ──── "syn" ──────────────▶ │
//!  │ ◀─── "synack" ──────────── │   verified byte by byte
//!  │ ──── "ack" ──────────────▶ │   not verified
//! ```
//!
//! ## Command
//! Each field travels as one frame of `data ++ checksum`, and the device
//! echoes the checksum back:
//! ```text
//! ┌──────────────┬──────────────┐        ┌──────────────┐
//! │ protocol (1) │ checksum (1) │  ───▶  │ checksum (1) │
//! ├──────────────┼──────────────┤        ├──────────────┤
//! │ size (1)     │ checksum (1) │  ───▶  │ checksum (1) │
//! ├──────────────┼──────────────┤        ├──────────────┤
//! │ code (4)     │ checksum (4) │  ───▶  │ checksum (4) │
//! └──────────────┴──────────────┘        └──────────────┘
//! ```
//! When all three echoes match, the host confirms with `"ok"` and expects
//! `"sent"`.

mod ack;
mod code;
mod codec;
mod message;

pub use ack::{verify, Ack};
pub use code::ProtocolCode;
pub use codec::{checksum, encode, to_be_bytes, CODE_WIDTH};
pub use message::{AckSequence, Command, Message};

// =============================================================================
// Wire Literals
// =============================================================================

/// Host opens the handshake
pub const SYN: &[u8] = b"syn";

/// Device answers the handshake
pub const SYNACK: &[u8] = b"synack";

/// Host closes the handshake
pub const ACK: &[u8] = b"ack";

/// Host confirms a fully acknowledged command
pub const OK: &[u8] = b"ok";

/// Device reports the command as emitted
pub const SENT: &[u8] = b"sent";

// =============================================================================
// Step Labels
// =============================================================================

pub const HANDSHAKE_LABEL: &str = "Handshake";
pub const PROTOCOL_LABEL: &str = "Communicating protocol";
pub const SIZE_LABEL: &str = "Communicating size";
pub const CODE_LABEL: &str = "Giving command";
pub const CONFIRM_LABEL: &str = "Confirming command";
