//! # irlink
//!
//! Host-side driver for an IR remote emitter attached over a serial link:
//! - Three-step `syn` / `synack` / `ack` handshake
//! - Checksummed, individually echoed command fields
//! - Per-step ACK/NAC outcomes with a fail-fast escalation policy
//! - A deterministic loopback device for tests
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Controller                             │
//! │          (session lifecycle, fail-fast policy)               │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ pulls one Ack per round-trip
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        Message                               │
//! │               Handshake | Command (codec)                    │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   Serial    │          │  Loopback   │
//!   │  (UART)     │          │ (emulator)  │
//!   └─────────────┘          └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use irlink::{Command, Config, Controller, LoopbackChannel, Message, ProtocolCode};
//!
//! let device = LoopbackChannel::new();
//! let mut controller = Controller::new(Config::default(), device.factory());
//!
//! let mut session = controller.session().unwrap();
//! let command = Command::new(3772793023, ProtocolCode::NecX, 32);
//! let acks = session.send(&Message::Command(command), false).unwrap();
//! assert_eq!(acks.len(), 4);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod channel;
pub mod controller;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{LinkError, Result};
pub use config::Config;
pub use channel::{Channel, ChannelFactory, LoopbackChannel, SerialChannel};
pub use controller::{ConnectionState, Controller, Session};
pub use protocol::{Ack, Command, Message, ProtocolCode};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of irlink
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
