//! Channel Module
//!
//! Duplex byte transport between the host and the device.
//!
//! ## Implementations
//! - [`SerialChannel`]: a real UART through the `serialport` crate
//! - [`LoopbackChannel`]: a deterministic software device for tests

use crate::config::Config;
use crate::error::Result;

mod loopback;
mod serial;

pub use loopback::{digit_checksum, LoopbackChannel, Unit};
pub use serial::SerialChannel;

/// Duplex byte transport
///
/// All calls block. A read that times out returns fewer bytes than asked
/// for, possibly none; it is never an error.
pub trait Channel: Send {
    /// Open the underlying transport
    fn open(&mut self) -> Result<()>;

    /// Close the underlying transport. Closing twice is a no-op.
    fn close(&mut self) -> Result<()>;

    fn is_open(&self) -> bool;

    /// Write one frame
    fn write(&mut self, data: &[u8]) -> Result<()>;

    /// Read up to `n` bytes
    fn read(&mut self, n: usize) -> Result<Vec<u8>>;
}

/// Builds the channel a controller opens for each session
pub type ChannelFactory = Box<dyn FnMut(&Config) -> Result<Box<dyn Channel>> + Send>;
