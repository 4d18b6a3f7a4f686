//! Loopback emulator
//!
//! A software stand-in for the device side of the link. Every write is
//! answered immediately by queueing what the device would send back:
//!
//! | Host writes            | Device queues                        |
//! |------------------------|--------------------------------------|
//! | `syn`                  | `synack` literal                     |
//! | `ok`                   | `sent` literal                       |
//! | `ack`                  | nothing                              |
//! | `data(L) ++ check(L)`  | checksum of `data`, `L` bytes wide   |
//! | anything else          | checksum of the whole frame          |
//!
//! Replies are queued as whole [`Unit`]s. [`LoopbackChannel::read_units`]
//! pops them token by token; the [`Channel::read`] implementation flattens
//! them into raw bytes the way a real UART delivers them.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;

use super::{Channel, ChannelFactory};
use crate::config::Config;
use crate::error::{LinkError, Result};
use crate::protocol::{ACK, OK, SENT, SYN, SYNACK};

/// One queued device reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unit {
    /// A literal token such as `synack`
    Literal(Bytes),

    /// Digit-accumulated checksum of a data group, not yet reduced mod 256
    Checksum { value: u64, width: usize },
}

impl Unit {
    /// Raw bytes this unit puts on the wire
    ///
    /// A checksum is reduced mod 256 and right-aligned in `width` bytes,
    /// matching the codec's check group.
    pub fn to_bytes(&self) -> Bytes {
        match self {
            Unit::Literal(bytes) => bytes.clone(),
            Unit::Checksum { value, width } => {
                let mut out = vec![0u8; *width];
                if let Some(last) = out.last_mut() {
                    *last = (value % 256) as u8;
                }
                Bytes::from(out)
            }
        }
    }
}

/// Checksum the way the device firmware computes it: base-256 digit sum
pub fn digit_checksum(data: &[u8]) -> u64 {
    if data.len() > 8 {
        // Base-256 digits of a big-endian integer are its bytes
        return data.iter().map(|&b| u64::from(b)).sum();
    }

    let mut v = data.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b));
    let mut check = 0;
    while v >= 256 {
        check += v % 256;
        v /= 256;
    }
    check + v
}

struct LoopbackInner {
    open: bool,
    silent: bool,
    pending: VecDeque<Unit>,
    written: Vec<Bytes>,
    checksum_frames: usize,
    corrupt: HashSet<usize>,
}

/// Deterministic in-memory device
///
/// Cloning yields another handle to the same device, so a test can keep one
/// while the controller owns another.
#[derive(Clone)]
pub struct LoopbackChannel {
    inner: Arc<Mutex<LoopbackInner>>,
}

impl LoopbackChannel {
    /// Create a closed loopback device
    pub fn new() -> Self {
        LoopbackChannel {
            inner: Arc::new(Mutex::new(LoopbackInner {
                open: false,
                silent: false,
                pending: VecDeque::new(),
                written: Vec::new(),
                checksum_frames: 0,
                corrupt: HashSet::new(),
            })),
        }
    }

    /// A factory handing the controller a handle to this device
    pub fn factory(&self) -> ChannelFactory {
        let handle = self.clone();
        Box::new(move |_config: &Config| Ok(Box::new(handle.clone()) as Box<dyn Channel>))
    }

    /// Pop up to `n` queued replies without splitting them into bytes
    pub fn read_units(&self, n: usize) -> Result<Vec<Unit>> {
        let mut inner = self.inner.lock();
        if !inner.open {
            return Err(LinkError::ChannelClosed);
        }

        let count = n.min(inner.pending.len());
        let units: Vec<Unit> = inner.pending.drain(..count).collect();
        tracing::trace!("[R] {:?}", units);
        Ok(units)
    }

    /// Every frame written so far, in order
    pub fn written(&self) -> Vec<Bytes> {
        self.inner.lock().written.clone()
    }

    /// Replies queued but not yet read
    pub fn pending_units(&self) -> Vec<Unit> {
        self.inner.lock().pending.iter().cloned().collect()
    }

    /// Drop queued replies and the write log
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.pending.clear();
        inner.written.clear();
    }

    /// Stop (or resume) answering writes; reads then time out
    pub fn set_silent(&self, silent: bool) {
        self.inner.lock().silent = silent;
    }

    /// Answer the `index`-th checksummed frame (0-based) with a wrong echo
    pub fn corrupt_frame(&self, index: usize) {
        self.inner.lock().corrupt.insert(index);
    }
}

impl Default for LoopbackChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl Channel for LoopbackChannel {
    fn open(&mut self) -> Result<()> {
        self.inner.lock().open = true;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.inner.lock().open = false;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.inner.lock().open
    }

    fn write(&mut self, data: &[u8]) -> Result<()> {
        let mut inner = self.inner.lock();
        if !inner.open {
            return Err(LinkError::ChannelClosed);
        }

        tracing::trace!("[W] {:02x?}", data);
        inner.written.push(Bytes::copy_from_slice(data));

        if inner.silent {
            return Ok(());
        }

        let reply = if data == SYN {
            Some(Unit::Literal(Bytes::from_static(SYNACK)))
        } else if data == OK {
            Some(Unit::Literal(Bytes::from_static(SENT)))
        } else if data == ACK {
            None
        } else {
            let width = if !data.is_empty() && data.len() % 2 == 0 {
                data.len() / 2
            } else {
                data.len()
            };

            let frame = inner.checksum_frames;
            inner.checksum_frames += 1;

            let mut value = digit_checksum(&data[..width]);
            if inner.corrupt.contains(&frame) {
                value = value.wrapping_add(1);
            }
            Some(Unit::Checksum { value, width })
        };

        if let Some(unit) = reply {
            tracing::debug!("loopback queued {:?}", unit);
            inner.pending.push_back(unit);
        }
        Ok(())
    }

    /// Byte-granular read; see [`LoopbackChannel::read_units`] for whole replies
    fn read(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut inner = self.inner.lock();
        if !inner.open {
            return Err(LinkError::ChannelClosed);
        }

        let mut out = Vec::with_capacity(n);
        while out.len() < n {
            let Some(unit) = inner.pending.pop_front() else {
                break;
            };

            let mut bytes = unit.to_bytes();
            let want = n - out.len();
            if bytes.len() > want {
                let rest = bytes.split_off(want);
                inner.pending.push_front(Unit::Literal(rest));
            }
            out.extend_from_slice(&bytes);
        }

        tracing::trace!("[R] {:02x?}", out);
        Ok(out)
    }
}
