//! Controller Module
//!
//! Owns the channel for one session and applies the fail-fast policy.
//!
//! ## Lifecycle
//! ```text
//!                connect() / session()
//!   Disconnected ───────────────────────▶ Connected
//!        ▲        (handshake acknowledged)     │
//!        └──────────── close() / drop ─────────┘
//! ```
//!
//! ## Escalation
//! Every step outcome is logged (`info` for ACK, `warn` for NAC). Under
//! strict policy the first NAC stops the message and surfaces as
//! [`LinkError::Transport`]; otherwise every step runs and the outcomes are
//! returned to the caller. The handshake is always strict.

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::channel::{Channel, ChannelFactory, SerialChannel};
use crate::config::Config;
use crate::error::{LinkError, Result};
use crate::protocol::{Ack, Message};

static SESSION_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Next default session name: `RC0`, `RC1`, ... unique per process
pub fn next_session_name() -> String {
    format!("RC{}", SESSION_COUNTER.fetch_add(1, Ordering::Relaxed))
}

/// Whether the controller holds an open, handshaken channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// Host-side driver for one remote device
pub struct Controller {
    /// Session configuration
    config: Config,

    /// Session identity for logs
    name: String,

    /// Builds a fresh channel on every connect
    factory: ChannelFactory,

    /// Present only while connected
    channel: Option<Box<dyn Channel>>,
}

impl Controller {
    /// Create a disconnected controller
    pub fn new(config: Config, factory: ChannelFactory) -> Self {
        let name = config.name.clone().unwrap_or_else(next_session_name);
        Self {
            config,
            name,
            factory,
            channel: None,
        }
    }

    /// Create a controller that talks to `config.port` over a UART
    pub fn serial(config: Config) -> Self {
        Self::new(
            config,
            Box::new(|config: &Config| {
                Ok(Box::new(SerialChannel::new(config)) as Box<dyn Channel>)
            }),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> ConnectionState {
        match &self.channel {
            Some(channel) if channel.is_open() => ConnectionState::Connected,
            _ => ConnectionState::Disconnected,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Open a channel and perform the handshake
    ///
    /// A NAC during the handshake closes the channel again and fails with
    /// `LinkError::Handshake`, whatever the configured policy. Connecting an
    /// already connected controller does nothing; a channel that was closed
    /// underneath the controller is discarded and a fresh one handshaken.
    pub fn connect(&mut self) -> Result<()> {
        if self.is_connected() {
            return Ok(());
        }
        if let Some(mut stale) = self.channel.take() {
            tracing::debug!("Session {}: discarding closed channel", self.name);
            if let Err(e) = stale.close() {
                tracing::warn!("Session {}: close of stale channel: {}", self.name, e);
            }
        }
        self.config.validate()?;

        let mut channel = (self.factory)(&self.config)?;
        channel.open()?;

        match drive(&self.name, channel.as_mut(), &Message::Handshake, true) {
            Ok(_) => {
                tracing::info!("Session {} opened on {}", self.name, self.config.port);
                self.channel = Some(channel);
                Ok(())
            }
            Err(e) => {
                if let Err(close_err) = channel.close() {
                    tracing::warn!(
                        "Session {}: close after failed handshake: {}",
                        self.name,
                        close_err
                    );
                }
                Err(match e {
                    LinkError::Transport(ack) => LinkError::Handshake(ack),
                    other => other,
                })
            }
        }
    }

    /// Connect and return a guard that closes the session when dropped
    pub fn session(&mut self) -> Result<Session<'_>> {
        self.connect()?;
        Ok(Session { controller: self })
    }

    /// Close the channel, if any. Always leaves the controller disconnected.
    pub fn close(&mut self) -> Result<()> {
        if let Some(mut channel) = self.channel.take() {
            channel.close()?;
            tracing::info!("Session {} closed", self.name);
        }
        Ok(())
    }

    /// Send a message and collect its step outcomes
    ///
    /// The effective policy is strict if either the session's `fail_fast` or
    /// `local_fail_fast` is set. Under strict policy the first NAC aborts the
    /// message with `LinkError::Transport` before any later step is written.
    pub fn send(&mut self, message: &Message, local_fail_fast: bool) -> Result<Vec<Ack>> {
        let strict = self.config.fail_fast || local_fail_fast;

        let channel = match self.channel.as_mut() {
            Some(channel) if channel.is_open() => channel,
            Some(_) => {
                return Err(LinkError::NotConnected(format!(
                    "session {}: channel is closed",
                    self.name
                )))
            }
            None => {
                return Err(LinkError::NotConnected(format!(
                    "session {}: no channel",
                    self.name
                )))
            }
        };

        drive(&self.name, channel.as_mut(), message, strict)
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!("Session {}: close on drop failed: {}", self.name, e);
        }
    }
}

/// Pull a message's outcomes one at a time, logging each
fn drive(
    name: &str,
    channel: &mut dyn Channel,
    message: &Message,
    strict: bool,
) -> Result<Vec<Ack>> {
    let span = tracing::info_span!("session", name = %name, message = message.label());
    let _enter = span.enter();

    let mut acks = Vec::new();
    for outcome in message.send_through(channel) {
        let ack = outcome?;
        if ack.is_ack() {
            tracing::info!("{}", ack);
        } else {
            tracing::warn!("{}", ack);
        }

        if strict && ack.is_nac() {
            return Err(LinkError::Transport(ack));
        }
        acks.push(ack);
    }

    Ok(acks)
}

/// Scoped session
///
/// Derefs to the [`Controller`]; the channel is closed when the guard goes
/// out of scope, on every exit path.
pub struct Session<'a> {
    controller: &'a mut Controller,
}

impl Session<'_> {
    /// Close now and report any error, instead of on drop
    pub fn close(self) -> Result<()> {
        self.controller.close()
    }
}

impl Deref for Session<'_> {
    type Target = Controller;

    fn deref(&self) -> &Controller {
        &*self.controller
    }
}

impl DerefMut for Session<'_> {
    fn deref_mut(&mut self) -> &mut Controller {
        &mut *self.controller
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.controller.close() {
            tracing::warn!(
                "Session {}: close on scope exit failed: {}",
                self.controller.name,
                e
            );
        }
    }
}
