//! Message definitions
//!
//! A message is a fixed sequence of wire round-trips. Sending one through a
//! channel yields an [`AckSequence`]: a lazy iterator that performs exactly
//! one round-trip per `next()` call, so the caller decides after every step
//! whether to keep going.

use crate::channel::Channel;
use crate::error::Result;

use super::ack::{verify, Ack};
use super::code::ProtocolCode;
use super::codec::{encode, CODE_WIDTH};
use super::{
    ACK, CODE_LABEL, CONFIRM_LABEL, HANDSHAKE_LABEL, OK, PROTOCOL_LABEL, SENT, SIZE_LABEL, SYN,
    SYNACK,
};

/// An IR command for the device to emit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    /// Raw IR code
    pub code: u32,

    /// Protocol to emit it with
    pub protocol: ProtocolCode,

    /// Code size, in bits
    pub size: u8,
}

impl Command {
    pub fn new(code: u32, protocol: ProtocolCode, size: u8) -> Self {
        Self {
            code,
            protocol,
            size,
        }
    }
}

/// Messages the host can send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// Session-opening exchange
    Handshake,

    /// Emit an IR command
    Command(Command),
}

impl Message {
    /// Human-readable name for logs
    pub fn label(&self) -> &'static str {
        match self {
            Message::Handshake => "Handshake",
            Message::Command(_) => "Command",
        }
    }

    /// Start sending this message through `channel`
    ///
    /// Nothing is written until the returned sequence is pulled.
    pub fn send_through<'c>(&self, channel: &'c mut dyn Channel) -> AckSequence<'c> {
        AckSequence {
            channel,
            message: *self,
            step: 0,
            all_acked: true,
            finished: false,
        }
    }
}

impl From<Command> for Message {
    fn from(command: Command) -> Self {
        Message::Command(command)
    }
}

/// Lazy, pull-driven sequence of step outcomes
///
/// Each element is one completed round-trip. A handshake yields 1 element;
/// a command yields 4 when its first three steps are acknowledged and 3
/// otherwise. The sequence ends after the first I/O error.
pub struct AckSequence<'c> {
    channel: &'c mut dyn Channel,
    message: Message,
    step: u8,
    all_acked: bool,
    finished: bool,
}

impl AckSequence<'_> {
    fn advance(&mut self) -> Option<Result<Ack>> {
        let step = self.step;
        self.step += 1;

        match self.message {
            Message::Handshake => self.handshake_step(step),
            Message::Command(command) => self.command_step(command, step),
        }
    }

    fn handshake_step(&mut self, step: u8) -> Option<Result<Ack>> {
        match step {
            0 => Some(self.round_trip(SYN, SYNACK, HANDSHAKE_LABEL)),
            // Closing "ack" is written once the caller pulls past the reply
            1 => match self.channel.write(ACK) {
                Ok(()) => None,
                Err(e) => Some(Err(e)),
            },
            _ => None,
        }
    }

    fn command_step(&mut self, command: Command, step: u8) -> Option<Result<Ack>> {
        match step {
            0 => Some(self.field(u64::from(command.protocol.as_u8()), 1, PROTOCOL_LABEL)),
            1 => Some(self.field(u64::from(command.size), 1, SIZE_LABEL)),
            2 => Some(self.field(u64::from(command.code), CODE_WIDTH, CODE_LABEL)),
            3 if self.all_acked => Some(self.round_trip(OK, SENT, CONFIRM_LABEL)),
            _ => None,
        }
    }

    /// Write `data ++ checksum` as one frame and verify the checksum echo
    fn field(&mut self, value: u64, length: usize, label: &str) -> Result<Ack> {
        let (data, check) = encode(value, length)?;

        let mut frame = Vec::with_capacity(data.len() + check.len());
        frame.extend_from_slice(&data);
        frame.extend_from_slice(&check);
        self.channel.write(&frame)?;

        verify(&mut *self.channel, &check, label)
    }

    fn round_trip(&mut self, request: &[u8], reply: &[u8], label: &str) -> Result<Ack> {
        self.channel.write(request)?;
        verify(&mut *self.channel, reply, label)
    }
}

impl Iterator for AckSequence<'_> {
    type Item = Result<Ack>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let item = self.advance();
        match &item {
            Some(Ok(ack)) => self.all_acked &= ack.is_ack(),
            Some(Err(_)) | None => self.finished = true,
        }
        item
    }
}
