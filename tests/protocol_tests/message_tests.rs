//! Message Tests
//!
//! These tests verify:
//! - Handshake and command step sequences on the wire
//! - ACK/NAC outcomes and their reasons
//! - Lazy, pull-driven evaluation
//! - The conditional confirmation step

use std::collections::VecDeque;

use irlink::protocol::{
    encode, verify, Ack, Command, Message, ProtocolCode, CODE_LABEL, CONFIRM_LABEL,
    HANDSHAKE_LABEL, PROTOCOL_LABEL, SIZE_LABEL,
};
use irlink::{Channel, Result};

// =============================================================================
// Helper Functions
// =============================================================================

/// Channel that plays back a fixed reply stream and records writes
#[derive(Default)]
struct ScriptedChannel {
    replies: VecDeque<u8>,
    written: Vec<Vec<u8>>,
}

impl ScriptedChannel {
    fn replying(replies: &[u8]) -> Self {
        Self {
            replies: replies.iter().copied().collect(),
            written: Vec::new(),
        }
    }
}

impl Channel for ScriptedChannel {
    fn open(&mut self) -> Result<()> {
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }

    fn is_open(&self) -> bool {
        true
    }

    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.written.push(data.to_vec());
        Ok(())
    }

    fn read(&mut self, n: usize) -> Result<Vec<u8>> {
        let count = n.min(self.replies.len());
        Ok(self.replies.drain(..count).collect())
    }
}

fn check(value: u64, length: usize) -> Vec<u8> {
    encode(value, length).unwrap().1
}

/// Replies a well-behaved device gives to `command`
fn good_replies(command: &Command) -> Vec<u8> {
    let mut replies = Vec::new();
    replies.extend(check(u64::from(command.protocol.as_u8()), 1));
    replies.extend(check(u64::from(command.size), 1));
    replies.extend(check(u64::from(command.code), 4));
    replies.extend_from_slice(b"sent");
    replies
}

fn nec_command() -> Command {
    Command::new(3772793023, ProtocolCode::NecX, 32)
}

// =============================================================================
// Verify Tests
// =============================================================================

#[test]
fn test_verify_match() {
    let mut channel = ScriptedChannel::replying(b"abc");
    let ack = verify(&mut channel, b"abc", "step").unwrap();
    assert!(ack.is_ack());
    assert_eq!(ack.label, "step");
}

#[test]
fn test_verify_mismatch_names_offset() {
    let mut channel = ScriptedChannel::replying(b"abX");
    let ack = verify(&mut channel, b"abc", "step").unwrap();
    assert!(ack.is_nac());
    assert_eq!(ack.nac_info.as_deref(), Some("index 2: expected 0x63, got 0x58"));
}

#[test]
fn test_verify_timeout_names_offset() {
    let mut channel = ScriptedChannel::replying(b"a");
    let ack = verify(&mut channel, b"abc", "step").unwrap();
    assert_eq!(ack.nac_info.as_deref(), Some("timeout at byte index 1"));
}

#[test]
fn test_verify_stops_at_first_mismatch() {
    let mut channel = ScriptedChannel::replying(b"Xbc");
    verify(&mut channel, b"abc", "step").unwrap();
    // The two bytes after the mismatch are left unread
    assert_eq!(channel.replies.len(), 2);
}

// =============================================================================
// Ack Display Tests
// =============================================================================

#[test]
fn test_ack_display() {
    assert_eq!(Ack::ack("Giving command").to_string(), "[ACK] Giving command");
    assert_eq!(
        Ack::nac("Handshake", "timeout at byte index 0").to_string(),
        "[NAC] Handshake -- Reason: timeout at byte index 0"
    );
}

// =============================================================================
// Handshake Tests
// =============================================================================

#[test]
fn test_handshake_acknowledged() {
    let mut channel = ScriptedChannel::replying(b"synack");
    let acks: Vec<Ack> = Message::Handshake
        .send_through(&mut channel)
        .collect::<Result<_>>()
        .unwrap();

    assert_eq!(acks, vec![Ack::ack(HANDSHAKE_LABEL)]);
    assert_eq!(channel.written, vec![b"syn".to_vec(), b"ack".to_vec()]);
}

#[test]
fn test_handshake_wrong_reply() {
    let mut channel = ScriptedChannel::replying(b"synAck");
    let acks: Vec<Ack> = Message::Handshake
        .send_through(&mut channel)
        .collect::<Result<_>>()
        .unwrap();

    assert_eq!(acks.len(), 1);
    assert!(acks[0].is_nac());
    assert!(acks[0].nac_info.as_deref().unwrap().starts_with("index 3:"));
}

#[test]
fn test_handshake_ack_written_only_when_pulled_past_reply() {
    let mut channel = ScriptedChannel::replying(b"synack");
    {
        let mut steps = Message::Handshake.send_through(&mut channel);
        assert!(steps.next().unwrap().unwrap().is_ack());
    }
    assert_eq!(channel.written, vec![b"syn".to_vec()]);
}

// =============================================================================
// Command Tests
// =============================================================================

#[test]
fn test_command_all_acknowledged() {
    let command = nec_command();
    let mut channel = ScriptedChannel::replying(&good_replies(&command));

    let acks: Vec<Ack> = Message::Command(command)
        .send_through(&mut channel)
        .collect::<Result<_>>()
        .unwrap();

    assert_eq!(acks.len(), 4);
    assert!(acks.iter().all(Ack::is_ack));
    let labels: Vec<&str> = acks.iter().map(|a| a.label.as_str()).collect();
    assert_eq!(labels, vec![PROTOCOL_LABEL, SIZE_LABEL, CODE_LABEL, CONFIRM_LABEL]);

    assert_eq!(
        channel.written,
        vec![
            vec![0x07, 0x07],
            vec![0x20, 0x20],
            vec![0xE0, 0xE0, 0x40, 0xBF, 0x00, 0x00, 0x00, 0xBF],
            b"ok".to_vec(),
        ]
    );
    assert!(channel.replies.is_empty());
}

#[test]
fn test_command_wrong_protocol_echo_skips_confirmation() {
    let command = nec_command();
    let mut replies = good_replies(&command);
    replies[0] ^= 0xFF;
    replies.truncate(replies.len() - 4);
    let mut channel = ScriptedChannel::replying(&replies);

    let acks: Vec<Ack> = Message::Command(command)
        .send_through(&mut channel)
        .collect::<Result<_>>()
        .unwrap();

    assert_eq!(acks.len(), 3);
    assert!(acks[0].is_nac());
    assert!(acks[1].is_ack());
    assert!(acks[2].is_ack());
    // All three base steps still ran, "ok" was never sent
    assert_eq!(channel.written.len(), 3);
}

#[test]
fn test_command_code_timeout() {
    let command = nec_command();
    let replies = check(7, 1)
        .into_iter()
        .chain(check(32, 1))
        .chain([0x00, 0x00])
        .collect::<Vec<u8>>();
    let mut channel = ScriptedChannel::replying(&replies);

    let acks: Vec<Ack> = Message::Command(command)
        .send_through(&mut channel)
        .collect::<Result<_>>()
        .unwrap();

    assert_eq!(acks.len(), 3);
    assert_eq!(acks[2].label, CODE_LABEL);
    assert_eq!(acks[2].nac_info.as_deref(), Some("timeout at byte index 2"));
}

#[test]
fn test_command_wrong_confirmation() {
    let command = nec_command();
    let mut replies = good_replies(&command);
    let last = replies.len() - 1;
    replies[last] = b'd';
    let mut channel = ScriptedChannel::replying(&replies);

    let acks: Vec<Ack> = Message::Command(command)
        .send_through(&mut channel)
        .collect::<Result<_>>()
        .unwrap();

    assert_eq!(acks.len(), 4);
    assert!(acks[3].is_nac());
    assert_eq!(acks[3].label, CONFIRM_LABEL);
}

#[test]
fn test_command_is_lazy() {
    let command = nec_command();
    let mut channel = ScriptedChannel::replying(&good_replies(&command));

    {
        let mut steps = Message::Command(command).send_through(&mut channel);
        assert!(steps.next().unwrap().unwrap().is_ack());
    }

    // Only the protocol frame went out
    assert_eq!(channel.written, vec![vec![0x07, 0x07]]);
}

#[test]
fn test_sequence_is_fused() {
    let command = nec_command();
    let mut channel = ScriptedChannel::replying(&good_replies(&command));
    let mut steps = Message::Command(command).send_through(&mut channel);

    for _ in 0..4 {
        assert!(steps.next().is_some());
    }
    assert!(steps.next().is_none());
    assert!(steps.next().is_none());
}

#[test]
fn test_message_labels() {
    assert_eq!(Message::Handshake.label(), "Handshake");
    assert_eq!(Message::from(nec_command()).label(), "Command");
}

#[test]
fn test_step_label_texts() {
    assert_eq!(PROTOCOL_LABEL, "Communicating protocol");
    assert_eq!(SIZE_LABEL, "Communicating size");
    assert_eq!(CODE_LABEL, "Giving command");
    assert_eq!(CONFIRM_LABEL, "Confirming command");
    assert_ne!(CONFIRM_LABEL, Message::from(nec_command()).label());
}
