// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Error taxonomy for the codec.
//!
//! Errors are grouped by *kind of failure*, not by which layer produced
//! them, per the wire format's own error model (buffer, framing, varint, VC,
//! handshake). Each [`CodecError`] carries the buffer offset at which
//! decoding stopped, when that offset is meaningful.

use quicvc_codec::DecoderError;
use std::fmt;

/// State name attached to `UnexpectedVcFrame`, kept as a `&'static str`
/// rather than importing the handshake state enum to avoid a dependency
/// cycle between `frame` and `handshake`.
pub type StateName = &'static str;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// The buffer ran out of bytes before a value was fully decoded.
    ShortBuffer,
    /// Bytes remained after a value that was expected to consume the buffer.
    TrailingGarbage,
    /// A long- or short-header packet's fixed bit (bit 6 of byte 0) was zero.
    FixedBitClear,
    /// A DCID or SCID length exceeded 20 bytes.
    ConnectionIdTooLong,
    /// The leading frame type byte did not match any known frame.
    UnsupportedFrame { frame_type: u8 },
    /// An ACK frame's ranges did not satisfy the ordering invariant.
    InvalidAckRange,
    /// A STREAM frame's flag bits selected a combination the payload doesn't
    /// back up (e.g. LEN present but fewer bytes than declared).
    InvalidStreamFlags,
    /// A packet-number length outside `[1, 4]` was requested or observed.
    InvalidPacketNumberLength,
    /// A varint-backed value was negative or exceeded `2^62 - 1`.
    InvalidValue,
    /// A `VC_INIT`/`VC_RESPONSE` payload lacked the credential microdata
    /// marker, or wasn't valid UTF-8.
    InvalidCredentialMicrodata,
    /// A `VC_RESPONSE`/`VC_ACK`/`DISCOVERY`/`HEARTBEAT` JSON payload failed
    /// to parse or was missing a required field.
    InvalidResponseJson,
    /// A VC frame arrived in a handshake state that doesn't expect it.
    UnexpectedVcFrame { state: StateName, frame_type: u8 },
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ShortBuffer => write!(f, "buffer ended before value was fully decoded"),
            Self::TrailingGarbage => write!(f, "unconsumed bytes after decoding"),
            Self::FixedBitClear => write!(f, "fixed bit (0x40) was not set"),
            Self::ConnectionIdTooLong => write!(f, "connection id exceeds 20 bytes"),
            Self::UnsupportedFrame { frame_type } => {
                write!(f, "unsupported frame type 0x{frame_type:02x}")
            }
            Self::InvalidAckRange => write!(f, "ack range violates ordering invariant"),
            Self::InvalidStreamFlags => write!(f, "stream frame flags inconsistent with payload"),
            Self::InvalidPacketNumberLength => write!(f, "packet number length outside [1, 4]"),
            Self::InvalidValue => write!(f, "value exceeds varint range"),
            Self::InvalidCredentialMicrodata => {
                write!(f, "credential payload missing DeviceIdentityCredential marker")
            }
            Self::InvalidResponseJson => write!(f, "malformed VC JSON payload"),
            Self::UnexpectedVcFrame { state, frame_type } => {
                write!(f, "frame 0x{frame_type:02x} unexpected in state {state}")
            }
        }
    }
}

/// A decode failure, with the offset (from the start of the buffer handed to
/// the top-level parse call) at which it occurred, when known.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CodecError {
    pub kind: ErrorKind,
    pub offset: Option<usize>,
}

impl CodecError {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, offset: None }
    }

    pub fn at(kind: ErrorKind, offset: usize) -> Self {
        Self {
            kind,
            offset: Some(offset),
        }
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.offset {
            Some(offset) => write!(f, "{} (at offset {offset})", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for CodecError {}

impl From<DecoderError> for CodecError {
    fn from(error: DecoderError) -> Self {
        let kind = match error {
            DecoderError::UnexpectedEof(_) => ErrorKind::ShortBuffer,
            DecoderError::UnexpectedBytes(_) => ErrorKind::TrailingGarbage,
            DecoderError::LengthCapacityExceeded => ErrorKind::ShortBuffer,
            DecoderError::InvariantViolation(_) => ErrorKind::InvalidValue,
        };
        Self::new(kind)
    }
}

/// Errors produced by the handshake state machine. Unlike [`CodecError`],
/// these don't come from parsing bytes off the wire - they describe the
/// session's own protocol logic failing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum HandshakeError {
    /// The peer's credential failed verification, or the responder rejected
    /// it, or the response reported `"error"`/`"revoked"`.
    CredentialRejected(String),
    /// The embedding's `tick(now)` call observed the session's deadline had
    /// passed before the expected frame arrived.
    Timeout,
    /// An event was delivered in a state that doesn't accept it. This covers
    /// API misuse - calling a transition method for the wrong role, or
    /// calling one that doesn't apply to the current state at all - as
    /// opposed to a VC frame arriving out of turn on the wire, which is
    /// [`Self::UnexpectedFrame`].
    StateViolation {
        from: StateName,
        event: &'static str,
    },
    /// A VC frame was handed to the session in a state that doesn't expect
    /// that frame type. Wraps a [`CodecError`] carrying
    /// [`ErrorKind::UnexpectedVcFrame`].
    UnexpectedFrame(CodecError),
}

impl fmt::Display for HandshakeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::CredentialRejected(reason) => write!(f, "credential rejected: {reason}"),
            Self::Timeout => write!(f, "handshake timed out"),
            Self::StateViolation { from, event } => {
                write!(f, "event {event} is invalid in state {from}")
            }
            Self::UnexpectedFrame(error) => write!(f, "{error}"),
        }
    }
}

impl std::error::Error for HandshakeError {}
