// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! CONNECTION_CLOSE (0x1C transport, 0x1D application).
//!
//! `type | errorCode:varint | frameType:varint | reasonLen:varint |
//! reason[reasonLen]`. `frameType` names the offending frame for a
//! framing-error close, or 0 otherwise; for the application variant it's
//! always present and zero on send.

use crate::varint::VarInt;
use quicvc_codec::{DecoderBuffer, DecoderResult, Encoder};

pub const TAG_TRANSPORT: u8 = 0x1C;
pub const TAG_APPLICATION: u8 = 0x1D;

pub const NO_ERROR: u64 = 0x00;
pub const INTERNAL_ERROR: u64 = 0x01;
pub const FRAME_ENCODING_ERROR: u64 = 0x07;
pub const PROTOCOL_VIOLATION: u64 = 0x0A;
pub const CREDENTIAL_REJECTED: u64 = 0x100;
pub const CREDENTIAL_EXPIRED: u64 = 0x101;
pub const CREDENTIAL_REVOKED: u64 = 0x102;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CloseSource {
    Transport,
    Application,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConnectionClose<Reason = Vec<u8>> {
    pub source: CloseSource,
    pub error_code: VarInt,
    /// The frame type that caused the close, when `source` is `Transport`
    /// and the close is due to a framing error; `0` otherwise.
    pub frame_type: VarInt,
    pub reason: Reason,
}

impl ConnectionClose<&[u8]> {
    pub fn tag(&self) -> u8 {
        match self.source {
            CloseSource::Transport => TAG_TRANSPORT,
            CloseSource::Application => TAG_APPLICATION,
        }
    }

    pub fn encode<E: Encoder>(&self, encoder: &mut E) {
        encoder.encode(&self.tag());
        encoder.encode(&self.error_code);
        encoder.encode(&self.frame_type);
        encoder.encode(&VarInt::new(self.reason.len() as u64).expect("reason length fits"));
        encoder.write_slice(self.reason);
    }
}

impl<'a> ConnectionClose<DecoderBuffer<'a>> {
    pub fn decode(tag: u8, buffer: DecoderBuffer<'a>) -> DecoderResult<'a, Self> {
        let source = if tag == TAG_APPLICATION {
            CloseSource::Application
        } else {
            CloseSource::Transport
        };
        let (error_code, buffer) = buffer.decode::<VarInt>()?;
        let (frame_type, buffer) = buffer.decode::<VarInt>()?;
        let (reason_len, buffer) = buffer.decode::<VarInt>()?;
        let (reason, buffer) = buffer.decode_slice(reason_len.as_u64() as usize)?;

        Ok((
            Self {
                source,
                error_code,
                frame_type,
                reason,
            },
            buffer,
        ))
    }
}
