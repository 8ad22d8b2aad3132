// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! The frame set: a closed tagged union dispatched on the leading type byte.
//!
//! There's no open-world extension point here - the set of frame types this
//! profile speaks is fixed (the five generic QUIC frames this profile uses,
//! plus the five VC extension frames), so a single `match` on the tag byte
//! is the whole dispatcher, both for parsing and for serializing.

pub mod ack;
pub mod connection_close;
pub mod discovery;
pub mod heartbeat;
pub mod padding;
pub mod ping;
pub mod stream;
pub mod vc_ack;
pub mod vc_init;
pub mod vc_response;

pub use ack::Ack;
pub use connection_close::ConnectionClose;
pub use discovery::Discovery;
pub use heartbeat::Heartbeat;
pub use padding::Padding;
pub use ping::Ping;
pub use stream::Stream;
pub use vc_ack::VcAck;
pub use vc_init::VcInit;
pub use vc_response::VcResponse;

use crate::error::{CodecError, ErrorKind};
use quicvc_codec::{DecoderBuffer, Encoder};

/// A frame as parsed off the wire. `Stream`/`ConnectionClose` borrow their
/// variable-length payload from the decoded buffer rather than copying it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Frame<'a> {
    Padding(Padding),
    Ping(Ping),
    Ack(Ack),
    Stream(Stream<DecoderBuffer<'a>>),
    ConnectionClose(ConnectionClose<DecoderBuffer<'a>>),
    VcInit(VcInit),
    VcResponse(VcResponse),
    VcAck(VcAck),
    Discovery(Discovery),
    Heartbeat(Heartbeat),
}

impl<'a> Frame<'a> {
    pub fn tag(&self) -> u8 {
        match self {
            Self::Padding(_) => padding::TAG,
            Self::Ping(_) => ping::TAG,
            Self::Ack(frame) => frame.tag(),
            Self::Stream(frame) => stream_tag(frame),
            Self::ConnectionClose(frame) => close_tag(frame),
            Self::VcInit(_) => vc_init::TAG,
            Self::VcResponse(_) => vc_response::TAG,
            Self::VcAck(_) => vc_ack::TAG,
            Self::Discovery(_) => discovery::TAG,
            Self::Heartbeat(_) => heartbeat::TAG,
        }
    }
}

fn stream_tag(frame: &Stream<DecoderBuffer>) -> u8 {
    let mut tag = stream::TAG_BASE;
    if frame.fin {
        tag |= 0x01;
    }
    if frame.explicit_length {
        tag |= 0x02;
    }
    if frame.offset.as_u64() != 0 {
        tag |= 0x04;
    }
    tag
}

fn close_tag(frame: &ConnectionClose<DecoderBuffer>) -> u8 {
    match frame.source {
        connection_close::CloseSource::Transport => connection_close::TAG_TRANSPORT,
        connection_close::CloseSource::Application => connection_close::TAG_APPLICATION,
    }
}

/// A frame ready to be serialized. Kept distinct from [`Frame`] because the
/// variable-length variants borrow `&[u8]` slices supplied by the caller
/// rather than a parsed buffer.
#[derive(Clone, Debug)]
pub enum OutboundFrame<'a> {
    Padding(Padding),
    Ping(Ping),
    Ack(Ack),
    Stream(Stream<&'a [u8]>),
    ConnectionClose(ConnectionClose<&'a [u8]>),
    VcInit(VcInit),
    VcResponse(VcResponse),
    VcAck(VcAck),
    Discovery(Discovery),
    Heartbeat(Heartbeat),
}

impl<'a> OutboundFrame<'a> {
    pub fn encode<E: Encoder>(&self, encoder: &mut E) {
        match self {
            Self::Padding(frame) => frame.encode(encoder),
            Self::Ping(_) => encoder.encode(&ping::TAG),
            Self::Ack(frame) => frame.encode(encoder),
            Self::Stream(frame) => frame.encode(encoder),
            Self::ConnectionClose(frame) => frame.encode(encoder),
            Self::VcInit(frame) => frame.encode(encoder),
            Self::VcResponse(frame) => frame.encode(encoder),
            Self::VcAck(frame) => frame.encode(encoder),
            Self::Discovery(frame) => frame.encode(encoder),
            Self::Heartbeat(frame) => frame.encode(encoder),
        }
    }
}

/// Parses every frame out of a packet's payload, stopping at the first
/// malformed frame (if any). Returns the frames successfully parsed before
/// the failure alongside the error, so callers can log position and decide
/// whether to salvage the partial result - per the "well-formed frames
/// before the error are still returned" propagation policy.
pub fn parse_all(payload: DecoderBuffer) -> (Vec<Frame>, Option<CodecError>) {
    let mut frames = Vec::new();
    let mut buffer = payload;

    while !buffer.is_empty() {
        match parse_one(buffer) {
            Ok((frame, next)) => {
                frames.push(frame);
                buffer = next;
            }
            Err(error) => {
                tracing::warn!(parsed = frames.len(), kind = ?error.kind, "frame parse stopped early");
                return (frames, Some(error));
            }
        }
    }

    (frames, None)
}

fn parse_one(buffer: DecoderBuffer) -> Result<(Frame, DecoderBuffer), CodecError> {
    let tag = buffer.peek_byte(0)?;

    if tag == padding::TAG {
        let mut length = 0;
        while buffer.peek_byte(length).map(|b| b == padding::TAG).unwrap_or(false) {
            length += 1;
        }
        let buffer = buffer.skip(length)?;
        return Ok((Frame::Padding(Padding { length }), buffer));
    }

    let (tag, buffer) = buffer.decode::<u8>()?;

    match tag {
        ping::TAG => Ok((Frame::Ping(Ping), buffer)),
        ack::TAG | ack::TAG_ECN => {
            let (frame, buffer) = Ack::decode(tag, buffer)?;
            Ok((Frame::Ack(frame), buffer))
        }
        stream::TAG_BASE..=0x0F => {
            let (frame, buffer) = Stream::decode(tag, buffer)?;
            Ok((Frame::Stream(frame), buffer))
        }
        connection_close::TAG_TRANSPORT | connection_close::TAG_APPLICATION => {
            let (frame, buffer) = ConnectionClose::decode(tag, buffer)?;
            Ok((Frame::ConnectionClose(frame), buffer))
        }
        vc_init::TAG => {
            let (frame, buffer) = VcInit::decode(buffer)?;
            Ok((Frame::VcInit(frame), buffer))
        }
        vc_response::TAG => {
            let (frame, buffer) = VcResponse::decode(buffer)?;
            Ok((Frame::VcResponse(frame), buffer))
        }
        vc_ack::TAG => {
            let (frame, buffer) = VcAck::decode(buffer)?;
            Ok((Frame::VcAck(frame), buffer))
        }
        discovery::TAG => {
            let (frame, buffer) = Discovery::decode(buffer)?;
            Ok((Frame::Discovery(frame), buffer))
        }
        heartbeat::TAG => {
            let (frame, buffer) = Heartbeat::decode(buffer)?;
            Ok((Frame::Heartbeat(frame), buffer))
        }
        other => {
            tracing::debug!(frame_type = format_args!("{other:#04x}"), "unsupported frame type");
            Err(CodecError::new(ErrorKind::UnsupportedFrame { frame_type: other }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::varint::VarInt;
    use quicvc_codec::EncoderBuffer;

    #[test]
    fn parses_padding_run_and_ping() {
        let bytes = [0x00, 0x00, 0x00, 0x01];
        let decoder = DecoderBuffer::new(&bytes);
        let (frames, error) = parse_all(decoder);
        assert!(error.is_none());
        assert_eq!(frames.len(), 2);
        assert!(matches!(frames[0], Frame::Padding(Padding { length: 3 })));
        assert!(matches!(frames[1], Frame::Ping(Ping)));
    }

    #[test]
    fn unknown_frame_type_is_rejected_with_partial_progress() {
        let bytes = [0x01, 0xEE];
        let decoder = DecoderBuffer::new(&bytes);
        let (frames, error) = parse_all(decoder);
        assert_eq!(frames.len(), 1);
        assert!(matches!(frames[0], Frame::Ping(Ping)));
        let error = error.unwrap();
        assert_eq!(error.kind, ErrorKind::UnsupportedFrame { frame_type: 0xEE });
    }

    #[test]
    fn round_trips_a_mixed_sequence() {
        let outbound = vec![
            OutboundFrame::Ping(Ping),
            OutboundFrame::Stream(Stream {
                stream_id: VarInt::from_u8(1),
                offset: VarInt::ZERO,
                data: b"hi".as_slice(),
                fin: true,
                explicit_length: false,
            }),
        ];
        let mut buf = [0u8; 64];
        let mut encoder = EncoderBuffer::new(&mut buf);
        for frame in &outbound {
            frame.encode(&mut encoder);
        }

        let decoder = DecoderBuffer::new(encoder.as_slice());
        let (frames, error) = parse_all(decoder);
        assert!(error.is_none());
        assert_eq!(frames.len(), 2);
        match &frames[1] {
            Frame::Stream(frame) => assert_eq!(frame.data.as_less_safe_slice(), b"hi"),
            _ => panic!("expected Stream"),
        }
    }
}
