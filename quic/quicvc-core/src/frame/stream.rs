// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! STREAM (0x08-0x0F): the low three type bits are flags.
//!
//! `type | streamId:varint | (offset:varint if OFF) | (length:varint if
//! LEN) | data`. When LEN is absent, `data` runs to the end of the enclosing
//! payload - so a LEN=0 stream frame must be the last frame in the packet.

use crate::{error::CodecError, varint::VarInt};
use quicvc_codec::{DecoderBuffer, Encoder};

pub const TAG_BASE: u8 = 0x08;
const FIN_BIT: u8 = 0x01;
const LEN_BIT: u8 = 0x02;
const OFF_BIT: u8 = 0x04;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Stream<Data = Vec<u8>> {
    pub stream_id: VarInt,
    pub offset: VarInt,
    pub data: Data,
    pub fin: bool,
    /// Whether the encoder should write an explicit length prefix. When
    /// `false`, `data` is written with no length and must be the frame that
    /// ends the packet's payload.
    pub explicit_length: bool,
}

impl Stream<&[u8]> {
    pub fn tag(&self) -> u8 {
        tag_for(self.offset.as_u64() != 0, self.explicit_length, self.fin)
    }

    pub fn encode<E: Encoder>(&self, encoder: &mut E) {
        encoder.encode(&self.tag());
        encoder.encode(&self.stream_id);
        if self.offset.as_u64() != 0 {
            encoder.encode(&self.offset);
        }
        if self.explicit_length {
            encoder.encode(&VarInt::new(self.data.len() as u64).expect("data length fits"));
        }
        encoder.write_slice(self.data);
    }
}

fn tag_for(off: bool, len: bool, fin: bool) -> u8 {
    let mut tag = TAG_BASE;
    if fin {
        tag |= FIN_BIT;
    }
    if len {
        tag |= LEN_BIT;
    }
    if off {
        tag |= OFF_BIT;
    }
    tag
}

impl<'a> Stream<DecoderBuffer<'a>> {
    /// Decodes the frame body; `tag`'s low three bits select which fields
    /// are present. When LEN is absent, the stream data is taken to be
    /// everything left in `buffer` (the caller hands in the enclosing
    /// payload's undecoded tail).
    pub fn decode(
        tag: u8,
        buffer: DecoderBuffer<'a>,
    ) -> Result<(Self, DecoderBuffer<'a>), CodecError> {
        let fin = tag & FIN_BIT != 0;
        let has_len = tag & LEN_BIT != 0;
        let has_off = tag & OFF_BIT != 0;

        let (stream_id, buffer) = buffer.decode::<VarInt>()?;
        let (offset, buffer) = if has_off {
            buffer.decode::<VarInt>()?
        } else {
            (VarInt::ZERO, buffer)
        };

        let (data, buffer) = if has_len {
            let (len, buffer) = buffer.decode::<VarInt>()?;
            let len: usize = len
                .try_into()
                .map_err(|_| CodecError::new(crate::error::ErrorKind::ShortBuffer))?;
            if len > buffer.len() {
                return Err(CodecError::new(crate::error::ErrorKind::InvalidStreamFlags));
            }
            buffer.decode_slice(len)?
        } else {
            let remaining = buffer.len();
            buffer.decode_slice(remaining)?
        };

        Ok((
            Self {
                stream_id,
                offset,
                data,
                fin,
                explicit_length: has_len,
            },
            buffer,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quicvc_codec::EncoderBuffer;

    #[test]
    fn round_trips_offset_and_fin() {
        let frame = Stream {
            stream_id: VarInt::from_u8(4),
            offset: VarInt::new(100).unwrap(),
            data: &[0x61, 0x62, 0x63][..],
            fin: true,
            explicit_length: true,
        };
        assert_eq!(frame.tag(), 0x0F);

        let mut buf = [0u8; 16];
        let mut encoder = EncoderBuffer::new(&mut buf);
        frame.encode(&mut encoder);
        assert_eq!(
            encoder.as_slice(),
            &[0x0F, 0x04, 0x40, 0x64, 0x03, 0x61, 0x62, 0x63]
        );

        let decoder = DecoderBuffer::new(encoder.as_slice());
        let (tag, decoder) = decoder.decode::<u8>().unwrap();
        let (decoded, remaining) = Stream::decode(tag, decoder).unwrap();
        assert!(remaining.is_empty());
        assert_eq!(decoded.stream_id, frame.stream_id);
        assert_eq!(decoded.offset, frame.offset);
        assert_eq!(decoded.data.as_less_safe_slice(), frame.data);
        assert!(decoded.fin);
    }

    #[test]
    fn len_absent_runs_to_end_of_payload() {
        let frame = Stream {
            stream_id: VarInt::from_u8(1),
            offset: VarInt::ZERO,
            data: &[0xAA, 0xBB][..],
            fin: false,
            explicit_length: false,
        };
        let mut buf = [0u8; 16];
        let mut encoder = EncoderBuffer::new(&mut buf);
        frame.encode(&mut encoder);

        let decoder = DecoderBuffer::new(encoder.as_slice());
        let (tag, decoder) = decoder.decode::<u8>().unwrap();
        let (decoded, remaining) = Stream::decode(tag, decoder).unwrap();
        assert!(remaining.is_empty());
        assert_eq!(decoded.data.as_less_safe_slice(), frame.data);
        assert!(!decoded.explicit_length);
    }

    #[test]
    fn empty_data_round_trips_with_and_without_len() {
        for explicit_length in [true, false] {
            let frame = Stream {
                stream_id: VarInt::from_u8(2),
                offset: VarInt::ZERO,
                data: &[][..],
                fin: false,
                explicit_length,
            };
            let mut buf = [0u8; 16];
            let mut encoder = EncoderBuffer::new(&mut buf);
            frame.encode(&mut encoder);
            let decoder = DecoderBuffer::new(encoder.as_slice());
            let (tag, decoder) = decoder.decode::<u8>().unwrap();
            let (decoded, remaining) = Stream::decode(tag, decoder).unwrap();
            assert!(remaining.is_empty());
            assert!(decoded.data.is_empty());
        }
    }

    #[test]
    fn len_declared_longer_than_payload_is_invalid_stream_flags() {
        // LEN bit set, length varint says 10 bytes follow, but only 2 remain.
        let bytes = [TAG_BASE | LEN_BIT, 0x01, 0x0A, 0xAA, 0xBB];
        let decoder = DecoderBuffer::new(&bytes);
        let (tag, decoder) = decoder.decode::<u8>().unwrap();
        let error = Stream::decode(tag, decoder).unwrap_err();
        assert_eq!(error.kind, crate::error::ErrorKind::InvalidStreamFlags);
    }
}
