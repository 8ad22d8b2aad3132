// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Packet-number length: the on-wire width selector carried in the low two
//! bits of a header's first byte, and the truncated big-endian encoding of
//! the packet number itself.

use crate::error::{CodecError, ErrorKind};
use quicvc_codec::{DecoderBuffer, DecoderResult, Encoder};

/// The number of bytes a packet number occupies on the wire, in `[1, 4]`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PacketNumberLen(u8);

impl PacketNumberLen {
    pub fn new(bytes: u8) -> Result<Self, CodecError> {
        if (1..=4).contains(&bytes) {
            Ok(Self(bytes))
        } else {
            Err(CodecError::new(ErrorKind::InvalidPacketNumberLength))
        }
    }

    /// Decodes from the two-bit field stored in a header's first byte
    /// (`field` is already shifted down to `[0, 3]`).
    pub fn from_wire(field: u8) -> Self {
        Self(field + 1)
    }

    /// The two-bit field value to store in a header's first byte.
    pub fn to_wire(self) -> u8 {
        self.0 - 1
    }

    pub fn as_bytes(self) -> u8 {
        self.0
    }
}

/// A packet number: a monotonically increasing counter in `[0, 2^62 - 1]`,
/// truncated to its header's declared width on the wire.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PacketNumber(u64);

impl PacketNumber {
    pub const ZERO: Self = Self(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn encode<E: Encoder>(self, len: PacketNumberLen, encoder: &mut E) {
        let bytes = self.0.to_be_bytes();
        encoder.write_slice(&bytes[8 - len.as_bytes() as usize..]);
    }

    pub fn decode(buffer: DecoderBuffer, len: PacketNumberLen) -> DecoderResult<Self> {
        let width = len.as_bytes() as usize;
        let (slice, buffer) = buffer.decode_slice(width)?;
        let mut bytes = [0u8; 8];
        bytes[8 - width..].copy_from_slice(slice.as_less_safe_slice());
        Ok((Self(u64::from_be_bytes(bytes)), buffer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quicvc_codec::EncoderBuffer;

    #[test]
    fn wire_field_round_trips() {
        for bytes in 1u8..=4 {
            let len = PacketNumberLen::new(bytes).unwrap();
            assert_eq!(PacketNumberLen::from_wire(len.to_wire()), len);
        }
    }

    #[test]
    fn rejects_out_of_range_length() {
        assert!(PacketNumberLen::new(0).is_err());
        assert!(PacketNumberLen::new(5).is_err());
    }

    #[test]
    fn number_round_trips_at_each_length() {
        for bytes in 1u8..=4 {
            let len = PacketNumberLen::new(bytes).unwrap();
            let max = if bytes == 4 {
                u32::MAX as u64
            } else {
                (1u64 << (8 * bytes as u64)) - 1
            };
            let pn = PacketNumber::new(max);
            let mut buf = [0u8; 4];
            let mut encoder = EncoderBuffer::new(&mut buf[..bytes as usize]);
            pn.encode(len, &mut encoder);
            let decoder = DecoderBuffer::new(encoder.as_slice());
            let (decoded, remaining) = PacketNumber::decode(decoder, len).unwrap();
            assert_eq!(decoded, pn);
            assert!(remaining.is_empty());
        }
    }
}
