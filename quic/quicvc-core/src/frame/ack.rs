// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! ACK (0x02) and ACK_ECN (0x03).
//!
//! `type | largestAck:varint | ackDelay:varint | ackRangeCount:varint |
//! firstAckRange:varint | (gap:varint, length:varint)^ackRangeCount`.
//!
//! ACK_ECN carries three additional ECN counters, which this profile doesn't
//! use for congestion signaling but retains opaquely so a relay can forward
//! them unchanged.

use crate::{
    error::{CodecError, ErrorKind},
    varint::VarInt,
};
use quicvc_codec::{DecoderBuffer, Encoder};

pub const TAG: u8 = 0x02;
pub const TAG_ECN: u8 = 0x03;

/// One `(gap, length)` pair, as laid out on the wire: `gap` packets were
/// skipped, then `length` packets below that were acknowledged.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AckRange {
    pub gap: VarInt,
    pub length: VarInt,
}

/// ECN counters carried by an ACK_ECN frame. Opaque to this profile.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EcnCounts {
    pub ect0: VarInt,
    pub ect1: VarInt,
    pub ce: VarInt,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Ack {
    pub largest_ack: VarInt,
    pub ack_delay: VarInt,
    pub first_ack_range: VarInt,
    /// In wire order: highest acknowledged range first.
    pub ranges: Vec<AckRange>,
    pub ecn_counts: Option<EcnCounts>,
}

impl Ack {
    pub fn tag(&self) -> u8 {
        if self.ecn_counts.is_some() {
            TAG_ECN
        } else {
            TAG
        }
    }

    /// Checks the structural invariant: `largest_ack >= first_ack_range`,
    /// and each subsequent range's `gap + length` stays within the
    /// preceding range's low endpoint.
    pub fn validate(&self) -> Result<(), CodecError> {
        if self.largest_ack.as_u64() < self.first_ack_range.as_u64() {
            return Err(CodecError::new(ErrorKind::InvalidAckRange));
        }
        let mut low = self
            .largest_ack
            .as_u64()
            .saturating_sub(self.first_ack_range.as_u64());
        for range in &self.ranges {
            let consumed = range.gap.as_u64().saturating_add(range.length.as_u64());
            if consumed > low {
                return Err(CodecError::new(ErrorKind::InvalidAckRange));
            }
            low = low.saturating_sub(consumed);
        }
        Ok(())
    }

    pub fn encode<E: Encoder>(&self, encoder: &mut E) {
        encoder.encode(&self.tag());
        encoder.encode(&self.largest_ack);
        encoder.encode(&self.ack_delay);
        encoder.encode(&VarInt::new(self.ranges.len() as u64).expect("range count fits"));
        encoder.encode(&self.first_ack_range);
        for range in &self.ranges {
            encoder.encode(&range.gap);
            encoder.encode(&range.length);
        }
        if let Some(ecn) = &self.ecn_counts {
            encoder.encode(&ecn.ect0);
            encoder.encode(&ecn.ect1);
            encoder.encode(&ecn.ce);
        }
    }

    /// Decodes the frame body; `tag` (already consumed by the caller)
    /// selects whether trailing ECN counters are present.
    pub fn decode(tag: u8, buffer: DecoderBuffer) -> Result<(Self, DecoderBuffer), CodecError> {
        let (largest_ack, buffer) = buffer.decode::<VarInt>()?;
        let (ack_delay, buffer) = buffer.decode::<VarInt>()?;
        let (range_count, buffer) = buffer.decode::<VarInt>()?;
        let (first_ack_range, mut buffer) = buffer.decode::<VarInt>()?;

        let mut ranges = Vec::with_capacity(range_count.as_u64() as usize);
        for _ in 0..range_count.as_u64() {
            let (gap, next) = buffer.decode::<VarInt>()?;
            let (length, next) = next.decode::<VarInt>()?;
            ranges.push(AckRange { gap, length });
            buffer = next;
        }

        let (ecn_counts, buffer) = if tag == TAG_ECN {
            let (ect0, buffer) = buffer.decode::<VarInt>()?;
            let (ect1, buffer) = buffer.decode::<VarInt>()?;
            let (ce, buffer) = buffer.decode::<VarInt>()?;
            (Some(EcnCounts { ect0, ect1, ce }), buffer)
        } else {
            (None, buffer)
        };

        let ack = Self {
            largest_ack,
            ack_delay,
            first_ack_range,
            ranges,
            ecn_counts,
        };
        ack.validate()?;
        Ok((ack, buffer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quicvc_codec::EncoderBuffer;

    fn sample() -> Ack {
        Ack {
            largest_ack: VarInt::new(100).unwrap(),
            ack_delay: VarInt::new(5).unwrap(),
            first_ack_range: VarInt::new(10).unwrap(),
            ranges: vec![AckRange {
                gap: VarInt::new(2).unwrap(),
                length: VarInt::new(3).unwrap(),
            }],
            ecn_counts: None,
        }
    }

    #[test]
    fn round_trips() {
        let ack = sample();
        let mut buf = [0u8; 64];
        let mut encoder = EncoderBuffer::new(&mut buf);
        ack.encode(&mut encoder);

        let decoder = DecoderBuffer::new(encoder.as_slice());
        let (tag, decoder) = decoder.decode::<u8>().unwrap();
        assert_eq!(tag, TAG);
        let (decoded, remaining) = Ack::decode(tag, decoder).unwrap();
        assert_eq!(decoded, ack);
        assert!(remaining.is_empty());
    }

    #[test]
    fn ack_ecn_round_trips_and_is_treated_identically() {
        let ack = Ack {
            ecn_counts: Some(EcnCounts {
                ect0: VarInt::new(1).unwrap(),
                ect1: VarInt::new(2).unwrap(),
                ce: VarInt::new(3).unwrap(),
            }),
            ..sample()
        };
        assert_eq!(ack.tag(), TAG_ECN);
        let mut buf = [0u8; 64];
        let mut encoder = EncoderBuffer::new(&mut buf);
        ack.encode(&mut encoder);

        let decoder = DecoderBuffer::new(encoder.as_slice());
        let (tag, decoder) = decoder.decode::<u8>().unwrap();
        let (decoded, _) = Ack::decode(tag, decoder).unwrap();
        assert_eq!(decoded, ack);
    }

    #[test]
    fn rejects_range_exceeding_preceding_low_endpoint() {
        let ack = Ack {
            largest_ack: VarInt::new(10).unwrap(),
            first_ack_range: VarInt::new(5).unwrap(),
            ranges: vec![AckRange {
                gap: VarInt::new(10).unwrap(),
                length: VarInt::new(10).unwrap(),
            }],
            ..sample()
        };
        assert_eq!(ack.validate().unwrap_err().kind, ErrorKind::InvalidAckRange);
    }

    #[test]
    fn rejects_largest_ack_below_first_range() {
        let ack = Ack {
            largest_ack: VarInt::new(1).unwrap(),
            first_ack_range: VarInt::new(5).unwrap(),
            ranges: vec![],
            ..sample()
        };
        assert_eq!(ack.validate().unwrap_err().kind, ErrorKind::InvalidAckRange);
    }
}
