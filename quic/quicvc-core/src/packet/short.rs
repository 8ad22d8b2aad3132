// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Short-header (1-RTT) packets.
//!
//! The DCID length isn't carried on the wire; both endpoints agree on it out
//! of band (a connection-level configuration constant, default 8 bytes).

use crate::{
    connection_id::ConnectionId,
    error::{CodecError, ErrorKind},
    packet::number::{PacketNumber, PacketNumberLen},
};
use quicvc_codec::{DecoderBuffer, Encoder};

pub const DEFAULT_DCID_LEN: usize = 8;

const SHORT_HEADER_FORM: u8 = 0b0000_0000;
const FIXED_BIT: u8 = 0b0100_0000;
const SPIN_BIT: u8 = 0b0010_0000;
const KEY_PHASE_BIT: u8 = 0b0000_0100;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum KeyPhase {
    Zero,
    One,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ShortHeader<Payload = ()> {
    pub dcid: ConnectionId,
    pub spin_bit: bool,
    pub key_phase: KeyPhase,
    pub packet_number: PacketNumber,
    pub packet_number_len: PacketNumberLen,
    pub payload: Payload,
}

impl ShortHeader<()> {
    pub fn encode<E: Encoder>(&self, payload: &[u8], encoder: &mut E) {
        let mut first_byte = SHORT_HEADER_FORM | FIXED_BIT | self.packet_number_len.to_wire();
        if self.spin_bit {
            first_byte |= SPIN_BIT;
        }
        if let KeyPhase::One = self.key_phase {
            first_byte |= KEY_PHASE_BIT;
        }
        encoder.encode(&first_byte);
        encoder.write_slice(self.dcid.as_bytes());
        self.packet_number.encode(self.packet_number_len, encoder);
        encoder.write_slice(payload);
    }
}

impl<'a> ShortHeader<DecoderBuffer<'a>> {
    /// Parses the remainder of the datagram as a short header; `dcid_len` is
    /// supplied by the caller's connection configuration, and everything
    /// after the packet number is treated as payload.
    pub fn decode(
        buffer: DecoderBuffer<'a>,
        dcid_len: usize,
    ) -> Result<(Self, DecoderBuffer<'a>), CodecError> {
        let (first_byte, buffer) = buffer.decode::<u8>()?;
        if first_byte & 0b1000_0000 != 0 {
            // long-header form bit set; caller dispatched incorrectly
            return Err(CodecError::new(ErrorKind::FixedBitClear));
        }
        if first_byte & FIXED_BIT == 0 {
            return Err(CodecError::new(ErrorKind::FixedBitClear));
        }

        let (dcid_slice, buffer) = buffer.decode_slice(dcid_len)?;
        let dcid = ConnectionId::from(dcid_slice.as_less_safe_slice().to_vec());

        let packet_number_len = PacketNumberLen::from_wire(first_byte & 0b11);
        let (packet_number, buffer) =
            PacketNumber::decode(buffer, packet_number_len).map_err(CodecError::from)?;

        let spin_bit = first_byte & SPIN_BIT != 0;
        let key_phase = if first_byte & KEY_PHASE_BIT != 0 {
            KeyPhase::One
        } else {
            KeyPhase::Zero
        };

        let payload = buffer.peek();
        let buffer = buffer.skip(buffer.len())?;

        Ok((
            Self {
                dcid,
                spin_bit,
                key_phase,
                packet_number,
                packet_number_len,
                payload,
            },
            buffer,
        ))
    }
}
