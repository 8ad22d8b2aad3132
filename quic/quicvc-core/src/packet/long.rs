// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Long-header packets: INITIAL, 0-RTT, HANDSHAKE, RETRY, and Version
//! Negotiation (version `0`).

use crate::{
    connection_id::{ConnectionId, MAX_CONNECTION_ID_LEN},
    error::{CodecError, ErrorKind},
    packet::number::{PacketNumber, PacketNumberLen},
};
use quicvc_codec::{DecoderBuffer, Encoder};

pub const QUIC_VERSION_1: u32 = 0x0000_0001;

/// Bit 7 (always set) | bit 6 fixed bit (always set) of a long-header first
/// byte.
const LONG_HEADER_FORM: u8 = 0b1000_0000;
const FIXED_BIT: u8 = 0b0100_0000;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LongPacketType {
    Initial,
    ZeroRtt,
    Handshake,
    Retry,
}

impl LongPacketType {
    fn from_wire(bits: u8) -> Self {
        match bits {
            0b00 => Self::Initial,
            0b01 => Self::ZeroRtt,
            0b10 => Self::Handshake,
            _ => Self::Retry,
        }
    }

    fn to_wire(self) -> u8 {
        match self {
            Self::Initial => 0b00,
            Self::ZeroRtt => 0b01,
            Self::Handshake => 0b10,
            Self::Retry => 0b11,
        }
    }
}

/// A parsed or to-be-encoded long header, plus (on decode) the payload
/// slice it framed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LongHeader<Payload = ()> {
    pub packet_type: LongPacketType,
    pub version: u32,
    pub dcid: ConnectionId,
    pub scid: ConnectionId,
    /// INITIAL-only; `None` for every other long-header type.
    pub token: Option<Vec<u8>>,
    pub packet_number: PacketNumber,
    pub packet_number_len: PacketNumberLen,
    pub payload: Payload,
}

/// Returned in place of a [`LongHeader`] when `version == 0`: the codec
/// parses dcid/scid but does not interpret the rest of the datagram.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VersionNegotiation {
    pub dcid: ConnectionId,
    pub scid: ConnectionId,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LongHeaderPacket<'a> {
    Header(LongHeader<DecoderBuffer<'a>>),
    VersionNegotiation(VersionNegotiation),
}

impl LongHeader<()> {
    /// Encodes the header followed by `payload`. `length` (the varint field
    /// covering packet-number-length + payload) is computed here, not passed
    /// in, so callers can't construct an inconsistent header.
    pub fn encode<E: Encoder>(&self, payload: &[u8], encoder: &mut E) {
        let first_byte = LONG_HEADER_FORM
            | FIXED_BIT
            | (self.packet_type.to_wire() << 4)
            | self.packet_number_len.to_wire();
        encoder.encode(&first_byte);
        encoder.encode(&self.version);
        encoder.encode(&(self.dcid.len() as u8));
        encoder.write_slice(self.dcid.as_bytes());
        encoder.encode(&(self.scid.len() as u8));
        encoder.write_slice(self.scid.as_bytes());

        if let LongPacketType::Initial = self.packet_type {
            let token = self.token.as_deref().unwrap_or(&[]);
            let token_len = crate::varint::VarInt::new(token.len() as u64)
                .expect("token length fits in a varint");
            encoder.encode(&token_len);
            encoder.write_slice(token);
        }

        let length = crate::varint::VarInt::new(
            self.packet_number_len.as_bytes() as u64 + payload.len() as u64,
        )
        .expect("length fits in a varint");
        encoder.encode(&length);
        self.packet_number.encode(self.packet_number_len, encoder);
        encoder.write_slice(payload);
    }
}

impl<'a> LongHeaderPacket<'a> {
    pub fn decode(buffer: DecoderBuffer<'a>) -> Result<(Self, DecoderBuffer<'a>), CodecError> {
        let (first_byte, buffer) = buffer.decode::<u8>()?;
        if first_byte & LONG_HEADER_FORM == 0 {
            // caller should not have dispatched a short-header packet here
            return Err(CodecError::new(ErrorKind::FixedBitClear));
        }
        if first_byte & FIXED_BIT == 0 {
            return Err(CodecError::new(ErrorKind::FixedBitClear));
        }

        let (version, buffer) = buffer.decode::<u32>()?;
        let (dcid_len, buffer) = buffer.decode::<u8>()?;
        if dcid_len as usize > MAX_CONNECTION_ID_LEN {
            return Err(CodecError::new(ErrorKind::ConnectionIdTooLong));
        }
        let (dcid_slice, buffer) = buffer.decode_slice(dcid_len as usize)?;
        let dcid = ConnectionId::from(dcid_slice.as_less_safe_slice().to_vec());

        let (scid_len, buffer) = buffer.decode::<u8>()?;
        if scid_len as usize > MAX_CONNECTION_ID_LEN {
            return Err(CodecError::new(ErrorKind::ConnectionIdTooLong));
        }
        let (scid_slice, buffer) = buffer.decode_slice(scid_len as usize)?;
        let scid = ConnectionId::from(scid_slice.as_less_safe_slice().to_vec());

        if version == 0 {
            return Ok((
                Self::VersionNegotiation(VersionNegotiation { dcid, scid }),
                buffer,
            ));
        }

        let packet_type = LongPacketType::from_wire((first_byte >> 4) & 0b11);
        let packet_number_len = PacketNumberLen::from_wire(first_byte & 0b11);

        let (token, buffer) = if let LongPacketType::Initial = packet_type {
            let (token_len, buffer) = buffer.decode::<crate::varint::VarInt>()?;
            let token_len: usize = token_len
                .try_into()
                .map_err(|_| CodecError::new(ErrorKind::ShortBuffer))?;
            let (token_slice, buffer) = buffer.decode_slice(token_len)?;
            (Some(token_slice.as_less_safe_slice().to_vec()), buffer)
        } else {
            (None, buffer)
        };

        let (length, buffer) = buffer.decode::<crate::varint::VarInt>()?;
        let length: usize = length
            .try_into()
            .map_err(|_| CodecError::new(ErrorKind::ShortBuffer))?;
        let pn_width = packet_number_len.as_bytes() as usize;
        if length < pn_width {
            return Err(CodecError::new(ErrorKind::ShortBuffer));
        }
        let payload_len = length - pn_width;

        let (packet_number, buffer) =
            PacketNumber::decode(buffer, packet_number_len).map_err(CodecError::from)?;
        let (payload, buffer) = buffer.decode_slice(payload_len)?;

        Ok((
            Self::Header(LongHeader {
                packet_type,
                version,
                dcid,
                scid,
                token,
                packet_number,
                packet_number_len,
                payload,
            }),
            buffer,
        ))
    }
}
