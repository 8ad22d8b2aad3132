// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Packet header codec: long-header (handshake-era) and short-header
//! (1-RTT) packets.

pub mod long;
pub mod number;
pub mod short;

pub use long::{LongHeader, LongHeaderPacket, LongPacketType, VersionNegotiation, QUIC_VERSION_1};
pub use number::{PacketNumber, PacketNumberLen};
pub use short::{KeyPhase, ShortHeader, DEFAULT_DCID_LEN};

use crate::error::CodecError;
use quicvc_codec::DecoderBuffer;

/// A parsed datagram header: either a long-header packet (possibly a
/// Version Negotiation stand-in), or a short-header 1-RTT packet.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Header<'a> {
    Long(LongHeader<DecoderBuffer<'a>>),
    VersionNegotiation(VersionNegotiation),
    Short(ShortHeader<DecoderBuffer<'a>>),
}

impl<'a> Header<'a> {
    /// Dispatches on the first byte's form bit (bit 7): long-header packets
    /// set it, short-header packets clear it.
    pub fn decode(
        buffer: DecoderBuffer<'a>,
        short_header_dcid_len: usize,
    ) -> Result<(Self, DecoderBuffer<'a>), CodecError> {
        let first_byte = buffer.peek_byte(0)?;
        if first_byte & 0b1000_0000 != 0 {
            let (packet, buffer) = LongHeaderPacket::decode(buffer)?;
            let header = match packet {
                LongHeaderPacket::Header(header) => Self::Long(header),
                LongHeaderPacket::VersionNegotiation(vn) => Self::VersionNegotiation(vn),
            };
            Ok((header, buffer))
        } else {
            let (header, buffer) = ShortHeader::decode(buffer, short_header_dcid_len)?;
            Ok((Self::Short(header), buffer))
        }
    }

    pub fn destination_connection_id(&self) -> &crate::connection_id::ConnectionId {
        match self {
            Self::Long(header) => &header.dcid,
            Self::VersionNegotiation(vn) => &vn.dcid,
            Self::Short(header) => &header.dcid,
        }
    }

    pub fn payload(&self) -> Option<DecoderBuffer<'a>> {
        match self {
            Self::Long(header) => Some(header.payload),
            Self::VersionNegotiation(_) => None,
            Self::Short(header) => Some(header.payload),
        }
    }
}
