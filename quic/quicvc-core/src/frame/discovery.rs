// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! DISCOVERY (0xF3): `[type:1][length:u16 BE][payload[length]]`, payload a
//! broadcast-shaped JSON object. Not acknowledged at this layer.

use crate::{error::CodecError, json::DiscoveryBody};
use quicvc_codec::{DecoderBuffer, Encoder};

pub const TAG: u8 = 0xF3;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Discovery {
    pub device_id: String,
    pub device_type: u8,
    /// `0` = unclaimed, `1` = owned.
    pub ownership: u8,
    pub capabilities: String,
    pub timestamp: u64,
}

impl Discovery {
    fn body(&self) -> DiscoveryBody {
        DiscoveryBody {
            frame_type: TAG,
            device_id: self.device_id.clone(),
            device_type: self.device_type,
            ownership: self.ownership,
            capabilities: self.capabilities.clone(),
            timestamp: self.timestamp,
        }
    }

    pub fn encode<E: Encoder>(&self, encoder: &mut E) {
        let payload = self.body().encode();
        encoder.encode(&TAG);
        encoder.encode(&(payload.len() as u16));
        encoder.write_slice(&payload);
    }

    pub fn decode(buffer: DecoderBuffer) -> Result<(Self, DecoderBuffer), CodecError> {
        let (length, buffer) = buffer.decode::<u16>()?;
        let (payload, buffer) = buffer.decode_slice(length as usize)?;
        // A zero-length payload is legal at the envelope level; it simply
        // fails to parse as the required JSON object below.
        let body = DiscoveryBody::decode(payload.as_less_safe_slice())?;
        Ok((
            Self {
                device_id: body.device_id,
                device_type: body.device_type,
                ownership: body.ownership,
                capabilities: body.capabilities,
                timestamp: body.timestamp,
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
    fn round_trips() {
        let frame = Discovery {
            device_id: "dev-7".to_owned(),
            device_type: 1,
            ownership: 0,
            capabilities: "chat,pairing".to_owned(),
            timestamp: 1_700_000_000,
        };
        let mut buf = [0u8; 256];
        let mut encoder = EncoderBuffer::new(&mut buf);
        frame.encode(&mut encoder);

        let decoder = DecoderBuffer::new(encoder.as_slice());
        let (tag, decoder) = decoder.decode::<u8>().unwrap();
        assert_eq!(tag, TAG);
        let (decoded, remaining) = Discovery::decode(decoder).unwrap();
        assert!(remaining.is_empty());
        assert_eq!(decoded, frame);
    }
}
