// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! VC_ACK (0xF2): `[type:1][length:u16 BE][payload[length]]`, payload a JSON
//! `{type, device_id, status, message?}` object.

use crate::{
    error::CodecError,
    json::{AckBody, AckStatus},
};
use quicvc_codec::{DecoderBuffer, Encoder};

pub const TAG: u8 = 0xF2;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VcAck {
    pub device_id: String,
    pub status: AckStatus,
    pub message: Option<String>,
}

impl VcAck {
    fn body(&self) -> AckBody {
        AckBody {
            frame_type: TAG,
            device_id: self.device_id.clone(),
            status: self.status.clone(),
            message: self.message.clone(),
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
        let body = AckBody::decode(payload.as_less_safe_slice())?;
        Ok((
            Self {
                device_id: body.device_id,
                status: body.status,
                message: body.message,
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
    fn round_trips_and_embeds_tag_as_json_type() {
        let frame = VcAck {
            device_id: "dev-7".to_owned(),
            status: AckStatus::Success,
            message: None,
        };
        let mut buf = [0u8; 128];
        let mut encoder = EncoderBuffer::new(&mut buf);
        frame.encode(&mut encoder);

        let json = String::from_utf8(encoder.as_slice()[3..].to_vec()).unwrap();
        assert!(json.contains(&format!("\"type\":{}", TAG)));

        let decoder = DecoderBuffer::new(encoder.as_slice());
        let (tag, decoder) = decoder.decode::<u8>().unwrap();
        assert_eq!(tag, TAG);
        let (decoded, remaining) = VcAck::decode(decoder).unwrap();
        assert!(remaining.is_empty());
        assert_eq!(decoded, frame);
    }
}
