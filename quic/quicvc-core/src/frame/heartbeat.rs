// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! HEARTBEAT (0xF4): `[type:1][length:u16 BE][payload[length]]`, payload a
//! JSON `{type, device_id?, timestamp, status?}` object. `status` is opaque
//! to this layer.

use crate::{error::CodecError, json::HeartbeatBody};
use quicvc_codec::{DecoderBuffer, Encoder};

pub const TAG: u8 = 0xF4;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Heartbeat {
    pub device_id: Option<String>,
    pub timestamp: u64,
    pub status: Option<String>,
}

impl Heartbeat {
    fn body(&self) -> HeartbeatBody {
        HeartbeatBody {
            frame_type: TAG,
            device_id: self.device_id.clone(),
            timestamp: self.timestamp,
            status: self.status.clone(),
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
        let body = HeartbeatBody::decode(payload.as_less_safe_slice())?;
        Ok((
            Self {
                device_id: body.device_id,
                timestamp: body.timestamp,
                status: body.status,
            },
            buffer,
        ))
    }
}
