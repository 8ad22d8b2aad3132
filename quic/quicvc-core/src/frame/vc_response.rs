// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! VC_RESPONSE (0xF1): the one VC frame with a non-uniform envelope -
//! `[type:1][mdLen:u16 BE][md[mdLen]][respLen:u16 BE][respJson[respLen]]`.
//! `mdLen` may be zero (no credential returned).

use crate::{credential::CredentialMicrodata, error::CodecError, json::ResponseBody};
use quicvc_codec::{DecoderBuffer, Encoder};

pub const TAG: u8 = 0xF1;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VcResponse {
    pub credential_microdata: Option<CredentialMicrodata>,
    pub response: ResponseBody,
}

impl VcResponse {
    pub fn encode<E: Encoder>(&self, encoder: &mut E) {
        encoder.encode(&TAG);
        let md = self
            .credential_microdata
            .as_ref()
            .map(CredentialMicrodata::as_bytes)
            .unwrap_or(&[]);
        encoder.encode(&(md.len() as u16));
        encoder.write_slice(md);

        let resp = self.response.encode();
        encoder.encode(&(resp.len() as u16));
        encoder.write_slice(&resp);
    }

    pub fn decode(buffer: DecoderBuffer) -> Result<(Self, DecoderBuffer), CodecError> {
        let (md_len, buffer) = buffer.decode::<u16>()?;
        let (md_slice, buffer) = buffer.decode_slice(md_len as usize)?;
        let credential_microdata = if md_len == 0 {
            None
        } else {
            Some(CredentialMicrodata::parse(md_slice.as_less_safe_slice())?)
        };

        let (resp_len, buffer) = buffer.decode::<u16>()?;
        let (resp_slice, buffer) = buffer.decode_slice(resp_len as usize)?;
        let response = ResponseBody::decode(resp_slice.as_less_safe_slice())?;

        Ok((
            Self {
                credential_microdata,
                response,
            },
            buffer,
        ))
    }
}
