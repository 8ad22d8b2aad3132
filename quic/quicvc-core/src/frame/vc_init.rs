// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! VC_INIT (0xF0): `[type:1][length:u16 BE][payload[length]]`, payload a
//! non-empty credential microdata document.

use crate::{
    credential::CredentialMicrodata,
    error::{CodecError, ErrorKind},
};
use quicvc_codec::{DecoderBuffer, Encoder};

pub const TAG: u8 = 0xF0;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VcInit {
    pub credential_microdata: CredentialMicrodata,
}

impl VcInit {
    pub fn encode<E: Encoder>(&self, encoder: &mut E) {
        let bytes = self.credential_microdata.as_bytes();
        encoder.encode(&TAG);
        encoder.encode(&(bytes.len() as u16));
        encoder.write_slice(bytes);
    }

    pub fn decode(buffer: DecoderBuffer) -> Result<(Self, DecoderBuffer), CodecError> {
        let (length, buffer) = buffer.decode::<u16>()?;
        if length == 0 {
            return Err(CodecError::new(ErrorKind::InvalidCredentialMicrodata));
        }
        let (payload, buffer) = buffer.decode_slice(length as usize)?;
        let credential_microdata = CredentialMicrodata::parse(payload.as_less_safe_slice())?;
        Ok((Self { credential_microdata }, buffer))
    }
}
