// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! JSON payload bodies for the VC frames that carry one.
//!
//! Field naming intentionally follows the wire schema exactly rather than a
//! uniform Rust convention - some fields are lower_snake (`device_id`),
//! others are camelCase (`deviceId`, `credentialMicrodata`) because that's
//! what's on the wire. Unknown fields are tolerated on decode; field
//! ordering is never relied upon.

use crate::error::{CodecError, ErrorKind};
use serde::{Deserialize, Serialize};

fn to_bytes<T: Serialize>(value: &T) -> Vec<u8> {
    serde_json::to_vec(value).expect("VC json payloads are always representable")
}

fn from_bytes<'a, T: Deserialize<'a>>(bytes: &'a [u8]) -> Result<T, CodecError> {
    serde_json::from_slice(bytes).map_err(|_| CodecError::new(ErrorKind::InvalidResponseJson))
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Provisioned,
    Authenticated,
    AlreadyOwned,
    Revoked,
    Error,
}

/// `VC_RESPONSE`'s JSON body.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ResponseBody {
    pub status: ResponseStatus,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub device_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
    /// JSON-embedded credential representation. Per the wire tie-break
    /// rule, this is ignored whenever the envelope's own microdata field is
    /// non-empty - the microdata is the canonical form.
    #[serde(
        rename = "credentialMicrodata",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub credential_microdata: Option<String>,
}

impl ResponseBody {
    pub fn encode(&self) -> Vec<u8> {
        to_bytes(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        from_bytes(bytes)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AckStatus {
    Success,
    Failure,
}

/// `VC_ACK`'s JSON body. `type` is redundant with the frame's own tag byte
/// but preserved for diagnostic parsing.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct AckBody {
    #[serde(rename = "type")]
    pub frame_type: u8,
    pub device_id: String,
    pub status: AckStatus,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub message: Option<String>,
}

impl AckBody {
    pub fn encode(&self) -> Vec<u8> {
        to_bytes(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        from_bytes(bytes)
    }
}

/// `DISCOVERY`'s JSON body.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryBody {
    #[serde(rename = "type")]
    pub frame_type: u8,
    #[serde(rename = "deviceId")]
    pub device_id: String,
    #[serde(rename = "deviceType")]
    pub device_type: u8,
    /// `0` = unclaimed, `1` = owned.
    pub ownership: u8,
    pub capabilities: String,
    pub timestamp: u64,
}

impl DiscoveryBody {
    pub fn encode(&self) -> Vec<u8> {
        to_bytes(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        from_bytes(bytes)
    }
}

/// `HEARTBEAT`'s JSON body.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct HeartbeatBody {
    #[serde(rename = "type")]
    pub frame_type: u8,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub device_id: Option<String>,
    pub timestamp: u64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub status: Option<String>,
}

impl HeartbeatBody {
    pub fn encode(&self) -> Vec<u8> {
        to_bytes(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        from_bytes(bytes)
    }
}
