// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! The QUIC-VC wire protocol codec: packet headers, frames, and the VC
//! handshake state machine layered on top of them.
//!
//! Congestion control, loss recovery, crypto record protection, transport
//! delivery, and application-level stream dispatch are all out of scope -
//! this crate is a pure byte-in/byte-out codec plus the handshake logic
//! that decides what to send next given what was just parsed.

pub mod connection_id;
pub mod credential;
pub mod datagram;
pub mod error;
pub mod frame;
pub mod handshake;
pub mod json;
pub mod packet;
pub mod varint;

pub use connection_id::{ConnectionId, RandomSource};
pub use credential::{AdmissionDecision, AdmissionPolicy, CredentialMicrodata, CredentialVerifier};
pub use error::{CodecError, ErrorKind, HandshakeError};
pub use handshake::{Event, FailReason, HandshakeSession, Outcome, Role, State};
pub use varint::VarInt;
