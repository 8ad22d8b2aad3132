// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! The VC handshake state machine: consumes parsed VC frames and advances an
//! endpoint through `Idle -> Initiating -> AwaitingResponse -> Provisioned ->
//! Authenticated -> Closed`, with a sibling `Failed` reachable from any
//! non-terminal state.
//!
//! The state machine is a pure step function: every method takes the
//! session plus whatever host hooks it needs for that step
//! ([`CredentialVerifier`], [`AdmissionPolicy`]) and returns the frames the
//! caller should send next. Nothing here touches a socket or a clock other
//! than the `now` value [`HandshakeSession::tick`] is handed.

mod session;

pub use session::{
    Event, FailReason, HandshakeSession, Outcome, Role, State,
};
