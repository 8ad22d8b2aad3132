// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::{
    connection_id::ConnectionId,
    credential::{AdmissionDecision, AdmissionPolicy, CredentialMicrodata, CredentialVerifier},
    error::{CodecError, ErrorKind, HandshakeError},
    frame::{vc_ack, vc_init, vc_response, VcAck, VcInit, VcResponse},
    json::{AckStatus, ResponseBody, ResponseStatus},
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Role {
    Initiator,
    Responder,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FailReason {
    CredentialRejected(String),
    Timeout,
    ProtocolViolation(String),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum State {
    Idle,
    Initiating,
    AwaitingResponse,
    /// Responder-only: an admission-policy decision is pending for a
    /// presented, already-verified credential.
    Provisioning,
    Provisioned,
    Authenticated,
    Closed,
    Failed(FailReason),
}

impl State {
    fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Initiating => "Initiating",
            Self::AwaitingResponse => "AwaitingResponse",
            Self::Provisioning => "Provisioning",
            Self::Provisioned => "Provisioned",
            Self::Authenticated => "Authenticated",
            Self::Closed => "Closed",
            Self::Failed(_) => "Failed",
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Failed(_))
    }
}

/// What a step produced: a frame to emit, a completion notice, or nothing.
#[derive(Clone, Debug)]
pub enum Event {
    SendVcInit(VcInit),
    SendVcResponse(VcResponse),
    SendVcAck(VcAck),
    /// `error_code` is one of the on-wire CONNECTION_CLOSE codes from
    /// [`crate::frame::connection_close`].
    SendConnectionClose {
        error_code: u64,
        reason: String,
    },
    Authenticated {
        device_id: Option<String>,
        owner: Option<String>,
    },
    None,
}

/// Tracks one endpoint's progress through the VC handshake. Created at the
/// first outbound INITIAL (initiator) or first inbound INITIAL (responder);
/// dropping it releases everything it holds and emits no further frames.
#[derive(Clone, Debug)]
pub struct HandshakeSession {
    role: Role,
    state: State,
    my_dcid: ConnectionId,
    peer_dcid: Option<ConnectionId>,
    pending_credential: Option<CredentialMicrodata>,
    negotiated_device_id: Option<String>,
    negotiated_owner: Option<String>,
    deadline: Option<u64>,
}

fn violation(state: &State, event: &'static str) -> HandshakeError {
    HandshakeError::StateViolation {
        from: state.name(),
        event,
    }
}

/// A VC frame of `frame_type` arrived while the session was in `state`,
/// which doesn't expect it - distinct from [`violation`], which covers a
/// transition method called for the wrong role or one that never applies to
/// the current state.
fn unexpected_frame(state: &State, frame_type: u8) -> HandshakeError {
    HandshakeError::UnexpectedFrame(CodecError::new(ErrorKind::UnexpectedVcFrame {
        state: state.name(),
        frame_type,
    }))
}

impl HandshakeSession {
    pub fn new_initiator(my_dcid: ConnectionId) -> Self {
        Self {
            role: Role::Initiator,
            state: State::Idle,
            my_dcid,
            peer_dcid: None,
            pending_credential: None,
            negotiated_device_id: None,
            negotiated_owner: None,
            deadline: None,
        }
    }

    pub fn new_responder(my_dcid: ConnectionId) -> Self {
        Self {
            role: Role::Responder,
            state: State::Idle,
            my_dcid,
            peer_dcid: None,
            pending_credential: None,
            negotiated_device_id: None,
            negotiated_owner: None,
            deadline: None,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn negotiated_device_id(&self) -> Option<&str> {
        self.negotiated_device_id.as_deref()
    }

    pub fn negotiated_owner(&self) -> Option<&str> {
        self.negotiated_owner.as_deref()
    }

    /// Bounds how long this session will wait for its next expected frame,
    /// in the embedding's own time units; checked by [`Self::tick`].
    pub fn set_deadline(&mut self, deadline: u64) {
        self.deadline = Some(deadline);
    }

    /// Called by the embedding on its own schedule; transitions to
    /// `Failed(Timeout)` if `now` has passed the session's deadline and the
    /// session is still mid-handshake.
    pub fn tick(&mut self, now: u64) -> Event {
        if self.state.is_terminal() {
            return Event::None;
        }
        match self.deadline {
            Some(deadline) if now >= deadline && self.state != State::Idle => {
                tracing::warn!(role = ?self.role, from = self.state.name(), "handshake timed out");
                self.state = State::Failed(FailReason::Timeout);
                Event::SendConnectionClose {
                    error_code: crate::frame::connection_close::NO_ERROR,
                    reason: "handshake timed out".to_owned(),
                }
            }
            _ => Event::None,
        }
    }

    // === Initiator transitions ===

    /// `Idle -> Initiating`: builds the `VC_INIT` frame to wrap in the
    /// outbound INITIAL packet.
    pub fn start(
        &mut self,
        peer_dcid: ConnectionId,
        credential: CredentialMicrodata,
    ) -> Result<Event, HandshakeError> {
        if self.role != Role::Initiator || self.state != State::Idle {
            return Err(violation(&self.state, "start"));
        }
        tracing::debug!(?peer_dcid, "starting handshake as initiator");
        self.peer_dcid = Some(peer_dcid);
        self.pending_credential = Some(credential.clone());
        self.state = State::Initiating;
        Ok(Event::SendVcInit(VcInit {
            credential_microdata: credential,
        }))
    }

    /// `Initiating -> AwaitingResponse`: call once the INITIAL carrying
    /// `VC_INIT` has been handed to the transport.
    pub fn mark_initial_sent(&mut self) -> Result<(), HandshakeError> {
        if self.role != Role::Initiator || self.state != State::Initiating {
            return Err(violation(&self.state, "mark_initial_sent"));
        }
        self.state = State::AwaitingResponse;
        Ok(())
    }

    /// `AwaitingResponse -> Provisioned | Failed(CredentialRejected)`.
    pub fn on_vc_response(
        &mut self,
        response: VcResponse,
        verifier: &mut dyn CredentialVerifier,
    ) -> Result<Event, HandshakeError> {
        if self.role != Role::Initiator {
            return Err(violation(&self.state, "on_vc_response"));
        }
        if self.state != State::AwaitingResponse {
            return Err(unexpected_frame(&self.state, vc_response::TAG));
        }

        let body = &response.response;
        match body.status {
            ResponseStatus::Provisioned | ResponseStatus::Authenticated => {
                let microdata = match &response.credential_microdata {
                    Some(md) => md,
                    None => return Ok(self.reject(reject_reason(body, "missing credential"))),
                };
                match verifier.verify(microdata) {
                    Ok(verified) => {
                        self.negotiated_device_id =
                            body.device_id.clone().or(verified.device_id);
                        self.negotiated_owner = body.owner.clone().or(verified.owner);
                        self.state = State::Provisioned;
                        tracing::debug!(device_id = ?self.negotiated_device_id, "credential provisioned");
                        Ok(Event::SendVcAck(VcAck {
                            device_id: self.negotiated_device_id.clone().unwrap_or_default(),
                            status: AckStatus::Success,
                            message: None,
                        }))
                    }
                    Err(err) => Ok(self.reject(err.0)),
                }
            }
            ResponseStatus::AlreadyOwned => {
                self.negotiated_device_id = body.device_id.clone();
                self.negotiated_owner = body.owner.clone();
                self.state = State::Provisioned;
                Ok(Event::None)
            }
            ResponseStatus::Revoked | ResponseStatus::Error => {
                Ok(self.reject(reject_reason(body, "credential rejected")))
            }
        }
    }

    fn reject(&mut self, reason: String) -> Event {
        tracing::warn!(role = ?self.role, %reason, "rejecting credential");
        self.state = State::Failed(FailReason::CredentialRejected(reason.clone()));
        Event::SendConnectionClose {
            error_code: crate::frame::connection_close::CREDENTIAL_REJECTED,
            reason,
        }
    }

    /// `Provisioned -> Authenticated`: call when the first 1-RTT packet
    /// from the peer parses successfully.
    pub fn on_first_short_header(&mut self) -> Result<Event, HandshakeError> {
        if self.state != State::Provisioned {
            return Err(violation(&self.state, "on_first_short_header"));
        }
        self.state = State::Authenticated;
        Ok(Event::Authenticated {
            device_id: self.negotiated_device_id.clone(),
            owner: self.negotiated_owner.clone(),
        })
    }

    // === Responder transitions ===

    /// `Idle -> Provisioning -> Provisioned | Failed`. A duplicate
    /// `VC_INIT` received after provisioning is ignored (idempotent).
    pub fn on_vc_init(
        &mut self,
        frame: VcInit,
        verifier: &mut dyn CredentialVerifier,
        policy: &mut dyn AdmissionPolicy,
    ) -> Result<Event, HandshakeError> {
        if self.role != Role::Responder {
            return Err(violation(&self.state, "on_vc_init"));
        }
        if !matches!(self.state, State::Idle) {
            if self.pending_credential.as_ref() == Some(&frame.credential_microdata) {
                return Ok(Event::None);
            }
            return Err(unexpected_frame(&self.state, vc_init::TAG));
        }

        self.pending_credential = Some(frame.credential_microdata.clone());
        self.state = State::Provisioning;

        let verified = match verifier.verify(&frame.credential_microdata) {
            Ok(verified) => verified,
            Err(err) => return Ok(self.reject(err.0)),
        };

        let decision = policy.decide(&verified);
        let (status, device_id, owner) = match decision {
            AdmissionDecision::Provision { device_id, owner } => {
                (ResponseStatus::Provisioned, device_id, owner)
            }
            AdmissionDecision::Authenticate { device_id, owner } => {
                (ResponseStatus::Authenticated, device_id, owner)
            }
            AdmissionDecision::AlreadyOwned { device_id, owner } => {
                (ResponseStatus::AlreadyOwned, device_id, owner)
            }
            AdmissionDecision::Reject { reason } => return Ok(self.reject(reason)),
        };

        self.negotiated_device_id = Some(device_id.clone());
        self.negotiated_owner = Some(owner.clone());
        self.state = State::Provisioned;
        tracing::debug!(%device_id, %owner, status = ?status, "admission decided");

        Ok(Event::SendVcResponse(VcResponse {
            credential_microdata: None,
            response: ResponseBody {
                status,
                device_id: Some(device_id),
                owner: Some(owner),
                message: None,
                error: None,
                credential_microdata: None,
            },
        }))
    }

    /// `Provisioned -> Authenticated` on a matching `VC_ACK{status:
    /// "success"}`. A redundant ack for an already-authenticated session
    /// (the `already_owned` path never required one) is accepted without
    /// error.
    pub fn on_vc_ack(&mut self, ack: VcAck) -> Result<Event, HandshakeError> {
        if self.role != Role::Responder {
            return Err(violation(&self.state, "on_vc_ack"));
        }
        if self.state == State::Authenticated
            && self.negotiated_device_id.as_deref() == Some(ack.device_id.as_str())
        {
            return Ok(Event::None);
        }
        if self.state != State::Provisioned {
            return Err(unexpected_frame(&self.state, vc_ack::TAG));
        }
        if ack.status == AckStatus::Success
            && self.negotiated_device_id.as_deref() == Some(ack.device_id.as_str())
        {
            self.state = State::Authenticated;
            tracing::debug!(device_id = %ack.device_id, "handshake authenticated");
            Ok(Event::Authenticated {
                device_id: self.negotiated_device_id.clone(),
                owner: self.negotiated_owner.clone(),
            })
        } else {
            tracing::warn!(device_id = %ack.device_id, "unexpected VC_ACK");
            self.state = State::Failed(FailReason::ProtocolViolation(
                "unexpected VC_ACK".to_owned(),
            ));
            Ok(Event::SendConnectionClose {
                error_code: crate::frame::connection_close::PROTOCOL_VIOLATION,
                reason: "unexpected VC_ACK".to_owned(),
            })
        }
    }

    /// `Authenticated -> Closed` on graceful shutdown from either side.
    pub fn close(&mut self) {
        self.state = State::Closed;
    }
}

fn reject_reason(body: &ResponseBody, default: &str) -> String {
    body.error
        .clone()
        .or_else(|| body.message.clone())
        .unwrap_or_else(|| default.to_owned())
}

/// An outcome callers can match on after driving a session to completion,
/// bundling the terminal state with the negotiated identity (if any).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
    Authenticated {
        device_id: Option<String>,
        owner: Option<String>,
    },
    Failed(FailReason),
}

impl HandshakeSession {
    pub fn outcome(&self) -> Option<Outcome> {
        match &self.state {
            State::Authenticated => Some(Outcome::Authenticated {
                device_id: self.negotiated_device_id.clone(),
                owner: self.negotiated_owner.clone(),
            }),
            State::Failed(reason) => Some(Outcome::Failed(reason.clone())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::testing::{sample_microdata, AcceptOwner, RejectAll};

    fn provision_policy(device_id: &str, owner: &str) -> impl AdmissionPolicy {
        struct Policy(String, String);
        impl AdmissionPolicy for Policy {
            fn decide(
                &mut self,
                _credential: &crate::credential::VerifiedCredential,
            ) -> AdmissionDecision {
                AdmissionDecision::Provision {
                    device_id: self.0.clone(),
                    owner: self.1.clone(),
                }
            }
        }
        Policy(device_id.to_owned(), owner.to_owned())
    }

    /// Fresh provisioning end to end.
    #[test]
    fn fresh_provisioning_reaches_authenticated_on_both_sides() {
        let mut initiator = HandshakeSession::new_initiator(ConnectionId::from(vec![1, 2, 3]));
        let mut responder = HandshakeSession::new_responder(ConnectionId::from(vec![4, 5, 6]));

        let credential = sample_microdata("Alice");
        let init_event = initiator
            .start(ConnectionId::from(vec![4, 5, 6]), credential.clone())
            .unwrap();
        let vc_init = match init_event {
            Event::SendVcInit(frame) => frame,
            _ => panic!("expected SendVcInit"),
        };
        initiator.mark_initial_sent().unwrap();

        let mut verifier_r = AcceptOwner("Alice".to_owned());
        let mut policy = provision_policy("dev-7", "Alice");
        let response_event = responder
            .on_vc_init(vc_init, &mut verifier_r, &mut policy)
            .unwrap();
        let vc_response = match response_event {
            Event::SendVcResponse(frame) => frame,
            _ => panic!("expected SendVcResponse"),
        };
        assert_eq!(vc_response.response.status, ResponseStatus::Provisioned);

        let mut verifier_i = AcceptOwner("Alice".to_owned());
        let ack_event = initiator
            .on_vc_response(vc_response, &mut verifier_i)
            .unwrap();
        let vc_ack = match ack_event {
            Event::SendVcAck(frame) => frame,
            _ => panic!("expected SendVcAck"),
        };
        assert_eq!(vc_ack.device_id, "dev-7");

        let ack_result = responder.on_vc_ack(vc_ack).unwrap();
        assert!(matches!(ack_result, Event::Authenticated { .. }));
        assert_eq!(responder.state(), &State::Authenticated);

        initiator.on_first_short_header().unwrap();
        assert_eq!(initiator.state(), &State::Authenticated);
        assert_eq!(initiator.negotiated_device_id(), Some("dev-7"));
    }

    /// Scenario 2: already-owned re-attach needs no VC_ACK.
    #[test]
    fn already_owned_reaches_authenticated_without_ack() {
        let mut initiator = HandshakeSession::new_initiator(ConnectionId::from(vec![1]));
        let credential = sample_microdata("Alice");
        initiator
            .start(ConnectionId::from(vec![2]), credential)
            .unwrap();
        initiator.mark_initial_sent().unwrap();

        let response = VcResponse {
            credential_microdata: None,
            response: ResponseBody {
                status: ResponseStatus::AlreadyOwned,
                device_id: Some("dev-7".to_owned()),
                owner: Some("Alice".to_owned()),
                message: None,
                error: None,
                credential_microdata: None,
            },
        };
        let mut verifier = AcceptOwner("Alice".to_owned());
        let event = initiator.on_vc_response(response, &mut verifier).unwrap();
        assert!(matches!(event, Event::None));
        assert_eq!(initiator.state(), &State::Provisioned);

        initiator.on_first_short_header().unwrap();
        assert_eq!(initiator.state(), &State::Authenticated);
    }

    /// Scenario 3: credential rejected on the responder's verification.
    #[test]
    fn credential_rejection_fails_both_sides() {
        let mut responder = HandshakeSession::new_responder(ConnectionId::from(vec![9]));
        let credential = sample_microdata("Mallory");
        let vc_init = VcInit {
            credential_microdata: credential,
        };
        let mut verifier = RejectAll("invalid_signature".to_owned());
        let mut policy = provision_policy("dev-x", "nobody");
        let event = responder
            .on_vc_init(vc_init, &mut verifier, &mut policy)
            .unwrap();
        match event {
            Event::SendConnectionClose { error_code, .. } => {
                assert_eq!(error_code, crate::frame::connection_close::CREDENTIAL_REJECTED);
            }
            _ => panic!("expected SendConnectionClose"),
        }
        assert!(matches!(
            responder.state(),
            State::Failed(FailReason::CredentialRejected(_))
        ));
    }

    #[test]
    fn duplicate_vc_init_after_provisioning_is_ignored() {
        let mut responder = HandshakeSession::new_responder(ConnectionId::from(vec![9]));
        let credential = sample_microdata("Alice");
        let mut verifier = AcceptOwner("Alice".to_owned());
        let mut policy = provision_policy("dev-7", "Alice");
        responder
            .on_vc_init(
                VcInit {
                    credential_microdata: credential.clone(),
                },
                &mut verifier,
                &mut policy,
            )
            .unwrap();
        assert_eq!(responder.state(), &State::Provisioned);

        let mut verifier2 = AcceptOwner("Alice".to_owned());
        let mut policy2 = provision_policy("dev-7", "Alice");
        let event = responder
            .on_vc_init(VcInit { credential_microdata: credential }, &mut verifier2, &mut policy2)
            .unwrap();
        assert!(matches!(event, Event::None));
        assert_eq!(responder.state(), &State::Provisioned);
    }

    #[test]
    fn tick_past_deadline_fails_with_timeout() {
        let mut initiator = HandshakeSession::new_initiator(ConnectionId::from(vec![1]));
        initiator
            .start(ConnectionId::from(vec![2]), sample_microdata("Alice"))
            .unwrap();
        initiator.set_deadline(100);
        let event = initiator.tick(150);
        assert!(matches!(event, Event::SendConnectionClose { .. }));
        assert!(matches!(initiator.state(), State::Failed(FailReason::Timeout)));
    }

    #[test]
    fn vc_ack_before_vc_init_is_unexpected_frame() {
        let mut responder = HandshakeSession::new_responder(ConnectionId::from(vec![9]));
        let ack = VcAck {
            device_id: "dev-7".to_owned(),
            status: AckStatus::Success,
            message: None,
        };
        let error = responder.on_vc_ack(ack).unwrap_err();
        match error {
            HandshakeError::UnexpectedFrame(codec_error) => assert_eq!(
                codec_error.kind,
                crate::error::ErrorKind::UnexpectedVcFrame {
                    state: "Idle",
                    frame_type: vc_ack::TAG,
                }
            ),
            other => panic!("expected UnexpectedFrame, got {other:?}"),
        }
    }
}
