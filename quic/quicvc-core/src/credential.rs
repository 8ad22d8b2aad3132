// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Device Identity Credential microdata: the content-addressable, wire-level
//! representation carried inside `VC_INIT`/`VC_RESPONSE`.
//!
//! The codec does not parse the microdata into structured fields or verify
//! its signature - it only checks for the fixed marker that identifies the
//! document as a `DeviceIdentityCredential`, per the wire invariant. Full
//! structural parsing and cryptographic verification are the embedding's
//! job, performed through the [`CredentialVerifier`] hook.

use crate::error::{CodecError, ErrorKind};

/// The marker every credential microdata payload must contain.
pub const ITEMTYPE_MARKER: &str = "itemtype=\"//refin.io/DeviceIdentityCredential\"";

/// A UTF-8 microdata document presented as a Device Identity Credential.
///
/// Held opaquely: the codec's job is to carry it between the wire and the
/// verifier, not to interpret its fields.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CredentialMicrodata(String);

impl CredentialMicrodata {
    /// Validates the structural marker and UTF-8-ness of `bytes`, without
    /// attempting to parse the document further.
    pub fn parse(bytes: &[u8]) -> Result<Self, CodecError> {
        let text = core::str::from_utf8(bytes)
            .map_err(|_| CodecError::new(ErrorKind::InvalidCredentialMicrodata))?;
        if !text.contains(ITEMTYPE_MARKER) {
            return Err(CodecError::new(ErrorKind::InvalidCredentialMicrodata));
        }
        Ok(Self(text.to_owned()))
    }

    /// Wraps an already-serialized microdata document, trusting the caller
    /// (typically a `HandshakeSession` emitting its own credential) to have
    /// produced a conforming document.
    pub fn from_trusted(document: String) -> Self {
        debug_assert!(document.contains(ITEMTYPE_MARKER));
        Self(document)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Result of a successful [`CredentialVerifier::verify`] call: whatever
/// structured claims the embedding's verifier chooses to surface. The codec
/// only moves this value around; it never inspects it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VerifiedCredential {
    pub device_id: Option<String>,
    pub owner: Option<String>,
}

/// Reason a credential failed verification, surfaced to the handshake as
/// [`crate::error::HandshakeError::CredentialRejected`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VerifyError(pub String);

/// Host-supplied cryptographic check: signature, expiration, and
/// issuer-chain trust. The codec never performs this check itself.
pub trait CredentialVerifier {
    fn verify(&mut self, microdata: &CredentialMicrodata) -> Result<VerifiedCredential, VerifyError>;
}

/// Decision returned by a responder's [`AdmissionPolicy`] for a presented
/// credential.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AdmissionDecision {
    Provision { device_id: String, owner: String },
    Authenticate { device_id: String, owner: String },
    AlreadyOwned { device_id: String, owner: String },
    Reject { reason: String },
}

/// Host-supplied policy hook invoked by a responder when a `VC_INIT`
/// arrives with a structurally valid, cryptographically verified
/// credential.
pub trait AdmissionPolicy {
    fn decide(&mut self, credential: &VerifiedCredential) -> AdmissionDecision;
}

#[cfg(any(test, feature = "testing"))]
pub mod testing {
    use super::*;

    pub fn sample_microdata(owner: &str) -> CredentialMicrodata {
        let document = format!(
            concat!(
                "<div itemscope itemtype=\"//refin.io/DeviceIdentityCredential\">",
                "<span itemprop=\"owner\">{owner}</span>",
                "</div>"
            ),
            owner = owner
        );
        CredentialMicrodata::from_trusted(document)
    }

    /// Verifies any credential containing the given owner string,
    /// rejecting everything else. Deterministic stand-in for a real
    /// signature check.
    pub struct AcceptOwner(pub String);

    impl CredentialVerifier for AcceptOwner {
        fn verify(
            &mut self,
            microdata: &CredentialMicrodata,
        ) -> Result<VerifiedCredential, VerifyError> {
            if microdata.as_str().contains(&self.0) {
                Ok(VerifiedCredential {
                    device_id: None,
                    owner: Some(self.0.clone()),
                })
            } else {
                Err(VerifyError("owner mismatch".to_owned()))
            }
        }
    }

    impl CredentialVerifier for RejectAll {
        fn verify(
            &mut self,
            _microdata: &CredentialMicrodata,
        ) -> Result<VerifiedCredential, VerifyError> {
            Err(VerifyError(self.0.clone()))
        }
    }

    pub struct RejectAll(pub String);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_missing_marker() {
        let err = CredentialMicrodata::parse(b"<div>not a credential</div>").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidCredentialMicrodata);
    }

    #[test]
    fn rejects_non_utf8() {
        let err = CredentialMicrodata::parse(&[0xFF, 0xFE]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidCredentialMicrodata);
    }

    #[test]
    fn accepts_document_with_marker() {
        let doc = testing::sample_microdata("Alice");
        let parsed = CredentialMicrodata::parse(doc.as_bytes()).unwrap();
        assert_eq!(parsed.as_str(), doc.as_str());
    }
}
