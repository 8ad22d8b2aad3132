// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Byte-buffer primitives shared by the wire-format codecs in `quicvc-core`.
//!
//! This crate has no knowledge of QUIC, VC frames, or the handshake state
//! machine - it only knows how to read and write fixed-width integers and
//! slices out of a cursor over a `&[u8]` / `&mut [u8]`, tracking position and
//! refusing to read or write past the end of the buffer.

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

mod decoder;
mod encoder;

pub use decoder::{DecoderBuffer, DecoderError};
pub use encoder::{Encoder, EncoderBuffer, EncoderLenEstimator, EncoderValue};

/// Result of a decode operation: the parsed value plus the buffer view
/// positioned just after it.
pub type DecoderResult<'a, T> = Result<(T, DecoderBuffer<'a>), DecoderError>;

/// A type that can be read from the front of a `DecoderBuffer`.
pub trait DecoderValue<'a>: Sized {
    fn decode(buffer: DecoderBuffer<'a>) -> DecoderResult<'a, Self>;
}
