// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::{DecoderResult, DecoderValue};
use byteorder::{BigEndian, ByteOrder};
use core::fmt;

/// A cursor over an immutable byte slice.
///
/// Every decode method consumes `self` and returns a new `DecoderBuffer`
/// positioned after the bytes that were read, so a parse is written as a
/// chain of `let (value, buffer) = buffer.decode()?;` calls.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DecoderBuffer<'a> {
    bytes: &'a [u8],
}

impl<'a> DecoderBuffer<'a> {
    #[inline]
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Decodes a value of type `T`, splitting it off the front of the buffer.
    #[inline]
    pub fn decode<T: DecoderValue<'a>>(self) -> DecoderResult<'a, T> {
        T::decode(self)
    }

    /// Splits `count` bytes off the front of the buffer.
    #[inline]
    pub fn decode_slice(self, count: usize) -> DecoderResult<'a, DecoderBuffer<'a>> {
        self.ensure_len(count)?;
        let (slice, remaining) = self.bytes.split_at(count);
        Ok((Self::new(slice), Self::new(remaining)))
    }

    /// Skips `count` bytes, discarding them.
    #[inline]
    pub fn skip(self, count: usize) -> Result<Self, DecoderError> {
        self.decode_slice(count).map(|(_, buffer)| buffer)
    }

    /// Returns the byte at `index` without consuming it.
    #[inline]
    pub fn peek_byte(&self, index: usize) -> Result<u8, DecoderError> {
        self.bytes
            .get(index)
            .copied()
            .ok_or(DecoderError::UnexpectedEof(index + 1))
    }

    /// Returns a non-consuming view of the remaining bytes.
    #[inline]
    #[must_use]
    pub fn peek(&self) -> DecoderBuffer<'a> {
        DecoderBuffer::new(self.bytes)
    }

    /// Returns an error unless the buffer has been fully consumed.
    #[inline]
    pub fn ensure_empty(&self) -> Result<(), DecoderError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DecoderError::UnexpectedBytes(self.len()))
        }
    }

    /// Returns an error unless at least `len` bytes remain.
    #[inline]
    pub fn ensure_len(&self, len: usize) -> Result<(), DecoderError> {
        if self.len() < len {
            Err(DecoderError::UnexpectedEof(len))
        } else {
            Ok(())
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Borrows the remaining bytes directly. Bypasses the cursor bookkeeping,
    /// so prefer `decode`/`decode_slice` where possible.
    #[inline]
    pub fn as_less_safe_slice(&self) -> &'a [u8] {
        self.bytes
    }
}

impl<'a> From<&'a [u8]> for DecoderBuffer<'a> {
    #[inline]
    fn from(bytes: &'a [u8]) -> Self {
        Self::new(bytes)
    }
}

impl<'a> PartialEq<[u8]> for DecoderBuffer<'a> {
    #[inline]
    fn eq(&self, rhs: &[u8]) -> bool {
        self.bytes == rhs
    }
}

macro_rules! impl_integer_decode {
    ($ty:ty, $read:ident) => {
        impl<'a> DecoderValue<'a> for $ty {
            #[inline]
            fn decode(buffer: DecoderBuffer<'a>) -> DecoderResult<'a, Self> {
                const SIZE: usize = core::mem::size_of::<$ty>();
                let (slice, buffer) = buffer.decode_slice(SIZE)?;
                Ok((BigEndian::$read(slice.bytes), buffer))
            }
        }
    };
}

impl<'a> DecoderValue<'a> for u8 {
    #[inline]
    fn decode(buffer: DecoderBuffer<'a>) -> DecoderResult<'a, Self> {
        let (slice, buffer) = buffer.decode_slice(1)?;
        Ok((slice.bytes[0], buffer))
    }
}

impl_integer_decode!(u16, read_u16);
impl_integer_decode!(u32, read_u32);
impl_integer_decode!(u64, read_u64);

/// Errors produced while reading from a `DecoderBuffer`.
///
/// These are buffer-level errors only; protocol-level interpretation (an
/// invalid ack range, an unsupported frame type, and so on) is layered on top
/// by `quicvc-core`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DecoderError {
    /// The buffer did not contain `usize` more bytes than were needed.
    UnexpectedEof(usize),
    /// The buffer had `usize` bytes left over after a value that was
    /// expected to consume it entirely.
    UnexpectedBytes(usize),
    /// A length prefix did not fit into `usize` on this platform.
    LengthCapacityExceeded,
    /// A structural invariant was violated.
    InvariantViolation(&'static str),
}

impl fmt::Display for DecoderError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::UnexpectedEof(len) => write!(f, "unexpected eof: wanted {len} more bytes"),
            Self::UnexpectedBytes(len) => write!(f, "unexpected trailing bytes: {len}"),
            Self::LengthCapacityExceeded => {
                write!(f, "length could not be represented in platform's usize")
            }
            Self::InvariantViolation(msg) => write!(f, "{msg}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecoderError {}
