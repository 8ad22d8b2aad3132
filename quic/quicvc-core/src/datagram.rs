// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Ties the packet header codec and the frame codec together: given a raw
//! datagram, produce a header plus a typed frame sequence; given a header
//! description and a frame list, produce a well-formed datagram.

use crate::{
    error::CodecError,
    frame::{parse_all, Frame, OutboundFrame},
    packet::{Header, LongHeader, ShortHeader},
};
use quicvc_codec::{DecoderBuffer, Encoder, EncoderBuffer};

/// A parsed datagram: its header and the frames found in its payload. If
/// frame parsing failed partway through, `frame_error` carries the error and
/// `frames` holds whatever parsed successfully before it, per the
/// "well-formed frames before the error are still returned" policy.
#[derive(Clone, Debug)]
pub struct ParsedDatagram<'a> {
    pub header: Header<'a>,
    pub frames: Vec<Frame<'a>>,
    pub frame_error: Option<CodecError>,
}

/// Parses one datagram. `short_header_dcid_len` is the connection's
/// configured DCID length, needed because short headers don't carry it on
/// the wire.
pub fn parse(
    buffer: DecoderBuffer,
    short_header_dcid_len: usize,
) -> Result<ParsedDatagram, CodecError> {
    let (header, _) = Header::decode(buffer, short_header_dcid_len)?;
    let (frames, frame_error) = match header.payload() {
        Some(payload) => parse_all(payload),
        None => (Vec::new(), None),
    };
    Ok(ParsedDatagram {
        header,
        frames,
        frame_error,
    })
}

/// Encodes a long-header packet followed by `frames`, writing into `out`.
/// Returns the number of bytes written.
pub fn encode_long(header: &LongHeader<()>, frames: &[OutboundFrame], out: &mut [u8]) -> usize {
    let payload_len: usize = frames.iter().map(encoded_len).sum();
    let mut payload = vec![0u8; payload_len];
    {
        let mut encoder = EncoderBuffer::new(&mut payload);
        for frame in frames {
            frame.encode(&mut encoder);
        }
    }

    let mut encoder = EncoderBuffer::new(out);
    header.encode(&payload, &mut encoder);
    encoder.len()
}

/// Encodes a short-header packet followed by `frames`, writing into `out`.
/// Returns the number of bytes written.
pub fn encode_short(header: &ShortHeader<()>, frames: &[OutboundFrame], out: &mut [u8]) -> usize {
    let payload_len: usize = frames.iter().map(encoded_len).sum();
    let mut payload = vec![0u8; payload_len];
    {
        let mut encoder = EncoderBuffer::new(&mut payload);
        for frame in frames {
            frame.encode(&mut encoder);
        }
    }

    let mut encoder = EncoderBuffer::new(out);
    header.encode(&payload, &mut encoder);
    encoder.len()
}

fn encoded_len(frame: &OutboundFrame) -> usize {
    let mut estimator = quicvc_codec::EncoderLenEstimator::new(usize::MAX);
    frame.encode(&mut estimator);
    estimator.len()
}
