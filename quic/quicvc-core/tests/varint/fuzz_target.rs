// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use bolero::check;
use quicvc_codec::{DecoderBuffer, EncoderBuffer};
use quicvc_core::VarInt;

fn main() {
    check!().for_each(|input| {
        let decoder = DecoderBuffer::new(input);
        if let Ok((value, remaining)) = decoder.decode::<VarInt>() {
            let consumed = input.len() - remaining.len();
            let mut buffer = [0u8; 8];
            let mut encoder = EncoderBuffer::new(&mut buffer);
            encoder.encode(&value);
            assert_eq!(encoder.as_slice(), &input[..consumed]);

            let _ = value.checked_add(value);
            let _ = value.checked_sub(value);
        }
    });
}
