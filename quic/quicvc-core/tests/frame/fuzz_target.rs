// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use bolero::check;
use quicvc_codec::DecoderBuffer;
use quicvc_core::frame::parse_all;

fn main() {
    check!().for_each(|input| {
        let (frames, error) = parse_all(DecoderBuffer::new(input));

        // every well-formed frame before a parse failure must have a tag
        // drawn from the closed codepoint set; `parse_all` never panics on
        // arbitrary bytes.
        for frame in &frames {
            let _ = frame.tag();
        }
        let _ = error;
    });
}
