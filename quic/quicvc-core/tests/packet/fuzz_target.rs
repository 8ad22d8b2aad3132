// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use bolero::check;
use quicvc_codec::DecoderBuffer;
use quicvc_core::datagram;

fn main() {
    check!().for_each(|input| {
        // 8 is this profile's default short-header DCID length.
        let _ = datagram::parse(DecoderBuffer::new(input), 8);
    });
}
