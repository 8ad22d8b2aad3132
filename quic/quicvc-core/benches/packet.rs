// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use quicvc_codec::DecoderBuffer;
use quicvc_core::{
    connection_id::ConnectionId,
    credential::testing::sample_microdata,
    datagram,
    frame::{OutboundFrame, VcInit},
    packet::{KeyPhase, LongHeader, LongPacketType, PacketNumber, PacketNumberLen, ShortHeader, QUIC_VERSION_1},
};

const SHORT_DCID_LEN: usize = 8;

fn initial_packet() -> Vec<u8> {
    let header = LongHeader {
        packet_type: LongPacketType::Initial,
        version: QUIC_VERSION_1,
        dcid: ConnectionId::from(vec![1, 2, 3, 4, 5, 6, 7, 8]),
        scid: ConnectionId::from(vec![8, 7, 6, 5, 4, 3, 2, 1]),
        token: None,
        packet_number: PacketNumber::new(1),
        packet_number_len: PacketNumberLen::new(2).unwrap(),
        payload: (),
    };
    let frames = vec![OutboundFrame::VcInit(VcInit {
        credential_microdata: sample_microdata("Alice"),
    })];
    let mut out = vec![0u8; 1024];
    let written = datagram::encode_long(&header, &frames, &mut out);
    out.truncate(written);
    out
}

fn short_packet() -> Vec<u8> {
    let header = ShortHeader {
        dcid: ConnectionId::from(vec![1; SHORT_DCID_LEN]),
        spin_bit: false,
        key_phase: KeyPhase::Zero,
        packet_number: PacketNumber::new(42),
        packet_number_len: PacketNumberLen::new(2).unwrap(),
        payload: (),
    };
    let frames = vec![OutboundFrame::Ping(quicvc_core::frame::Ping)];
    let mut out = vec![0u8; 64];
    let written = datagram::encode_short(&header, &frames, &mut out);
    out.truncate(written);
    out
}

fn decoding(c: &mut Criterion) {
    macro_rules! benchmark {
        ($name:expr, $bytes:expr) => {{
            let bytes = $bytes;
            let mut group = c.benchmark_group($name);
            group.throughput(Throughput::Bytes(bytes.len() as u64));
            group.bench_function($name, |b| {
                b.iter(|| {
                    let _ = black_box(datagram::parse(
                        DecoderBuffer::new(black_box(&bytes)),
                        SHORT_DCID_LEN,
                    ));
                })
            });
            group.finish();
        }};
    }

    benchmark!("initial", initial_packet());
    benchmark!("short", short_packet());
}

criterion_group!(benches, decoding);
criterion_main!(benches);
