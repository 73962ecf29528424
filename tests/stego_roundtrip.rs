// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! End-to-end encode/decode tests on synthetic covers.

mod common;

use phasm_dwt::stego::frame::{frame, HEADER_BITS};
use phasm_dwt::stego::selection::plan;
use phasm_dwt::stego::HEADER_COPIES;
use phasm_dwt::{
    capacity, decode, decompose, encode, reconstruct, BandName, EmbeddingParameters, PixelPlane,
    StegoError,
};

fn reference_params() -> EmbeddingParameters {
    EmbeddingParameters {
        q_factor: 10.0,
        dwt_levels: 2,
        band_order: ["LL2", "HL2", "LH2", "HL1", "LH1", "HH2", "HH1"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect(),
        magnitude_threshold: 8.0,
    }
}

#[test]
fn hello_bob_512() {
    let cover = vec![common::photo_like(512, 512, 42)];
    let params = reference_params();
    assert_eq!(params, EmbeddingParameters::default());

    let (stego, report) = encode(&cover, b"Hello Bob!", &params).unwrap();
    assert!(report.psnr_db > 45.0, "PSNR {:.2} dB", report.psnr_db);
    assert!(report.bits_used <= report.bits_available);
    assert_eq!(stego.len(), 1);
    assert_eq!(stego[0].width(), 512);
    assert_eq!(stego[0].height(), 512);

    assert_eq!(decode(&stego, &params).unwrap(), b"Hello Bob!");
}

#[test]
fn longer_text_payload() {
    let cover = vec![common::photo_like(384, 384, 7)];
    let params = EmbeddingParameters::default();
    let payload = "Meet me at the old bridge at dawn. Bring the blue notebook and \
                   nothing else. If the lamp is lit, walk past and do not stop."
        .repeat(3);
    let (stego, report) = encode(&cover, payload.as_bytes(), &params).unwrap();
    assert!(report.psnr_db > 40.0, "PSNR {:.2} dB", report.psnr_db);
    assert_eq!(decode(&stego, &params).unwrap(), payload.as_bytes());
}

#[test]
fn binary_payload_with_every_byte() {
    let cover = vec![common::photo_like(256, 256, 9)];
    let params = EmbeddingParameters::default();
    let payload: Vec<u8> = (0..=255u8).collect();
    let (stego, _) = encode(&cover, &payload, &params).unwrap();
    assert_eq!(decode(&stego, &params).unwrap(), payload);
}

#[test]
fn empty_payload_is_finite_and_reproducible() {
    let cover = vec![common::photo_like(128, 128, 3)];
    let params = EmbeddingParameters::default();

    let (stego_a, report_a) = encode(&cover, b"", &params).unwrap();
    let (stego_b, report_b) = encode(&cover, b"", &params).unwrap();

    // The header and the Huffman tree are still embedded.
    assert!(report_a.bits_used > 0);
    assert!(report_a.psnr_db.is_finite());
    assert_eq!(report_a, report_b);
    assert_eq!(stego_a, stego_b);
    assert_eq!(decode(&stego_a, &params).unwrap(), Vec::<u8>::new());
}

#[test]
fn three_channels() {
    let cover = common::rgb_like(128, 128, 5);
    let params = EmbeddingParameters::default();
    let payload = b"colour covers carry the plan channel after channel";
    let (stego, report) = encode(&cover, payload, &params).unwrap();
    assert_eq!(stego.len(), 3);
    assert!(report.psnr_db > 40.0);
    assert_eq!(decode(&stego, &params).unwrap(), payload);
}

#[test]
fn three_levels() {
    let cover = vec![common::photo_like(256, 256, 11)];
    let params = EmbeddingParameters {
        magnitude_threshold: 12.0,
        q_factor: 12.0,
        ..EmbeddingParameters::with_levels(3)
    };
    let (stego, _) = encode(&cover, b"deeper decomposition", &params).unwrap();
    assert_eq!(decode(&stego, &params).unwrap(), b"deeper decomposition");
}

#[test]
fn capacity_exceeded_leaves_cover_untouched() {
    let cover = vec![common::photo_like(64, 64, 1)];
    let snapshot = cover.clone();
    let params = EmbeddingParameters::default();
    let info = capacity(&cover, &params).unwrap();

    let payload: Vec<u8> = (0..info.bits_available / 8 + 1).map(|i| (i * 97 % 256) as u8).collect();
    match encode(&cover, &payload, &params) {
        Err(StegoError::CapacityExceeded { required_bits, available_bits }) => {
            assert_eq!(available_bits, info.bits_available);
            assert!(required_bits > available_bits);
        }
        other => panic!("expected CapacityExceeded, got {other:?}"),
    }
    assert_eq!(cover, snapshot);
}

#[test]
fn capacity_estimate_fits() {
    let cover = vec![common::photo_like(128, 128, 21)];
    let params = EmbeddingParameters::default();
    let info = capacity(&cover, &params).unwrap();
    assert!(info.max_message_bytes_estimate > 0);

    // A payload with every byte distinct up to the estimate does not
    // compress, and must still fit.
    let payload: Vec<u8> = (0..info.max_message_bytes_estimate).map(|i| (i * 97 % 256) as u8).collect();
    let (stego, report) = encode(&cover, &payload, &params).unwrap();
    assert!(report.bits_used <= info.bits_available);
    assert_eq!(decode(&stego, &params).unwrap(), payload);
}

#[test]
fn mismatched_parameters_fail() {
    let cover = vec![common::photo_like(256, 256, 13)];
    let params = EmbeddingParameters::default();
    let (stego, _) = encode(&cover, b"only for the right parameters", &params).unwrap();

    let reordered = EmbeddingParameters {
        band_order: vec![BandName::hh(1), BandName::hl(1), BandName::lh(1), BandName::ll(2)],
        ..params.clone()
    };
    assert!(decode(&stego, &reordered).is_err());

    let coarser = EmbeddingParameters { q_factor: 14.0, ..params.clone() };
    assert!(decode(&stego, &coarser).is_err());
}

#[test]
fn unmarked_cover_is_rejected() {
    let cover = vec![common::photo_like(256, 256, 17)];
    let params = EmbeddingParameters::default();
    assert!(decode(&cover, &params).is_err());
}

#[test]
fn rejects_invalid_input() {
    let params = EmbeddingParameters::default();
    assert!(matches!(encode(&[], b"x", &params), Err(StegoError::NoChannels)));

    let odd = vec![PixelPlane::from_fn(30, 32, |_, _| 128)];
    assert!(matches!(encode(&odd, b"x", &params), Err(StegoError::Transform(_))));

    let bad = EmbeddingParameters { dwt_levels: 0, ..params };
    let cover = vec![common::photo_like(64, 64, 0)];
    assert!(matches!(encode(&cover, b"x", &bad), Err(StegoError::InvalidParameters(_))));
}

#[test]
fn saturated_cover_reads_back_or_fails_cleanly() {
    let params = EmbeddingParameters::default();
    let mut decoded = 0;
    for seed in 0..6u64 {
        let cover = vec![common::saturated(96, 96, seed)];
        for len in [4usize, 8, 16, 40, 90] {
            let payload: Vec<u8> = (0..len).map(|i| (i * 37) as u8 ^ seed as u8).collect();
            match encode(&cover, &payload, &params) {
                Ok((stego, _)) => {
                    assert_eq!(decode(&stego, &params).unwrap(), payload, "seed={seed} len={len}");
                    decoded += 1;
                }
                Err(StegoError::UnstableEmbedding { mismatched_bits }) => assert!(mismatched_bits > 0),
                Err(StegoError::CapacityExceeded { .. }) => {}
                Err(e) => panic!("seed={seed} len={len}: {e}"),
            }
        }
    }
    assert!(decoded > 0);
}

/// Move the coefficients behind the given plan indices one QIM level
/// outward, flipping the bits they carry.
///
/// `q / 4` must be an integer so the LL2 changes land on whole samples and
/// no other coefficient moves.
fn flip_bits(
    stego: &PixelPlane,
    params: &EmbeddingParameters,
    q: f64,
    indices: &[usize],
) -> PixelPlane {
    let mut bands = decompose(stego, params.dwt_levels).unwrap();
    let order = plan(&bands, &params.band_order, params.magnitude_threshold).unwrap();
    for &i in indices {
        let addr = order.addresses()[i];
        assert_eq!(addr.band, BandName::ll(2));
        let band = bands.band_mut(addr.band).unwrap();
        let c = band.get(addr.row, addr.col);
        band.set(addr.row, addr.col, c + q.copysign(c));
    }
    reconstruct(&bands).unwrap()
}

#[test]
fn corrupted_coefficients_are_corrected() {
    let cover = vec![common::photo_like(512, 512, 42)];
    let params = EmbeddingParameters::default();
    let payload = b"Hello Bob!";
    let (stego, report) = encode(&cover, payload, &params).unwrap();
    assert_eq!(report.body_q, 16.0);

    let tree_start = HEADER_BITS * HEADER_COPIES;
    let tree_len = frame(payload).unwrap().tree_block.len();
    let body_start = tree_start + tree_len * 8;

    // One bit in each of ten tree bytes and ten body bytes: within the
    // correction radius of both blocks.
    let light: Vec<usize> = (0..10)
        .map(|j| tree_start + 8 * j + 5)
        .chain((0..10).map(|j| body_start + 8 * j + 2))
        .collect();
    let damaged = flip_bits(&stego[0], &params, report.body_q, &light);
    assert_ne!(damaged, stego[0]);
    assert_eq!(decode(&[damaged], &params).unwrap(), payload);

    // Every tree byte damaged: far past the radius.
    let heavy: Vec<usize> = (0..tree_len).map(|j| tree_start + 8 * j + 5).collect();
    let damaged = flip_bits(&stego[0], &params, report.body_q, &heavy);
    assert!(matches!(decode(&[damaged], &params), Err(StegoError::Frame(_))));
}
