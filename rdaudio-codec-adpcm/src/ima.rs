// RdAudio
// Copyright (c) 2026 The Project RdAudio Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IMA (DVI) ADPCM encoder and decoder.
//!
//! Each compressed block of `block_align` bytes opens with a 4-byte header per channel
//! (`[sample_lo, sample_hi, step_index, 0x00]`) that re-seeds the adaptive state, followed by
//! 4-bit sample codes. Mono data packs two codes per byte, lower nibble first. Stereo data is
//! packed in groups of 8 bytes carrying 8 codes per channel in a fixed interleave.

use log::warn;

use rdaudio_core::audio::AudioFormat;
use rdaudio_core::buf::SampleBuf;
use rdaudio_core::errors::{decode_error, encode_error, Result};
use rdaudio_core::util::clamp::clamp_i16;

use crate::common::{i16_le, Nibble};

#[rustfmt::skip]
const IMA_INDEX_TABLE: [i16; 16] = [
    -1, -1, -1, -1, 2, 4, 6, 8,
    -1, -1, -1, -1, 2, 4, 6, 8,
];

#[rustfmt::skip]
const IMA_STEP_TABLE: [i32; 89] = [
    7, 8, 9, 10, 11, 12, 13, 14, 16, 17,
    19, 21, 23, 25, 28, 31, 34, 37, 41, 45,
    50, 55, 60, 66, 73, 80, 88, 97, 107, 118,
    130, 143, 157, 173, 190, 209, 230, 253, 279, 307,
    337, 371, 408, 449, 494, 544, 598, 658, 724, 796,
    876, 963, 1060, 1166, 1282, 1411, 1552, 1707, 1878, 2066,
    2272, 2499, 2749, 3024, 3327, 3660, 4026, 4428, 4871, 5358,
    5894, 6484, 7132, 7845, 8630, 9493, 10442, 11487, 12635, 13899,
    15289, 16818, 18500, 20350, 22385, 24623, 27086, 29794, 32767,
];

/// Destination byte index and shift for each of the 16 sample codes of one stereo packing group.
/// The codes of a group arrive in frame order (left, right, left, right, ...) and land in 8
/// destination bytes:
///
/// ```text
/// byte 0     1     2     3
///      2 0   6 4   10 8  14 12   <left>
///
/// byte 4     5     6     7
///      3 1   7 5   11 9  15 13   <right>
/// ```
///
/// The decoder's group walk is the exact inverse of this map.
#[rustfmt::skip]
const IMA_STEREO_PACK_MAP: [(usize, u8); 16] = [
    (0, 0), (4, 0), (0, 4), (4, 4),
    (1, 0), (5, 0), (1, 4), (5, 4),
    (2, 0), (6, 0), (2, 4), (6, 4),
    (3, 0), (7, 0), (3, 4), (7, 4),
];

/// The number of source PCM bytes consumed per packing unit: one 8-frame group for stereo, one
/// two-code byte for mono.
fn chunk_len(channels: usize) -> usize {
    if channels > 1 {
        32
    }
    else {
        4
    }
}

/// Per-channel adaptive quantizer state for the IMA ADPCM codec.
///
/// The state is re-seeded from each block header while decoding, and written out as each block
/// header while encoding, so a fresh (zeroed) state never desynchronizes the stream.
#[derive(Copy, Clone, Debug, Default)]
pub struct ImaState {
    last_sample: [i16; 2],
    step_index: [i16; 2],
}

impl ImaState {
    /// Expands one 4-bit sample code for `channel` into a 16-bit sample, advancing the adaptive
    /// state.
    fn expand_code(&mut self, channel: usize, code: u8) -> i16 {
        let step = IMA_STEP_TABLE[self.step_index[channel] as usize];

        let mut diff = step >> 3;
        if code & 0x01 != 0 {
            diff += step >> 2;
        }
        if code & 0x02 != 0 {
            diff += step >> 1;
        }
        if code & 0x04 != 0 {
            diff += step;
        }
        if code & 0x08 != 0 {
            diff = -diff;
        }

        let sample = clamp_i16(i32::from(self.last_sample[channel]) + diff);

        self.last_sample[channel] = sample;
        self.step_index[channel] =
            (self.step_index[channel] + IMA_INDEX_TABLE[code as usize]).clamp(0, 88);

        sample
    }

    /// Quantizes one 16-bit sample for `channel` into a 4-bit code: the sign bit first, then
    /// magnitude bits by successive comparison against the step size and its halves. The state
    /// update reconstructs the decoder's output so both sides track identically.
    fn compress_sample(&mut self, channel: usize, sample: i16) -> u8 {
        let step = IMA_STEP_TABLE[self.step_index[channel] as usize];
        let base = step >> 3;

        let d = i32::from(sample) - i32::from(self.last_sample[channel]);
        let mut e = d;
        let mut code: u8 = 0;

        if e < 0 {
            code = 0x08;
            e = -e;
        }
        let mut ss = step;
        if e >= ss {
            code |= 0x04;
            e -= ss;
        }
        ss >>= 1;
        if e >= ss {
            code |= 0x02;
            e -= ss;
        }
        ss >>= 1;
        if e >= ss {
            code |= 0x01;
            e -= ss;
        }

        // Residual quantization error of the code, folded back into the decoder's view.
        let diff = if d < 0 { d + e - base } else { d - e + base };
        let reconstructed = clamp_i16(diff + i32::from(self.last_sample[channel]));

        self.last_sample[channel] = reconstructed;
        self.step_index[channel] =
            (self.step_index[channel] + IMA_INDEX_TABLE[code as usize]).clamp(0, 88);

        code
    }

    /// Re-seeds the state for `channel` directly from a block header, bypassing the update
    /// formula. A malformed step index is clamped into table range rather than read out of
    /// bounds.
    fn seed(&mut self, channel: usize, sample: i16, step_index: u8) {
        self.last_sample[channel] = sample;
        self.step_index[channel] = i16::from(step_index).clamp(0, 88);
    }
}

/// Decodes a run of whole IMA ADPCM blocks into interleaved 16-bit little-endian PCM, appending
/// to `out`.
///
/// The input must be an exact multiple of `format.block_align` bytes; a ragged length is
/// rejected as malformed before any state is touched.
pub fn decode(
    state: &mut ImaState,
    format: &AudioFormat,
    src: &[u8],
    out: &mut SampleBuf,
) -> Result<()> {
    let block_align = usize::from(format.block_align);
    let channels = usize::from(format.channels);
    let header_len = 4 * channels;

    if channels != 1 && channels != 2 {
        return decode_error("adpcm-ima: channel count must be 1 or 2");
    }
    if block_align <= header_len {
        return decode_error("adpcm-ima: block align does not exceed the block header");
    }
    if src.is_empty() || src.len() % block_align != 0 {
        warn!(
            "ima: input of {} bytes is not a whole number of {} byte blocks",
            src.len(),
            block_align
        );
        return decode_error("adpcm-ima: input is not a whole number of blocks");
    }
    if channels == 2 && (block_align - header_len) % 8 != 0 {
        return decode_error("adpcm-ima: stereo block body is not a whole number of groups");
    }

    out.ensure_capacity(src.len() * 4)?;

    for block in src.chunks_exact(block_align) {
        for channel in 0..channels {
            let header = &block[channel * 4..(channel + 1) * 4];
            state.seed(channel, i16_le(header, 0), header[2]);
        }

        let body = &block[header_len..];

        if channels == 2 {
            for group in body.chunks_exact(8) {
                // 8 source bytes expand to 4 left and 4 right frames, written at the
                // byte-interleaved offsets the encoder's pack map mirrors.
                let mut pcm = [0u8; 32];
                for (i, &byte) in group.iter().enumerate() {
                    let channel = if i < 4 { 0 } else { 1 };
                    let offset = ((i & 3) << 3) + (channel << 1);

                    let low = state.expand_code(channel, Nibble::Lower.get_nibble(byte));
                    pcm[offset..offset + 2].copy_from_slice(&low.to_le_bytes());

                    let high = state.expand_code(channel, Nibble::Upper.get_nibble(byte));
                    pcm[offset + 4..offset + 6].copy_from_slice(&high.to_le_bytes());
                }
                out.write_bytes(&pcm);
            }
        }
        else {
            for &byte in body {
                out.write_i16_le(state.expand_code(0, Nibble::Lower.get_nibble(byte)));
                out.write_i16_le(state.expand_code(0, Nibble::Upper.get_nibble(byte)));
            }
        }
    }

    Ok(())
}

/// Encodes interleaved 16-bit little-endian PCM into IMA ADPCM, appending to `out`.
///
/// A block header, carrying the current per-channel state, is emitted whenever the output lands
/// on a `block_align` boundary. Input is consumed in whole packing units (2 mono samples or 8
/// stereo frames); a shorter tail is left unconsumed.
pub fn encode(
    state: &mut ImaState,
    format: &AudioFormat,
    src: &[u8],
    out: &mut SampleBuf,
) -> Result<()> {
    let block_align = usize::from(format.block_align);
    let channels = usize::from(format.channels);
    let header_len = 4 * channels;

    if channels != 1 && channels != 2 {
        return encode_error("adpcm-ima: channel count must be 1 or 2");
    }
    if block_align <= header_len {
        return encode_error("adpcm-ima: block align does not exceed the block header");
    }
    if channels == 2 && (block_align - header_len) % 8 != 0 {
        return encode_error("adpcm-ima: stereo block body is not a whole number of groups");
    }

    out.ensure_capacity(src.len())?;

    let start = out.position();
    let chunk = chunk_len(channels);
    let mut src = src;

    while src.len() >= chunk {
        if (out.position() - start) % block_align == 0 {
            for channel in 0..channels {
                out.write_i16_le(state.last_sample[channel]);
                out.write_u8(state.step_index[channel] as u8);
                out.write_u8(0);
            }
        }

        if channels == 2 {
            let mut group = [0u8; 8];
            for (i, &(byte, shift)) in IMA_STEREO_PACK_MAP.iter().enumerate() {
                let sample = i16_le(src, 2 * i);
                let code = state.compress_sample(i % 2, sample);
                group[byte] |= code << shift;
            }
            out.write_bytes(&group);
        }
        else {
            let low = state.compress_sample(0, i16_le(src, 0));
            let high = state.compress_sample(0, i16_le(src, 2));
            out.write_u8(low | (high << 4));
        }

        src = &src[chunk..];
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use rdaudio_core::audio::{AudioFormat, WaveFormat};
    use rdaudio_core::buf::SampleBuf;

    use super::*;

    fn ima_format(channels: u16, block_align: u16) -> AudioFormat {
        AudioFormat::new(WaveFormat::ImaAdpcm, channels, 8000, 4, block_align)
    }

    #[test]
    fn verify_step_index_stays_in_table_range() {
        let mut rng = SmallRng::seed_from_u64(0x1357_9bdf);
        let mut state = ImaState::default();

        for _ in 0..10_000 {
            let code = rng.random_range(0..16u32) as u8;
            let _ = state.expand_code(0, code);
            assert!(state.step_index[0] >= 0 && state.step_index[0] <= 88);
        }

        // The encoder runs the same index update.
        for _ in 0..10_000 {
            let sample = rng.random_range(i32::from(i16::MIN)..=i32::from(i16::MAX)) as i16;
            let _ = state.compress_sample(1, sample);
            assert!(state.step_index[1] >= 0 && state.step_index[1] <= 88);
        }
    }

    #[test]
    fn verify_zero_codes_hold_seeded_sample_at_step_zero() {
        // Header seeds last_sample = 0 and step index 0. A code of 0 adds step >> 3, and the
        // first step size (7) shifts down to 0, so the output holds at the seeded sample.
        let mut block = vec![0u8; 256];
        block[0] = 0x00;
        block[1] = 0x00;
        block[2] = 0x00;

        let mut state = ImaState::default();
        let mut out = SampleBuf::new();
        decode(&mut state, &ima_format(1, 256), &block, &mut out).unwrap();

        assert_eq!(out.len(), 252 * 2 * 2);
        for pair in out.as_slice().chunks_exact(2) {
            assert_eq!(i16::from_le_bytes([pair[0], pair[1]]), 0);
        }
    }

    #[test]
    fn verify_zero_codes_walk_down_the_step_table() {
        // Seed last_sample = 100 and step index 24. Every zero code adds the current
        // step >> 3 and then steps the index down by one, so the output climbs by the
        // table-walk increments 9, 8, 7, ... until the index pins at 0 and holds level.
        let mut block = vec![0u8; 256];
        block[0] = 100;
        block[1] = 0;
        block[2] = 24;

        let mut state = ImaState::default();
        let mut out = SampleBuf::new();
        decode(&mut state, &ima_format(1, 256), &block, &mut out).unwrap();

        let samples: Vec<i16> =
            out.as_slice().chunks_exact(2).map(|b| i16::from_le_bytes([b[0], b[1]])).collect();

        let mut expected = Vec::new();
        let mut level: i32 = 100;
        let mut index: i16 = 24;
        for _ in 0..samples.len() {
            level += IMA_STEP_TABLE[index as usize] >> 3;
            index = (index - 1).max(0);
            expected.push(level as i16);
        }

        assert_eq!(samples, expected);
        // The first increments and the pinned tail, spelled out.
        assert_eq!(&samples[..6], &[109, 117, 124, 130, 136, 141]);
        assert_eq!(samples[24], 180);
        assert!(samples[25..].iter().all(|&s| s == 180));
    }

    #[test]
    fn verify_out_of_range_header_step_index_is_clamped() {
        let mut block = vec![0u8; 256];
        block[2] = 200;

        let mut state = ImaState::default();
        let mut out = SampleBuf::new();
        // Must not panic on a table lookup; the index is clamped to 88.
        decode(&mut state, &ima_format(1, 256), &block, &mut out).unwrap();
        assert!(state.step_index[0] <= 88);
    }

    #[test]
    fn verify_ragged_input_is_rejected() {
        let block = vec![0u8; 255];
        let mut state = ImaState::default();
        let mut out = SampleBuf::new();
        out.write_u8(0xaa);

        assert!(decode(&mut state, &ima_format(1, 256), &block, &mut out).is_err());
        assert_eq!(out.as_slice(), &[0xaa]);
    }

    #[test]
    fn verify_stereo_pack_map_inverts_group_walk() {
        // The decoder visits group byte i for channel (i < 4 ? 0 : 1), lower nibble first, and
        // writes frame (i & 3) * 2 for the lower nibble and frame (i & 3) * 2 + 1 for the upper.
        // Walking the encoder's map must land every sample code on exactly that byte and shift.
        for i in 0..16 {
            let (byte, shift) = IMA_STEREO_PACK_MAP[i];
            let channel = i % 2;
            let frame = i / 2;

            let decode_channel = if byte < 4 { 0 } else { 1 };
            let decode_frame = 2 * (byte & 3) + usize::from(shift == 4);

            assert_eq!(decode_channel, channel);
            assert_eq!(decode_frame, frame);
        }
    }

    #[test]
    fn verify_mono_block_round_trip_alignment() {
        // One mono 256-byte block carries 252 body bytes, i.e. 504 samples (1008 PCM bytes).
        let mut pcm = Vec::new();
        for i in 0..504i32 {
            let sample = (4000.0 * (i as f64 * 0.16).sin()) as i16;
            pcm.extend_from_slice(&sample.to_le_bytes());
        }

        let format = ima_format(1, 256);
        let mut enc_state = ImaState::default();
        let mut encoded = SampleBuf::new();
        encode(&mut enc_state, &format, &pcm, &mut encoded).unwrap();
        assert_eq!(encoded.len(), 256);

        let mut dec_state = ImaState::default();
        let mut decoded = SampleBuf::new();
        decode(&mut dec_state, &format, encoded.as_slice(), &mut decoded).unwrap();
        assert_eq!(decoded.len(), pcm.len());
    }
}
