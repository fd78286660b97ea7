// RdAudio
// Copyright (c) 2026 The Project RdAudio Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Microsoft ADPCM encoder and decoder.
//!
//! Each compressed block opens with a 7-byte header per channel (predictor index, initial delta,
//! and the two seed samples, channel-major for stereo) followed by 4-bit sample codes packed two
//! per byte, upper nibble first. The decoder emits the two header-carried seed samples before
//! expanding any codes, so a block of `block_align` bytes always reconstructs a fixed number of
//! frames.

use log::warn;

use rdaudio_core::audio::AudioFormat;
use rdaudio_core::buf::SampleBuf;
use rdaudio_core::errors::{decode_error, encode_error, Result};
use rdaudio_core::util::clamp::clamp_i16;

use crate::common::{i16_le, Nibble};

#[rustfmt::skip]
const MS_ADAPTATION_TABLE: [i32; 16] = [
    230, 230, 230, 230, 307, 409, 512, 614,
    768, 614, 512, 409, 307, 230, 230, 230,
];

const MS_COEFFS1: [i32; 7] = [256, 512, 0, 192, 240, 460, 392];
const MS_COEFFS2: [i32; 7] = [0, -256, 0, 64, 0, -208, -232];

/// The adaptive step is floored here after every update and before every encode run.
const DELTA_MIN: i32 = 16;

/// Reinterprets a 4-bit code as a signed value in [-8, 7].
fn signed_nibble(nibble: u8) -> i8 {
    if (nibble & 0x08) != 0 {
        nibble as i8 - 0x10
    }
    else {
        nibble as i8
    }
}

/// Per-channel predictor state for the Microsoft ADPCM codec.
///
/// `predictor` selects one of the seven fixed coefficient pairs and is re-read from every block
/// header. `delta` is the adaptive quantization step, never allowed below [`DELTA_MIN`] by an
/// update. `sample1`/`sample2` are the two-sample prediction history.
#[derive(Copy, Clone, Debug, Default)]
pub struct MsState {
    predictor: [u8; 2],
    delta: [i32; 2],
    sample1: [i32; 2],
    sample2: [i32; 2],
}

impl MsState {
    /// The fixed-point linear prediction from the two-sample history.
    fn predict(&self, channel: usize) -> i32 {
        let coeff = usize::from(self.predictor[channel]);
        (self.sample1[channel] * MS_COEFFS1[coeff] + self.sample2[channel] * MS_COEFFS2[coeff])
            / 256
    }

    /// Expands one 4-bit code for `channel` into a 16-bit sample, advancing the prediction
    /// history and adapting the step.
    fn expand_code(&mut self, channel: usize, code: u8) -> i16 {
        let signed = i32::from(signed_nibble(code));
        let sample = clamp_i16(self.predict(channel) + signed * self.delta[channel]);

        self.sample2[channel] = self.sample1[channel];
        self.sample1[channel] = i32::from(sample);
        // The adaptation table is indexed by the raw code, not the signed value.
        self.delta[channel] =
            (self.delta[channel] * MS_ADAPTATION_TABLE[usize::from(code & 0x0f)]) / 256;
        self.delta[channel] = self.delta[channel].max(DELTA_MIN);

        sample
    }

    /// Quantizes one 16-bit sample for `channel` into a 4-bit code, rounding the residual
    /// half-up, clamping to [-8, 7], and running the identical state update as the decoder.
    fn compress_sample(&mut self, channel: usize, sample: i32) -> u8 {
        let predicted = self.predict(channel);
        let delta = self.delta[channel];

        let mut errordelta = (sample - predicted) / delta;
        if (sample - predicted) % delta > delta / 2 {
            errordelta += 1;
        }
        errordelta = errordelta.clamp(-8, 7);

        let reconstructed = clamp_i16(predicted + delta * errordelta);
        let code = (errordelta as u8) & 0x0f;

        self.sample2[channel] = self.sample1[channel];
        self.sample1[channel] = i32::from(reconstructed);
        self.delta[channel] = (self.delta[channel] * MS_ADAPTATION_TABLE[usize::from(code)]) / 256;
        self.delta[channel] = self.delta[channel].max(DELTA_MIN);

        code
    }

    /// Re-seeds one channel directly from block header fields. A predictor index past the
    /// coefficient tables is clamped rather than read out of bounds.
    fn seed(&mut self, channel: usize, predictor: u8, delta: i16, sample1: i16, sample2: i16) {
        if predictor > 6 {
            warn!("ms: block predictor {} out of range, clamping", predictor);
        }
        self.predictor[channel] = predictor.min(6);
        self.delta[channel] = i32::from(delta);
        self.sample1[channel] = i32::from(sample1);
        self.sample2[channel] = i32::from(sample2);
    }
}

/// Decodes a run of whole Microsoft ADPCM blocks into interleaved 16-bit little-endian PCM,
/// appending to `out`.
///
/// The input must be an exact multiple of `format.block_align` bytes; a ragged length is
/// rejected as malformed before any state is touched.
pub fn decode(
    state: &mut MsState,
    format: &AudioFormat,
    src: &[u8],
    out: &mut SampleBuf,
) -> Result<()> {
    let block_align = usize::from(format.block_align);
    let channels = usize::from(format.channels);
    let header_len = 7 * channels;

    if channels != 1 && channels != 2 {
        return decode_error("adpcm-ms: channel count must be 1 or 2");
    }
    if block_align <= header_len {
        return decode_error("adpcm-ms: block align does not exceed the block header");
    }
    if src.is_empty() || src.len() % block_align != 0 {
        warn!(
            "ms: input of {} bytes is not a whole number of {} byte blocks",
            src.len(),
            block_align
        );
        return decode_error("adpcm-ms: input is not a whole number of blocks");
    }

    out.ensure_capacity(src.len() * 4)?;

    for block in src.chunks_exact(block_align) {
        if channels == 2 {
            state.seed(0, block[0], i16_le(block, 2), i16_le(block, 6), i16_le(block, 10));
            state.seed(1, block[1], i16_le(block, 4), i16_le(block, 8), i16_le(block, 12));

            // The header-carried history seeds the output stream, oldest first.
            out.write_i16_le(state.sample2[0] as i16);
            out.write_i16_le(state.sample2[1] as i16);
            out.write_i16_le(state.sample1[0] as i16);
            out.write_i16_le(state.sample1[1] as i16);
        }
        else {
            state.seed(0, block[0], i16_le(block, 1), i16_le(block, 3), i16_le(block, 5));

            out.write_i16_le(state.sample2[0] as i16);
            out.write_i16_le(state.sample1[0] as i16);
        }

        for &byte in &block[header_len..] {
            let high = state.expand_code(0, Nibble::Upper.get_nibble(byte));
            out.write_i16_le(high);

            let channel = if channels == 2 { 1 } else { 0 };
            let low = state.expand_code(channel, Nibble::Lower.get_nibble(byte));
            out.write_i16_le(low);
        }
    }

    Ok(())
}

/// Encodes interleaved 16-bit little-endian PCM into Microsoft ADPCM, appending to `out`.
///
/// Whenever the output lands on a `block_align` boundary a block header is emitted. The header's
/// seed samples are read two frames ahead from the raw input rather than derived from codec
/// state, consuming those frames; per-code encoding then resumes. Input is consumed while at
/// least one header-plus-code step (8 bytes mono, 12 bytes stereo) remains, so a shorter tail is
/// left unconsumed.
pub fn encode(
    state: &mut MsState,
    format: &AudioFormat,
    src: &[u8],
    out: &mut SampleBuf,
) -> Result<()> {
    let block_align = usize::from(format.block_align);
    let channels = usize::from(format.channels);
    let header_len = 7 * channels;

    if channels != 1 && channels != 2 {
        return encode_error("adpcm-ms: channel count must be 1 or 2");
    }
    if block_align <= header_len {
        return encode_error("adpcm-ms: block align does not exceed the block header");
    }

    out.ensure_capacity(src.len())?;

    for channel in 0..2 {
        state.delta[channel] = state.delta[channel].max(DELTA_MIN);
    }

    let start = out.position();
    let step = if channels == 2 { 12 } else { 8 };
    let mut src = src;

    while src.len() >= step {
        if (out.position() - start) % block_align == 0 {
            if channels == 2 {
                out.write_u8(state.predictor[0]);
                out.write_u8(state.predictor[1]);
                out.write_i16_le(state.delta[0] as i16);
                out.write_i16_le(state.delta[1] as i16);

                state.sample1[0] = i32::from(i16_le(src, 4));
                state.sample1[1] = i32::from(i16_le(src, 6));
                state.sample2[0] = i32::from(i16_le(src, 0));
                state.sample2[1] = i32::from(i16_le(src, 2));

                out.write_i16_le(state.sample1[0] as i16);
                out.write_i16_le(state.sample1[1] as i16);
                out.write_i16_le(state.sample2[0] as i16);
                out.write_i16_le(state.sample2[1] as i16);

                src = &src[8..];
            }
            else {
                out.write_u8(state.predictor[0]);
                out.write_i16_le(state.delta[0] as i16);

                state.sample1[0] = i32::from(i16_le(src, 2));
                state.sample2[0] = i32::from(i16_le(src, 0));

                out.write_i16_le(state.sample1[0] as i16);
                out.write_i16_le(state.sample2[0] as i16);

                src = &src[4..];
            }
        }

        let high = state.compress_sample(0, i32::from(i16_le(src, 0)));
        let channel = if channels == 2 { 1 } else { 0 };
        let low = state.compress_sample(channel, i32::from(i16_le(src, 2)));
        out.write_u8((high << 4) | low);

        src = &src[4..];
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

    fn ms_format(channels: u16, block_align: u16) -> AudioFormat {
        AudioFormat::new(WaveFormat::MsAdpcm, channels, 8000, 4, block_align)
    }

    #[test]
    fn verify_signed_nibble() {
        assert_eq!(signed_nibble(0x0), 0);
        assert_eq!(signed_nibble(0x7), 7);
        assert_eq!(signed_nibble(0x8), -8);
        assert_eq!(signed_nibble(0xf), -1);
    }

    #[test]
    fn verify_delta_never_drops_below_floor() {
        let mut rng = SmallRng::seed_from_u64(0x2468_ace0);
        let mut state = MsState::default();
        state.delta[0] = 512;

        for _ in 0..10_000 {
            let code = rng.random_range(0..16u32) as u8;
            let _ = state.expand_code(0, code);
            assert!(state.delta[0] >= DELTA_MIN);
        }

        state.delta[1] = DELTA_MIN;
        for _ in 0..10_000 {
            let sample = rng.random_range(i32::from(i16::MIN)..=i32::from(i16::MAX));
            let _ = state.compress_sample(1, sample);
            assert!(state.delta[1] >= DELTA_MIN);
        }
    }

    #[test]
    fn verify_header_seeds_lead_the_output() {
        // Mono block: predictor 0, delta 16, sample1 = 300, sample2 = -300, all-zero codes.
        // The first two output samples must be sample2 then sample1, straight from the header.
        let mut block = vec![0u8; 32];
        block[0] = 0;
        block[1..3].copy_from_slice(&16i16.to_le_bytes());
        block[3..5].copy_from_slice(&300i16.to_le_bytes());
        block[5..7].copy_from_slice(&(-300i16).to_le_bytes());

        let mut state = MsState::default();
        let mut out = SampleBuf::new();
        decode(&mut state, &ms_format(1, 32), &block, &mut out).unwrap();

        // 2 seed samples plus two samples per body byte.
        assert_eq!(out.len(), (2 + 2 * 25) * 2);
        assert_eq!(i16_le(out.as_slice(), 0), -300);
        assert_eq!(i16_le(out.as_slice(), 2), 300);

        // With coefficient pair 0 the prediction is sample1, so a zero code repeats it.
        assert_eq!(i16_le(out.as_slice(), 4), 300);
    }

    #[test]
    fn verify_out_of_range_predictor_is_clamped() {
        let mut block = vec![0u8; 32];
        block[0] = 0x7f;

        let mut state = MsState::default();
        let mut out = SampleBuf::new();
        // Must not panic on a coefficient table lookup.
        decode(&mut state, &ms_format(1, 32), &block, &mut out).unwrap();
        assert!(state.predictor[0] <= 6);
    }

    #[test]
    fn verify_ragged_input_is_rejected() {
        let block = vec![0u8; 100];
        let mut state = MsState::default();
        let mut out = SampleBuf::new();
        out.write_u8(0x55);

        assert!(decode(&mut state, &ms_format(1, 32), &block, &mut out).is_err());
        assert_eq!(out.as_slice(), &[0x55]);
    }

    #[test]
    fn verify_mono_header_layout() {
        // 8 frames of PCM: the first two are consumed into the header as the lookahead seeds.
        let samples: [i16; 8] = [-100, 200, -300, 400, -500, 600, -700, 800];
        let mut pcm = Vec::new();
        for sample in samples {
            pcm.extend_from_slice(&sample.to_le_bytes());
        }

        let mut state = MsState::default();
        let mut out = SampleBuf::new();
        encode(&mut state, &ms_format(1, 32), &pcm, &mut out).unwrap();

        let bytes = out.as_slice();
        // [predictor, delta_lo, delta_hi, sample1_lo, sample1_hi, sample2_lo, sample2_hi]
        assert_eq!(bytes[0], 0);
        assert_eq!(i16_le(bytes, 1), 16);
        assert_eq!(i16_le(bytes, 3), 200);
        assert_eq!(i16_le(bytes, 5), -100);
        // Of the six remaining frames, four pack into two code bytes and the final pair falls
        // under the 8-byte step guard and is left unconsumed.
        assert_eq!(bytes.len(), 7 + 2);
    }

    #[test]
    fn verify_stereo_header_layout() {
        // Two frames of stereo lookahead: (L, R) = (-100, 100) then (-200, 200), plus one frame
        // to encode so the 12-byte step guard admits the block.
        let samples: [i16; 6] = [-100, 100, -200, 200, -300, 300];
        let mut pcm = Vec::new();
        for sample in samples {
            pcm.extend_from_slice(&sample.to_le_bytes());
        }

        let mut state = MsState::default();
        let mut out = SampleBuf::new();
        encode(&mut state, &ms_format(2, 64), &pcm, &mut out).unwrap();

        let bytes = out.as_slice();
        // [pred0, pred1, delta0, delta1, sample1_0, sample1_1, sample2_0, sample2_1]
        assert_eq!(bytes[0], 0);
        assert_eq!(bytes[1], 0);
        assert_eq!(i16_le(bytes, 2), 16);
        assert_eq!(i16_le(bytes, 4), 16);
        assert_eq!(i16_le(bytes, 6), -200);
        assert_eq!(i16_le(bytes, 8), 200);
        assert_eq!(i16_le(bytes, 10), -100);
        assert_eq!(i16_le(bytes, 12), 100);
        assert_eq!(bytes.len(), 14 + 1);
    }
}
