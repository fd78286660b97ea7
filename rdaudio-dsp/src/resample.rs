// RdAudio
// Copyright (c) 2026 The Project RdAudio Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `resample` module converts a run of linear PCM between sample rates by nearest-neighbor
//! interpolation.

use rdaudio_core::audio::{AudioFormat, WaveFormat};
use rdaudio_core::buf::SampleBuf;
use rdaudio_core::errors::{invalid_argument_error, unsupported_error, Result};

/// Extra bytes reserved past the computed output size, mirroring the historical slack of the
/// redirection channel's scratch buffers.
const RESAMPLE_SLACK: usize = 1024;

/// Resamples a run of linear PCM described by `src_format` to the rate of `dst_format`,
/// appending the converted frames to `out`.
///
/// The source must be raw 8 or 16-bit PCM. The output frame count is the round-to-nearest
/// rational `round(sframes * dst_rate / src_rate)`, so repeated calls do not accumulate drift.
/// Each output frame is a copy of whichever of the two bracketing source frames lies closest on
/// the rational time axis; no sample blending is performed.
///
/// Changing the channel count while resampling is not supported and is rejected rather than
/// producing out-of-lane bytes.
pub fn resample(
    src: &[u8],
    src_format: &AudioFormat,
    dst_format: &AudioFormat,
    out: &mut SampleBuf,
) -> Result<()> {
    if src_format.format != WaveFormat::Pcm {
        return invalid_argument_error("dsp: resampler source must be linear pcm");
    }
    if src_format.channels != dst_format.channels {
        return unsupported_error("dsp: resampling cannot change the channel count");
    }
    if src_format.rate == 0 || dst_format.rate == 0 {
        return invalid_argument_error("dsp: resampler requires non-zero sample rates");
    }

    let src_rate = src_format.rate as usize;
    let dst_rate = dst_format.rate as usize;

    let frame_len = src_format.frame_size();
    let sframes = src.len() / frame_len;
    // Integer rounding correct division.
    let rframes = (sframes * dst_rate + (src_rate + 1) / 2) / src_rate;

    out.ensure_capacity(rframes * frame_len + RESAMPLE_SLACK)?;

    if sframes == 0 {
        return Ok(());
    }

    for i in 0..rframes {
        let mut n1 = i * src_rate / dst_rate;
        if n1 >= sframes {
            n1 = sframes - 1;
        }

        let exact = n1 * dst_rate == i * src_rate;
        let n2 = if exact || n1 == sframes - 1 { n1 } else { n1 + 1 };

        // Pick the bracketing source frame nearest to output instant i on the shared
        // src_rate * dst_rate time axis.
        let n = if n2 != n1 && (i * src_rate - n1 * dst_rate) > (n2 * dst_rate - i * src_rate) {
            n2
        }
        else {
            n1
        };

        out.write_bytes(&src[n * frame_len..(n + 1) * frame_len]);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pcm(rate: u32, channels: u16) -> AudioFormat {
        AudioFormat::new(WaveFormat::Pcm, channels, rate, 16, 0)
    }

    #[test]
    fn verify_identity_when_rates_match() {
        let src: Vec<u8> = (0..=255).collect();
        let mut out = SampleBuf::new();

        resample(&src, &pcm(44100, 2), &pcm(44100, 2), &mut out).unwrap();
        assert_eq!(out.as_slice(), &src[..]);
    }

    #[test]
    fn verify_exact_doubling_and_halving() {
        // 100 frames of mono 16-bit PCM.
        let mut src = Vec::new();
        for i in 0..100i16 {
            src.extend_from_slice(&i.to_le_bytes());
        }

        let mut doubled = SampleBuf::new();
        resample(&src, &pcm(22050, 1), &pcm(44100, 1), &mut doubled).unwrap();
        assert_eq!(doubled.len(), 2 * src.len());

        let mut halved = SampleBuf::new();
        resample(&src, &pcm(44100, 1), &pcm(22050, 1), &mut halved).unwrap();
        assert_eq!(halved.len(), src.len() / 2);
    }

    #[test]
    fn verify_non_integer_ratio_rounds_to_nearest() {
        // 1000 frames from 8000 Hz to 11025 Hz: 1000 * 11025 / 8000 = 1378.125, rounding to
        // 1378 frames.
        let src = vec![0u8; 1000 * 2];
        let mut out = SampleBuf::new();

        resample(&src, &pcm(8000, 1), &pcm(11025, 1), &mut out).unwrap();
        assert_eq!(out.len(), 1378 * 2);
    }

    #[test]
    fn verify_channel_count_change_rejected() {
        let src = vec![0u8; 64];
        let mut out = SampleBuf::new();

        assert!(resample(&src, &pcm(22050, 1), &pcm(44100, 2), &mut out).is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn verify_non_pcm_source_rejected() {
        let src = vec![0u8; 64];
        let mut format = pcm(22050, 1);
        format.format = WaveFormat::ImaAdpcm;
        let mut out = SampleBuf::new();

        assert!(resample(&src, &format, &pcm(44100, 1), &mut out).is_err());
    }
}
