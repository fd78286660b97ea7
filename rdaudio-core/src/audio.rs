// RdAudio
// Copyright (c) 2026 The Project RdAudio Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `audio` module defines the negotiated wire format tags and the audio format descriptor.

use crate::errors::{unsupported_error, Result};

/// The registered wave format tag for raw linear PCM.
pub const WAVE_FORMAT_PCM: u16 = 0x0001;
/// The registered wave format tag for Microsoft ADPCM.
pub const WAVE_FORMAT_ADPCM: u16 = 0x0002;
/// The registered wave format tag for IMA (DVI) ADPCM.
pub const WAVE_FORMAT_DVI_ADPCM: u16 = 0x0011;
/// The registered wave format tag for GSM 6.10 full-rate speech.
pub const WAVE_FORMAT_GSM610: u16 = 0x0031;
/// The registered wave format tag for MPEG-1 Layer III.
pub const WAVE_FORMAT_MPEGLAYER3: u16 = 0x0055;
/// The registered wave format tag for MPEG-4 AAC.
pub const WAVE_FORMAT_AAC_MS: u16 = 0xa106;

/// `WaveFormat` enumerates the wire encodings negotiable on the audio redirection channel.
///
/// The first three are implemented by RdAudio itself; the remainder require an external codec
/// backend.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum WaveFormat {
    /// Uncompressed linear PCM.
    Pcm,
    /// Microsoft ADPCM.
    MsAdpcm,
    /// IMA (DVI) ADPCM.
    ImaAdpcm,
    /// GSM 6.10 full-rate speech.
    Gsm610,
    /// MPEG-1 Layer III.
    Mp3,
    /// MPEG-4 AAC.
    Aac,
}

impl WaveFormat {
    /// Gets the registered wave format tag value for this format.
    pub fn tag(&self) -> u16 {
        match self {
            WaveFormat::Pcm => WAVE_FORMAT_PCM,
            WaveFormat::MsAdpcm => WAVE_FORMAT_ADPCM,
            WaveFormat::ImaAdpcm => WAVE_FORMAT_DVI_ADPCM,
            WaveFormat::Gsm610 => WAVE_FORMAT_GSM610,
            WaveFormat::Mp3 => WAVE_FORMAT_MPEGLAYER3,
            WaveFormat::Aac => WAVE_FORMAT_AAC_MS,
        }
    }

    /// Maps a registered wave format tag value onto a `WaveFormat`.
    pub fn from_tag(tag: u16) -> Result<WaveFormat> {
        match tag {
            WAVE_FORMAT_PCM => Ok(WaveFormat::Pcm),
            WAVE_FORMAT_ADPCM => Ok(WaveFormat::MsAdpcm),
            WAVE_FORMAT_DVI_ADPCM => Ok(WaveFormat::ImaAdpcm),
            WAVE_FORMAT_GSM610 => Ok(WaveFormat::Gsm610),
            WAVE_FORMAT_MPEGLAYER3 => Ok(WaveFormat::Mp3),
            WAVE_FORMAT_AAC_MS => Ok(WaveFormat::Aac),
            _ => unsupported_error("audio: unknown wave format tag"),
        }
    }

    /// Returns true if the wire data of this format is framed into fixed-size blocks of
    /// `block_align` bytes.
    pub fn is_block_framed(&self) -> bool {
        matches!(self, WaveFormat::MsAdpcm | WaveFormat::ImaAdpcm)
    }
}

/// `AudioFormat` is the immutable descriptor of one negotiated stream format.
///
/// All fields are supplied by the format negotiation; RdAudio never mutates a caller's
/// descriptor, only its own stored copy.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AudioFormat {
    /// The wire encoding.
    pub format: WaveFormat,
    /// The number of interleaved channels.
    pub channels: u16,
    /// The number of samples per second, per channel.
    pub rate: u32,
    /// The number of bits per sample on the wire.
    pub bits_per_sample: u16,
    /// The byte length of one self-contained compressed block, including its header. Meaningless
    /// for raw PCM.
    pub block_align: u16,
}

impl AudioFormat {
    /// Instantiates a new `AudioFormat`.
    pub fn new(
        format: WaveFormat,
        channels: u16,
        rate: u32,
        bits_per_sample: u16,
        block_align: u16,
    ) -> AudioFormat {
        AudioFormat { format, channels, rate, bits_per_sample, block_align }
    }

    /// Gets the byte width of a single sample. PCM samples wider than 8 bits occupy two bytes.
    pub fn bytes_per_sample(&self) -> usize {
        if self.bits_per_sample > 8 {
            2
        }
        else {
            1
        }
    }

    /// Gets the byte length of one frame (one sample for every channel).
    pub fn frame_size(&self) -> usize {
        self.bytes_per_sample() * usize::from(self.channels)
    }

    /// Returns true if the descriptor satisfies the invariants the signal processing engine
    /// relies on: one or two channels, a non-zero rate, and a non-zero block align for
    /// block-framed formats.
    pub fn is_valid(&self) -> bool {
        if self.channels != 1 && self.channels != 2 {
            return false;
        }
        if self.rate == 0 {
            return false;
        }
        if self.format.is_block_framed() && self.block_align == 0 {
            return false;
        }
        true
    }
}
