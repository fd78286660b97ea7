// RdAudio
// Copyright (c) 2026 The Project RdAudio Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Digital signal processing pipeline for the audio redirection channel.
//!
//! `rdaudio-dsp` sits between an audio capture/playback layer, which always produces or consumes
//! linear PCM at a device rate, and a network channel that negotiates one of several wire
//! formats at a fixed target rate. A [`DspContext`] owns the per-stream state for one direction:
//! it resamples source PCM to the negotiated rate on the encode path, and routes data through
//! the wire codec the negotiated format selects.
//!
//! Raw PCM and both ADPCM variants are processed in-crate; GSM 6.10, MPEG Layer III, and AAC
//! require a backend registered through the [`ext::ExternalCodec`] contract.
//!
//! A context is not safe for concurrent use; one context serves one logical stream in one
//! direction, and the owning thread serializes all calls. Every operation is synchronous and
//! bounded; it either completes or fails without advancing the output buffer.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]
// The following lints are allowed in all RdAudio crates. Please see the workspace Cargo.toml for
// their justification.
#![allow(clippy::comparison_chain)]
#![allow(clippy::identity_op)]
#![allow(clippy::manual_range_contains)]

pub mod ext;
pub mod resample;

pub use resample::resample;

use log::{debug, warn};

use rdaudio_codec_adpcm::{ima, ms, AdpcmState, ImaState, MsState};
use rdaudio_core::audio::{AudioFormat, WaveFormat};
use rdaudio_core::buf::SampleBuf;
use rdaudio_core::errors::{invalid_argument_error, unsupported_error, Result};

use crate::ext::ExternalCodec;

/// Initial capacity of a context's scratch buffers.
const SCRATCH_CAPACITY: usize = 4096;

/// The direction a [`DspContext`] operates in, fixed at creation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DspMode {
    /// The context accepts `encode` calls only.
    Encode,
    /// The context accepts `decode` calls only.
    Decode,
}

/// Dispatch target selected once per format negotiation and cached on the context.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum CodecKind {
    Pcm,
    MsAdpcm,
    ImaAdpcm,
    External,
}

impl CodecKind {
    fn for_format(format: WaveFormat) -> CodecKind {
        match format {
            WaveFormat::Pcm => CodecKind::Pcm,
            WaveFormat::MsAdpcm => CodecKind::MsAdpcm,
            WaveFormat::ImaAdpcm => CodecKind::ImaAdpcm,
            WaveFormat::Gsm610 | WaveFormat::Mp3 | WaveFormat::Aac => CodecKind::External,
        }
    }
}

/// The outcome of one format negotiation.
#[derive(Copy, Clone)]
struct Negotiated {
    format: AudioFormat,
    codec: CodecKind,
}

/// Reports whether `format` can be processed in the given direction by this build.
///
/// Raw PCM and both ADPCM variants are always supported in both directions. The external
/// formats follow the backend features the build declares (`gsm`, `mp3`, `aac`); their encode
/// directions are additionally gated by the `experimental` feature.
pub fn supports_format(format: &AudioFormat, encode: bool) -> bool {
    match format.format {
        WaveFormat::Pcm | WaveFormat::MsAdpcm | WaveFormat::ImaAdpcm => true,
        WaveFormat::Gsm610 => cfg!(feature = "gsm") && (!encode || cfg!(feature = "experimental")),
        WaveFormat::Mp3 => cfg!(feature = "mp3") && (!encode || cfg!(feature = "experimental")),
        WaveFormat::Aac => cfg!(feature = "aac") && (!encode || cfg!(feature = "experimental")),
    }
}

/// Per-stream digital signal processing context.
///
/// A context is created for exactly one direction and holds the negotiated target format, the
/// ADPCM codec state, two scratch buffers, and an optional external codec backend. Dropping the
/// context releases everything it owns, including backend handles.
pub struct DspContext {
    mode: DspMode,
    negotiated: Option<Negotiated>,
    adpcm: Option<AdpcmState>,
    /// General-purpose working buffer, lent to external backends as staging space.
    buffer: SampleBuf,
    /// Holds resampler output on the encode path.
    resample: SampleBuf,
    external: Option<Box<dyn ExternalCodec>>,
}

impl DspContext {
    /// Instantiates a context for one logical stream in the given direction. No format is
    /// negotiated yet; [`reset`](DspContext::reset) must be called before any data flows.
    pub fn new(mode: DspMode) -> DspContext {
        DspContext {
            mode,
            negotiated: None,
            adpcm: None,
            buffer: SampleBuf::with_capacity(SCRATCH_CAPACITY),
            resample: SampleBuf::with_capacity(SCRATCH_CAPACITY),
            external: None,
        }
    }

    /// The direction this context operates in.
    pub fn mode(&self) -> DspMode {
        self.mode
    }

    /// The currently negotiated target format, if any.
    pub fn format(&self) -> Option<&AudioFormat> {
        self.negotiated.as_ref().map(|n| &n.format)
    }

    /// Registers a backend for one of the external wire formats, replacing any previous backend.
    /// If a format has already been negotiated for the backend's wire format, the backend is
    /// opened for it immediately.
    pub fn register_external(&mut self, mut backend: Box<dyn ExternalCodec>) -> Result<()> {
        if let Some(negotiated) = &self.negotiated {
            if negotiated.format.format == backend.wire_format() {
                backend.reopen(&negotiated.format)?;
            }
        }
        self.external = Some(backend);
        Ok(())
    }

    /// Replaces the negotiated target format, for example after a mid-session renegotiation.
    ///
    /// Selects the dispatch target for the new wire tag and reopens any registered external
    /// backend sized to the new rate and channel count. ADPCM history is deliberately not
    /// cleared unless the variant changes; the next block header re-seeds it.
    ///
    /// On failure the previously negotiated format, if any, remains in effect.
    pub fn reset(&mut self, target: &AudioFormat) -> Result<()> {
        if !target.is_valid() {
            return invalid_argument_error("dsp: target format is invalid");
        }

        let codec = CodecKind::for_format(target.format);

        match codec {
            CodecKind::ImaAdpcm => {
                if !matches!(self.adpcm, Some(AdpcmState::Ima(_))) {
                    self.adpcm = Some(AdpcmState::Ima(ImaState::default()));
                }
            }
            CodecKind::MsAdpcm => {
                if !matches!(self.adpcm, Some(AdpcmState::Ms(_))) {
                    self.adpcm = Some(AdpcmState::Ms(MsState::default()));
                }
            }
            _ => (),
        }

        if codec == CodecKind::External {
            if let Some(backend) = self.external.as_mut() {
                if backend.wire_format() == target.format {
                    backend.reopen(target)?;
                }
            }
        }

        debug!(
            "dsp: negotiated {:?}, {} channel(s) at {} Hz, block align {}",
            target.format, target.channels, target.rate, target.block_align
        );

        self.negotiated = Some(Negotiated { format: *target, codec });
        Ok(())
    }

    /// Encodes a run of source PCM into the negotiated wire format, appending to `out`.
    ///
    /// If the source rate differs from the negotiated target rate the input is resampled first
    /// and the resampled frames are encoded instead. On failure `out` is restored to its entry
    /// length and the context's persistent state is left unchanged.
    pub fn encode(&mut self, src_format: &AudioFormat, data: &[u8], out: &mut SampleBuf) -> Result<()> {
        if self.mode != DspMode::Encode {
            return invalid_argument_error("dsp: encode called on a decoder context");
        }
        let negotiated = match self.negotiated {
            Some(negotiated) => negotiated,
            None => return invalid_argument_error("dsp: no format has been negotiated"),
        };

        let mark = out.position();
        let result = self.encode_inner(negotiated, src_format, data, out);
        if result.is_err() {
            out.truncate(mark);
        }
        result
    }

    fn encode_inner(
        &mut self,
        negotiated: Negotiated,
        src_format: &AudioFormat,
        data: &[u8],
        out: &mut SampleBuf,
    ) -> Result<()> {
        let data: &[u8] = if src_format.rate != negotiated.format.rate {
            self.resample.clear();
            resample(data, src_format, &negotiated.format, &mut self.resample)?;
            self.resample.as_slice()
        }
        else {
            data
        };

        match negotiated.codec {
            CodecKind::Pcm => {
                out.ensure_capacity(data.len())?;
                out.write_bytes(data);
                Ok(())
            }
            CodecKind::ImaAdpcm => match self.adpcm.as_mut() {
                Some(AdpcmState::Ima(state)) => ima::encode(state, &negotiated.format, data, out),
                _ => invalid_argument_error("dsp: adpcm state does not match the format"),
            },
            CodecKind::MsAdpcm => match self.adpcm.as_mut() {
                Some(AdpcmState::Ms(state)) => ms::encode(state, &negotiated.format, data, out),
                _ => invalid_argument_error("dsp: adpcm state does not match the format"),
            },
            CodecKind::External => match self.external.as_mut() {
                Some(backend) => {
                    backend.encode(&negotiated.format, data, &mut self.buffer, out)
                }
                None => {
                    warn!("dsp: no backend registered for {:?}", negotiated.format.format);
                    unsupported_error("dsp: no external codec backend registered")
                }
            },
        }
    }

    /// Decodes a run of wire data into interleaved 16-bit PCM at the negotiated rate, appending
    /// to `out`.
    ///
    /// No resampling is applied on the decode path; converting the output to a playback device
    /// rate is the caller's responsibility. On failure `out` is restored to its entry length and
    /// the context's persistent state is left unchanged.
    pub fn decode(&mut self, src_format: &AudioFormat, data: &[u8], out: &mut SampleBuf) -> Result<()> {
        if self.mode != DspMode::Decode {
            return invalid_argument_error("dsp: decode called on an encoder context");
        }
        let negotiated = match self.negotiated {
            Some(negotiated) => negotiated,
            None => return invalid_argument_error("dsp: no format has been negotiated"),
        };
        if src_format.format != negotiated.format.format {
            return invalid_argument_error("dsp: source format does not match the negotiation");
        }

        let mark = out.position();
        let result = self.decode_inner(negotiated, data, out);
        if result.is_err() {
            out.truncate(mark);
        }
        result
    }

    fn decode_inner(&mut self, negotiated: Negotiated, data: &[u8], out: &mut SampleBuf) -> Result<()> {
        match negotiated.codec {
            CodecKind::Pcm => {
                out.ensure_capacity(data.len())?;
                out.write_bytes(data);
                Ok(())
            }
            CodecKind::ImaAdpcm => match self.adpcm.as_mut() {
                Some(AdpcmState::Ima(state)) => ima::decode(state, &negotiated.format, data, out),
                _ => invalid_argument_error("dsp: adpcm state does not match the format"),
            },
            CodecKind::MsAdpcm => match self.adpcm.as_mut() {
                Some(AdpcmState::Ms(state)) => ms::decode(state, &negotiated.format, data, out),
                _ => invalid_argument_error("dsp: adpcm state does not match the format"),
            },
            CodecKind::External => match self.external.as_mut() {
                Some(backend) => {
                    backend.decode(&negotiated.format, data, &mut self.buffer, out)
                }
                None => {
                    warn!("dsp: no backend registered for {:?}", negotiated.format.format);
                    unsupported_error("dsp: no external codec backend registered")
                }
            },
        }
    }
}
