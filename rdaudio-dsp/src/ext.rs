// RdAudio
// Copyright (c) 2026 The Project RdAudio Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `ext` module defines the uniform call contract for external codec backends.
//!
//! GSM 6.10, MPEG Layer III, and AAC are not implemented by RdAudio itself; their real
//! computation is delegated to a third-party library behind this trait. RdAudio only manages the
//! handle lifecycle and routes raw bytes in and out.

use rdaudio_core::audio::{AudioFormat, WaveFormat};
use rdaudio_core::buf::SampleBuf;
use rdaudio_core::errors::Result;

/// A codec backend for one of the externally-implemented wire formats.
///
/// A backend is registered on a [`DspContext`](crate::DspContext) and lives as long as the
/// context. The context invokes [`reopen`](ExternalCodec::reopen) whenever the negotiated format
/// changes, so the backend can tear down and re-create any underlying handles sized to the new
/// rate and channel count; partially-consumed stream setup (for example an AAC decoder's
/// one-shot stream initialization) must be discarded by it as well.
///
/// The `scratch` buffer passed to `encode` and `decode` is the owning context's general-purpose
/// working buffer. Backends may stage intermediate data there; its contents do not survive
/// across calls.
pub trait ExternalCodec {
    /// The wire format this backend implements.
    fn wire_format(&self) -> WaveFormat;

    /// Tears down and re-creates the backend's handles for a newly negotiated format.
    fn reopen(&mut self, format: &AudioFormat) -> Result<()>;

    /// Encodes a run of interleaved 16-bit PCM into the backend's wire format, appending to
    /// `out`.
    fn encode(
        &mut self,
        format: &AudioFormat,
        src: &[u8],
        scratch: &mut SampleBuf,
        out: &mut SampleBuf,
    ) -> Result<()>;

    /// Decodes a run of wire data into interleaved 16-bit PCM, appending to `out`.
    fn decode(
        &mut self,
        format: &AudioFormat,
        src: &[u8],
        scratch: &mut SampleBuf,
        out: &mut SampleBuf,
    ) -> Result<()>;
}
