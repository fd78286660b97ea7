// RdAudio
// Copyright (c) 2026 The Project RdAudio Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Adaptive Differential Pulse Code Modulation (ADPCM) wire codecs for Project RdAudio.
//!
//! This crate implements the two block-framed 4-bit ADPCM encodings carried by the audio
//! redirection channel: IMA (DVI) ADPCM and Microsoft ADPCM. Both directions are supported and
//! the encoder runs the identical state update as the decoder, so the two sides track each other
//! exactly across consecutive blocks.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]
// The following lints are allowed in all RdAudio crates. Please see the workspace Cargo.toml for
// their justification.
#![allow(clippy::comparison_chain)]
#![allow(clippy::identity_op)]
#![allow(clippy::manual_range_contains)]

mod common;

pub mod ima;
pub mod ms;

pub use ima::ImaState;
pub use ms::MsState;

/// `AdpcmState` holds the adaptive quantizer state of exactly one of the two ADPCM variants.
///
/// The two variants carry incompatible field semantics, so the state is an explicit tagged union
/// and is never reinterpreted from one variant to the other. The active variant is selected by
/// the negotiated wire format.
#[derive(Copy, Clone, Debug)]
pub enum AdpcmState {
    /// IMA (DVI) ADPCM state.
    Ima(ImaState),
    /// Microsoft ADPCM state.
    Ms(MsState),
}
