// RdAudio
// Copyright (c) 2026 The Project RdAudio Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared structs, buffers, and error types for Project RdAudio.
//!
//! `rdaudio-core` contains the negotiated audio format descriptor, the growable sample byte
//! buffer, and the common error type used by every other RdAudio crate. It contains no signal
//! processing of its own.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]
// The following lints are allowed in all RdAudio crates. Please see the workspace Cargo.toml for
// their justification.
#![allow(clippy::comparison_chain)]
#![allow(clippy::identity_op)]
#![allow(clippy::manual_range_contains)]

pub mod audio;
pub mod buf;
pub mod errors;
pub mod util;
