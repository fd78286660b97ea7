// RdAudio
// Copyright (c) 2026 The Project RdAudio Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/// `Nibble` represents the lower or upper 4 bits of a byte.
pub(crate) enum Nibble {
    Upper,
    Lower,
}

impl Nibble {
    pub fn get_nibble(&self, byte: u8) -> u8 {
        match self {
            Nibble::Upper => byte >> 4,
            Nibble::Lower => byte & 0x0f,
        }
    }
}

/// Reads the little-endian signed 16-bit sample starting at `offset`.
///
/// Callers must have bounds-checked the slice; the block framing validation in each codec
/// guarantees `offset + 2 <= bytes.len()`.
#[inline]
pub(crate) fn i16_le(bytes: &[u8], offset: usize) -> i16 {
    i16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}
