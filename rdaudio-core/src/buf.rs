// RdAudio
// Copyright (c) 2026 The Project RdAudio Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `buf` module provides `SampleBuf`, a growable byte buffer with explicit, fallible
//! capacity reservation and a logical write cursor.

use crate::errors::{capacity_error, Result};

/// A growable byte buffer for raw sample data.
///
/// `SampleBuf` grows monotonically through amortized reallocation. Growth may relocate the
/// backing storage, therefore callers must not retain offsets obtained from `as_slice` across a
/// call that may write to the buffer.
///
/// Writes append at the logical length. A producer that fails mid-write is expected to restore
/// the buffer with `truncate` so that the logical length never advances on failure.
#[derive(Default)]
pub struct SampleBuf {
    buf: Vec<u8>,
}

impl SampleBuf {
    /// Instantiates an empty `SampleBuf`.
    pub fn new() -> SampleBuf {
        SampleBuf { buf: Vec::new() }
    }

    /// Instantiates an empty `SampleBuf` with `cap` bytes of capacity pre-allocated.
    pub fn with_capacity(cap: usize) -> SampleBuf {
        SampleBuf { buf: Vec::with_capacity(cap) }
    }

    /// Reserves room for at least `additional` more bytes past the logical length. Unlike the
    /// write functions, reservation is fallible and never aborts on allocation failure.
    pub fn ensure_capacity(&mut self, additional: usize) -> Result<()> {
        if self.buf.try_reserve(additional).is_err() {
            return capacity_error("buf: cannot grow sample buffer");
        }
        Ok(())
    }

    /// Gets the logical length of the buffer in bytes.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if the logical length is zero.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Gets the current write position. This is always the logical length since writes append.
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    /// Shortens the logical length to `len` bytes. Has no effect if the buffer is already
    /// shorter. Capacity is retained.
    pub fn truncate(&mut self, len: usize) {
        self.buf.truncate(len);
    }

    /// Resets the logical length to zero, retaining capacity.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Gets the written portion of the buffer.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Appends a run of bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Appends a single byte.
    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    /// Appends an unsigned 16-bit value in little-endian byte order.
    pub fn write_u16_le(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Appends a signed 16-bit value in little-endian byte order.
    pub fn write_i16_le(&mut self, value: i16) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }
}

impl AsRef<[u8]> for SampleBuf {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}
