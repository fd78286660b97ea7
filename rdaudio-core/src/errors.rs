// RdAudio
// Copyright (c) 2026 The Project RdAudio Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `errors` module defines the common error type.

use std::fmt;
use std::result;

/// `Error` provides an enumeration of all possible errors reported by RdAudio.
#[derive(Debug)]
pub enum Error {
    /// A required argument was absent or inconsistent with the requested operation. This includes
    /// calling `decode` on an encoder context and vice versa.
    InvalidArgument(&'static str),
    /// The input contained malformed data and could not be decoded.
    DecodeError(&'static str),
    /// The input could not be converted into the negotiated wire format.
    EncodeError(&'static str),
    /// A scratch or output buffer could not grow to the required size.
    CapacityError(&'static str),
    /// An unsupported wire format or feature was encountered.
    Unsupported(&'static str),
    /// An external codec backend reported a failure. Backend failures are opaque beyond the fact
    /// that they occurred.
    CodecError(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::InvalidArgument(msg) => {
                write!(f, "invalid argument: {}", msg)
            }
            Error::DecodeError(msg) => {
                write!(f, "malformed input: {}", msg)
            }
            Error::EncodeError(msg) => {
                write!(f, "encode failed: {}", msg)
            }
            Error::CapacityError(msg) => {
                write!(f, "buffer capacity exhausted: {}", msg)
            }
            Error::Unsupported(feature) => {
                write!(f, "unsupported feature: {}", feature)
            }
            Error::CodecError(msg) => {
                write!(f, "codec backend failure: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = result::Result<T, Error>;

/// Convenience function to create an invalid argument error.
pub fn invalid_argument_error<T>(desc: &'static str) -> Result<T> {
    Err(Error::InvalidArgument(desc))
}

/// Convenience function to create a decode error.
pub fn decode_error<T>(desc: &'static str) -> Result<T> {
    Err(Error::DecodeError(desc))
}

/// Convenience function to create an encode error.
pub fn encode_error<T>(desc: &'static str) -> Result<T> {
    Err(Error::EncodeError(desc))
}

/// Convenience function to create a capacity error.
pub fn capacity_error<T>(desc: &'static str) -> Result<T> {
    Err(Error::CapacityError(desc))
}

/// Convenience function to create an unsupported feature error.
pub fn unsupported_error<T>(feature: &'static str) -> Result<T> {
    Err(Error::Unsupported(feature))
}

/// Convenience function to create a codec backend error.
pub fn codec_error<T>(desc: &'static str) -> Result<T> {
    Err(Error::CodecError(desc))
}
