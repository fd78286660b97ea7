// RdAudio
// Copyright (c) 2026 The Project RdAudio Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `util` module provides small utility functions shared by the RdAudio crates.

pub mod clamp {
    //! Utilities for clamping numeric values to a defined range.

    /// Clamps the given value to the [-32_768, 32_767] range.
    #[inline]
    pub fn clamp_i16(val: i32) -> i16 {
        if val.wrapping_add(0x8000) & !0xffff == 0 {
            val as i16
        }
        else {
            0x7fff ^ val.wrapping_shr(31) as i16
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn verify_clamp() {
            assert_eq!(clamp_i16(0), 0);
            assert_eq!(clamp_i16(-1), -1);
            assert_eq!(clamp_i16(32_767), i16::MAX);
            assert_eq!(clamp_i16(32_768), i16::MAX);
            assert_eq!(clamp_i16(-32_768), i16::MIN);
            assert_eq!(clamp_i16(-32_769), i16::MIN);
            assert_eq!(clamp_i16(i32::MAX), i16::MAX);
            assert_eq!(clamp_i16(i32::MIN), i16::MIN);
        }
    }
}
