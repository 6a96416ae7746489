// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! 128-bit quadword transfer unit
//!
//! Every FIFO access moves exactly one quadword, whatever width the host
//! requested. The quadword is stored as four little-endian 32-bit words,
//! word 0 holding bits 0-31.

use std::fmt;

use bytemuck::{Pod, Zeroable};

/// One 128-bit FIFO transfer unit
///
/// # Examples
///
/// ```
/// use eefifo::core::Quadword;
///
/// let qw = Quadword::new([1, 2, 3, 4]);
/// assert_eq!(qw.word(2), 3);
/// assert_eq!(qw.to_u128() & 0xFFFF_FFFF, 1);
/// ```
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
pub struct Quadword {
    words: [u32; 4],
}

impl Quadword {
    /// Size of a quadword in bytes
    pub const SIZE: usize = 16;

    /// All-zero quadword
    pub const ZERO: Self = Self { words: [0; 4] };

    /// Build a quadword from its four 32-bit words (word 0 is least significant)
    #[inline(always)]
    pub const fn new(words: [u32; 4]) -> Self {
        Self { words }
    }

    /// Build a quadword from a 128-bit integer
    pub const fn from_u128(value: u128) -> Self {
        Self {
            words: [
                value as u32,
                (value >> 32) as u32,
                (value >> 64) as u32,
                (value >> 96) as u32,
            ],
        }
    }

    /// Build a quadword from 16 little-endian bytes
    pub fn from_bytes(bytes: [u8; Self::SIZE]) -> Self {
        Self::from_u128(u128::from_le_bytes(bytes))
    }

    /// Collapse into a 128-bit integer
    pub const fn to_u128(&self) -> u128 {
        (self.words[0] as u128)
            | ((self.words[1] as u128) << 32)
            | ((self.words[2] as u128) << 64)
            | ((self.words[3] as u128) << 96)
    }

    /// The four 32-bit words, least significant first
    #[inline(always)]
    pub const fn words(&self) -> &[u32; 4] {
        &self.words
    }

    /// Single 32-bit word (0-3)
    #[inline(always)]
    pub const fn word(&self, index: usize) -> u32 {
        self.words[index]
    }

    /// Check whether every bit is clear
    pub const fn is_zero(&self) -> bool {
        self.words[0] == 0 && self.words[1] == 0 && self.words[2] == 0 && self.words[3] == 0
    }

    /// Reinterpret a run of quadwords as raw 32-bit words for decoders
    pub fn as_words(quadwords: &[Quadword]) -> &[u32] {
        bytemuck::cast_slice(quadwords)
    }
}

impl From<[u32; 4]> for Quadword {
    fn from(words: [u32; 4]) -> Self {
        Self::new(words)
    }
}

impl From<u128> for Quadword {
    fn from(value: u128) -> Self {
        Self::from_u128(value)
    }
}

impl fmt::Display for Quadword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "0x{:08X}.{:08X}.{:08X}.{:08X}",
            self.words[0], self.words[1], self.words[2], self.words[3]
        )
    }
}
