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

//! GIF FIFO buffer
//!
//! Holds PATH3 quadwords written to the GIF FIFO page while the GIF cannot
//! take them directly. Strict FIFO order; the size is mirrored into
//! GIF STAT.FQC by the owning port.

use std::collections::VecDeque;

use crate::core::quadword::Quadword;

/// Bounded in-order quadword queue
#[derive(Debug, Clone)]
pub struct GifFifo {
    data: VecDeque<Quadword>,
    capacity: usize,
}

impl GifFifo {
    /// Hardware GIF FIFO depth in quadwords
    pub const DEFAULT_CAPACITY: usize = 16;

    /// Largest depth GIF STAT.FQC (5 bits) can report
    pub const MAX_CAPACITY: usize = 31;

    /// Create an empty FIFO holding at most `capacity` quadwords
    ///
    /// `capacity` is clamped to 1..=[`GifFifo::MAX_CAPACITY`] so the size
    /// always fits STAT.FQC.
    pub fn new(capacity: usize) -> Self {
        let clamped = capacity.clamp(1, Self::MAX_CAPACITY);
        if clamped != capacity {
            log::warn!("GIF FIFO capacity {} out of range, using {}", capacity, clamped);
        }
        Self {
            data: VecDeque::with_capacity(clamped),
            capacity: clamped,
        }
    }

    /// Append a quadword; returns `false` (and drops it) when full
    pub fn push(&mut self, qw: Quadword) -> bool {
        if self.is_full() {
            return false;
        }
        self.data.push_back(qw);
        true
    }

    /// Remove everything, oldest first
    pub fn take_all(&mut self) -> Vec<Quadword> {
        self.data.drain(..).collect()
    }

    /// Number of queued quadwords
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline(always)]
    pub fn is_full(&self) -> bool {
        self.data.len() >= self.capacity
    }

    /// Maximum number of queued quadwords
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Discard everything
    pub fn clear(&mut self) {
        self.data.clear();
    }
}

impl Default for GifFifo {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
