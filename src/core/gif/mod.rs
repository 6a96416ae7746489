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

//! GIF FIFO port
//!
//! Host writes to the GIF FIFO page (0x10006000) are PATH3 data. When the
//! GIF can take PATH3 data and nothing is already queued, the quadword goes
//! straight through as a one-quadword packet; otherwise it is buffered in
//! the [`GifFifo`] and flushed as soon as the GIF allows it.
//!
//! Each FIFO write also ends a PATH3 cycle: a WAITING PATH3 drops back to
//! IDLE, and if PATH3 held APATH the output path is released and the GIF is
//! kicked once if PATH1/PATH3 have work.

mod arbiter;
mod fifo;
mod frontend;

pub use arbiter::{GifArbiter, GifPathState, PathSet};
pub use fifo::GifFifo;
pub use frontend::GraphicsFrontEnd;

use crate::core::bridge::PacketKind;
use crate::core::diagnostics::{Anomaly, Diagnostics};
use crate::core::quadword::Quadword;
use crate::core::registers::{GifPathId, GifStat};

/// GIF FIFO port state: STAT register, path arbiter and FIFO buffer
#[derive(Debug, Clone)]
pub struct GifPort {
    stat: GifStat,
    arbiter: GifArbiter,
    fifo: GifFifo,
}

impl GifPort {
    /// Create an idle port with a FIFO of `fifo_capacity` quadwords
    pub fn new(fifo_capacity: usize) -> Self {
        Self {
            stat: GifStat::default(),
            arbiter: GifArbiter::new(),
            fifo: GifFifo::new(fifo_capacity),
        }
    }

    /// Reset STAT, paths and FIFO to power-on state
    pub fn reset(&mut self) {
        self.stat = GifStat::default();
        self.arbiter.reset();
        self.fifo.clear();
    }

    /// GIF STAT register
    #[inline(always)]
    pub fn stat(&self) -> GifStat {
        self.stat
    }

    /// Mutable GIF STAT register
    pub fn stat_mut(&mut self) -> &mut GifStat {
        &mut self.stat
    }

    pub fn arbiter(&self) -> &GifArbiter {
        &self.arbiter
    }

    pub fn fifo(&self) -> &GifFifo {
        &self.fifo
    }

    /// Request the GIF for `path` (see [`GifArbiter::request`])
    pub fn request_path(&mut self, path: GifPathId) -> bool {
        self.arbiter.request(path, &mut self.stat)
    }

    /// Finish `path` (see [`GifArbiter::finish`])
    pub fn finish_path(&mut self, path: GifPathId) {
        self.arbiter.finish(path, &mut self.stat);
    }

    /// Accept one host write to the GIF FIFO page
    pub fn write(
        &mut self,
        value: Quadword,
        frontend: &mut dyn GraphicsFrontEnd,
        diagnostics: &dyn Diagnostics,
    ) {
        log::trace!("WriteFIFO/GIF <- {}", value);

        if !frontend.can_accept_path3() || !self.fifo.is_empty() {
            self.push(value, diagnostics);
            self.drain(frontend);
        } else {
            frontend.submit_packet(PacketKind::Fifo, &[value]);
        }

        if self.arbiter.state(GifPathId::Path3) == GifPathState::Waiting {
            self.arbiter.set_idle(GifPathId::Path3, &mut self.stat);
        }

        if self.stat.active_path() == Some(GifPathId::Path3) {
            self.stat.release_active_path();

            let path3 = self.arbiter.state(GifPathId::Path3);
            if matches!(path3, GifPathState::Idle | GifPathState::Waiting)
                && self.arbiter.eligible(
                    frontend,
                    PathSet::of(&[GifPathId::Path1, GifPathId::Path3]),
                )
            {
                frontend.execute(false, false);
            }
        }
    }

    /// Flush buffered quadwords if the GIF can take PATH3 data now
    ///
    /// Returns the number of quadwords handed over.
    pub fn drain(&mut self, frontend: &mut dyn GraphicsFrontEnd) -> usize {
        if self.fifo.is_empty() || !frontend.can_accept_path3() {
            self.sync_fqc();
            return 0;
        }

        let data = self.fifo.take_all();
        log::trace!("GIF FIFO: draining {} QW", data.len());
        frontend.submit_packet(PacketKind::Fifo, &data);
        self.sync_fqc();
        data.len()
    }

    /// End a PATH2 cycle if PATH2 owns the GIF and reports completion
    ///
    /// Returns PATH2 to IDLE, releases APATH/OPH and kicks the GIF once if
    /// PATH1/PATH3 have work. Returns whether the path was released.
    pub fn complete_path2(&mut self, frontend: &mut dyn GraphicsFrontEnd) -> bool {
        if self.stat.active_path() != Some(GifPathId::Path2)
            || !frontend.is_path_complete(GifPathId::Path2)
        {
            return false;
        }

        self.arbiter.finish(GifPathId::Path2, &mut self.stat);
        if self.arbiter.eligible(
            frontend,
            PathSet::of(&[GifPathId::Path1, GifPathId::Path3]),
        ) {
            frontend.execute(false, true);
        }
        true
    }

    fn push(&mut self, value: Quadword, diagnostics: &dyn Diagnostics) {
        if !self.fifo.push(value) {
            diagnostics.warn(Anomaly::GifFifoOverflow {
                capacity: self.fifo.capacity(),
            });
        }
        self.sync_fqc();
    }

    fn sync_fqc(&mut self) {
        self.stat.set_fqc(self.fifo.len() as u32);
    }
}

impl Default for GifPort {
    fn default() -> Self {
        Self::new(GifFifo::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests;
