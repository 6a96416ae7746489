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

//! GIF path arbiter
//!
//! Three paths compete for the GIF:
//!
//! | Path  | Source                     | Queued flag |
//! |-------|----------------------------|-------------|
//! | PATH1 | VU1 XGKICK                 | P1Q         |
//! | PATH2 | VIF1 DIRECT/DIRECTHL       | P2Q         |
//! | PATH3 | GIF DMA channel / GIF FIFO | P3Q         |
//!
//! Only one path can be ACTIVE. A path asking for the GIF while another
//! one owns it is parked in WAITING with its queued flag raised. Candidates
//! are always considered in path order 1, 2, 3.

use crate::core::registers::{GifPathId, GifStat};

use super::frontend::GraphicsFrontEnd;

/// Per-path transfer state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GifPathState {
    /// No work
    #[default]
    Idle,
    /// Currently owns the GIF
    Active,
    /// Has work queued but another path owns the GIF
    Waiting,
}

/// Set of candidate paths, reported to the GIF in path order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PathSet([bool; 3]);

impl PathSet {
    /// Build a set from a list of paths
    pub fn of(paths: &[GifPathId]) -> Self {
        let mut set = [false; 3];
        for path in paths {
            set[path.index()] = true;
        }
        Self(set)
    }

    /// Flags for PATH1, PATH2, PATH3 in that order
    pub fn flags(&self) -> [bool; 3] {
        self.0
    }
}

/// Owner of the three path state machines
#[derive(Debug, Clone, Default)]
pub struct GifArbiter {
    states: [GifPathState; 3],
}

impl GifArbiter {
    /// Create an arbiter with every path idle
    pub fn new() -> Self {
        Self::default()
    }

    /// Return every path to IDLE
    pub fn reset(&mut self) {
        self.states = [GifPathState::Idle; 3];
    }

    /// Current state of `path`
    #[inline(always)]
    pub fn state(&self, path: GifPathId) -> GifPathState {
        self.states[path.index()]
    }

    /// Path in the ACTIVE state, if any
    pub fn active(&self) -> Option<GifPathId> {
        GifPathId::ALL
            .into_iter()
            .find(|p| self.state(*p) == GifPathState::Active)
    }

    /// Number of ACTIVE paths (0 or 1)
    pub fn active_count(&self) -> usize {
        self.states
            .iter()
            .filter(|s| **s == GifPathState::Active)
            .count()
    }

    /// Ask for the GIF on behalf of `path`
    ///
    /// Ownership follows GIF STAT.APATH. When APATH names another path the
    /// request is parked in WAITING with its queued flag set. Otherwise the
    /// path is granted (ACTIVE, APATH, OPH); a path still marked ACTIVE
    /// after APATH was released has finished its cycle and drops to IDLE.
    /// Returns whether ownership was granted.
    pub fn request(&mut self, path: GifPathId, stat: &mut GifStat) -> bool {
        match stat.active_path() {
            Some(owner) if owner != path => {
                log::trace!("GIF: {} waiting, {} owns the GIF", path, owner);
                self.states[path.index()] = GifPathState::Waiting;
                stat.insert(queued_flag(path));
                false
            }
            _ => {
                for other in GifPathId::ALL {
                    if other != path && self.state(other) == GifPathState::Active {
                        self.states[other.index()] = GifPathState::Idle;
                    }
                }
                self.states[path.index()] = GifPathState::Active;
                stat.remove(queued_flag(path));
                stat.set_active_path(Some(path));
                stat.set_output_pending(true);
                debug_assert_eq!(self.active_count(), 1, "more than one ACTIVE GIF path");
                log::trace!("GIF: {} granted", path);
                true
            }
        }
    }

    /// Return `path` to IDLE, releasing APATH/OPH if it held them
    pub fn finish(&mut self, path: GifPathId, stat: &mut GifStat) {
        self.set_idle(path, stat);
        if stat.active_path() == Some(path) {
            stat.release_active_path();
        }
    }

    /// Move `path` to IDLE and drop its queued flag
    pub fn set_idle(&mut self, path: GifPathId, stat: &mut GifStat) {
        self.states[path.index()] = GifPathState::Idle;
        stat.remove(queued_flag(path));
    }

    /// Ask the front-end whether any of `candidates` can run
    pub fn eligible(&self, frontend: &dyn GraphicsFrontEnd, candidates: PathSet) -> bool {
        let [path1, path2, path3] = candidates.flags();
        frontend.evaluate_paths(path1, path2, path3)
    }
}

fn queued_flag(path: GifPathId) -> GifStat {
    match path {
        GifPathId::Path1 => GifStat::P1Q,
        GifPathId::Path2 => GifStat::P2Q,
        GifPathId::Path3 => GifStat::P3Q,
    }
}
