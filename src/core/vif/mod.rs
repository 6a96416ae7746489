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

//! VIF FIFO ports
//!
//! VIF0 (0x10004000) and VIF1 (0x10005000) accept host writes one quadword
//! at a time and pass them to the unit's VIFcode decoder. VIF1 can also be
//! turned around (STAT.FDR) to let the host read GS download data back.
//!
//! # Writes
//!
//! Every write lands, even if the unit is stalled; questionable cases are
//! only reported as anomalies. The write bumps the channel's outstanding
//! quadword count, runs the decoder exactly once on the four words, and
//! then updates STAT.VPS:
//!
//! - no command in progress → IDLE
//! - command done and nothing outstanding → WAITING
//! - otherwise unchanged
//!
//! # Download reads (VIF1)
//!
//! With FDR set, each read pulls one quadword from the render backend.
//! FQC shows how much the host may still read (at most 16), the bridge
//! keeps the full count the backend still owes. Reading while FDR is
//! clear is reported as an illegal read and yields zero.

use std::slice;

use crate::core::bridge::RenderBridge;
use crate::core::config::AssertionPolicy;
use crate::core::diagnostics::{Anomaly, Diagnostics};
use crate::core::quadword::Quadword;
use crate::core::registers::{Direction, FifoPort, GifStat, VifPhase, VifStat};

/// VIF1 FIFO depth in quadwords; FQC never shows more than this
pub const VIF1_FIFO_DEPTH: u32 = 16;

/// Remaining download size at which the GIF output path is released
pub const DOWNLOAD_LOW_WATER: u32 = 16;

/// Transfer state shared between a VIF port and its decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VifRunState {
    /// A VIFcode is being processed
    pub cmd: bool,

    /// The current transfer has completed
    pub done: bool,

    /// Quadwords handed to the unit and not yet consumed by the decoder
    pub qwc: u32,

    /// Position of a pending interrupt boundary (0 = none)
    pub irq_offset: u32,

    /// The unit is stalled (interrupt bit, STOP, force break)
    pub stalled: bool,
}

impl VifRunState {
    /// Consume up to `count` outstanding quadwords
    ///
    /// Returns how many were actually consumed; `qwc` never wraps.
    pub fn consume(&mut self, count: u32) -> u32 {
        let consumed = count.min(self.qwc);
        self.qwc -= consumed;
        consumed
    }
}

/// VIFcode decoder for one unit
pub trait VifDecoder {
    /// Decode `words`, updating `run`
    ///
    /// Returns `false` when the unit refused the data (a stall mid-packet).
    fn decode(&mut self, run: &mut VifRunState, words: &[u32]) -> bool;
}

/// One VIF FIFO port
#[derive(Debug, Clone)]
pub struct VifPort {
    port: FifoPort,
    stat: VifStat,
    run: VifRunState,
}

impl VifPort {
    /// Create an idle port for VIF0 or VIF1
    pub fn new(port: FifoPort) -> Self {
        debug_assert!(matches!(port, FifoPort::Vif0 | FifoPort::Vif1));
        Self {
            port,
            stat: VifStat::default(),
            run: VifRunState::default(),
        }
    }

    /// Return STAT and run state to power-on values
    pub fn reset(&mut self) {
        self.stat = VifStat::default();
        self.run = VifRunState::default();
    }

    pub fn port(&self) -> FifoPort {
        self.port
    }

    /// VIF STAT register
    #[inline(always)]
    pub fn stat(&self) -> VifStat {
        self.stat
    }

    /// Mutable VIF STAT register
    pub fn stat_mut(&mut self) -> &mut VifStat {
        &mut self.stat
    }

    pub fn run(&self) -> &VifRunState {
        &self.run
    }

    pub fn run_mut(&mut self) -> &mut VifRunState {
        &mut self.run
    }

    /// Accept one host write to this port's FIFO page
    pub fn write(
        &mut self,
        value: Quadword,
        decoder: &mut dyn VifDecoder,
        diagnostics: &dyn Diagnostics,
        policy: AssertionPolicy,
    ) {
        log::trace!("WriteFIFO/{} <- {}", self.port, value);

        if self.port == FifoPort::Vif1 && self.stat.direction() == Direction::DeviceToHost {
            diagnostics.warn(Anomaly::WriteWhileDownloading);
        }
        if self.stat.is_stalled() {
            diagnostics.warn(Anomaly::WriteWhileStalled { port: self.port });
        }
        if self.run.irq_offset != 0 && self.run.stalled {
            diagnostics.warn(Anomaly::OffsetOnFifoStart { port: self.port });
        }

        self.run.qwc = self.run.qwc.saturating_add(1);
        let accepted = decoder.decode(&mut self.run, Quadword::as_words(slice::from_ref(&value)));

        if self.run.cmd {
            if self.run.done && self.run.qwc == 0 {
                self.stat.set_vps(VifPhase::Waiting);
            }
        } else {
            self.stat.set_vps(VifPhase::Idle);
        }

        if !accepted {
            policy.violation(
                diagnostics,
                &format!("{} decoder rejected FIFO data (stall mid-transfer)", self.port),
            );
        }
    }

    /// Read one quadword of GS download data (VIF1 only)
    ///
    /// The result is zeroed first, so any path that produces no data
    /// returns a zero quadword.
    pub fn read_download(
        &mut self,
        gif_stat: &mut GifStat,
        bridge: &mut RenderBridge,
        diagnostics: &dyn Diagnostics,
        policy: AssertionPolicy,
    ) -> Quadword {
        let mut out = Quadword::ZERO;

        if self.stat.is_stalled() {
            diagnostics.warn(Anomaly::ReadWhileStalled { port: self.port });
        }

        let ready = self.stat.fqc();
        if ready == 0 {
            policy.violation(diagnostics, &format!("FQC = 0 on {} FIFO read", self.port));
            return out;
        }

        if self.stat.direction() == Direction::DeviceToHost {
            let owed = bridge.pending_download();
            if ready > owed {
                diagnostics.warn(Anomaly::DownloadSizeMismatch { ready, owed });
            }

            if owed > 0 {
                let mut buffer = [Quadword::ZERO; 1];
                if let Err(e) = bridge.request_download(&mut buffer) {
                    policy.violation(diagnostics, &format!("{} download failed: {}", self.port, e));
                    return out;
                }
                out = buffer[0];

                let remaining = bridge.consume_pending(1);
                if remaining <= DOWNLOAD_LOW_WATER {
                    gif_stat.set_output_pending(false);
                }
                self.stat.set_fqc(remaining.min(VIF1_FIFO_DEPTH));
            }
        } else {
            diagnostics.warn(Anomaly::IllegalRead { port: self.port });
        }

        log::trace!("ReadFIFO/{} -> {}", self.port, out);
        out
    }
}
