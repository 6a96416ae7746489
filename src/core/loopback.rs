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

//! Loopback collaborators
//!
//! Minimal working implementations of the decoder, GIF front-end and
//! render backend. They let a [`FifoBus`](crate::core::bus::FifoBus) run
//! without a VU/GS emulation behind it: PATH3 data is forwarded to the
//! backend, and the backend hands the same data back on download.

use std::collections::VecDeque;

use crate::core::bridge::{PacketKind, PacketSubmitter, RenderBackend};
use crate::core::gif::GraphicsFrontEnd;
use crate::core::quadword::Quadword;
use crate::core::registers::GifPathId;
use crate::core::vif::{VifDecoder, VifRunState};

/// Render backend that echoes PATH3 data back as download data
///
/// Downloads past the end of the echoed data read as zero.
#[derive(Debug, Default)]
pub struct LoopbackBackend {
    echo: VecDeque<Quadword>,
    packets: usize,
}

impl LoopbackBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Quadwords waiting to be downloaded
    pub fn buffered(&self) -> usize {
        self.echo.len()
    }
}

impl RenderBackend for LoopbackBackend {
    fn submit(&mut self, kind: PacketKind, data: &[Quadword]) {
        self.packets += 1;
        if kind.path() == GifPathId::Path3 {
            self.echo.extend(data.iter().copied());
        }
    }

    fn download(&mut self, out: &mut [Quadword]) {
        for slot in out.iter_mut() {
            *slot = self.echo.pop_front().unwrap_or(Quadword::ZERO);
        }
    }
}

/// VIFcode decoder that swallows every quadword without starting a command
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateDecoder;

impl VifDecoder for ImmediateDecoder {
    fn decode(&mut self, run: &mut VifRunState, _words: &[u32]) -> bool {
        run.consume(run.qwc);
        run.cmd = false;
        run.done = true;
        true
    }
}

/// GIF front-end that always takes PATH3 data
///
/// Packets go to the render worker when a submitter is attached and are
/// dropped otherwise. No path ever has pending work, so the arbiter never
/// asks it to execute.
#[derive(Debug, Clone, Default)]
pub struct OpenFrontEnd {
    submitter: Option<PacketSubmitter>,
    dropped: usize,
}

impl OpenFrontEnd {
    /// Front-end that discards every packet
    pub fn new() -> Self {
        Self::default()
    }

    /// Front-end that forwards packets through `submitter`
    pub fn forwarding(submitter: PacketSubmitter) -> Self {
        Self {
            submitter: Some(submitter),
            dropped: 0,
        }
    }

    /// Packets that could not be forwarded
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl GraphicsFrontEnd for OpenFrontEnd {
    fn can_accept_path3(&self) -> bool {
        true
    }

    fn submit_packet(&mut self, kind: PacketKind, data: &[Quadword]) {
        let Some(submitter) = &self.submitter else {
            self.dropped += 1;
            return;
        };
        if let Err(e) = submitter.submit_packet(kind, data) {
            log::warn!("GIF: {:?} packet lost: {}", kind, e);
            self.dropped += 1;
        }
    }

    fn is_path_complete(&self, _path: GifPathId) -> bool {
        true
    }

    fn evaluate_paths(&self, _path1: bool, _path2: bool, _path3: bool) -> bool {
        false
    }

    fn execute(&mut self, force_vu: bool, force: bool) {
        log::trace!("GIF: execute (force_vu={}, force={})", force_vu, force);
    }
}
