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

//! Test doubles for the external collaborators
//!
//! Each mock keeps its state behind a shared handle so a test can hold one
//! clone while the bus owns another.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use super::bridge::{PacketKind, RenderBackend};
use super::gif::GraphicsFrontEnd;
use super::quadword::Quadword;
use super::registers::GifPathId;
use super::vif::{VifDecoder, VifRunState};

/// Observable GIF state
#[derive(Debug, Default)]
pub struct FrontEndState {
    pub accept_path3: bool,
    pub complete: [bool; 3],
    pub paths_ready: bool,
    pub packets: Vec<(PacketKind, Vec<Quadword>)>,
    pub evaluations: Vec<[bool; 3]>,
    pub executions: Vec<(bool, bool)>,
}

/// Scriptable GIF
#[derive(Debug, Clone, Default)]
pub struct MockFrontEnd {
    pub state: Rc<RefCell<FrontEndState>>,
}

impl MockFrontEnd {
    pub fn accepting() -> Self {
        let mock = Self::default();
        mock.state.borrow_mut().accept_path3 = true;
        mock
    }

    pub fn set_accept_path3(&self, accept: bool) {
        self.state.borrow_mut().accept_path3 = accept;
    }

    pub fn set_complete(&self, path: GifPathId, complete: bool) {
        self.state.borrow_mut().complete[path.index()] = complete;
    }

    pub fn set_paths_ready(&self, ready: bool) {
        self.state.borrow_mut().paths_ready = ready;
    }

    /// All quadwords received, flattened in arrival order
    pub fn received(&self) -> Vec<Quadword> {
        self.state
            .borrow()
            .packets
            .iter()
            .flat_map(|(_, data)| data.iter().copied())
            .collect()
    }

    pub fn packet_count(&self) -> usize {
        self.state.borrow().packets.len()
    }

    pub fn executions(&self) -> Vec<(bool, bool)> {
        self.state.borrow().executions.clone()
    }

    pub fn evaluations(&self) -> Vec<[bool; 3]> {
        self.state.borrow().evaluations.clone()
    }
}

impl GraphicsFrontEnd for MockFrontEnd {
    fn can_accept_path3(&self) -> bool {
        self.state.borrow().accept_path3
    }

    fn submit_packet(&mut self, kind: PacketKind, data: &[Quadword]) {
        self.state.borrow_mut().packets.push((kind, data.to_vec()));
    }

    fn is_path_complete(&self, path: GifPathId) -> bool {
        self.state.borrow().complete[path.index()]
    }

    fn evaluate_paths(&self, path1: bool, path2: bool, path3: bool) -> bool {
        let mut state = self.state.borrow_mut();
        state.evaluations.push([path1, path2, path3]);
        state.paths_ready
    }

    fn execute(&mut self, force_vu: bool, force: bool) {
        self.state.borrow_mut().executions.push((force_vu, force));
    }
}

/// Observable decoder state
#[derive(Debug)]
pub struct DecoderState {
    /// Quadwords consumed per call
    pub consume: u32,
    /// Command-in-progress flag after decode
    pub cmd: bool,
    /// Transfer-complete flag after decode
    pub done: bool,
    /// Value returned from decode
    pub accept: bool,
    /// Word slices seen, one entry per call
    pub calls: Vec<Vec<u32>>,
}

impl Default for DecoderState {
    fn default() -> Self {
        Self {
            consume: 1,
            cmd: false,
            done: false,
            accept: true,
            calls: Vec::new(),
        }
    }
}

/// Scriptable VIFcode decoder
#[derive(Debug, Clone, Default)]
pub struct MockDecoder {
    pub state: Rc<RefCell<DecoderState>>,
}

impl MockDecoder {
    pub fn consuming(consume: u32) -> Self {
        let mock = Self::default();
        mock.state.borrow_mut().consume = consume;
        mock
    }

    pub fn set(&self, cmd: bool, done: bool) {
        let mut state = self.state.borrow_mut();
        state.cmd = cmd;
        state.done = done;
    }

    pub fn set_accept(&self, accept: bool) {
        self.state.borrow_mut().accept = accept;
    }

    pub fn calls(&self) -> Vec<Vec<u32>> {
        self.state.borrow().calls.clone()
    }
}

impl VifDecoder for MockDecoder {
    fn decode(&mut self, run: &mut VifRunState, words: &[u32]) -> bool {
        let mut state = self.state.borrow_mut();
        state.calls.push(words.to_vec());
        run.consume(state.consume);
        run.cmd = state.cmd;
        run.done = state.done;
        state.accept
    }
}

/// Render backend that downloads an incrementing counter
#[derive(Debug, Clone, Default)]
pub struct CountingBackend {
    pub downloads: Arc<Mutex<usize>>,
    pub packets: Arc<Mutex<Vec<(PacketKind, Vec<Quadword>)>>>,
    next: u32,
}

impl CountingBackend {
    pub fn download_calls(&self) -> usize {
        *self.downloads.lock().unwrap()
    }
}

impl RenderBackend for CountingBackend {
    fn submit(&mut self, kind: PacketKind, data: &[Quadword]) {
        self.packets.lock().unwrap().push((kind, data.to_vec()));
    }

    fn download(&mut self, out: &mut [Quadword]) {
        *self.downloads.lock().unwrap() += 1;
        for qw in out.iter_mut() {
            self.next += 1;
            *qw = Quadword::new([self.next, self.next, self.next, self.next]);
        }
    }
}
