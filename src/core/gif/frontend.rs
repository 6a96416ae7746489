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

//! Graphics front-end interface
//!
//! The GIF unit proper (tag parsing, packet assembly, GS register writes)
//! lives outside this crate. The FIFO core only needs the handful of
//! operations below to decide where a quadword goes and when the unit
//! should run again.

use crate::core::bridge::PacketKind;
use crate::core::quadword::Quadword;
use crate::core::registers::GifPathId;

/// Operations the FIFO core needs from the GIF unit
pub trait GraphicsFrontEnd {
    /// Whether PATH3 data may be handed over right now
    fn can_accept_path3(&self) -> bool;

    /// Hand over packet data on the path implied by `kind`
    fn submit_packet(&mut self, kind: PacketKind, data: &[Quadword]);

    /// Whether `path` has finished its current packet
    fn is_path_complete(&self, path: GifPathId) -> bool;

    /// Whether any of the selected paths has work ready to run
    fn evaluate_paths(&self, path1: bool, path2: bool, path3: bool) -> bool;

    /// Run the GIF unit
    fn execute(&mut self, force_vu: bool, force: bool);
}
