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

//! Core FIFO emulation components
//!
//! Leaf modules first: [`registers`] and [`quadword`] are plain data,
//! [`vif`] and [`gif`] implement the ports, [`bridge`] talks to the render
//! worker and [`bus`] owns everything for one session.

pub mod bridge;
pub mod bus;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod gif;
pub mod loopback;
pub mod quadword;
pub mod registers;
pub mod vif;

#[cfg(test)]
mod mock;

pub use bus::FifoBus;
pub use quadword::Quadword;
