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

//! eefifo: EE FIFO transfer and GIF path arbitration
//!
//! Emulates the memory-mapped FIFO pages through which the PS2 Emotion
//! Engine exchanges quadwords with VIF0, VIF1 and the GIF, plus the bridge
//! that reads GS download data back from an asynchronous render backend.
//!
//! # Architecture
//!
//! - [`core::registers`]: VIF/GIF STAT registers and the FIFO address map
//! - [`core::vif`]: VIF0/VIF1 FIFO ports (writes and VIF1 downloads)
//! - [`core::gif`]: GIF FIFO port, PATH1-3 arbiter and FIFO buffer
//! - [`core::bridge`]: render backend worker thread and its channels
//! - [`core::bus`]: session-wide [`core::FifoBus`] routing accesses
//! - [`core::diagnostics`]: advisory anomaly reporting
//! - [`core::config`]: session configuration and assertion policy
//!
//! # Example
//!
//! ```no_run
//! use eefifo::core::bridge::RenderBridge;
//! use eefifo::core::config::FifoConfig;
//! use eefifo::core::loopback::{ImmediateDecoder, LoopbackBackend, OpenFrontEnd};
//! use eefifo::core::registers::Direction;
//! use eefifo::core::{FifoBus, Quadword};
//!
//! let config = FifoConfig::from_env()?;
//! let bridge = RenderBridge::spawn(LoopbackBackend::new(), config.download_queue_depth)?;
//! let frontend = OpenFrontEnd::forwarding(bridge.submitter());
//! let mut bus = FifoBus::new(
//!     config,
//!     bridge,
//!     Box::new(frontend),
//!     Box::new(ImmediateDecoder),
//!     Box::new(ImmediateDecoder),
//! )?;
//!
//! bus.write_fifo(0x1000_6000, Quadword::new([1, 2, 3, 4]))?;
//! bus.set_vif1_direction(Direction::DeviceToHost);
//! bus.begin_download(1);
//! let _downloaded = bus.read_fifo(0x1000_5000)?;
//! # Ok::<(), eefifo::FifoError>(())
//! ```
//!
//! # Error Handling
//!
//! Address decoding, configuration and worker start-up return
//! [`core::error::Result<T>`], an alias for `Result<T, FifoError>`. FIFO
//! operations themselves never fail: anomalies go to the diagnostics sink
//! and broken invariants are handled by the configured assertion policy.

pub mod core;

// Re-export commonly used types
pub use core::error::{FifoError, Result};
