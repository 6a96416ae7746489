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

//! Error types for the FIFO core
//!
//! FIFO transfers themselves never fail from the caller's point of view:
//! protocol misuse is reported through [`crate::core::diagnostics`] and
//! broken invariants abort. The errors here cover the edges around the
//! transfers: address decoding, worker startup and configuration files.

use thiserror::Error;

use super::registers::FifoPort;

/// Errors raised outside of the FIFO data path
#[derive(Debug, Error)]
pub enum FifoError {
    /// Address does not fall in any of the four FIFO pages
    #[error("Unmapped FIFO address: 0x{address:08X}")]
    UnmappedAddress { address: u32 },

    /// Page exists but is not emulated by this core
    #[error("FIFO port {port} is not emulated")]
    PortNotEmulated { port: FifoPort },

    /// The render backend worker hung up
    #[error("Render backend disconnected")]
    BackendDisconnected,

    /// The render backend worker thread could not be started
    #[error("Failed to spawn render backend worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    /// File system failure while loading or saving configuration
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration text could not be parsed
    #[error("Failed to parse config: {0}")]
    ConfigParse(String),

    /// Configuration values out of range
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Configuration could not be serialized
    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(String),

    /// Malformed replay trace line
    #[error("Trace line {line}: {message}")]
    Trace { line: usize, message: String },
}

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, FifoError>;
