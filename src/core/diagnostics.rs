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

//! Advisory diagnostics sink
//!
//! Real hardware tolerates a number of FIFO protocol irregularities: the
//! write still lands, the read still returns something. These are not
//! errors, but they usually point at a guest bug or an accuracy gap in the
//! emulation, so every occurrence is reported through a [`Diagnostics`]
//! implementation and the operation carries on.
//!
//! [`LogDiagnostics`] forwards to the `log` facade; [`RecordingDiagnostics`]
//! keeps the anomalies around so tests can inspect them.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::registers::FifoPort;

/// A tolerated FIFO protocol irregularity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anomaly {
    /// VIF1 FIFO read while the unit is stalled
    ReadWhileStalled { port: FifoPort },

    /// VIF FIFO write while the unit is stalled
    WriteWhileStalled { port: FifoPort },

    /// VIF FIFO write while an interrupt offset is still pending on a stalled unit
    OffsetOnFifoStart { port: FifoPort },

    /// VIF1 FIFO read asking for more data than the backend was told to produce
    DownloadSizeMismatch { ready: u32, owed: u32 },

    /// VIF1 FIFO write while the port is in the download direction
    WriteWhileDownloading,

    /// Read from a FIFO page that only accepts writes
    IllegalRead { port: FifoPort },

    /// GIF FIFO already full, quadword dropped
    GifFifoOverflow { capacity: usize },

    /// Broken invariant downgraded by the tolerant assertion policy
    InvariantViolation { message: String },
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anomaly::ReadWhileStalled { port } => {
                write!(f, "Reading from {} FIFO when stalled", port)
            }
            Anomaly::WriteWhileStalled { port } => {
                write!(f, "Writing to {} FIFO when stalled", port)
            }
            Anomaly::OffsetOnFifoStart { port } => write!(f, "Offset on {} FIFO start", port),
            Anomaly::DownloadSizeMismatch { ready, owed } => write!(
                f,
                "GS download size ({}) < FIFO count ({})",
                owed, ready
            ),
            Anomaly::WriteWhileDownloading => {
                f.write_str("Writing to VIF1 FIFO when FDR is set")
            }
            Anomaly::IllegalRead { port } => write!(f, "Read from write-only {} FIFO", port),
            Anomaly::GifFifoOverflow { capacity } => {
                write!(f, "GIF FIFO full ({} QW), quadword dropped", capacity)
            }
            Anomaly::InvariantViolation { message } => write!(f, "Invariant violated: {}", message),
        }
    }
}

/// Fire-and-forget sink for advisory anomalies
///
/// Implementations must not block and must not fail.
pub trait Diagnostics {
    /// Report one anomaly
    fn warn(&self, anomaly: Anomaly);
}

/// Diagnostics sink writing to `log::warn!`
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn warn(&self, anomaly: Anomaly) {
        log::warn!("{}", anomaly);
    }
}

/// Diagnostics sink that records every anomaly
///
/// Clones share the same list, so a test can keep one handle and give the
/// other to the bus.
///
/// # Examples
///
/// ```
/// use eefifo::core::diagnostics::{Anomaly, Diagnostics, RecordingDiagnostics};
///
/// let sink = RecordingDiagnostics::new();
/// let handle = sink.clone();
/// sink.warn(Anomaly::WriteWhileDownloading);
/// assert_eq!(handle.anomalies(), vec![Anomaly::WriteWhileDownloading]);
/// ```
#[derive(Debug, Default, Clone)]
pub struct RecordingDiagnostics {
    anomalies: Rc<RefCell<Vec<Anomaly>>>,
}

impl RecordingDiagnostics {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far
    pub fn anomalies(&self) -> Vec<Anomaly> {
        self.anomalies.borrow().clone()
    }

    /// Number of anomalies reported so far
    pub fn len(&self) -> usize {
        self.anomalies.borrow().len()
    }

    /// Check whether nothing has been reported
    pub fn is_empty(&self) -> bool {
        self.anomalies.borrow().is_empty()
    }

    /// Forget everything reported so far
    pub fn clear(&self) {
        self.anomalies.borrow_mut().clear();
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn warn(&self, anomaly: Anomaly) {
        log::debug!("Recorded anomaly: {}", anomaly);
        self.anomalies.borrow_mut().push(anomaly);
    }
}
