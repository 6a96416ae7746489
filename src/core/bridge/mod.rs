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

//! Render backend bridge
//!
//! The rendering backend runs on its own worker thread. This module is the
//! only place that talks to it: everything the emulation thread wants the
//! backend to do goes through one command channel, so packets and download
//! requests are seen by the worker in exactly the order they were issued.
//!
//! ```text
//!  emulation thread                          render worker
//! ┌──────────────────┐   BackendCommand    ┌────────────────────┐
//! │ submit_packet()  │ ──────────────────▶ │ backend.submit()   │
//! │ request_download │ ──────────────────▶ │ backend.download() │
//! │   (blocks)       │ ◀────────────────── │                    │
//! └──────────────────┘   Quadword (bounded)└────────────────────┘
//! ```
//!
//! Submissions never block. A download blocks the emulation thread until
//! the worker has produced every requested quadword; there is no timeout.
//! A worker that goes away is reported as [`FifoError::BackendDisconnected`].

use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};

use super::error::{FifoError, Result};
use super::quadword::Quadword;
use super::registers::GifPathId;

/// Origin of a packet handed to the rendering backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketKind {
    /// VU1 XGKICK (PATH1)
    Xgkick,
    /// VIF1 DIRECT (PATH2)
    Direct,
    /// VIF1 DIRECTHL (PATH2)
    DirectHl,
    /// GIF DMA channel (PATH3)
    Dma,
    /// GIF FIFO register writes (PATH3)
    Fifo,
}

impl PacketKind {
    /// GIF path this packet travels on
    pub const fn path(self) -> GifPathId {
        match self {
            PacketKind::Xgkick => GifPathId::Path1,
            PacketKind::Direct | PacketKind::DirectHl => GifPathId::Path2,
            PacketKind::Dma | PacketKind::Fifo => GifPathId::Path3,
        }
    }
}

/// Rendering backend driven by the worker thread
pub trait RenderBackend: Send + 'static {
    /// Consume one packet
    fn submit(&mut self, kind: PacketKind, data: &[Quadword]);

    /// Fill `out` with the next quadwords of host download data
    fn download(&mut self, out: &mut [Quadword]);
}

/// Work item for the render worker
#[derive(Debug)]
enum BackendCommand {
    Packet {
        kind: PacketKind,
        data: Vec<Quadword>,
    },
    Download {
        count: usize,
    },
    Shutdown,
}

/// Cloneable submit-only handle onto the bridge's command queue
///
/// Front-end implementations hold one of these to forward packets.
/// Packets sent through any handle share the bridge's single ordering.
#[derive(Debug, Clone)]
pub struct PacketSubmitter {
    commands: Sender<BackendCommand>,
}

impl PacketSubmitter {
    /// Queue a packet for the backend without blocking
    pub fn submit_packet(&self, kind: PacketKind, data: &[Quadword]) -> Result<()> {
        log::trace!("Bridge: {:?} packet, {} QW", kind, data.len());
        self.commands
            .send(BackendCommand::Packet {
                kind,
                data: data.to_vec(),
            })
            .map_err(|_| FifoError::BackendDisconnected)
    }
}

/// Emulation-side end of the render backend bridge
pub struct RenderBridge {
    submitter: PacketSubmitter,
    downloads: Receiver<Quadword>,
    worker: Option<JoinHandle<()>>,

    /// Quadwords the backend still owes the host for the current download
    pending_download: u32,

    /// Download requests issued so far
    download_requests: u64,
}

impl RenderBridge {
    /// Start the worker thread and hand it `backend`
    ///
    /// `queue_depth` bounds how many downloaded quadwords may sit between
    /// the worker and the emulation thread.
    pub fn spawn<B: RenderBackend>(backend: B, queue_depth: usize) -> Result<Self> {
        let (command_tx, command_rx) = crossbeam_channel::unbounded();
        let (download_tx, download_rx) = crossbeam_channel::bounded(queue_depth.max(1));

        let worker = thread::Builder::new()
            .name("render-backend".to_string())
            .spawn(move || worker_loop(backend, command_rx, download_tx))
            .map_err(FifoError::WorkerSpawn)?;

        log::info!("Render backend worker started (download queue depth {})", queue_depth);

        Ok(Self {
            submitter: PacketSubmitter {
                commands: command_tx,
            },
            downloads: download_rx,
            worker: Some(worker),
            pending_download: 0,
            download_requests: 0,
        })
    }

    /// Queue a packet for the backend without blocking
    pub fn submit_packet(&self, kind: PacketKind, data: &[Quadword]) -> Result<()> {
        self.submitter.submit_packet(kind, data)
    }

    /// Handle for components that only submit packets
    pub fn submitter(&self) -> PacketSubmitter {
        self.submitter.clone()
    }

    /// Fill `buffer` with download data, blocking until the worker delivers it
    ///
    /// Every packet submitted before this call is processed by the backend
    /// before the download is serviced.
    pub fn request_download(&mut self, buffer: &mut [Quadword]) -> Result<()> {
        if buffer.is_empty() {
            return Ok(());
        }

        self.submitter
            .commands
            .send(BackendCommand::Download {
                count: buffer.len(),
            })
            .map_err(|_| FifoError::BackendDisconnected)?;
        self.download_requests += 1;

        for slot in buffer.iter_mut() {
            *slot = self
                .downloads
                .recv()
                .map_err(|_| FifoError::BackendDisconnected)?;
        }

        log::trace!("Bridge: downloaded {} QW", buffer.len());
        Ok(())
    }

    /// Number of download requests sent to the worker
    pub fn download_requests(&self) -> u64 {
        self.download_requests
    }

    /// Quadwords still owed for the current download
    #[inline(always)]
    pub fn pending_download(&self) -> u32 {
        self.pending_download
    }

    /// Record the size of a newly started download
    pub fn set_pending_download(&mut self, qwc: u32) {
        self.pending_download = qwc;
    }

    /// Account for `count` delivered quadwords; never goes below zero
    pub fn consume_pending(&mut self, count: u32) -> u32 {
        self.pending_download = self.pending_download.saturating_sub(count);
        self.pending_download
    }

    /// Stop the worker and wait for it to finish queued work
    pub fn shutdown(&mut self) {
        if let Some(worker) = self.worker.take() {
            // The worker may already be gone; either way we join below
            let _ = self.submitter.commands.send(BackendCommand::Shutdown);
            if worker.join().is_err() {
                log::error!("Render backend worker panicked");
            } else {
                log::info!("Render backend worker stopped");
            }
        }
    }
}

impl Drop for RenderBridge {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop<B: RenderBackend>(
    mut backend: B,
    commands: Receiver<BackendCommand>,
    downloads: Sender<Quadword>,
) {
    for command in commands.iter() {
        match command {
            BackendCommand::Packet { kind, data } => backend.submit(kind, &data),
            BackendCommand::Download { count } => {
                let mut out = vec![Quadword::ZERO; count];
                backend.download(&mut out);
                for qw in out {
                    if downloads.send(qw).is_err() {
                        return;
                    }
                }
            }
            BackendCommand::Shutdown => break,
        }
    }
}
