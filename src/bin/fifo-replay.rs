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

//! FIFO trace replay
//!
//! Replays a JSON-lines trace of FIFO accesses against a loopback session
//! and prints every quadword read back. One operation per line:
//!
//! ```text
//! {"op": "write", "address": 268460032, "data": [1, 2, 3, 4]}
//! {"op": "download", "qwc": 1}
//! {"op": "read", "address": 268455936}
//! {"op": "service"}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use clap::Parser;
use eefifo::core::bridge::RenderBridge;
use eefifo::core::config::{AssertionPolicy, FifoConfig};
use eefifo::core::diagnostics::RecordingDiagnostics;
use eefifo::core::loopback::{ImmediateDecoder, LoopbackBackend, OpenFrontEnd};
use eefifo::core::registers::Direction;
use eefifo::core::{FifoBus, Quadword};
use eefifo::{FifoError, Result};
use serde::Deserialize;

#[derive(Parser, Debug)]
#[command(name = "fifo-replay", version, about = "Replay EE FIFO traces")]
struct Args {
    /// JSON-lines trace file
    trace: PathBuf,

    /// TOML session config (defaults to EEFIFO_* environment overrides)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Downgrade invariant violations to warnings
    #[arg(long)]
    tolerant: bool,
}

/// One traced FIFO access
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
enum TraceOp {
    Write { address: u32, data: [u32; 4] },
    Read { address: u32 },
    Download { qwc: u32 },
    Service,
}

fn parse_trace(reader: impl BufRead) -> Result<Vec<TraceOp>> {
    let mut ops = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let text = line.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }
        let op = serde_json::from_str(text).map_err(|e| FifoError::Trace {
            line: index + 1,
            message: e.to_string(),
        })?;
        ops.push(op);
    }
    Ok(ops)
}

fn replay(bus: &mut FifoBus, ops: &[TraceOp]) -> Result<Vec<(u32, Quadword)>> {
    let mut reads = Vec::new();
    for op in ops {
        match *op {
            TraceOp::Write { address, data } => bus.write_fifo(address, Quadword::new(data))?,
            TraceOp::Read { address } => reads.push((address, bus.read_fifo(address)?)),
            TraceOp::Download { qwc } => {
                bus.set_vif1_direction(Direction::DeviceToHost);
                bus.begin_download(qwc);
            }
            TraceOp::Service => {
                let drained = bus.service_gif_fifo();
                log::debug!("Serviced GIF FIFO: {} QW", drained);
            }
        }
    }
    Ok(reads)
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => FifoConfig::load(path)?,
        None => FifoConfig::from_env()?,
    };
    if args.tolerant {
        config.assertions = AssertionPolicy::Tolerant;
    }

    let ops = parse_trace(BufReader::new(File::open(&args.trace)?))?;
    log::info!("Replaying {} operations from {}", ops.len(), args.trace.display());

    let bridge = RenderBridge::spawn(LoopbackBackend::new(), config.download_queue_depth)?;
    let frontend = OpenFrontEnd::forwarding(bridge.submitter());
    let sink = RecordingDiagnostics::new();
    let mut bus = FifoBus::new(
        config,
        bridge,
        Box::new(frontend),
        Box::new(ImmediateDecoder),
        Box::new(ImmediateDecoder),
    )?
    .with_diagnostics(Box::new(sink.clone()));

    for (address, qw) in replay(&mut bus, &ops)? {
        println!("0x{:08X} -> {}", address, qw);
    }

    for anomaly in sink.anomalies() {
        log::warn!("{}", anomaly);
    }
    println!("{} anomalies", sink.len());

    Ok(())
}
