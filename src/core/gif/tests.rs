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

//! Unit tests for the GIF FIFO port

use super::*;
use crate::core::diagnostics::RecordingDiagnostics;
use crate::core::mock::MockFrontEnd;

fn qw(n: u32) -> Quadword {
    Quadword::new([n, 0, 0, n])
}

// ========== Delivery Tests ==========

#[test]
fn test_direct_delivery_when_path3_open() {
    let mut port = GifPort::default();
    let mut frontend = MockFrontEnd::accepting();
    let sink = RecordingDiagnostics::new();

    port.write(qw(1), &mut frontend, &sink);

    assert_eq!(frontend.received(), vec![qw(1)]);
    assert_eq!(
        frontend.state.borrow().packets[0].0,
        PacketKind::Fifo,
        "FIFO writes travel as PATH3 FIFO packets"
    );
    assert!(port.fifo().is_empty());
    assert_eq!(port.stat().fqc(), 0);
}

#[test]
fn test_buffered_when_path3_closed_then_drained() {
    let mut port = GifPort::default();
    let mut frontend = MockFrontEnd::default();
    let sink = RecordingDiagnostics::new();

    port.write(qw(1), &mut frontend, &sink);

    assert_eq!(port.fifo().len(), 1);
    assert_eq!(port.stat().fqc(), 1);
    assert_eq!(frontend.packet_count(), 0);

    frontend.set_accept_path3(true);
    let drained = port.drain(&mut frontend);

    assert_eq!(drained, 1);
    assert!(port.fifo().is_empty());
    assert_eq!(port.stat().fqc(), 0);
    assert_eq!(frontend.received(), vec![qw(1)]);
}

#[test]
fn test_queued_data_keeps_order_on_next_write() {
    let mut port = GifPort::default();
    let mut frontend = MockFrontEnd::default();
    let sink = RecordingDiagnostics::new();

    port.write(qw(1), &mut frontend, &sink);
    port.write(qw(2), &mut frontend, &sink);
    frontend.set_accept_path3(true);
    // Buffer is non-empty, so this one must queue behind the others
    port.write(qw(3), &mut frontend, &sink);

    assert!(port.fifo().is_empty());
    assert_eq!(frontend.received(), vec![qw(1), qw(2), qw(3)]);
    assert_eq!(frontend.packet_count(), 1);
}

#[test]
fn test_drain_noop_while_closed() {
    let mut port = GifPort::default();
    let mut frontend = MockFrontEnd::default();
    port.write(qw(1), &mut frontend, &RecordingDiagnostics::new());

    assert_eq!(port.drain(&mut frontend), 0);
    assert_eq!(port.fifo().len(), 1);
}

#[test]
fn test_overflow_drops_and_reports() {
    let mut port = GifPort::new(2);
    let mut frontend = MockFrontEnd::default();
    let sink = RecordingDiagnostics::new();

    for n in 0..3 {
        port.write(qw(n), &mut frontend, &sink);
    }

    assert_eq!(port.fifo().len(), 2);
    assert_eq!(port.stat().fqc(), 2);
    assert_eq!(sink.anomalies(), vec![Anomaly::GifFifoOverflow { capacity: 2 }]);

    frontend.set_accept_path3(true);
    port.drain(&mut frontend);
    assert_eq!(frontend.received(), vec![qw(0), qw(1)]);
}

// ========== Path Tests ==========

#[test]
fn test_waiting_path3_returns_to_idle() {
    let mut port = GifPort::default();
    let mut frontend = MockFrontEnd::accepting();
    port.request_path(GifPathId::Path1);
    port.request_path(GifPathId::Path3);
    assert_eq!(port.arbiter().state(GifPathId::Path3), GifPathState::Waiting);

    port.write(qw(1), &mut frontend, &RecordingDiagnostics::new());

    assert_eq!(port.arbiter().state(GifPathId::Path3), GifPathState::Idle);
    assert!(!port.stat().contains(GifStat::P3Q));
    // PATH1 still owns the GIF
    assert_eq!(port.stat().active_path(), Some(GifPathId::Path1));
    assert!(frontend.executions().is_empty());
}

#[test]
fn test_path3_completion_releases_and_kicks() {
    let mut port = GifPort::default();
    let mut frontend = MockFrontEnd::accepting();
    frontend.set_paths_ready(true);
    port.stat_mut().set_active_path(Some(GifPathId::Path3));
    port.stat_mut().set_output_pending(true);

    port.write(qw(1), &mut frontend, &RecordingDiagnostics::new());

    assert_eq!(port.stat().active_path(), None);
    assert!(!port.stat().output_pending());
    assert_eq!(frontend.evaluations(), vec![[true, false, true]]);
    assert_eq!(frontend.executions(), vec![(false, false)]);
}

#[test]
fn test_path3_completion_without_ready_paths() {
    let mut port = GifPort::default();
    let mut frontend = MockFrontEnd::accepting();
    port.stat_mut().set_active_path(Some(GifPathId::Path3));

    port.write(qw(1), &mut frontend, &RecordingDiagnostics::new());

    assert_eq!(port.stat().active_path(), None);
    assert_eq!(frontend.evaluations().len(), 1);
    assert!(frontend.executions().is_empty());
}

#[test]
fn test_active_path3_state_skips_reevaluation() {
    let mut port = GifPort::default();
    let mut frontend = MockFrontEnd::accepting();
    frontend.set_paths_ready(true);
    port.request_path(GifPathId::Path3);

    port.write(qw(1), &mut frontend, &RecordingDiagnostics::new());

    // APATH/OPH released together, but PATH3 is still mid-transfer
    assert_eq!(port.stat().active_path(), None);
    assert!(!port.stat().output_pending());
    assert_eq!(port.arbiter().state(GifPathId::Path3), GifPathState::Active);
    assert!(frontend.evaluations().is_empty());
    assert!(frontend.executions().is_empty());
}

#[test]
fn test_other_active_path_untouched() {
    let mut port = GifPort::default();
    let mut frontend = MockFrontEnd::accepting();
    frontend.set_paths_ready(true);
    port.request_path(GifPathId::Path2);

    port.write(qw(1), &mut frontend, &RecordingDiagnostics::new());

    assert_eq!(port.stat().active_path(), Some(GifPathId::Path2));
    assert!(port.stat().output_pending());
    assert!(frontend.executions().is_empty());
}

#[test]
fn test_complete_path2() {
    let mut port = GifPort::default();
    let mut frontend = MockFrontEnd::accepting();
    frontend.set_paths_ready(true);
    port.request_path(GifPathId::Path2);

    // Not complete yet
    assert!(!port.complete_path2(&mut frontend));
    assert_eq!(port.stat().active_path(), Some(GifPathId::Path2));

    frontend.set_complete(GifPathId::Path2, true);
    assert!(port.complete_path2(&mut frontend));

    assert_eq!(port.stat().active_path(), None);
    assert!(!port.stat().output_pending());
    assert_eq!(frontend.evaluations(), vec![[true, false, true]]);
    assert_eq!(frontend.executions(), vec![(false, true)]);
}

#[test]
fn test_complete_path2_ignored_when_not_owner() {
    let mut port = GifPort::default();
    let mut frontend = MockFrontEnd::accepting();
    frontend.set_complete(GifPathId::Path2, true);
    port.request_path(GifPathId::Path1);

    assert!(!port.complete_path2(&mut frontend));
    assert_eq!(port.stat().active_path(), Some(GifPathId::Path1));
}

#[test]
fn test_finish_path() {
    let mut port = GifPort::default();
    port.request_path(GifPathId::Path1);
    port.finish_path(GifPathId::Path1);

    assert_eq!(port.arbiter().active(), None);
    assert_eq!(port.stat().active_path(), None);
}

#[test]
fn test_reset() {
    let mut port = GifPort::default();
    let mut frontend = MockFrontEnd::default();
    port.request_path(GifPathId::Path2);
    port.write(qw(1), &mut frontend, &RecordingDiagnostics::new());

    port.reset();

    assert_eq!(port.stat(), GifStat::default());
    assert!(port.fifo().is_empty());
    for path in GifPathId::ALL {
        assert_eq!(port.arbiter().state(path), GifPathState::Idle);
    }
}

#[test]
fn test_completed_path2_frees_gif_for_other_paths() {
    let mut port = GifPort::default();
    let mut frontend = MockFrontEnd::accepting();
    frontend.set_complete(GifPathId::Path2, true);
    port.request_path(GifPathId::Path2);

    assert!(port.complete_path2(&mut frontend));
    assert_eq!(port.arbiter().state(GifPathId::Path2), GifPathState::Idle);

    assert!(port.request_path(GifPathId::Path1));
    assert_eq!(port.arbiter().active(), Some(GifPathId::Path1));
    assert_eq!(port.stat().active_path(), Some(GifPathId::Path1));
}

#[test]
fn test_finished_path3_cycle_frees_gif_for_other_paths() {
    let mut port = GifPort::default();
    let mut frontend = MockFrontEnd::accepting();
    port.request_path(GifPathId::Path3);

    port.write(qw(1), &mut frontend, &RecordingDiagnostics::new());
    assert_eq!(port.stat().active_path(), None);

    assert!(port.request_path(GifPathId::Path1));
    assert_eq!(port.arbiter().state(GifPathId::Path1), GifPathState::Active);
    assert_eq!(port.arbiter().state(GifPathId::Path3), GifPathState::Idle);
    assert_eq!(port.arbiter().active_count(), 1);
}

#[test]
fn test_fqc_matches_fifo_for_oversized_capacity() {
    let mut port = GifPort::new(40);
    let mut frontend = MockFrontEnd::default();
    let sink = RecordingDiagnostics::new();

    for n in 0..32 {
        port.write(qw(n), &mut frontend, &sink);
    }

    assert_eq!(port.fifo().capacity(), GifFifo::MAX_CAPACITY);
    assert_eq!(port.fifo().len(), 31);
    assert_eq!(port.stat().fqc(), 31);
    assert_eq!(sink.anomalies(), vec![Anomaly::GifFifoOverflow { capacity: 31 }]);
}
