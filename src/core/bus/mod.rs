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

//! FIFO bus
//!
//! Owns every piece of FIFO state for one emulation session and routes
//! quadword accesses to the right port.
//!
//! # Memory Map
//!
//! | Address Range           | Port | Access       |
//! |-------------------------|------|--------------|
//! | 0x1000_4000-0x1000_4FFF | VIF0 | write        |
//! | 0x1000_5000-0x1000_5FFF | VIF1 | write / read |
//! | 0x1000_6000-0x1000_6FFF | GIF  | write        |
//! | 0x1000_7000-0x1000_7FFF | IPU  | not emulated |
//!
//! Every address in a page aliases the page base. The EE hardware base
//! may be omitted.

use crate::core::bridge::RenderBridge;
use crate::core::config::{AssertionPolicy, FifoConfig};
use crate::core::diagnostics::{Anomaly, Diagnostics, LogDiagnostics};
use crate::core::error::{FifoError, Result};
use crate::core::gif::{GifPort, GraphicsFrontEnd};
use crate::core::quadword::Quadword;
use crate::core::registers::{Direction, FifoPort, VifStat};
use crate::core::vif::{VifDecoder, VifPort, VIF1_FIFO_DEPTH};

/// Session-wide FIFO context
///
/// # Example
///
/// ```no_run
/// use eefifo::core::bus::FifoBus;
/// use eefifo::core::bridge::RenderBridge;
/// use eefifo::core::config::FifoConfig;
/// use eefifo::core::loopback::{ImmediateDecoder, LoopbackBackend, OpenFrontEnd};
/// use eefifo::core::Quadword;
///
/// let config = FifoConfig::default();
/// let bridge = RenderBridge::spawn(LoopbackBackend::new(), config.download_queue_depth)?;
/// let frontend = OpenFrontEnd::forwarding(bridge.submitter());
/// let mut bus = FifoBus::new(
///     config,
///     bridge,
///     Box::new(frontend),
///     Box::new(ImmediateDecoder),
///     Box::new(ImmediateDecoder),
/// )?;
///
/// bus.write_fifo(0x1000_6000, Quadword::new([1, 2, 3, 4]))?;
/// # Ok::<(), eefifo::FifoError>(())
/// ```
pub struct FifoBus {
    config: FifoConfig,

    vif0: VifPort,
    vif1: VifPort,
    gif: GifPort,

    vif0_decoder: Box<dyn VifDecoder>,
    vif1_decoder: Box<dyn VifDecoder>,
    frontend: Box<dyn GraphicsFrontEnd>,
    bridge: RenderBridge,
    diagnostics: Box<dyn Diagnostics>,
}

impl FifoBus {
    /// Build a bus in its power-on state
    ///
    /// Anomalies go to the `log` facade until [`FifoBus::with_diagnostics`]
    /// installs another sink.
    ///
    /// # Errors
    ///
    /// [`FifoError::InvalidConfig`] if `config` fails
    /// [`FifoConfig::validate`].
    pub fn new(
        config: FifoConfig,
        bridge: RenderBridge,
        frontend: Box<dyn GraphicsFrontEnd>,
        vif0_decoder: Box<dyn VifDecoder>,
        vif1_decoder: Box<dyn VifDecoder>,
    ) -> Result<Self> {
        config.validate()?;
        let gif = GifPort::new(config.gif_fifo_capacity);
        Ok(Self {
            config,
            vif0: VifPort::new(FifoPort::Vif0),
            vif1: VifPort::new(FifoPort::Vif1),
            gif,
            vif0_decoder,
            vif1_decoder,
            frontend,
            bridge,
            diagnostics: Box::new(LogDiagnostics),
        })
    }

    /// Replace the diagnostics sink
    pub fn with_diagnostics(mut self, diagnostics: Box<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Write one quadword to a FIFO page
    ///
    /// # Errors
    ///
    /// - [`FifoError::UnmappedAddress`] outside the FIFO pages
    /// - [`FifoError::PortNotEmulated`] for the IPU page
    pub fn write_fifo(&mut self, address: u32, value: Quadword) -> Result<()> {
        let policy = self.policy();

        match FifoPort::from_address(address)? {
            FifoPort::Vif0 => {
                self.vif0.write(
                    value,
                    self.vif0_decoder.as_mut(),
                    self.diagnostics.as_ref(),
                    policy,
                );
            }
            FifoPort::Vif1 => {
                self.vif1.write(
                    value,
                    self.vif1_decoder.as_mut(),
                    self.diagnostics.as_ref(),
                    policy,
                );
                // A DIRECT transfer may have just finished PATH2
                if self.gif.complete_path2(self.frontend.as_mut()) {
                    self.vif1.stat_mut().remove(VifStat::VGW);
                }
            }
            FifoPort::Gif => {
                self.gif
                    .write(value, self.frontend.as_mut(), self.diagnostics.as_ref());
            }
            port @ FifoPort::Ipu => return Err(FifoError::PortNotEmulated { port }),
        }

        Ok(())
    }

    /// Read one quadword from a FIFO page
    ///
    /// Only VIF1 has a read side. Reading VIF0 or GIF reports
    /// [`Anomaly::IllegalRead`] and returns zero.
    ///
    /// # Errors
    ///
    /// Same address errors as [`FifoBus::write_fifo`].
    pub fn read_fifo(&mut self, address: u32) -> Result<Quadword> {
        let policy = self.policy();

        match FifoPort::from_address(address)? {
            FifoPort::Vif1 => Ok(self.vif1.read_download(
                self.gif.stat_mut(),
                &mut self.bridge,
                self.diagnostics.as_ref(),
                policy,
            )),
            port @ (FifoPort::Vif0 | FifoPort::Gif) => {
                self.diagnostics.warn(Anomaly::IllegalRead { port });
                Ok(Quadword::ZERO)
            }
            port @ FifoPort::Ipu => Err(FifoError::PortNotEmulated { port }),
        }
    }

    /// Start a GS→host download of `qwc` quadwords
    ///
    /// Records the owed count on the bridge, shows up to 16 of them in
    /// VIF1 FQC and raises GIF OPH. FDR is left to the caller.
    pub fn begin_download(&mut self, qwc: u32) {
        log::debug!("GS download started: {} QW", qwc);
        self.bridge.set_pending_download(qwc);
        self.vif1.stat_mut().set_fqc(qwc.min(VIF1_FIFO_DEPTH));
        self.gif.stat_mut().set_output_pending(true);
    }

    /// Set VIF1 STAT.FDR
    pub fn set_vif1_direction(&mut self, direction: Direction) {
        self.vif1.stat_mut().set_direction(direction);
    }

    /// Flush the GIF FIFO if PATH3 data can be delivered now
    ///
    /// Returns the number of quadwords delivered.
    pub fn service_gif_fifo(&mut self) -> usize {
        self.gif.drain(self.frontend.as_mut())
    }

    /// Return every port, path and buffer to its power-on state
    pub fn reset(&mut self) {
        log::info!("FIFO bus reset");
        self.vif0.reset();
        self.vif1.reset();
        self.gif.reset();
        self.bridge.set_pending_download(0);
    }

    pub fn config(&self) -> &FifoConfig {
        &self.config
    }

    pub fn vif0(&self) -> &VifPort {
        &self.vif0
    }

    pub fn vif0_mut(&mut self) -> &mut VifPort {
        &mut self.vif0
    }

    pub fn vif1(&self) -> &VifPort {
        &self.vif1
    }

    pub fn vif1_mut(&mut self) -> &mut VifPort {
        &mut self.vif1
    }

    pub fn gif(&self) -> &GifPort {
        &self.gif
    }

    pub fn gif_mut(&mut self) -> &mut GifPort {
        &mut self.gif
    }

    pub fn bridge(&self) -> &RenderBridge {
        &self.bridge
    }

    pub fn bridge_mut(&mut self) -> &mut RenderBridge {
        &mut self.bridge
    }

    #[inline(always)]
    fn policy(&self) -> AssertionPolicy {
        self.config.assertions
    }
}
