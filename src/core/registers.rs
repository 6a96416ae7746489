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

//! FIFO port register model
//!
//! Status registers for the VIF0/VIF1 and GIF FIFO ports, plus the page
//! decoding for the FIFO address space.
//!
//! # FIFO Pages
//!
//! | Range             | Port | Notes                                  |
//! |-------------------|------|----------------------------------------|
//! | 0x10004000-0x4FFF | VIF0 | all addresses alias to the page base   |
//! | 0x10005000-0x5FFF | VIF1 | all addresses alias to the page base   |
//! | 0x10006000-0x6FFF | GIF  | all addresses alias to the page base   |
//! | 0x10007000-0x7FFF | IPU  | out/in at +0x00 and +0x10 (not emulated) |
//!
//! The page may be given either with the EE hardware base (0x1000_0000)
//! or as a bare page offset (0x4000-0x7FFF).
//!
//! # VIF STAT
//!
//! ```text
//! Bit   | Name | Meaning
//! ------|------|------------------------------------------
//! 0-1   | VPS  | Command status (idle/waiting/decoding/transferring)
//! 2     | VEW  | Waiting for end of VU microprogram
//! 3     | VGW  | Waiting for GIF (stall until path released)
//! 6     | MRK  | MARK detected
//! 7     | DBF  | Double buffer flag
//! 8     | VSS  | Stalled by STOP (sending)
//! 9     | VFS  | Stalled by force break
//! 10    | VIS  | Stalled by interrupt bit
//! 11    | INT  | Interrupt bit detected
//! 12    | ER0  | DMAtag mismatch
//! 13    | ER1  | Invalid command
//! 23    | FDR  | FIFO direction (0 = host→VIF, 1 = VIF→host)
//! 24-28 | FQC  | FIFO quadword count
//! ```
//!
//! # GIF STAT
//!
//! ```text
//! Bit   | Name  | Meaning
//! ------|-------|------------------------------------------
//! 0     | M3R   | PATH3 masked by GIF_MODE
//! 1     | M3P   | PATH3 masked by VIF
//! 2     | IMT   | Intermittent mode
//! 3     | PSE   | Temporary transfer stop
//! 5     | IP3   | PATH3 interrupted
//! 6     | P3Q   | PATH3 request queued
//! 7     | P2Q   | PATH2 request queued
//! 8     | P1Q   | PATH1 request queued
//! 9     | OPH   | Output path (front-end has output pending)
//! 10-11 | APATH | Active path (0 = none, 1-3 = PATH1-3)
//! 12    | DIR   | Transfer direction
//! 24-28 | FQC   | GIF FIFO quadword count
//! ```

use std::fmt;

use bitflags::bitflags;

use super::error::{FifoError, Result};

/// Base of the EE hardware register block the FIFO pages live in
pub const EE_HW_BASE: u32 = 0x1000_0000;

/// Size of one FIFO register page
pub const FIFO_PAGE_SIZE: u32 = 0x1000;

/// One of the four FIFO register pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FifoPort {
    /// VIF0 FIFO (0x4000)
    Vif0,
    /// VIF1 FIFO (0x5000), the only page that can run in the download direction
    Vif1,
    /// GIF FIFO (0x6000), PATH3
    Gif,
    /// IPU FIFO (0x7000), shares the page layout but is not emulated here
    Ipu,
}

impl FifoPort {
    /// Decode a FIFO address into its page
    ///
    /// # Errors
    ///
    /// Returns [`FifoError::UnmappedAddress`] if the address is not in
    /// 0x4000-0x7FFF (optionally offset by [`EE_HW_BASE`]).
    ///
    /// # Examples
    ///
    /// ```
    /// use eefifo::core::registers::FifoPort;
    ///
    /// assert_eq!(FifoPort::from_address(0x1000_5010).unwrap(), FifoPort::Vif1);
    /// assert_eq!(FifoPort::from_address(0x6FF0).unwrap(), FifoPort::Gif);
    /// assert!(FifoPort::from_address(0x1000_3000).is_err());
    /// ```
    pub fn from_address(address: u32) -> Result<Self> {
        let high = address & 0xFFFF_0000;
        if high != 0 && high != EE_HW_BASE {
            return Err(FifoError::UnmappedAddress { address });
        }

        match address & 0x0000_F000 {
            0x4000 => Ok(FifoPort::Vif0),
            0x5000 => Ok(FifoPort::Vif1),
            0x6000 => Ok(FifoPort::Gif),
            0x7000 => Ok(FifoPort::Ipu),
            _ => Err(FifoError::UnmappedAddress { address }),
        }
    }

    /// Page base address (with the EE hardware base applied)
    pub const fn base_address(self) -> u32 {
        EE_HW_BASE
            + match self {
                FifoPort::Vif0 => 0x4000,
                FifoPort::Vif1 => 0x5000,
                FifoPort::Gif => 0x6000,
                FifoPort::Ipu => 0x7000,
            }
    }

    /// Whether the port can be switched to the device→host direction
    pub const fn direction_capable(self) -> bool {
        matches!(self, FifoPort::Vif1 | FifoPort::Ipu)
    }
}

impl fmt::Display for FifoPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FifoPort::Vif0 => "VIF0",
            FifoPort::Vif1 => "VIF1",
            FifoPort::Gif => "GIF",
            FifoPort::Ipu => "IPU",
        };
        f.write_str(name)
    }
}

/// FIFO transfer direction (VIF1 STAT.FDR)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Host writes quadwords into the unit (FDR = 0)
    #[default]
    HostToDevice,
    /// Host reads quadwords back from the front-end (FDR = 1)
    DeviceToHost,
}

/// VIF command status (VIF STAT.VPS)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VifPhase {
    /// No command in progress
    #[default]
    Idle = 0,
    /// Command finished sending data, waiting to be acknowledged
    Waiting = 1,
    /// Decoding a VIFcode
    Decoding = 2,
    /// Transferring command data
    Transferring = 3,
}

impl VifPhase {
    fn from_bits(bits: u32) -> Self {
        match bits & 0b11 {
            0 => VifPhase::Idle,
            1 => VifPhase::Waiting,
            2 => VifPhase::Decoding,
            _ => VifPhase::Transferring,
        }
    }
}

/// GIF transfer path identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GifPathId {
    /// PATH1: VU1 XGKICK
    Path1 = 1,
    /// PATH2: VIF1 DIRECT/DIRECTHL
    Path2 = 2,
    /// PATH3: GIF DMA channel or GIF FIFO
    Path3 = 3,
}

impl GifPathId {
    /// All paths in fixed arbitration order
    pub const ALL: [GifPathId; 3] = [GifPathId::Path1, GifPathId::Path2, GifPathId::Path3];

    /// Zero-based index for per-path tables
    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize - 1
    }

    /// Decode an APATH field value; 0 means no path owns the front-end
    ///
    /// # Panics
    ///
    /// Panics on values outside 0-3, which the 2-bit field cannot hold.
    pub fn from_apath(value: u32) -> Option<Self> {
        match value {
            0 => None,
            1 => Some(GifPathId::Path1),
            2 => Some(GifPathId::Path2),
            3 => Some(GifPathId::Path3),
            other => unreachable!("APATH value {} outside its 2-bit domain", other),
        }
    }
}

impl fmt::Display for GifPathId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PATH{}", *self as u32)
    }
}

bitflags! {
    /// VIF0/VIF1 STAT register
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct VifStat: u32 {
        const VPS = 0b11;
        const VEW = 1 << 2;
        const VGW = 1 << 3;
        const MRK = 1 << 6;
        const DBF = 1 << 7;
        const VSS = 1 << 8;
        const VFS = 1 << 9;
        const VIS = 1 << 10;
        const INT = 1 << 11;
        const ER0 = 1 << 12;
        const ER1 = 1 << 13;
        const FDR = 1 << 23;
        const FQC = 0x1F << 24;

        /// Any reason for the unit to be stalled
        const STALLED = Self::INT.bits() | Self::VSS.bits() | Self::VIS.bits() | Self::VFS.bits();
    }
}

impl VifStat {
    const FQC_SHIFT: u32 = 24;

    /// Command status (VPS)
    #[inline(always)]
    pub fn vps(&self) -> VifPhase {
        VifPhase::from_bits(self.bits())
    }

    /// Set command status (VPS)
    pub fn set_vps(&mut self, phase: VifPhase) {
        self.remove(Self::VPS);
        *self |= Self::from_bits_retain(phase as u32);
    }

    /// FIFO quadword count (FQC)
    #[inline(always)]
    pub fn fqc(&self) -> u32 {
        (self.bits() & Self::FQC.bits()) >> Self::FQC_SHIFT
    }

    /// Set FIFO quadword count; values are truncated to the 5-bit field
    pub fn set_fqc(&mut self, count: u32) {
        self.remove(Self::FQC);
        *self |= Self::from_bits_retain((count << Self::FQC_SHIFT) & Self::FQC.bits());
    }

    /// FIFO direction (FDR)
    #[inline(always)]
    pub fn direction(&self) -> Direction {
        if self.contains(Self::FDR) {
            Direction::DeviceToHost
        } else {
            Direction::HostToDevice
        }
    }

    /// Set FIFO direction (FDR)
    pub fn set_direction(&mut self, direction: Direction) {
        self.set(Self::FDR, direction == Direction::DeviceToHost);
    }

    /// Check whether any stall reason (INT/VSS/VIS/VFS) is set
    #[inline(always)]
    pub fn is_stalled(&self) -> bool {
        self.intersects(Self::STALLED)
    }
}

bitflags! {
    /// GIF STAT register
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct GifStat: u32 {
        const M3R = 1 << 0;
        const M3P = 1 << 1;
        const IMT = 1 << 2;
        const PSE = 1 << 3;
        const IP3 = 1 << 5;
        const P3Q = 1 << 6;
        const P2Q = 1 << 7;
        const P1Q = 1 << 8;
        const OPH = 1 << 9;
        const APATH = 0b11 << 10;
        const DIR = 1 << 12;
        const FQC = 0x1F << 24;
    }
}

impl GifStat {
    const APATH_SHIFT: u32 = 10;
    const FQC_SHIFT: u32 = 24;

    /// Path currently owning the front-end (APATH)
    #[inline(always)]
    pub fn active_path(&self) -> Option<GifPathId> {
        GifPathId::from_apath((self.bits() & Self::APATH.bits()) >> Self::APATH_SHIFT)
    }

    /// Set the path owning the front-end (APATH)
    pub fn set_active_path(&mut self, path: Option<GifPathId>) {
        let value = path.map_or(0, |p| p as u32);
        self.remove(Self::APATH);
        *self |= Self::from_bits_retain(value << Self::APATH_SHIFT);
    }

    /// Output pending flag (OPH)
    #[inline(always)]
    pub fn output_pending(&self) -> bool {
        self.contains(Self::OPH)
    }

    /// Set output pending flag (OPH)
    pub fn set_output_pending(&mut self, pending: bool) {
        self.set(Self::OPH, pending);
    }

    /// Clear APATH and OPH together in a single register update
    pub fn release_active_path(&mut self) {
        *self = Self::from_bits_retain(self.bits() & !(Self::APATH.bits() | Self::OPH.bits()));
    }

    /// GIF FIFO quadword count (FQC)
    #[inline(always)]
    pub fn fqc(&self) -> u32 {
        (self.bits() & Self::FQC.bits()) >> Self::FQC_SHIFT
    }

    /// Set GIF FIFO quadword count; values are truncated to the 5-bit field
    pub fn set_fqc(&mut self, count: u32) {
        self.remove(Self::FQC);
        *self |= Self::from_bits_retain((count << Self::FQC_SHIFT) & Self::FQC.bits());
    }
}
