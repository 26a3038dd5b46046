/*
    MartyPC
    https://github.com/dbalsom/martypc

    Copyright 2022-2025 Daniel Balsom

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    --------------------------------------------------------------------------

    device_types::tgui.rs

    Chip generations and board models of the Trident TGUI family, and the
    per-generation capability table consulted by the device model.

*/

use std::{fmt::Display, str::FromStr};

use serde_derive::{Deserialize, Serialize};
use strum_macros::EnumIter;

use crate::error::TguiError;

#[derive(Copy, Clone, Debug, Deserialize, Serialize, EnumIter, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub enum ChipType {
    Tgui9400Cxi,
    Tgui9440,
    Tgui9660,
    Tgui9680,
}

impl Display for ChipType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChipType::Tgui9400Cxi => write!(f, "TGUI9400CXi"),
            ChipType::Tgui9440 => write!(f, "TGUI9440AGi"),
            ChipType::Tgui9660 => write!(f, "TGUI9660XGi"),
            ChipType::Tgui9680 => write!(f, "TGUI9680XGi"),
        }
    }
}

/// How the accelerator gates pixel writes for CPU-sourced blits and line draws.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ClipPolicy {
    /// The write gate never opens. Display-sourced commands are unaffected.
    Inhibited,
    /// Every pixel is written.
    Unclipped,
    /// Pixels are written only inside the clip rectangle.
    Clipped,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RamdacKind {
    /// Hidden control register inside the chip.
    Internal,
    /// External TKD8001 RAMDAC.
    Tkd8001,
}

#[derive(Copy, Clone, Debug)]
pub struct Capabilities {
    pub has_accel_ports: bool,
    pub has_mmio: bool,
    pub clip_policy: ClipPolicy,
    pub tracks_blit_cursor: bool,
    pub has_fastline: bool,
    pub has_hw_cursor: bool,
    pub has_clock_synth: bool,
    pub has_i2c: bool,
    pub ramdac: RamdacKind,
    pub packed_chain4: bool,
    /// Writable bits of the second byte of the PCI base address registers.
    pub pci_base_mask: u8,
    /// Value returned from sequencer register 0x0B.
    pub chip_id: u8,
    /// Value returned from sequencer register 0x09, if the chip decodes it.
    pub revision_id: Option<u8>,
    pub pci_device_id: u16,
    /// Horizontal cursor multiplier applied in the packed 8-bit pixel mode.
    pub cursor_scale_factor: u32,
    /// Extended write modes (mono expansion, latch copy) on GDC 0x10.
    pub has_ext_write_modes: bool,
}

impl ChipType {
    pub fn capabilities(&self) -> Capabilities {
        match self {
            ChipType::Tgui9400Cxi => Capabilities {
                has_accel_ports: false,
                has_mmio: false,
                clip_policy: ClipPolicy::Inhibited,
                tracks_blit_cursor: false,
                has_fastline: false,
                has_hw_cursor: false,
                has_clock_synth: false,
                has_i2c: false,
                ramdac: RamdacKind::Tkd8001,
                packed_chain4: false,
                pci_base_mask: 0xE0,
                chip_id: 0x93,
                revision_id: None,
                pci_device_id: 0x9440,
                cursor_scale_factor: 1,
                has_ext_write_modes: true,
            },
            ChipType::Tgui9440 => Capabilities {
                has_accel_ports: true,
                has_mmio: true,
                clip_policy: ClipPolicy::Unclipped,
                tracks_blit_cursor: false,
                has_fastline: false,
                has_hw_cursor: true,
                has_clock_synth: true,
                has_i2c: true,
                ramdac: RamdacKind::Internal,
                packed_chain4: true,
                pci_base_mask: 0xE0,
                chip_id: 0xE3,
                revision_id: None,
                pci_device_id: 0x9440,
                cursor_scale_factor: 2,
                has_ext_write_modes: false,
            },
            ChipType::Tgui9660 | ChipType::Tgui9680 => Capabilities {
                has_accel_ports: true,
                has_mmio: true,
                clip_policy: ClipPolicy::Clipped,
                tracks_blit_cursor: true,
                has_fastline: true,
                has_hw_cursor: true,
                has_clock_synth: true,
                has_i2c: true,
                ramdac: RamdacKind::Internal,
                packed_chain4: true,
                pci_base_mask: 0xC0,
                chip_id: 0xD3,
                revision_id: if matches!(self, ChipType::Tgui9680) { Some(0x01) } else { None },
                pci_device_id: 0x9660,
                cursor_scale_factor: 2,
                has_ext_write_modes: false,
            },
        }
    }

    /// Installable VRAM sizes in megabytes, and the default.
    pub fn vram_choices(&self) -> (&'static [u32], u32) {
        match self {
            ChipType::Tgui9400Cxi | ChipType::Tgui9440 => (&[1, 2], 2),
            ChipType::Tgui9660 | ChipType::Tgui9680 => (&[1, 2, 4], 4),
        }
    }

    /// 9660 and 9680 share the 96xx register layout.
    pub fn is_96xx(&self) -> bool {
        matches!(self, ChipType::Tgui9660 | ChipType::Tgui9680)
    }

    pub fn is_9440_or_later(&self) -> bool {
        *self >= ChipType::Tgui9440
    }
}

#[derive(Copy, Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
pub enum BusType {
    Vlb,
    Pci,
}

/// A board variant: chip generation, host bus and whether an option ROM is fitted.
#[derive(Copy, Clone, Debug, Default, Deserialize, Serialize, EnumIter, Hash, Eq, PartialEq)]
pub enum TguiModel {
    #[serde(rename = "tgui9400cxi_vlb")]
    Tgui9400CxiVlb,
    #[serde(rename = "tgui9440_vlb")]
    Tgui9440Vlb,
    #[default]
    #[serde(rename = "tgui9440_pci")]
    Tgui9440Pci,
    #[serde(rename = "tgui9440_onboard_pci")]
    Tgui9440OnboardPci,
    #[serde(rename = "tgui9660_pci")]
    Tgui9660Pci,
    #[serde(rename = "tgui9660_onboard_pci")]
    Tgui9660OnboardPci,
    #[serde(rename = "tgui9680_pci")]
    Tgui9680Pci,
}

impl TguiModel {
    pub fn chip(&self) -> ChipType {
        match self {
            TguiModel::Tgui9400CxiVlb => ChipType::Tgui9400Cxi,
            TguiModel::Tgui9440Vlb | TguiModel::Tgui9440Pci | TguiModel::Tgui9440OnboardPci => ChipType::Tgui9440,
            TguiModel::Tgui9660Pci | TguiModel::Tgui9660OnboardPci => ChipType::Tgui9660,
            TguiModel::Tgui9680Pci => ChipType::Tgui9680,
        }
    }

    pub fn bus(&self) -> BusType {
        match self {
            TguiModel::Tgui9400CxiVlb | TguiModel::Tgui9440Vlb => BusType::Vlb,
            _ => BusType::Pci,
        }
    }

    pub fn has_bios(&self) -> bool {
        !matches!(self, TguiModel::Tgui9440OnboardPci | TguiModel::Tgui9660OnboardPci)
    }

    pub fn internal_name(&self) -> &'static str {
        match self {
            TguiModel::Tgui9400CxiVlb => "tgui9400cxi_vlb",
            TguiModel::Tgui9440Vlb => "tgui9440_vlb",
            TguiModel::Tgui9440Pci => "tgui9440_pci",
            TguiModel::Tgui9440OnboardPci => "tgui9440_onboard_pci",
            TguiModel::Tgui9660Pci => "tgui9660_pci",
            TguiModel::Tgui9660OnboardPci => "tgui9660_onboard_pci",
            TguiModel::Tgui9680Pci => "tgui9680_pci",
        }
    }
}

impl Display for TguiModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TguiModel::Tgui9400CxiVlb => write!(f, "Trident TGUI 9400CXi"),
            TguiModel::Tgui9440Vlb => write!(f, "Trident TGUI 9440AGi VLB"),
            TguiModel::Tgui9440Pci => write!(f, "Trident TGUI 9440AGi PCI"),
            TguiModel::Tgui9440OnboardPci => write!(f, "Trident TGUI 9440AGi On-Board PCI"),
            TguiModel::Tgui9660Pci => write!(f, "Trident TGUI 9660XGi PCI"),
            TguiModel::Tgui9660OnboardPci => write!(f, "Trident TGUI 9660XGi On-Board PCI"),
            TguiModel::Tgui9680Pci => write!(f, "Trident TGUI 9680XGi PCI"),
        }
    }
}

impl FromStr for TguiModel {
    type Err = TguiError;
    fn from_str(s: &str) -> Result<Self, TguiError>
    where
        Self: Sized,
    {
        match s.to_lowercase().as_str() {
            "tgui9400cxi_vlb" => Ok(TguiModel::Tgui9400CxiVlb),
            "tgui9440_vlb" => Ok(TguiModel::Tgui9440Vlb),
            "tgui9440_pci" => Ok(TguiModel::Tgui9440Pci),
            "tgui9440_onboard_pci" => Ok(TguiModel::Tgui9440OnboardPci),
            "tgui9660_pci" => Ok(TguiModel::Tgui9660Pci),
            "tgui9660_onboard_pci" => Ok(TguiModel::Tgui9660OnboardPci),
            "tgui9680_pci" => Ok(TguiModel::Tgui9680Pci),
            _ => Err(TguiError::UnknownModel(s.to_string())),
        }
    }
}
