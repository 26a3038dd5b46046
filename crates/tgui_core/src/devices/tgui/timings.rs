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

    devices::tgui::timings.rs

    Display timing derivation. The VGA CRTC fields are decoded first, then
    the chip's extension bits, colour depth, row offset rules and pixel clock
    are applied on top. The result is handed to the host, which owns the
    actual raster generation.

*/

use serde_derive::Serialize;

use crate::{
    device_types::tgui::ChipType,
    devices::tgui::vga_regs::{
        VgaRegisters,
        CRTC_DISPLAY_CONTROL,
        CRTC_INTERFACE_CONTROL,
        CRTC_LINEAR_BASE_EXT,
        CRTC_MODULE_TESTING,
        CRTC_OFFSET,
        CRTC_PIXEL_BUS,
        GDC_BANK_CONTROL,
        GDC_POWER_MANAGEMENT,
        SEQ_CLOCKING_MODE,
    },
};

pub const REFERENCE_CLOCK: f64 = 14_318_180.0;
pub const VGA_CLOCK_0: f64 = 25_175_000.0;
pub const VGA_CLOCK_1: f64 = 28_322_000.0;

/// Fixed clock table of the 9400CXi, indexed by misc output bits 2-3 and
/// new control 2 bits 0 and 4. Indices 0 and 1 use the VGA clocks.
const TGUI9400_CLOCKS: [f64; 16] = [
    VGA_CLOCK_0,
    VGA_CLOCK_1,
    44_900_000.0,
    36_000_000.0,
    57_272_000.0,
    65_000_000.0,
    50_350_000.0,
    40_000_000.0,
    88_000_000.0,
    98_000_000.0,
    118_800_000.0,
    108_000_000.0,
    72_000_000.0,
    77_000_000.0,
    80_000_000.0,
    75_000_000.0,
];

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub enum RenderMode {
    /// Standard VGA text and planar modes.
    #[default]
    Vga,
    Highres8,
    Highres15,
    Highres16,
    Highres24,
    Highres32,
}

/// Programmable pixel clock of the 9440 and later.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ClockSynth {
    pub n: u8,
    pub m: u8,
    pub k: u8,
}

impl ClockSynth {
    /// Port 0x43C8: N in bits 0-6, M bit 0 in bit 7.
    pub fn write_low(&mut self, data: u8) {
        self.n = data & 0x7F;
        self.m = (self.m & !0x01) | (data >> 7);
    }

    /// Port 0x43C9: M bits 1-4 in bits 0-3, K in bit 4.
    pub fn write_high(&mut self, data: u8) {
        self.m = (self.m & !0x1E) | ((data << 1) & 0x1E);
        self.k = (data & 0x10) >> 4;
    }

    pub fn frequency(&self) -> f64 {
        ((self.n as f64 + 8.0) * REFERENCE_CLOCK) / ((self.m as f64 + 2.0) * (1u32 << self.k) as f64)
    }
}

/// Register state the timing computation reads.
pub struct TimingInputs<'a> {
    pub chip: ChipType,
    pub regs: &'a VgaRegisters,
    pub ramdac_depth: u32,
    pub oldctrl2: u8,
    pub newctrl2: u8,
    pub ger22: u16,
    pub clock: ClockSynth,
    pub vram_mask: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DisplayTimings {
    pub htotal: u32,
    pub hdisp: u32,
    pub vtotal: u32,
    pub dispend: u32,
    pub vsyncstart: u32,
    pub vblankstart: u32,
    pub split: u32,
    pub vdisp: u32,
    /// Scanline stride in CRTC units.
    pub rowoffset: u32,
    pub memaddr_latch: u32,
    pub display_mask: u32,
    pub bpp: u32,
    pub interlace: bool,
    pub lowres: bool,
    pub dpms: bool,
    /// Pixel clock in Hz.
    pub pixel_clock: f64,
    pub render_mode: RenderMode,
}

impl DisplayTimings {
    pub fn compute(input: &TimingInputs) -> Self {
        let mut t = DisplayTimings::vga(input.regs);
        t.apply_extensions(input);
        t
    }

    /// Plain VGA decode of the CRTC timing registers.
    fn vga(regs: &VgaRegisters) -> Self {
        let c = &regs.crtc;
        let bit = |reg: usize, mask: u8, value: u32| if c[reg] & mask != 0 { value } else { 0 };

        let vtotal = c[0x06] as u32 | bit(0x07, 0x01, 0x100) | bit(0x07, 0x20, 0x200);
        let dispend = c[0x12] as u32 | bit(0x07, 0x02, 0x100) | bit(0x07, 0x40, 0x200);
        let vsyncstart = c[0x10] as u32 | bit(0x07, 0x04, 0x100) | bit(0x07, 0x80, 0x200);
        let vblankstart = c[0x15] as u32 | bit(0x07, 0x08, 0x100) | bit(0x09, 0x20, 0x200);
        let split = c[0x18] as u32 | bit(0x07, 0x10, 0x100) | bit(0x09, 0x40, 0x200);

        let dots = if regs.seq[SEQ_CLOCKING_MODE as usize] & 0x01 != 0 { 8 } else { 9 };
        let pixel_clock = match (regs.misc_output >> 2) & 0x03 {
            1 => VGA_CLOCK_1,
            _ => VGA_CLOCK_0,
        };

        DisplayTimings {
            htotal: c[0x00] as u32 + 5,
            hdisp: (c[0x01] as u32 + 1) * dots,
            vtotal: vtotal + 2,
            dispend: dispend + 1,
            vsyncstart: vsyncstart + 1,
            vblankstart: vblankstart + 1,
            split: split + 1,
            vdisp: dispend + 1,
            rowoffset: c[CRTC_OFFSET as usize] as u32,
            memaddr_latch: (c[0x0C] as u32) << 8 | c[0x0D] as u32,
            display_mask: 0x3FFFF,
            bpp: 8,
            interlace: false,
            lowres: regs.seq[SEQ_CLOCKING_MODE as usize] & 0x08 != 0,
            dpms: false,
            pixel_clock,
            render_mode: RenderMode::Vga,
        }
    }

    fn apply_extensions(&mut self, input: &TimingInputs) {
        let regs = input.regs;
        let c = &regs.crtc;
        let accel_gen = input.chip != ChipType::Tgui9400Cxi;
        let ger22_lo = input.ger22 as u8;
        let ger22_hi = (input.ger22 >> 8) as u8;

        self.bpp = if accel_gen && c[CRTC_PIXEL_BUS as usize] & 0x19 == 0x09 {
            32
        }
        else {
            input.ramdac_depth
        };

        if accel_gen && self.bpp >= 24 {
            self.hdisp = (c[0x01] as u32 + 1) << 3;
        }

        if (c[CRTC_INTERFACE_CONTROL as usize] & 0x30 != 0 && self.bpp >= 15) || self.rowoffset == 0 {
            self.rowoffset |= 0x100;
        }

        let ext = c[CRTC_LINEAR_BASE_EXT as usize];
        if c[CRTC_MODULE_TESTING as usize] & 0xA0 == 0xA0 {
            self.memaddr_latch |= 0x10000;
        }
        for (bit, value) in [(0x01, 0x20000), (0x02, 0x40000), (0x04, 0x80000)] {
            if ext & bit != 0 {
                self.memaddr_latch |= value;
            }
        }
        if ext & 0x08 != 0 {
            self.split |= 0x400;
        }
        if ext & 0x10 != 0 {
            self.dispend |= 0x400;
        }
        if ext & 0x20 != 0 {
            self.vsyncstart |= 0x400;
        }
        if ext & 0x40 != 0 {
            self.vblankstart |= 0x400;
        }
        if ext & 0x80 != 0 {
            self.vtotal |= 0x400;
        }

        let wide_fetch = input.oldctrl2 & 0x10 != 0;
        if wide_fetch {
            self.rowoffset <<= 1;
        }

        self.interlace = c[CRTC_MODULE_TESTING as usize] & 0x04 != 0;
        if self.interlace && !accel_gen {
            self.rowoffset >>= 1;
        }

        if self.vdisp == 1020 {
            self.vdisp += 2;
        }

        if wide_fetch {
            self.memaddr_latch <<= 1;
        }

        self.lowres = c[CRTC_DISPLAY_CONTROL as usize] & 0x40 == 0;
        self.dpms = regs.gdc[GDC_POWER_MANAGEMENT as usize] & 0x03 != 0;
        self.display_mask = if c[CRTC_MODULE_TESTING as usize] & 0x80 != 0 {
            input.vram_mask
        }
        else {
            0x3FFFF
        };

        let bank_control = regs.gdc[GDC_BANK_CONTROL as usize];
        if accel_gen {
            if regs.misc_output & 0x08 != 0 {
                self.pixel_clock = input.clock.frequency();
            }
            if bank_control & 0x08 != 0 {
                self.pixel_clock /= 2.0;
            }
            else if bank_control & 0x40 != 0 {
                self.pixel_clock /= 3.0;
            }
        }
        else {
            let index = ((regs.misc_output >> 2) & 0x03) | ((input.newctrl2 << 2) & 0x04) | ((input.newctrl2 >> 3) & 0x08);
            if index >= 2 {
                self.pixel_clock = TGUI9400_CLOCKS[index as usize];
            }
            if bank_control & 0x08 != 0 {
                self.htotal <<= 1;
                self.hdisp <<= 1;
            }
        }

        if !wide_fetch && c[CRTC_DISPLAY_CONTROL as usize] & 0x40 == 0 {
            return;
        }

        match self.bpp {
            8 => {
                self.render_mode = RenderMode::Highres8;
                if self.vdisp == 1022 {
                    self.dispend += if self.interlace { 1 } else { 2 };
                }
                if input.chip.is_96xx() {
                    if matches!(self.vdisp, 1024 | 1200) {
                        self.htotal <<= 1;
                        self.hdisp <<= 1;
                    }
                    if ger22_hi & 0x80 != 0 {
                        self.htotal <<= 1;
                        self.hdisp <<= 1;
                    }
                    if self.hdisp == 640 && ger22_lo == 0 {
                        self.rowoffset = 0x50;
                    }
                }
            }
            15 | 16 => {
                self.render_mode = if self.bpp == 15 {
                    RenderMode::Highres15
                }
                else {
                    RenderMode::Highres16
                };
                if !accel_gen {
                    self.hdisp >>= 1;
                }
            }
            24 => {
                self.render_mode = RenderMode::Highres24;
                if !accel_gen {
                    self.hdisp = (self.hdisp << 1) / 3;
                }
            }
            32 => {
                if self.rowoffset == 0x100 {
                    self.rowoffset <<= 1;
                }
                self.render_mode = RenderMode::Highres32;
            }
            _ => {}
        }
    }
}
