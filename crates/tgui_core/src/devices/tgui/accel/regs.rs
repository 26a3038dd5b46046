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

    devices::tgui::accel::regs.rs

    Graphics engine register file (GER). Registers are eight bits wide on the
    bus; wider host accesses arrive here as sequential byte accesses.

*/

use modular_bitfield::{bitfield, prelude::*};

use super::rop;

pub const GER_STATUS: u16 = 0x2120;
pub const GER_MODE_LO: u16 = 0x2122;
pub const GER_MODE_HI: u16 = 0x2123;
pub const GER_COMMAND: u16 = 0x2124;
pub const GER_ROP: u16 = 0x2127;
pub const GER_FLAGS: u16 = 0x2128;
pub const GER_FG_COLOR: u16 = 0x212C;
pub const GER_BG_COLOR: u16 = 0x2130;
pub const GER_PATTERN_LOC: u16 = 0x2134;
pub const GER_DST_X: u16 = 0x2138;
pub const GER_DST_Y: u16 = 0x213A;
pub const GER_SRC_X: u16 = 0x213C;
pub const GER_SRC_Y: u16 = 0x213E;
pub const GER_SIZE_X: u16 = 0x2140;
pub const GER_SIZE_Y: u16 = 0x2142;
pub const GER_STYLE: u16 = 0x2144;
pub const GER_CLIP_SRC_X: u16 = 0x2148;
pub const GER_CLIP_SRC_Y: u16 = 0x214A;
pub const GER_CLIP_DST_X: u16 = 0x214C;
pub const GER_CLIP_DST_Y: u16 = 0x214E;
pub const GER_COLOR_KEY: u16 = 0x2168;
pub const GER_FG_COLOR_ALT: u16 = 0x2178;
pub const GER_BG_COLOR_ALT: u16 = 0x217C;
pub const GER_PATTERN: u16 = 0x2180;
pub const GER_PATTERN_END: u16 = 0x21FF;

pub const PATTERN_SIZE: usize = 0x80;
pub const PATTERN_32BPP_SIZE: usize = 0x100;

/// Drawing flags register (0x2128-0x212B).
#[bitfield]
#[derive(Copy, Clone)]
pub struct AccelFlags {
    #[skip]
    unused0: B1,
    pub src_pattern: bool,
    pub src_display: bool,
    #[skip]
    unused1: B2,
    pub pattern_mono: bool,
    pub src_mono: bool,
    #[skip]
    unused2: B1,
    /// Bit 0: y decrements. Bit 1: x decrements. As a line octant, bit 2 selects y-major.
    pub direction: B3,
    #[skip]
    unused3: B1,
    pub transparent_enable: bool,
    pub transparent_reverse: bool,
    pub solid_fill: bool,
    pub stencil: bool,
    #[skip]
    unused4: B8,
    /// Leading bits to discard from the first word of each mono source row.
    pub mono_skip: B3,
    #[skip]
    unused5: B5,
}

impl AccelFlags {
    pub fn from_u32(raw: u32) -> Self {
        AccelFlags::from_bytes(raw.to_le_bytes())
    }

    #[inline]
    pub fn xdir(&self) -> i32 {
        if self.direction() & 0b010 != 0 {
            -1
        }
        else {
            1
        }
    }

    #[inline]
    pub fn ydir(&self) -> i32 {
        if self.direction() & 0b001 != 0 {
            -1
        }
        else {
            1
        }
    }
}

/// GER22 mode register.
#[bitfield]
#[derive(Copy, Clone)]
pub struct Ger22 {
    /// Pixel format code programmed by the driver. 8 selects packed 8-bit pixels.
    pub mode: B8,
    #[skip]
    unused0: B1,
    /// Write every pixel of a mono-pattern CPU blit regardless of transparency.
    pub force_pattern: bool,
    #[skip]
    unused1: B5,
    pub double_hdisp: bool,
}

impl Ger22 {
    pub fn from_u16(raw: u16) -> Self {
        Ger22::from_bytes(raw.to_le_bytes())
    }
}

/// What a register write asks of the engine once the byte is latched.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RegisterEffect {
    None,
    /// GER22 was written; the engine pixel size follows the display depth.
    ModeWritten,
    /// The command register was written.
    StartCommand,
}

#[inline]
fn set_byte32(reg: u32, byte: u16, data: u8) -> u32 {
    let shift = (byte & 3) * 8;
    (reg & !(0xFF << shift)) | ((data as u32) << shift)
}

#[inline]
fn byte32(reg: u32, byte: u16) -> u8 {
    (reg >> ((byte & 3) * 8)) as u8
}

#[inline]
fn set_lo16(reg: i16, data: u8) -> i16 {
    ((reg as u16 & 0xFF00) | data as u16) as i16
}

#[inline]
fn set_hi16(reg: i16, data: u8) -> i16 {
    ((reg as u16 & 0x00FF) | (data as u16) << 8) as i16
}

#[inline]
fn byte16(reg: i16, hi: bool) -> u8 {
    if hi {
        (reg as u16 >> 8) as u8
    }
    else {
        reg as u8
    }
}

/// Low byte of a 14-bit coordinate. The sign extension bits are cleared.
#[inline]
fn set_coord_lo(reg: i16, data: u8) -> i16 {
    ((reg as u16 & 0x3F00) | data as u16) as i16
}

/// High byte of a coordinate field: six bits, sign extended from bit 13 into
/// every bit above `width`.
#[inline]
fn set_coord_hi(reg: i16, data: u8, width: u32) -> i16 {
    let mut value = (reg as u16 & 0x00FF) | ((data as u16 & 0x3F) << 8);
    if data & 0x20 != 0 {
        value |= !((1u16 << width) - 1);
    }
    value as i16
}

#[derive(Clone)]
pub struct AccelRegisters {
    pub ger22: u16,
    pub command: u8,
    pub rop: u8,
    /// Whether `rop` reads its source operand.
    pub use_src: bool,
    pub flags: u32,
    pub fg_color: u32,
    pub bg_color: u32,
    pub pattern_loc: u16,
    pub dst_x: i16,
    pub dst_y: i16,
    /// Source x, or the Bresenham diagonal step constant.
    pub src_x: i16,
    /// Source y, or the Bresenham axial step constant.
    pub src_y: i16,
    /// Width minus one, or the Bresenham error term.
    pub size_x: i16,
    /// Height minus one (12 bits), or the major axis pixel count.
    pub size_y: i16,
    /// Short vector length and direction, sharing the size y address.
    pub sv_size_y: u16,
    pub style: u32,
    pub src_x_clip: i16,
    pub src_y_clip: i16,
    pub dst_x_clip: i16,
    pub dst_y_clip: i16,
    pub color_key: u32,
    pub pattern: [u8; PATTERN_SIZE],
    pub pattern_32bpp: [u8; PATTERN_32BPP_SIZE],
    pub pattern_32_idx: u8,
}

impl Default for AccelRegisters {
    fn default() -> Self {
        Self {
            ger22: 0,
            command: 0,
            rop: 0,
            use_src: false,
            flags: 0,
            fg_color: 0,
            bg_color: 0,
            pattern_loc: 0,
            dst_x: 0,
            dst_y: 0,
            src_x: 0,
            src_y: 0,
            size_x: 0,
            size_y: 0,
            sv_size_y: 0,
            style: 0,
            src_x_clip: 0,
            src_y_clip: 0,
            dst_x_clip: 0,
            dst_y_clip: 0,
            color_key: 0,
            pattern: [0; PATTERN_SIZE],
            pattern_32bpp: [0; PATTERN_32BPP_SIZE],
            pattern_32_idx: 0,
        }
    }
}

impl AccelRegisters {
    pub fn flags(&self) -> AccelFlags {
        AccelFlags::from_u32(self.flags)
    }

    pub fn mode(&self) -> Ger22 {
        Ger22::from_u16(self.ger22)
    }

    pub fn set_rop(&mut self, rop: u8) {
        self.rop = rop;
        self.use_src = rop::uses_source(rop);
    }

    /// Latch one byte into the register file.
    pub fn write_u8(&mut self, port: u16, data: u8) -> RegisterEffect {
        match port {
            GER_MODE_LO => {
                self.ger22 = (self.ger22 & 0xFF00) | data as u16;
                return RegisterEffect::ModeWritten;
            }
            GER_MODE_HI => {
                self.ger22 = (self.ger22 & 0x00FF) | (data as u16) << 8;
                return RegisterEffect::ModeWritten;
            }
            GER_COMMAND => {
                self.command = data;
                return RegisterEffect::StartCommand;
            }
            GER_ROP => self.set_rop(data),
            0x2128..=0x212B => self.flags = set_byte32(self.flags, port - GER_FLAGS, data),
            0x212C..=0x212F => self.fg_color = set_byte32(self.fg_color, port - GER_FG_COLOR, data),
            0x2178..=0x217B => self.fg_color = set_byte32(self.fg_color, port - GER_FG_COLOR_ALT, data),
            0x2130..=0x2133 => self.bg_color = set_byte32(self.bg_color, port - GER_BG_COLOR, data),
            0x217C..=0x217F => self.bg_color = set_byte32(self.bg_color, port - GER_BG_COLOR_ALT, data),
            0x2134 => self.pattern_loc = (self.pattern_loc & 0xFF00) | data as u16,
            0x2135 => self.pattern_loc = (self.pattern_loc & 0x00FF) | (data as u16) << 8,
            0x2138 => self.dst_x = set_lo16(self.dst_x, data),
            0x2139 => self.dst_x = set_hi16(self.dst_x, data),
            0x213A => self.dst_y = set_lo16(self.dst_y, data),
            0x213B => self.dst_y = set_hi16(self.dst_y, data),
            0x213C => self.src_x = set_coord_lo(self.src_x, data),
            0x213D => self.src_x = set_coord_hi(self.src_x, data, 14),
            0x213E => self.src_y = set_coord_lo(self.src_y, data),
            0x213F => self.src_y = set_coord_hi(self.src_y, data, 14),
            0x2140 => self.size_x = set_coord_lo(self.size_x, data),
            0x2141 => self.size_x = set_coord_hi(self.size_x, data, 13),
            0x2142 => {
                self.size_y = ((self.size_y as u16 & 0x0F00) | data as u16) as i16;
                self.sv_size_y = (self.sv_size_y & 0xFF00) | data as u16;
            }
            0x2143 => {
                self.size_y = ((self.size_y as u16 & 0x00FF) | ((data as u16 & 0x0F) << 8)) as i16;
                self.sv_size_y = (self.sv_size_y & 0x00FF) | (data as u16) << 8;
            }
            0x2144..=0x2147 => self.style = set_byte32(self.style, port - GER_STYLE, data),
            0x2148 => self.src_x_clip = set_lo16(self.src_x_clip, data),
            0x2149 => self.src_x_clip = set_hi16(self.src_x_clip, data),
            0x214A => self.src_y_clip = set_lo16(self.src_y_clip, data),
            0x214B => self.src_y_clip = set_hi16(self.src_y_clip, data),
            0x214C => self.dst_x_clip = set_lo16(self.dst_x_clip, data),
            0x214D => self.dst_x_clip = set_hi16(self.dst_x_clip, data),
            0x214E => self.dst_y_clip = set_lo16(self.dst_y_clip, data),
            0x214F => self.dst_y_clip = set_hi16(self.dst_y_clip, data),
            0x2168..=0x216B => self.color_key = set_byte32(self.color_key, port - GER_COLOR_KEY, data),
            GER_PATTERN..=GER_PATTERN_END => {
                self.pattern[(port & 0x7F) as usize] = data;
                // The 32bpp pattern buffer only loads sequentially.
                self.pattern_32bpp[self.pattern_32_idx as usize] = data;
                self.pattern_32_idx = self.pattern_32_idx.wrapping_add(1);
            }
            _ => {}
        }
        RegisterEffect::None
    }

    /// Read one byte of the register file. Undecoded addresses, the status
    /// register and the command register read as zero.
    pub fn read_u8(&self, port: u16) -> u8 {
        match port {
            GER_STATUS => 0,
            GER_MODE_LO => self.ger22 as u8,
            GER_MODE_HI => (self.ger22 >> 8) as u8,
            GER_ROP => self.rop,
            0x2128..=0x212B => byte32(self.flags, port - GER_FLAGS),
            0x212C..=0x212F => byte32(self.fg_color, port - GER_FG_COLOR),
            0x2178..=0x217B => byte32(self.fg_color, port - GER_FG_COLOR_ALT),
            0x2130..=0x2133 => byte32(self.bg_color, port - GER_BG_COLOR),
            0x217C..=0x217F => byte32(self.bg_color, port - GER_BG_COLOR_ALT),
            0x2134 => self.pattern_loc as u8,
            0x2135 => (self.pattern_loc >> 8) as u8,
            0x2138 | 0x2139 => byte16(self.dst_x, port & 1 != 0),
            0x213A | 0x213B => byte16(self.dst_y, port & 1 != 0),
            0x213C | 0x213D => byte16(self.src_x, port & 1 != 0),
            0x213E | 0x213F => byte16(self.src_y, port & 1 != 0),
            0x2140 | 0x2141 => byte16(self.size_x, port & 1 != 0),
            0x2142 | 0x2143 => byte16(self.size_y, port & 1 != 0),
            0x2144..=0x2147 => byte32(self.style, port - GER_STYLE),
            0x2148 | 0x2149 => byte16(self.src_x_clip, port & 1 != 0),
            0x214A | 0x214B => byte16(self.src_y_clip, port & 1 != 0),
            0x214C | 0x214D => byte16(self.dst_x_clip, port & 1 != 0),
            0x214E | 0x214F => byte16(self.dst_y_clip, port & 1 != 0),
            0x2168..=0x216B => byte32(self.color_key, port - GER_COLOR_KEY),
            GER_PATTERN..=GER_PATTERN_END => self.pattern[(port & 0x7F) as usize],
            _ => 0,
        }
    }
}
