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

    devices::tgui::accel::pattern.rs

    Decodes the raw pattern registers into an 8x8 grid of pixel values at the
    start of a command. The grid is fixed for the life of the command.

*/

use super::regs::{AccelFlags, AccelRegisters};
use crate::devices::tgui::vram::PixelSize;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PatternSource {
    Solid,
    Mono,
    Native(PixelSize),
}

#[derive(Clone, Debug)]
pub struct Pattern {
    cells: [u32; 64],
    mask: u32,
}

impl Pattern {
    /// Decode by precedence: solid fill, then mono, then native pixels at
    /// the engine depth.
    pub fn decode(regs: &AccelRegisters, flags: AccelFlags, size: PixelSize) -> Pattern {
        let mut cells = [0u32; 64];
        match Pattern::source(flags, size) {
            PatternSource::Solid => {
                cells.fill(regs.fg_color);
            }
            PatternSource::Mono => {
                // Bit 7 of each row byte is the leftmost pixel.
                for y in 0..8 {
                    for x in 0..8 {
                        cells[y * 8 + (7 - x)] = if regs.pattern[y] & (1 << x) != 0 {
                            regs.fg_color
                        }
                        else {
                            regs.bg_color
                        };
                    }
                }
            }
            PatternSource::Native(PixelSize::Byte) => {
                for (cell, byte) in cells.iter_mut().zip(regs.pattern.iter()) {
                    *cell = *byte as u32;
                }
            }
            PatternSource::Native(PixelSize::Word) => {
                for (i, cell) in cells.iter_mut().enumerate() {
                    *cell = u16::from_le_bytes([regs.pattern[i * 2], regs.pattern[i * 2 + 1]]) as u32;
                }
            }
            PatternSource::Native(PixelSize::Dword) => {
                for (i, cell) in cells.iter_mut().enumerate() {
                    let b = &regs.pattern_32bpp[i * 4..i * 4 + 4];
                    *cell = u32::from_le_bytes([b[0], b[1], b[2], b[3]]);
                }
            }
        }

        Pattern {
            cells,
            mask: size.mask(),
        }
    }

    pub fn source(flags: AccelFlags, size: PixelSize) -> PatternSource {
        if flags.solid_fill() {
            PatternSource::Solid
        }
        else if flags.pattern_mono() {
            PatternSource::Mono
        }
        else {
            PatternSource::Native(size)
        }
    }

    /// Pattern pixel for a destination position, masked to the pixel size.
    #[inline]
    pub fn pixel(&self, pat_x: i32, pat_y: i32) -> u32 {
        self.cells[(((pat_y & 7) * 8) + (pat_x & 7)) as usize] & self.mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(raw: u32) -> AccelFlags {
        AccelFlags::from_u32(raw)
    }

    #[test]
    fn test_solid_fill_takes_precedence() {
        let mut regs = AccelRegisters::default();
        regs.fg_color = 0x1234_5678;
        regs.pattern[0] = 0xFF;
        let pattern = Pattern::decode(&regs, flags(0x4020), PixelSize::Word);
        assert_eq!(pattern.pixel(3, 5), 0x5678);
        assert_eq!(Pattern::source(flags(0x4020), PixelSize::Byte), PatternSource::Solid);
    }

    #[test]
    fn test_mono_pattern_msb_first() {
        let mut regs = AccelRegisters::default();
        regs.fg_color = 0xEE;
        regs.bg_color = 0x11;
        regs.pattern[0] = 0b1000_0001;
        regs.pattern[2] = 0b0100_0000;
        let pattern = Pattern::decode(&regs, flags(0x20), PixelSize::Byte);
        assert_eq!(pattern.pixel(0, 0), 0xEE);
        assert_eq!(pattern.pixel(1, 0), 0x11);
        assert_eq!(pattern.pixel(7, 0), 0xEE);
        assert_eq!(pattern.pixel(1, 2), 0xEE);
        // Coordinates wrap every eight pixels, negative ones included.
        assert_eq!(pattern.pixel(-7, 10), 0xEE);
    }

    #[test]
    fn test_native_patterns() {
        let mut regs = AccelRegisters::default();
        for i in 0..128 {
            regs.pattern[i] = i as u8;
        }
        for i in 0..256 {
            regs.pattern_32bpp[i] = (255 - i) as u8;
        }
        let p8 = Pattern::decode(&regs, flags(0), PixelSize::Byte);
        assert_eq!(p8.pixel(3, 1), 11);
        let p16 = Pattern::decode(&regs, flags(0), PixelSize::Word);
        assert_eq!(p16.pixel(1, 1), u16::from_le_bytes([18, 19]) as u32);
        let p32 = Pattern::decode(&regs, flags(0), PixelSize::Dword);
        assert_eq!(p32.pixel(7, 7), u32::from_le_bytes([3, 2, 1, 0]));
    }

    #[test]
    fn test_decode_is_a_snapshot() {
        let mut regs = AccelRegisters::default();
        regs.pattern[9] = 0x42;
        let pattern = Pattern::decode(&regs, flags(0), PixelSize::Byte);
        regs.pattern[9] = 0x00;
        assert_eq!(pattern.pixel(1, 1), 0x42);
        assert_eq!(Pattern::decode(&regs, flags(0), PixelSize::Byte).pixel(1, 1), 0x00);
    }
}
