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

    devices::tgui::cursor.rs

    Hardware cursor of the 9440 and later. The cursor pattern is stored in
    video memory as pairs of big-endian AND and XOR doublewords, one pair per
    32 pixels.

*/

use crate::devices::tgui::{
    vga_regs::{CursorControl, CRTC_CURSOR_X_LO},
    vram::Vram,
};

pub const CURSOR_COORD_MASK: i32 = 0x7FF;
pub const CURSOR_OFFSET_MASK: i32 = 0x3F;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct HwCursor {
    pub enabled: bool,
    pub x: i32,
    pub y: i32,
    /// Hotspot offsets into the pattern.
    pub xoff: i32,
    pub yoff: i32,
    /// Byte address of the first pattern row to display.
    pub addr: u32,
    pub size: u32,
    pub x11_mode: bool,
}

impl HwCursor {
    /// Reload position, offsets and pattern address from CRTC 0x40-0x47.
    /// `x_scale` doubles the horizontal position in packed 8-bit modes.
    pub fn update_position(&mut self, crtc: &[u8], x_scale: u32) {
        let reg = |i: u8| crtc[(CRTC_CURSOR_X_LO + i) as usize] as i32;
        self.x = ((reg(0) | reg(1) << 8) & CURSOR_COORD_MASK) * x_scale as i32;
        self.y = (reg(2) | reg(3) << 8) & CURSOR_COORD_MASK;
        self.xoff = reg(6) & CURSOR_OFFSET_MASK;
        self.yoff = reg(7) & CURSOR_OFFSET_MASK;
        self.addr = ((reg(4) as u32) << 10) | (((reg(5) & 0x0F) as u32) << 18) | (self.yoff as u32 * 8);
    }

    pub fn update_control(&mut self, control: CursorControl) {
        self.enabled = control.enable();
        self.size = if control.size_64() { 64 } else { 32 };
        self.x11_mode = control.x11_mode();
    }

    /// Snapshot taken at the start of a frame; drawing advances the copy.
    pub fn latch(&self) -> CursorLatch {
        CursorLatch {
            cursor: *self,
            addr: self.addr,
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct CursorLatch {
    cursor: HwCursor,
    addr: u32,
}

impl CursorLatch {
    pub fn addr(&self) -> u32 {
        self.addr
    }

    /// Render one cursor row into `line`, an 0x00RRGGBB scanline buffer whose
    /// visible area starts at `x_add`. On interlaced displays `odd_field`
    /// selects which of each pair of pattern rows is shown.
    pub fn draw_line(&mut self, vram: &Vram, line: &mut [u32], x_add: usize, interlace: bool, odd_field: bool) {
        let pitch = if self.cursor.size == 64 { 16 } else { 8 };
        if interlace && odd_field {
            self.addr += pitch;
        }

        let word = |a: u32| {
            u32::from_be_bytes([
                vram.read_u8(a as usize),
                vram.read_u8(a as usize + 1),
                vram.read_u8(a as usize + 2),
                vram.read_u8(a as usize + 3),
            ])
        };
        let mut and_mask = word(self.addr);
        let mut xor_mask = word(self.addr + 4);

        let mut offset = self.cursor.x - self.cursor.xoff;
        for _ in 0..32 {
            if offset >= self.cursor.x {
                let and_bit = and_mask & 0x8000_0000 != 0;
                let xor_bit = xor_mask & 0x8000_0000 != 0;
                if let Some(pixel) = line.get_mut(x_add + offset as usize) {
                    if self.cursor.x11_mode {
                        if and_bit {
                            *pixel = if xor_bit { 0xFFFFFF } else { 0 };
                        }
                    }
                    else if !and_bit {
                        *pixel = if xor_bit { 0xFFFFFF } else { 0 };
                    }
                    else if xor_bit {
                        *pixel ^= 0xFFFFFF;
                    }
                }
            }
            offset += 1;
            and_mask <<= 1;
            xor_mask <<= 1;
        }

        self.addr += pitch;
        if interlace && !odd_field {
            self.addr += pitch;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crtc_with(values: &[(usize, u8)]) -> Vec<u8> {
        let mut crtc = vec![0u8; 256];
        for (i, v) in values {
            crtc[*i] = *v;
        }
        crtc
    }

    #[test]
    fn test_position_and_address() {
        let crtc = crtc_with(&[
            (0x40, 0x34),
            (0x41, 0xF9),
            (0x42, 0x10),
            (0x43, 0x01),
            (0x44, 0x03),
            (0x45, 0x12),
            (0x46, 0x45),
            (0x47, 0x02),
        ]);
        let mut cursor = HwCursor::default();
        cursor.update_position(&crtc, 1);
        assert_eq!(cursor.x, 0x134);
        assert_eq!(cursor.y, 0x110);
        assert_eq!(cursor.xoff, 0x05);
        assert_eq!(cursor.yoff, 0x02);
        assert_eq!(cursor.addr, (0x03 << 10) | (0x02 << 18) | 16);

        cursor.update_position(&crtc, 2);
        assert_eq!(cursor.x, 0x268);
    }

    #[test]
    fn test_control() {
        let mut cursor = HwCursor::default();
        cursor.update_control(CursorControl::from_bytes([0x81]));
        assert!(cursor.enabled && !cursor.x11_mode);
        assert_eq!(cursor.size, 64);
        cursor.update_control(CursorControl::from_bytes([0x40]));
        assert!(!cursor.enabled && cursor.x11_mode);
        assert_eq!(cursor.size, 32);
    }

    fn pattern_vram(and_mask: u32, xor_mask: u32) -> Vram {
        let mut vram = Vram::new(1 << 20);
        for (i, b) in and_mask.to_be_bytes().iter().chain(xor_mask.to_be_bytes().iter()).enumerate() {
            vram.write_u8(0x400 + i, *b);
        }
        vram
    }

    #[test]
    fn test_windows_mode_draw() {
        // Pixel 0: colour black, 1: colour white, 2: transparent, 3: invert.
        let vram = pattern_vram(0x3FFF_FFFF, 0x5000_0000);
        let mut cursor = HwCursor {
            x: 10,
            size: 32,
            addr: 0x400,
            ..Default::default()
        };
        cursor.enabled = true;

        let mut line = vec![0x123456u32; 64];
        let mut latch = cursor.latch();
        latch.draw_line(&vram, &mut line, 4, false, false);
        assert_eq!(&line[14..18], &[0x000000, 0xFFFFFF, 0x123456, 0x123456 ^ 0xFFFFFF]);
        assert_eq!(line[13], 0x123456);
        assert_eq!(latch.addr(), 0x408);
    }

    #[test]
    fn test_x11_mode_and_hotspot() {
        let vram = pattern_vram(0xC000_0000, 0x4000_0000);
        let cursor = HwCursor {
            x: 8,
            xoff: 1,
            size: 64,
            addr: 0x400,
            x11_mode: true,
            ..Default::default()
        };
        let mut line = vec![0x777777u32; 64];
        let mut latch = cursor.latch();
        latch.draw_line(&vram, &mut line, 0, false, false);
        // The first pattern column sits left of the hotspot and is clipped.
        assert_eq!(line[7], 0x777777);
        assert_eq!(line[8], 0xFFFFFF);
        assert_eq!(line[9], 0x777777);
        assert_eq!(latch.addr(), 0x410);
    }

    #[test]
    fn test_interlaced_fields() {
        let vram = pattern_vram(0, 0);
        let cursor = HwCursor {
            size: 32,
            addr: 0x400,
            ..Default::default()
        };
        let mut line = vec![0u32; 64];
        let mut even = cursor.latch();
        even.draw_line(&vram, &mut line, 0, true, false);
        assert_eq!(even.addr(), 0x410);
        let mut odd = cursor.latch();
        odd.draw_line(&vram, &mut line, 0, true, true);
        assert_eq!(odd.addr(), 0x410);
    }
}
