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

    devices::tgui::ext_write.rs

    Extended memory access modes of the 9400CXi, selected by GDC 0x10.
    Latch copy reads fill a 16-byte latch that later writes can scatter
    back under a bit mask. Mono expansion turns each written bit into a
    foreground or background pixel. Both operate on the doubleword-
    interleaved layout the chip uses in its extended modes.

*/

use crate::devices::tgui::{
    vga_regs::{
        ExtWriteControl,
        GDC_EXT_BG_HI,
        GDC_EXT_BG_LO,
        GDC_EXT_FG_HI,
        GDC_EXT_FG_LO,
        GDC_EXT_PIXEL_MASK_HI,
        GDC_EXT_PIXEL_MASK_LO,
        GDC_EXT_WRITE_CONTROL,
    },
    vram::Vram,
};

pub const COPY_LATCH_SIZE: usize = 16;

/// Map a linear address onto the doubleword-interleaved layout.
#[inline]
pub fn dword_remap(address: u32) -> u32 {
    ((address << 2) & 0x3FFF0) | ((address >> 14) & 0xC) | (address & !0x3FFFC)
}

/// Successive bytes of one expansion run land 1 byte apart inside a
/// doubleword and 13 bytes apart across doublewords.
#[inline]
fn step(i: usize) -> usize {
    if i & 3 == 3 {
        0x0D
    }
    else {
        0x01
    }
}

#[derive(Default)]
pub struct ExtendedAccess {
    copy_latch: [u8; COPY_LATCH_SIZE],
}

impl ExtendedAccess {
    pub fn copy_latch(&self) -> &[u8; COPY_LATCH_SIZE] {
        &self.copy_latch
    }

    /// Read through the latch-copy path. `address` has already been
    /// translated through the bank registers.
    pub fn read(&mut self, vram: &Vram, address: u32, decode_mask: u32) -> u8 {
        let address = address & decode_mask;
        if address as usize >= vram.len() {
            return 0xFF;
        }
        let mut address = dword_remap(address & vram.mask() as u32 & !0x0F) as usize;
        for (i, latch) in self.copy_latch.iter_mut().enumerate() {
            *latch = vram.read_u8(address);
            address += step(i);
        }
        vram.read_u8(address)
    }

    pub fn write_u8(&mut self, vram: &mut Vram, gdc: &[u8], address: u32, decode_mask: u32, data: u8) {
        let ctrl = ExtWriteControl::from_bytes([gdc[GDC_EXT_WRITE_CONTROL as usize]]);
        let align = if ctrl.latch_copy() { !0x0F } else { !0x07 };
        let mask = gdc[GDC_EXT_PIXEL_MASK_HI as usize] as u16;
        self.expand(vram, gdc, address, decode_mask, align, (data as u16) << 8, mask << 8, 8);
    }

    /// Word writes carry 16 pixels. The value arrives little-endian and is
    /// expanded most significant bit first after swapping.
    pub fn write_u16(&mut self, vram: &mut Vram, gdc: &[u8], address: u32, decode_mask: u32, data: u16) {
        let mask = gdc[GDC_EXT_PIXEL_MASK_LO as usize] as u16 | ((gdc[GDC_EXT_PIXEL_MASK_HI as usize] as u16) << 8);
        self.expand(vram, gdc, address, decode_mask, !0x0F, data.swap_bytes(), mask, 16);
    }

    /// Doubleword writes only use their low word.
    pub fn write_u32(&mut self, vram: &mut Vram, gdc: &[u8], address: u32, decode_mask: u32, data: u32) {
        self.write_u16(vram, gdc, address, decode_mask, data as u16);
    }

    #[allow(clippy::too_many_arguments)]
    fn expand(
        &self,
        vram: &mut Vram,
        gdc: &[u8],
        address: u32,
        decode_mask: u32,
        align: u32,
        bits: u16,
        pixel_mask: u16,
        count: usize,
    ) {
        let address = address & decode_mask;
        if address as usize >= vram.len() {
            return;
        }
        let vram_mask = vram.mask();
        let mut address = dword_remap(address & vram_mask as u32 & align) as usize;
        vram.mark_dirty(address);

        let ctrl = ExtWriteControl::from_bytes([gdc[GDC_EXT_WRITE_CONTROL as usize]]);
        let fg = [gdc[GDC_EXT_FG_LO as usize], gdc[GDC_EXT_FG_HI as usize]];
        let bg = [gdc[GDC_EXT_BG_LO as usize], gdc[GDC_EXT_BG_HI as usize]];
        let colour = |i: usize| if ctrl.word_pixels() { i & 1 } else { 0 };

        for i in 0..count {
            let bit = 0x8000u16 >> i;
            let set = bits & bit != 0;
            let value = if ctrl.latch_copy() {
                set.then(|| self.copy_latch[i])
            }
            else if ctrl.mono_transparent() {
                set.then(|| fg[colour(i)])
            }
            else if pixel_mask & bit != 0 {
                Some(if set { fg[colour(i)] } else { bg[colour(i)] })
            }
            else {
                None
            };

            if let Some(value) = value {
                vram.store_u8(address, value);
            }
            address = (address + step(i)) & vram_mask;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gdc(ctrl: u8) -> Vec<u8> {
        let mut gdc = vec![0u8; 256];
        gdc[GDC_EXT_WRITE_CONTROL as usize] = ctrl;
        gdc[GDC_EXT_FG_LO as usize] = 0xF0;
        gdc[GDC_EXT_FG_HI as usize] = 0xF1;
        gdc[GDC_EXT_BG_LO as usize] = 0xB0;
        gdc[GDC_EXT_BG_HI as usize] = 0xB1;
        gdc
    }

    /// Addresses touched by an 8-pixel run starting at remapped address 0.
    const RUN: [usize; 8] = [0, 1, 2, 3, 16, 17, 18, 19];

    #[test]
    fn test_dword_remap() {
        assert_eq!(dword_remap(0), 0);
        assert_eq!(dword_remap(0x4), 0x10);
        assert_eq!(dword_remap(0x4000), 0x1_0000);
        assert_eq!(dword_remap(0x1_0000), 0x4);
        assert_eq!(dword_remap(0x4_0000), 0x4_0000);
    }

    #[test]
    fn test_transparent_expansion() {
        let mut vram = Vram::new(1 << 20);
        let mut ext = ExtendedAccess::default();
        ext.write_u8(&mut vram, &gdc(0x06), 0x3, 0x7F_FFFF, 0b1010_0001);
        let written: Vec<u8> = RUN.iter().map(|a| vram.read_u8(*a)).collect();
        assert_eq!(written, vec![0xF0, 0, 0xF0, 0, 0, 0, 0, 0xF0]);
    }

    #[test]
    fn test_word_pixel_colours() {
        let mut vram = Vram::new(1 << 20);
        let mut ext = ExtendedAccess::default();
        ext.write_u8(&mut vram, &gdc(0x07), 0, 0x7F_FFFF, 0xFF);
        let written: Vec<u8> = RUN.iter().map(|a| vram.read_u8(*a)).collect();
        assert_eq!(written, vec![0xF0, 0xF1, 0xF0, 0xF1, 0xF0, 0xF1, 0xF0, 0xF1]);
    }

    #[test]
    fn test_opaque_expansion_honours_mask() {
        let mut vram = Vram::new(1 << 20);
        let mut ext = ExtendedAccess::default();
        let mut regs = gdc(0x02);
        regs[GDC_EXT_PIXEL_MASK_HI as usize] = 0xF0;
        vram.write_u8(16, 0x55);
        ext.write_u8(&mut vram, &regs, 0, 0x7F_FFFF, 0b1100_1100);
        let written: Vec<u8> = RUN.iter().map(|a| vram.read_u8(*a)).collect();
        assert_eq!(written, vec![0xF0, 0xF0, 0xB0, 0xB0, 0x55, 0, 0, 0]);
    }

    #[test]
    fn test_latch_copy() {
        let mut vram = Vram::new(1 << 20);
        for i in 0..=64 {
            vram.write_u8(i, 0x80 + i as u8);
        }
        let mut ext = ExtendedAccess::default();
        // The returned byte is the one following the last latched doubleword.
        assert_eq!(ext.read(&vram, 0x5, 0x7F_FFFF), 0xC0);
        assert_eq!(&ext.copy_latch()[0..5], &[0x80, 0x81, 0x82, 0x83, 0x90]);

        // Copy the first and last latched bytes into a page at 0x8000.
        ext.write_u16(&mut vram, &gdc(0x08), 0x2000, 0x7F_FFFF, 0x0180);
        let base = dword_remap(0x2000) as usize;
        assert_eq!(base, 0x8000);
        assert_eq!(vram.read_u8(base), 0x80);
        assert_eq!(vram.read_u8(base + 1), 0);
        assert_eq!(vram.read_u8(base + 50), 0);
        assert_eq!(vram.read_u8(base + 51), 0xB3);
    }

    #[test]
    fn test_out_of_range_ignored() {
        let mut vram = Vram::new(1 << 20);
        let mut ext = ExtendedAccess::default();
        assert_eq!(ext.read(&vram, 0x10_0000, 0x7F_FFFF), 0xFF);
        ext.write_u8(&mut vram, &gdc(0x06), 0x10_0000, 0x7F_FFFF, 0xFF);
        assert_eq!(vram.dirty_pages().count(), 0);
    }
}
