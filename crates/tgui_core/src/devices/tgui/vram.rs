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

    devices::tgui::vram.rs

    Video memory store with a per-page dirty map. The accelerator addresses
    memory in pixel units of 1, 2 or 4 bytes; the dirty map always tracks
    4 KB byte pages.

*/

pub const DIRTY_PAGE_SHIFT: usize = 12;

/// Pixel unit the accelerator reads and writes.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum PixelSize {
    #[default]
    Byte,
    Word,
    Dword,
}

impl PixelSize {
    /// Pixel size used by the drawing engine for a display depth. Depths with no
    /// accelerator equivalent return None and leave the current size in place.
    pub fn from_display_bpp(bpp: u32) -> Option<PixelSize> {
        match bpp {
            8 | 24 => Some(PixelSize::Byte),
            15 | 16 => Some(PixelSize::Word),
            32 => Some(PixelSize::Dword),
            _ => None,
        }
    }

    #[inline]
    pub fn shift(&self) -> usize {
        match self {
            PixelSize::Byte => 0,
            PixelSize::Word => 1,
            PixelSize::Dword => 2,
        }
    }

    /// Value of the engine's internal depth code (0, 1 or 3).
    pub fn code(&self) -> u8 {
        match self {
            PixelSize::Byte => 0,
            PixelSize::Word => 1,
            PixelSize::Dword => 3,
        }
    }

    #[inline]
    pub fn mask(&self) -> u32 {
        match self {
            PixelSize::Byte => 0xFF,
            PixelSize::Word => 0xFFFF,
            PixelSize::Dword => 0xFFFF_FFFF,
        }
    }
}

pub struct Vram {
    data: Vec<u8>,
    mask: usize,
    dirty: Vec<bool>,
}

impl Vram {
    /// Create a zeroed store. `size` must be a power of two of at least one page.
    pub fn new(size: usize) -> Self {
        debug_assert!(size.is_power_of_two() && size >= 1 << DIRTY_PAGE_SHIFT);
        Self {
            data: vec![0; size],
            mask: size - 1,
            dirty: vec![false; size >> DIRTY_PAGE_SHIFT],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn mask(&self) -> usize {
        self.mask
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Direct access for hosts that load or inspect memory. Writes through this
    /// slice do not mark pages dirty.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    #[inline]
    pub fn read_u8(&self, address: usize) -> u8 {
        self.data[address & self.mask]
    }

    #[inline]
    pub fn write_u8(&mut self, address: usize, data: u8) {
        let address = address & self.mask;
        self.data[address] = data;
        self.dirty[address >> DIRTY_PAGE_SHIFT] = true;
    }

    /// Store a byte without touching the dirty map. Callers mark the page themselves.
    #[inline]
    pub(crate) fn store_u8(&mut self, address: usize, data: u8) {
        self.data[address & self.mask] = data;
    }

    /// Read the pixel at `index`, counted in units of `size`. The index wraps at
    /// the end of memory; negative indices wrap the same way.
    #[inline]
    pub fn read_pixel(&self, size: PixelSize, index: i32) -> u32 {
        let shift = size.shift();
        let address = ((index as usize) & (self.mask >> shift)) << shift;
        match size {
            PixelSize::Byte => self.data[address] as u32,
            PixelSize::Word => u16::from_le_bytes([self.data[address], self.data[address + 1]]) as u32,
            PixelSize::Dword => u32::from_le_bytes([
                self.data[address],
                self.data[address + 1],
                self.data[address + 2],
                self.data[address + 3],
            ]),
        }
    }

    #[inline]
    pub fn write_pixel(&mut self, size: PixelSize, index: i32, value: u32) {
        let shift = size.shift();
        let element = (index as usize) & (self.mask >> shift);
        let address = element << shift;
        match size {
            PixelSize::Byte => self.data[address] = value as u8,
            PixelSize::Word => self.data[address..address + 2].copy_from_slice(&(value as u16).to_le_bytes()),
            PixelSize::Dword => self.data[address..address + 4].copy_from_slice(&value.to_le_bytes()),
        }
        self.dirty[element >> (DIRTY_PAGE_SHIFT - shift)] = true;
    }

    #[inline]
    pub fn mark_dirty(&mut self, address: usize) {
        self.dirty[(address & self.mask) >> DIRTY_PAGE_SHIFT] = true;
    }

    pub fn mark_all_dirty(&mut self) {
        self.dirty.iter_mut().for_each(|page| *page = true);
    }

    pub fn is_dirty(&self, page: usize) -> bool {
        self.dirty.get(page).copied().unwrap_or(false)
    }

    /// Indices of pages written since the last `clear_dirty`.
    pub fn dirty_pages(&self) -> impl Iterator<Item = usize> + '_ {
        self.dirty
            .iter()
            .enumerate()
            .filter_map(|(page, dirty)| if *dirty { Some(page) } else { None })
    }

    pub fn clear_dirty(&mut self) {
        self.dirty.iter_mut().for_each(|page| *page = false);
    }
}
