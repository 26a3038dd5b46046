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

    devices::tgui::vga_regs.rs

    Storage for the VGA-compatible register banks: miscellaneous output,
    sequencer, graphics controller, CRTC, attribute controller and DAC. The
    chip's extended registers live in the same index spaces; the card decides
    what a write to each index does.

*/

use modular_bitfield::{bitfield, prelude::*};

pub const REGISTER_SPACE: usize = 256;
pub const ATTRIBUTE_REGISTERS: usize = 32;

pub const CRTC_START_ADDRESS_H: u8 = 0x0C;
pub const CRTC_START_ADDRESS_L: u8 = 0x0D;
pub const CRTC_VERTICAL_RETRACE_END: u8 = 0x11;
pub const CRTC_OFFSET: u8 = 0x13;
pub const CRTC_MODULE_TESTING: u8 = 0x1E;
pub const CRTC_LINEAR_ADDRESSING: u8 = 0x21;
pub const CRTC_LINEAR_BASE_EXT: u8 = 0x27;
pub const CRTC_INTERFACE_CONTROL: u8 = 0x29;
pub const CRTC_DISPLAY_CONTROL: u8 = 0x2A;
pub const CRTC_GE_BASE_LO: u8 = 0x34;
pub const CRTC_GE_BASE_HI: u8 = 0x35;
pub const CRTC_APERTURE_CONTROL: u8 = 0x36;
pub const CRTC_I2C: u8 = 0x37;
pub const CRTC_PIXEL_BUS: u8 = 0x38;
pub const CRTC_MMIO_CONTROL: u8 = 0x39;
pub const CRTC_CURSOR_X_LO: u8 = 0x40;
pub const CRTC_CURSOR_PATTERN_OFFSET_Y: u8 = 0x47;
pub const CRTC_CURSOR_CONTROL: u8 = 0x50;

pub const SEQ_CLOCKING_MODE: u8 = 0x01;
pub const SEQ_REVISION: u8 = 0x09;
pub const SEQ_VERSION: u8 = 0x0B;
pub const SEQ_CONFIG_PORT_1: u8 = 0x0C;
pub const SEQ_MODE_CONTROL_2: u8 = 0x0D;
pub const SEQ_MODE_CONTROL_1: u8 = 0x0E;

pub const GDC_MODE: u8 = 0x05;
pub const GDC_MISC: u8 = 0x06;
pub const GDC_READ_BANK: u8 = 0x0E;
pub const GDC_BANK_CONTROL: u8 = 0x0F;
pub const GDC_EXT_WRITE_CONTROL: u8 = 0x10;
pub const GDC_EXT_BG_LO: u8 = 0x11;
pub const GDC_EXT_BG_HI: u8 = 0x12;
pub const GDC_EXT_FG_LO: u8 = 0x14;
pub const GDC_EXT_FG_HI: u8 = 0x15;
pub const GDC_EXT_PIXEL_MASK_HI: u8 = 0x17;
pub const GDC_EXT_PIXEL_MASK_LO: u8 = 0x18;
pub const GDC_POWER_MANAGEMENT: u8 = 0x23;
pub const GDC_MISC_EXT: u8 = 0x2F;

#[allow(non_camel_case_types)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, BitfieldSpecifier)]
pub enum MemoryMap {
    A0000_128k,
    A0000_64K,
    B0000_32K,
    B8000_32K,
}

impl MemoryMap {
    /// Base address, window size and offset mask of the banked window.
    pub fn window(&self) -> (u32, u32, u32) {
        match self {
            MemoryMap::A0000_128k => (0xA0000, 0x20000, 0xFFFF),
            MemoryMap::A0000_64K => (0xA0000, 0x10000, 0xFFFF),
            MemoryMap::B0000_32K => (0xB0000, 0x08000, 0x7FFF),
            MemoryMap::B8000_32K => (0xB8000, 0x08000, 0x7FFF),
        }
    }
}

#[bitfield]
#[derive(Copy, Clone)]
pub struct GMiscellaneousRegister {
    pub graphics_mode: bool,
    pub chain_odd_even: bool,
    pub memory_map: MemoryMap,
    #[skip]
    unused: B4,
}

#[bitfield]
#[derive(Copy, Clone)]
pub struct MiscOutputRegister {
    /// Set: CRTC at 0x3D4, status at 0x3DA. Clear: 0x3B4 and 0x3BA.
    pub io_address_select: bool,
    pub ram_enable: bool,
    pub clock_select: B2,
    #[skip]
    unused: B1,
    pub page_select: bool,
    pub hsync_polarity: bool,
    pub vsync_polarity: bool,
}

/// GDC 0x10 on the 9400CXi.
#[bitfield]
#[derive(Copy, Clone)]
pub struct ExtWriteControl {
    /// Alternate between the low and high colour bytes for 16-bit pixels.
    pub word_pixels: bool,
    pub mono_expansion: bool,
    pub mono_transparent: bool,
    pub latch_copy: bool,
    #[skip]
    unused: B4,
}

/// Placement of the accelerator register aperture.
#[derive(Copy, Clone, Debug, Eq, PartialEq, BitfieldSpecifier)]
pub enum AcceleratorWindow {
    /// No aperture. The MMIO window exposes the registers at 0x2100-0x21FF.
    MmioOnly,
    B4000,
    BC000,
    GeBase,
}

/// CRTC 0x36.
#[bitfield]
#[derive(Copy, Clone)]
pub struct ApertureControl {
    pub accel_window: AcceleratorWindow,
    #[skip]
    unused: B6,
}

/// CRTC 0x50.
#[bitfield]
#[derive(Copy, Clone)]
pub struct CursorControl {
    pub size_64: bool,
    #[skip]
    unused: B5,
    pub x11_mode: bool,
    pub enable: bool,
}

pub struct VgaRegisters {
    pub misc_output: u8,
    pub seq_index: u8,
    pub seq: [u8; REGISTER_SPACE],
    pub gdc_index: u8,
    pub gdc: [u8; REGISTER_SPACE],
    pub crtc_index: u8,
    pub crtc: [u8; REGISTER_SPACE],
    attr_flipflop: bool,
    attr_index: u8,
    pub attr: [u8; ATTRIBUTE_REGISTERS],
    pub dac_mask: u8,
    dac_read_index: u8,
    dac_write_index: u8,
    dac_component: usize,
    dac_read_mode: bool,
    pub palette: [[u8; 3]; 256],
    status_toggle: u8,
}

impl Default for VgaRegisters {
    fn default() -> Self {
        Self {
            misc_output: 0,
            seq_index: 0,
            seq: [0; REGISTER_SPACE],
            gdc_index: 0,
            gdc: [0; REGISTER_SPACE],
            crtc_index: 0,
            crtc: [0; REGISTER_SPACE],
            attr_flipflop: false,
            attr_index: 0,
            attr: [0; ATTRIBUTE_REGISTERS],
            dac_mask: 0xFF,
            dac_read_index: 0,
            dac_write_index: 0,
            dac_component: 0,
            dac_read_mode: false,
            palette: [[0; 3]; 256],
            status_toggle: 0,
        }
    }
}

impl VgaRegisters {
    pub fn misc(&self) -> MiscOutputRegister {
        MiscOutputRegister::from_bytes([self.misc_output])
    }

    /// Whether the CRTC and status ports currently decode at 0x3Dx.
    pub fn color_io(&self) -> bool {
        self.misc().io_address_select()
    }

    pub fn memory_map(&self) -> MemoryMap {
        GMiscellaneousRegister::from_bytes([self.gdc[GDC_MISC as usize]]).memory_map()
    }

    pub fn ext_write_control(&self) -> ExtWriteControl {
        ExtWriteControl::from_bytes([self.gdc[GDC_EXT_WRITE_CONTROL as usize]])
    }

    pub fn accel_window(&self) -> AcceleratorWindow {
        ApertureControl::from_bytes([self.crtc[CRTC_APERTURE_CONTROL as usize]]).accel_window()
    }

    pub fn cursor_control(&self) -> CursorControl {
        CursorControl::from_bytes([self.crtc[CRTC_CURSOR_CONTROL as usize]])
    }

    #[inline]
    pub fn seq_reg(&self) -> u8 {
        self.seq[self.seq_index as usize]
    }

    #[inline]
    pub fn gdc_reg(&self) -> u8 {
        self.gdc[self.gdc_index as usize]
    }

    #[inline]
    pub fn crtc_reg(&self) -> u8 {
        self.crtc[self.crtc_index as usize]
    }

    pub fn read_attribute_address(&self) -> u8 {
        self.attr_index
    }

    pub fn read_attribute_data(&self) -> u8 {
        self.attr[(self.attr_index & 0x1F) as usize]
    }

    /// Port 0x3C0 alternates between index and data on each write.
    pub fn write_attribute(&mut self, data: u8) {
        if self.attr_flipflop {
            self.attr[(self.attr_index & 0x1F) as usize] = data;
        }
        else {
            self.attr_index = data & 0x3F;
        }
        self.attr_flipflop = !self.attr_flipflop;
    }

    /// Reading input status 1 resets the attribute flip-flop. Display enable
    /// and vertical retrace toggle on every read so polling loops finish.
    pub fn read_input_status_1(&mut self) -> u8 {
        self.attr_flipflop = false;
        self.status_toggle ^= 0x09;
        self.status_toggle
    }

    pub fn write_dac_read_index(&mut self, data: u8) {
        self.dac_read_index = data;
        self.dac_component = 0;
        self.dac_read_mode = true;
    }

    pub fn write_dac_write_index(&mut self, data: u8) {
        self.dac_write_index = data;
        self.dac_component = 0;
        self.dac_read_mode = false;
    }

    pub fn read_dac_state(&self) -> u8 {
        if self.dac_read_mode {
            0x03
        }
        else {
            0x00
        }
    }

    pub fn read_dac_write_index(&self) -> u8 {
        self.dac_write_index
    }

    pub fn write_dac_data(&mut self, data: u8) {
        self.palette[self.dac_write_index as usize][self.dac_component] = data & 0x3F;
        self.dac_component += 1;
        if self.dac_component == 3 {
            self.dac_component = 0;
            self.dac_write_index = self.dac_write_index.wrapping_add(1);
        }
    }

    pub fn read_dac_data(&mut self) -> u8 {
        let data = self.palette[self.dac_read_index as usize][self.dac_component];
        self.dac_component += 1;
        if self.dac_component == 3 {
            self.dac_component = 0;
            self.dac_read_index = self.dac_read_index.wrapping_add(1);
        }
        data
    }

    /// Palette entry expanded from 6 to 8 bits per component, as 0x00RRGGBB.
    pub fn palette_rgb(&self, index: u8) -> u32 {
        let [r, g, b] = self.palette[index as usize];
        let expand = |c: u8| ((c << 2) | (c >> 4)) as u32;
        expand(r) << 16 | expand(g) << 8 | expand(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_map_decode() {
        let mut regs = VgaRegisters::default();
        let expect = [
            (MemoryMap::A0000_128k, (0xA0000, 0x20000, 0xFFFF)),
            (MemoryMap::A0000_64K, (0xA0000, 0x10000, 0xFFFF)),
            (MemoryMap::B0000_32K, (0xB0000, 0x8000, 0x7FFF)),
            (MemoryMap::B8000_32K, (0xB8000, 0x8000, 0x7FFF)),
        ];
        for (i, (map, window)) in expect.iter().enumerate() {
            regs.gdc[GDC_MISC as usize] = 0x01 | (i as u8) << 2;
            assert_eq!(regs.memory_map(), *map);
            assert_eq!(regs.memory_map().window(), *window);
        }
    }

    #[test]
    fn test_attribute_flipflop() {
        let mut regs = VgaRegisters::default();
        regs.write_attribute(0x25);
        regs.write_attribute(0x3F);
        assert_eq!(regs.attr[5], 0x3F);
        assert_eq!(regs.read_attribute_address(), 0x25);

        // An index write, then a status read puts the flip-flop back on the index.
        regs.write_attribute(0x10);
        regs.read_input_status_1();
        regs.write_attribute(0x02);
        regs.write_attribute(0x44);
        assert_eq!(regs.attr[2], 0x44);
        assert_eq!(regs.attr[0x10], 0);
    }

    #[test]
    fn test_input_status_toggles() {
        let mut regs = VgaRegisters::default();
        let a = regs.read_input_status_1();
        let b = regs.read_input_status_1();
        assert_eq!(a ^ b, 0x09);
    }

    #[test]
    fn test_dac_auto_increment() {
        let mut regs = VgaRegisters::default();
        regs.write_dac_write_index(0xFF);
        for c in [0x3F, 0x20, 0x01, 0x7F, 0x00, 0x11] {
            regs.write_dac_data(c);
        }
        assert_eq!(regs.palette[0xFF], [0x3F, 0x20, 0x01]);
        assert_eq!(regs.palette[0x00], [0x3F, 0x00, 0x11]);
        assert_eq!(regs.read_dac_write_index(), 0x01);
        assert_eq!(regs.read_dac_state(), 0x00);

        regs.write_dac_read_index(0xFF);
        assert_eq!(regs.read_dac_state(), 0x03);
        let read: Vec<u8> = (0..4).map(|_| regs.read_dac_data()).collect();
        assert_eq!(read, [0x3F, 0x20, 0x01, 0x3F]);
        assert_eq!(regs.palette_rgb(0xFF), 0xFF_82_04);
    }

    #[test]
    fn test_extended_fields() {
        let mut regs = VgaRegisters::default();
        regs.crtc[CRTC_APERTURE_CONTROL as usize] = 0xFE;
        assert_eq!(regs.accel_window(), AcceleratorWindow::BC000);
        regs.crtc[CRTC_CURSOR_CONTROL as usize] = 0xC1;
        let cursor = regs.cursor_control();
        assert!(cursor.enable() && cursor.x11_mode() && cursor.size_64());
        regs.gdc[GDC_EXT_WRITE_CONTROL as usize] = 0x0A;
        let ext = regs.ext_write_control();
        assert!(ext.latch_copy() && ext.mono_expansion());
        assert!(!ext.word_pixels() && !ext.mono_transparent());
        regs.misc_output = 0x01;
        assert!(regs.color_io());
    }
}
