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

    devices::tgui::mmio.rs

    Implementation of the MemoryMappedDevice interface trait for the TGUI
    card. An access is routed to whichever aperture decodes it: the MMIO
    window, the accelerator register aperture, the linear framebuffer, the
    banked VGA window or the option ROM.

*/

use super::*;
use crate::bus::{MemRangeDescriptor, MemoryMappedDevice, OPEN_BUS_BYTE};
use crate::devices::tgui::vga_regs::{AcceleratorWindow, CRTC_LINEAR_ADDRESSING};

/// Accelerator registers appear at 0x2100 + the low byte of the address.
const ACCEL_REGISTER_BASE: u16 = 0x2100;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Target {
    Mmio(u32),
    Accel(u32),
    Linear(u32),
    Banked(u32),
    Rom(u32),
}

impl<H: TguiHost> TguiCard<H> {
    fn decode(&self, address: u32) -> Option<Target> {
        let map = &self.apertures;
        if let Some(a) = map.mmio.filter(|a| a.contains(address)) {
            return Some(Target::Mmio(address - a.base));
        }
        if map.accel.is_some_and(|a| a.contains(address)) {
            return Some(Target::Accel(address));
        }
        if let Some(a) = map.linear.filter(|a| a.contains(address)) {
            return Some(Target::Linear(address - a.base));
        }
        if let Some(a) = map.banked.filter(|a| a.contains(address)) {
            return Some(Target::Banked(address - a.base));
        }
        if let Some(a) = map.rom.filter(|a| a.contains(address)) {
            return Some(Target::Rom(address - a.base));
        }
        None
    }

    /// The aperture in modes 1 and 2 only answers in its last 256 bytes.
    fn accel_aperture_register(&self, address: u32) -> Option<u16> {
        let page = address & !0xFF;
        let decoded = match self.regs.accel_window() {
            AcceleratorWindow::B4000 => page == 0xB7F00,
            AcceleratorWindow::BC000 => page == 0xBFF00,
            _ => true,
        };
        decoded.then(|| ACCEL_REGISTER_BASE + (address & 0xFF) as u16)
    }

    fn accel_aperture_read(&self, address: u32) -> u8 {
        match self.accel_aperture_register(address) {
            Some(port) => self.accel.read_u8(port),
            None => OPEN_BUS_BYTE,
        }
    }

    fn accel_aperture_write(&mut self, address: u32, data: u8) {
        if let Some(port) = self.accel_aperture_register(address) {
            let ctx = self.engine_context();
            self.accel.write_u8(port, data, &mut self.vram, ctx);
        }
    }

    fn accel_aperture_write_u32(&mut self, address: u32, data: u32) {
        if address & 0xFF == (accel::regs::GER_COMMAND & 0xFF) as u32 {
            if let Some(port) = self.accel_aperture_register(address) {
                let ctx = self.engine_context();
                self.accel.write_u32(port, data, &mut self.vram, ctx);
            }
            return;
        }
        for (i, byte) in data.to_le_bytes().iter().enumerate() {
            self.accel_aperture_write(address + i as u32, *byte);
        }
    }

    /// Where an MMIO window offset lands.
    fn mmio_route(&self, offset: u32) -> MmioRoute {
        let offset = offset & 0xFFFF;
        let window = self.regs.accel_window();
        if window == AcceleratorWindow::MmioOnly && (0x2100..=0x21FF).contains(&offset) {
            MmioRoute::Registers(offset as u16)
        }
        else if window != AcceleratorWindow::MmioOnly && offset <= 0xFF {
            MmioRoute::Aperture(offset)
        }
        else {
            MmioRoute::Port(offset as u16)
        }
    }

    fn mmio_window_read(&mut self, offset: u32) -> u8 {
        match self.mmio_route(offset) {
            MmioRoute::Registers(port) => self.accel.read_u8(port),
            MmioRoute::Aperture(address) => self.accel_aperture_read(address),
            MmioRoute::Port(port) => self.vga_in(port),
        }
    }

    fn mmio_window_write(&mut self, offset: u32, data: u8) {
        match self.mmio_route(offset) {
            MmioRoute::Registers(port) => {
                let ctx = self.engine_context();
                self.accel.write_u8(port, data, &mut self.vram, ctx);
            }
            MmioRoute::Aperture(address) => self.accel_aperture_write(address, data),
            MmioRoute::Port(port) => self.vga_out(port, data),
        }
    }

    fn mmio_window_write_u32(&mut self, offset: u32, data: u32) {
        match self.mmio_route(offset) {
            MmioRoute::Registers(port) => {
                let ctx = self.engine_context();
                self.accel.write_u32(port, data, &mut self.vram, ctx);
            }
            MmioRoute::Aperture(address) => self.accel_aperture_write_u32(address, data),
            MmioRoute::Port(_) => {
                for (i, byte) in data.to_le_bytes().iter().enumerate() {
                    self.mmio_window_write(offset + i as u32, *byte);
                }
            }
        }
    }

    /// Linear aperture writes source a waiting CPU blit only while linear
    /// addressing is enabled. Otherwise they reach VRAM as usual.
    fn feeds_blitter(&self) -> bool {
        self.accel.awaiting_cpu_data() && self.regs.crtc[CRTC_LINEAR_ADDRESSING as usize] & 0x20 != 0
    }

    fn linear_read(&mut self, offset: u32) -> u8 {
        if self.apertures.handlers.ext_read {
            return self.ext.read(&self.vram, offset, self.decode_mask);
        }
        let address = offset & self.decode_mask;
        if address as usize >= self.vram.len() {
            return OPEN_BUS_BYTE;
        }
        self.vram.read_u8(address as usize)
    }

    fn linear_write(&mut self, offset: u32, data: u8) {
        if self.apertures.handlers.ext_write {
            self.ext.write_u8(&mut self.vram, &self.regs.gdc, offset, self.decode_mask, data);
            return;
        }
        let address = offset & self.decode_mask;
        if (address as usize) < self.vram.len() {
            self.vram.write_u8(address as usize, data);
        }
    }

    #[inline]
    fn banked_read_address(&self, offset: u32) -> u32 {
        (offset & self.apertures.banked_mask) + self.read_bank
    }

    #[inline]
    fn banked_write_address(&self, offset: u32) -> u32 {
        (offset & self.apertures.banked_mask) + self.write_bank
    }

    fn banked_read(&mut self, offset: u32) -> u8 {
        let address = self.banked_read_address(offset);
        if self.apertures.handlers.ext_read {
            return self.ext.read(&self.vram, address, self.decode_mask);
        }
        self.vram.read_u8(address as usize)
    }

    fn banked_write(&mut self, offset: u32, data: u8) {
        let address = self.banked_write_address(offset);
        if self.apertures.handlers.ext_write {
            self.ext.write_u8(&mut self.vram, &self.regs.gdc, address, self.decode_mask, data);
            return;
        }
        self.vram.write_u8(address as usize, data);
    }

    fn rom_read(&self, offset: u32) -> u8 {
        self.rom
            .as_ref()
            .and_then(|image| image.get((offset & (ROM_SIZE - 1)) as usize))
            .copied()
            .unwrap_or(OPEN_BUS_BYTE)
    }

    fn read_byte(&mut self, address: u32) -> u8 {
        match self.decode(address) {
            Some(Target::Mmio(offset)) => self.mmio_window_read(offset),
            Some(Target::Accel(address)) => self.accel_aperture_read(address),
            Some(Target::Linear(offset)) => self.linear_read(offset),
            Some(Target::Banked(offset)) => self.banked_read(offset),
            Some(Target::Rom(offset)) => self.rom_read(offset),
            None => OPEN_BUS_BYTE,
        }
    }

    fn write_byte(&mut self, address: u32, data: u8) {
        match self.decode(address) {
            Some(Target::Mmio(offset)) => self.mmio_window_write(offset, data),
            Some(Target::Accel(address)) => self.accel_aperture_write(address, data),
            Some(Target::Linear(offset)) => {
                if self.feeds_blitter() {
                    self.accel.feed_cpu_data(&mut self.vram, 8, (data as u32) << 24);
                }
                else {
                    self.linear_write(offset, data);
                }
            }
            Some(Target::Banked(offset)) => self.banked_write(offset, data),
            Some(Target::Rom(_)) | None => {}
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum MmioRoute {
    Registers(u16),
    Aperture(u32),
    Port(u16),
}

impl<H: TguiHost> MemoryMappedDevice for TguiCard<H> {
    fn mmio_read_u8(&mut self, address: usize) -> (u8, u32) {
        (self.read_byte(address as u32), TGUI_BUS_TIMINGS.read_b)
    }

    fn mmio_read_u16(&mut self, address: usize) -> (u16, u32) {
        let lo = self.read_byte(address as u32);
        let hi = self.read_byte(address as u32 + 1);
        (u16::from_le_bytes([lo, hi]), TGUI_BUS_TIMINGS.read_w)
    }

    fn mmio_read_u32(&mut self, address: usize) -> (u32, u32) {
        let mut bytes = [0u8; 4];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = self.read_byte(address as u32 + i as u32);
        }
        (u32::from_le_bytes(bytes), TGUI_BUS_TIMINGS.read_l)
    }

    fn mmio_peek_u8(&self, address: usize) -> u8 {
        let address = address as u32;
        match self.decode(address) {
            Some(Target::Accel(address)) => self.accel_aperture_read(address),
            Some(Target::Linear(offset)) => {
                let address = offset & self.decode_mask;
                if (address as usize) < self.vram.len() {
                    self.vram.read_u8(address as usize)
                }
                else {
                    OPEN_BUS_BYTE
                }
            }
            Some(Target::Banked(offset)) => self.vram.read_u8(self.banked_read_address(offset) as usize),
            Some(Target::Rom(offset)) => self.rom_read(offset),
            Some(Target::Mmio(_)) | None => OPEN_BUS_BYTE,
        }
    }

    fn mmio_write_u8(&mut self, address: usize, data: u8) -> u32 {
        self.write_byte(address as u32, data);
        TGUI_BUS_TIMINGS.write_b
    }

    fn mmio_write_u16(&mut self, address: usize, data: u16) -> u32 {
        let address = address as u32;
        match self.decode(address) {
            Some(Target::Linear(_)) if self.feeds_blitter() => {
                self.accel.feed_cpu_data(&mut self.vram, 16, (data.swap_bytes() as u32) << 16);
            }
            Some(Target::Linear(offset)) if self.apertures.handlers.ext_write => {
                self.ext.write_u16(&mut self.vram, &self.regs.gdc, offset, self.decode_mask, data);
            }
            Some(Target::Banked(offset)) if self.apertures.handlers.ext_write => {
                let address = self.banked_write_address(offset);
                self.ext.write_u16(&mut self.vram, &self.regs.gdc, address, self.decode_mask, data);
            }
            _ => {
                let [lo, hi] = data.to_le_bytes();
                self.write_byte(address, lo);
                self.write_byte(address + 1, hi);
            }
        }
        TGUI_BUS_TIMINGS.write_w
    }

    fn mmio_write_u32(&mut self, address: usize, data: u32) -> u32 {
        let address = address as u32;
        match self.decode(address) {
            Some(Target::Linear(_)) if self.feeds_blitter() => {
                self.accel.feed_cpu_data(&mut self.vram, 32, data.swap_bytes());
            }
            Some(Target::Linear(offset)) if self.apertures.handlers.ext_write => {
                self.ext.write_u32(&mut self.vram, &self.regs.gdc, offset, self.decode_mask, data);
            }
            Some(Target::Banked(offset)) if self.apertures.handlers.ext_write => {
                let address = self.banked_write_address(offset);
                self.ext.write_u32(&mut self.vram, &self.regs.gdc, address, self.decode_mask, data);
            }
            Some(Target::Mmio(offset)) => self.mmio_window_write_u32(offset, data),
            Some(Target::Accel(address)) => self.accel_aperture_write_u32(address, data),
            _ => {
                for (i, byte) in data.to_le_bytes().iter().enumerate() {
                    self.write_byte(address + i as u32, *byte);
                }
            }
        }
        TGUI_BUS_TIMINGS.write_l
    }

    fn get_mapping(&self) -> Vec<MemRangeDescriptor> {
        let map = &self.apertures;
        let mut ranges = Vec::new();
        for aperture in [map.mmio, map.accel, map.linear, map.banked].iter().flatten() {
            let mut desc = MemRangeDescriptor::new(aperture.base as usize, aperture.size as usize, false);
            desc.cycle_cost = TGUI_BUS_TIMINGS.write_b;
            ranges.push(desc);
        }
        if let Some(rom) = map.rom {
            ranges.push(MemRangeDescriptor::new(rom.base as usize, rom.size as usize, true));
        }
        ranges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bus::IoDevice,
        device_types::tgui::TguiModel,
        devices::tgui::{
            accel::{engine, regs::*},
            io::*,
            tests::{card, RecordingHost},
            vga_regs::*,
        },
    };

    const CMD_BITBLT_CODE: u32 = engine::CMD_BITBLT as u32;

    fn unlock<H: TguiHost>(c: &mut TguiCard<H>) {
        c.write_u8(MISC_OUTPUT_WRITE, 0x01);
        c.write_u8(SEQUENCER_ADDRESS, SEQ_MODE_CONTROL_1);
        c.write_u8(SEQUENCER_DATA, 0x82);
    }

    fn crtc<H: TguiHost>(c: &mut TguiCard<H>, index: u8, data: u8) {
        c.write_u8(CRTC_ADDRESS, index);
        c.write_u8(CRTC_DATA, data);
    }

    fn gdc<H: TguiHost>(c: &mut TguiCard<H>, index: u8, data: u8) {
        c.write_u8(GRAPHICS_ADDRESS, index);
        c.write_u8(GRAPHICS_DATA, data);
    }

    /// A PCI 9440 with its framebuffer at 0xE0000000 and MMIO at 0xD0000000.
    fn pci_card() -> TguiCard<RecordingHost> {
        let mut c = card(TguiModel::Tgui9440Pci);
        c.pci_write(0x13, 0xE0);
        c.pci_write(0x17, 0xD0);
        unlock(&mut c);
        crtc(&mut c, CRTC_MMIO_CONTROL, 0x01);
        c
    }

    #[test]
    fn test_banked_access() {
        let mut c = card(TguiModel::Tgui9440Vlb);
        c.write_u8(MISC_OUTPUT_WRITE, 0x01);
        c.clear_dirty();
        c.mmio_write_u8(0xA0010, 0x5A);
        assert_eq!(c.vram().read_u8(0x10), 0x5A);

        c.write_u8(SEQUENCER_ADDRESS, SEQ_MODE_CONTROL_1);
        c.write_u8(SEQUENCER_DATA, 0x03);
        c.mmio_write_u16(0xA0020, 0xBEEF);
        assert_eq!(c.vram().read_u8(0x1_0020), 0xEF);
        assert_eq!(c.vram().read_u8(0x1_0021), 0xBE);
        assert_eq!(c.mmio_read_u16(0xA0020).0, 0xBEEF);
        assert_eq!(c.mmio_peek_u8(0xA0021), 0xBE);
        assert_eq!(c.dirty_pages().collect::<Vec<_>>(), vec![0, 0x10]);

        gdc(&mut c, GDC_MISC, 0x0C);
        assert_eq!(c.mmio_read_u8(0xA0020).0, OPEN_BUS_BYTE);
        assert_eq!(c.mmio_read_u8(0xB8020).0, 0xEF);
    }

    #[test]
    fn test_linear_reads_beyond_vram() {
        let config = TguiConfig::new(TguiModel::Tgui9440Vlb).with_vram_mb(1);
        let mut c = match TguiCard::new(&config, RecordingHost::default()) {
            Ok(c) => c,
            Err(e) => panic!("{}", e),
        };
        unlock(&mut c);
        // 2MB decode at 0x300000 over 1MB of memory.
        crtc(&mut c, CRTC_LINEAR_ADDRESSING, 0x20 | 0x10 | 0x03);
        assert_eq!(c.apertures().linear, Some(Aperture::new(0x30_0000, 0x20_0000)));
        c.mmio_write_u8(0x30_0004, 0x77);
        assert_eq!(c.mmio_read_u8(0x30_0004).0, 0x77);
        c.mmio_write_u8(0x40_0004, 0x88);
        assert_eq!(c.mmio_read_u8(0x40_0004).0, OPEN_BUS_BYTE);
        assert_eq!(c.mmio_peek_u8(0x40_0004), OPEN_BUS_BYTE);
        assert_eq!(c.vram().read_u8(0x04), 0x77);
        assert_eq!(c.mmio_read_u8(0x50_0000).0, OPEN_BUS_BYTE);

        let mut c = pci_card();
        c.vram_mut().write_u8(0x1F_FFFF, 0x42);
        assert_eq!(c.mmio_read_u8(0xE01F_FFFF).0, 0x42);
        assert_eq!(c.mmio_read_u32(0xE01F_FFFC).0, 0x4200_0000);
    }

    #[test]
    fn test_pci_memory_enable_toggle() {
        let mut c = pci_card();
        let enabled = *c.apertures();
        assert!(enabled.linear.is_some() && enabled.banked.is_some() && enabled.mmio.is_some());
        c.pci_write(0x04, 0x01);
        assert!(c.get_mapping().is_empty());
        assert_eq!(c.mmio_read_u8(0xA0000).0, OPEN_BUS_BYTE);
        c.pci_write(0x04, 0x03);
        assert_eq!(*c.apertures(), enabled);
        let maps = &c.host().maps;
        assert_eq!(maps[maps.len() - 1], enabled);
    }

    #[test]
    fn test_mmio_window_routes() {
        let mut c = pci_card();
        c.mmio_write_u16(0xD000_2138, 0x0123);
        assert_eq!(c.accelerator().regs.dst_x, 0x0123);
        assert_eq!(c.mmio_read_u16(0xD000_2138).0, 0x0123);

        // VGA ports through the window.
        c.mmio_write_u8(0xD000_03CE, GDC_READ_BANK);
        c.mmio_write_u8(0xD000_03CF, 0x09);
        assert_eq!(c.registers().gdc[GDC_READ_BANK as usize], 0x09);
        assert_eq!(c.mmio_read_u8(0xD000_03CC).0, 0x01);

        // With an aperture selected the low 256 bytes go through its decoder,
        // which only accepts the aperture's own page in modes 1 and 2.
        crtc(&mut c, CRTC_APERTURE_CONTROL, 0x01);
        c.mmio_write_u8(0xD000_0038, 0x55);
        assert_eq!(c.accelerator().regs.dst_x, 0x0123);
        crtc(&mut c, CRTC_APERTURE_CONTROL, 0x03);
        c.mmio_write_u8(0xD000_0038, 0x55);
        assert_eq!(c.accelerator().regs.dst_x, 0x0155);
        assert_eq!(c.mmio_read_u8(0xD000_2138).0, 0xFF);
    }

    #[test]
    fn test_accel_aperture() {
        let mut c = card(TguiModel::Tgui9440Vlb);
        unlock(&mut c);
        crtc(&mut c, CRTC_APERTURE_CONTROL, 0x02);
        assert_eq!(c.apertures().accel, Some(Aperture::new(0xBC000, 0x4000)));
        c.mmio_write_u16(0xBFF3A, 0x0042);
        assert_eq!(c.accelerator().regs.dst_y, 0x42);
        assert_eq!(c.mmio_read_u8(0xBFF3A).0, 0x42);
        c.mmio_write_u8(0xBC03A, 0x99);
        assert_eq!(c.accelerator().regs.dst_y, 0x42);
        assert_eq!(c.mmio_read_u8(0xBC03A).0, OPEN_BUS_BYTE);
    }

    #[test]
    fn test_aperture_long_command_write() {
        let mut c = card(TguiModel::Tgui9440Vlb);
        unlock(&mut c);
        crtc(&mut c, CRTC_APERTURE_CONTROL, 0x01);
        c.vram_mut().write_u8(0, 0x11);
        c.mmio_write_u32(0xB7F28, 0x0000_0004);
        c.mmio_write_u16(0xB7F38, 8);
        c.mmio_write_u16(0xB7F40, 0);
        c.mmio_write_u16(0xB7F42, 0);
        c.mmio_write_u32(0xB7F24, 0xCC00_0000 | CMD_BITBLT_CODE);
        assert_eq!(c.accelerator().regs.rop, 0xCC);
        assert_eq!(c.vram().read_u8(8), 0x11);
    }

    #[test]
    fn test_cpu_blit_fed_through_linear_aperture() {
        let mut c = pci_card();
        crtc(&mut c, CRTC_LINEAR_ADDRESSING, 0x20);
        // 8bpp, CPU source, 4x1 destination at (0,1).
        c.write_u32(GER_FLAGS, 0);
        c.write_u16(GER_DST_X, 0);
        c.write_u16(GER_DST_Y, 1);
        c.write_u16(GER_SIZE_X, 3);
        c.write_u16(GER_SIZE_Y, 0);
        c.write_u32(GER_COMMAND, 0xCC00_0000 | CMD_BITBLT_CODE);
        assert!(c.awaiting_cpu_data());

        c.mmio_write_u16(0xE000_0000, 0x2211);
        assert!(c.awaiting_cpu_data());
        let pitch = engine::pitch(c.timings().rowoffset, c.timings().bpp) as usize;
        assert_eq!(c.vram().read_u8(pitch), 0x11);
        assert_eq!(c.vram().read_u8(pitch + 1), 0x22);
        c.mmio_write_u8(0xE000_0000, 0x33);
        c.mmio_write_u8(0xE000_0000, 0x44);
        assert!(!c.awaiting_cpu_data());
        assert_eq!(c.vram().read_u8(pitch + 3), 0x44);
        // The feeding writes never landed in the framebuffer itself.
        assert_eq!(c.vram().read_u8(0), 0x00);

        c.mmio_write_u8(0xE000_0000, 0x99);
        assert_eq!(c.vram().read_u8(0), 0x99);
    }

    #[test]
    fn test_linear_writes_skip_blitter_without_linear_addressing() {
        let mut c = pci_card();
        assert_eq!(c.registers().crtc[CRTC_LINEAR_ADDRESSING as usize] & 0x20, 0);
        c.write_u32(GER_FLAGS, 0);
        c.write_u16(GER_DST_X, 0);
        c.write_u16(GER_DST_Y, 1);
        c.write_u16(GER_SIZE_X, 3);
        c.write_u16(GER_SIZE_Y, 0);
        c.write_u32(GER_COMMAND, 0xCC00_0000 | CMD_BITBLT_CODE);
        assert!(c.awaiting_cpu_data());

        c.mmio_write_u8(0xE000_0000, 0x5A);
        c.mmio_write_u16(0xE000_0002, 0x7766);
        c.mmio_write_u32(0xE000_0004, 0x4433_2211);
        assert!(c.awaiting_cpu_data());
        assert_eq!(c.vram().read_u8(0), 0x5A);
        assert_eq!(c.vram().read_u8(2), 0x66);
        assert_eq!(c.vram().read_u8(3), 0x77);
        assert_eq!(c.vram().read_u8(4), 0x11);
        assert_eq!(c.vram().read_u8(7), 0x44);
        let pitch = engine::pitch(c.timings().rowoffset, c.timings().bpp) as usize;
        assert_eq!(c.vram().read_u8(pitch), 0x00);

        // Enabling linear addressing hands the aperture to the waiting blit.
        crtc(&mut c, CRTC_LINEAR_ADDRESSING, 0x20);
        c.mmio_write_u32(0xE000_0000, 0xDDCC_BBAA);
        assert!(!c.awaiting_cpu_data());
        assert_eq!(c.vram().read_u8(0), 0x5A);
        assert_eq!(c.vram().read_u8(pitch), 0xAA);
        assert_eq!(c.vram().read_u8(pitch + 3), 0xDD);
    }

    #[test]
    fn test_9400_extended_writes() {
        let mut c = card(TguiModel::Tgui9400CxiVlb);
        gdc(&mut c, GDC_EXT_FG_LO, 0xF0);
        gdc(&mut c, GDC_EXT_WRITE_CONTROL, 0x06);
        c.mmio_write_u8(0xA0000, 0x80);
        assert_eq!(c.vram().read_u8(0), 0xF0);
        assert_eq!(c.vram().read_u8(1), 0x00);

        gdc(&mut c, GDC_EXT_WRITE_CONTROL, 0x08);
        assert_eq!(c.mmio_read_u8(0xA0000).0, c.vram().read_u8(0x40));
        assert_eq!(c.ext.copy_latch()[0], 0xF0);
        c.mmio_write_u16(0xA0100, 0x0080);
        assert_eq!(c.vram().read_u8(ext_write::dword_remap(0x100) as usize), 0xF0);
    }

    #[test]
    fn test_rom_window() {
        let mut c = card(TguiModel::Tgui9440Vlb);
        assert_eq!(c.mmio_read_u8(0xC0000).0, OPEN_BUS_BYTE);
        c.load_rom(vec![0x55, 0xAA, 0x40]);
        assert_eq!(c.mmio_read_u16(0xC0000).0, 0xAA55);
        c.mmio_write_u8(0xC0000, 0x00);
        assert_eq!(c.mmio_peek_u8(0xC0000), 0x55);
        assert!(c.get_mapping().iter().any(|r| r.address == 0xC0000 && r.read_only));

        let mut c = card(TguiModel::Tgui9660Pci);
        assert_eq!(c.apertures().rom, None);
        c.pci_write(0x33, 0x000F);
        c.pci_write(0x32, 0x00);
        c.pci_write(0x30, 0x01);
        assert_eq!(c.apertures().rom, Some(Aperture::new(0x0F00_0000, ROM_SIZE)));
    }
}
