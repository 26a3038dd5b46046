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

    devices::tgui::io.rs

    Implementation of the IoDevice interface trait for the TGUI card, and the
    VGA and extended register handlers shared with the MMIO window.

*/

use super::*;
use crate::{
    bus::{IoDevice, NO_IO_BYTE},
    devices::tgui::vga_regs::*,
};

pub const ATTRIBUTE_REGISTER: u16 = 0x3C0;
pub const ATTRIBUTE_REGISTER_READ: u16 = 0x3C1;
pub const MISC_OUTPUT_WRITE: u16 = 0x3C2;
pub const SEQUENCER_ADDRESS: u16 = 0x3C4;
pub const SEQUENCER_DATA: u16 = 0x3C5;
pub const PEL_MASK: u16 = 0x3C6;
pub const PEL_ADDRESS_READ_MODE: u16 = 0x3C7;
pub const PEL_ADDRESS_WRITE_MODE: u16 = 0x3C8;
pub const PEL_DATA: u16 = 0x3C9;
pub const MISC_OUTPUT_READ: u16 = 0x3CC;
pub const GRAPHICS_ADDRESS: u16 = 0x3CE;
pub const GRAPHICS_DATA: u16 = 0x3CF;
pub const CRTC_ADDRESS: u16 = 0x3D4;
pub const CRTC_DATA: u16 = 0x3D5;
pub const BANK_WRITE: u16 = 0x3D8;
pub const BANK_READ: u16 = 0x3D9;
pub const INPUT_STATUS_1: u16 = 0x3DA;
pub const ALT_CLOCK: u16 = 0x3DB;
pub const CLOCK_SYNTH_LOW: u16 = 0x43C8;
pub const CLOCK_SYNTH_HIGH: u16 = 0x43C9;

/// CRTC registers that are read-only unless sequencer 0x0E bit 7 is set or
/// the chip is in old mode.
const LOCKED_CRTC: [u8; 7] = [0x21, 0x29, 0x2A, 0x38, 0x39, 0x3B, 0x3C];

/// Accelerator ports decoded in I/O space. 0x214C-0x214F and 0x2150-0x2167
/// are only reachable through the MMIO window.
#[inline]
pub fn is_accel_port(port: u16) -> bool {
    matches!(
        port,
        0x2120 | 0x2122..=0x2124 | 0x2127..=0x2135 | 0x2138..=0x214B | 0x2168..=0x216B | 0x2178..=0x21FF
    )
}

impl<H: TguiHost> TguiCard<H> {
    fn accel_ports_enabled(&self) -> bool {
        self.caps.has_accel_ports && (!self.is_pci() || self.pci.io_enabled())
    }

    fn vga_ports_enabled(&self) -> bool {
        !self.is_pci() || self.pci.io_enabled()
    }

    /// With monochrome addressing selected, 0x3Bx and 0x3Dx swap places.
    #[inline]
    fn remap_mono(&self, port: u16) -> u16 {
        if matches!(port & 0xFFF0, 0x3B0 | 0x3D0) && !self.regs.color_io() {
            port ^ 0x60
        }
        else {
            port
        }
    }

    pub(crate) fn vga_out(&mut self, port: u16, data: u8) {
        match self.remap_mono(port) {
            ATTRIBUTE_REGISTER | ATTRIBUTE_REGISTER_READ => self.regs.write_attribute(data),
            MISC_OUTPUT_WRITE => {
                self.regs.misc_output = data;
                self.recalc_timings();
            }
            SEQUENCER_ADDRESS => self.regs.seq_index = data,
            SEQUENCER_DATA => self.write_sequencer(data),
            PEL_MASK => {
                if self.ramdac.write_mask_port(data) {
                    log::debug!("{}: RAMDAC control {:02X}", self.model, data);
                    self.recalc_timings();
                }
                else {
                    self.regs.dac_mask = data;
                }
            }
            PEL_ADDRESS_READ_MODE => {
                self.ramdac.disarm();
                self.regs.write_dac_read_index(data);
            }
            PEL_ADDRESS_WRITE_MODE => {
                self.ramdac.disarm();
                self.regs.write_dac_write_index(data);
            }
            PEL_DATA => {
                self.ramdac.disarm();
                self.regs.write_dac_data(data);
            }
            GRAPHICS_ADDRESS => self.regs.gdc_index = data,
            GRAPHICS_DATA => self.write_graphics(data),
            CRTC_ADDRESS => self.regs.crtc_index = data,
            CRTC_DATA => self.write_crtc(data),
            BANK_WRITE => {
                self.bank_3d8 = data;
                if self.regs.gdc[GDC_BANK_CONTROL as usize] & 0x04 != 0 {
                    self.write_bank = (data & 0x3F) as u32 * BANK_GRANULE;
                    if !self.separate_read_bank() {
                        self.read_bank = self.write_bank;
                    }
                }
            }
            BANK_READ => {
                self.bank_3d9 = data;
                if self.regs.gdc[GDC_BANK_CONTROL as usize] & 0x05 == 0x05 {
                    self.read_bank = (data & 0x3F) as u32 * BANK_GRANULE;
                }
            }
            ALT_CLOCK => self.alt_clock = data & 0xE3,
            CLOCK_SYNTH_LOW if self.caps.has_clock_synth => self.clock.write_low(data),
            CLOCK_SYNTH_HIGH if self.caps.has_clock_synth => {
                self.clock.write_high(data);
                log::trace!("{}: pixel clock {:.3} MHz", self.model, self.clock.frequency() / 1_000_000.0);
            }
            port => log::trace!("{}: unhandled write {:02X} to port {:04X}", self.model, data, port),
        }
    }

    pub(crate) fn vga_in(&mut self, port: u16) -> u8 {
        match self.remap_mono(port) {
            ATTRIBUTE_REGISTER => self.regs.read_attribute_address(),
            ATTRIBUTE_REGISTER_READ => self.regs.read_attribute_data(),
            MISC_OUTPUT_WRITE => 0x00,
            SEQUENCER_ADDRESS => self.regs.seq_index,
            SEQUENCER_DATA => self.read_sequencer(),
            PEL_MASK => self.ramdac.read_mask_port(self.regs.dac_mask),
            PEL_ADDRESS_READ_MODE => {
                self.ramdac.disarm();
                self.regs.read_dac_state()
            }
            PEL_ADDRESS_WRITE_MODE => {
                self.ramdac.disarm();
                self.regs.read_dac_write_index()
            }
            PEL_DATA => {
                self.ramdac.disarm();
                self.regs.read_dac_data()
            }
            MISC_OUTPUT_READ => self.regs.misc_output,
            GRAPHICS_ADDRESS => self.regs.gdc_index,
            GRAPHICS_DATA => self.regs.gdc_reg(),
            CRTC_ADDRESS => self.regs.crtc_index,
            CRTC_DATA => self.read_crtc(),
            BANK_WRITE => self.bank_3d8,
            BANK_READ => self.bank_3d9,
            INPUT_STATUS_1 => self.regs.read_input_status_1(),
            ALT_CLOCK => self.alt_clock,
            _ => NO_IO_BYTE,
        }
    }

    fn write_sequencer(&mut self, data: u8) {
        let index = self.regs.seq_index;
        match index {
            SEQ_VERSION => {
                self.oldmode = true;
                self.regs.seq[index as usize] = data;
            }
            SEQ_CONFIG_PORT_1 => {
                if self.regs.seq[SEQ_MODE_CONTROL_1 as usize] & 0x80 != 0 {
                    self.regs.seq[index as usize] = data;
                }
            }
            SEQ_MODE_CONTROL_2 => {
                if self.oldmode {
                    self.oldctrl2 = data;
                }
                else {
                    self.newctrl2 = data;
                }
                self.regs.seq[index as usize] = data;
                self.recalc_timings();
            }
            SEQ_MODE_CONTROL_1 => {
                if self.oldmode {
                    self.oldctrl1 = data;
                    self.update_irq();
                    self.write_bank = self.oldctrl1 as u32 * BANK_GRANULE;
                }
                else {
                    self.regs.seq[index as usize] = data ^ 0x02;
                    self.write_bank = self.regs.seq[index as usize] as u32 * BANK_GRANULE;
                }
                if !self.separate_read_bank() {
                    self.read_bank = self.write_bank;
                }
            }
            _ => {
                let old = self.regs.seq[index as usize];
                self.regs.seq[index as usize] = data;
                if index == SEQ_CLOCKING_MODE && old != data {
                    self.recalc_timings();
                }
            }
        }
    }

    fn read_sequencer(&mut self) -> u8 {
        let index = self.regs.seq_index;
        match index {
            SEQ_REVISION if self.caps.revision_id.is_some() => self.caps.revision_id.unwrap_or_default(),
            SEQ_VERSION => {
                self.oldmode = false;
                self.caps.chip_id
            }
            SEQ_MODE_CONTROL_2 => {
                if self.oldmode {
                    self.oldctrl2
                }
                else {
                    self.newctrl2
                }
            }
            SEQ_CONFIG_PORT_1 => {
                if self.regs.seq[SEQ_MODE_CONTROL_1 as usize] & 0x80 != 0 {
                    self.regs.seq[index as usize]
                }
                else {
                    0xFF
                }
            }
            SEQ_MODE_CONTROL_1 => {
                if self.oldmode {
                    self.oldctrl1 | 0x88
                }
                else {
                    self.regs.seq[index as usize]
                }
            }
            _ => self.regs.seq_reg(),
        }
    }

    fn write_graphics(&mut self, data: u8) {
        let index = self.regs.gdc_index;
        let old = self.regs.gdc[index as usize];
        let mut remap = false;

        match index {
            GDC_MISC => remap = old != data,
            GDC_READ_BANK => {
                if self.separate_read_bank() {
                    self.read_bank = (data ^ 0x02) as u32 * BANK_GRANULE;
                }
            }
            GDC_BANK_CONTROL => {
                self.read_bank = if data & 0x01 != 0 {
                    self.regs.gdc[GDC_READ_BANK as usize] as u32 * BANK_GRANULE
                }
                else {
                    self.mode_control_1() as u32 * BANK_GRANULE
                };
                self.write_bank = self.mode_control_1() as u32 * BANK_GRANULE;
            }
            _ => {}
        }
        self.regs.gdc[index as usize] = data;

        if index == GDC_POWER_MANAGEMENT {
            self.recalc_timings();
        }
        if remap {
            self.remap();
        }
        if self.caps.has_ext_write_modes && (0x10..=0x1F).contains(&index) {
            self.remap();
            return;
        }
        if (index == GDC_MODE && (data ^ old) & 0x70 != 0) || (index == GDC_MISC && (data ^ old) & 0x01 != 0) {
            self.recalc_timings();
        }
    }

    fn write_crtc(&mut self, data: u8) {
        let index = self.regs.crtc_index;
        let unlocked = self.regs.seq[SEQ_MODE_CONTROL_1 as usize] & 0x80 != 0 || self.oldmode;
        if !unlocked && LOCKED_CRTC.contains(&index) {
            return;
        }

        let protect = self.regs.crtc[CRTC_VERTICAL_RETRACE_END as usize] & 0x80 != 0;
        let data = match index {
            0..=6 if protect => return,
            7 if protect => (self.regs.crtc[7] & !0x10) | (data & 0x10),
            _ => data,
        };

        let old = self.regs.crtc[index as usize];
        self.regs.crtc[index as usize] = data;

        match index {
            CRTC_LINEAR_ADDRESSING => {
                if !self.is_pci() {
                    self.linear_base = (((data & 0xC0) as u32) << 18) | (((data & 0x0F) as u32) << 20);
                    if data & 0x10 != 0 {
                        self.linear_size = 0x20_0000;
                        self.decode_mask = 0x1F_FFFF;
                    }
                    else {
                        self.linear_size = 0x10_0000;
                        self.decode_mask = 0x0F_FFFF;
                    }
                }
                self.remap();
            }
            CRTC_GE_BASE_LO | CRTC_GE_BASE_HI if self.chip.is_9440_or_later() => {
                self.ge_base = ((self.regs.crtc[CRTC_GE_BASE_HI as usize] as u32) << 24)
                    | ((self.regs.crtc[CRTC_GE_BASE_LO as usize] as u32) << 16);
                self.remap();
            }
            CRTC_APERTURE_CONTROL | CRTC_MMIO_CONTROL => self.remap(),
            CRTC_I2C if self.caps.has_i2c => {
                let scl = data & 0x02 != 0 || data & 0x04 == 0;
                let sda = data & 0x01 != 0 || data & 0x08 == 0;
                self.host.i2c_set(scl, sda);
            }
            0x40..=0x47 if self.caps.has_hw_cursor => self.update_cursor_position(),
            CRTC_CURSOR_CONTROL if self.caps.has_hw_cursor => {
                self.cursor.update_control(self.regs.cursor_control());
            }
            _ => {}
        }

        if old != data && !(0x0E..=0x10).contains(&index) {
            if index == CRTC_START_ADDRESS_H || index == CRTC_START_ADDRESS_L {
                let c = &self.regs.crtc;
                self.timings.memaddr_latch = (((c[CRTC_START_ADDRESS_H as usize] as u32) << 8)
                    | c[CRTC_START_ADDRESS_L as usize] as u32)
                    + ((c[0x08] as u32 & 0x60) >> 5);
            }
            else {
                self.recalc_timings();
            }
        }
    }

    fn read_crtc(&self) -> u8 {
        let mut data = self.regs.crtc_reg();
        if self.regs.crtc_index == CRTC_I2C && self.caps.has_i2c {
            if data & 0x04 == 0 {
                data &= !0x02;
                if self.host.i2c_scl() {
                    data |= 0x02;
                }
            }
            if data & 0x08 == 0 {
                data &= !0x01;
                if self.host.i2c_sda() {
                    data |= 0x01;
                }
            }
        }
        data
    }
}

impl<H: TguiHost> IoDevice for TguiCard<H> {
    fn read_u8(&mut self, port: u16) -> u8 {
        match port {
            0x2100..=0x21FF if self.accel_ports_enabled() && is_accel_port(port) => self.accel.read_u8(port),
            0x3C0..=0x3DF if self.vga_ports_enabled() => self.vga_in(port),
            0x43C6..=0x43C9 | 0x83C6..=0x83C8 if self.accel_ports_enabled() => self.vga_in(port),
            _ => NO_IO_BYTE,
        }
    }

    fn write_u8(&mut self, port: u16, data: u8) {
        match port {
            0x2100..=0x21FF if self.accel_ports_enabled() && is_accel_port(port) => {
                let ctx = self.engine_context();
                self.accel.write_u8(port, data, &mut self.vram, ctx);
            }
            0x3C0..=0x3DF if self.vga_ports_enabled() => self.vga_out(port, data),
            0x43C6..=0x43C9 | 0x83C6..=0x83C8 if self.accel_ports_enabled() => self.vga_out(port, data),
            _ => {}
        }
    }

    fn read_u16(&mut self, port: u16) -> u16 {
        if self.accel_ports_enabled() && is_accel_port(port) {
            return self.accel.read_u16(port);
        }
        self.read_u8(port) as u16 | (self.read_u8(port.wrapping_add(1)) as u16) << 8
    }

    fn write_u16(&mut self, port: u16, data: u16) {
        if self.accel_ports_enabled() && is_accel_port(port) {
            let ctx = self.engine_context();
            self.accel.write_u16(port, data, &mut self.vram, ctx);
            return;
        }
        self.write_u8(port, data as u8);
        self.write_u8(port.wrapping_add(1), (data >> 8) as u8);
    }

    fn read_u32(&mut self, port: u16) -> u32 {
        if self.accel_ports_enabled() && is_accel_port(port) {
            return self.accel.read_u32(port);
        }
        self.read_u16(port) as u32 | (self.read_u16(port.wrapping_add(2)) as u32) << 16
    }

    fn write_u32(&mut self, port: u16, data: u32) {
        if self.accel_ports_enabled() && is_accel_port(port) {
            let ctx = self.engine_context();
            self.accel.write_u32(port, data, &mut self.vram, ctx);
            return;
        }
        self.write_u16(port, data as u16);
        self.write_u16(port.wrapping_add(2), (data >> 16) as u16);
    }

    fn port_list(&self) -> Vec<(String, u16)> {
        let mut ports = vec![
            (String::from("TGUI Attribute Register"), ATTRIBUTE_REGISTER),
            (String::from("TGUI Attribute Register Read"), ATTRIBUTE_REGISTER_READ),
            (String::from("TGUI Misc Output Register"), MISC_OUTPUT_WRITE),
            (String::from("TGUI Video Subsystem Enable"), 0x3C3),
            (String::from("TGUI Sequencer Address Register"), SEQUENCER_ADDRESS),
            (String::from("TGUI Sequencer Data Register"), SEQUENCER_DATA),
            (String::from("TGUI PEL Mask"), PEL_MASK),
            (String::from("TGUI PEL Address Read Mode"), PEL_ADDRESS_READ_MODE),
            (String::from("TGUI PEL Address Write Mode"), PEL_ADDRESS_WRITE_MODE),
            (String::from("TGUI PEL Data"), PEL_DATA),
            (String::from("TGUI Feature Control Read"), 0x3CA),
            (String::from("TGUI Misc Output Read"), MISC_OUTPUT_READ),
            (String::from("TGUI Graphics Address"), GRAPHICS_ADDRESS),
            (String::from("TGUI Graphics Data"), GRAPHICS_DATA),
            (String::from("TGUI CRTC Address"), CRTC_ADDRESS),
            (String::from("TGUI CRTC Data"), CRTC_DATA),
            (String::from("TGUI Write Bank"), BANK_WRITE),
            (String::from("TGUI Read Bank"), BANK_READ),
            (String::from("TGUI Input Status Register 1"), INPUT_STATUS_1),
            (String::from("TGUI Alternate Clock"), ALT_CLOCK),
        ];
        // Remaining ports in the VGA block are decoded but unassigned.
        let claimed: Vec<u16> = ports.iter().map(|(_, p)| *p).collect();
        for port in (0x3C0..=0x3DF).filter(|p| !claimed.contains(p)) {
            ports.push((String::from("TGUI Reserved"), port));
        }

        if self.caps.has_accel_ports {
            ports.push((String::from("TGUI Clock Synthesizer Low"), CLOCK_SYNTH_LOW));
            ports.push((String::from("TGUI Clock Synthesizer High"), CLOCK_SYNTH_HIGH));
            for port in (0x43C6..=0x43C7).chain(0x83C6..=0x83C8) {
                ports.push((String::from("TGUI Extended DAC"), port));
            }
            for port in (0x2120..=0x21FF).filter(|p| is_accel_port(*p)) {
                ports.push((String::from("TGUI Graphics Engine"), port));
            }
        }
        ports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{device_types::tgui::TguiModel, devices::tgui::tests::card};

    fn write_idx<H: TguiHost>(c: &mut TguiCard<H>, port: u16, index: u8, data: u8) {
        c.write_u8(port, index);
        c.write_u8(port + 1, data);
    }

    fn read_idx<H: TguiHost>(c: &mut TguiCard<H>, port: u16, index: u8) -> u8 {
        c.write_u8(port, index);
        c.read_u8(port + 1)
    }

    #[test]
    fn test_chip_id_and_old_mode() {
        let mut c = card(TguiModel::Tgui9440Vlb);
        c.write_u8(MISC_OUTPUT_WRITE, 0x01);
        write_idx(&mut c, SEQUENCER_ADDRESS, SEQ_VERSION, 0x00);
        assert!(c.oldmode);
        write_idx(&mut c, SEQUENCER_ADDRESS, SEQ_MODE_CONTROL_1, 0x05);
        assert_eq!(read_idx(&mut c, SEQUENCER_ADDRESS, SEQ_MODE_CONTROL_1), 0x8D);
        assert_eq!(c.write_bank(), 0x5_0000);

        assert_eq!(read_idx(&mut c, SEQUENCER_ADDRESS, SEQ_VERSION), 0xE3);
        assert!(!c.oldmode);
        write_idx(&mut c, SEQUENCER_ADDRESS, SEQ_MODE_CONTROL_1, 0x05);
        assert_eq!(read_idx(&mut c, SEQUENCER_ADDRESS, SEQ_MODE_CONTROL_1), 0x07);
        assert_eq!(c.write_bank(), 0x7_0000);
        assert_eq!(c.read_bank(), 0x7_0000);

        let mut c = card(TguiModel::Tgui9400CxiVlb);
        assert_eq!(read_idx(&mut c, SEQUENCER_ADDRESS, SEQ_VERSION), 0x93);
        let mut c = card(TguiModel::Tgui9660Pci);
        assert_eq!(read_idx(&mut c, SEQUENCER_ADDRESS, SEQ_VERSION), 0xD3);
        write_idx(&mut c, SEQUENCER_ADDRESS, SEQ_REVISION, 0x42);
        assert_eq!(read_idx(&mut c, SEQUENCER_ADDRESS, SEQ_REVISION), 0x42);
        let mut c = card(TguiModel::Tgui9680Pci);
        assert_eq!(read_idx(&mut c, SEQUENCER_ADDRESS, SEQ_REVISION), 0x01);
    }

    #[test]
    fn test_config_port_lock() {
        let mut c = card(TguiModel::Tgui9440Vlb);
        write_idx(&mut c, SEQUENCER_ADDRESS, SEQ_CONFIG_PORT_1, 0x12);
        assert_eq!(read_idx(&mut c, SEQUENCER_ADDRESS, SEQ_CONFIG_PORT_1), 0xFF);
        // New-mode control 1 is stored XOR 2, so 0x82 unlocks.
        write_idx(&mut c, SEQUENCER_ADDRESS, SEQ_MODE_CONTROL_1, 0x82);
        write_idx(&mut c, SEQUENCER_ADDRESS, SEQ_CONFIG_PORT_1, 0x12);
        assert_eq!(read_idx(&mut c, SEQUENCER_ADDRESS, SEQ_CONFIG_PORT_1), 0x12);
    }

    #[test]
    fn test_old_and_new_control_2() {
        let mut c = card(TguiModel::Tgui9440Vlb);
        write_idx(&mut c, SEQUENCER_ADDRESS, SEQ_MODE_CONTROL_2, 0x11);
        write_idx(&mut c, SEQUENCER_ADDRESS, SEQ_VERSION, 0x00);
        write_idx(&mut c, SEQUENCER_ADDRESS, SEQ_MODE_CONTROL_2, 0x22);
        assert_eq!(read_idx(&mut c, SEQUENCER_ADDRESS, SEQ_MODE_CONTROL_2), 0x22);
        c.write_u8(SEQUENCER_ADDRESS, SEQ_VERSION);
        c.read_u8(SEQUENCER_DATA);
        assert_eq!(read_idx(&mut c, SEQUENCER_ADDRESS, SEQ_MODE_CONTROL_2), 0x11);
    }

    #[test]
    fn test_pci_irq_follows_old_control_1() {
        let mut c = card(TguiModel::Tgui9440Pci);
        write_idx(&mut c, SEQUENCER_ADDRESS, SEQ_VERSION, 0x00);
        write_idx(&mut c, SEQUENCER_ADDRESS, SEQ_MODE_CONTROL_1, 0x00);
        write_idx(&mut c, SEQUENCER_ADDRESS, SEQ_MODE_CONTROL_1, 0x40);
        assert_eq!(c.host().irq, vec![true, false]);

        let mut c = card(TguiModel::Tgui9440Vlb);
        write_idx(&mut c, SEQUENCER_ADDRESS, SEQ_VERSION, 0x00);
        write_idx(&mut c, SEQUENCER_ADDRESS, SEQ_MODE_CONTROL_1, 0x00);
        assert!(c.host().irq.is_empty());
    }

    #[test]
    fn test_separate_read_bank() {
        let mut c = card(TguiModel::Tgui9440Vlb);
        write_idx(&mut c, GRAPHICS_ADDRESS, GDC_READ_BANK, 0x06);
        write_idx(&mut c, GRAPHICS_ADDRESS, GDC_BANK_CONTROL, 0x01);
        assert_eq!(c.read_bank(), 0x6_0000);
        write_idx(&mut c, GRAPHICS_ADDRESS, GDC_READ_BANK, 0x06);
        assert_eq!(c.read_bank(), 0x4_0000);
        assert_eq!(read_idx(&mut c, GRAPHICS_ADDRESS, GDC_READ_BANK), 0x06);

        write_idx(&mut c, SEQUENCER_ADDRESS, SEQ_MODE_CONTROL_1, 0x01);
        assert_eq!(c.write_bank(), 0x3_0000);
        assert_eq!(c.read_bank(), 0x4_0000);
    }

    #[test]
    fn test_bank_ports() {
        let mut c = card(TguiModel::Tgui9440Vlb);
        c.write_u8(MISC_OUTPUT_WRITE, 0x01);
        c.write_u8(BANK_WRITE, 0x45);
        assert_eq!(c.write_bank(), 0);
        write_idx(&mut c, GRAPHICS_ADDRESS, GDC_BANK_CONTROL, 0x04);
        c.write_u8(BANK_WRITE, 0x45);
        assert_eq!(c.write_bank(), 0x5_0000);
        assert_eq!(c.read_bank(), 0x5_0000);
        c.write_u8(BANK_READ, 0x03);
        assert_eq!(c.read_bank(), 0x5_0000);
        write_idx(&mut c, GRAPHICS_ADDRESS, GDC_BANK_CONTROL, 0x05);
        c.write_u8(BANK_READ, 0x03);
        assert_eq!(c.read_bank(), 0x3_0000);
        assert_eq!(c.read_u8(BANK_WRITE), 0x45);
        assert_eq!(c.read_u8(BANK_READ), 0x03);

        // Writing the same bank twice leaves the same state.
        let map = *c.apertures();
        c.write_u8(BANK_WRITE, 0x45);
        c.write_u8(BANK_WRITE, 0x45);
        assert_eq!((c.write_bank(), *c.apertures()), (0x5_0000, map));
    }

    #[test]
    fn test_mono_port_remap() {
        let mut c = card(TguiModel::Tgui9440Vlb);
        c.write_u8(MISC_OUTPUT_WRITE, 0x01);
        write_idx(&mut c, CRTC_ADDRESS, CRTC_OFFSET, 0x28);
        assert_eq!(c.registers().crtc[CRTC_OFFSET as usize], 0x28);

        // Monochrome addressing moves the CRTC to 0x3Bx, which the card does
        // not decode, so 0x3D4/0x3D5 go dead.
        c.write_u8(MISC_OUTPUT_WRITE, 0x00);
        c.write_u8(CRTC_ADDRESS, CRTC_OFFSET);
        c.write_u8(CRTC_DATA, 0x50);
        assert_eq!(c.registers().crtc[CRTC_OFFSET as usize], 0x28);
        assert_eq!(c.read_u8(CRTC_DATA), NO_IO_BYTE);
        assert_eq!(c.read_u8(INPUT_STATUS_1), NO_IO_BYTE);

        c.write_u8(MISC_OUTPUT_WRITE, 0x01);
        assert_eq!(read_idx(&mut c, CRTC_ADDRESS, CRTC_OFFSET), 0x28);
        assert_eq!(c.read_u8(MISC_OUTPUT_READ), 0x01);
    }

    #[test]
    fn test_crtc_locks() {
        let mut c = card(TguiModel::Tgui9440Vlb);
        c.write_u8(MISC_OUTPUT_WRITE, 0x01);
        write_idx(&mut c, CRTC_ADDRESS, CRTC_MMIO_CONTROL, 0x01);
        assert_eq!(read_idx(&mut c, CRTC_ADDRESS, CRTC_MMIO_CONTROL), 0x00);
        write_idx(&mut c, SEQUENCER_ADDRESS, SEQ_MODE_CONTROL_1, 0x82);
        write_idx(&mut c, CRTC_ADDRESS, CRTC_MMIO_CONTROL, 0x01);
        assert_eq!(read_idx(&mut c, CRTC_ADDRESS, CRTC_MMIO_CONTROL), 0x01);

        write_idx(&mut c, CRTC_ADDRESS, 0x01, 0x4F);
        write_idx(&mut c, CRTC_ADDRESS, CRTC_VERTICAL_RETRACE_END, 0x80);
        write_idx(&mut c, CRTC_ADDRESS, 0x01, 0x27);
        assert_eq!(read_idx(&mut c, CRTC_ADDRESS, 0x01), 0x4F);
        write_idx(&mut c, CRTC_ADDRESS, 0x07, 0xFF);
        assert_eq!(read_idx(&mut c, CRTC_ADDRESS, 0x07), 0x10);
    }

    #[test]
    fn test_vlb_linear_window() {
        let mut c = card(TguiModel::Tgui9440Vlb);
        c.write_u8(MISC_OUTPUT_WRITE, 0x01);
        write_idx(&mut c, SEQUENCER_ADDRESS, SEQ_MODE_CONTROL_1, 0x82);
        write_idx(&mut c, CRTC_ADDRESS, CRTC_LINEAR_ADDRESSING, 0x20 | 0x10 | 0x40 | 0x03);
        assert_eq!(c.linear_base, 0x0130_0000);
        assert_eq!(c.decode_mask, 0x1F_FFFF);
        assert_eq!(c.apertures().linear, Some(Aperture::new(0x0130_0000, 0x20_0000)));
        assert_eq!(c.apertures().banked, None);
    }

    #[test]
    fn test_start_address_latch() {
        let mut c = card(TguiModel::Tgui9440Vlb);
        c.write_u8(MISC_OUTPUT_WRITE, 0x01);
        let recalcs = c.host().timings.len();
        write_idx(&mut c, CRTC_ADDRESS, 0x08, 0x40);
        write_idx(&mut c, CRTC_ADDRESS, CRTC_START_ADDRESS_H, 0x12);
        write_idx(&mut c, CRTC_ADDRESS, CRTC_START_ADDRESS_L, 0x34);
        assert_eq!(c.timings().memaddr_latch, 0x1236);
        // Only the preset row scan write recalculated.
        assert_eq!(c.host().timings.len(), recalcs + 1);
    }

    #[test]
    fn test_i2c_lines() {
        let mut c = card(TguiModel::Tgui9440Pci);
        c.write_u8(MISC_OUTPUT_WRITE, 0x01);
        write_idx(&mut c, CRTC_ADDRESS, CRTC_I2C, 0x0C);
        write_idx(&mut c, CRTC_ADDRESS, CRTC_I2C, 0x0F);
        assert_eq!(c.host().i2c, vec![(false, false), (true, true)]);

        c.host_mut().scl = true;
        c.host_mut().sda = false;
        write_idx(&mut c, CRTC_ADDRESS, CRTC_I2C, 0x03);
        assert_eq!(read_idx(&mut c, CRTC_ADDRESS, CRTC_I2C), 0x02);
        write_idx(&mut c, CRTC_ADDRESS, CRTC_I2C, 0x0D);
        assert_eq!(read_idx(&mut c, CRTC_ADDRESS, CRTC_I2C), 0x0D);
    }

    #[test]
    fn test_hidden_dac_control() {
        let mut c = card(TguiModel::Tgui9440Vlb);
        for _ in 0..4 {
            assert_eq!(c.read_u8(PEL_MASK), 0xFF);
        }
        c.write_u8(PEL_MASK, 0x30);
        assert_eq!(c.timings().bpp, 16);
        assert_eq!(c.registers().dac_mask, 0xFF);

        for _ in 0..4 {
            c.read_u8(PEL_MASK);
        }
        assert_eq!(c.read_u8(PEL_MASK), 0x30);
        c.read_u8(PEL_ADDRESS_WRITE_MODE);
        c.write_u8(PEL_MASK, 0x0F);
        assert_eq!(c.registers().dac_mask, 0x0F);
    }

    #[test]
    fn test_dac_palette() {
        let mut c = card(TguiModel::Tgui9660Pci);
        c.write_u8(PEL_ADDRESS_WRITE_MODE, 0x10);
        for v in [0x3F, 0x20, 0x01] {
            c.write_u8(PEL_DATA, v);
        }
        c.write_u8(PEL_ADDRESS_READ_MODE, 0x10);
        let rgb: Vec<u8> = (0..3).map(|_| c.read_u8(PEL_DATA)).collect();
        assert_eq!(rgb, vec![0x3F, 0x20, 0x01]);
    }

    #[test]
    fn test_clock_synth_ports() {
        let mut c = card(TguiModel::Tgui9440Pci);
        c.write_u8(CLOCK_SYNTH_LOW, 0xAA);
        c.write_u8(CLOCK_SYNTH_HIGH, 0x13);
        assert_eq!(c.clock, ClockSynth { n: 0x2A, m: 0x07, k: 1 });

        let mut c = card(TguiModel::Tgui9400CxiVlb);
        c.write_u8(CLOCK_SYNTH_LOW, 0xAA);
        assert_eq!(c.clock, ClockSynth::default());
    }

    #[test]
    fn test_accel_ports_by_generation() {
        let mut c = card(TguiModel::Tgui9440Pci);
        c.write_u16(0x2138, 0x1234);
        assert_eq!(c.read_u16(0x2138), 0x1234);
        assert_eq!(c.read_u8(0x2125), 0xFF);

        let mut c = card(TguiModel::Tgui9400CxiVlb);
        c.write_u16(0x2138, 0x1234);
        assert_eq!(c.read_u16(0x2138), 0xFFFF);
        assert!(!c.port_list().iter().any(|(_, p)| *p == 0x2138));
    }

    #[test]
    fn test_pci_io_disable() {
        let mut c = card(TguiModel::Tgui9440Pci);
        c.pci_write(0x04, 0x02);
        c.write_u8(MISC_OUTPUT_WRITE, 0x01);
        assert_eq!(c.read_u8(MISC_OUTPUT_READ), 0xFF);
        c.pci_write(0x04, 0x03);
        assert_eq!(c.read_u8(MISC_OUTPUT_READ), 0x00);
    }

    #[test]
    fn test_port_list() {
        let c = card(TguiModel::Tgui9440Pci);
        let ports = c.port_list();
        for port in [0x3C0, 0x3DF, CLOCK_SYNTH_LOW, 0x2124, 0x21FF] {
            assert!(ports.iter().any(|(_, p)| *p == port), "{:04X}", port);
        }
        for port in [0x3B4, 0x3B5, 0x3BA, 0x214C] {
            assert!(!ports.iter().any(|(_, p)| *p == port), "{:04X}", port);
        }
        let mut unique: Vec<u16> = ports.iter().map(|(_, p)| *p).collect();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), ports.len());
    }

    #[test]
    fn test_9400_ext_registers_remap() {
        let mut c = card(TguiModel::Tgui9400CxiVlb);
        write_idx(&mut c, GRAPHICS_ADDRESS, GDC_EXT_WRITE_CONTROL, 0x02);
        assert!(c.apertures().handlers.ext_write);
        assert!(!c.apertures().handlers.ext_read);
        write_idx(&mut c, GRAPHICS_ADDRESS, GDC_EXT_WRITE_CONTROL, 0x00);
        assert!(!c.apertures().handlers.ext_write);
    }
}
