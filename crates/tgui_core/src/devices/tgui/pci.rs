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

    devices::tgui::pci.rs

    PCI configuration space of the 9440AGi and 96x0XGi.

*/

use crate::{
    device_types::tgui::ChipType,
    devices::tgui::mapping::{Aperture, ROM_SIZE},
};

pub const PCI_VENDOR_TRIDENT: u16 = 0x1023;

pub const PCI_REG_COMMAND: u8 = 0x04;
pub const PCI_COMMAND_IO: u8 = 0x01;
pub const PCI_COMMAND_MEM: u8 = 0x02;
const PCI_COMMAND_WRITABLE: u8 = 0x23;
const PCI_INTA: u8 = 0x01;

/// What the card must do after a configuration write.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PciWriteEffect {
    None,
    Command { io_enabled: bool },
    LinearBaseMoved,
    MmioBaseMoved,
    RomMoved,
}

pub struct PciConfig {
    device_id: u16,
    base_mask: u8,
    has_bios: bool,
    command: u8,
    rom_control: u8,
    rom_base_lo: u8,
    rom_base_hi: u8,
    pub int_line: u8,
    pub linear_base: u32,
    pub mmio_base: u32,
}

impl PciConfig {
    pub fn new(chip: ChipType, has_bios: bool) -> Self {
        let caps = chip.capabilities();
        Self {
            device_id: caps.pci_device_id,
            base_mask: caps.pci_base_mask,
            has_bios,
            command: 0x83,
            rom_control: 0,
            rom_base_lo: 0x0C,
            rom_base_hi: 0,
            int_line: 0,
            linear_base: 0,
            mmio_base: 0,
        }
    }

    pub fn command(&self) -> u8 {
        self.command
    }

    pub fn memory_enabled(&self) -> bool {
        self.command & PCI_COMMAND_MEM != 0
    }

    pub fn io_enabled(&self) -> bool {
        self.command & PCI_COMMAND_IO != 0
    }

    /// The expansion ROM window, when a ROM is fitted and enabled.
    pub fn rom_aperture(&self) -> Option<Aperture> {
        if self.has_bios && self.rom_control & 0x01 != 0 {
            let base = ((self.rom_base_lo as u32) << 16) | ((self.rom_base_hi as u32) << 24);
            Some(Aperture::new(base, ROM_SIZE))
        }
        else {
            None
        }
    }

    pub fn read(&self, offset: u8) -> u8 {
        match offset {
            0x00 => PCI_VENDOR_TRIDENT as u8,
            0x01 => (PCI_VENDOR_TRIDENT >> 8) as u8,
            0x02 => self.device_id as u8,
            0x03 => (self.device_id >> 8) as u8,
            PCI_REG_COMMAND => self.command | 0x80,
            // Medium DEVSEL timing
            0x07 => 0x02,
            // VGA compatible display controller
            0x0A => 0x01,
            0x0B => 0x03,
            0x12 => (self.linear_base >> 16) as u8,
            0x13 => (self.linear_base >> 24) as u8,
            0x16 => (self.mmio_base >> 16) as u8,
            0x17 => (self.mmio_base >> 24) as u8,
            0x30 if self.has_bios => self.rom_control & 0x01,
            0x32 if self.has_bios => self.rom_base_lo,
            0x33 if self.has_bios => self.rom_base_hi,
            0x3C => self.int_line,
            0x3D => PCI_INTA,
            _ => 0,
        }
    }

    pub fn write(&mut self, offset: u8, data: u8) -> PciWriteEffect {
        // Bits of the base registers below the top byte that survive a write
        // to the top byte.
        let low_keep = (self.base_mask as u32) << 16;
        match offset {
            PCI_REG_COMMAND => {
                self.command = data & PCI_COMMAND_WRITABLE;
                PciWriteEffect::Command {
                    io_enabled: data & PCI_COMMAND_IO != 0,
                }
            }
            0x12 => {
                self.linear_base = (self.linear_base & 0xFF00_0000) | (((data & self.base_mask) as u32) << 16);
                PciWriteEffect::LinearBaseMoved
            }
            0x13 => {
                self.linear_base = (self.linear_base & low_keep) | ((data as u32) << 24);
                PciWriteEffect::LinearBaseMoved
            }
            0x16 => {
                self.mmio_base = (self.mmio_base & 0xFF00_0000) | (((data & self.base_mask) as u32) << 16);
                PciWriteEffect::MmioBaseMoved
            }
            0x17 => {
                self.mmio_base = (self.mmio_base & low_keep) | ((data as u32) << 24);
                PciWriteEffect::MmioBaseMoved
            }
            0x30 | 0x32 | 0x33 if self.has_bios => {
                match offset {
                    0x30 => self.rom_control = data,
                    0x32 => self.rom_base_lo = data,
                    _ => self.rom_base_hi = data,
                }
                PciWriteEffect::RomMoved
            }
            0x3C => {
                self.int_line = data;
                PciWriteEffect::None
            }
            _ => PciWriteEffect::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let pci = PciConfig::new(ChipType::Tgui9440, true);
        let id: Vec<u8> = (0..4).map(|i| pci.read(i)).collect();
        assert_eq!(id, vec![0x23, 0x10, 0x40, 0x94]);
        let pci = PciConfig::new(ChipType::Tgui9680, true);
        assert_eq!((pci.read(2), pci.read(3)), (0x60, 0x96));
        assert_eq!(pci.read(0x0A), 0x01);
        assert_eq!(pci.read(0x0B), 0x03);
        assert_eq!(pci.read(0x3D), 0x01);
        assert_eq!(pci.read(0x08), 0x00);
    }

    #[test]
    fn test_command_register() {
        let mut pci = PciConfig::new(ChipType::Tgui9440, true);
        assert_eq!(pci.read(PCI_REG_COMMAND), 0x83);
        assert_eq!(pci.write(PCI_REG_COMMAND, 0xFE), PciWriteEffect::Command { io_enabled: false });
        assert_eq!(pci.command(), 0x22);
        assert_eq!(pci.read(PCI_REG_COMMAND), 0xA2);
        assert!(pci.memory_enabled() && !pci.io_enabled());
    }

    #[test]
    fn test_linear_base_masking() {
        let mut pci = PciConfig::new(ChipType::Tgui9440, true);
        pci.write(0x13, 0xE4);
        pci.write(0x12, 0xFF);
        assert_eq!(pci.linear_base, 0xE4E0_0000);
        assert_eq!(pci.read(0x12), 0xE0);
        assert_eq!(pci.read(0x13), 0xE4);
        pci.write(0x13, 0xF0);
        assert_eq!(pci.linear_base, 0xF0E0_0000);

        let mut pci = PciConfig::new(ChipType::Tgui9660, true);
        pci.write(0x12, 0xFF);
        assert_eq!(pci.linear_base, 0x00C0_0000);
        assert_eq!(pci.write(0x17, 0xD0), PciWriteEffect::MmioBaseMoved);
        assert_eq!(pci.read(0x17), 0xD0);
    }

    #[test]
    fn test_rom_window() {
        let mut pci = PciConfig::new(ChipType::Tgui9440, true);
        assert_eq!(pci.rom_aperture(), None);
        assert_eq!(pci.read(0x32), 0x0C);
        pci.write(0x33, 0xFE);
        assert_eq!(pci.write(0x30, 0xFF), PciWriteEffect::RomMoved);
        assert_eq!(pci.read(0x30), 0x01);
        assert_eq!(pci.rom_aperture(), Some(Aperture::new(0xFE0C_0000, ROM_SIZE)));

        let mut onboard = PciConfig::new(ChipType::Tgui9440, false);
        assert_eq!(onboard.write(0x30, 0x01), PciWriteEffect::None);
        assert_eq!(onboard.read(0x32), 0);
        assert_eq!(onboard.rom_aperture(), None);
    }

    #[test]
    fn test_interrupt_line() {
        let mut pci = PciConfig::new(ChipType::Tgui9660, false);
        pci.write(0x3C, 0x0B);
        assert_eq!(pci.read(0x3C), 0x0B);
    }
}
