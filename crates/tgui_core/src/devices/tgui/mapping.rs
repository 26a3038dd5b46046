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

    devices::tgui::mapping.rs

    Resolution of the card's memory apertures. The layout is recomputed
    from scratch from register state whenever a register that affects it
    is written, so the result only depends on the inputs.

*/

use crate::{
    device_types::tgui::{BusType, ChipType},
    devices::tgui::vga_regs::{
        AcceleratorWindow,
        VgaRegisters,
        CRTC_LINEAR_ADDRESSING,
        CRTC_MMIO_CONTROL,
    },
};

pub const ACCEL_APERTURE_SIZE: u32 = 0x4000;
pub const MMIO_APERTURE_SIZE: u32 = 0x10000;
pub const ROM_SIZE: u32 = 0x8000;
pub const ISA_ROM_BASE: u32 = 0xC0000;

const PCI_COMMAND_MEM: u8 = 0x02;
const LINEAR_ENABLE: u8 = 0x20;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Aperture {
    pub base: u32,
    pub size: u32,
}

impl Aperture {
    pub fn new(base: u32, size: u32) -> Self {
        Self { base, size }
    }

    #[inline]
    pub fn contains(&self, address: u32) -> bool {
        address >= self.base && (address - self.base) < self.size
    }
}

/// Which access paths the banked and linear windows route through.
/// Only the 9400CXi ever selects the extended paths.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct AccessHandlers {
    pub ext_read: bool,
    pub ext_write: bool,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ApertureMap {
    pub banked: Option<Aperture>,
    pub banked_mask: u32,
    pub linear: Option<Aperture>,
    pub accel: Option<Aperture>,
    pub mmio: Option<Aperture>,
    pub rom: Option<Aperture>,
    pub handlers: AccessHandlers,
}

pub struct MappingInputs<'a> {
    pub chip: ChipType,
    pub bus: BusType,
    pub regs: &'a VgaRegisters,
    pub pci_command: u8,
    pub linear_base: u32,
    pub linear_size: u32,
    pub ge_base: u32,
    pub mmio_base: u32,
    /// ROM placement, already resolved by the bus interface.
    pub rom: Option<Aperture>,
}

impl ApertureMap {
    pub fn compute(input: &MappingInputs) -> Self {
        let regs = input.regs;
        let mut map = ApertureMap {
            rom: input.rom,
            ..Default::default()
        };

        if input.chip == ChipType::Tgui9400Cxi {
            let ctrl = regs.ext_write_control();
            if ctrl.latch_copy() {
                map.handlers = AccessHandlers {
                    ext_read: true,
                    ext_write: true,
                };
            }
            else if ctrl.mono_expansion() {
                map.handlers.ext_write = true;
            }
        }

        if input.bus == BusType::Pci && (input.pci_command & PCI_COMMAND_MEM) == 0 {
            return map;
        }

        let (window_base, window_size, window_mask) = regs.memory_map().window();
        let banked_window = Aperture::new(window_base, window_size);
        let accel_window = match regs.accel_window() {
            AcceleratorWindow::MmioOnly => None,
            AcceleratorWindow::B4000 => Some(Aperture::new(0xB4000, ACCEL_APERTURE_SIZE)),
            AcceleratorWindow::BC000 => Some(Aperture::new(0xBC000, ACCEL_APERTURE_SIZE)),
            AcceleratorWindow::GeBase => Some(Aperture::new(input.ge_base, ACCEL_APERTURE_SIZE)),
        };
        let linear_window = Aperture::new(input.linear_base, input.linear_size);

        if regs.crtc[CRTC_LINEAR_ADDRESSING as usize] & LINEAR_ENABLE != 0 {
            map.linear = Some(linear_window);
            if input.chip.is_9440_or_later() {
                map.accel = accel_window;
            }
            else {
                map.banked = Some(banked_window);
                map.banked_mask = window_mask;
            }
        }
        else {
            map.banked = Some(banked_window);
            map.banked_mask = window_mask;
            if input.bus == BusType::Pci && input.linear_base != 0 {
                map.linear = Some(linear_window);
            }
            map.accel = accel_window;
        }

        if input.chip.is_9440_or_later()
            && input.mmio_base != 0
            && regs.crtc[CRTC_MMIO_CONTROL as usize] & 0x01 != 0
        {
            map.mmio = Some(Aperture::new(input.mmio_base, MMIO_APERTURE_SIZE));
        }

        map
    }

    /// Whether any aperture claims `address`.
    pub fn decodes(&self, address: u32) -> bool {
        [self.banked, self.linear, self.accel, self.mmio, self.rom]
            .iter()
            .flatten()
            .any(|a| a.contains(address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::tgui::vga_regs::{CRTC_APERTURE_CONTROL, GDC_EXT_WRITE_CONTROL, GDC_MISC};

    fn inputs(chip: ChipType, bus: BusType, regs: &VgaRegisters) -> MappingInputs<'_> {
        MappingInputs {
            chip,
            bus,
            regs,
            pci_command: 0x83,
            linear_base: 0xE000_0000,
            linear_size: 0x20_0000,
            ge_base: 0x00D0_0000,
            mmio_base: 0x0001_0000,
            rom: None,
        }
    }

    #[test]
    fn test_banked_windows() {
        let mut regs = VgaRegisters::default();
        let expected = [
            (0x00, 0xA0000, 0x20000, 0xFFFF),
            (0x04, 0xA0000, 0x10000, 0xFFFF),
            (0x08, 0xB0000, 0x08000, 0x7FFF),
            (0x0C, 0xB8000, 0x08000, 0x7FFF),
        ];
        for (gdc6, base, size, mask) in expected {
            regs.gdc[GDC_MISC as usize] = gdc6;
            let map = ApertureMap::compute(&inputs(ChipType::Tgui9440, BusType::Vlb, &regs));
            assert_eq!(map.banked, Some(Aperture::new(base, size)));
            assert_eq!(map.banked_mask, mask);
            assert_eq!(map.linear, None);
        }
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let mut regs = VgaRegisters::default();
        regs.gdc[GDC_MISC as usize] = 0x04;
        regs.crtc[CRTC_APERTURE_CONTROL as usize] = 0x02;
        let input = inputs(ChipType::Tgui9440, BusType::Pci, &regs);
        assert_eq!(ApertureMap::compute(&input), ApertureMap::compute(&input));
    }

    #[test]
    fn test_pci_memory_disable_restores() {
        let mut regs = VgaRegisters::default();
        regs.crtc[CRTC_MMIO_CONTROL as usize] = 0x01;
        let mut input = inputs(ChipType::Tgui9660, BusType::Pci, &regs);
        let enabled = ApertureMap::compute(&input);
        assert!(enabled.banked.is_some() && enabled.linear.is_some() && enabled.mmio.is_some());

        input.pci_command = 0x01;
        let disabled = ApertureMap::compute(&input);
        assert_eq!(disabled.banked, None);
        assert_eq!(disabled.linear, None);
        assert_eq!(disabled.accel, None);
        assert_eq!(disabled.mmio, None);

        input.pci_command = 0x03;
        assert_eq!(ApertureMap::compute(&input), enabled);
    }

    #[test]
    fn test_linear_mode() {
        let mut regs = VgaRegisters::default();
        regs.crtc[CRTC_LINEAR_ADDRESSING as usize] = 0x20;
        regs.crtc[CRTC_APERTURE_CONTROL as usize] = 0x03;

        let map = ApertureMap::compute(&inputs(ChipType::Tgui9440, BusType::Vlb, &regs));
        assert_eq!(map.banked, None);
        assert_eq!(map.linear, Some(Aperture::new(0xE000_0000, 0x20_0000)));
        assert_eq!(map.accel, Some(Aperture::new(0x00D0_0000, ACCEL_APERTURE_SIZE)));

        // The 9400CXi keeps its banked window alongside the linear one.
        let map = ApertureMap::compute(&inputs(ChipType::Tgui9400Cxi, BusType::Vlb, &regs));
        assert_eq!(map.banked, Some(Aperture::new(0xA0000, 0x20000)));
        assert_eq!(map.accel, None);
        assert_eq!(map.mmio, None);
    }

    #[test]
    fn test_accel_aperture_modes() {
        let mut regs = VgaRegisters::default();
        let expected = [
            (0x00, None),
            (0x01, Some(0xB4000)),
            (0x02, Some(0xBC000)),
            (0x03, Some(0x00D0_0000)),
        ];
        for (mode, base) in expected {
            regs.crtc[CRTC_APERTURE_CONTROL as usize] = mode;
            let map = ApertureMap::compute(&inputs(ChipType::Tgui9440, BusType::Vlb, &regs));
            assert_eq!(map.accel, base.map(|b| Aperture::new(b, ACCEL_APERTURE_SIZE)));
        }
    }

    #[test]
    fn test_pci_linear_always_mapped() {
        let regs = VgaRegisters::default();
        let mut input = inputs(ChipType::Tgui9440, BusType::Pci, &regs);
        assert!(ApertureMap::compute(&input).linear.is_some());
        input.linear_base = 0;
        assert!(ApertureMap::compute(&input).linear.is_none());
        input.bus = BusType::Vlb;
        input.linear_base = 0xE000_0000;
        assert!(ApertureMap::compute(&input).linear.is_none());
    }

    #[test]
    fn test_mmio_requires_enable() {
        let mut regs = VgaRegisters::default();
        let map = ApertureMap::compute(&inputs(ChipType::Tgui9440, BusType::Pci, &regs));
        assert_eq!(map.mmio, None);
        regs.crtc[CRTC_MMIO_CONTROL as usize] = 0x01;
        let map = ApertureMap::compute(&inputs(ChipType::Tgui9440, BusType::Pci, &regs));
        assert_eq!(map.mmio, Some(Aperture::new(0x10000, MMIO_APERTURE_SIZE)));
        assert!(map.decodes(0x1FFFF));
        assert!(!map.decodes(0x20000));
    }

    #[test]
    fn test_9400_handlers() {
        let mut regs = VgaRegisters::default();
        regs.gdc[GDC_EXT_WRITE_CONTROL as usize] = 0x08;
        let map = ApertureMap::compute(&inputs(ChipType::Tgui9400Cxi, BusType::Vlb, &regs));
        assert_eq!(map.handlers, AccessHandlers { ext_read: true, ext_write: true });

        regs.gdc[GDC_EXT_WRITE_CONTROL as usize] = 0x02;
        let map = ApertureMap::compute(&inputs(ChipType::Tgui9400Cxi, BusType::Vlb, &regs));
        assert_eq!(map.handlers, AccessHandlers { ext_read: false, ext_write: true });

        let map = ApertureMap::compute(&inputs(ChipType::Tgui9440, BusType::Vlb, &regs));
        assert_eq!(map.handlers, AccessHandlers::default());
    }
}
