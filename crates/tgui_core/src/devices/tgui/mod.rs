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

    devices::tgui::mod.rs

    Implementation of the Trident TGUI family of SVGA accelerators: the
    9400CXi, 9440AGi, 9660XGi and 9680XGi.

    The card owns its video memory and register state. Port traffic is
    handled in io.rs and memory traffic in mmio.rs; both funnel into the
    register handlers here. Display timing, render mode, interrupt and
    memory map changes are reported through the TguiHost trait.

*/

pub mod accel;
pub mod cursor;
pub mod ext_write;
pub mod io;
pub mod mapping;
pub mod mmio;
pub mod pci;
pub mod ramdac;
pub mod timings;
pub mod vga_regs;
pub mod vram;

macro_rules! trace {
    ($self:ident, $($t:tt)*) => {{
        if $self.trace_logger.is_some() {
            $self.trace_logger.println(&format!($($t)*));
        }
    }};
}

pub(crate) use trace;

use std::path::Path;

use crate::{
    bus::BusTimings,
    config::TguiConfig,
    device_traits::svga_host::TguiHost,
    device_types::tgui::{BusType, Capabilities, ChipType, TguiModel},
    error::TguiError,
};
use accel::{Accelerator, EngineContext};
use cursor::{CursorLatch, HwCursor};
use ext_write::ExtendedAccess;
use mapping::{Aperture, ApertureMap, MappingInputs, ISA_ROM_BASE, ROM_SIZE};
use pci::{PciConfig, PciWriteEffect};
use ramdac::{HiddenControl, RamdacDispatch};
use timings::{ClockSynth, DisplayTimings, TimingInputs};
use vga_regs::{VgaRegisters, CRTC_LINEAR_ADDRESSING};
use vram::Vram;

/// Banks are selected in 64K units.
pub const BANK_GRANULE: u32 = 0x10000;
pub const DEFAULT_DECODE_MASK: u32 = 0x7F_FFFF;
pub const TGUI_BUS_TIMINGS: BusTimings = BusTimings::uniform(4, 8, 16);

pub struct TguiCard<H: TguiHost> {
    model: TguiModel,
    chip: ChipType,
    caps: Capabilities,
    host: H,

    regs: VgaRegisters,
    ramdac: RamdacDispatch,
    accel: Accelerator,
    vram: Vram,
    ext: ExtendedAccess,
    pci: PciConfig,
    clock: ClockSynth,
    rom: Option<Vec<u8>>,

    // Sequencer 0x0B selects between the old and new definitions of the
    // mode control registers.
    oldmode: bool,
    oldctrl1: u8,
    oldctrl2: u8,
    newctrl2: u8,
    bank_3d8: u8,
    bank_3d9: u8,
    alt_clock: u8,
    read_bank: u32,
    write_bank: u32,

    linear_base: u32,
    linear_size: u32,
    decode_mask: u32,
    ge_base: u32,
    irq_asserted: bool,

    cursor: HwCursor,
    cursor_latch: Option<CursorLatch>,
    apertures: ApertureMap,
    timings: DisplayTimings,
}

impl<H: TguiHost> TguiCard<H> {
    pub fn new(config: &TguiConfig, host: H) -> Result<Self, TguiError> {
        let vram_size = config.vram_size()?;
        let model = config.model;
        let chip = model.chip();
        let caps = chip.capabilities();

        let mut card = Self {
            model,
            chip,
            caps,
            host,
            regs: VgaRegisters::default(),
            ramdac: RamdacDispatch::new(caps.ramdac),
            accel: Accelerator::new(&caps, config.trace_logger()),
            vram: Vram::new(vram_size),
            ext: ExtendedAccess::default(),
            pci: PciConfig::new(chip, model.has_bios()),
            clock: ClockSynth::default(),
            rom: None,
            oldmode: false,
            oldctrl1: 0,
            oldctrl2: 0,
            newctrl2: 0,
            bank_3d8: 0,
            bank_3d9: 0,
            alt_clock: 0,
            read_bank: 0,
            write_bank: 0,
            linear_base: 0,
            linear_size: 0,
            decode_mask: DEFAULT_DECODE_MASK,
            ge_base: 0,
            irq_asserted: false,
            cursor: HwCursor::default(),
            cursor_latch: None,
            apertures: ApertureMap::default(),
            timings: DisplayTimings::default(),
        };

        if vram_size == 2 << 20 {
            card.regs.crtc[CRTC_LINEAR_ADDRESSING as usize] |= 0x10;
        }

        log::debug!("{}: {} KB video memory on {:?} bus", model, vram_size >> 10, model.bus());
        card.remap();
        card.recalc_timings();
        Ok(card)
    }

    pub fn from_config_file<P: AsRef<Path>>(path: P, host: H) -> anyhow::Result<Self> {
        let config = TguiConfig::from_file(path)?;
        Ok(Self::new(&config, host)?)
    }

    pub fn model(&self) -> TguiModel {
        self.model
    }

    pub fn chip(&self) -> ChipType {
        self.chip
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.caps
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn registers(&self) -> &VgaRegisters {
        &self.regs
    }

    pub fn accelerator(&self) -> &Accelerator {
        &self.accel
    }

    pub fn vram(&self) -> &Vram {
        &self.vram
    }

    pub fn vram_mut(&mut self) -> &mut Vram {
        &mut self.vram
    }

    /// Pages (4K) of video memory written since the last clear.
    pub fn dirty_pages(&self) -> impl Iterator<Item = usize> + '_ {
        self.vram.dirty_pages()
    }

    pub fn clear_dirty(&mut self) {
        self.vram.clear_dirty();
    }

    pub fn force_redraw(&mut self) {
        self.vram.mark_all_dirty();
    }

    /// The host's video timing base changed.
    pub fn speed_changed(&mut self) {
        self.recalc_timings();
    }

    #[inline]
    pub fn awaiting_cpu_data(&self) -> bool {
        self.accel.awaiting_cpu_data()
    }

    pub fn apertures(&self) -> &ApertureMap {
        &self.apertures
    }

    pub fn timings(&self) -> &DisplayTimings {
        &self.timings
    }

    pub fn read_bank(&self) -> u32 {
        self.read_bank
    }

    pub fn write_bank(&self) -> u32 {
        self.write_bank
    }

    pub fn pci_config(&self) -> &PciConfig {
        &self.pci
    }

    pub fn pci_read(&self, offset: u8) -> u8 {
        if !self.is_pci() {
            return 0xFF;
        }
        self.pci.read(offset)
    }

    pub fn pci_write(&mut self, offset: u8, data: u8) {
        if !self.is_pci() {
            return;
        }
        match self.pci.write(offset, data) {
            PciWriteEffect::None => {}
            PciWriteEffect::Command { io_enabled } => {
                log::debug!(
                    "{}: PCI command {:02X}, I/O decode {}",
                    self.model,
                    self.pci.command(),
                    if io_enabled { "on" } else { "off" }
                );
                self.remap();
            }
            PciWriteEffect::LinearBaseMoved => {
                self.linear_size = self.vram.len() as u32;
                self.decode_mask = self.vram.mask() as u32;
                self.remap();
            }
            PciWriteEffect::MmioBaseMoved | PciWriteEffect::RomMoved => self.remap(),
        }
    }

    /// Install the option ROM image. Boards without a ROM socket ignore it.
    pub fn load_rom(&mut self, image: Vec<u8>) {
        if !self.model.has_bios() {
            log::warn!("{} has no option ROM socket; ignoring ROM image", self.model);
            return;
        }
        self.rom = Some(image);
    }

    pub fn cursor(&self) -> &HwCursor {
        &self.cursor
    }

    /// Snapshot the cursor at the start of a frame.
    pub fn latch_cursor(&mut self) {
        self.cursor_latch = (self.caps.has_hw_cursor && self.cursor.enabled).then(|| self.cursor.latch());
    }

    /// Overlay one row of the latched cursor onto a rendered scanline.
    pub fn draw_cursor_line(&mut self, line: &mut [u32], x_add: usize, odd_field: bool) {
        if let Some(latch) = &mut self.cursor_latch {
            latch.draw_line(&self.vram, line, x_add, self.timings.interlace, odd_field);
        }
    }

    #[inline]
    fn is_pci(&self) -> bool {
        self.model.bus() == BusType::Pci
    }

    fn engine_context(&self) -> EngineContext {
        EngineContext {
            rowoffset: self.timings.rowoffset,
            display_bpp: self.timings.bpp,
        }
    }

    /// Control 1 in its current definition: old control 1 in old mode,
    /// sequencer 0x0E otherwise.
    fn mode_control_1(&self) -> u8 {
        if self.oldmode {
            self.oldctrl1
        }
        else {
            self.regs.seq[vga_regs::SEQ_MODE_CONTROL_1 as usize]
        }
    }

    fn separate_read_bank(&self) -> bool {
        self.regs.gdc[vga_regs::GDC_BANK_CONTROL as usize] & 0x01 != 0
    }

    fn update_irq(&mut self) {
        if !self.is_pci() {
            return;
        }
        let asserted = self.oldctrl1 & 0x40 == 0;
        if asserted != self.irq_asserted {
            log::trace!("{}: INTA {}", self.model, if asserted { "asserted" } else { "cleared" });
        }
        self.irq_asserted = asserted;
        self.host.set_irq(asserted);
    }

    fn rom_aperture(&self) -> Option<Aperture> {
        if !self.model.has_bios() {
            return None;
        }
        if self.is_pci() {
            self.pci.rom_aperture()
        }
        else {
            Some(Aperture::new(ISA_ROM_BASE, ROM_SIZE))
        }
    }

    /// Recompute the aperture layout and tell the host if it moved.
    pub(crate) fn remap(&mut self) {
        let (linear_base, mmio_base) = if self.is_pci() {
            (self.pci.linear_base, self.pci.mmio_base)
        }
        else {
            (self.linear_base, 0)
        };
        let map = ApertureMap::compute(&MappingInputs {
            chip: self.chip,
            bus: self.model.bus(),
            regs: &self.regs,
            pci_command: self.pci.command(),
            linear_base,
            linear_size: self.linear_size,
            ge_base: self.ge_base,
            mmio_base,
            rom: self.rom_aperture(),
        });
        if map != self.apertures {
            log::debug!(
                "{}: remap banked:{:X?} linear:{:X?} accel:{:X?} mmio:{:X?} rom:{:X?}",
                self.model,
                map.banked,
                map.linear,
                map.accel,
                map.mmio,
                map.rom
            );
            self.apertures = map;
            self.host.mapping_changed(&self.apertures);
        }
    }

    pub(crate) fn recalc_timings(&mut self) {
        self.timings = DisplayTimings::compute(&TimingInputs {
            chip: self.chip,
            regs: &self.regs,
            ramdac_depth: self.ramdac.depth(),
            oldctrl2: self.oldctrl2,
            newctrl2: self.newctrl2,
            ger22: self.accel.regs.ger22,
            clock: self.clock,
            vram_mask: self.vram.mask() as u32,
        });
        self.accel.sync_pixel_size(self.timings.bpp);
        self.host.recalc_timings(&self.timings);
        self.host.set_render_mode(self.timings.render_mode);
    }

    /// Reload the cursor position after a write to CRTC 0x40-0x47.
    fn update_cursor_position(&mut self) {
        let mut scale = 1;
        if self.accel.regs.ger22 & 0xFF == 8 && self.timings.bpp != 24 {
            self.recalc_timings();
            scale = self.caps.cursor_scale_factor;
            if self.timings.vdisp == 1022 && self.timings.interlace {
                scale = 1;
            }
        }
        self.cursor.update_position(&self.regs.crtc, scale);
    }
}
