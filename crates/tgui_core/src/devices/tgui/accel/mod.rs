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

    devices::tgui::accel::mod.rs

    The graphics engine (GER) of the 9440 and later chips: a byte-wide register
    file at 0x2120-0x21FF and the command state machine that drives the
    drawing engine. The same register file is reached through I/O ports, the
    accelerator aperture and the MMIO window.

*/

pub mod engine;
pub mod pattern;
pub mod regs;
pub mod rop;

use crate::{
    device_types::tgui::Capabilities,
    devices::tgui::{
        trace,
        vram::{PixelSize, Vram},
    },
    tracelogger::TraceLogger,
};
use engine::{BlitJob, BlitSource, Command, EngineCaps, JobStatus, LineKind};
use regs::{AccelRegisters, RegisterEffect, GER_COMMAND};

/// Display state the engine reads when a command starts.
#[derive(Copy, Clone, Debug)]
pub struct EngineContext {
    pub rowoffset: u32,
    pub display_bpp: u32,
}

#[derive(Clone, Debug, Default)]
pub enum CommandState {
    #[default]
    Idle,
    /// A CPU-sourced BitBLT waiting for the host to write source data
    /// through the linear aperture.
    AwaitingCpuData(Box<BlitJob>),
}

pub struct Accelerator {
    pub regs: AccelRegisters,
    caps: EngineCaps,
    pixel_size: PixelSize,
    state: CommandState,
    pub trace_logger: TraceLogger,
}

impl Accelerator {
    pub fn new(caps: &Capabilities, trace_logger: TraceLogger) -> Self {
        Self {
            regs: AccelRegisters::default(),
            caps: EngineCaps {
                clip_policy: caps.clip_policy,
                tracks_blit_cursor: caps.tracks_blit_cursor,
                has_fastline: caps.has_fastline,
            },
            pixel_size: PixelSize::default(),
            state: CommandState::Idle,
            trace_logger,
        }
    }

    pub fn pixel_size(&self) -> PixelSize {
        self.pixel_size
    }

    /// Follow the display depth. Depths without an engine equivalent leave the
    /// pixel size unchanged.
    pub fn sync_pixel_size(&mut self, display_bpp: u32) {
        if let Some(size) = PixelSize::from_display_bpp(display_bpp) {
            self.pixel_size = size;
        }
    }

    pub fn state(&self) -> &CommandState {
        &self.state
    }

    #[inline]
    pub fn awaiting_cpu_data(&self) -> bool {
        matches!(self.state, CommandState::AwaitingCpuData(_))
    }

    pub fn read_u8(&self, port: u16) -> u8 {
        self.regs.read_u8(port)
    }

    pub fn read_u16(&self, port: u16) -> u16 {
        u16::from_le_bytes([self.read_u8(port), self.read_u8(port.wrapping_add(1))])
    }

    pub fn read_u32(&self, port: u16) -> u32 {
        self.read_u16(port) as u32 | (self.read_u16(port.wrapping_add(2)) as u32) << 16
    }

    pub fn write_u8(&mut self, port: u16, data: u8, vram: &mut Vram, ctx: EngineContext) {
        match self.regs.write_u8(port, data) {
            RegisterEffect::None => {}
            RegisterEffect::ModeWritten => self.sync_pixel_size(ctx.display_bpp),
            RegisterEffect::StartCommand => self.start_command(vram, ctx),
        }
    }

    pub fn write_u16(&mut self, port: u16, data: u16, vram: &mut Vram, ctx: EngineContext) {
        for (i, byte) in data.to_le_bytes().iter().enumerate() {
            self.write_u8(port.wrapping_add(i as u16), *byte, vram, ctx);
        }
    }

    /// A long write to the command register carries the ROP in its top byte and
    /// latches it before the command starts.
    pub fn write_u32(&mut self, port: u16, data: u32, vram: &mut Vram, ctx: EngineContext) {
        if port == GER_COMMAND {
            self.regs.set_rop((data >> 24) as u8);
            self.regs.command = data as u8;
            self.start_command(vram, ctx);
            return;
        }
        for (i, byte) in data.to_le_bytes().iter().enumerate() {
            self.write_u8(port.wrapping_add(i as u16), *byte, vram, ctx);
        }
    }

    /// Begin the command in the command register. Anything still in flight is
    /// dropped.
    pub fn start_command(&mut self, vram: &mut Vram, ctx: EngineContext) {
        self.state = CommandState::Idle;
        self.regs.pattern_32_idx = 0;

        let Some(command) = Command::from_code(self.regs.command) else {
            log::debug!("Ignoring accelerator command {:02X}", self.regs.command);
            return;
        };

        let size = self.pixel_size;
        let pitch = engine::pitch(ctx.rowoffset, ctx.display_bpp);
        trace!(
            self,
            "GER {:?}: rop:{:02X} flags:{:08X} src:({},{}) dst:({},{}) size:({},{}) fg:{:08X} bg:{:08X} pitch:{} {:?}",
            command,
            self.regs.rop,
            self.regs.flags,
            self.regs.src_x,
            self.regs.src_y,
            self.regs.dst_x,
            self.regs.dst_y,
            self.regs.size_x,
            self.regs.size_y,
            self.regs.fg_color,
            self.regs.bg_color,
            pitch,
            size
        );

        match command {
            Command::BitBlt => {
                let mut job = BlitJob::new(&self.regs, &self.caps, size, pitch);
                if job.params.source == BlitSource::Display || !job.params.use_src {
                    job.run_to_completion(vram);
                }
                else {
                    self.state = CommandState::AwaitingCpuData(Box::new(job));
                }
            }
            Command::Scanline => {
                let mut job = BlitJob::new(&self.regs, &self.caps, size, pitch);
                job.run_scanline(vram);
            }
            Command::BresenhamLine => {
                engine::draw_line(&mut self.regs, &self.caps, size, pitch, vram, LineKind::Bresenham);
            }
            Command::ShortVector => {
                engine::draw_line(&mut self.regs, &self.caps, size, pitch, vram, LineKind::ShortVector);
            }
            Command::FastLine => {
                if self.caps.has_fastline {
                    engine::draw_line(&mut self.regs, &self.caps, size, pitch, vram, LineKind::Fast);
                }
            }
        }
    }

    /// Pass host data to a waiting blit. `data` holds the first pixel in its
    /// most significant bits; `bits` is 8, 16 or 32.
    pub fn feed_cpu_data(&mut self, vram: &mut Vram, bits: i32, data: u32) {
        // Host data restarts the sequential 32bpp pattern load.
        self.regs.pattern_32_idx = 0;
        if let CommandState::AwaitingCpuData(job) = &mut self.state {
            if job.feed(vram, bits, data) == JobStatus::Complete {
                trace!(self, "GER: CPU blit complete");
                self.state = CommandState::Idle;
            }
        }
    }
}
