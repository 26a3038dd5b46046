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

    devices::tgui::accel::engine.rs

    Drawing engine. BitBLT and scanline commands walk a rectangle through a
    saved cursor so a CPU-sourced blit can stop after each host write and pick
    up again on the next one. Line commands always run to completion when
    they start.

*/

use super::{
    pattern::Pattern,
    regs::{AccelFlags, AccelRegisters},
    rop,
};
use crate::{
    device_types::tgui::ClipPolicy,
    devices::tgui::vram::{PixelSize, Vram},
};

pub const CMD_BITBLT: u8 = 0x01;
pub const CMD_SCANLINE: u8 = 0x03;
pub const CMD_BRESENHAM_LINE: u8 = 0x04;
pub const CMD_SHORT_VECTOR: u8 = 0x05;
pub const CMD_FAST_LINE: u8 = 0x06;

/// Coordinates and clip bounds are 12 bits wide inside the engine.
const COORD_MASK: i32 = 0xFFF;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Command {
    BitBlt,
    Scanline,
    BresenhamLine,
    ShortVector,
    FastLine,
}

impl Command {
    pub fn from_code(code: u8) -> Option<Command> {
        match code {
            CMD_BITBLT => Some(Command::BitBlt),
            CMD_SCANLINE => Some(Command::Scanline),
            CMD_BRESENHAM_LINE => Some(Command::BresenhamLine),
            CMD_SHORT_VECTOR => Some(Command::ShortVector),
            CMD_FAST_LINE => Some(Command::FastLine),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BlitSource {
    /// Native pixels written by the host through the linear aperture.
    Cpu,
    /// One bit per pixel written by the host, expanded with fg/bg.
    CpuMono,
    Display,
}

impl BlitSource {
    pub fn from_flags(flags: AccelFlags) -> Self {
        match (flags.src_mono(), flags.src_display()) {
            (false, false) => BlitSource::Cpu,
            (true, false) => BlitSource::CpuMono,
            _ => BlitSource::Display,
        }
    }
}

/// Generation-specific engine behaviour.
#[derive(Copy, Clone, Debug)]
pub struct EngineCaps {
    pub clip_policy: ClipPolicy,
    /// Advance the clip-test position with the destination during CPU-sourced blits.
    pub tracks_blit_cursor: bool,
    pub has_fastline: bool,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ClipRect {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

impl ClipRect {
    /// The source clip registers hold the top-left corner and the destination
    /// clip registers the bottom-right. Horizontal bounds are programmed in
    /// bytes.
    pub fn from_regs(regs: &AccelRegisters, size: PixelSize) -> Self {
        let hshift = match size {
            PixelSize::Byte => 0,
            PixelSize::Word => 1,
            PixelSize::Dword => 2,
        };
        ClipRect {
            left: (regs.src_x_clip as i32 & COORD_MASK) >> hshift,
            right: (regs.dst_x_clip as i32 & COORD_MASK) >> hshift,
            top: regs.src_y_clip as i32 & COORD_MASK,
            bottom: regs.dst_y_clip as i32 & COORD_MASK,
        }
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }
}

/// Scanline stride in pixels for the current display row offset and depth.
pub fn pitch(rowoffset: u32, display_bpp: u32) -> i32 {
    let rowoffset = rowoffset as i32;
    match display_bpp {
        8 | 24 => rowoffset << 3,
        15 | 16 => rowoffset << 2,
        32 => rowoffset << 1,
        _ => rowoffset,
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum JobStatus {
    /// Waiting for more host data.
    Suspended,
    Complete,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Advance {
    SameRow,
    NextRow,
    Complete,
}

/// Values latched from the register file when a rectangle command starts.
#[derive(Clone, Debug)]
pub struct BlitParams {
    pub source: BlitSource,
    pub size: PixelSize,
    pub pitch: i32,
    pub xdir: i32,
    pub ydir: i32,
    pub rop: u8,
    pub use_src: bool,
    pub fg_color: u32,
    pub bg_color: u32,
    pub trans_color: u32,
    pub transparent: bool,
    pub pattern_mono: bool,
    pub force_pattern: bool,
    pub mono_skip: u32,
    pub width: i32,
    pub height: i32,
    pub dst_x: i32,
    pub clip: ClipRect,
    pub clip_policy: ClipPolicy,
    pub tracks_cursor: bool,
}

/// Position within a rectangle command. Offsets are in pixels.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct BlitCursor {
    pub x: i32,
    pub y: i32,
    pub src: i32,
    pub dst: i32,
    pub src_row: i32,
    pub dst_row: i32,
    pub pat_x: i32,
    pub pat_y: i32,
    /// Destination position used by the clip test.
    pub dx: i32,
    pub dy: i32,
}

/// A BitBLT or scanline command in progress.
#[derive(Clone, Debug)]
pub struct BlitJob {
    pub params: BlitParams,
    pub pattern: Pattern,
    pub cursor: BlitCursor,
}

impl BlitJob {
    pub fn new(regs: &AccelRegisters, caps: &EngineCaps, size: PixelSize, pitch: i32) -> Self {
        let flags = regs.flags();
        let trans_color = if flags.transparent_reverse() {
            regs.fg_color
        }
        else {
            regs.bg_color
        } & size.mask();

        let params = BlitParams {
            source: BlitSource::from_flags(flags),
            size,
            pitch,
            xdir: flags.xdir(),
            ydir: flags.ydir(),
            rop: regs.rop,
            use_src: regs.use_src,
            fg_color: regs.fg_color,
            bg_color: regs.bg_color,
            trans_color,
            transparent: flags.transparent_enable(),
            pattern_mono: flags.pattern_mono(),
            force_pattern: regs.mode().force_pattern(),
            mono_skip: flags.mono_skip() as u32,
            width: regs.size_x as i32,
            height: regs.size_y as i32,
            dst_x: regs.dst_x as i32,
            clip: ClipRect::from_regs(regs, size),
            clip_policy: caps.clip_policy,
            tracks_cursor: caps.tracks_blit_cursor,
        };

        let src = regs.src_x as i32 + regs.src_y as i32 * pitch;
        let dst = regs.dst_x as i32 + regs.dst_y as i32 * pitch;
        let cursor = BlitCursor {
            x: 0,
            y: 0,
            src,
            dst,
            src_row: src,
            dst_row: dst,
            pat_x: regs.dst_x as i32,
            pat_y: regs.dst_y as i32,
            dx: regs.dst_x as i32 & COORD_MASK,
            dy: regs.dst_y as i32 & COORD_MASK,
        };

        BlitJob {
            params,
            pattern: Pattern::decode(regs, flags, size),
            cursor,
        }
    }

    /// Clip gate for CPU-sourced pixels.
    #[inline]
    fn gate(&self) -> bool {
        match self.params.clip_policy {
            ClipPolicy::Inhibited => false,
            ClipPolicy::Unclipped => true,
            ClipPolicy::Clipped => self.params.clip.contains(self.cursor.dx, self.cursor.dy),
        }
    }

    #[inline]
    fn advance(&mut self, track_clip: bool) -> Advance {
        let p = &self.params;
        let c = &mut self.cursor;
        c.src += p.xdir;
        c.dst += p.xdir;
        c.pat_x += p.xdir;
        if track_clip {
            c.dx += p.xdir;
        }
        c.x += 1;
        if c.x <= p.width {
            return Advance::SameRow;
        }

        c.x = 0;
        c.pat_x = p.dst_x;
        c.pat_y += p.ydir;
        if track_clip {
            c.dx = p.dst_x & COORD_MASK;
            c.dy += p.ydir;
        }
        c.src_row += p.ydir * p.pitch;
        c.dst_row += p.ydir * p.pitch;
        c.src = c.src_row;
        c.dst = c.dst_row;
        c.y += 1;
        if c.y > p.height {
            Advance::Complete
        }
        else {
            Advance::NextRow
        }
    }

    #[inline]
    fn mix_pixel(&self, vram: &mut Vram, src: u32, pat: u32) {
        let p = &self.params;
        let dst = vram.read_pixel(p.size, self.cursor.dst);
        vram.write_pixel(p.size, self.cursor.dst, rop::mix(p.rop, dst, pat, src));
    }

    /// Source test used by every path except native CPU data.
    #[inline]
    fn source_passes(&self, src: u32) -> bool {
        !self.params.transparent || src != self.params.trans_color
    }

    /// Native CPU data is tested against the pattern pixel instead of the source.
    #[inline]
    fn pattern_passes(&self, pat: u32) -> bool {
        let p = &self.params;
        !p.pattern_mono || !p.transparent || pat != p.trans_color || p.force_pattern
    }

    /// Run until the rectangle completes. Used for display sources, and for CPU
    /// sources whose ROP ignores the source operand.
    pub fn run_to_completion(&mut self, vram: &mut Vram) -> JobStatus {
        match self.params.source {
            BlitSource::Display => self.run_display(vram),
            BlitSource::Cpu => self.run_cpu(vram, -1, 0),
            BlitSource::CpuMono => self.run_cpu_mono(vram, -1, 0),
        }
    }

    /// Consume one host write of `bits` width. `data` holds the first pixel in its
    /// most significant bits.
    pub fn feed(&mut self, vram: &mut Vram, bits: i32, data: u32) -> JobStatus {
        match self.params.source {
            BlitSource::Cpu => self.run_cpu(vram, bits >> 3, data),
            BlitSource::CpuMono => {
                let (mut count, mut data) = (bits, data);
                if self.cursor.x == 0 {
                    count -= self.params.mono_skip as i32;
                    data <<= self.params.mono_skip;
                }
                self.run_cpu_mono(vram, count, data)
            }
            BlitSource::Display => JobStatus::Complete,
        }
    }

    /// `count` is in bytes; a negative count never runs out. A pixel outside the
    /// clip still costs one count but leaves the data register unshifted.
    fn run_cpu(&mut self, vram: &mut Vram, mut count: i32, mut cpu: u32) -> JobStatus {
        let track = self.params.tracks_cursor;
        while count != 0 {
            if self.gate() {
                let src = match self.params.size {
                    PixelSize::Byte => {
                        let src = cpu >> 24;
                        cpu <<= 8;
                        src
                    }
                    PixelSize::Word => {
                        let src = (cpu >> 24) | ((cpu >> 8) & 0xFF00);
                        cpu <<= 16;
                        count -= 1;
                        src
                    }
                    PixelSize::Dword => {
                        // Only two bytes shift out per 32-bit pixel.
                        let src = (cpu >> 24) | ((cpu >> 8) & 0x0000_FF00) | ((cpu << 8) & 0x00FF_0000);
                        cpu <<= 16;
                        count -= 3;
                        src
                    }
                };
                let pat = self.pattern.pixel(self.cursor.pat_x, self.cursor.pat_y);
                if self.pattern_passes(pat) {
                    self.mix_pixel(vram, src, pat);
                }
            }

            match self.advance(track) {
                Advance::SameRow => {}
                Advance::Complete => return JobStatus::Complete,
                // Each source row starts on a fresh host write.
                Advance::NextRow if self.params.use_src => return JobStatus::Suspended,
                Advance::NextRow => {}
            }
            count -= 1;
        }
        JobStatus::Suspended
    }

    /// `count` is in pixels (bits); a negative count never runs out.
    fn run_cpu_mono(&mut self, vram: &mut Vram, mut count: i32, mut cpu: u32) -> JobStatus {
        let track = self.params.tracks_cursor;
        let mask = self.params.size.mask();
        while count != 0 {
            count -= 1;
            if self.gate() {
                let src = if cpu & 0x8000_0000 != 0 {
                    self.params.fg_color
                }
                else {
                    self.params.bg_color
                } & mask;
                if self.source_passes(src) {
                    let pat = self.pattern.pixel(self.cursor.pat_x, self.cursor.pat_y);
                    self.mix_pixel(vram, src, pat);
                }
            }
            cpu <<= 1;

            match self.advance(track) {
                Advance::SameRow => {}
                Advance::Complete => return JobStatus::Complete,
                Advance::NextRow if self.params.use_src => return JobStatus::Suspended,
                Advance::NextRow => {}
            }
        }
        JobStatus::Suspended
    }

    fn run_display(&mut self, vram: &mut Vram) -> JobStatus {
        loop {
            let src = vram.read_pixel(self.params.size, self.cursor.src);
            if self.source_passes(src) {
                let pat = self.pattern.pixel(self.cursor.pat_x, self.cursor.pat_y);
                self.mix_pixel(vram, src, pat);
            }
            if self.advance(false) == Advance::Complete {
                return JobStatus::Complete;
            }
        }
    }

    /// Draw one row of `width + 1` pixels from display memory.
    pub fn run_scanline(&mut self, vram: &mut Vram) -> JobStatus {
        loop {
            let src = vram.read_pixel(self.params.size, self.cursor.src);
            if self.source_passes(src) {
                let pat = self.pattern.pixel(self.cursor.pat_x, self.cursor.pat_y);
                self.mix_pixel(vram, src, pat);
            }
            if self.advance(false) != Advance::SameRow {
                return JobStatus::Complete;
            }
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LineKind {
    Bresenham,
    ShortVector,
    Fast,
}

/// Step one pixel in one of eight compass directions. Bits 7-5 of the code
/// select the direction counter-clockwise from +x in 45 degree steps, with
/// y growing downwards.
#[inline]
fn compass_step(code: u16, dx: &mut i32, dy: &mut i32) {
    match code & 0xE0 {
        0x00 => *dx += 1,
        0x20 => {
            *dx += 1;
            *dy -= 1;
        }
        0x40 => *dy -= 1,
        0x60 => {
            *dx -= 1;
            *dy -= 1;
        }
        0x80 => *dx -= 1,
        0xA0 => {
            *dx -= 1;
            *dy += 1;
        }
        0xC0 => *dy += 1,
        _ => {
            *dx += 1;
            *dy += 1;
        }
    }
}

/// Draw a line with the foreground colour through the ROP. The Bresenham error
/// term lives in the size x register and is left there when the line ends.
pub fn draw_line(
    regs: &mut AccelRegisters,
    caps: &EngineCaps,
    size: PixelSize,
    pitch: i32,
    vram: &mut Vram,
    kind: LineKind,
) {
    let flags = regs.flags();
    let clip = ClipRect::from_regs(regs, size);
    let octant = flags.direction();
    let fg = regs.fg_color;
    let rop = regs.rop;

    let mut dx = regs.dst_x as i32 & COORD_MASK;
    let mut dy = regs.dst_y as i32 & COORD_MASK;
    let mut steps = match kind {
        LineKind::Bresenham | LineKind::Fast => regs.size_y as i32,
        LineKind::ShortVector => regs.sv_size_y as i32 & COORD_MASK,
    };
    // The fast line takes its direction from the 12-bit size y field, so it
    // always runs along +x.
    let compass = match kind {
        LineKind::ShortVector => regs.sv_size_y >> 8,
        _ => (regs.size_y as u16) >> 8,
    };
    let mut err = regs.size_x;

    loop {
        let visible = match caps.clip_policy {
            ClipPolicy::Inhibited => false,
            ClipPolicy::Unclipped => true,
            ClipPolicy::Clipped => clip.contains(dx, dy),
        };
        if visible {
            let index = dx + dy * pitch;
            let dst = vram.read_pixel(size, index);
            vram.write_pixel(size, index, rop::mix(rop, dst, fg, 0));
        }
        if steps == 0 {
            break;
        }

        match kind {
            LineKind::Bresenham => {
                if err >= 0 {
                    err = err.wrapping_add(regs.src_x);
                    match octant {
                        0 | 2 => dy += 1,
                        1 | 3 => dy -= 1,
                        4 | 5 => dx += 1,
                        _ => dx -= 1,
                    }
                }
                else {
                    err = err.wrapping_add(regs.src_y);
                }
                match octant {
                    0 | 1 => dx += 1,
                    2 | 3 => dx -= 1,
                    4 | 6 => dy += 1,
                    _ => dy -= 1,
                }
            }
            LineKind::ShortVector | LineKind::Fast => compass_step(compass, &mut dx, &mut dy),
        }

        steps -= 1;
        dx &= COORD_MASK;
        dy &= COORD_MASK;
    }

    if kind == LineKind::Bresenham {
        regs.size_x = err;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pitch_by_depth() {
        assert_eq!(pitch(80, 8), 640);
        assert_eq!(pitch(80, 24), 640);
        assert_eq!(pitch(160, 16), 640);
        assert_eq!(pitch(0x140, 32), 640);
        assert_eq!(pitch(40, 4), 40);
    }

    #[test]
    fn test_clip_rect_scales_horizontal_bounds() {
        let mut regs = AccelRegisters::default();
        regs.src_x_clip = 0x1010;
        regs.dst_x_clip = 0x0200;
        regs.src_y_clip = 0x0005;
        regs.dst_y_clip = 0x7123;
        let clip = ClipRect::from_regs(&regs, PixelSize::Word);
        assert_eq!(clip, ClipRect { left: 8, right: 0x100, top: 5, bottom: 0x123 });
        let clip = ClipRect::from_regs(&regs, PixelSize::Dword);
        assert_eq!(clip.left, 4);
        assert!(clip.contains(4, 5));
        assert!(!clip.contains(3, 5));
    }

    #[test]
    fn test_compass_steps() {
        let expect = [(1, 0), (1, -1), (0, -1), (-1, -1), (-1, 0), (-1, 1), (0, 1), (1, 1)];
        for (i, (ex, ey)) in expect.iter().enumerate() {
            let (mut dx, mut dy) = (0, 0);
            compass_step((i as u16) << 5, &mut dx, &mut dy);
            assert_eq!((dx, dy), (*ex, *ey));
        }
    }

    #[test]
    fn test_unknown_command_codes() {
        for code in [0u8, 2, 7, 0xFF] {
            assert_eq!(Command::from_code(code), None);
        }
        assert_eq!(Command::from_code(6), Some(Command::FastLine));
    }
}
