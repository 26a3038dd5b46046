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

    device_traits::svga_host.rs

    Defines the TguiHost trait, the set of callbacks an SVGA card makes into
    the machine that owns it: display timing and render mode changes, the
    PCI interrupt line, the DDC I2C lines and memory map changes.

*/

use crate::devices::tgui::{
    mapping::ApertureMap,
    timings::{DisplayTimings, RenderMode},
};

pub trait TguiHost {
    /// Display timings changed. Called after every timing recalculation.
    fn recalc_timings(&mut self, _timings: &DisplayTimings) {}
    fn set_render_mode(&mut self, _mode: RenderMode) {}
    /// Drive the PCI INTA line.
    fn set_irq(&mut self, _asserted: bool) {}
    /// Drive the I2C (DDC) clock and data lines. `true` releases a line.
    fn i2c_set(&mut self, _scl: bool, _sda: bool) {}
    fn i2c_scl(&self) -> bool {
        true
    }
    fn i2c_sda(&self) -> bool {
        true
    }
    /// The set of decoded memory apertures changed.
    fn mapping_changed(&mut self, _map: &ApertureMap) {}
}

/// A host that ignores every callback.
#[derive(Default)]
pub struct NullHost;

impl TguiHost for NullHost {}
