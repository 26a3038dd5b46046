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

    devices::tgui::ramdac.rs

    Hidden RAMDAC control register. Four consecutive reads of the pixel mask
    port arm it; the next write to the port lands in the control register
    instead of the mask. The 9440 and later keep the register on-chip, the
    9400CXi pairs with an external TKD8001.

*/

use enum_dispatch::enum_dispatch;

use crate::device_types::tgui::RamdacKind;

const ARMED: u8 = 4;

#[enum_dispatch]
pub enum RamdacDispatch {
    InternalRamdac,
    Tkd8001Ramdac,
}

impl RamdacDispatch {
    pub fn new(kind: RamdacKind) -> Self {
        match kind {
            RamdacKind::Internal => InternalRamdac::default().into(),
            RamdacKind::Tkd8001 => Tkd8001Ramdac::default().into(),
        }
    }
}

#[enum_dispatch(RamdacDispatch)]
pub trait HiddenControl {
    /// Read of the pixel mask port. Returns the control register once armed,
    /// otherwise advances the arming sequence and returns `dac_mask`.
    fn read_mask_port(&mut self, dac_mask: u8) -> u8;
    /// Write of the pixel mask port. Returns true when the write was taken by
    /// the control register.
    fn write_mask_port(&mut self, data: u8) -> bool;
    /// Any access to the other DAC ports disarms the sequence.
    fn disarm(&mut self);
    fn control(&self) -> u8;
    /// Colour depth selected by the control register.
    fn depth(&self) -> u32;
}

#[derive(Default)]
struct ArmSequence {
    state: u8,
    control: u8,
}

impl ArmSequence {
    fn read(&mut self, dac_mask: u8) -> u8 {
        if self.state == ARMED {
            return self.control;
        }
        self.state += 1;
        dac_mask
    }

    fn write(&mut self, data: u8) -> bool {
        if self.state == ARMED {
            self.state = 0;
            self.control = data;
            return true;
        }
        false
    }
}

#[derive(Default)]
pub struct InternalRamdac {
    seq: ArmSequence,
}

impl HiddenControl for InternalRamdac {
    fn read_mask_port(&mut self, dac_mask: u8) -> u8 {
        self.seq.read(dac_mask)
    }

    fn write_mask_port(&mut self, data: u8) -> bool {
        self.seq.write(data)
    }

    fn disarm(&mut self) {
        self.seq.state = 0;
    }

    fn control(&self) -> u8 {
        self.seq.control
    }

    fn depth(&self) -> u32 {
        match (self.seq.control >> 4) & 0x0F {
            0x01 => 15,
            0x03 => 16,
            0x0D => 24,
            _ => 8,
        }
    }
}

#[derive(Default)]
pub struct Tkd8001Ramdac {
    seq: ArmSequence,
}

impl HiddenControl for Tkd8001Ramdac {
    fn read_mask_port(&mut self, dac_mask: u8) -> u8 {
        self.seq.read(dac_mask)
    }

    fn write_mask_port(&mut self, data: u8) -> bool {
        self.seq.write(data)
    }

    fn disarm(&mut self) {
        self.seq.state = 0;
    }

    fn control(&self) -> u8 {
        self.seq.control
    }

    fn depth(&self) -> u32 {
        match self.seq.control >> 5 {
            5 => 15,
            6 => 24,
            7 => 16,
            _ => 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arm(dac: &mut RamdacDispatch) {
        for _ in 0..4 {
            assert_eq!(dac.read_mask_port(0xFF), 0xFF);
        }
    }

    #[test]
    fn test_arming_sequence() {
        let mut dac = RamdacDispatch::new(RamdacKind::Internal);
        assert!(!dac.write_mask_port(0x30));
        arm(&mut dac);
        assert!(dac.write_mask_port(0x30));
        assert_eq!(dac.control(), 0x30);
        assert_eq!(dac.depth(), 16);
        // The write disarms.
        assert!(!dac.write_mask_port(0x10));
        assert_eq!(dac.control(), 0x30);
    }

    #[test]
    fn test_read_while_armed_returns_control() {
        let mut dac = RamdacDispatch::new(RamdacKind::Internal);
        arm(&mut dac);
        dac.write_mask_port(0xD0);
        arm(&mut dac);
        assert_eq!(dac.read_mask_port(0xFF), 0xD0);
        assert_eq!(dac.read_mask_port(0xFF), 0xD0);
        assert_eq!(dac.depth(), 24);
    }

    #[test]
    fn test_disarm() {
        let mut dac = RamdacDispatch::new(RamdacKind::Tkd8001);
        for _ in 0..3 {
            dac.read_mask_port(0xFF);
        }
        dac.disarm();
        dac.read_mask_port(0xFF);
        assert!(!dac.write_mask_port(0xA0));
        // A rejected write keeps the count; three more reads arm it.
        for _ in 0..3 {
            assert_eq!(dac.read_mask_port(0xFF), 0xFF);
        }
        assert_eq!(dac.read_mask_port(0xFF), 0x00);
        dac.disarm();
        arm(&mut dac);
        assert!(dac.write_mask_port(0xA0));
        assert_eq!(dac.depth(), 15);
    }

    #[test]
    fn test_tkd8001_depths() {
        let expect = [(0x00, 8), (0x60, 8), (0xA0, 15), (0xC0, 24), (0xE0, 16)];
        for (control, depth) in expect {
            let mut dac = RamdacDispatch::new(RamdacKind::Tkd8001);
            arm(&mut dac);
            dac.write_mask_port(control);
            assert_eq!(dac.depth(), depth, "control {:02X}", control);
        }
    }
}
