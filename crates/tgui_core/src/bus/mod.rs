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

    bus::mod.rs

    Bus-facing traits implemented by the TGUI device: port I/O and
    memory-mapped access, plus the descriptors used to report which physical
    ranges a device currently decodes.

*/
#![allow(dead_code)]
//! The host bus (VLB or PCI) is modelled only at its interface boundary.
//! Address decoding, arbitration and IRQ routing belong to the machine that
//! owns the device; the device reports its port list and memory ranges and
//! answers accesses routed to it.

pub const NO_IO_BYTE: u8 = 0xFF; // Byte read from an undecoded IO address.
pub const OPEN_BUS_BYTE: u8 = 0xFF; // Byte read from an undecoded memory address.

/// Bus access cost in bus clocks, per access width.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct BusTimings {
    pub read_b:  u32,
    pub read_w:  u32,
    pub read_l:  u32,
    pub write_b: u32,
    pub write_w: u32,
    pub write_l: u32,
}

impl BusTimings {
    pub const fn uniform(b: u32, w: u32, l: u32) -> Self {
        Self {
            read_b:  b,
            read_w:  w,
            read_l:  l,
            write_b: b,
            write_w: w,
            write_l: l,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MemRangeDescriptor {
    pub address: usize,
    pub size: usize,
    pub cycle_cost: u32,
    pub read_only: bool,
    pub priority: u32,
}

impl MemRangeDescriptor {
    pub fn new(address: usize, size: usize, read_only: bool) -> Self {
        Self {
            address,
            size,
            cycle_cost: 0,
            read_only,
            priority: 1,
        }
    }

    #[inline]
    pub fn contains(&self, address: usize) -> bool {
        address >= self.address && address < self.address + self.size
    }
}

pub trait IoDevice {
    /// Read a byte from the specified port. The default implementation returns NO_IO_BYTE (0xFF).
    fn read_u8(&mut self, _port: u16) -> u8 {
        NO_IO_BYTE
    }

    /// Write a byte to the specified port. The default implementation does nothing.
    fn write_u8(&mut self, _port: u16, _data: u8) {}

    /// Wider port accesses decompose into little-endian byte accesses unless
    /// the device overrides them.
    fn read_u16(&mut self, port: u16) -> u16 {
        self.read_u8(port) as u16 | (self.read_u8(port.wrapping_add(1)) as u16) << 8
    }

    fn write_u16(&mut self, port: u16, data: u16) {
        self.write_u8(port, data as u8);
        self.write_u8(port.wrapping_add(1), (data >> 8) as u8);
    }

    fn read_u32(&mut self, port: u16) -> u32 {
        self.read_u16(port) as u32 | (self.read_u16(port.wrapping_add(2)) as u32) << 16
    }

    fn write_u32(&mut self, port: u16, data: u32) {
        self.write_u16(port, data as u16);
        self.write_u16(port.wrapping_add(2), (data >> 16) as u16);
    }

    /// Return a list of ports the device should service, comprised of a vector of tuples of
    /// (port description, port number).
    fn port_list(&self) -> Vec<(String, u16)>;
}

/// Memory-mapped access. Reads return the data and the bus wait cost; writes
/// return the wait cost.
pub trait MemoryMappedDevice {
    fn mmio_read_u8(&mut self, address: usize) -> (u8, u32);
    fn mmio_read_u16(&mut self, address: usize) -> (u16, u32);
    fn mmio_read_u32(&mut self, address: usize) -> (u32, u32);
    fn mmio_peek_u8(&self, address: usize) -> u8;

    fn mmio_write_u8(&mut self, address: usize, data: u8) -> u32;
    fn mmio_write_u16(&mut self, address: usize, data: u16) -> u32;
    fn mmio_write_u32(&mut self, address: usize, data: u32) -> u32;

    fn get_mapping(&self) -> Vec<MemRangeDescriptor>;
}
