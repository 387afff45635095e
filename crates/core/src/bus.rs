//! # Memory Bus
//!
//! Flat 64 KiB of RAM with memory-mapped handler regions layered on top.
//! Regions are scanned in registration order and the first one containing the
//! address wins, for reads and writes alike. Addresses outside every region
//! fall through to RAM.

use crate::error::{EmuError, Result};
use std::fmt;

pub const ADDRESS_SPACE: usize = 0x10000;

pub type ReadHandler = Box<dyn FnMut(u16) -> u8 + Send>;
pub type WriteHandler = Box<dyn FnMut(u16, u8) + Send>;

struct Region {
    start: u16,
    end: u16,
    read: ReadHandler,
    write: WriteHandler,
}

impl Region {
    fn contains(&self, address: u16) -> bool {
        (self.start..=self.end).contains(&address)
    }
}

pub struct Bus {
    ram: Box<[u8]>,
    regions: Vec<Region>,
}

impl Bus {
    pub fn new() -> Self {
        Bus {
            ram: vec![0; ADDRESS_SPACE].into_boxed_slice(),
            regions: Vec::new(),
        }
    }

    /// Installs a handler pair for `start..=end`. Both handlers receive the
    /// absolute bus address. An inverted range is normalised. A region never
    /// shadows one registered before it.
    pub fn map_region<R, W>(&mut self, start: u16, end: u16, read: R, write: W)
    where
        R: FnMut(u16) -> u8 + Send + 'static,
        W: FnMut(u16, u8) + Send + 'static,
    {
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        log::debug!("Mapping region ${:04X}-${:04X}", start, end);
        self.regions.push(Region {
            start,
            end,
            read: Box::new(read),
            write: Box::new(write),
        });
    }

    pub fn unmap_all(&mut self) {
        self.regions.clear();
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Copies `data` into RAM at `start`. Fails without writing anything if the
    /// span would run past $FFFF.
    pub fn load(&mut self, data: &[u8], start: u16) -> Result<()> {
        let begin = start as usize;
        let end = begin + data.len();
        if end > ADDRESS_SPACE {
            return Err(EmuError::InvalidLoadAddress {
                start,
                len: data.len(),
            });
        }

        self.ram[begin..end].copy_from_slice(data);
        log::debug!("Loaded {} bytes at ${:04X}", data.len(), start);
        Ok(())
    }

    pub fn read_byte(&mut self, address: u16) -> u8 {
        match self.regions.iter_mut().find(|r| r.contains(address)) {
            Some(region) => (region.read)(address),
            None => self.ram[address as usize],
        }
    }

    pub fn write_byte(&mut self, address: u16, value: u8) {
        match self.regions.iter_mut().find(|r| r.contains(address)) {
            Some(region) => (region.write)(address, value),
            None => self.ram[address as usize] = value,
        }
    }

    /// Little-endian word whose two bytes may live at unrelated addresses.
    pub fn read_noncontinuous_word(&mut self, lo: u16, hi: u16) -> u16 {
        (self.read_byte(lo) as u16) | (self.read_byte(hi) as u16) << 8
    }

    pub fn read_word(&mut self, address: u16) -> u16 {
        self.read_noncontinuous_word(address, address.wrapping_add(1))
    }

    /// RAM contents at `address`, bypassing any mapped region.
    pub fn peek(&self, address: u16) -> u8 {
        self.ram[address as usize]
    }

    pub fn ram(&self) -> &[u8] {
        &self.ram
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Bus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let regions: Vec<_> = self
            .regions
            .iter()
            .map(|r| format!("${:04X}-${:04X}", r.start, r.end))
            .collect();
        f.debug_struct("Bus").field("regions", &regions).finish()
    }
}
