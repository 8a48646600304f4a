// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Simulated flash devices.
//!
//! Both devices enforce the program/erase contract of a real NOR part: a
//! word can only be programmed while it is fully erased, and erase resets
//! whole pages to `0xFF`. Addresses are absolute device addresses starting
//! at zero; page `n` covers `n * page_size .. (n + 1) * page_size`.

pub mod mmap;

pub use mmap::MmapFlash;

use crate::config::ERASED_VALUE;
use crate::device::{DeviceError, FlashDevice};

/// Physical layout of a simulated part.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Geometry {
    pub word_size: u8,
    pub page_size: u16,
    pub page_count: u16,
}

impl Geometry {
    pub fn size(&self) -> usize {
        self.page_size as usize * self.page_count as usize
    }
}

/// A completed program or erase, in the order the device saw them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceOp {
    Program { address: u32, len: usize },
    Erase { start_page: u8, page_count: u8 },
}

pub(crate) fn program_cells(
    mem: &mut [u8],
    geometry: &Geometry,
    address: u32,
    words: &[u8],
    word_count: u16,
) -> Result<usize, DeviceError> {
    let word = geometry.word_size as usize;
    let len = word_count as usize * word;
    let start = address as usize;

    if word == 0 || start % word != 0 {
        return Err(DeviceError::Unaligned { address });
    }
    if start + len > mem.len() {
        return Err(DeviceError::OutOfBounds { address, len });
    }
    if words.len() < len {
        return Err(DeviceError::Fault("program buffer shorter than word count"));
    }
    if let Some(offset) = mem[start..start + len]
        .chunks(word)
        .position(|cell| cell.iter().any(|&b| b != ERASED_VALUE))
    {
        return Err(DeviceError::NotErased {
            address: address + (offset * word) as u32,
        });
    }

    mem[start..start + len].copy_from_slice(&words[..len]);
    Ok(len)
}

pub(crate) fn read_cells(mem: &[u8], address: u32, out: &mut [u8]) -> Result<(), DeviceError> {
    let start = address as usize;
    let end = start + out.len();
    if end > mem.len() {
        return Err(DeviceError::OutOfBounds {
            address,
            len: out.len(),
        });
    }
    out.copy_from_slice(&mem[start..end]);
    Ok(())
}

pub(crate) fn erase_cells(
    mem: &mut [u8],
    geometry: &Geometry,
    start_page: u8,
    page_count: u8,
) -> Result<(), DeviceError> {
    let page = geometry.page_size as usize;
    let start = start_page as usize * page;
    let end = start + page_count as usize * page;
    if end > mem.len() {
        return Err(DeviceError::OutOfBounds {
            address: start as u32,
            len: end - start,
        });
    }
    mem[start..end].fill(ERASED_VALUE);
    Ok(())
}

/// RAM-backed flash with an operation log and fault injection.
pub struct RamFlash {
    geometry: Geometry,
    mem: Vec<u8>,
    ops: Vec<DeviceOp>,
    program_fault: Option<usize>,
    erase_fault: Option<usize>,
}

impl RamFlash {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            mem: vec![ERASED_VALUE; geometry.size()],
            ops: Vec::new(),
            program_fault: None,
            erase_fault: None,
        }
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Raw device contents.
    pub fn contents(&self) -> &[u8] {
        &self.mem
    }

    pub fn page(&self, page: u16) -> &[u8] {
        let size = self.geometry.page_size as usize;
        let start = page as usize * size;
        &self.mem[start..start + size]
    }

    pub fn ops(&self) -> &[DeviceOp] {
        &self.ops
    }

    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    /// Let `skip` program calls through, then fail the next one.
    pub fn fail_program_after(&mut self, skip: usize) {
        self.program_fault = Some(skip);
    }

    /// Let `skip` erase calls through, then fail the next one.
    pub fn fail_erase_after(&mut self, skip: usize) {
        self.erase_fault = Some(skip);
    }
}

/// Count down an armed fault; true when this call must fail.
fn trip(fault: &mut Option<usize>) -> bool {
    match fault {
        Some(0) => {
            *fault = None;
            true
        }
        Some(n) => {
            *n -= 1;
            false
        }
        None => false,
    }
}

impl FlashDevice for RamFlash {
    fn program(&mut self, address: u32, words: &[u8], word_count: u16) -> Result<(), DeviceError> {
        if trip(&mut self.program_fault) {
            return Err(DeviceError::Fault("injected program failure"));
        }
        let len = program_cells(&mut self.mem, &self.geometry, address, words, word_count)?;
        self.ops.push(DeviceOp::Program { address, len });
        Ok(())
    }

    fn read(&mut self, address: u32, out: &mut [u8]) -> Result<(), DeviceError> {
        read_cells(&self.mem, address, out)
    }

    fn erase(&mut self, start_page: u8, page_count: u8) -> Result<(), DeviceError> {
        if trip(&mut self.erase_fault) {
            return Err(DeviceError::Fault("injected erase failure"));
        }
        erase_cells(&mut self.mem, &self.geometry, start_page, page_count)?;
        self.ops.push(DeviceOp::Erase { start_page, page_count });
        Ok(())
    }
}
