// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! File-backed flash image.
//!
//! The image survives the process, so dropping an engine and reopening the
//! same file behaves like a power cycle of the device.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

use memmap2::MmapMut;

use super::{erase_cells, program_cells, read_cells, Geometry};
use crate::config::ERASED_VALUE;
use crate::device::{DeviceError, FlashDevice};

pub struct MmapFlash {
    geometry: Geometry,
    map: MmapMut,
    _file: File,
}

impl MmapFlash {
    /// Open the image at `path`, creating a blank (erased) one if the file is new.
    pub fn open(path: impl AsRef<Path>, geometry: Geometry) -> io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let size = geometry.size() as u64;
        let existing = file.metadata()?.len();
        let fresh = existing == 0;
        if fresh {
            file.set_len(size)?;
        } else if existing != size {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("flash image is {existing} bytes, geometry expects {size}"),
            ));
        }

        // SAFETY: the mapping is private to this value and the file is not
        // resized while mapped.
        let mut map = unsafe { MmapMut::map_mut(&file)? };
        if fresh {
            map.fill(ERASED_VALUE);
            map.flush()?;
        }
        tracing::debug!(size, fresh, "flash image mapped");

        Ok(Self {
            geometry,
            map,
            _file: file,
        })
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn contents(&self) -> &[u8] {
        &self.map
    }

    fn sync(&self) -> Result<(), DeviceError> {
        self.map.flush().map_err(|_| DeviceError::Fault("flash image flush failed"))
    }
}

impl FlashDevice for MmapFlash {
    fn program(&mut self, address: u32, words: &[u8], word_count: u16) -> Result<(), DeviceError> {
        program_cells(&mut self.map, &self.geometry, address, words, word_count)?;
        self.sync()
    }

    fn read(&mut self, address: u32, out: &mut [u8]) -> Result<(), DeviceError> {
        read_cells(&self.map, address, out)
    }

    fn erase(&mut self, start_page: u8, page_count: u8) -> Result<(), DeviceError> {
        erase_cells(&mut self.map, &self.geometry, start_page, page_count)?;
        self.sync()
    }
}
