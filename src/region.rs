// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Flash Region.
//!
//! Bounds-checked, user-relative access to the configured slice of a
//! [`FlashDevice`]. Writes are padded with the erased value up to the next
//! word boundary: programming can only clear bits, so `0xFF` padding leaves
//! the untouched part of the last word programmable later.

use crate::align;
use crate::config::{FlashConfig, ERASED_VALUE, MAX_WRITE_SIZE};
use crate::device::FlashDevice;
use crate::error::{FlashError, Result};

pub struct FlashRegion<D> {
    device: D,
    config: Option<FlashConfig>,
}

impl<D: FlashDevice> FlashRegion<D> {
    /// A region over `device` that rejects every access until [`configure`](Self::configure).
    pub fn new(device: D) -> Self {
        Self { device, config: None }
    }

    /// Replace the configuration wholesale. An invalid configuration leaves
    /// the region uninitialized.
    pub(crate) fn configure(&mut self, config: FlashConfig) -> Result<()> {
        self.config = None;
        config.validate()?;
        self.config = Some(config);
        Ok(())
    }

    pub(crate) fn deconfigure(&mut self) {
        self.config = None;
    }

    pub fn config(&self) -> Result<&FlashConfig> {
        self.config.as_ref().ok_or(FlashError::NotInitialized)
    }

    pub fn is_initialized(&self) -> bool {
        self.config.is_some()
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn into_device(self) -> D {
        self.device
    }

    /// Program `data` at the user-relative `address`, padding the final word.
    pub fn write(&mut self, address: u32, data: &[u8]) -> Result<()> {
        let cfg = *self.config()?;

        if data.is_empty() || data.len() > MAX_WRITE_SIZE {
            return Err(FlashError::InvalidLength(data.len()));
        }
        if !align::is_aligned(address, cfg.word_size) {
            return Err(FlashError::UnalignedAddress {
                address,
                word_size: cfg.word_size,
            });
        }
        let padded_len = align::aligned_len(data.len(), cfg.word_size);
        check_span(&cfg, address, padded_len)?;

        let mut padding = [ERASED_VALUE; MAX_WRITE_SIZE + u8::MAX as usize];
        padding[..data.len()].copy_from_slice(data);
        let word_count = align::bytes_to_words(data.len(), cfg.word_size) as u16;

        tracing::trace!(address, len = data.len(), word_count, "flash write");
        self.device
            .program(address + cfg.base_address, &padding[..padded_len], word_count)?;
        Ok(())
    }

    /// Read `buffer.len()` bytes from the user-relative `address`.
    pub fn read(&mut self, address: u32, buffer: &mut [u8]) -> Result<()> {
        let cfg = *self.config()?;

        if buffer.len() > u16::MAX as usize {
            return Err(FlashError::InvalidLength(buffer.len()));
        }
        check_span(&cfg, address, buffer.len())?;

        tracing::trace!(address, len = buffer.len(), "flash read");
        self.device.read(address + cfg.base_address, buffer)?;
        Ok(())
    }

    /// Erase `count` pages starting at `start_page`.
    ///
    /// The range must stay strictly below the configured last page.
    pub fn erase_pages(&mut self, start_page: u8, count: u8) -> Result<()> {
        let cfg = *self.config()?;

        let end = start_page as u16 + count as u16;
        if start_page < cfg.start_page || end >= cfg.end_page() as u16 {
            return Err(FlashError::EraseOutOfRange { start_page, count });
        }

        tracing::trace!(start_page, count, "flash erase");
        self.device.erase(start_page, count)?;
        Ok(())
    }
}

fn check_span(cfg: &FlashConfig, address: u32, len: usize) -> Result<()> {
    let end = address as u64 + len as u64;
    if address < cfg.min_address() || address >= cfg.max_address() || end > cfg.max_address() as u64 {
        return Err(FlashError::AddressOutOfRange { address, len });
    }
    Ok(())
}
