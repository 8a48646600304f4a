// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Configuration constants and the flash region description.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::align;
use crate::error::{FlashError, Result};

/// Largest payload accepted by a single region write (size of the padding buffer).
pub const MAX_WRITE_SIZE: usize = 256;

/// Number of circular logs a single engine can track.
pub const MAX_INDICES: usize = 4;

/// Value every byte holds after an erase.
pub const ERASED_VALUE: u8 = 0xFF;

/// Serialized size of a journal record: head then tail, 4 bytes each.
pub const JOURNAL_RECORD_SIZE: usize = 8;

/// Byte order the device driver uses for multi-byte values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Endianness {
    Big,
    #[default]
    Little,
}

/// When cursor updates of an append become visible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CommitMode {
    /// Cursors are committed only after every write of the append and the
    /// journal record succeeded.
    #[default]
    Strict,
    /// Head moves after each individual write; a failure mid-wrap can leave it
    /// past data that was never written.
    Legacy,
}

/// Geometry of the user-owned slice of the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FlashConfig {
    /// Minimum programmable unit in bytes.
    pub word_size: u8,
    /// Minimum erasable unit in bytes.
    pub page_size: u16,
    pub page_count: u8,
    pub start_page: u8,
    /// Added to every user-relative address before it reaches the device.
    pub base_address: u32,
    pub byte_order: Endianness,
    pub commit_mode: CommitMode,
}

impl Default for FlashConfig {
    fn default() -> Self {
        Self {
            word_size: 8,
            page_size: 4096,
            page_count: 50,
            start_page: 50,
            base_address: 0,
            byte_order: Endianness::Little,
            commit_mode: CommitMode::Strict,
        }
    }
}

impl FlashConfig {
    /// Last user page (inclusive).
    pub fn end_page(&self) -> u8 {
        // validate() guarantees this fits.
        (self.start_page as u16 + self.page_count as u16).saturating_sub(1) as u8
    }

    /// First user-relative address of `page`.
    pub fn page_address(&self, page: u8) -> u32 {
        page as u32 * self.page_size as u32
    }

    /// First user address of the region.
    pub fn min_address(&self) -> u32 {
        self.page_address(self.start_page)
    }

    /// One past the last user address of the region.
    pub fn max_address(&self) -> u32 {
        (self.end_page() as u32 + 1) * self.page_size as u32
    }

    pub fn validate(&self) -> Result<()> {
        if self.word_size == 0 {
            return Err(FlashError::InvalidConfig("word size must be non-zero"));
        }
        if self.page_size == 0 {
            return Err(FlashError::InvalidConfig("page size must be non-zero"));
        }
        if self.page_size % self.word_size as u16 != 0 {
            return Err(FlashError::InvalidConfig("page size must be a multiple of the word size"));
        }
        if self.page_count == 0 {
            return Err(FlashError::InvalidConfig("page count must be non-zero"));
        }
        if self.start_page as u16 + self.page_count as u16 - 1 > u8::MAX as u16 {
            return Err(FlashError::InvalidConfig("last page number exceeds 255"));
        }
        if align::aligned_len(JOURNAL_RECORD_SIZE, self.word_size) > self.page_size as usize {
            return Err(FlashError::InvalidConfig("a journal record does not fit in one page"));
        }
        let end = (self.start_page as u64 + self.page_count as u64) * self.page_size as u64;
        if end + self.base_address as u64 > u32::MAX as u64 {
            return Err(FlashError::InvalidConfig("region does not fit in a 32-bit address space"));
        }
        Ok(())
    }
}
