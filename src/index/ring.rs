// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Circular Log Engine.
//!
//! Appends land at `head` and wrap back to the first data page once the
//! window is exhausted. Wrapping erases the first data page so it can be
//! programmed again. A single-page log never splits a payload across the
//! wrap: the page is erased and the payload starts over at its top.

use crate::align;
use crate::config::{CommitMode, FlashConfig, MAX_WRITE_SIZE};
use crate::device::{DeviceError, FlashDevice};
use crate::engine::FlashEngine;
use crate::error::{FlashError, Result};
use crate::index::journal::{self, is_erased};
use crate::index::{Index, IndexId};
use crate::region::FlashRegion;

impl<D: FlashDevice> FlashEngine<D> {
    /// Append `data` to the log `id` and journal the new cursors.
    ///
    /// In [`CommitMode::Strict`] the cursors only change if every step
    /// succeeded. In [`CommitMode::Legacy`] head follows each completed write.
    pub fn append(&mut self, id: IndexId, data: &[u8]) -> Result<()> {
        let cfg = *self.region.config()?;
        let mut staged = *self.indices.get(id)?;

        if data.is_empty() || data.len() > MAX_WRITE_SIZE {
            return Err(FlashError::InvalidLength(data.len()));
        }

        let result = append_staged(&mut self.region, &cfg, &mut staged, data);

        match (cfg.commit_mode, &result) {
            (_, Ok(())) | (CommitMode::Legacy, Err(_)) => {
                self.indices.get_mut(id)?.set_cursors(staged.cursors());
            }
            (CommitMode::Strict, Err(_)) => {}
        }
        if let Err(e) = &result {
            tracing::warn!(id = id.0, len = data.len(), mode = ?cfg.commit_mode, error = %e, "append failed");
        }
        result
    }

    /// Read `buffer.len()` bytes from `tail` and move `tail` past them.
    ///
    /// `tail` is a plain forward cursor: it does not wrap, and reading past
    /// `head` is the caller's concern.
    pub fn read_sequential(&mut self, id: IndexId, buffer: &mut [u8]) -> Result<()> {
        self.region.config()?;
        let tail = self.indices.get(id)?.tail;

        self.region.read(tail, buffer)?;
        self.indices.get_mut(id)?.tail = tail + buffer.len() as u32;
        Ok(())
    }

    /// Read `buffer.len()` bytes starting `offset` bytes before `head`
    /// (`offset <= 0`), wrapping around the data window in both directions.
    pub fn read_relative_to_head(&mut self, id: IndexId, offset: i32, buffer: &mut [u8]) -> Result<()> {
        self.region.config()?;
        let index = *self.indices.get(id)?;

        if offset > 0 {
            return Err(FlashError::ReadAheadOfHead { offset });
        }
        let window = index.data_len();
        let back = offset.unsigned_abs();
        if back > window {
            return Err(FlashError::AddressOutOfRange {
                address: index.head,
                len: back as usize,
            });
        }
        if buffer.len() as u64 > window as u64 {
            return Err(FlashError::InvalidLength(buffer.len()));
        }

        let mut address = index.head as i64 + offset as i64;
        if address < index.min_data_address as i64 {
            address = index.max_data_address as i64 - (index.min_data_address as i64 - address);
        }
        let address = address as u32;

        let end = address as u64 + buffer.len() as u64;
        if end > index.max_data_address as u64 {
            let before_wrap = (index.max_data_address - address) as usize;
            let (first, second) = buffer.split_at_mut(before_wrap);
            self.region.read(address, first)?;
            self.region.read(index.min_data_address, second)?;
        } else {
            self.region.read(address, buffer)?;
        }
        Ok(())
    }

    /// Erase every data page of `id` and move `head` back to the start.
    /// The tail and the journal are left alone.
    pub fn erase_all_data(&mut self, id: IndexId) -> Result<()> {
        self.region.config()?;
        let index = *self.indices.get(id)?;

        self.region.erase_pages(index.start_page, index.data_page_count())?;
        self.indices.get_mut(id)?.head = index.min_data_address;
        Ok(())
    }

    /// Erase the journal page of `id` and move `head` back to the start.
    pub fn erase_journal(&mut self, id: IndexId) -> Result<()> {
        self.region.config()?;
        let index = *self.indices.get(id)?;

        self.region.erase_pages(index.index_page, 1)?;
        self.indices.get_mut(id)?.head = index.min_data_address;
        Ok(())
    }

    /// Move both cursors back to the start of the data window without touching flash.
    pub fn reset(&mut self, id: IndexId) -> Result<()> {
        self.region.config()?;
        let index = self.indices.get_mut(id)?;
        index.head = index.min_data_address;
        index.tail = index.min_data_address;
        Ok(())
    }
}

/// Run one append against a copy of the index. `index.head` follows every
/// write that completed, whatever happens afterwards.
fn append_staged<D: FlashDevice>(
    region: &mut FlashRegion<D>,
    cfg: &FlashConfig,
    index: &mut Index,
    data: &[u8],
) -> Result<()> {
    let word_size = cfg.word_size;
    let words_before_wrap = align::bytes_to_words((index.max_data_address - index.head) as usize, word_size);
    let bytes_before_wrap = align::words_to_bytes(words_before_wrap, word_size);

    if data.len() < bytes_before_wrap {
        region.write(index.head, data)?;
        advance(index, data.len(), word_size);
    } else if index.data_page_count() == 1 {
        let page = cfg.page_size as usize;
        let payload = if data.len() > page {
            let keep = match data.len() % page {
                0 => page,
                rem => rem,
            };
            &data[data.len() - keep..]
        } else {
            data
        };

        tracing::debug!(id = index.id.0, len = data.len(), kept = payload.len(), "single-page wrap");
        region.erase_pages(index.start_page, 1)?;
        index.head = index.min_data_address;
        region.write(index.head, payload)?;
        advance(index, payload.len(), word_size);
    } else {
        let remainder = data.len() - bytes_before_wrap;
        if cfg.commit_mode == CommitMode::Strict {
            check_wrap_target(region, cfg, index, remainder)?;
        }

        tracing::debug!(id = index.id.0, before_wrap = bytes_before_wrap, remainder, "log wrap");
        region.write(index.head, &data[..bytes_before_wrap])?;
        advance(index, bytes_before_wrap, word_size);

        region.erase_pages(index.start_page, 1)?;
        if remainder > 0 {
            region.write(index.head, &data[bytes_before_wrap..])?;
            advance(index, remainder, word_size);
        }
    }

    journal::append_record(region, index, index.cursors())?;
    Ok(())
}

fn advance(index: &mut Index, written: usize, word_size: u8) {
    let next = index.head + align::aligned_len(written, word_size) as u32;
    index.head = index.wrap(next);
}

/// Make sure the part of a split append that lands after the wrap can be
/// written before anything destructive happens. The first data page is
/// erased by the wrap itself; any later page it reaches must already be blank.
fn check_wrap_target<D: FlashDevice>(
    region: &mut FlashRegion<D>,
    cfg: &FlashConfig,
    index: &Index,
    remainder: usize,
) -> Result<()> {
    let span = align::aligned_len(remainder, cfg.word_size);
    if span as u64 > index.data_len() as u64 {
        return Err(FlashError::InvalidLength(remainder));
    }

    let page = cfg.page_size as usize;
    if span > page {
        let mut scratch = [0u8; MAX_WRITE_SIZE];
        let beyond = &mut scratch[..span - page];
        region.read(index.min_data_address + page as u32, beyond)?;
        if !is_erased(beyond) {
            return Err(FlashError::Device(DeviceError::NotErased {
                address: index.min_data_address + page as u32,
            }));
        }
    }
    Ok(())
}
