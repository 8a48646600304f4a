// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Index Journal.
//!
//! Each index keeps its (head, tail) pair in its journal page as an
//! append-only run of fixed-size records:
//!
//! ```text
//! | head:u32 tail:u32 pad.. | head:u32 tail:u32 pad.. | FF FF .. (free) |
//! ```
//!
//! Records are padded with `0xFF` to a word boundary. There is no header;
//! the first erased word marks the end of the run, and the record just
//! before it is authoritative. A full page is erased and the run restarts
//! at the top of the page.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::align;
use crate::config::{Endianness, ERASED_VALUE, JOURNAL_RECORD_SIZE};
use crate::device::FlashDevice;
use crate::engine::FlashEngine;
use crate::error::{FlashError, Result};
use crate::index::{Cursors, Index, IndexId};
use crate::region::FlashRegion;

/// Word-sized scratch for the scan; word sizes never exceed a byte's range.
const MAX_WORD: usize = u8::MAX as usize;

pub fn encode_record(cursors: Cursors, order: Endianness) -> [u8; JOURNAL_RECORD_SIZE] {
    let mut buf = [0u8; JOURNAL_RECORD_SIZE];
    let half = JOURNAL_RECORD_SIZE / 2;
    match order {
        Endianness::Little => {
            LittleEndian::write_u32(&mut buf[..half], cursors.head);
            LittleEndian::write_u32(&mut buf[half..], cursors.tail);
        }
        Endianness::Big => {
            BigEndian::write_u32(&mut buf[..half], cursors.head);
            BigEndian::write_u32(&mut buf[half..], cursors.tail);
        }
    }
    buf
}

pub fn decode_record(buf: &[u8; JOURNAL_RECORD_SIZE], order: Endianness) -> Cursors {
    let half = JOURNAL_RECORD_SIZE / 2;
    match order {
        Endianness::Little => Cursors {
            head: LittleEndian::read_u32(&buf[..half]),
            tail: LittleEndian::read_u32(&buf[half..]),
        },
        Endianness::Big => Cursors {
            head: BigEndian::read_u32(&buf[..half]),
            tail: BigEndian::read_u32(&buf[half..]),
        },
    }
}

pub fn is_erased(word: &[u8]) -> bool {
    word.iter().all(|&b| b == ERASED_VALUE)
}

/// Walk `start..end` in `step`-byte words and return the address of the
/// first erased word, or `None` when every word holds data.
///
/// `read_word` fills the given buffer (exactly `step` bytes) from an address.
pub fn scan_for_erased<F>(start: u32, end: u32, step: u8, mut read_word: F) -> Result<Option<u32>>
where
    F: FnMut(u32, &mut [u8]) -> Result<()>,
{
    if step == 0 {
        return Err(FlashError::InvalidConfig("scan step must be non-zero"));
    }
    let mut word = [0u8; MAX_WORD];
    let word = &mut word[..step as usize];

    let mut address = start;
    while address < end {
        read_word(address, word)?;
        if is_erased(word) {
            return Ok(Some(address));
        }
        address += step as u32;
    }
    Ok(None)
}

/// Size of one journal slot on a device with `word_size`-byte words.
pub fn slot_len(word_size: u8) -> u32 {
    align::aligned_len(JOURNAL_RECORD_SIZE, word_size) as u32
}

/// Address of the newest record in the journal page of `index`.
pub(crate) fn last_record_address<D: FlashDevice>(
    region: &mut FlashRegion<D>,
    index: &Index,
) -> Result<Option<u32>> {
    let word_size = region.config()?.word_size;
    let slot = slot_len(word_size);
    let (min, max) = (index.min_index_address, index.max_index_address);

    let boundary = scan_for_erased(min, max, word_size, |address, word| region.read(address, word))?;
    let last = match boundary {
        Some(address) if address == min => None,
        // Round down to the slot holding the last programmed word, so a torn
        // record is treated as occupied rather than overwritten.
        Some(address) => Some(min + (address - min - 1) / slot * slot),
        None => {
            let slots = (max - min) / slot;
            Some(min + (slots - 1) * slot)
        }
    };
    tracing::trace!(id = index.id.0, ?last, "journal scan");
    Ok(last)
}

/// Append `cursors` to the journal of `index`, rolling the page over when full.
pub(crate) fn append_record<D: FlashDevice>(
    region: &mut FlashRegion<D>,
    index: &Index,
    cursors: Cursors,
) -> Result<u32> {
    let cfg = *region.config()?;
    let slot = slot_len(cfg.word_size);

    let mut target = match last_record_address(region, index)? {
        None => index.min_index_address,
        Some(last) => last + slot,
    };
    if target + slot > index.max_index_address {
        tracing::debug!(id = index.id.0, page = index.index_page, "journal page full, erasing");
        region.erase_pages(index.index_page, 1)?;
        target = index.min_index_address;
    }

    let record = encode_record(cursors, cfg.byte_order);
    region.write(target, &record)?;
    Ok(target)
}

fn read_record<D: FlashDevice>(region: &mut FlashRegion<D>, address: u32) -> Result<Cursors> {
    let order = region.config()?.byte_order;
    let mut buf = [0u8; JOURNAL_RECORD_SIZE];
    region.read(address, &mut buf)?;
    Ok(decode_record(&buf, order))
}

impl<D: FlashDevice> FlashEngine<D> {
    /// Persist the current cursors of `id` to its journal page.
    pub fn write_record(&mut self, id: IndexId) -> Result<()> {
        self.region.config()?;
        let index = *self.indices.get(id)?;
        append_record(&mut self.region, &index, index.cursors())?;
        Ok(())
    }

    /// Address of the newest journal record of `id`, `None` for an empty journal.
    pub fn last_record_address(&mut self, id: IndexId) -> Result<Option<u32>> {
        self.region.config()?;
        let index = *self.indices.get(id)?;
        last_record_address(&mut self.region, &index)
    }

    /// Replace the in-memory cursors of `id` with the newest journal record.
    ///
    /// An empty journal yields [`FlashError::DataNotFound`] and a record whose
    /// head lies outside the data window yields [`FlashError::CorruptRecord`];
    /// both leave the cursors alone.
    pub fn load(&mut self, id: IndexId) -> Result<Cursors> {
        self.region.config()?;
        let index = *self.indices.get(id)?;
        let address = last_record_address(&mut self.region, &index)?.ok_or(FlashError::DataNotFound(id))?;
        let cursors = read_record(&mut self.region, address)?;

        let word_size = self.region.config()?.word_size;
        if !index.contains_data(cursors.head) || !align::is_aligned(cursors.head, word_size) {
            tracing::warn!(id = id.0, address, head = cursors.head, "journal record rejected");
            return Err(FlashError::CorruptRecord { id, head: cursors.head });
        }

        self.indices.get_mut(id)?.set_cursors(cursors);
        tracing::debug!(id = id.0, head = cursors.head, tail = cursors.tail, "cursors loaded from journal");
        Ok(cursors)
    }

    /// Startup helper: load the journal if it has a record.
    ///
    /// Returns `false` when the journal is empty and the index keeps its fresh cursors.
    pub fn load_or_reset(&mut self, id: IndexId) -> Result<bool> {
        match self.load(id) {
            Ok(_) => Ok(true),
            Err(FlashError::DataNotFound(_)) => {
                self.reset(id)?;
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}
