// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Circular logs ("indices").
//!
//! An index owns a contiguous page range: the first page is its journal, the
//! rest are data pages written as a ring. Addresses are user-relative.

pub mod journal;
pub mod registry;
pub mod ring;

use crate::config::JOURNAL_RECORD_SIZE;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct IndexId(pub u8);

/// Read/write position pair persisted by the journal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Cursors {
    pub head: u32,
    pub tail: u32,
}

/// Descriptor of one registered circular log.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Index {
    pub id: IndexId,
    /// Next write address.
    pub head: u32,
    /// Next sequential read address.
    pub tail: u32,
    /// Journal page.
    pub index_page: u8,
    /// First data page.
    pub start_page: u8,
    /// Last data page (inclusive).
    pub end_page: u8,
    pub min_data_address: u32,
    pub max_data_address: u32,
    pub min_index_address: u32,
    pub max_index_address: u32,
    pub journal_record_size: usize,
}

impl Index {
    /// Lay out an index over `first_page..=last_page` for `page_size`-byte pages.
    pub fn new(id: IndexId, first_page: u8, last_page: u8, page_size: u16) -> Self {
        let page_size = page_size as u32;
        let min_data_address = (first_page as u32 + 1) * page_size;
        let min_index_address = first_page as u32 * page_size;
        Self {
            id,
            head: min_data_address,
            tail: min_data_address,
            index_page: first_page,
            start_page: first_page + 1,
            end_page: last_page,
            min_data_address,
            max_data_address: (last_page as u32 + 1) * page_size,
            min_index_address,
            max_index_address: min_index_address + page_size,
            journal_record_size: JOURNAL_RECORD_SIZE,
        }
    }

    pub fn cursors(&self) -> Cursors {
        Cursors {
            head: self.head,
            tail: self.tail,
        }
    }

    pub fn set_cursors(&mut self, cursors: Cursors) {
        self.head = cursors.head;
        self.tail = cursors.tail;
    }

    pub fn data_page_count(&self) -> u8 {
        self.end_page - self.start_page + 1
    }

    /// Bytes in the data window.
    pub fn data_len(&self) -> u32 {
        self.max_data_address - self.min_data_address
    }

    pub fn contains_data(&self, address: u32) -> bool {
        (self.min_data_address..self.max_data_address).contains(&address)
    }

    /// Fold an advanced head back into the data window.
    ///
    /// The window does not start at address zero, so a plain modulo lands
    /// below it and has to be shifted up again.
    pub fn wrap(&self, address: u32) -> u32 {
        let mut wrapped = address % self.max_data_address;
        if wrapped < self.min_data_address {
            wrapped += self.min_data_address;
        }
        wrapped
    }

    /// Whether the inclusive page ranges of `self` and `first..=last` share a page.
    pub fn overlaps(&self, first: u8, last: u8) -> bool {
        first <= self.end_page && self.index_page <= last
    }
}
