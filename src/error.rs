// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Error types.

use thiserror::Error;

use crate::device::DeviceError;
use crate::index::IndexId;

/// Reasons a page range cannot become an index.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("start page {start} is after end page {end}")]
    InvertedRange { start: u8, end: u8 },

    #[error("an index needs a journal page and at least one data page, got {start}..={end}")]
    TooFewPages { start: u8, end: u8 },

    #[error("pages {start}..={end} fall outside the user region {region_start}..={region_end}")]
    PagesOutOfRange {
        start: u8,
        end: u8,
        region_start: u8,
        region_end: u8,
    },

    #[error("pages {start}..={end} overlap index {existing:?}")]
    Overlap { start: u8, end: u8, existing: IndexId },

    #[error("all {0} index slots are in use")]
    RegistryFull(usize),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashError {
    #[error("flash region is not initialized")]
    NotInitialized,

    #[error("invalid flash configuration: {0}")]
    InvalidConfig(&'static str),

    #[error("address {address:#x} (+{len} bytes) is outside the user region")]
    AddressOutOfRange { address: u32, len: usize },

    #[error("address {address:#x} is not aligned to the {word_size}-byte word")]
    UnalignedAddress { address: u32, word_size: u8 },

    #[error("invalid transfer length: {0}")]
    InvalidLength(usize),

    #[error("cannot erase {count} page(s) from page {start_page}")]
    EraseOutOfRange { start_page: u8, count: u8 },

    #[error("cannot read {offset} bytes ahead of head")]
    ReadAheadOfHead { offset: i32 },

    #[error("registration rejected: {0}")]
    Registration(#[from] RegistrationError),

    #[error("unknown index {0:?}")]
    UnknownIndex(IndexId),

    #[error("no journal record found for index {0:?}")]
    DataNotFound(IndexId),

    /// The newest journal record points outside the data window or off a word boundary.
    #[error("journal record of index {id:?} holds an invalid head {head:#x}")]
    CorruptRecord { id: IndexId, head: u32 },

    #[error("device error: {0}")]
    Device(#[from] DeviceError),
}

impl FlashError {
    /// True for the expected "fresh journal" state rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FlashError::DataNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, FlashError>;
