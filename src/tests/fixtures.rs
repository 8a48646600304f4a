// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Shared geometry for the unit tests: 8-byte words, 32-byte pages, user
//! region on pages 1..=31 of a 32-page part.

use crate::config::{CommitMode, Endianness, FlashConfig};
use crate::engine::FlashEngine;
use crate::sim::{Geometry, RamFlash};

pub const WORD_SIZE: u8 = 8;
pub const PAGE_SIZE: u16 = 32;
pub const START_PAGE: u8 = 1;
pub const PAGE_COUNT: u8 = 31;
pub const DEVICE_PAGES: u16 = 32;

pub type TestEngine = FlashEngine<RamFlash>;

pub fn geometry() -> Geometry {
    Geometry {
        word_size: WORD_SIZE,
        page_size: PAGE_SIZE,
        page_count: DEVICE_PAGES,
    }
}

pub fn config() -> FlashConfig {
    FlashConfig {
        word_size: WORD_SIZE,
        page_size: PAGE_SIZE,
        page_count: PAGE_COUNT,
        start_page: START_PAGE,
        base_address: 0,
        byte_order: Endianness::Little,
        commit_mode: CommitMode::Strict,
    }
}

pub fn engine() -> TestEngine {
    engine_with(config())
}

pub fn engine_with(config: FlashConfig) -> TestEngine {
    let device = RamFlash::new(Geometry {
        word_size: config.word_size,
        page_size: config.page_size,
        page_count: DEVICE_PAGES,
    });
    FlashEngine::with_config(device, config).unwrap()
}

pub fn legacy_engine() -> TestEngine {
    engine_with(FlashConfig {
        commit_mode: CommitMode::Legacy,
        ..config()
    })
}

/// First user-relative address of `page`.
pub fn page_addr(page: u8) -> u32 {
    page as u32 * PAGE_SIZE as u32
}

/// Bytes `0, 1, 2, ..` of length `len`.
pub fn sequence(len: usize) -> Vec<u8> {
    (0..len).map(|i| i as u8).collect()
}
