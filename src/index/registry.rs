// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Fixed-capacity index table.

use crate::config::{FlashConfig, MAX_INDICES};
use crate::error::{FlashError, RegistrationError, Result};
use crate::index::{Index, IndexId};

pub struct IndexRegistry {
    slots: [Option<Index>; MAX_INDICES],
    next_id: u8,
}

impl IndexRegistry {
    pub fn new() -> Self {
        Self {
            slots: [None; MAX_INDICES],
            next_id: 0,
        }
    }

    /// Forget every index. Ids start from zero again.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Register `first_page..=last_page` as a new index.
    ///
    /// `first_page` becomes the journal page. Ids are handed out in order and
    /// never reused.
    pub fn register(&mut self, cfg: &FlashConfig, first_page: u8, last_page: u8) -> Result<IndexId> {
        if first_page > last_page {
            return Err(RegistrationError::InvertedRange {
                start: first_page,
                end: last_page,
            }
            .into());
        }
        if last_page - first_page < 1 {
            return Err(RegistrationError::TooFewPages {
                start: first_page,
                end: last_page,
            }
            .into());
        }
        if first_page < cfg.start_page || last_page > cfg.end_page() {
            return Err(RegistrationError::PagesOutOfRange {
                start: first_page,
                end: last_page,
                region_start: cfg.start_page,
                region_end: cfg.end_page(),
            }
            .into());
        }
        if let Some(existing) = self.iter().find(|idx| idx.overlaps(first_page, last_page)) {
            return Err(RegistrationError::Overlap {
                start: first_page,
                end: last_page,
                existing: existing.id,
            }
            .into());
        }

        let slot = self.next_id as usize;
        if slot >= MAX_INDICES {
            return Err(RegistrationError::RegistryFull(MAX_INDICES).into());
        }

        let id = IndexId(self.next_id);
        self.slots[slot] = Some(Index::new(id, first_page, last_page, cfg.page_size));
        self.next_id += 1;
        Ok(id)
    }

    pub fn get(&self, id: IndexId) -> Result<&Index> {
        self.slots
            .get(id.0 as usize)
            .and_then(Option::as_ref)
            .ok_or(FlashError::UnknownIndex(id))
    }

    pub fn get_mut(&mut self, id: IndexId) -> Result<&mut Index> {
        self.slots
            .get_mut(id.0 as usize)
            .and_then(Option::as_mut)
            .ok_or(FlashError::UnknownIndex(id))
    }

    /// Registered indices in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Index> {
        self.slots.iter().filter_map(|slot| slot.as_ref())
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.next_id as usize >= MAX_INDICES
    }
}

impl Default for IndexRegistry {
    fn default() -> Self {
        Self::new()
    }
}
