// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Engine context.
//!
//! Owns the device, the region configuration and the index table. Every
//! operation goes through `&mut self`; the engine does no locking of its own
//! and is meant to be driven from a single task.

use crate::config::FlashConfig;
use crate::device::FlashDevice;
use crate::error::Result;
use crate::index::registry::IndexRegistry;
use crate::index::{Cursors, Index, IndexId};
use crate::region::FlashRegion;

pub struct FlashEngine<D> {
    pub(crate) region: FlashRegion<D>,
    pub(crate) indices: IndexRegistry,
}

impl<D: FlashDevice> FlashEngine<D> {
    /// An engine that rejects every operation until [`init`](Self::init) succeeds.
    pub fn new(device: D) -> Self {
        Self {
            region: FlashRegion::new(device),
            indices: IndexRegistry::new(),
        }
    }

    pub fn with_config(device: D, config: FlashConfig) -> Result<Self> {
        let mut engine = Self::new(device);
        engine.init(config)?;
        Ok(engine)
    }

    /// Install `config`, replacing any previous one and dropping every
    /// registered index. Callers re-register their indices afterwards.
    pub fn init(&mut self, config: FlashConfig) -> Result<()> {
        self.indices.clear();
        if let Err(e) = self.region.configure(config) {
            tracing::warn!(?config, error = %e, "rejected flash configuration");
            return Err(e);
        }
        tracing::debug!(
            start_page = config.start_page,
            page_count = config.page_count,
            page_size = config.page_size,
            word_size = config.word_size,
            "flash region initialized"
        );
        Ok(())
    }

    /// Drop the configuration and all indices.
    pub fn deinit(&mut self) {
        self.indices.clear();
        self.region.deconfigure();
    }

    pub fn config(&self) -> Result<&FlashConfig> {
        self.region.config()
    }

    pub fn is_initialized(&self) -> bool {
        self.region.is_initialized()
    }

    pub fn write(&mut self, address: u32, data: &[u8]) -> Result<()> {
        self.region.write(address, data)
    }

    pub fn read(&mut self, address: u32, buffer: &mut [u8]) -> Result<()> {
        self.region.read(address, buffer)
    }

    pub fn erase_pages(&mut self, start_page: u8, count: u8) -> Result<()> {
        self.region.erase_pages(start_page, count)
    }

    /// Register `first_page..=last_page` as a circular log. The first page
    /// holds the journal.
    pub fn register(&mut self, first_page: u8, last_page: u8) -> Result<IndexId> {
        let cfg = *self.region.config()?;
        let id = self.indices.register(&cfg, first_page, last_page)?;
        tracing::debug!(id = id.0, first_page, last_page, "index registered");
        Ok(id)
    }

    pub fn index(&self, id: IndexId) -> Result<&Index> {
        self.region.config()?;
        self.indices.get(id)
    }

    pub fn indices(&self) -> impl Iterator<Item = &Index> {
        self.indices.iter()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn head(&self, id: IndexId) -> Result<u32> {
        Ok(self.index(id)?.head)
    }

    pub fn tail(&self, id: IndexId) -> Result<u32> {
        Ok(self.index(id)?.tail)
    }

    pub fn cursors(&self, id: IndexId) -> Result<Cursors> {
        Ok(self.index(id)?.cursors())
    }

    pub fn device(&self) -> &D {
        self.region.device()
    }

    pub fn device_mut(&mut self) -> &mut D {
        self.region.device_mut()
    }

    pub fn into_device(self) -> D {
        self.region.into_device()
    }
}
