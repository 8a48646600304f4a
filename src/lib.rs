// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.

//! flash-index: word-aligned flash regions and crash-recoverable circular logs
//! for erase-before-write devices.
//!
//! A [`FlashEngine`] wraps a [`FlashDevice`] and exposes a bounds-checked
//! user region plus up to [`MAX_INDICES`](config::MAX_INDICES) circular logs.
//! Each log journals its head/tail pair on a dedicated page so it can be
//! reloaded after a restart.
//!
//! The engine is single-threaded; callers sharing it across tasks must
//! serialize access themselves.

pub mod align;
pub mod config;
pub mod device;
pub mod engine;
pub mod error;
pub mod index;
pub mod region;
pub mod sim;

pub use config::{CommitMode, Endianness, FlashConfig};
pub use device::{DeviceError, FlashDevice};
pub use engine::FlashEngine;
pub use error::{FlashError, RegistrationError, Result};
pub use index::{Cursors, Index, IndexId};

#[cfg(test)]
pub mod tests;
