// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Device capability.
//!
//! The engine never talks to hardware directly. A board support layer
//! implements [`FlashDevice`] on top of its HAL; addresses it receives are
//! absolute (user address plus the configured base address).

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceError {
    /// A targeted word already holds programmed bits.
    #[error("word at {address:#x} is not erased")]
    NotErased { address: u32 },

    #[error("access at {address:#x} (+{len} bytes) is outside the device")]
    OutOfBounds { address: u32, len: usize },

    #[error("address {address:#x} is not word aligned")]
    Unaligned { address: u32 },

    /// Anything the driver cannot classify further (timeouts, bus errors, injected faults).
    #[error("device fault: {0}")]
    Fault(&'static str),
}

/// Raw program/read/erase primitives of an erase-before-write flash chip.
pub trait FlashDevice {
    /// Program `word_count` whole words from `words` at `address`.
    ///
    /// Must fail with [`DeviceError::NotErased`] if any targeted word is not
    /// in the erased state. `words` holds at least `word_count` words.
    fn program(&mut self, address: u32, words: &[u8], word_count: u16) -> Result<(), DeviceError>;

    /// Read `out.len()` bytes starting at `address`. No alignment constraint.
    fn read(&mut self, address: u32, out: &mut [u8]) -> Result<(), DeviceError>;

    /// Reset every byte of `page_count` pages starting at `start_page` to the erased value.
    fn erase(&mut self, start_page: u8, page_count: u8) -> Result<(), DeviceError>;
}

impl<T: FlashDevice + ?Sized> FlashDevice for &mut T {
    fn program(&mut self, address: u32, words: &[u8], word_count: u16) -> Result<(), DeviceError> {
        (**self).program(address, words, word_count)
    }

    fn read(&mut self, address: u32, out: &mut [u8]) -> Result<(), DeviceError> {
        (**self).read(address, out)
    }

    fn erase(&mut self, start_page: u8, page_count: u8) -> Result<(), DeviceError> {
        (**self).erase(start_page, page_count)
    }
}
