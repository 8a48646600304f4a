// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Word arithmetic.
//!
//! Flash programs whole words, so every length that reaches the device is
//! rounded up to a word boundary. `word_size` is never zero once a
//! configuration has been validated.

/// Number of whole words needed to hold `bytes`.
pub fn bytes_to_words(bytes: usize, word_size: u8) -> usize {
    let word = word_size as usize;
    bytes / word + usize::from(bytes % word != 0)
}

/// Byte length of `words` words.
pub fn words_to_bytes(words: usize, word_size: u8) -> usize {
    words * word_size as usize
}

/// Smallest word-aligned byte count covering `bytes`.
pub fn aligned_len(bytes: usize, word_size: u8) -> usize {
    words_to_bytes(bytes_to_words(bytes, word_size), word_size)
}

pub fn is_aligned(address: u32, word_size: u8) -> bool {
    address % word_size as u32 == 0
}
