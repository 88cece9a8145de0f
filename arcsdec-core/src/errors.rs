// Copyright (c) 2024 The arcsdec Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The three error kinds raised at the boundary of the core: a failed
//! read, a structurally-valid-but-non-conforming input, and an
//! unrecognized input format. Each is a distinct type rather than a
//! shared enum so call sites stay explicit about which layer failed.

use std::io;

use thiserror::Error;

/// Raised by byte-level I/O: the file could not be opened, read in
/// full, or a requested slice extended past the end of the file.
///
/// `byte_pos` is the 1-based position of the byte on which the error
/// occurred, when known.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct FileReadError {
    message: String,
    byte_pos: Option<u64>,
}

impl FileReadError {
    pub fn new(message: impl Into<String>) -> Self {
        FileReadError { message: message.into(), byte_pos: None }
    }

    pub fn at(message: impl Into<String>, byte_pos: u64) -> Self {
        FileReadError { message: message.into(), byte_pos: Some(byte_pos) }
    }

    /// Byte position on which the error occurred, or `None` if unknown.
    pub fn byte_pos(&self) -> Option<u64> {
        self.byte_pos
    }
}

impl From<io::Error> for FileReadError {
    fn from(err: io::Error) -> Self {
        FileReadError { message: err.to_string(), byte_pos: None }
    }
}

/// Raised when a file is structurally well-formed for its container but
/// fails CD-DA validation (wrong sample rate, channel count, subchunk
/// order, or an otherwise unsupported codec).
#[derive(Debug, Error)]
#[error("invalid audio: {0}")]
pub struct InvalidAudioError(pub String);

impl InvalidAudioError {
    pub fn new(message: impl Into<String>) -> Self {
        InvalidAudioError(message.into())
    }
}

/// Raised when no registered `Matcher` recognized an input, or a
/// `FileReaderSelection` could not find a suitable reader.
#[derive(Debug, Error)]
#[error("unknown or unsupported input format: {0}")]
pub struct InputFormatError(pub String);

impl InputFormatError {
    pub fn new(message: impl Into<String>) -> Self {
        InputFormatError(message.into())
    }
}

/// A crate-internal union of the three boundary error types, used where
/// a single call (e.g. `AudioReader::process_file`) may fail at any of
/// the three layers. Call sites that care about a specific layer match
/// on the variant; the three error types themselves stay independent
/// rather than merging into one enum.
#[derive(Debug, Error)]
pub enum ReaderError {
    #[error(transparent)]
    Read(#[from] FileReadError),
    #[error(transparent)]
    Invalid(#[from] InvalidAudioError),
    #[error(transparent)]
    Format(#[from] InputFormatError),
}
