// Copyright (c) 2024 The arcsdec Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The syntax error a Cuesheet/CDRDAO grammar driver raises: on a syntax
//! error, the parser returns a non-zero result.

use thiserror::Error;

/// A grammar violation encountered while driving a Cuesheet or
/// CDRDAO/TOC parse, with the 1-based source line it occurred on.
#[derive(Debug, Error)]
#[error("line {line}: {message}")]
pub struct CueSyntaxError {
    pub line: usize,
    pub message: String,
}

impl CueSyntaxError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        CueSyntaxError { line, message: message.into() }
    }
}
