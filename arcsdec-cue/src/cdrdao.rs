// Copyright (c) 2024 The arcsdec Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The CDRDAO/TOC grammar driver, grounded on
//! `original_source/src/cdrdaotoc/driver.cpp`.
//!
//! A `.toc` file uses a different keyword set than a Cuesheet (`CD_DA`,
//! `TRACK AUDIO`, `FILE "name" offset length`, `START mm:ss:ff`, `INDEX
//! mm:ss:ff`) but drives the same [`Handler`] trait to build an
//! equivalent [`ToC`]. Track-mode and index-level keyword recognition
//! beyond these five statements is out of scope.

use std::fs;
use std::path::Path;

use arcsdec_core::{
    FileReaderDescriptor, Format, InputType, InvalidAudioError, MetadataParser, ReaderError,
    ReaderHandle, ToC,
};

use crate::error::CueSyntaxError;
use crate::handler::{Handler, TocHandler};
use crate::lexer::{parse_msf_token, tokenize};

/// Drives a CDRDAO/TOC source into a [`Handler`]. Unlike the Cuesheet
/// grammar, a bare `INDEX mm:ss:ff` here carries no explicit index
/// number; it is always treated as index 1 (a new track boundary), and
/// `START mm:ss:ff` sets the current track's pregap.
pub struct Driver;

impl Driver {
    pub fn parse(source: &str, handler: &mut dyn Handler) -> Result<(), CueSyntaxError> {
        let mut track_number = 0;

        for (idx, raw_line) in source.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with("//") {
                continue;
            }

            let tokens = tokenize(line);
            let keyword = tokens[0].to_ascii_uppercase();
            let args = &tokens[1..];

            match keyword.as_str() {
                "CD_DA" => {}
                "TRACK" => {
                    let mode = args.first().map(String::as_str).unwrap_or("AUDIO");
                    track_number += 1;
                    handler.do_track(track_number, mode);
                }
                "FILE" => {
                    if let Some(name) = args.first() {
                        handler.do_file(name, "CDRDAO");
                    }
                }
                "START" => {
                    let token = args.first().ok_or_else(|| {
                        CueSyntaxError::new(line_no, "START requires an mm:ss:ff argument")
                    })?;
                    let (m, s, f) = parse_msf(line_no, token)?;
                    handler.do_pregap(m, s, f);
                }
                "INDEX" => {
                    let token = args.first().ok_or_else(|| {
                        CueSyntaxError::new(line_no, "INDEX requires an mm:ss:ff argument")
                    })?;
                    let (m, s, f) = parse_msf(line_no, token)?;
                    handler.do_index(1, m, s, f);
                }
                _ => {
                    // Keywords beyond the five this driver recognizes
                    // (CATALOG, CD_TEXT blocks, PREGAP-by-length, per-
                    // track flags, …) are accepted and ignored: cdrdao's
                    // grammar is richer than what's needed to build
                    // offsets/lengths.
                }
            }
        }

        handler.do_end_input();
        Ok(())
    }
}

fn parse_msf(line_no: usize, token: &str) -> Result<(i32, i32, i32), CueSyntaxError> {
    let (m, s, f) = parse_msf_token(token)
        .ok_or_else(|| CueSyntaxError::new(line_no, format!("expected mm:ss:ff, got '{token}'")))?;

    if arcsdec_core::units::msf_to_frames(m, s, f) < 0 {
        return Err(CueSyntaxError::new(line_no, format!("'{token}' is out of MSF domain")));
    }

    Ok((m, s, f))
}

/// Parses the CDRDAO/TOC file at `path` into a [`ToC`].
pub fn parse(path: &Path) -> Result<ToC, ReaderError> {
    let source = fs::read_to_string(path)
        .map_err(|e| ReaderError::from(arcsdec_core::FileReadError::from(e)))?;

    let mut handler = TocHandler::new();
    Driver::parse(&source, &mut handler)
        .map_err(|e| ReaderError::from(InvalidAudioError::new(e.to_string())))?;

    Ok(handler.into_toc())
}

/// Builds the [`FileReaderDescriptor`] for the CDRDAO/TOC parser.
pub fn descriptor() -> FileReaderDescriptor {
    FileReaderDescriptor::new(
        "cdrdao",
        "CDRDAO/TOC parser",
        vec![Format::Cdrdao],
        vec![],
        vec![],
        InputType::Toc,
        || ReaderHandle::Toc(Box::new(CdrdaoParser::new())),
    )
}

/// A [`MetadataParser`] backed by the CDRDAO/TOC [`Driver`].
pub struct CdrdaoParser {
    descriptor: FileReaderDescriptor,
}

impl CdrdaoParser {
    pub fn new() -> Self {
        CdrdaoParser { descriptor: descriptor() }
    }
}

impl Default for CdrdaoParser {
    fn default() -> Self {
        CdrdaoParser::new()
    }
}

impl MetadataParser for CdrdaoParser {
    fn descriptor(&self) -> &FileReaderDescriptor {
        &self.descriptor
    }

    fn parse(&self, path: &Path) -> Result<ToC, ReaderError> {
        parse(path)
    }
}
