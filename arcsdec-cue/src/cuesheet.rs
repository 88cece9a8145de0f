// Copyright (c) 2024 The arcsdec Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The Cuesheet grammar driver: recognizes `FILE`, `TRACK`, `INDEX`,
//! `PREGAP`, `POSTGAP`, `CATALOG`, `CDTEXTFILE`, `ISRC`, `PERFORMER`,
//! `SONGWRITER`, `TITLE`, and `REM` statements and drives a [`Handler`]
//! with them, line by line.

use std::fs;
use std::path::Path;

use log::{debug, warn};

use arcsdec_core::{
    FileReaderDescriptor, Format, InputType, InvalidAudioError, MetadataParser, ReaderError,
    ReaderHandle, ToC,
};

use crate::error::CueSyntaxError;
use crate::handler::{Handler, TocHandler};
use crate::lexer::{parse_msf_token, tokenize};

/// Drives a sequence of Cuesheet statement lines into a [`Handler`].
///
/// Rejects trailing tokens after `FILE`, `TRACK`, `INDEX`, and
/// `CDTEXTFILE` statements, and unrecognized top-level statement
/// keywords. Blank lines, and any other statement not explicitly listed
/// above, are accepted with their arguments unchecked beyond arity.
pub struct Driver;

impl Driver {
    /// Parses `source` line by line, invoking `handler` for every
    /// recognized statement, then `handler.do_end_input()`.
    pub fn parse(source: &str, handler: &mut dyn Handler) -> Result<(), CueSyntaxError> {
        for (idx, raw_line) in source.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }

            let tokens = tokenize(line);
            let keyword = tokens[0].to_ascii_uppercase();
            let args = &tokens[1..];

            match keyword.as_str() {
                "FILE" => {
                    require_arity(line_no, "FILE", args, 2)?;
                    handler.do_file(&args[0], &args[1]);
                }
                "TRACK" => {
                    require_arity(line_no, "TRACK", args, 2)?;
                    let number = parse_track_number(line_no, &args[0])?;
                    handler.do_track(number, &args[1]);
                }
                "INDEX" => {
                    require_arity(line_no, "INDEX", args, 2)?;
                    let i = parse_track_number(line_no, &args[0])?;
                    let (m, s, f) = parse_msf(line_no, &args[1])?;
                    handler.do_index(i, m, s, f);
                }
                "CDTEXTFILE" => {
                    require_arity(line_no, "CDTEXTFILE", args, 1)?;
                    handler.do_cdtextfile(&args[0]);
                }
                "PREGAP" => {
                    let (m, s, f) = parse_msf(line_no, args.first().ok_or_else(|| {
                        CueSyntaxError::new(line_no, "PREGAP requires an mm:ss:ff argument")
                    })?)?;
                    handler.do_pregap(m, s, f);
                }
                "POSTGAP" => {
                    let (m, s, f) = parse_msf(line_no, args.first().ok_or_else(|| {
                        CueSyntaxError::new(line_no, "POSTGAP requires an mm:ss:ff argument")
                    })?)?;
                    handler.do_postgap(m, s, f);
                }
                "CATALOG" => {
                    if let Some(mcn) = args.first() {
                        handler.do_catalog(mcn);
                    }
                }
                "ISRC" => {
                    if let Some(code) = args.first() {
                        handler.do_isrc(code);
                    }
                }
                "PERFORMER" => {
                    if let Some(name) = args.first() {
                        handler.do_performer(name);
                    }
                }
                "SONGWRITER" => {
                    if let Some(name) = args.first() {
                        handler.do_songwriter(name);
                    }
                }
                "TITLE" => {
                    if let Some(title) = args.first() {
                        handler.do_title(title);
                    }
                }
                "REM" => {
                    debug!("ignoring REM comment at line {line_no}");
                }
                other => {
                    return Err(CueSyntaxError::new(
                        line_no,
                        format!("unrecognized statement '{other}'"),
                    ))
                }
            }
        }

        handler.do_end_input();
        Ok(())
    }
}

fn require_arity(line_no: usize, keyword: &str, args: &[String], expected: usize) -> Result<(), CueSyntaxError> {
    if args.len() != expected {
        return Err(CueSyntaxError::new(
            line_no,
            format!("trailing content after {keyword} statement"),
        ));
    }
    Ok(())
}

fn parse_track_number(line_no: usize, token: &str) -> Result<i32, CueSyntaxError> {
    token
        .parse()
        .map_err(|_| CueSyntaxError::new(line_no, format!("expected an integer, got '{token}'")))
}

fn parse_msf(line_no: usize, token: &str) -> Result<(i32, i32, i32), CueSyntaxError> {
    let (m, s, f) = parse_msf_token(token)
        .ok_or_else(|| CueSyntaxError::new(line_no, format!("expected mm:ss:ff, got '{token}'")))?;

    if arcsdec_core::units::msf_to_frames(m, s, f) < 0 {
        return Err(CueSyntaxError::new(line_no, format!("'{token}' is out of MSF domain")));
    }

    Ok((m, s, f))
}

/// Parses the Cuesheet at `path` into a [`ToC`].
pub fn parse(path: &Path) -> Result<ToC, ReaderError> {
    let source = fs::read_to_string(path)
        .map_err(|e| ReaderError::from(arcsdec_core::FileReadError::from(e)))?;

    let mut handler = TocHandler::new();
    Driver::parse(&source, &mut handler)
        .map_err(|e| ReaderError::from(InvalidAudioError::new(e.to_string())))?;

    Ok(handler.into_toc())
}

/// Builds the [`FileReaderDescriptor`] for the Cuesheet parser, suitable
/// for registration in a `FileReaderRegistry`.
pub fn descriptor() -> FileReaderDescriptor {
    FileReaderDescriptor::new(
        "cuesheet",
        "Cuesheet ToC parser",
        vec![Format::Cue],
        vec![],
        vec![],
        InputType::Toc,
        || ReaderHandle::Toc(Box::new(CueParser::new())),
    )
}

/// A [`MetadataParser`] backed by the Cuesheet [`Driver`]/[`TocHandler`].
pub struct CueParser {
    descriptor: FileReaderDescriptor,
}

impl CueParser {
    pub fn new() -> Self {
        CueParser { descriptor: descriptor() }
    }
}

impl Default for CueParser {
    fn default() -> Self {
        CueParser::new()
    }
}

impl MetadataParser for CueParser {
    fn descriptor(&self) -> &FileReaderDescriptor {
        &self.descriptor
    }

    fn parse(&self, path: &Path) -> Result<ToC, ReaderError> {
        let toc = parse(path)?;
        if toc.track_count() == 0 {
            warn!("{} parsed to zero tracks", path.display());
        }
        Ok(toc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OK01: &str = "FILE \"album.wav\" WAVE\n  TRACK 01 AUDIO\n    INDEX 01 00:02:00\n  TRACK 02 AUDIO\n    INDEX 01 05:34:22\n";

    #[test]
    fn ok01_builds_expected_toc() {
        let mut handler = TocHandler::new();
        Driver::parse(OK01, &mut handler).unwrap();
        let toc = handler.into_toc();

        assert_eq!(toc.track_count(), 2);
        assert_eq!(toc.offsets(), &[150, 25072]);
        assert!(!toc.complete());
    }

    #[test]
    fn trailing_newline_does_not_change_result() {
        let without_trailing = OK01.trim_end();

        let mut a = TocHandler::new();
        Driver::parse(OK01, &mut a).unwrap();

        let mut b = TocHandler::new();
        Driver::parse(without_trailing, &mut b).unwrap();

        assert_eq!(a.into_toc(), b.into_toc());
    }

    #[test]
    fn rejects_trailing_content_after_file() {
        let mut handler = TocHandler::new();
        let err = Driver::parse("FILE \"album.wav\" WAVE extra\n", &mut handler).unwrap_err();
        assert_eq!(err.line, 1);
    }

    #[test]
    fn rejects_trailing_content_after_track() {
        let mut handler = TocHandler::new();
        let err = Driver::parse("TRACK 01 AUDIO extra\n", &mut handler).unwrap_err();
        assert_eq!(err.line, 1);
    }

    #[test]
    fn rejects_trailing_content_after_index() {
        let mut handler = TocHandler::new();
        let err = Driver::parse("INDEX 01 00:02:00 extra\n", &mut handler).unwrap_err();
        assert_eq!(err.line, 1);
    }

    #[test]
    fn rejects_trailing_content_after_cdtextfile() {
        let mut handler = TocHandler::new();
        let err = Driver::parse("CDTEXTFILE \"album.cdt\" extra\n", &mut handler).unwrap_err();
        assert_eq!(err.line, 1);
    }

    #[test]
    fn rejects_unknown_top_level_statement() {
        let mut handler = TocHandler::new();
        let err = Driver::parse("BOGUS 1 2 3\n", &mut handler).unwrap_err();
        assert_eq!(err.line, 1);
    }
}
