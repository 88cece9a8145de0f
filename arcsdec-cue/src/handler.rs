// Copyright (c) 2024 The arcsdec Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The semantic `Handler` trait the Cuesheet and CDRDAO/TOC drivers
//! invoke as they recognize statements, and the default `TocHandler`
//! implementation that accumulates them into a [`ToC`].

use arcsdec_core::ToC;

/// Callbacks a grammar driver invokes for each recognized statement.
/// Metadata-only statements (`PERFORMER`, `SONGWRITER`, `TITLE`, `REM`)
/// default to a no-op, mirroring the original handler's empty bodies:
/// they carry no effect on track offsets/lengths.
pub trait Handler {
    /// `CATALOG <mcn>`.
    fn do_catalog(&mut self, _mcn: &str) {}
    /// `CDTEXTFILE <name>`.
    fn do_cdtextfile(&mut self, _name: &str) {}
    /// `FILE <name> <format>`.
    fn do_file(&mut self, _name: &str, _format: &str) {}
    /// `ISRC <code>`, attributed to the most recently started track.
    fn do_isrc(&mut self, _code: &str) {}
    /// `PERFORMER <name>`.
    fn do_performer(&mut self, _name: &str) {}
    /// `SONGWRITER <name>`.
    fn do_songwriter(&mut self, _name: &str) {}
    /// `TITLE <title>`.
    fn do_title(&mut self, _title: &str) {}
    /// `PREGAP mm:ss:ff`.
    fn do_pregap(&mut self, _m: i32, _s: i32, _f: i32) {}
    /// `POSTGAP mm:ss:ff`.
    fn do_postgap(&mut self, _m: i32, _s: i32, _f: i32) {}
    /// `INDEX i mm:ss:ff` (Cuesheet) or a bare `mm:ss:ff` carrying an
    /// implicit index number (CDRDAO).
    fn do_index(&mut self, i: i32, m: i32, s: i32, f: i32);
    /// `TRACK n <mode>`.
    fn do_track(&mut self, number: i32, mode: &str);
    /// Invoked once after the last statement has been processed.
    fn do_end_input(&mut self) {}
}

/// Accumulates the statements of a Cuesheet or CDRDAO/TOC parse into a
/// [`ToC`], following the original `TOCHandler`'s bookkeeping: the
/// length of track *n* is only known once track *n+1*'s `INDEX 01` (or
/// equivalent) is seen, so it is appended retroactively; the last
/// track's length stays unresolved (`None`) until a caller supplies a
/// leadout.
#[derive(Debug, Default)]
pub struct TocHandler {
    offsets: Vec<u32>,
    lengths: Vec<Option<u32>>,
    filenames: Vec<String>,
    mcn: Option<String>,
    cdtext_file: Option<String>,
    isrc: Vec<Option<String>>,
    pregaps: Vec<u32>,
    postgaps: Vec<u32>,
}

impl TocHandler {
    pub fn new() -> Self {
        TocHandler::default()
    }

    fn prev_offset(&self) -> Option<u32> {
        self.offsets.last().copied()
    }

    /// Consumes the handler and builds the final [`ToC`]. Call after
    /// driving the handler through a full parse (i.e. after
    /// `do_end_input`).
    pub fn into_toc(self) -> ToC {
        let track_count = self.offsets.len() as u32;
        let mut toc = ToC::new(track_count, self.offsets, self.lengths, self.filenames);
        if let Some(mcn) = self.mcn {
            toc.set_mcn(mcn);
        }
        if let Some(cdtext_file) = self.cdtext_file {
            toc.set_cdtext_file(cdtext_file);
        }
        toc.set_isrc(self.isrc);
        toc.set_pregaps(self.pregaps);
        toc.set_postgaps(self.postgaps);
        toc
    }
}

impl Handler for TocHandler {
    fn do_catalog(&mut self, mcn: &str) {
        self.mcn = Some(mcn.to_string());
    }

    fn do_cdtextfile(&mut self, name: &str) {
        self.cdtext_file = Some(name.to_string());
    }

    fn do_file(&mut self, name: &str, _format: &str) {
        self.filenames.push(name.to_string());
    }

    fn do_isrc(&mut self, code: &str) {
        if let Some(slot) = self.isrc.last_mut() {
            *slot = Some(code.to_string());
        }
    }

    fn do_pregap(&mut self, m: i32, s: i32, f: i32) {
        if let Some(slot) = self.pregaps.last_mut() {
            *slot = arcsdec_core::units::msf_to_frames(m, s, f) as u32;
        }
    }

    fn do_postgap(&mut self, m: i32, s: i32, f: i32) {
        if let Some(slot) = self.postgaps.last_mut() {
            *slot = arcsdec_core::units::msf_to_frames(m, s, f) as u32;
        }
    }

    fn do_index(&mut self, i: i32, m: i32, s: i32, f: i32) {
        let frames = arcsdec_core::units::msf_to_frames(m, s, f);

        if i == 1 {
            if let Some(prev) = self.prev_offset() {
                self.lengths.push(Some((frames as u32).wrapping_sub(prev)));
            }
            self.offsets.push(frames as u32);
        } else if i == 0 {
            if let Some(slot) = self.pregaps.last_mut() {
                *slot = frames as u32;
            }
        }
    }

    fn do_track(&mut self, _number: i32, _mode: &str) {
        self.isrc.push(None);
        self.pregaps.push(0);
        self.postgaps.push(0);
    }

    fn do_end_input(&mut self) {
        // One length per track; the last track's is unknown until a
        // leadout is supplied.
        self.lengths.push(None);
    }
}
