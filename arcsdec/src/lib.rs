// Copyright (c) 2024 The arcsdec Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]

//! Top-level glue for the arcsdec core: the default [`FileReaderRegistry`]
//! (see [`default`]), the foreign-codec-adapter descriptors that round it
//! out to all ten recognized formats (see [`adapters`]), and free
//! functions shaped like an external `TOCParser`/`ARIdCalculator`/
//! `ARCSCalculator` façade would use this crate's types. The façades
//! themselves, and the downstream checksum engine they wrap, stay
//! external to this crate.

pub mod adapters;
pub mod default;

use std::path::Path;

use log::info;

use arcsdec_core::{infer_type, Codec, Format, InputFormatError, InvalidAudioError, ReaderError, SampleProcessor, ToC};

/// Parses the disc table of contents at `meta_path`, inferring its
/// format/codec and dispatching to whichever registered [`MetadataParser`]
/// accepts it. Plays the role an external `TOCParser::parse` would, built
/// from this crate's inference and selection.
///
/// [`MetadataParser`]: arcsdec_core::MetadataParser
pub fn parse_toc(meta_path: &Path) -> Result<ToC, ReaderError> {
    let (format, codec) = infer_type(default::registry(), meta_path)?;

    let selection = default::toc_selection().select(format, codec).ok_or_else(|| {
        ReaderError::from(InputFormatError::new(format!(
            "no registered ToC parser accepts {}/{}",
            format.name(),
            codec.name()
        )))
    })?;

    let parser = selection.create_reader().into_metadata_parser().ok_or_else(|| {
        ReaderError::from(InvalidAudioError::new(format!(
            "descriptor '{}' does not produce a ToC parser",
            selection.descriptor().id()
        )))
    })?;

    parser.parse(meta_path)
}

/// Parses `meta_path` into a [`ToC`] and, if it is not already
/// [`ToC::complete`], resolves the leadout by inferring and selecting an
/// audio reader for `audio_path` and calling its `acquire_size`. Plays
/// the role an external `ARIdCalculator::calculate(audio, meta)` would:
/// the disc id itself is computed downstream of this crate, from the
/// completed `ToC` this function returns.
pub fn resolve_leadout(meta_path: &Path, audio_path: &Path) -> Result<ToC, ReaderError> {
    let mut toc = parse_toc(meta_path)?;

    if !toc.complete() {
        info!(
            "{} is incomplete; inspecting {} to resolve the leadout",
            meta_path.display(),
            audio_path.display()
        );

        let (format, codec) = infer_type(default::registry(), audio_path)?;

        let selection = default::audio_selection().select(format, codec).ok_or_else(|| {
            ReaderError::from(InputFormatError::new(format!(
                "no registered audio reader accepts {}/{}",
                format.name(),
                codec.name()
            )))
        })?;

        let reader = selection.create_reader().into_audio_reader().ok_or_else(|| {
            ReaderError::from(InvalidAudioError::new(format!(
                "descriptor '{}' does not produce an audio reader",
                selection.descriptor().id()
            )))
        })?;

        let size = reader.acquire_size(audio_path)?;
        toc.set_leadout(size.frames());
    }

    Ok(toc)
}

/// Infers the format/codec of `audio_path`, selects an audio reader for
/// it, attaches `processor`, and drives `process_file` to completion.
/// Plays the role an external `ARCSCalculator::calculate` would in
/// attaching a checksum-computing processor; the checksum engine itself,
/// and the checksums/disc id it produces, are external to this crate.
pub fn read_samples_with(audio_path: &Path, processor: Box<dyn SampleProcessor>) -> Result<(), ReaderError> {
    let (format, codec) = infer_type(default::registry(), audio_path)?;

    let selection = default::audio_selection().select(format, codec).ok_or_else(|| {
        ReaderError::from(InputFormatError::new(format!(
            "no registered audio reader accepts {}/{}",
            format.name(),
            codec.name()
        )))
    })?;

    let mut reader = selection.create_reader().into_audio_reader().ok_or_else(|| {
        ReaderError::from(InvalidAudioError::new(format!(
            "descriptor '{}' does not produce an audio reader",
            selection.descriptor().id()
        )))
    })?;

    reader.attach_processor(processor);
    reader.process_file(audio_path)
}

/// Infers the `(Format, Codec)` of `path` against the default registry.
/// A thin re-export so callers need not reach into [`default::registry`]
/// themselves for the common case.
pub fn infer(path: &Path) -> Result<(Format, Codec), InputFormatError> {
    infer_type(default::registry(), path)
}
