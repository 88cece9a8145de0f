// Copyright (c) 2024 The arcsdec Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The two reader contracts a `FileReaderDescriptor` instantiates: an
//! `AudioReader` that streams PCM samples to a `SampleProcessor`, and a
//! `MetadataParser` that parses a disc table of contents.

use std::path::Path;

use crate::descriptor::FileReaderDescriptor;
use crate::errors::{FileReadError, ReaderError};
use crate::sample::SampleProcessor;
use crate::toc::ToC;
use crate::units::AudioSize;

/// Decodes an audio-bearing input into 44.1 kHz/16-bit/stereo PCM and
/// streams it to a caller-attached `SampleProcessor`.
///
/// Implementations own their `samples_per_read` block size; the default
/// should fall within
/// `units::MIN_SAMPLES_PER_READ..=units::MAX_SAMPLES_PER_READ`.
pub trait AudioReader {
    /// The descriptor that created this reader.
    fn descriptor(&self) -> &FileReaderDescriptor;

    /// Sets the number of samples requested per `append_samples` call.
    /// Implementations should clamp into their supported range rather
    /// than reject out-of-range values.
    fn set_samples_per_read(&mut self, samples: u32);

    fn samples_per_read(&self) -> u32;

    /// Installs the processor `process_file` will drive. Must be called
    /// before `process_file`.
    fn attach_processor(&mut self, processor: Box<dyn SampleProcessor>);

    /// Determines the total sample count of `path` without decoding the
    /// audio payload (e.g. from a WAVE `data` subchunk length), for
    /// callers that need to size a buffer ahead of a `process_file` call.
    fn acquire_size(&self, path: &Path) -> Result<AudioSize, FileReadError>;

    /// Decodes `path` end to end, driving the attached processor through
    /// `start_input` → `update_audiosize` → `append_samples`* →
    /// `end_input`. `end_input` is called even when this returns an
    /// error.
    fn process_file(&mut self, path: &Path) -> Result<(), ReaderError>;
}

/// Parses a disc table of contents from a Cuesheet, CDRDAO/TOC, or
/// similar metadata-only input.
pub trait MetadataParser {
    fn descriptor(&self) -> &FileReaderDescriptor;

    fn parse(&self, path: &Path) -> Result<ToC, ReaderError>;
}

/// The concrete reader a `FileReaderDescriptor::create_reader` factory
/// produces, tagged by `InputType` so the registry can route to the
/// right trait without downcasting.
pub enum ReaderHandle {
    Audio(Box<dyn AudioReader>),
    Toc(Box<dyn MetadataParser>),
}

impl ReaderHandle {
    pub fn into_audio_reader(self) -> Option<Box<dyn AudioReader>> {
        match self {
            ReaderHandle::Audio(reader) => Some(reader),
            ReaderHandle::Toc(_) => None,
        }
    }

    pub fn into_metadata_parser(self) -> Option<Box<dyn MetadataParser>> {
        match self {
            ReaderHandle::Toc(parser) => Some(parser),
            ReaderHandle::Audio(_) => None,
        }
    }
}
