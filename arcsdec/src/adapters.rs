// Copyright (c) 2024 The arcsdec Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Descriptors for the formats whose decode path runs through a
//! third-party codec library rather than a native implementation in this
//! crate. These stubs register the `Format`/`Codec` pairs a full build
//! would wire to libFLAC, libwavpack, Monkey's Audio, and libsndfile, and
//! report via [`FileReadError`]/[`InvalidAudioError`] that the concrete
//! foreign binding is not linked into this build, rather than silently
//! pretending to decode.

use std::path::Path;

use arcsdec_core::libinfo::{DefaultLibraryResolver, LibraryResolver};
use arcsdec_core::{
    AudioReader, AudioSize, Codec, FileReadError, FileReaderDescriptor, Format, InputType,
    InvalidAudioError, LibInfo, ReaderError, ReaderHandle, SampleProcessor,
};

/// An `AudioReader` for a format whose decode path requires a foreign
/// codec library this crate does not itself embed. Every operation that
/// would touch the library fails with a descriptive error; format
/// recognition and selection still work normally.
struct ForeignAdapter {
    descriptor: FileReaderDescriptor,
    library: &'static str,
}

impl ForeignAdapter {
    fn new(descriptor: FileReaderDescriptor, library: &'static str) -> Self {
        ForeignAdapter { descriptor, library }
    }

    fn unavailable<E>(&self, wrap: impl Fn(String) -> E) -> E {
        wrap(format!(
            "{} requires {}, which is not linked into this build",
            self.descriptor.name(),
            self.library
        ))
    }
}

impl AudioReader for ForeignAdapter {
    fn descriptor(&self) -> &FileReaderDescriptor {
        &self.descriptor
    }

    fn set_samples_per_read(&mut self, _samples: u32) {}

    fn samples_per_read(&self) -> u32 {
        arcsdec_core::units::DEFAULT_SAMPLES_PER_READ
    }

    fn attach_processor(&mut self, _processor: Box<dyn SampleProcessor>) {}

    fn acquire_size(&self, _path: &Path) -> Result<AudioSize, FileReadError> {
        Err(self.unavailable(FileReadError::new))
    }

    fn process_file(&mut self, _path: &Path) -> Result<(), ReaderError> {
        Err(ReaderError::from(self.unavailable(InvalidAudioError::new)))
    }
}

fn libraries(name: &'static str) -> LibInfo {
    DefaultLibraryResolver.resolve_all(&[name])
}

/// libFLAC adapter, registered under id `"flac"`.
pub mod flac {
    use super::*;

    pub fn descriptor() -> FileReaderDescriptor {
        FileReaderDescriptor::new(
            "flac",
            "FLAC (libFLAC adapter)",
            vec![Format::Flac],
            vec![Codec::Flac],
            libraries("libFLAC"),
            InputType::Audio,
            create_reader,
        )
    }

    fn create_reader() -> ReaderHandle {
        ReaderHandle::Audio(Box::new(ForeignAdapter::new(descriptor(), "libFLAC")))
    }
}

/// libwavpack adapter, registered under id `"wavpack"`.
pub mod wavpack {
    use super::*;

    pub fn descriptor() -> FileReaderDescriptor {
        FileReaderDescriptor::new(
            "wavpack",
            "WavPack (libwavpack adapter)",
            vec![Format::Wv],
            vec![Codec::WavPack],
            libraries("libwavpack"),
            InputType::Audio,
            create_reader,
        )
    }

    fn create_reader() -> ReaderHandle {
        ReaderHandle::Audio(Box::new(ForeignAdapter::new(descriptor(), "libwavpack")))
    }
}

/// Monkey's Audio adapter.
pub mod monkey {
    use super::*;

    pub fn descriptor() -> FileReaderDescriptor {
        FileReaderDescriptor::new(
            "monkey",
            "Monkey's Audio adapter",
            vec![Format::Ape],
            vec![Codec::Monkey],
            libraries("libMAC"),
            InputType::Audio,
            create_reader,
        )
    }

    fn create_reader() -> ReaderHandle {
        ReaderHandle::Audio(Box::new(ForeignAdapter::new(descriptor(), "libMAC")))
    }
}

/// A generic multi-format adapter standing in for libsndfile, covering
/// CAF, AIFF, and OGG (PCM/Vorbis) containers, and ALAC-in-M4A. One
/// descriptor accepting four formats, so it loses selection to any
/// format-specific reader that also accepts the pair (`DefaultPreference`
/// penalizes breadth).
pub mod sndfile {
    use super::*;

    pub fn descriptor() -> FileReaderDescriptor {
        FileReaderDescriptor::new(
            "sndfile",
            "Generic multi-format adapter (libsndfile/ffmpeg)",
            vec![Format::Caf, Format::Aiff, Format::Ogg, Format::M4a],
            vec![Codec::Alac],
            libraries("libsndfile"),
            InputType::Audio,
            create_reader,
        )
    }

    fn create_reader() -> ReaderHandle {
        ReaderHandle::Audio(Box::new(ForeignAdapter::new(descriptor(), "libsndfile")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn foreign_adapter_reports_its_library_by_name() {
        let mut reader = ForeignAdapter::new(flac::descriptor(), "libFLAC");
        let err = reader.process_file(Path::new("x.flac")).unwrap_err();
        assert!(err.to_string().contains("libFLAC"));
    }

    #[test]
    fn acquire_size_also_reports_unavailability() {
        let reader = ForeignAdapter::new(wavpack::descriptor(), "libwavpack");
        let err = reader.acquire_size(Path::new("x.wv")).unwrap_err();
        assert!(err.to_string().contains("libwavpack"));
    }
}
