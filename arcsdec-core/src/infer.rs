// Copyright (c) 2024 The arcsdec Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! File-type inference: recognizing an input's `Format` and `Codec` from
//! its filename and the first bytes of its header, by trying each
//! registered `Matcher` in registration order.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::debug;

use crate::descriptor::{Codec, Format};
use crate::errors::InputFormatError;
use crate::registry::FileReaderRegistry;

/// The number of leading bytes read from a candidate file to probe
/// against reference `Bytes` patterns. Large enough to cover every
/// registered format's header (the widest is the 44-byte canonical WAVE
/// header).
pub const PROBE_HEADER_SIZE: usize = 44;

/// Infers the `(Format, Codec)` of `path` by trying every `Matcher`
/// registered in `registry`, in registration order, and returning the
/// first whose filename suffix and header bytes both match.
///
/// Files shorter than [`PROBE_HEADER_SIZE`] are probed with whatever
/// bytes they do contain; a `Matcher` with no reference bytes (e.g. a
/// plain-text Cuesheet) still requires its filename suffix to match.
pub fn infer_type(registry: &FileReaderRegistry, path: &Path) -> Result<(Format, Codec), InputFormatError> {
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| InputFormatError::new(format!("non-UTF-8 filename: {}", path.display())))?;

    let header = read_header(path)
        .map_err(|e| InputFormatError::new(format!("could not read {}: {e}", path.display())))?;

    for matcher in registry.matchers() {
        debug!("probing {filename} against {:?}", matcher.format());
        if matcher.matches_filename(filename) && matcher.matches_bytes(&header) {
            let codec = match matcher.codecs() {
                [] => Codec::None,
                [only] => *only,
                _ => Codec::Unknown,
            };
            debug!("{filename} recognized as {:?}/{:?}", matcher.format(), codec);
            return Ok((matcher.format(), codec));
        }
    }

    Err(InputFormatError::new(format!(
        "no registered reader recognizes {}",
        path.display()
    )))
}

fn read_header(path: &Path) -> std::io::Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let mut buf = Vec::with_capacity(PROBE_HEADER_SIZE);
    file.by_ref().take(PROBE_HEADER_SIZE as u64).read_to_end(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Bytes, ByteSeq, FileReaderDescriptor, InputType, Matcher};
    use crate::reader::{AudioReader, MetadataParser, ReaderHandle};
    use std::io::Write;

    fn unreachable_audio_reader() -> ReaderHandle {
        struct Stub;
        impl AudioReader for Stub {
            fn descriptor(&self) -> &FileReaderDescriptor {
                unreachable!()
            }
            fn set_samples_per_read(&mut self, _samples: u32) {}
            fn samples_per_read(&self) -> u32 {
                0
            }
            fn attach_processor(&mut self, _processor: Box<dyn crate::sample::SampleProcessor>) {}
            fn acquire_size(
                &self,
                _path: &Path,
            ) -> Result<crate::units::AudioSize, crate::errors::FileReadError> {
                unreachable!()
            }
            fn process_file(&mut self, _path: &Path) -> Result<(), crate::errors::ReaderError> {
                unreachable!()
            }
        }
        ReaderHandle::Audio(Box::new(Stub))
    }

    fn unreachable_toc_parser() -> ReaderHandle {
        struct Stub;
        impl MetadataParser for Stub {
            fn descriptor(&self) -> &FileReaderDescriptor {
                unreachable!()
            }
            fn parse(&self, _path: &Path) -> Result<crate::toc::ToC, crate::errors::ReaderError> {
                unreachable!()
            }
        }
        ReaderHandle::Toc(Box::new(Stub))
    }

    fn registry() -> FileReaderRegistry {
        let mut registry = FileReaderRegistry::new();
        registry.register(
            Matcher::new(
                Format::Wav,
                &["wav"],
                Some(Bytes::new(0, ByteSeq::exact(*b"RIFF"))),
                &[Codec::PcmS16Le],
            ),
            FileReaderDescriptor::new(
                "wav-native",
                "Native WAV reader",
                vec![Format::Wav],
                vec![Codec::PcmS16Le],
                vec![],
                InputType::Audio,
                unreachable_audio_reader,
            ),
        );
        registry.register(
            Matcher::new(Format::Cue, &["cue"], None, &[]),
            FileReaderDescriptor::new(
                "cuesheet",
                "Cuesheet parser",
                vec![Format::Cue],
                vec![],
                vec![],
                InputType::Toc,
                unreachable_toc_parser,
            ),
        );
        registry
    }

    #[test]
    fn infers_wav_from_riff_header_and_suffix() {
        let mut file = tempfile::Builder::new().suffix(".wav").tempfile().unwrap();
        file.write_all(b"RIFF\x24\x00\x00\x00WAVEfmt ").unwrap();

        let (format, codec) = infer_type(&registry(), file.path()).unwrap();
        assert_eq!(format, Format::Wav);
        assert_eq!(codec, Codec::PcmS16Le);
    }

    #[test]
    fn rejects_riff_header_with_wrong_suffix() {
        let mut file = tempfile::Builder::new().suffix(".bin").tempfile().unwrap();
        file.write_all(b"RIFF\x24\x00\x00\x00WAVEfmt ").unwrap();

        assert!(infer_type(&registry(), file.path()).is_err());
    }

    #[test]
    fn infers_cuesheet_from_suffix_with_no_reference_bytes() {
        let mut file = tempfile::Builder::new().suffix(".cue").tempfile().unwrap();
        file.write_all(b"FILE \"a.wav\" WAVE\n").unwrap();

        let (format, codec) = infer_type(&registry(), file.path()).unwrap();
        assert_eq!(format, Format::Cue);
        assert_eq!(codec, Codec::None);
    }

    #[test]
    fn short_file_does_not_spuriously_match_magic_bytes() {
        let mut file = tempfile::Builder::new().suffix(".wav").tempfile().unwrap();
        file.write_all(b"RI").unwrap();

        assert!(infer_type(&registry(), file.path()).is_err());
    }
}
