// Copyright (c) 2024 The arcsdec Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The reader registry and selection model: a process-wide table of
//! `Matcher`/`FileReaderDescriptor` pairs, and a selector that
//! picks among descriptors accepting a given format/codec by a
//! pluggable preference ranking, mirroring the tier-sorted `make()`
//! pattern of a codec registry.

use log::debug;

use crate::descriptor::{Codec, FileReaderDescriptor, Format, Matcher};
use crate::reader::ReaderHandle;

/// The lowest preference rank a descriptor can receive; also the
/// sentinel meaning "does not accept this format/codec at all".
pub const MIN_PREFERENCE: i32 = 0;
/// The highest preference rank a descriptor can receive.
pub const MAX_PREFERENCE: i32 = 100;

/// Ranks a candidate descriptor against a `(Format, Codec)` pair. Higher
/// is preferred; `MIN_PREFERENCE` means "does not apply" and is never
/// selected.
pub trait DescriptorPreference {
    fn preference(&self, format: Format, codec: Codec, descriptor: &FileReaderDescriptor) -> i32;
}

/// Scores a descriptor that accepts both `format` and `codec` as
/// `MAX_PREFERENCE` minus a penalty proportional to how many formats and
/// codecs it lists, so a reader specialized to exactly one format and
/// one codec outranks a generic multi-format/multi-codec one. Descriptors
/// that don't accept the pair score `MIN_PREFERENCE`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultPreference;

impl DescriptorPreference for DefaultPreference {
    fn preference(&self, format: Format, codec: Codec, descriptor: &FileReaderDescriptor) -> i32 {
        if !descriptor.accepts(format, codec) {
            return MIN_PREFERENCE;
        }
        specialization_score(descriptor)
    }
}

/// Identical to [`DefaultPreference`] except the accept check ignores
/// `codec` entirely, scoring on format match alone. Used while codec
/// recognition for a given format is not yet reliable.
#[derive(Debug, Default, Clone, Copy)]
pub struct FormatPreference;

impl DescriptorPreference for FormatPreference {
    fn preference(&self, format: Format, _codec: Codec, descriptor: &FileReaderDescriptor) -> i32 {
        if !descriptor.accepts_format(format) {
            return MIN_PREFERENCE;
        }
        specialization_score(descriptor)
    }
}

/// `MAX_PREFERENCE − 2·(|formats|−1) − (|codecs|−1)`, clamped at
/// `MIN_PREFERENCE`. A descriptor with an empty codec list (a ToC
/// parser, which accepts no codec at all) is scored as if it listed
/// exactly one, since it carries no codec-breadth penalty to apply.
fn specialization_score(descriptor: &FileReaderDescriptor) -> i32 {
    let formats = descriptor.formats().len() as i32;
    let codecs = descriptor.codecs().len().max(1) as i32;
    (MAX_PREFERENCE - 2 * (formats - 1) - (codecs - 1)).max(MIN_PREFERENCE)
}

/// Picks the descriptor in `readers` with the strictly highest
/// preference for `(format, codec)`; ties keep whichever was
/// encountered first. Returns `None` if every candidate scores
/// `MIN_PREFERENCE`: a minimum preference yields no selection.
pub fn select_reader<'d>(
    format: Format,
    codec: Codec,
    readers: &'d [FileReaderDescriptor],
    preference: &dyn DescriptorPreference,
) -> Option<&'d FileReaderDescriptor> {
    let mut best: Option<(&FileReaderDescriptor, i32)> = None;

    for descriptor in readers {
        let score = preference.preference(format, codec, descriptor);
        debug!("descriptor '{}' scores {score} for {format:?}/{codec:?}", descriptor.id());
        if score <= MIN_PREFERENCE {
            continue;
        }
        if best.as_ref().map_or(true, |&(_, best_score)| score > best_score) {
            best = Some((descriptor, score));
        }
    }

    best.map(|(descriptor, _)| descriptor)
}

/// The process-wide table of recognized formats and the readers that
/// can handle them. `Matcher`s drive [`crate::infer::infer_type`];
/// descriptors drive selection.
#[derive(Default)]
pub struct FileReaderRegistry {
    matchers: Vec<Matcher>,
    descriptors: Vec<FileReaderDescriptor>,
}

impl FileReaderRegistry {
    pub fn new() -> Self {
        FileReaderRegistry::default()
    }

    /// Registers a `Matcher`/`FileReaderDescriptor` pair. Matchers are
    /// tried, during inference, in the order they were registered.
    pub fn register(&mut self, matcher: Matcher, descriptor: FileReaderDescriptor) {
        self.matchers.push(matcher);
        self.descriptors.push(descriptor);
    }

    pub fn matchers(&self) -> &[Matcher] {
        &self.matchers
    }

    pub fn descriptors(&self) -> &[FileReaderDescriptor] {
        &self.descriptors
    }

    /// Whether any registered `Matcher` recognizes `format`.
    pub fn has_format(&self, format: Format) -> bool {
        self.matchers.iter().any(|m| m.format() == format)
    }

    /// Descriptors that accept the given format/codec pair, in
    /// registration order.
    pub fn descriptors_for(&self, format: Format, codec: Codec) -> Vec<&FileReaderDescriptor> {
        self.descriptors.iter().filter(|d| d.accepts(format, codec)).collect()
    }
}

/// Picks one descriptor among those registered, using a
/// `DescriptorPreference` to rank candidates for a given format/codec.
pub struct FileReaderSelector<'a> {
    registry: &'a FileReaderRegistry,
    preference: Box<dyn DescriptorPreference>,
}

impl<'a> FileReaderSelector<'a> {
    pub fn new(registry: &'a FileReaderRegistry) -> Self {
        FileReaderSelector { registry, preference: Box::new(DefaultPreference) }
    }

    pub fn with_preference(
        registry: &'a FileReaderRegistry,
        preference: Box<dyn DescriptorPreference>,
    ) -> Self {
        FileReaderSelector { registry, preference }
    }

    /// Selects the highest-preference descriptor accepting `format` and
    /// `codec`, or `None` if none do.
    pub fn select(&self, format: Format, codec: Codec) -> Option<FileReaderSelection> {
        select_reader(format, codec, self.registry.descriptors(), self.preference.as_ref())
            .map(|descriptor| FileReaderSelection { descriptor: descriptor.clone() })
    }
}

/// Selects a descriptor by id, ignoring preference and format/codec
/// entirely.
pub struct IdSelector<'a> {
    registry: &'a FileReaderRegistry,
}

impl<'a> IdSelector<'a> {
    pub fn new(registry: &'a FileReaderRegistry) -> Self {
        IdSelector { registry }
    }

    pub fn select(&self, id: &str) -> Option<FileReaderSelection> {
        self.registry
            .descriptors()
            .iter()
            .find(|d| d.id() == id)
            .map(|descriptor| FileReaderSelection { descriptor: descriptor.clone() })
    }
}

/// The outcome of a successful selection: the descriptor chosen, ready
/// to instantiate a reader from.
#[derive(Clone)]
pub struct FileReaderSelection {
    descriptor: FileReaderDescriptor,
}

impl FileReaderSelection {
    /// Composes [`DefaultPreference`] with [`select_reader`] over a bare
    /// slice of descriptors, without needing a [`FileReaderRegistry`].
    pub fn get(format: Format, codec: Codec, readers: &[FileReaderDescriptor]) -> Option<Self> {
        select_reader(format, codec, readers, &DefaultPreference)
            .map(|descriptor| FileReaderSelection { descriptor: descriptor.clone() })
    }

    pub fn descriptor(&self) -> &FileReaderDescriptor {
        &self.descriptor
    }

    pub fn create_reader(&self) -> ReaderHandle {
        self.descriptor.create_reader()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::InputType;
    use crate::reader::{AudioReader, MetadataParser};

    fn stub_audio_reader() -> ReaderHandle {
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
                _path: &std::path::Path,
            ) -> Result<crate::units::AudioSize, crate::errors::FileReadError> {
                unreachable!()
            }
            fn process_file(&mut self, _path: &std::path::Path) -> Result<(), crate::errors::ReaderError> {
                unreachable!()
            }
        }
        ReaderHandle::Audio(Box::new(Stub))
    }

    fn stub_toc_parser() -> ReaderHandle {
        struct Stub;
        impl MetadataParser for Stub {
            fn descriptor(&self) -> &FileReaderDescriptor {
                unreachable!()
            }
            fn parse(&self, _path: &std::path::Path) -> Result<crate::toc::ToC, crate::errors::ReaderError> {
                unreachable!()
            }
        }
        ReaderHandle::Toc(Box::new(Stub))
    }

    fn registry_with_wav_and_flac() -> FileReaderRegistry {
        let mut registry = FileReaderRegistry::new();
        registry.register(
            Matcher::new(Format::Wav, &["wav"], None, &[Codec::PcmS16Le]),
            FileReaderDescriptor::new(
                "wavpcm",
                "Native WAV reader",
                vec![Format::Wav],
                vec![Codec::PcmS16Le],
                vec![],
                InputType::Audio,
                stub_audio_reader,
            ),
        );
        registry.register(
            Matcher::new(Format::Flac, &["flac"], None, &[Codec::Flac]),
            FileReaderDescriptor::new(
                "flac",
                "libFLAC reader",
                vec![Format::Flac],
                vec![Codec::Flac],
                vec![("libFLAC".to_string(), None)],
                InputType::Audio,
                stub_audio_reader,
            ),
        );
        registry
    }

    #[test]
    fn selects_unique_candidate_for_format() {
        let registry = registry_with_wav_and_flac();
        let selector = FileReaderSelector::new(&registry);

        let selection = selector.select(Format::Wav, Codec::PcmS16Le).unwrap();
        assert_eq!(selection.descriptor().id(), "wavpcm");

        let selection = selector.select(Format::Flac, Codec::Flac).unwrap();
        assert_eq!(selection.descriptor().id(), "flac");
    }

    #[test]
    fn selects_none_for_unregistered_format() {
        let registry = registry_with_wav_and_flac();
        let selector = FileReaderSelector::new(&registry);
        assert!(selector.select(Format::Ape, Codec::Unknown).is_none());
    }

    #[test]
    fn min_preference_yields_no_selection() {
        let registry = registry_with_wav_and_flac();
        let selector = FileReaderSelector::new(&registry);
        // wavpcm only accepts PcmS16Le; a different concrete codec must
        // not silently match a descriptor that does not list it.
        assert!(selector.select(Format::Wav, Codec::PcmS32Le).is_none());
    }

    #[test]
    fn specialized_reader_outranks_generic_multi_format_reader() {
        let mut registry = FileReaderRegistry::new();
        registry.register(
            Matcher::new(Format::Wav, &["wav"], None, &[]),
            FileReaderDescriptor::new(
                "generic-sndfile",
                "Generic multi-format reader",
                vec![Format::Wav, Format::Aiff, Format::Caf],
                vec![Codec::PcmS16Le, Codec::PcmS16Be, Codec::PcmS32Le],
                vec![],
                InputType::Audio,
                stub_audio_reader,
            ),
        );
        registry.register(
            Matcher::new(Format::Wav, &["wav"], None, &[Codec::PcmS16Le]),
            FileReaderDescriptor::new(
                "wavpcm",
                "Native WAV reader",
                vec![Format::Wav],
                vec![Codec::PcmS16Le],
                vec![],
                InputType::Audio,
                stub_audio_reader,
            ),
        );

        let selector = FileReaderSelector::new(&registry);
        let selection = selector.select(Format::Wav, Codec::PcmS16Le).unwrap();
        assert_eq!(selection.descriptor().id(), "wavpcm");
    }

    #[test]
    fn format_preference_ignores_codec_in_accept_check() {
        let registry = registry_with_wav_and_flac();
        let selector =
            FileReaderSelector::with_preference(&registry, Box::new(FormatPreference));

        // `Codec::PcmS32Le` is not listed by "wavpcm", but FormatPreference
        // only checks the format.
        let selection = selector.select(Format::Wav, Codec::PcmS32Le).unwrap();
        assert_eq!(selection.descriptor().id(), "wavpcm");
    }

    #[test]
    fn id_selector_ignores_format_and_codec() {
        let registry = registry_with_wav_and_flac();
        let selector = IdSelector::new(&registry);
        let selection = selector.select("flac").unwrap();
        assert_eq!(selection.descriptor().id(), "flac");
        assert!(selector.select("nonexistent").is_none());
    }

    #[test]
    fn selection_get_composes_default_preference_over_a_bare_slice() {
        let descriptors = vec![
            FileReaderDescriptor::new(
                "wavpcm",
                "Native WAV reader",
                vec![Format::Wav],
                vec![Codec::PcmS16Le],
                vec![],
                InputType::Audio,
                stub_audio_reader,
            ),
        ];
        let selection = FileReaderSelection::get(Format::Wav, Codec::PcmS16Le, &descriptors).unwrap();
        assert_eq!(selection.descriptor().id(), "wavpcm");
        assert!(FileReaderSelection::get(Format::Flac, Codec::Flac, &descriptors).is_none());
    }

    #[test]
    fn toc_descriptor_round_trips_through_registry() {
        let mut registry = FileReaderRegistry::new();
        registry.register(
            Matcher::new(Format::Cue, &["cue"], None, &[]),
            FileReaderDescriptor::new(
                "cuesheet",
                "Cuesheet parser",
                vec![Format::Cue],
                vec![],
                vec![],
                InputType::Toc,
                stub_toc_parser,
            ),
        );

        let selector = FileReaderSelector::new(&registry);
        let selection = selector.select(Format::Cue, Codec::None).unwrap();
        assert_eq!(selection.descriptor().input_type(), InputType::Toc);
    }

    #[test]
    fn has_format_reports_registered_matchers() {
        let registry = registry_with_wav_and_flac();
        assert!(registry.has_format(Format::Wav));
        assert!(registry.has_format(Format::Flac));
        assert!(!registry.has_format(Format::Ape));
    }
}
