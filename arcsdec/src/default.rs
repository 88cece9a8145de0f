// Copyright (c) 2024 The arcsdec Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The process-wide default [`FileReaderRegistry`] and the two default
//! [`FileReaderSelector`]s built over it.
//!
//! Registration happens once, the first time [`registry`] (or a function
//! that calls it) is used, via `lazy_static`, as an explicit bootstrap
//! function in place of a static constructor run before `main`.

use lazy_static::lazy_static;

use arcsdec_core::descriptor::{Bytes, ByteSeq, Matcher};
use arcsdec_core::{Codec, FileReaderRegistry, FileReaderSelector, Format};

use crate::adapters;

lazy_static! {
    static ref REGISTRY: FileReaderRegistry = build_registry();
}

fn build_registry() -> FileReaderRegistry {
    let mut registry = FileReaderRegistry::new();

    registry.register(
        Matcher::new(
            Format::Wav,
            &["wav"],
            Some(Bytes::new(0, ByteSeq::exact(*b"RIFF"))),
            &[Codec::PcmS16Le],
        ),
        arcsdec_wav::descriptor(),
    );

    registry.register(
        Matcher::new(Format::Cue, &["cue"], None, &[]),
        arcsdec_cue::cuesheet::descriptor(),
    );

    registry.register(
        Matcher::new(Format::Cdrdao, &["toc"], None, &[]),
        arcsdec_cue::cdrdao::descriptor(),
    );

    registry.register(
        Matcher::new(
            Format::Flac,
            &["flac"],
            Some(Bytes::new(0, ByteSeq::exact(*b"fLaC"))),
            &[Codec::Flac],
        ),
        adapters::flac::descriptor(),
    );

    registry.register(
        Matcher::new(
            Format::Wv,
            &["wv"],
            Some(Bytes::new(0, ByteSeq::exact(*b"wvpk"))),
            &[Codec::WavPack],
        ),
        adapters::wavpack::descriptor(),
    );

    registry.register(
        Matcher::new(
            Format::Ape,
            &["ape"],
            Some(Bytes::new(0, ByteSeq::exact(*b"MAC "))),
            &[Codec::Monkey],
        ),
        adapters::monkey::descriptor(),
    );

    registry.register(
        Matcher::new(
            Format::Caf,
            &["caf"],
            Some(Bytes::new(0, ByteSeq::exact(*b"caff"))),
            &[],
        ),
        adapters::sndfile::descriptor(),
    );

    registry.register(
        Matcher::new(
            Format::Ogg,
            &["ogg"],
            Some(Bytes::new(0, ByteSeq::exact(*b"OggS"))),
            &[],
        ),
        adapters::sndfile::descriptor(),
    );

    registry.register(
        Matcher::new(Format::M4a, &["m4a"], None, &[Codec::Alac]),
        adapters::sndfile::descriptor(),
    );

    registry.register(
        Matcher::new(
            Format::Aiff,
            &["aiff", "aif"],
            Some(Bytes::new(0, ByteSeq::exact(*b"FORM"))),
            &[],
        ),
        adapters::sndfile::descriptor(),
    );

    registry
}

/// The process-wide default registry, populated once on first access.
pub fn registry() -> &'static FileReaderRegistry {
    &REGISTRY
}

/// A [`FileReaderSelector`] over the default registry, for audio-bearing
/// formats.
pub fn audio_selection() -> FileReaderSelector<'static> {
    FileReaderSelector::new(&REGISTRY)
}

/// A [`FileReaderSelector`] over the default registry, for ToC-only
/// formats. Uses the same `DefaultPreference` ranking as
/// [`audio_selection`]; kept as a distinct entry point since audio and
/// metadata selection are conceptually separate even though both
/// currently share one registry and preference.
pub fn toc_selection() -> FileReaderSelector<'static> {
    FileReaderSelector::new(&REGISTRY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcsdec_core::descriptor::InputType;

    #[test]
    fn registers_all_ten_formats() {
        for format in Format::ALL {
            assert!(registry().has_format(format), "missing matcher for {format:?}");
        }
    }

    #[test]
    fn selects_wavpcm_for_wav_pcm_s16le() {
        let selection = audio_selection().select(Format::Wav, Codec::PcmS16Le).unwrap();
        assert_eq!(selection.descriptor().id(), "wavpcm");
    }

    #[test]
    fn selects_flac_for_flac_flac() {
        let selection = audio_selection().select(Format::Flac, Codec::Flac).unwrap();
        assert_eq!(selection.descriptor().id(), "flac");
    }

    #[test]
    fn selects_wavpack_for_wv_wavpack() {
        let selection = audio_selection().select(Format::Wv, Codec::WavPack).unwrap();
        assert_eq!(selection.descriptor().id(), "wavpack");
    }

    #[test]
    fn selects_cuesheet_parser_for_cue_none() {
        let selection = toc_selection().select(Format::Cue, Codec::None).unwrap();
        assert_eq!(selection.descriptor().input_type(), InputType::Toc);
        assert_eq!(selection.descriptor().id(), "cuesheet");
    }
}
