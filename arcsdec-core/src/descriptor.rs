// Copyright (c) 2024 The arcsdec Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The descriptor model: `Format`, `Codec`, the wildcard-aware `Bytes`
//! byte pattern, `Matcher`, and `FileReaderDescriptor`.

use crate::reader::ReaderHandle;

/// A container or ToC file format recognized by the registry.
///
/// Formats with ordinal `>= Format::Wav` are audio-bearing; `Cue` and
/// `Cdrdao` are ToC-only.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum Format {
    Unknown = 0,
    Cue,
    Cdrdao,
    Wav,
    Flac,
    Ape,
    Caf,
    M4a,
    Ogg,
    Wv,
    Aiff,
}

impl Format {
    pub const ALL: [Format; 10] = [
        Format::Cue,
        Format::Cdrdao,
        Format::Wav,
        Format::Flac,
        Format::Ape,
        Format::Caf,
        Format::M4a,
        Format::Ogg,
        Format::Wv,
        Format::Aiff,
    ];

    /// A human-readable name for the format.
    pub fn name(&self) -> &'static str {
        match self {
            Format::Unknown => "Unknown",
            Format::Cue => "CUE",
            Format::Cdrdao => "cdrdao",
            Format::Wav => "wave",
            Format::Flac => "fLaC",
            Format::Ape => "APE",
            Format::Caf => "CAF",
            Format::M4a => "M4A",
            Format::Ogg => "OGG",
            Format::Wv => "WV",
            Format::Aiff => "AIFF",
        }
    }

    /// Whether the format is an audio-bearing container (as opposed to
    /// a ToC-only metadata format).
    pub fn is_audio(&self) -> bool {
        *self >= Format::Wav
    }
}

/// An audio codec, or `None` for ToC inputs that carry no audio.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Codec {
    Unknown,
    /// No codec; used for ToC-only inputs (Cuesheet, CDRDAO).
    None,
    PcmS16Be,
    PcmS16BePlanar,
    PcmS16Le,
    PcmS16LePlanar,
    PcmS32Be,
    PcmS32BePlanar,
    PcmS32Le,
    PcmS32LePlanar,
    Flac,
    WavPack,
    Monkey,
    Alac,
}

impl Codec {
    pub fn name(&self) -> &'static str {
        match self {
            Codec::Unknown => "Unknown",
            Codec::None => "None",
            Codec::PcmS16Be => "PCM_S16BE",
            Codec::PcmS16BePlanar => "PCM_S16BE_PLANAR",
            Codec::PcmS16Le => "PCM_S16LE",
            Codec::PcmS16LePlanar => "PCM_S16LE_PLANAR",
            Codec::PcmS32Be => "PCM_S32BE",
            Codec::PcmS32BePlanar => "PCM_S32BE_PLANAR",
            Codec::PcmS32Le => "PCM_S32LE",
            Codec::PcmS32LePlanar => "PCM_S32LE_PLANAR",
            Codec::Flac => "FLAC",
            Codec::WavPack => "WAVPACK",
            Codec::Monkey => "MONKEY",
            Codec::Alac => "ALAC",
        }
    }
}

/// A byte sequence paired with a wildcard mask of the same length. A
/// wildcard position matches any byte value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ByteSeq {
    bytes: Vec<u8>,
    wildcards: Vec<bool>,
}

impl ByteSeq {
    /// A sequence with no wildcard positions.
    pub fn exact(bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = bytes.into();
        let wildcards = vec![false; bytes.len()];
        ByteSeq { bytes, wildcards }
    }

    /// A sequence with wildcards at the given (0-based) positions.
    pub fn with_wildcards(bytes: impl Into<Vec<u8>>, wildcard_positions: &[usize]) -> Self {
        let bytes = bytes.into();
        let mut wildcards = vec![false; bytes.len()];
        for &pos in wildcard_positions {
            if pos < wildcards.len() {
                wildcards[pos] = true;
            }
        }
        ByteSeq { bytes, wildcards }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn is_wildcard(&self, i: usize) -> bool {
        self.wildcards.get(i).copied().unwrap_or(false)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

/// A byte pattern anchored at a file offset, used to recognize a
/// `Format` from a header probe window.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bytes {
    offset: u32,
    seq: ByteSeq,
}

impl Bytes {
    pub fn new(offset: u32, seq: ByteSeq) -> Self {
        Bytes { offset, seq }
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn sequence(&self) -> &ByteSeq {
        &self.seq
    }

    /// Tests whether `probe`, read starting at absolute file offset
    /// `probe_offset`, is consistent with this reference pattern.
    ///
    /// Semantics: an empty `probe` or an empty reference matches
    /// vacuously. A `probe_offset` at or past the end of the
    /// reference fails. Otherwise bytes are compared position-by-
    /// position over the overlapping window; a mismatch is tolerated
    /// iff the reference marks that position as a wildcard. The probe
    /// must cover the reference in full. A `probe` that extends past
    /// the reference (a suffix-preserving extension) still matches, but
    /// one that runs out before the reference does does not.
    pub fn matches(&self, probe: &[u8], probe_offset: u32) -> bool {
        if probe.is_empty() || self.seq.is_empty() {
            return true;
        }

        let ref_len = self.seq.len() as u32;
        let ref_end = self.offset + ref_len;
        let start = self.offset.max(probe_offset);

        if start >= ref_end {
            return false;
        }

        let mut i = (start - self.offset) as usize;
        let mut j = (start - probe_offset) as usize;

        while i < self.seq.len() && j < probe.len() {
            if self.seq.as_slice()[i] != probe[j] && !self.seq.is_wildcard(i) {
                return false;
            }
            i += 1;
            j += 1;
        }

        i == self.seq.len()
    }

    /// Tests two `Bytes` patterns against each other, honoring
    /// wildcards on both sides.
    pub fn matches_pattern(&self, other: &Bytes) -> bool {
        if other.seq.is_empty() || self.seq.is_empty() {
            return true;
        }

        let ref_end = self.offset + self.seq.len() as u32;
        let start = self.offset.max(other.offset);

        if start >= ref_end {
            return false;
        }

        let mut i = (start - self.offset) as usize;
        let mut j = (start - other.offset) as usize;

        while i < self.seq.len() && j < other.seq.len() {
            let mismatch = self.seq.as_slice()[i] != other.seq.as_slice()[j];
            if mismatch && !self.seq.is_wildcard(i) && !other.seq.is_wildcard(j) {
                return false;
            }
            i += 1;
            j += 1;
        }

        i == self.seq.len()
    }
}

/// Recognizes a `Format` by filename suffix and/or reference header
/// bytes, and reports the `Codec`s the format may contain.
pub struct Matcher {
    format: Format,
    suffixes: Vec<String>,
    reference: Option<Bytes>,
    codecs: Vec<Codec>,
}

impl Matcher {
    pub fn new(
        format: Format,
        suffixes: &[&str],
        reference: Option<Bytes>,
        codecs: &[Codec],
    ) -> Self {
        Matcher {
            format,
            suffixes: suffixes.iter().map(|s| s.to_ascii_lowercase()).collect(),
            reference,
            codecs: codecs.to_vec(),
        }
    }

    /// Case-insensitive suffix match against `filename`, split on `.`.
    pub fn matches_filename(&self, filename: &str) -> bool {
        let suffix = crate::io::suffix(filename, '.').to_ascii_lowercase();
        self.suffixes.iter().any(|s| s == &suffix)
    }

    /// Delegates to the reference `Bytes::matches`, starting at file
    /// offset 0. A `Matcher` with no reference bytes accepts any input.
    pub fn matches_bytes(&self, header: &[u8]) -> bool {
        match &self.reference {
            Some(bytes) => bytes.matches(header, 0),
            None => true,
        }
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn codecs(&self) -> &[Codec] {
        &self.codecs
    }
}

/// Whether a `FileReaderDescriptor`'s reader produces PCM samples or
/// parses a disc table of contents.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputType {
    Audio,
    Toc,
}

/// A `(library_name, resolved_path)` pair, as reported by
/// `FileReaderDescriptor::libraries`.
pub type LibInfoEntry = (String, Option<String>);
/// An ordered list of library entries.
pub type LibInfo = Vec<LibInfoEntry>;

/// Stateless metadata about a concrete `FileReader` backend: its id,
/// the formats and codecs it accepts, the libraries it depends on, and
/// a factory that creates a fresh reader instance.
///
/// Equality is by id (descriptors are stateless singletons); the
/// descriptor itself is cheaply `Clone`.
#[derive(Clone)]
pub struct FileReaderDescriptor {
    id: &'static str,
    name: &'static str,
    formats: Vec<Format>,
    codecs: Vec<Codec>,
    libraries: LibInfo,
    input_type: InputType,
    factory: fn() -> ReaderHandle,
}

impl FileReaderDescriptor {
    pub fn new(
        id: &'static str,
        name: &'static str,
        formats: Vec<Format>,
        codecs: Vec<Codec>,
        libraries: LibInfo,
        input_type: InputType,
        factory: fn() -> ReaderHandle,
    ) -> Self {
        FileReaderDescriptor { id, name, formats, codecs, libraries, input_type, factory }
    }

    pub fn id(&self) -> &'static str {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn formats(&self) -> &[Format] {
        &self.formats
    }

    pub fn codecs(&self) -> &[Codec] {
        &self.codecs
    }

    pub fn libraries(&self) -> &LibInfo {
        &self.libraries
    }

    pub fn input_type(&self) -> InputType {
        self.input_type
    }

    /// Whether this descriptor accepts the given format and codec. A
    /// codec of `Codec::Unknown` or `Codec::None` is accepted for any
    /// format this descriptor lists, deferring to format-only matching.
    pub fn accepts(&self, format: Format, codec: Codec) -> bool {
        self.accepts_format(format)
            && (codec == Codec::Unknown || codec == Codec::None || self.codecs.contains(&codec))
    }

    /// Whether this descriptor accepts the given format, ignoring codec.
    pub fn accepts_format(&self, format: Format) -> bool {
        self.formats.contains(&format)
    }

    /// Instantiates a fresh `FileReader` via this descriptor's factory.
    pub fn create_reader(&self) -> ReaderHandle {
        (self.factory)()
    }
}

impl PartialEq for FileReaderDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for FileReaderDescriptor {}

impl std::fmt::Debug for FileReaderDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileReaderDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("formats", &self.formats)
            .field("codecs", &self.codecs)
            .field("input_type", &self.input_type)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_match_exact_prefix() {
        let reference = Bytes::new(
            0,
            ByteSeq::exact(vec![0x01, 0x02, 0x06, 0x07, 0x4C, 0xF0]),
        );
        assert!(reference.matches(&[0x01, 0x02, 0x06, 0x07, 0x4C, 0xF0, 0xC1], 0));
    }

    #[test]
    fn bytes_match_tolerates_wildcard() {
        let reference = Bytes::new(
            0,
            ByteSeq::with_wildcards(vec![0x01, 0x00, 0x06, 0x07, 0x4C, 0xF0], &[1]),
        );
        assert!(reference.matches(&[0x01, 0x6D, 0x06, 0x07, 0x4C, 0xF0], 0));
        // Any value at the wildcard position is tolerated.
        assert!(reference.matches(&[0x01, 0x00, 0x06, 0x07, 0x4C, 0xF0], 0));
    }

    #[test]
    fn bytes_empty_probe_matches_vacuously() {
        let reference = Bytes::new(0, ByteSeq::exact(vec![0x01, 0x02]));
        assert!(reference.matches(&[], 0));
    }

    #[test]
    fn bytes_offset_beyond_reference_fails() {
        let reference = Bytes::new(0, ByteSeq::exact(vec![0x01, 0x02]));
        assert!(!reference.matches(&[0x01], 5));
    }

    #[test]
    fn matcher_filename_is_case_insensitive() {
        let matcher = Matcher::new(Format::Wav, &["wav"], None, &[]);
        assert!(matcher.matches_filename("track.WAV"));
        assert!(matcher.matches_filename("track.wav"));
        assert!(!matcher.matches_filename("track.flac"));
    }

    #[test]
    fn format_ordinal_marks_audio_formats() {
        assert!(!Format::Cue.is_audio());
        assert!(!Format::Cdrdao.is_audio());
        assert!(Format::Wav.is_audio());
        assert!(Format::Aiff.is_audio());
    }
}
