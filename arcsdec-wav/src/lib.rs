// Copyright (c) 2024 The arcsdec Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]

//! A native RIFF/WAVE reader that validates a stream against the CD-DA
//! reference header and streams its `data` payload as interleaved
//! stereo PCM, without depending on an external codec library.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use bitflags::bitflags;
use log::{debug, warn};

use arcsdec_core::{
    AudioReader, AudioSize, Codec, FileReadError, FileReaderDescriptor, Format, InputType,
    InvalidAudioError, ReaderError, SampleProcessor, SampleProvider,
};

const MIN_SAMPLES_PER_READ: u32 = arcsdec_core::units::MIN_SAMPLES_PER_READ;
const MAX_SAMPLES_PER_READ: u32 = arcsdec_core::units::MAX_SAMPLES_PER_READ;
const DEFAULT_SAMPLES_PER_READ: u32 = arcsdec_core::units::DEFAULT_SAMPLES_PER_READ;

/// The size, in bytes, of the canonical CD-DA WAVE header this reader
/// validates: `RIFF` chunk descriptor (12 bytes) + `fmt ` subchunk (8
/// byte header + 16 byte PCM body) + `data` subchunk header (8 bytes).
const HEADER_LEN: usize = 44;

bitflags! {
    /// Controls which parts of the CD-DA reference header are enforced.
    /// All bits are set by [`ValidationOptions::default`];
    /// callers that need to tolerate a non-conforming field (e.g. a
    /// declared file size that disagrees with the physical size because
    /// it was copied with extra trailing bytes) clear the corresponding
    /// bit.
    pub struct ValidationOptions: u32 {
        /// The declared `FileSize - 8` must equal the physical file size
        /// minus 8.
        const RESPECT_HEADER = 0b0001;
        /// `fmt ` subchunk fields must match CD-DA exactly (PCM, stereo,
        /// 44100 Hz, 16 bits/sample, 4-byte block align).
        const RESPECT_FORMAT = 0b0010;
        /// The `data` subchunk size must be a multiple of 4 bytes.
        const RESPECT_DATA = 0b0100;
        /// After the `data` subchunk, continue validating any further
        /// subchunks rather than stopping at `S_COMPLETED_DATA`.
        const RESPECT_TRAILING = 0b1000;
    }
}

impl Default for ValidationOptions {
    fn default() -> Self {
        ValidationOptions::all()
    }
}

/// Configuration for a [`WavReader`]: the validation policy and the
/// block size used when streaming PCM.
#[derive(Debug, Clone, Copy)]
pub struct ReaderOptions {
    pub validation: ValidationOptions,
    pub samples_per_read: u32,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        ReaderOptions {
            validation: ValidationOptions::default(),
            samples_per_read: DEFAULT_SAMPLES_PER_READ,
        }
    }
}

/// The RIFF/WAVE parse state, advanced monotonically while validating
/// the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    Initial,
    CompletedHeader,
    CompletedFormat,
    CompletedData,
}

/// Builds a fresh descriptor for the native WAV reader, suitable for
/// registration in a `FileReaderRegistry`.
pub fn descriptor() -> FileReaderDescriptor {
    FileReaderDescriptor::new(
        "wavpcm",
        "Native RIFF/WAVE reader",
        vec![Format::Wav],
        vec![Codec::PcmS16Le],
        vec![],
        InputType::Audio,
        || arcsdec_core::ReaderHandle::Audio(Box::new(WavReader::new())),
    )
}

/// A RIFF/WAVE reader restricted to the CD-DA PCM profile.
pub struct WavReader {
    descriptor: FileReaderDescriptor,
    options: ReaderOptions,
    state: ParseState,
    processor: Option<Box<dyn SampleProcessor>>,
    provider: SampleProvider,
}

impl WavReader {
    pub fn new() -> Self {
        WavReader::with_options(ReaderOptions::default())
    }

    pub fn with_options(options: ReaderOptions) -> Self {
        WavReader {
            descriptor: descriptor(),
            options,
            state: ParseState::Initial,
            processor: None,
            provider: SampleProvider::new(),
        }
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Number of `append_samples` calls made while streaming the most
    /// recently processed file.
    pub fn sequences_processed(&self) -> u64 {
        self.provider.sequences_processed()
    }

    /// Cumulative number of samples streamed while processing the most
    /// recently processed file.
    pub fn samples_processed(&self) -> u64 {
        self.provider.samples_processed()
    }

    fn validation(&self) -> ValidationOptions {
        self.options.validation
    }

    /// Parses and validates the 44-byte canonical header, returning the
    /// declared `data` subchunk byte length.
    fn validate_header(&mut self, header: &[u8; HEADER_LEN], physical_len: u64) -> Result<u32, InvalidAudioError> {
        self.state = ParseState::Initial;

        if &header[0..4] != b"RIFF" {
            return Err(InvalidAudioError::new("missing RIFF chunk descriptor"));
        }

        let declared_size = u32::from_le_bytes(header[4..8].try_into().unwrap());
        if self.validation().contains(ValidationOptions::RESPECT_HEADER) {
            let expected = physical_len.saturating_sub(8);
            if u64::from(declared_size) != expected {
                return Err(InvalidAudioError::new(format!(
                    "declared RIFF size {declared_size} does not match physical size - 8 ({expected})"
                )));
            }
        }

        if &header[8..12] != b"WAVE" {
            return Err(InvalidAudioError::new("RIFF form type is not WAVE"));
        }

        self.state = ParseState::CompletedHeader;

        if &header[12..16] != b"fmt " {
            return Err(InvalidAudioError::new("'fmt ' must be the first subchunk"));
        }

        let fmt_size = u32::from_le_bytes(header[16..20].try_into().unwrap());
        let format_tag = u16::from_le_bytes(header[20..22].try_into().unwrap());
        let channels = u16::from_le_bytes(header[22..24].try_into().unwrap());
        let sample_rate = u32::from_le_bytes(header[24..28].try_into().unwrap());
        let byte_rate = u32::from_le_bytes(header[28..32].try_into().unwrap());
        let block_align = u16::from_le_bytes(header[32..34].try_into().unwrap());
        let bits_per_sample = u16::from_le_bytes(header[34..36].try_into().unwrap());

        if self.validation().contains(ValidationOptions::RESPECT_FORMAT) {
            if fmt_size != 16 {
                return Err(InvalidAudioError::new(format!("unsupported 'fmt ' size {fmt_size}, expected 16")));
            }
            if format_tag != 1 {
                return Err(InvalidAudioError::new(format!("wFormatTag {format_tag} is not PCM")));
            }
            if channels != 2 {
                return Err(InvalidAudioError::new(format!("wChannels {channels}, expected 2")));
            }
            if sample_rate != 44_100 {
                return Err(InvalidAudioError::new(format!("dwSamplesPerSec {sample_rate}, expected 44100")));
            }
            if byte_rate != 176_400 {
                return Err(InvalidAudioError::new(format!("dwAvgBytesPerSec {byte_rate}, expected 176400")));
            }
            if block_align != 4 {
                return Err(InvalidAudioError::new(format!("wBlockAlign {block_align}, expected 4")));
            }
            if bits_per_sample != 16 {
                return Err(InvalidAudioError::new(format!(
                    "wBitsPerSample {bits_per_sample}, expected 16"
                )));
            }
        }

        self.state = ParseState::CompletedFormat;

        if &header[36..40] != b"data" {
            return Err(InvalidAudioError::new("'data' subchunk must immediately follow 'fmt '"));
        }

        let data_size = u32::from_le_bytes(header[40..44].try_into().unwrap());
        if self.validation().contains(ValidationOptions::RESPECT_DATA) && data_size % 4 != 0 {
            return Err(InvalidAudioError::new(format!(
                "'data' size {data_size} is not a multiple of 4 bytes"
            )));
        }

        self.state = ParseState::CompletedData;

        let declared_samples = u64::from(data_size) / u64::from(arcsdec_core::units::BYTES_PER_SAMPLE);
        if declared_samples > arcsdec_core::units::REDBOOK_MAX_SAMPLES {
            warn!(
                "declared sample count {declared_samples} exceeds the Redbook maximum of {}; streaming it anyway",
                arcsdec_core::units::REDBOOK_MAX_SAMPLES
            );
        }

        Ok(data_size)
    }

    fn stream_pcm(
        &mut self,
        file: &mut File,
        data_size: u32,
        processor: &mut dyn SampleProcessor,
    ) -> Result<(), ReaderError> {
        processor.update_audiosize(AudioSize::from_pcm_bytes(u64::from(data_size)));

        let block_samples = self.options.samples_per_read.clamp(MIN_SAMPLES_PER_READ, MAX_SAMPLES_PER_READ);
        let block_bytes = block_samples as usize * 4;

        let mut remaining = data_size as u64;
        let mut byte_pos: u64 = HEADER_LEN as u64;
        let mut raw = vec![0u8; block_bytes];

        while remaining > 0 {
            let want = remaining.min(block_bytes as u64) as usize;
            let buf = &mut raw[..want];

            read_exact_tracked(file, buf, byte_pos)?;

            let mut packed = Vec::with_capacity(want / 4);
            for quad in buf.chunks_exact(4) {
                let left = u16::from_le_bytes([quad[0], quad[1]]);
                let right = u16::from_le_bytes([quad[2], quad[3]]);
                packed.push(u32::from(left) | (u32::from(right) << 16));
            }

            processor.append_samples(&packed)?;
            self.provider.record(packed.len());

            byte_pos += want as u64;
            remaining -= want as u64;
        }

        if self.validation().contains(ValidationOptions::RESPECT_TRAILING) {
            self.validate_trailing(file, byte_pos)?;
        }

        Ok(())
    }

    /// After the `data` payload, walk any further subchunks purely to
    /// confirm the file is not truncated mid-chunk; their contents are
    /// discarded.
    fn validate_trailing(&self, file: &mut File, mut byte_pos: u64) -> Result<(), InvalidAudioError> {
        loop {
            let mut tag_and_len = [0u8; 8];
            let n = read_some(file, &mut tag_and_len)
                .map_err(|e| InvalidAudioError::new(format!("error scanning trailing chunks: {e}")))?;

            if n == 0 {
                return Ok(());
            }
            if n < 8 {
                return Err(InvalidAudioError::new(format!(
                    "truncated subchunk header at byte {byte_pos}"
                )));
            }

            let len = u32::from_le_bytes(tag_and_len[4..8].try_into().unwrap());
            byte_pos += 8;

            let mut skip = u64::from(len);
            if len % 2 == 1 {
                skip += 1; // RIFF chunks are 2-byte aligned.
            }

            let mut sink = [0u8; 1024];
            while skip > 0 {
                let want = skip.min(sink.len() as u64) as usize;
                let got = read_some(file, &mut sink[..want])
                    .map_err(|e| InvalidAudioError::new(format!("error skipping trailing chunk: {e}")))?;
                if got < want {
                    return Err(InvalidAudioError::new(format!(
                        "trailing subchunk truncated at byte {byte_pos}"
                    )));
                }
                byte_pos += got as u64;
                skip -= got as u64;
            }

            debug!("skipped trailing subchunk of {len} bytes");
        }
    }
}

impl Default for WavReader {
    fn default() -> Self {
        WavReader::new()
    }
}

impl AudioReader for WavReader {
    fn descriptor(&self) -> &FileReaderDescriptor {
        &self.descriptor
    }

    fn set_samples_per_read(&mut self, samples: u32) {
        self.options.samples_per_read = samples.clamp(MIN_SAMPLES_PER_READ, MAX_SAMPLES_PER_READ);
    }

    fn samples_per_read(&self) -> u32 {
        self.options.samples_per_read
    }

    fn attach_processor(&mut self, processor: Box<dyn SampleProcessor>) {
        self.processor = Some(processor);
    }

    fn acquire_size(&self, path: &Path) -> Result<AudioSize, FileReadError> {
        let mut file = File::open(path)
            .map_err(|e| FileReadError::new(format!("failed to open {}: {e}", path.display())))?;

        let mut header = [0u8; HEADER_LEN];
        read_exact_tracked(&mut file, &mut header, 0)?;

        if &header[36..40] != b"data" {
            return Err(FileReadError::new(format!(
                "{} does not have a canonical 44-byte CD-DA header",
                path.display()
            )));
        }

        let data_size = u32::from_le_bytes(header[40..44].try_into().unwrap());
        Ok(AudioSize::from_pcm_bytes(u64::from(data_size)))
    }

    fn process_file(&mut self, path: &Path) -> Result<(), ReaderError> {
        let mut processor = self
            .processor
            .take()
            .ok_or_else(|| ReaderError::from(InvalidAudioError::new("no SampleProcessor attached")))?;

        processor.start_input();
        self.provider.reset();

        let result = self.process_file_inner(path, processor.as_mut());

        processor.end_input();
        self.processor = Some(processor);
        result
    }
}

impl WavReader {
    fn process_file_inner(&mut self, path: &Path, processor: &mut dyn SampleProcessor) -> Result<(), ReaderError> {
        let mut file = File::open(path)
            .map_err(|e| ReaderError::from(FileReadError::new(format!("failed to open {}: {e}", path.display()))))?;

        let physical_len = file
            .metadata()
            .map_err(|e| ReaderError::from(FileReadError::new(format!("failed to stat {}: {e}", path.display()))))?
            .len();

        let mut header = [0u8; HEADER_LEN];
        read_exact_tracked(&mut file, &mut header, 0)?;

        let data_size = self.validate_header(&header, physical_len).map_err(|e| {
            warn!("{} failed CD-DA header validation: {e}", path.display());
            e
        })?;

        self.stream_pcm(&mut file, data_size, processor)
    }
}

fn read_some(file: &mut File, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut total = 0;
    while total < buf.len() {
        match file.read(&mut buf[total..]) {
            Ok(0) => break,
            Ok(n) => total += n,
            Err(ref e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(total)
}

fn read_exact_tracked(file: &mut File, buf: &mut [u8], byte_pos: u64) -> Result<(), FileReadError> {
    let n = read_some(file, buf).map_err(FileReadError::from)?;
    if n < buf.len() {
        let pos = file.stream_position().unwrap_or(byte_pos + n as u64);
        warn!("short read at byte {pos}: expected {} bytes, got {n}", buf.len());
        return Err(FileReadError::at(
            format!("expected {} bytes, got {n}", buf.len()),
            byte_pos + n as u64,
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn synth_wav(num_samples: u32) -> Vec<u8> {
        let data_size = num_samples * 4;
        let mut buf = Vec::with_capacity(HEADER_LEN + data_size as usize);
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVE");
        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes());
        buf.extend_from_slice(&2u16.to_le_bytes());
        buf.extend_from_slice(&44_100u32.to_le_bytes());
        buf.extend_from_slice(&176_400u32.to_le_bytes());
        buf.extend_from_slice(&4u16.to_le_bytes());
        buf.extend_from_slice(&16u16.to_le_bytes());
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for i in 0..num_samples {
            buf.extend_from_slice(&(i as u16).to_le_bytes());
            buf.extend_from_slice(&((i as u16).wrapping_add(1)).to_le_bytes());
        }
        buf
    }

    struct CollectingProcessor {
        total: Option<AudioSize>,
        samples: Vec<u32>,
        started: bool,
        ended: bool,
    }

    impl CollectingProcessor {
        fn new() -> Self {
            CollectingProcessor { total: None, samples: Vec::new(), started: false, ended: false }
        }
    }

    impl SampleProcessor for CollectingProcessor {
        fn start_input(&mut self) {
            self.started = true;
        }
        fn update_audiosize(&mut self, size: AudioSize) {
            self.total = Some(size);
        }
        fn append_samples(&mut self, samples: &[u32]) -> Result<(), InvalidAudioError> {
            self.samples.extend_from_slice(samples);
            Ok(())
        }
        fn end_input(&mut self) {
            self.ended = true;
        }
    }

    #[test]
    fn reads_synthetic_wav_end_to_end() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&synth_wav(1025)).unwrap();

        let mut reader = WavReader::with_options(ReaderOptions {
            validation: ValidationOptions::default(),
            samples_per_read: MIN_SAMPLES_PER_READ,
        });
        let processor = Box::new(CollectingProcessor::new());
        reader.attach_processor(processor);
        reader.process_file(file.path()).unwrap();

        assert_eq!(reader.state(), ParseState::CompletedData);
        assert_eq!(reader.samples_processed(), 1025);
        assert_eq!(reader.sequences_processed(), 1);
    }

    #[test]
    fn rejects_non_riff_header() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let mut bytes = synth_wav(4);
        bytes[0] = b'X';
        file.write_all(&bytes).unwrap();

        let mut reader = WavReader::new();
        reader.attach_processor(Box::new(CollectingProcessor::new()));
        let err = reader.process_file(file.path()).unwrap_err();
        assert!(matches!(err, ReaderError::Invalid(_)));
    }

    #[test]
    fn rejects_non_cdda_sample_rate_when_respecting_format() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let mut bytes = synth_wav(4);
        bytes[24..28].copy_from_slice(&48_000u32.to_le_bytes());
        file.write_all(&bytes).unwrap();

        let mut reader = WavReader::new();
        reader.attach_processor(Box::new(CollectingProcessor::new()));
        assert!(reader.process_file(file.path()).is_err());
    }

    #[test]
    fn tolerates_non_cdda_fields_when_format_respect_disabled() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let mut bytes = synth_wav(4);
        bytes[24..28].copy_from_slice(&48_000u32.to_le_bytes());
        file.write_all(&bytes).unwrap();

        let mut options = ValidationOptions::default();
        options.remove(ValidationOptions::RESPECT_FORMAT);
        let mut reader = WavReader::with_options(ReaderOptions { validation: options, samples_per_read: MIN_SAMPLES_PER_READ });
        reader.attach_processor(Box::new(CollectingProcessor::new()));
        reader.process_file(file.path()).unwrap();
    }

    #[test]
    fn truncated_data_fails_with_byte_pos() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let mut bytes = synth_wav(100);
        bytes.truncate(HEADER_LEN + 50); // declared 400 bytes of data, only 50 present
        file.write_all(&bytes).unwrap();

        let mut reader = WavReader::new();
        reader.attach_processor(Box::new(CollectingProcessor::new()));
        let err = reader.process_file(file.path()).unwrap_err();
        assert!(matches!(err, ReaderError::Read(_)));
    }

    #[test]
    fn acquire_size_reports_sample_count_without_decoding() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&synth_wav(1025)).unwrap();

        let reader = WavReader::new();
        let size = reader.acquire_size(file.path()).unwrap();
        assert_eq!(size.samples(), 1025);
    }
}
