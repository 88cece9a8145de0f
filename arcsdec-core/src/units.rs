// Copyright (c) 2024 The arcsdec Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CD-DA constants and the position/size value types built from them.

/// Samples per second for CD-DA (Redbook) audio.
pub const SAMPLES_PER_SECOND: u32 = 44_100;
/// Bits per sample, per channel, for CD-DA audio.
pub const BITS_PER_SAMPLE: u32 = 16;
/// Number of channels in CD-DA audio.
pub const NUMBER_OF_CHANNELS: u32 = 2;
/// Bytes per interleaved stereo sample pair.
pub const BYTES_PER_SAMPLE: u32 = 4;
/// Frames (sectors) per second on a CD-DA disc.
pub const FRAMES_PER_SECOND: u32 = 75;
/// Samples per disc frame (sector).
pub const SAMPLES_PER_FRAME: u32 = 588;

/// Informational only: the maximum number of samples a Redbook-
/// conformant disc can contain. Readers in this crate do not enforce
/// this as a hard limit.
pub const REDBOOK_MAX_SAMPLES: u64 = 264_599_412;

/// The preferred minimum block size (in samples) an `AudioReader` may be
/// configured to request per read, chosen so at least one FLAC frame
/// fits in a block.
pub const MIN_SAMPLES_PER_READ: u32 = 65_536;
/// The maximum block size (in samples): 256 MiB of 32-bit samples.
pub const MAX_SAMPLES_PER_READ: u32 = 67_108_864;
/// The default block size (in samples) an `AudioReader` requests.
pub const DEFAULT_SAMPLES_PER_READ: u32 = 16_777_216;

/// The size of an audio stream expressed as a number of CD-DA frames
/// (588-sample sectors) or, equivalently, 44.1 kHz stereo samples.
///
/// Audio readers report this once, via
/// [`crate::sample::SampleProcessor::update_audiosize`], before
/// streaming any samples, so downstream consumers can size buffers
/// ahead of time.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct AudioSize {
    /// Total number of interleaved stereo samples in the stream.
    samples: u32,
}

impl AudioSize {
    pub fn from_samples(samples: u32) -> Self {
        AudioSize { samples }
    }

    pub fn from_frames(frames: u32) -> Self {
        AudioSize { samples: frames.saturating_mul(SAMPLES_PER_FRAME) }
    }

    /// Total samples, derived from a byte length of 32-bit interleaved
    /// PCM (4 bytes per sample).
    pub fn from_pcm_bytes(bytes: u64) -> Self {
        AudioSize { samples: (bytes / u64::from(BYTES_PER_SAMPLE)) as u32 }
    }

    pub fn samples(&self) -> u32 {
        self.samples
    }

    pub fn frames(&self) -> u32 {
        self.samples / SAMPLES_PER_FRAME
    }
}

/// Converts a CD-DA minutes/seconds/frames position to an absolute
/// frame (LBA) count, or `-1` if any component is out of its valid
/// domain (`m` in `0..=99`, `s` in `0..60`, `f` in `0..75`).
pub fn msf_to_frames(m: i32, s: i32, f: i32) -> i32 {
    if !(0..=99).contains(&m) || !(0..60).contains(&s) || !(0..75).contains(&f) {
        return -1;
    }

    (m * 60 + s) * FRAMES_PER_SECOND as i32 + f
}

/// The inverse of [`msf_to_frames`]: converts an absolute frame count
/// back to a `(minutes, seconds, frames)` tuple. Negative input is
/// clamped to `(0, 0, 0)`.
pub fn frames_to_msf(frames: i32) -> (i32, i32, i32) {
    if frames < 0 {
        return (0, 0, 0);
    }

    let fps = FRAMES_PER_SECOND as i32;
    let f = frames % fps;
    let total_secs = frames / fps;
    let s = total_secs % 60;
    let m = total_secs / 60;

    (m, s, f)
}
