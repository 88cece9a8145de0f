// Copyright (c) 2024 The arcsdec Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The sample processor contract: the callback interface an
//! `AudioReader` drives while streaming decoded PCM, and the bookkeeping
//! mixin most implementations share.

use crate::errors::InvalidAudioError;
use crate::units::AudioSize;

/// A sink for decoded PCM samples, driven by an `AudioReader` through a
/// fixed call sequence:
///
/// `start_input` → `update_audiosize` → `append_samples`* → `end_input`
///
/// `update_audiosize` is called exactly once, before the first
/// `append_samples`, so implementations can size buffers ahead of time.
/// `end_input` is called exactly once on every exit path, including
/// error paths, so a processor can always release resources it
/// acquired in `start_input`.
pub trait SampleProcessor {
    /// Called once before any samples are delivered.
    fn start_input(&mut self) {}

    /// Called once, before the first `append_samples`, with the total
    /// number of samples the input is expected to contain.
    fn update_audiosize(&mut self, size: AudioSize);

    /// Called zero or more times with successive blocks of interleaved
    /// stereo samples, each sample packed as `(left << 0) | (right <<
    /// 16)` in a `u32`. Blocks need not be uniform in size;
    /// the final block of a stream may be shorter than preceding ones.
    fn append_samples(&mut self, samples: &[u32]) -> Result<(), InvalidAudioError>;

    /// Called once after the last `append_samples`, or immediately
    /// after `update_audiosize` if the input carried zero samples.
    fn end_input(&mut self) {}
}

/// A bookkeeping mixin layered over a `SampleProcessor`: counts the
/// number of `append_samples` calls and the cumulative number of
/// samples seen, without requiring every processor to track this
/// itself.
#[derive(Debug, Default)]
pub struct SampleProvider {
    sequences_processed: u64,
    samples_processed: u64,
}

impl SampleProvider {
    pub fn new() -> Self {
        SampleProvider::default()
    }

    /// Records one `append_samples` call carrying `count` samples.
    pub fn record(&mut self, count: usize) {
        self.sequences_processed += 1;
        self.samples_processed += count as u64;
    }

    /// Number of `append_samples` calls observed so far.
    pub fn sequences_processed(&self) -> u64 {
        self.sequences_processed
    }

    /// Cumulative number of samples observed so far.
    pub fn samples_processed(&self) -> u64 {
        self.samples_processed
    }

    pub fn reset(&mut self) {
        self.sequences_processed = 0;
        self.samples_processed = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingProcessor {
        provider: SampleProvider,
        total: Option<AudioSize>,
    }

    impl SampleProcessor for CountingProcessor {
        fn update_audiosize(&mut self, size: AudioSize) {
            self.total = Some(size);
        }

        fn append_samples(&mut self, samples: &[u32]) -> Result<(), InvalidAudioError> {
            self.provider.record(samples.len());
            Ok(())
        }
    }

    #[test]
    fn sample_provider_tracks_counts() {
        let mut processor = CountingProcessor { provider: SampleProvider::new(), total: None };
        processor.update_audiosize(AudioSize::from_samples(10));
        processor.append_samples(&[1, 2, 3]).unwrap();
        processor.append_samples(&[4, 5]).unwrap();

        assert_eq!(processor.total, Some(AudioSize::from_samples(10)));
        assert_eq!(processor.provider.sequences_processed(), 2);
        assert_eq!(processor.provider.samples_processed(), 5);
    }
}
