// Copyright (c) 2024 The arcsdec Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]

//! Shared structs, traits, and features backing the `arcsdec` audio
//! decoding and disc table-of-contents parsing core.
//!
//! This crate is the CORE described by the project: format/codec
//! recognition and reader selection, the audio reader and ToC parser
//! framework, and the sample processor contract that a checksum engine
//! (not part of this crate) drives to compute AccurateRip values.

pub mod descriptor;
pub mod errors;
pub mod infer;
pub mod io;
pub mod libinfo;
pub mod reader;
pub mod registry;
pub mod sample;
pub mod toc;
pub mod units;

pub use descriptor::{
    Bytes, ByteSeq, Codec, FileReaderDescriptor, Format, InputType, LibInfo, LibInfoEntry, Matcher,
};
pub use errors::{FileReadError, InputFormatError, InvalidAudioError, ReaderError};
pub use infer::infer_type;
pub use libinfo::{DefaultLibraryResolver, LibraryResolver};
pub use reader::{AudioReader, MetadataParser, ReaderHandle};
pub use registry::{
    select_reader, DefaultPreference, DescriptorPreference, FileReaderRegistry,
    FileReaderSelection, FileReaderSelector, FormatPreference, IdSelector, MAX_PREFERENCE,
    MIN_PREFERENCE,
};
pub use sample::{SampleProcessor, SampleProvider};
pub use toc::ToC;
pub use units::AudioSize;
