// Copyright (c) 2024 The arcsdec Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Byte-level utilities: a bounded file-slice reader, and a small
//! `ByteStream` trait layering big/little-endian primitive decoding
//! over anything implementing `std::io::Read`.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use byteorder::{ByteOrder, BigEndian, LittleEndian, ReadBytesExt};

use crate::errors::FileReadError;

/// Reads exactly `length` bytes from `path` starting at `offset`.
///
/// This is the bounded file-slice reader used by file-type inference
/// (to read the probe header) and by `Matcher::matches` (to compare
/// against a reference `Bytes` pattern).
///
/// # Errors
///
/// Returns [`FileReadError`] if the file cannot be opened, the seek
/// fails, or fewer than `length` bytes are available. In the latter
/// case `byte_pos` is the offset of the first byte that could not be
/// read, i.e. `offset + bytes_actually_read`.
pub fn read_bytes(path: &Path, offset: u64, length: u32) -> Result<Vec<u8>, FileReadError> {
    let mut file = File::open(path)
        .map_err(|e| FileReadError::new(format!("failed to open {}: {e}", path.display())))?;

    file.seek(SeekFrom::Start(offset))
        .map_err(|e| FileReadError::new(format!("failed to seek {}: {e}", path.display())))?;

    let mut buf = vec![0u8; length as usize];
    let mut read_total = 0usize;

    loop {
        match file.read(&mut buf[read_total..]) {
            Ok(0) => break,
            Ok(n) => read_total += n,
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(FileReadError::at(
                    format!("read error on {}: {e}", path.display()),
                    offset + read_total as u64,
                ))
            }
        }

        if read_total == buf.len() {
            break;
        }
    }

    if read_total < buf.len() {
        return Err(FileReadError::at(
            format!(
                "expected {} bytes at offset {offset} in {}, got {read_total}",
                length,
                path.display()
            ),
            offset + read_total as u64,
        ));
    }

    Ok(buf)
}

/// Returns the suffix of `filename` following the last occurrence of
/// `delimiter`, or the entire filename if `delimiter` is absent.
pub fn suffix<'a>(filename: &'a str, delimiter: char) -> &'a str {
    match filename.rfind(delimiter) {
        Some(pos) => &filename[pos + 1..],
        None => filename,
    }
}

/// A `ByteStream` provides sequential, forward-only reads of raw bytes
/// and big/little-endian unsigned integers over an underlying
/// `std::io::Read`. Unlike `read_bytes`, partial reads on the final
/// block of a stream (e.g. the tail of a `data` subchunk) are exposed
/// rather than treated as an error; callers that need an exact fill use
/// `read_exact_bytes`.
pub trait ByteStream: Read {
    /// Reads a single byte.
    fn read_u8(&mut self) -> io::Result<u8> {
        ReadBytesExt::read_u8(self)
    }

    /// Reads a 4-byte, big-endian-encoded ASCII tag (e.g. a RIFF chunk
    /// id). Tag bytes are always read in file order regardless of the
    /// numeric endianness of neighboring fields.
    fn read_tag(&mut self) -> io::Result<[u8; 4]> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn read_u16_le(&mut self) -> io::Result<u16> {
        self.read_u16::<LittleEndian>()
    }

    fn read_u16_be(&mut self) -> io::Result<u16> {
        self.read_u16::<BigEndian>()
    }

    fn read_u32_le(&mut self) -> io::Result<u32> {
        self.read_u32::<LittleEndian>()
    }

    fn read_u32_be(&mut self) -> io::Result<u32> {
        self.read_u32::<BigEndian>()
    }

    fn read_u16<O: ByteOrder>(&mut self) -> io::Result<u16> {
        ReadBytesExt::read_u16::<O>(self)
    }

    fn read_u32<O: ByteOrder>(&mut self) -> io::Result<u32> {
        ReadBytesExt::read_u32::<O>(self)
    }

    /// Fills `buf` completely or returns an error; use for fixed-size
    /// headers where a short read always indicates truncation.
    fn read_exact_bytes(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.read_exact(buf)
    }

    /// Reads up to `buf.len()` bytes, returning the number actually
    /// read. Zero indicates end-of-stream. Use for the final block of a
    /// bounded region where a short read is expected, not an error.
    fn read_partial(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read(buf)
    }

    /// Discards the next `count` bytes without buffering them.
    fn ignore_bytes(&mut self, count: u64) -> io::Result<()> {
        let mut remaining = count;
        let mut sink = [0u8; 1024];

        while remaining > 0 {
            let n = remaining.min(sink.len() as u64) as usize;
            self.read_exact(&mut sink[..n])?;
            remaining -= n as u64;
        }

        Ok(())
    }
}

impl<R: Read + ?Sized> ByteStream for R {}
