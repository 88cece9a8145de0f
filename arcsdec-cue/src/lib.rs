// Copyright (c) 2024 The arcsdec Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]

//! ToC parsers: the Cuesheet grammar and the supplemented CDRDAO/TOC
//! grammar, both driving a shared [`Handler`] into a
//! [`arcsdec_core::ToC`].

pub mod cdrdao;
pub mod cuesheet;
mod error;
mod handler;
mod lexer;

pub use error::CueSyntaxError;
pub use handler::{Handler, TocHandler};
