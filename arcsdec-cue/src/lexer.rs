// Copyright (c) 2024 The arcsdec Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A small line-oriented lexer shared by the Cuesheet and CDRDAO/TOC
//! grammars. Splits a line into whitespace-delimited tokens,
//! treating a double-quoted span as a single token with the quotes
//! stripped.

/// Splits `line` into tokens. A run of whitespace separates tokens; a
/// `"`-delimited span (no escape handling; cuesheet filenames do not
/// contain embedded quotes in practice) is kept together as one token.
pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        if c == '"' {
            chars.next();
            let mut token = String::new();
            for c in chars.by_ref() {
                if c == '"' {
                    break;
                }
                token.push(c);
            }
            tokens.push(token);
            continue;
        }

        let mut token = String::new();
        while let Some(&c) = chars.peek() {
            if c.is_whitespace() {
                break;
            }
            token.push(c);
            chars.next();
        }
        tokens.push(token);
    }

    tokens
}

/// Parses a `mm:ss:ff` token into its three integer components, without
/// range-checking them (range validation is [`arcsdec_core::units::msf_to_frames`]'s
/// job). Returns `None` if the token is not of the form `N:N:N`.
pub fn parse_msf_token(token: &str) -> Option<(i32, i32, i32)> {
    let mut parts = token.split(':');
    let m = parts.next()?.parse().ok()?;
    let s = parts.next()?.parse().ok()?;
    let f = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((m, s, f))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_splits_on_whitespace() {
        assert_eq!(tokenize("TRACK 01 AUDIO"), vec!["TRACK", "01", "AUDIO"]);
    }

    #[test]
    fn tokenize_keeps_quoted_span_together() {
        assert_eq!(
            tokenize(r#"FILE "my album.wav" WAVE"#),
            vec!["FILE", "my album.wav", "WAVE"]
        );
    }

    #[test]
    fn tokenize_ignores_leading_and_trailing_whitespace() {
        assert_eq!(tokenize("  INDEX 01 00:02:00  "), vec!["INDEX", "01", "00:02:00"]);
    }

    #[test]
    fn parse_msf_token_splits_three_parts() {
        assert_eq!(parse_msf_token("05:33:48"), Some((5, 33, 48)));
        assert_eq!(parse_msf_token("not-an-msf"), None);
        assert_eq!(parse_msf_token("1:2"), None);
    }
}
