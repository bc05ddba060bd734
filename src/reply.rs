//! # Reply
//!
//! This module exposes the reply type and the parser for the raw reply text
//! sent by the server over the control channel.

use std::fmt;

use crate::regex::{MULTILINE_RE, REPLY_CODE_RE};
use crate::Status;

/// A parsed FTP server reply.
///
/// A `Reply` is created fresh for every reply read from the control channel
/// and is immutable afterwards. For multi-line replies `message` holds only
/// the text of the opening line; the full body is available through
/// [`Reply::raw`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    code: u32,
    message: String,
    multiline: bool,
    raw: String,
}

impl Reply {
    /// Parse a raw reply string.
    ///
    /// The code is the leading run of ASCII digits, or `0` when the text does
    /// not start with a digit; message parsing is attempted regardless, so a
    /// garbage reply can be told apart from a reply without a readable phrase.
    pub fn parse(raw: &str) -> Self {
        let first_line = raw.lines().next().unwrap_or_default();
        let (code, rest) = match REPLY_CODE_RE.find(first_line) {
            Some(m) => (
                m.as_str().parse::<u32>().unwrap_or_default(),
                &first_line[m.end()..],
            ),
            None => (0, first_line),
        };
        // exactly one separator after the code: a space for single/final
        // lines, a hyphen for the opening line of a multi-line reply
        let message = rest
            .strip_prefix(' ')
            .or_else(|| rest.strip_prefix('-'))
            .unwrap_or(rest)
            .trim_end_matches(['\r', '\n'])
            .to_string();

        Self {
            code,
            message,
            multiline: MULTILINE_RE.is_match(raw),
            raw: raw.to_string(),
        }
    }

    /// Get the reply code; `0` if the reply was unparseable
    pub fn code(&self) -> u32 {
        self.code
    }

    /// Get the reply code mapped onto the [`Status`] table
    pub fn status(&self) -> Status {
        Status::from(self.code)
    }

    /// Get the reply message (first line text, without code and CRLF)
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the reply opening line carries the multi-line marker
    pub fn is_multiline(&self) -> bool {
        self.multiline
    }

    /// Get the raw reply text, including all lines of a multi-line reply
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Test whether the reply code is one of `codes`
    pub fn has_code(&self, codes: &[u32]) -> bool {
        codes.contains(&self.code)
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}
