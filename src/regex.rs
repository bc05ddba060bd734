//! # FTP Regex
//!
//! Regular expressions to parse FTP replies

use lazy_regex::{Lazy, Regex};

/// Leading digit run of a reply; the reply code.
/// Production replies always carry exactly 3 digits (RFC 959), but any leading
/// run is accepted for robustness.
pub static REPLY_CODE_RE: Lazy<Regex> = lazy_regex!(r"^\d+");

/// Opening line of a multi-line reply: the code immediately followed by a
/// hyphen instead of a space.
pub static MULTILINE_RE: Lazy<Regex> = lazy_regex!(r"^\d{2,}-");

/// Final line of a reply: three digits followed by a space.
/// This is what distinguishes the last line of a reply from its continuation
/// lines (RFC 959 section 4).
pub static FINAL_LINE_RE: Lazy<Regex> = lazy_regex!(r"^\d{3} ");

/// This regex extracts the host octets from a PASV reply message.
/// The regex looks for four comma-terminated decimal groups (h1,h2,h3,h4,).
pub static PASV_HOST_RE: Lazy<Regex> = lazy_regex!(r"(\d+,){4}");

/// This regex extracts the port pair from a PASV reply message.
/// The regex looks for the trailing p1,p2) pattern.
pub static PASV_PORT_RE: Lazy<Regex> = lazy_regex!(r"(\d+),(\d+)\)");
