//! # Types
//!
//! Common types shared across the crate

use std::fmt;

use thiserror::Error;

use crate::reply::Reply;

/// A shorthand for a Result whose error type is always an FtpError.
pub type FtpResult<T> = std::result::Result<T, FtpError>;

/// `FtpError` is a library-global error type to describe the different kinds of
/// errors that might occur while talking to an FTP server.
#[derive(Debug, Error)]
pub enum FtpError {
    /// Connection error at the socket level
    #[error("Connection error: {0}")]
    ConnectionError(std::io::Error),
    /// The server replied with a code outside the expected set for the command
    /// just issued. Contains the full reply.
    #[error("Unexpected reply: {0}")]
    UnexpectedReply(Reply),
    /// The PASV reply message does not contain a recognizable host group
    #[error("Cannot parse passive host from reply: {0}")]
    InvalidPassiveHost(String),
    /// The PASV reply message does not contain a recognizable port pair
    #[error("Cannot parse passive port from reply: {0}")]
    InvalidPassivePort(String),
    /// The operation requires an open channel, but none is set
    #[error("Not connected to the server")]
    NotConnected,
}

/// Connection mode for the data channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// This side listens and the server connects in (PORT command)
    Active,
    /// The server listens and this side connects out (PASV command)
    Passive,
}

/// Text Format Control used in `TYPE` command
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum FormatControl {
    /// Default text format control (is NonPrint)
    Default,
    /// Non-print (not destined for printing)
    NonPrint,
    /// Telnet format control (\<CR\>, \<FF\>, etc.)
    Telnet,
    /// ASA (Fortran) Carriage Control
    Asa,
}

/// File Type used in `TYPE` command
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum FileType {
    /// ASCII text (the argument is the text format control)
    Ascii(FormatControl),
    /// EBCDIC text (the argument is the text format control)
    Ebcdic(FormatControl),
    /// Image,
    Image,
    /// Binary (the synonym to Image)
    Binary,
    /// Local format (the argument is the number of bits in one byte on local machine)
    Local(u8),
}

impl fmt::Display for FormatControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatControl::Default | FormatControl::NonPrint => write!(f, "N"),
            FormatControl::Telnet => write!(f, "T"),
            FormatControl::Asa => write!(f, "C"),
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileType::Ascii(fc) => write!(f, "A {fc}"),
            FileType::Ebcdic(fc) => write!(f, "E {fc}"),
            FileType::Image | FileType::Binary => write!(f, "I"),
            FileType::Local(bits) => write!(f, "L {bits}"),
        }
    }
}
