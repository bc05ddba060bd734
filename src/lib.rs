#![crate_name = "ftp_bridge"]
#![crate_type = "lib"]

//! # ftp-bridge
//!
//! ftp-bridge is a low-level FTP client library which gives you direct access
//! to the FTP control and data channels, as specified in
//! [RFC 959](https://tools.ietf.org/html/rfc959). It does not wrap the file
//! operations of the protocol; it speaks the protocol itself: you send
//! commands, read replies and move payloads over active or passive data
//! connections.
//!
//! ## Get started
//!
//! To get started, first add **ftp-bridge** to your dependencies:
//!
//! ```toml
//! ftp-bridge = "0.1"
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ftp_bridge::{FtpBridge, Mode};
//! use ftp_bridge::types::FileType;
//!
//! let mut bridge: FtpBridge = FtpBridge::new();
//! bridge.connect("ftp.example.com:21").unwrap();
//! bridge.login("anonymous", "guest@example.com").unwrap();
//! bridge.transfer_type(FileType::Binary).unwrap();
//! bridge.open_data_connection(Mode::Passive).unwrap();
//! bridge.send("LIST").unwrap();
//! let reply = bridge.receive().unwrap();
//! assert_eq!(reply.code(), 150);
//! let listing = bridge.receive_data().unwrap();
//! let reply = bridge.receive().unwrap();
//! assert_eq!(reply.code(), 226);
//! println!("{}", String::from_utf8_lossy(&listing));
//! bridge.quit().unwrap();
//! ```
//!
//! ## Traffic logging
//!
//! A [`logger::FtpLogger`] can be attached to a bridge to record every
//! command and reply exchanged over the control channel; see
//! [`logger::ArrayLogger`] and [`logger::FileLogger`] for the provided
//! implementations. Internal diagnostics go through the `log` facade and can
//! be disabled entirely with the `no-log` feature.

#![doc(html_playground_url = "https://play.rust-lang.org")]

#[macro_use]
extern crate lazy_regex;
#[macro_use]
extern crate log;

// -- private modules
mod bridge;
mod command;
mod regex;
mod reply;
mod status;
mod stream;

// -- public modules
pub mod logger;
pub mod types;

// -- exports
pub use bridge::FtpBridge;
pub use command::Command;
pub use reply::Reply;
pub use status::Status;
pub use stream::{ActiveDataStream, CommandStream, DataStream, PassiveDataStream, Transport};
pub use types::{FtpError, FtpResult, Mode};

// -- test logging
#[cfg(test)]
pub(crate) fn log_init() {
    let _ = env_logger::builder().is_test(true).try_init();
}
