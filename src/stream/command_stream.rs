//! # Command Stream
//!
//! This module exposes the control channel: the stream FTP commands are
//! written to and replies are read from.

use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use std::io::{BufRead, BufReader};

use super::transport::Transport;
use crate::command::Command;
use crate::logger::FtpLogger;
use crate::regex::FINAL_LINE_RE;
use crate::reply::Reply;
use crate::types::{FtpError, FtpResult};

/// The control channel of an FTP session.
///
/// Once opened, the server greeting has already been consumed; it is kept and
/// exposed through [`CommandStream::welcome`] but never validated. There is no
/// reconnect: a new stream must be constructed to retry a failed connection.
pub struct CommandStream<T = TcpStream>
where
    T: Transport,
{
    reader: BufReader<T>,
    timeout: Option<Duration>,
    logger: Option<Arc<dyn FtpLogger>>,
    welcome: Option<Reply>,
}

impl CommandStream<TcpStream> {
    /// Connect to the remote server command port
    pub fn connect<A: ToSocketAddrs>(
        addr: A,
        logger: Option<Arc<dyn FtpLogger>>,
    ) -> FtpResult<Self> {
        debug!("Connecting to server");
        let stream = TcpStream::connect(addr).map_err(FtpError::ConnectionError)?;
        Self::open(stream, None, logger)
    }

    /// Connect to the remote server command port with the specified timeout.
    ///
    /// The timeout also bounds every read and write on the channel, so a
    /// reply that never completes degrades to a timeout error instead of
    /// hanging forever.
    pub fn connect_timeout(
        addr: SocketAddr,
        timeout: Duration,
        logger: Option<Arc<dyn FtpLogger>>,
    ) -> FtpResult<Self> {
        debug!("Connecting to server {addr}");
        let stream =
            TcpStream::connect_timeout(&addr, timeout).map_err(FtpError::ConnectionError)?;
        stream
            .set_read_timeout(Some(timeout))
            .map_err(FtpError::ConnectionError)?;
        stream
            .set_write_timeout(Some(timeout))
            .map_err(FtpError::ConnectionError)?;
        Self::open(stream, Some(timeout), logger)
    }
}

impl<T> CommandStream<T>
where
    T: Transport,
{
    /// Open the control channel over an established transport, consuming the
    /// server greeting.
    pub fn open(
        transport: T,
        timeout: Option<Duration>,
        logger: Option<Arc<dyn FtpLogger>>,
    ) -> FtpResult<Self> {
        let mut stream = Self {
            reader: BufReader::new(transport),
            timeout,
            logger,
            welcome: None,
        };
        debug!("Reading server greeting...");
        // logged but not validated; servers are not required to send 220
        let greeting = stream.read_reply()?;
        debug!("Server ready; greeting: {greeting}");
        stream.welcome = Some(greeting);
        Ok(stream)
    }

    /// Greeting reply consumed when the channel was opened
    pub fn welcome(&self) -> Option<&Reply> {
        self.welcome.as_ref()
    }

    /// Timeout the channel was configured with, inherited by data channels
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns a reference to the underlying transport
    pub fn get_ref(&self) -> &T {
        self.reader.get_ref()
    }

    /// Local endpoint of the control connection; this is the address
    /// advertised in active mode
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.reader.get_ref().local_addr()
    }

    /// Write a command to the channel, terminated by CRLF
    pub fn send(&mut self, command: Command) -> FtpResult<()> {
        let line = command.to_string();
        trace!("CC OUT: {}", line.trim_end_matches("\r\n"));
        if let Some(logger) = &self.logger {
            logger.command(&line);
        }
        self.reader
            .get_mut()
            .write_all(line.as_bytes())
            .map_err(FtpError::ConnectionError)
    }

    /// Read one full reply from the channel.
    ///
    /// Lines are accumulated until one begins with three digits followed by a
    /// space, the final-line marker of RFC 959 section 4; everything up to
    /// and including that line belongs to the reply.
    pub fn read_reply(&mut self) -> FtpResult<Reply> {
        let mut raw = String::new();
        loop {
            let mut line = Vec::new();
            let len = self
                .reader
                .read_until(b'\n', &mut line)
                .map_err(FtpError::ConnectionError)?;
            if len == 0 {
                // connection dropped mid-reply
                return Err(FtpError::ConnectionError(
                    io::ErrorKind::UnexpectedEof.into(),
                ));
            }
            let line = String::from_utf8_lossy(&line);
            trace!("CC IN: {:?}", line);
            raw.push_str(&line);
            if FINAL_LINE_RE.is_match(&line) {
                break;
            }
        }
        let reply = Reply::parse(&raw);
        if let Some(logger) = &self.logger {
            if reply.code() < 400 {
                logger.info(&raw);
            } else {
                logger.error(&raw);
            }
        }
        Ok(reply)
    }

    /// Send a command and read its reply.
    ///
    /// The control channel must never carry two commands without an
    /// intervening reply read, or replies get attributed to the wrong
    /// command; this is the safe way to issue one.
    pub fn exchange(&mut self, command: Command) -> FtpResult<Reply> {
        self.send(command)?;
        self.read_reply()
    }

    /// Shut the channel down
    pub fn close(&mut self) -> FtpResult<()> {
        debug!("Closing control channel");
        self.reader
            .get_mut()
            .shutdown()
            .map_err(FtpError::ConnectionError)
    }
}
