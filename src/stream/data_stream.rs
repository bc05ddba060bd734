//! # Data Stream
//!
//! This module exposes the data channel: the transfer-scoped connection file
//! content and listings flow over, in either active or passive mode.

use std::io::{self, Read, Write};
use std::net::{Ipv4Addr, Shutdown, SocketAddr, TcpListener, TcpStream};
use std::time::{Duration, Instant};

use rand::Rng;

use super::command_stream::CommandStream;
use super::transport::Transport;
use crate::command::Command;
use crate::regex::{PASV_HOST_RE, PASV_PORT_RE};
use crate::types::{FtpError, FtpResult, Mode};
use crate::Status;

/// Bound on waiting for the server to connect back in active mode, used when
/// the control channel has no timeout configured
const DEFAULT_ACCEPT_TIMEOUT: Duration = Duration::from_secs(60);

/// Chunk size for data channel reads
const CHUNK_SIZE: usize = 8192;

/// The data channel of one transfer.
///
/// A data channel is single-use: once a read or write cycle completes and the
/// peer closes, the channel is not reused; a new one must be opened per
/// transfer. Opening performs the PORT or PASV negotiation on the shared
/// control channel.
#[derive(Debug)]
pub enum DataStream {
    Active(ActiveDataStream),
    Passive(PassiveDataStream),
}

impl DataStream {
    /// Open a data channel in active mode: listen on a local random port and
    /// advertise it to the server with PORT.
    ///
    /// The advertised host is the local endpoint of the control connection,
    /// not a configured or guessed address.
    pub fn open_active<T: Transport>(command_stream: &mut CommandStream<T>) -> FtpResult<Self> {
        let mut rng = rand::rng();
        // p1 >= 4 keeps the advertised port out of the well-known range:
        // 4 * 256 + 0 = 1024, 255 * 256 + 255 = 65535
        let p1: u16 = rng.random_range(4..=255);
        let p2: u16 = rng.random_range(0..=255);
        let port = p1 * 256 + p2;

        debug!("Starting local listener on port {port}");
        // a bind failure on a busy port is the only collision guard
        let listener = TcpListener::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)))
            .map_err(FtpError::ConnectionError)?;
        listener
            .set_nonblocking(true)
            .map_err(FtpError::ConnectionError)?;

        let ip = command_stream
            .local_addr()
            .map_err(FtpError::ConnectionError)?
            .ip();
        let host_port = format!("{},{p1},{p2}", ip.to_string().replace('.', ","));
        debug!("Active mode, listening on {ip}:{port}");

        let reply = command_stream.exchange(Command::Port(host_port))?;
        if reply.status() != Status::CommandOk {
            return Err(FtpError::UnexpectedReply(reply));
        }

        Ok(Self::Active(ActiveDataStream {
            listener,
            accept_timeout: command_stream.timeout().unwrap_or(DEFAULT_ACCEPT_TIMEOUT),
        }))
    }

    /// Open a data channel in passive mode: send PASV, parse the returned
    /// address and connect out to the server's ephemeral port.
    pub fn open_passive<T: Transport>(command_stream: &mut CommandStream<T>) -> FtpResult<Self> {
        debug!("PASV command");
        let reply = command_stream.exchange(Command::Pasv)?;
        // PASV reply format: 227 Entering Passive Mode (h1,h2,h3,h4,p1,p2).
        if reply.status() != Status::PassiveMode {
            return Err(FtpError::UnexpectedReply(reply));
        }
        let addr = parse_passive_address(reply.message())?;
        debug!("Passive mode, connecting to {addr}");
        let stream = match command_stream.timeout() {
            Some(timeout) => {
                let stream = TcpStream::connect_timeout(&addr, timeout)
                    .map_err(FtpError::ConnectionError)?;
                stream
                    .set_read_timeout(Some(timeout))
                    .map_err(FtpError::ConnectionError)?;
                stream
                    .set_write_timeout(Some(timeout))
                    .map_err(FtpError::ConnectionError)?;
                stream
            }
            None => TcpStream::connect(addr).map_err(FtpError::ConnectionError)?,
        };
        Ok(Self::Passive(PassiveDataStream { stream }))
    }

    /// Mode this channel was opened in
    pub fn mode(&self) -> Mode {
        match self {
            Self::Active(_) => Mode::Active,
            Self::Passive(_) => Mode::Passive,
        }
    }

    /// Read the transferred bytes until the peer signals end of stream
    pub fn receive(&mut self) -> FtpResult<Vec<u8>> {
        match self {
            Self::Active(stream) => stream.receive(),
            Self::Passive(stream) => stream.receive(),
        }
    }

    /// Write the whole payload and signal end of stream to the peer
    pub fn send(&mut self, payload: &[u8]) -> FtpResult<()> {
        match self {
            Self::Active(stream) => stream.send(payload),
            Self::Passive(stream) => stream.send(payload),
        }
    }

    /// Close the channel, releasing its sockets
    pub fn close(self) -> FtpResult<()> {
        debug!("Closing data channel");
        if let Self::Passive(stream) = self {
            // the peer may have torn the connection down already
            if let Err(err) = stream.stream.shutdown(Shutdown::Both) {
                if err.kind() != io::ErrorKind::NotConnected {
                    return Err(FtpError::ConnectionError(err));
                }
            }
        }
        Ok(())
    }
}

/// Active-mode data channel: this host listens, the server connects in.
#[derive(Debug)]
pub struct ActiveDataStream {
    listener: TcpListener,
    accept_timeout: Duration,
}

impl ActiveDataStream {
    /// Accept exactly one inbound connection from the server.
    ///
    /// The listener is polled in non-blocking mode so the wait is bounded by
    /// the accept timeout instead of hanging forever on a server that never
    /// connects back.
    fn accept(&self) -> FtpResult<TcpStream> {
        let start = Instant::now();
        loop {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    trace!("Accepted data connection from {addr}");
                    stream
                        .set_nonblocking(false)
                        .map_err(FtpError::ConnectionError)?;
                    break Ok(stream);
                }
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                    if start.elapsed() > self.accept_timeout {
                        break Err(FtpError::ConnectionError(
                            io::ErrorKind::WouldBlock.into(),
                        ));
                    }
                    std::thread::sleep(Duration::from_millis(100));
                }
                Err(e) => break Err(FtpError::ConnectionError(e)),
            }
        }
    }

    /// Accept one connection and read it to end of stream.
    ///
    /// The accepted socket is closed afterwards; the listening socket stays
    /// around, so a subsequent transfer may reuse the advertised port.
    pub fn receive(&mut self) -> FtpResult<Vec<u8>> {
        let mut connection = self.accept()?;
        read_to_eof(&mut connection)
    }

    /// Accept one connection, write the payload and close it
    pub fn send(&mut self, payload: &[u8]) -> FtpResult<()> {
        let mut connection = self.accept()?;
        connection
            .write_all(payload)
            .map_err(FtpError::ConnectionError)?;
        connection.flush().map_err(FtpError::ConnectionError)
    }
}

/// Passive-mode data channel: the server listens, this host connects out.
#[derive(Debug)]
pub struct PassiveDataStream {
    stream: TcpStream,
}

impl PassiveDataStream {
    /// Read the connected socket to end of stream
    pub fn receive(&mut self) -> FtpResult<Vec<u8>> {
        read_to_eof(&mut self.stream)
    }

    /// Write the whole payload and shut the write side down so the server
    /// sees end of stream
    pub fn send(&mut self, payload: &[u8]) -> FtpResult<()> {
        self.stream
            .write_all(payload)
            .map_err(FtpError::ConnectionError)?;
        self.stream
            .shutdown(Shutdown::Write)
            .map_err(FtpError::ConnectionError)
    }
}

/// Parse the host and port advertised in a PASV reply message.
///
/// The four-then-two digit-group convention is not standardized by the RFC
/// but matches common server implementations; host and port parse failures
/// are reported as distinct errors so "server said no" can be told apart
/// from "server said yes but the address is unreadable".
pub(crate) fn parse_passive_address(message: &str) -> FtpResult<SocketAddr> {
    let host = PASV_HOST_RE
        .find(message)
        .ok_or_else(|| FtpError::InvalidPassiveHost(message.to_string()))?;
    let dotted = host.as_str().replace(',', ".");
    let ip = dotted
        .trim_end_matches('.')
        .parse::<Ipv4Addr>()
        .map_err(|_| FtpError::InvalidPassiveHost(message.to_string()))?;

    let caps = PASV_PORT_RE
        .captures(message)
        .ok_or_else(|| FtpError::InvalidPassivePort(message.to_string()))?;
    let p1 = caps[1]
        .parse::<u8>()
        .map_err(|_| FtpError::InvalidPassivePort(message.to_string()))?;
    let p2 = caps[2]
        .parse::<u8>()
        .map_err(|_| FtpError::InvalidPassivePort(message.to_string()))?;
    let port = u16::from(p1) * 256 + u16::from(p2);

    Ok(SocketAddr::new(ip.into(), port))
}

/// Read `reader` in fixed-size chunks until end of stream
fn read_to_eof<R: Read>(reader: &mut R) -> FtpResult<Vec<u8>> {
    let mut data = Vec::new();
    let mut chunk = [0u8; CHUNK_SIZE];
    loop {
        match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(len) => data.extend_from_slice(&chunk[..len]),
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(FtpError::ConnectionError(e)),
        }
    }
    trace!("Data channel EOF after {} bytes", data.len());
    Ok(data)
}
