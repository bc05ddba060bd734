//! # Transport
//!
//! The seam between the control channel and the platform socket.

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};

/// Capabilities the control channel requires of its underlying connection.
///
/// Implemented for [`TcpStream`]; any environment providing these (an OS
/// socket, an in-memory double for testing) satisfies the channel.
pub trait Transport: Read + Write + Send {
    /// Local endpoint of the connection, as seen by this host
    fn local_addr(&self) -> io::Result<SocketAddr>;

    /// Shut the connection down in both directions
    fn shutdown(&self) -> io::Result<()>;
}

impl Transport for TcpStream {
    fn local_addr(&self) -> io::Result<SocketAddr> {
        TcpStream::local_addr(self)
    }

    fn shutdown(&self) -> io::Result<()> {
        TcpStream::shutdown(self, Shutdown::Both)
    }
}
