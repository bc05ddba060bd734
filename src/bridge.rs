//! # Bridge
//!
//! The session façade: orchestrates the control channel, the login sequence
//! and the per-transfer data channel.

use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use crate::command::Command;
use crate::logger::FtpLogger;
use crate::reply::Reply;
use crate::stream::{CommandStream, DataStream, Transport};
use crate::types::{FileType, FtpError, FtpResult, Mode};
use crate::Status;

/// One FTP session: a control connection plus, per transfer, a data
/// connection.
///
/// All operations are strictly sequential and synchronous; a bridge must not
/// be driven from multiple threads at once, or replies get attributed to the
/// wrong command. Every operation that needs an open channel fails with
/// [`FtpError::NotConnected`] when that channel is absent, without touching
/// any socket.
pub struct FtpBridge<T = TcpStream>
where
    T: Transport,
{
    logger: Option<Arc<dyn FtpLogger>>,
    command_stream: Option<CommandStream<T>>,
    data_stream: Option<DataStream>,
}

impl<T> FtpBridge<T>
where
    T: Transport,
{
    /// Create a bridge with no traffic logger attached
    pub fn new() -> Self {
        Self {
            logger: None,
            command_stream: None,
            data_stream: None,
        }
    }

    /// Create a bridge that emits control channel traffic to `logger`
    pub fn with_logger(logger: Arc<dyn FtpLogger>) -> Self {
        Self {
            logger: Some(logger),
            command_stream: None,
            data_stream: None,
        }
    }

    /// Open the control channel over an established transport; the server
    /// greeting is consumed before this returns
    pub fn connect_with_transport(&mut self, transport: T) -> FtpResult<()> {
        self.command_stream = Some(CommandStream::open(transport, None, self.logger.clone())?);
        Ok(())
    }

    /// Log in to the FTP server.
    ///
    /// Sends USER; a 230 reply logs in directly (no-password account), a 331
    /// reply asks for PASS, where 230 or 202 complete the login. 202 means
    /// the session was already authenticated and is accepted as success. Any
    /// other reply rejects the login, carrying the server's message.
    pub fn login<S: AsRef<str>>(&mut self, user: S, password: S) -> FtpResult<()> {
        debug!("Signing in with user '{}'", user.as_ref());
        let reply = self
            .control()?
            .exchange(Command::User(user.as_ref().to_string()))?;
        match reply.status() {
            Status::LoggedIn => {
                debug!("Login OK");
                Ok(())
            }
            Status::NeedPassword => {
                debug!("Password is required");
                let reply = self
                    .control()?
                    .exchange(Command::Pass(password.as_ref().to_string()))?;
                match reply.status() {
                    Status::LoggedIn | Status::CommandSuperfluous => {
                        debug!("Login OK");
                        Ok(())
                    }
                    _ => Err(FtpError::UnexpectedReply(reply)),
                }
            }
            _ => Err(FtpError::UnexpectedReply(reply)),
        }
    }

    /// Sets the type of file to be transferred, that is the implementation
    /// of `TYPE` command
    pub fn transfer_type(&mut self, file_type: FileType) -> FtpResult<()> {
        debug!("Setting transfer type {file_type}");
        let reply = self.control()?.exchange(Command::Type(file_type))?;
        if reply.status() == Status::CommandOk {
            Ok(())
        } else {
            Err(FtpError::UnexpectedReply(reply))
        }
    }

    /// Open the data channel for the next transfer, in the given mode
    pub fn open_data_connection(&mut self, mode: Mode) -> FtpResult<()> {
        let command_stream = self.command_stream.as_mut().ok_or(FtpError::NotConnected)?;
        let data_stream = match mode {
            Mode::Active => DataStream::open_active(command_stream)?,
            Mode::Passive => DataStream::open_passive(command_stream)?,
        };
        self.data_stream = Some(data_stream);
        Ok(())
    }

    /// Send a raw command over the control channel (generic passthrough);
    /// the command is trimmed and CRLF-terminated
    pub fn send(&mut self, command: impl ToString) -> FtpResult<()> {
        self.control()?.send(Command::Custom(command.to_string()))
    }

    /// Read the next reply from the control channel
    pub fn receive(&mut self) -> FtpResult<Reply> {
        self.control()?.read_reply()
    }

    /// Read the open data channel to end of stream
    pub fn receive_data(&mut self) -> FtpResult<Vec<u8>> {
        self.data()?.receive()
    }

    /// Write the payload over the open data channel
    pub fn send_data(&mut self, payload: &[u8]) -> FtpResult<()> {
        self.data()?.send(payload)
    }

    /// Greeting reply of the current control connection, if any
    pub fn welcome(&self) -> Option<&Reply> {
        self.command_stream.as_ref().and_then(|s| s.welcome())
    }

    /// Returns a reference to the control channel, if open
    pub fn command_stream(&self) -> Option<&CommandStream<T>> {
        self.command_stream.as_ref()
    }

    /// Quit the current FTP session and close both channels
    pub fn quit(&mut self) -> FtpResult<()> {
        debug!("Quitting session");
        self.control()?.exchange(Command::Quit)?;
        self.close()
    }

    /// Close both channels; the bridge may connect again afterwards
    pub fn close(&mut self) -> FtpResult<()> {
        if let Some(data_stream) = self.data_stream.take() {
            data_stream.close()?;
        }
        if let Some(mut command_stream) = self.command_stream.take() {
            command_stream.close()?;
        }
        Ok(())
    }

    fn control(&mut self) -> FtpResult<&mut CommandStream<T>> {
        self.command_stream.as_mut().ok_or(FtpError::NotConnected)
    }

    fn data(&mut self) -> FtpResult<&mut DataStream> {
        self.data_stream.as_mut().ok_or(FtpError::NotConnected)
    }
}

impl FtpBridge<TcpStream> {
    /// Open the control connection to the server command port
    pub fn connect<A: ToSocketAddrs>(&mut self, addr: A) -> FtpResult<()> {
        self.command_stream = Some(CommandStream::connect(addr, self.logger.clone())?);
        Ok(())
    }

    /// Open the control connection with the specified timeout; the timeout
    /// bounds every subsequent read and write on the session
    pub fn connect_timeout(&mut self, addr: SocketAddr, timeout: Duration) -> FtpResult<()> {
        self.command_stream = Some(CommandStream::connect_timeout(
            addr,
            timeout,
            self.logger.clone(),
        )?);
        Ok(())
    }
}

impl<T> Default for FtpBridge<T>
where
    T: Transport,
{
    fn default() -> Self {
        Self::new()
    }
}
