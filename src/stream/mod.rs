//! # Stream
//!
//! Control and data channel implementations.

mod command_stream;
mod data_stream;
mod transport;

pub use command_stream::CommandStream;
pub use data_stream::{ActiveDataStream, DataStream, PassiveDataStream};
pub use transport::Transport;

#[cfg(test)]
pub(crate) mod mock {
    //! In-memory transport double with a scripted input and a recorded output.

    use std::io::{self, Cursor, Read, Write};
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    use super::Transport;

    pub(crate) struct MockTransport {
        input: Cursor<Vec<u8>>,
        output: Arc<Mutex<Vec<u8>>>,
    }

    impl MockTransport {
        /// Build a transport that replies with `script` and records every
        /// byte written to it; the second value is a handle on the record.
        pub(crate) fn new(script: &str) -> (Self, Arc<Mutex<Vec<u8>>>) {
            let output = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    input: Cursor::new(script.as_bytes().to_vec()),
                    output: output.clone(),
                },
                output,
            )
        }
    }

    impl Read for MockTransport {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.input.read(buf)
        }
    }

    impl Write for MockTransport {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.output
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Transport for MockTransport {
        fn local_addr(&self) -> io::Result<SocketAddr> {
            Ok("127.0.0.1:50000".parse().unwrap())
        }

        fn shutdown(&self) -> io::Result<()> {
            Ok(())
        }
    }
}
