//! Adapters for the standard library streams.

use std::{
    io::{self, ErrorKind},
    time::Duration,
};

use crate::TimeoutRead;

/// Serial stream on top of the [`std::io::Read`] implementation, such as a serial port
/// or a recorded stream file.
///
/// The time a single read may wait is governed by the inner stream itself, for example
/// by the serial port timeout. A timed out read is retried by the blocking reads and
/// reported as an empty read by [`TimeoutRead::read_timeout`]. The end of the stream
/// is reported as [`ErrorKind::UnexpectedEof`].
#[derive(Debug)]
pub struct StdStream<R> {
    inner: R,
}

impl<R> StdStream<R> {
    /// Creates a new stream adapter.
    pub const fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Borrows the inner stream.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Returns the inner stream.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

fn is_timeout(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
    )
}

fn check_eof(bytes_read: usize, buf: &[u8]) -> io::Result<usize> {
    if bytes_read == 0 && !buf.is_empty() {
        return Err(io::Error::new(
            ErrorKind::UnexpectedEof,
            "Serial stream has been closed",
        ));
    }
    Ok(bytes_read)
}

impl<R> embedded_io::Io for StdStream<R> {
    type Error = io::Error;
}

impl<R: io::Read> embedded_io::blocking::Read for StdStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        loop {
            match self.inner.read(buf) {
                Ok(bytes_read) => return check_eof(bytes_read, buf),
                Err(err) if is_timeout(&err) => continue,
                Err(err) => return Err(err),
            }
        }
    }
}

impl<R: io::Read> TimeoutRead for StdStream<R> {
    fn read_timeout(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize, Self::Error> {
        match self.inner.read(buf) {
            Ok(bytes_read) => check_eof(bytes_read, buf),
            Err(err) if is_timeout(&err) => Ok(0),
            Err(err) => Err(err),
        }
    }
}
