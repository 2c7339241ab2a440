use std::fs::File;
use std::io::{ErrorKind, Read};
use std::os::fd::{AsFd, AsRawFd, RawFd};
use std::time::Duration;

use crate::error::Result;

/// Wait until `fd` is readable or `timeout` expires.
///
/// Expiry is reported as `ErrorKind::TimedOut`. Hangup and error conditions
/// count as readable so the following `read` observes them.
pub(crate) fn wait_readable(fd: RawFd, timeout: Duration) -> std::io::Result<()> {
    let mut pfd = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };
    let millis = timeout.as_millis().min(libc::c_int::MAX as u128) as libc::c_int;

    // SAFETY: `pfd` is a valid, initialized pollfd and we pass a count of 1.
    let rc = unsafe { libc::poll(&mut pfd, 1, millis) };
    match rc {
        -1 => Err(std::io::Error::last_os_error()),
        0 => Err(std::io::Error::new(ErrorKind::TimedOut, "read timed out")),
        _ => Ok(()),
    }
}

/// A file descriptor source whose reads wait at most `timeout`.
///
/// For pipes, stdin and capture files fed to the pipeline. EOF stays EOF:
/// a closed pipe is the normal end of a replay.
#[derive(Debug)]
pub struct TimedReader<T> {
    inner: T,
    timeout: Duration,
}

impl<T: Read + AsRawFd> TimedReader<T> {
    pub fn new(inner: T, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl TimedReader<File> {
    /// Read the process's standard input directly.
    ///
    /// Works on a duplicate of the descriptor, bypassing the std stdin
    /// buffer so `poll` sees every unread byte.
    pub fn stdin(timeout: Duration) -> Result<Self> {
        let fd = std::io::stdin().as_fd().try_clone_to_owned()?;
        Ok(Self::new(File::from(fd), timeout))
    }
}

impl<T: Read + AsRawFd> Read for TimedReader<T> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        wait_readable(self.inner.as_raw_fd(), self.timeout)?;
        self.inner.read(buf)
    }
}
