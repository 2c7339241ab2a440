use std::borrow::Cow;
use std::io::{ErrorKind, Read};

use bytes::BytesMut;
use tracing::debug;

use crate::error::{FrameError, Result};

/// Default upper bound on a single line, delimiter excluded.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 4 * 1024;

const INITIAL_BUFFER_CAPACITY: usize = 1024;
const READ_CHUNK_SIZE: usize = 1024;
const DELIMITER: u8 = b'\n';

/// Configuration for line delimiting.
#[derive(Debug, Clone)]
pub struct LineReaderConfig {
    /// Lines longer than this without a delimiter are discarded.
    pub max_line_length: usize,
}

impl Default for LineReaderConfig {
    fn default() -> Self {
        Self {
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

/// Outcome of one [`LineReader::read_line`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineRead {
    /// A complete line, decoded and with trailing whitespace removed.
    Line {
        text: String,
        /// True if invalid UTF-8 was replaced while decoding.
        lossy: bool,
    },
    /// The source had no data within its read timeout.
    Timeout,
}

/// Reads newline-delimited text lines from any `Read` stream.
///
/// Handles partial reads internally. Read timeouts (`TimedOut`/`WouldBlock`)
/// are reported as [`LineRead::Timeout`] and keep buffered bytes for the
/// next call. A final unterminated line is returned at EOF before
/// [`FrameError::ConnectionClosed`].
pub struct LineReader<T> {
    inner: T,
    buf: BytesMut,
    config: LineReaderConfig,
    discarding: bool,
    eof: bool,
}

impl<T: Read> LineReader<T> {
    /// Create a new line reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, LineReaderConfig::default())
    }

    /// Create a new line reader with explicit configuration.
    pub fn with_config(inner: T, config: LineReaderConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
            discarding: false,
            eof: false,
        }
    }

    /// Read the next line (blocking, bounded by the source's read timeout).
    pub fn read_line(&mut self) -> Result<LineRead> {
        loop {
            if let Some(pos) = self.buf.iter().position(|&b| b == DELIMITER) {
                let raw = self.buf.split_to(pos + 1);
                if self.discarding {
                    // Tail of an oversized line.
                    self.discarding = false;
                    continue;
                }
                if pos > self.config.max_line_length {
                    debug!(len = pos, max = self.config.max_line_length, "discarding oversized line");
                    return Err(FrameError::LineTooLong {
                        len: pos,
                        max: self.config.max_line_length,
                    });
                }
                return Ok(decode(&raw));
            }

            if self.discarding {
                self.buf.clear();
            } else if self.buf.len() > self.config.max_line_length {
                let len = self.buf.len();
                debug!(len, max = self.config.max_line_length, "discarding oversized line");
                self.buf.clear();
                self.discarding = true;
                return Err(FrameError::LineTooLong {
                    len,
                    max: self.config.max_line_length,
                });
            }

            if self.eof {
                if self.buf.is_empty() {
                    return Err(FrameError::ConnectionClosed);
                }
                let raw = self.buf.split();
                return Ok(decode(&raw));
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err)
                    if matches!(err.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) =>
                {
                    return Ok(LineRead::Timeout)
                }
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                debug!(buffered = self.buf.len(), "line source reached eof");
                self.eof = true;
                continue;
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    /// Bytes buffered but not yet returned as a line.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current line reader configuration.
    pub fn config(&self) -> &LineReaderConfig {
        &self.config
    }
}

fn decode(raw: &[u8]) -> LineRead {
    let text = String::from_utf8_lossy(raw);
    let lossy = matches!(text, Cow::Owned(_));
    LineRead::Line {
        text: text.trim_end().to_string(),
        lossy,
    }
}
