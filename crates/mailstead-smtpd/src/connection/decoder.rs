//! Line-oriented decoding of the SMTP input stream.
//!
//! SMTP is a CRLF-framed protocol. This module provides buffered line
//! reading with an optional whole-session byte cap, plus decoding of
//! dot-stuffed DATA blocks (RFC 5321 §4.5.2).

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

use crate::error::{Error, Result};

/// Default buffer size for reading.
const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Maximum accepted line length, terminator included. Generous against the
/// RFC 5321 §4.5.3.1.6 text line limit of 1000 octets.
const MAX_LINE_LENGTH: usize = 4096;

/// Buffered CRLF line decoder over an SMTP input stream.
///
/// A decoder is built once per session and owns the transport for the rest
/// of the session's life; the write path reaches the transport through
/// [`LineDecoder::get_mut`]. Rebuilding a decoder mid-session would discard
/// buffered input, so don't.
///
/// When a byte cap is configured, the decoder counts every byte it consumes
/// from the stream across all calls; a read that would have to consume past
/// the cap fails with [`Error::SizeExceeded`]. Reads that finish at or under
/// the cap never fail for that reason.
pub struct LineDecoder<S> {
    reader: BufReader<S>,
    limit: Option<usize>,
    consumed: usize,
}

impl<S> LineDecoder<S>
where
    S: AsyncRead + Unpin,
{
    /// Creates an uncapped decoder.
    pub fn new(stream: S) -> Self {
        Self::with_limit(stream, None)
    }

    /// Creates a decoder that fails with [`Error::SizeExceeded`] once more
    /// than `limit` total bytes have been consumed from the stream.
    pub fn with_limit(stream: S, limit: Option<usize>) -> Self {
        Self {
            reader: BufReader::with_capacity(DEFAULT_BUFFER_SIZE, stream),
            limit,
            consumed: 0,
        }
    }

    /// Reads one CRLF-terminated line, terminator stripped.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] if the stream ends before a terminator.
    /// - [`Error::MalformedLine`] for a bare `\n`, an over-long line, or
    ///   non-UTF-8 input.
    /// - [`Error::SizeExceeded`] if completing the line would consume past
    ///   the configured cap.
    pub async fn read_line(&mut self) -> Result<String> {
        let mut line: Vec<u8> = Vec::new();

        loop {
            let allowance = match self.limit {
                Some(limit) => {
                    let left = limit - self.consumed;
                    if left == 0 {
                        return Err(Error::SizeExceeded(limit));
                    }
                    Some(left)
                }
                None => None,
            };

            let buf = self.reader.fill_buf().await?;
            if buf.is_empty() {
                return Err(Error::ConnectionClosed);
            }

            let window = allowance.map_or(buf.len(), |left| buf.len().min(left));
            if let Some(pos) = buf[..window].iter().position(|&b| b == b'\n') {
                line.extend_from_slice(&buf[..=pos]);
                self.reader.consume(pos + 1);
                self.consumed += pos + 1;
                return finish_line(line);
            }

            line.extend_from_slice(&buf[..window]);
            self.reader.consume(window);
            self.consumed += window;

            if line.len() > MAX_LINE_LENGTH {
                return Err(Error::MalformedLine("line too long".into()));
            }
        }
    }

    /// Reads a dot-stuffed multi-line block per the SMTP DATA convention.
    ///
    /// Lines are read until one consisting of a single `.`, which is
    /// consumed but not included. A leading `.` on any other line is
    /// un-escaped (one dot removed). Lines are joined with `\n`.
    ///
    /// # Errors
    ///
    /// Propagates any [`read_line`](Self::read_line) error.
    pub async fn read_dot_block(&mut self) -> Result<String> {
        let mut lines = Vec::new();

        loop {
            let line = self.read_line().await?;
            if line == "." {
                break;
            }
            match line.strip_prefix('.') {
                Some(unescaped) => lines.push(unescaped.to_string()),
                None => lines.push(line),
            }
        }

        Ok(lines.join("\n"))
    }

    /// Total bytes consumed from the stream so far.
    #[must_use]
    pub const fn consumed(&self) -> usize {
        self.consumed
    }

    /// Gets a reference to the underlying stream.
    pub fn get_ref(&self) -> &S {
        self.reader.get_ref()
    }

    /// Gets a mutable reference to the underlying stream.
    pub fn get_mut(&mut self) -> &mut S {
        self.reader.get_mut()
    }

    /// Consumes the decoder and returns the inner stream.
    ///
    /// Note: Any buffered data will be lost.
    pub fn into_inner(self) -> S {
        self.reader.into_inner()
    }
}

/// Validates framing and strips the terminator from an accumulated line.
fn finish_line(mut line: Vec<u8>) -> Result<String> {
    if line.len() > MAX_LINE_LENGTH {
        return Err(Error::MalformedLine("line too long".into()));
    }
    if !line.ends_with(b"\r\n") {
        return Err(Error::MalformedLine("line not terminated by CRLF".into()));
    }
    line.truncate(line.len() - 2);
    String::from_utf8(line).map_err(|_| Error::MalformedLine("line is not valid UTF-8".into()))
}
