//! Message framing shared by the stdio loop and the HTTP listener.
//!
//! Both transports announce a body with a `Content-Length` header. The
//! declared length is checked against [`MAX_BODY_BYTES`] before anything is
//! allocated.

use std::io::{self, BufRead, Read, Write};

use thiserror::Error;

use crate::protocol::JsonRpcResponse;

/// Largest request body either transport will buffer.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("missing content-length header")]
    MissingLength,
    #[error("invalid content-length {0:?}")]
    InvalidLength(String),
    #[error("content-length {declared} exceeds the {limit}-byte body limit")]
    TooLarge { declared: u64, limit: usize },
    #[error("unexpected eof while reading frame headers")]
    TruncatedHeaders,
    #[error("malformed http request line")]
    MalformedRequestLine,
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Header block of one frame. Only the length matters; other headers are skipped.
#[derive(Debug, Default)]
pub struct FrameHeaders {
    content_length: Option<String>,
}

impl FrameHeaders {
    pub fn record(&mut self, line: &str) {
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                self.content_length = Some(value.trim().to_string());
            }
        }
    }

    /// Consumes header lines up to the blank separator. Returns `false` on EOF.
    pub fn read_block<R: BufRead>(&mut self, reader: &mut R) -> io::Result<bool> {
        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                return Ok(false);
            }
            let line = line.trim_end_matches(['\r', '\n']);
            if line.is_empty() {
                return Ok(true);
            }
            self.record(line);
        }
    }

    pub fn declared_length(&self) -> Result<Option<u64>, FrameError> {
        self.content_length
            .as_deref()
            .map(|raw| {
                raw.parse::<u64>()
                    .map_err(|_| FrameError::InvalidLength(raw.to_string()))
            })
            .transpose()
    }
}

/// Bytes to buffer for a declared length, or `TooLarge` past the limit.
pub fn body_len(declared: u64) -> Result<usize, FrameError> {
    usize::try_from(declared)
        .ok()
        .filter(|len| *len <= MAX_BODY_BYTES)
        .ok_or(FrameError::TooLarge {
            declared,
            limit: MAX_BODY_BYTES,
        })
}

pub fn read_body<R: Read>(reader: &mut R, len: usize) -> Result<Vec<u8>, FrameError> {
    let mut body = vec![0_u8; len];
    reader.read_exact(&mut body)?;
    Ok(body)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdioFrame {
    LineDelimited,
    ContentLength,
}

impl StdioFrame {
    /// A line opening a header block rather than carrying a bare JSON message.
    pub fn opens_header_block(line: &str) -> bool {
        line.split_once(':').is_some_and(|(name, _)| {
            let name = name.trim();
            name.eq_ignore_ascii_case("content-length") || name.eq_ignore_ascii_case("content-type")
        })
    }
}

/// Reads the rest of a framed stdio message whose first header line is `first_line`.
///
/// An oversized body is skipped without buffering so the next frame still lines up.
pub fn read_stdio_frame<R: BufRead>(
    reader: &mut R,
    first_line: &str,
) -> Result<Vec<u8>, FrameError> {
    let mut headers = FrameHeaders::default();
    headers.record(first_line);
    if !headers.read_block(reader)? {
        return Err(FrameError::TruncatedHeaders);
    }
    let declared = headers.declared_length()?.ok_or(FrameError::MissingLength)?;
    match body_len(declared) {
        Ok(len) => read_body(reader, len),
        Err(err) => {
            io::copy(&mut reader.by_ref().take(declared), &mut io::sink())?;
            Err(err)
        }
    }
}

pub fn write_stdio_frame<W: Write>(
    writer: &mut W,
    response: &JsonRpcResponse,
    frame: StdioFrame,
) -> io::Result<()> {
    let body = serde_json::to_vec(response)?;
    match frame {
        StdioFrame::LineDelimited => {
            writer.write_all(&body)?;
            writer.write_all(b"\n")?;
        }
        StdioFrame::ContentLength => {
            write!(writer, "Content-Length: {}\r\n\r\n", body.len())?;
            writer.write_all(&body)?;
        }
    }
    writer.flush()
}
