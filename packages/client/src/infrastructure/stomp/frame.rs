//! STOMP frame codec.
//!
//! ```text
//! COMMAND
//! header1:value1
//! header2:value2
//!
//! body^@
//! ```
//!
//! EOL may be `\n` or `\r\n`. Bare EOLs between frames are heart-beats and
//! are skipped by the decoder. Header values are escaped (`\\`, `\n`, `\r`,
//! `\c`) in every frame except CONNECT and CONNECTED.

use std::fmt;

use thiserror::Error;

const NUL: u8 = 0;
const LF: u8 = b'\n';
const CR: u8 = b'\r';

/// Frame decoding errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("malformed header line: {0}")]
    MalformedHeader(String),

    #[error("invalid escape sequence in header: {0}")]
    InvalidEscape(String),

    #[error("invalid content-length: {0}")]
    InvalidContentLength(String),

    #[error("invalid heart-beat header: {0}")]
    InvalidHeartBeat(String),

    #[error("frame is not terminated by NUL")]
    MissingTerminator,

    #[error("frame is not valid UTF-8")]
    InvalidUtf8,
}

/// STOMP command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    // client frames
    Connect,
    Stomp,
    Send,
    Subscribe,
    Unsubscribe,
    Ack,
    Nack,
    Begin,
    Commit,
    Abort,
    Disconnect,
    // server frames
    Connected,
    Message,
    Receipt,
    Error,
}

impl Command {
    pub fn as_str(self) -> &'static str {
        match self {
            Command::Connect => "CONNECT",
            Command::Stomp => "STOMP",
            Command::Send => "SEND",
            Command::Subscribe => "SUBSCRIBE",
            Command::Unsubscribe => "UNSUBSCRIBE",
            Command::Ack => "ACK",
            Command::Nack => "NACK",
            Command::Begin => "BEGIN",
            Command::Commit => "COMMIT",
            Command::Abort => "ABORT",
            Command::Disconnect => "DISCONNECT",
            Command::Connected => "CONNECTED",
            Command::Message => "MESSAGE",
            Command::Receipt => "RECEIPT",
            Command::Error => "ERROR",
        }
    }

    pub fn parse(line: &str) -> Result<Self, FrameError> {
        let command = match line {
            "CONNECT" => Command::Connect,
            "STOMP" => Command::Stomp,
            "SEND" => Command::Send,
            "SUBSCRIBE" => Command::Subscribe,
            "UNSUBSCRIBE" => Command::Unsubscribe,
            "ACK" => Command::Ack,
            "NACK" => Command::Nack,
            "BEGIN" => Command::Begin,
            "COMMIT" => Command::Commit,
            "ABORT" => Command::Abort,
            "DISCONNECT" => Command::Disconnect,
            "CONNECTED" => Command::Connected,
            "MESSAGE" => Command::Message,
            "RECEIPT" => Command::Receipt,
            "ERROR" => Command::Error,
            other => return Err(FrameError::UnknownCommand(other.to_string())),
        };
        Ok(command)
    }

    /// CONNECT and CONNECTED headers are sent verbatim for 1.0 compatibility.
    fn escapes_headers(self) -> bool {
        !matches!(self, Command::Connect | Command::Connected)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single STOMP frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    command: Command,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Frame {
    pub fn new(command: Command) -> Self {
        Self {
            command,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn command(&self) -> Command {
        self.command
    }

    /// Value of a header. When a header is repeated the first one wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn body_text(&self) -> Result<&str, FrameError> {
        std::str::from_utf8(&self.body).map_err(|_| FrameError::InvalidUtf8)
    }

    /// Serialize the frame, adding `content-length` when a body is present
    /// and the header was not set explicitly.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(64 + self.body.len());
        out.extend_from_slice(self.command.as_str().as_bytes());
        out.push(LF);

        let escape = self.command.escapes_headers();
        for (name, value) in &self.headers {
            if escape {
                out.extend_from_slice(escape_header(name).as_bytes());
                out.push(b':');
                out.extend_from_slice(escape_header(value).as_bytes());
            } else {
                out.extend_from_slice(name.as_bytes());
                out.push(b':');
                out.extend_from_slice(value.as_bytes());
            }
            out.push(LF);
        }
        if !self.body.is_empty() && self.header("content-length").is_none() {
            out.extend_from_slice(format!("content-length:{}", self.body.len()).as_bytes());
            out.push(LF);
        }

        out.push(LF);
        out.extend_from_slice(&self.body);
        out.push(NUL);
        out
    }
}

/// Decode one frame from the start of `buf`.
///
/// Returns the frame and the number of bytes consumed, or `None` when `buf`
/// holds only heart-beats or an incomplete frame.
pub fn decode(buf: &[u8]) -> Result<Option<(Frame, usize)>, FrameError> {
    let mut pos = skip_heartbeats(buf, 0);
    if pos == buf.len() {
        return Ok(None);
    }

    let Some((line, next)) = read_line(buf, pos) else {
        return Ok(None);
    };
    let command = Command::parse(utf8(line)?)?;
    pos = next;

    let mut headers = Vec::new();
    loop {
        let Some((line, next)) = read_line(buf, pos) else {
            return Ok(None);
        };
        pos = next;
        if line.is_empty() {
            break;
        }
        let line = utf8(line)?;
        let Some((name, value)) = line.split_once(':') else {
            return Err(FrameError::MalformedHeader(line.to_string()));
        };
        if command.escapes_headers() {
            headers.push((unescape_header(name)?, unescape_header(value)?));
        } else {
            headers.push((name.to_string(), value.to_string()));
        }
    }

    let content_length = headers
        .iter()
        .find(|(name, _)| name == "content-length")
        .map(|(_, value)| {
            value
                .trim()
                .parse::<usize>()
                .map_err(|_| FrameError::InvalidContentLength(value.clone()))
        })
        .transpose()?;

    let (body, consumed) = match content_length {
        Some(len) => {
            let end = pos
                .checked_add(len)
                .ok_or_else(|| FrameError::InvalidContentLength(len.to_string()))?;
            if buf.len() <= end {
                return Ok(None);
            }
            if buf[end] != NUL {
                return Err(FrameError::MissingTerminator);
            }
            (buf[pos..end].to_vec(), end + 1)
        }
        None => match buf[pos..].iter().position(|&b| b == NUL) {
            Some(offset) => (buf[pos..pos + offset].to_vec(), pos + offset + 1),
            None => return Ok(None),
        },
    };

    Ok(Some((
        Frame {
            command,
            headers,
            body,
        },
        consumed,
    )))
}

/// Decode every frame in a complete buffer, e.g. one WebSocket message.
pub fn decode_all(buf: &[u8]) -> Result<Vec<Frame>, FrameError> {
    let mut frames = Vec::new();
    let mut rest = buf;
    while let Some((frame, consumed)) = decode(rest)? {
        frames.push(frame);
        rest = &rest[consumed..];
    }
    if skip_heartbeats(rest, 0) != rest.len() {
        return Err(FrameError::MissingTerminator);
    }
    Ok(frames)
}

fn skip_heartbeats(buf: &[u8], mut pos: usize) -> usize {
    loop {
        match buf.get(pos) {
            Some(&LF) => pos += 1,
            Some(&CR) if buf.get(pos + 1) == Some(&LF) => pos += 2,
            _ => return pos,
        }
    }
}

fn read_line(buf: &[u8], start: usize) -> Option<(&[u8], usize)> {
    let offset = buf[start..].iter().position(|&b| b == LF)?;
    let end = start + offset;
    let line = match buf[start..end].last() {
        Some(&CR) => &buf[start..end - 1],
        _ => &buf[start..end],
    };
    Some((line, end + 1))
}

fn utf8(bytes: &[u8]) -> Result<&str, FrameError> {
    std::str::from_utf8(bytes).map_err(|_| FrameError::InvalidUtf8)
}

fn escape_header(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            ':' => out.push_str("\\c"),
            other => out.push(other),
        }
    }
    out
}

fn unescape_header(value: &str) -> Result<String, FrameError> {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('c') => out.push(':'),
            _ => return Err(FrameError::InvalidEscape(value.to_string())),
        }
    }
    Ok(out)
}
