use std::str::FromStr;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::codec::{self, ParseError};
use crate::headers::{title_case, Headers};

/// A request as held in memory. Cloning copies the header map and shares the
/// content buffer, which is never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub headers: Headers,
    pub content: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Wildcard for route registration, never the method of a parsed request.
    Any,
    Get,
    Post,
}

impl Request {
    pub fn new<P: Into<String>, C: Into<Bytes>>(method: Method, path: P, headers: Headers, content: C) -> Self {
        Self {
            method,
            path: path.into(),
            headers,
            content: content.into(),
        }
    }

    /// Parses a whole message. Everything after the first empty line is taken
    /// as content, without looking at `Content-Length`.
    pub fn parse(data: &[u8]) -> Result<Self, ParseError> {
        let (head, content) = match find(data, b"\r\n\r\n") {
            Some(end) => (&data[..end], &data[end + 4..]),
            None => (data, &[][..]),
        };
        let (line, header_block) = match find(head, b"\r\n") {
            Some(end) => (&head[..end], &head[end + 2..]),
            None => (head, &[][..]),
        };

        let start_line = codec::parse_start_line(line)?;
        let headers = codec::parse_header_lines(header_block)?;
        let method = start_line.method.parse()?;

        Ok(Self {
            method,
            path: start_line.path,
            headers,
            content: Bytes::copy_from_slice(content),
        })
    }

    /// Looks up a header, title-casing `name` first.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&title_case(name))
    }

    /// Decodes the content as UTF-8 JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ContentDecodeError> {
        let text = std::str::from_utf8(&self.content).map_err(|e| {
            debug!(error = %e, "request content is not valid utf-8.");
            ContentDecodeError(DecodeCause::Utf8(e))
        })?;
        serde_json::from_str(text).map_err(|e| {
            debug!(error = %e, "request content is not valid json.");
            ContentDecodeError(DecodeCause::Json(e))
        })
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

impl FromStr for Method {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            _ => Err(ParseError("expected HTTP method")),
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            Self::Any => write!(f, "ANY"),
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
        }
    }
}

#[derive(Debug)]
pub struct ContentDecodeError(DecodeCause);

#[derive(Debug)]
enum DecodeCause {
    Utf8(std::str::Utf8Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for ContentDecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        match &self.0 {
            DecodeCause::Utf8(_) => write!(f, "content is not valid utf-8"),
            DecodeCause::Json(_) => write!(f, "content is not valid json"),
        }
    }
}

impl std::error::Error for ContentDecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.0 {
            DecodeCause::Utf8(e) => Some(e),
            DecodeCause::Json(e) => Some(e),
        }
    }
}
