use bytes::Bytes;

use crate::codec;
use crate::headers::{title_case, Headers};

const CONTENT_LENGTH: &str = "Content-Length";
const CONTENT_TYPE: &str = "Content-Type";

/// A response as held in memory. Cloning copies the header map and shares the
/// content buffer.
///
/// `Content-Length` is not tracked automatically: call
/// [Response::fill_content_length] after the content is final.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status_code: u16,
    pub reason_phrase: String,
    pub headers: Headers,
    pub content: Bytes,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    OK,
    BadRequest,
    NotFound,
}

#[derive(Default)]
pub struct Builder {
    status: Status,
    headers: Headers,
}

impl Response {
    pub fn new<R: Into<String>, C: Into<Bytes>>(status_code: u16, reason_phrase: R, headers: Headers, content: C) -> Self {
        Self {
            status_code,
            reason_phrase: reason_phrase.into(),
            headers,
            content: content.into(),
        }
    }

    pub fn builder() -> Builder {
        Default::default()
    }

    /// Looks up a header, title-casing `name` first.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&title_case(name))
    }

    /// Sets `Content-Length` to the byte length of the content. An empty body
    /// is an error; set the header by hand if a zero length is wanted.
    pub fn fill_content_length(&mut self) -> Result<(), EmptyContentError> {
        if self.content.is_empty() {
            return Err(EmptyContentError);
        }
        self.headers.insert(CONTENT_LENGTH, self.content.len().to_string());
        Ok(())
    }

    /// Serializes status line, headers and content. Headers are written as
    /// they are stored, nothing is filled in.
    pub fn to_bytes(&self, version: &str) -> Vec<u8> {
        let mut result = codec::write_status_line(self.status_code, &self.reason_phrase, version);
        result.extend(codec::write_header_lines(self.headers.iter()));
        result.extend_from_slice(&self.content);
        result
    }
}

impl Status {
    pub fn code(self) -> u16 {
        match self {
            Self::OK => 200,
            Self::BadRequest => 400,
            Self::NotFound => 404,
        }
    }

    pub fn reason(self) -> &'static str {
        match self {
            Self::OK => "OK",
            Self::BadRequest => "Bad Request",
            Self::NotFound => "Not Found",
        }
    }
}

impl Builder {
    pub fn with_status(&mut self, status: Status) -> &mut Self {
        self.status = status;
        self
    }

    pub fn as_json(&mut self) -> &mut Self {
        self.with_header(CONTENT_TYPE, "application/json")
    }

    pub fn as_text(&mut self) -> &mut Self {
        self.with_header(CONTENT_TYPE, "text/plain; charset=utf-8")
    }

    pub fn with_header<N: AsRef<str>, V: Into<String>>(&mut self, name: N, value: V) -> &mut Self {
        self.headers.insert(title_case(name.as_ref()), value);
        self
    }

    /// Finishes the response. `Content-Length` is filled in when the body is
    /// not empty.
    pub fn with_body<B: Into<Bytes>>(&mut self, body: B) -> Response {
        let mut response = Response {
            status_code: self.status.code(),
            reason_phrase: self.status.reason().to_owned(),
            headers: self.headers.clone(),
            content: body.into(),
        };
        if !response.content.is_empty() {
            response.headers.insert(CONTENT_LENGTH, response.content.len().to_string());
        }
        response
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmptyContentError;

impl std::fmt::Display for EmptyContentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "cannot fill content length of an empty body")
    }
}

impl std::error::Error for EmptyContentError {}
