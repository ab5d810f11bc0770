use tracing::{debug, trace};

use crate::headers::{title_case, Headers};

const CRLF: &str = "\r\n";

/// The three fields of a request line, lower-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartLine {
    pub method: String,
    pub path: String,
    pub version: String,
}

/// Parses `METHOD SP PATH SP VERSION`, with or without a trailing CRLF.
///
/// The whole line is lower-cased. It must split on single spaces into
/// exactly three non-empty fields, so doubled or trailing spaces are errors.
pub fn parse_start_line(data: &[u8]) -> Result<StartLine, ParseError> {
    let line = std::str::from_utf8(data).map_err(|_| ParseError("start line is not valid utf-8"))?;
    let line = line.strip_suffix(CRLF).unwrap_or(line).to_lowercase();

    let fields = line.split(' ').collect::<Vec<_>>();
    let [method, path, version] = fields[..] else {
        debug!(%line, "start line does not have three fields.");
        return Err(ParseError("expected method, path and version separated by single spaces"));
    };
    if method.is_empty() || path.is_empty() || version.is_empty() {
        debug!(%line, "start line has an empty field.");
        return Err(ParseError("expected method, path and version separated by single spaces"));
    }

    trace!(method, path, version, "parsed start line.");
    Ok(StartLine {
        method: method.to_owned(),
        path: path.to_owned(),
        version: version.to_owned(),
    })
}

/// Parses a block of `Name: value` lines separated by CRLF. The block may end
/// with one or two CRLFs.
pub fn parse_header_lines(data: &[u8]) -> Result<Headers, ParseError> {
    let block = std::str::from_utf8(data).map_err(|_| ParseError("header block is not valid utf-8"))?;

    let mut headers = Headers::new();
    for line in block.split(CRLF).filter(|line| !line.is_empty()) {
        let (name, value) = line.split_once(':').ok_or_else(|| {
            debug!(line, "header line without colon.");
            ParseError("expected HTTP header")
        })?;
        headers.insert(title_case(name), value.trim_start_matches(' '));
    }

    trace!(count = headers.len(), "parsed header lines.");
    Ok(headers)
}

/// Writes `{version} {status_code} {reason}\r\n`, keeping the casing of every
/// field.
pub fn write_status_line(status_code: u16, reason: &str, version: &str) -> Vec<u8> {
    format!("{version} {status_code} {reason}{CRLF}").into_bytes()
}

/// Writes one `{name}: {value}\r\n` line per pair, in order and verbatim,
/// followed by the empty line ending the header section.
pub fn write_header_lines<I, N, V>(headers: I) -> Vec<u8>
where
    I: IntoIterator<Item = (N, V)>,
    N: AsRef<str>,
    V: AsRef<str>,
{
    let mut lines = headers
        .into_iter()
        .map(|(name, value)| format!("{}: {}{CRLF}", name.as_ref(), value.as_ref()))
        .collect::<String>();
    lines.push_str(CRLF);
    lines.into_bytes()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseError(pub(crate) &'static str);

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "parse error: {}", self.0)
    }
}

impl std::error::Error for ParseError {}
