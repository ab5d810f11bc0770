pub mod codec;
pub mod headers;
pub mod request;
pub mod response;
pub mod router;

pub use codec::{parse_header_lines, parse_start_line, write_header_lines, write_status_line, ParseError, StartLine};
pub use headers::{title_case, Headers};
pub use request::{ContentDecodeError, Method, Request};
pub use response::{EmptyContentError, Response, Status};
pub use router::{ConflictError, Handler, Router};
