//! Incoming HTTP request type.

use bytes::Bytes;
use http::Method;

use crate::cookie;
use crate::headers::Headers;

/// An incoming HTTP request, as handed to the pipeline by the transport layer.
///
/// The path never contains the query string; routing only ever sees the path.
///
/// ```rust
/// use pulp::Request;
/// use http::Method;
///
/// let req = Request::new(Method::GET, "/users/42?verbose=1")
///     .with_header("cookie", "sid=abc; theme=dark");
///
/// assert_eq!(req.path(), "/users/42");
/// assert_eq!(req.query(), Some("verbose=1"));
/// assert_eq!(req.cookie("theme"), Some("dark"));
/// ```
#[derive(Clone, Debug)]
pub struct Request {
    method: Method,
    path: String,
    query: Option<String>,
    headers: Headers,
    body: Bytes,
}

impl Request {
    /// Builds a request from a method and a request target (`path[?query]`).
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query.to_owned())),
            None => (target, None),
        };
        Self {
            method,
            path: path.to_owned(),
            query,
            headers: Headers::new(),
            body: Bytes::new(),
        }
    }

    pub(crate) fn from_parts(parts: http::request::Parts, body: Bytes) -> Self {
        let mut headers = Headers::new();
        for (name, value) in &parts.headers {
            // Non-UTF-8 header values are unreachable from handlers.
            if let Ok(value) = value.to_str() {
                headers.add(name.as_str(), value);
            }
        }
        Self {
            method: parts.method,
            path: parts.uri.path().to_owned(),
            query: parts.uri.query().map(str::to_owned),
            headers,
            body,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.add(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn query(&self) -> Option<&str> { self.query.as_deref() }
    pub fn headers(&self) -> &Headers { &self.headers }
    pub fn headers_mut(&mut self) -> &mut Headers { &mut self.headers }
    pub fn body(&self) -> &Bytes { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Every cookie sent with the request, across all `Cookie` headers.
    pub fn cookies(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.get_all("cookie").flat_map(cookie::parse)
    }

    /// Value of the first cookie called `name`.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies().find(|(k, _)| *k == name).map(|(_, v)| v)
    }
}
