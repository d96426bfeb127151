//! Outgoing HTTP response type and the [`IntoResponse`] conversion trait.
//!
//! A [`Response`] is a plain `(status, headers, body)` triple returned by
//! value. Middleware that wants to change what an inner layer produced takes
//! it apart with [`Response::into_parts`] and builds its own.

use bytes::Bytes;
use http::StatusCode;

use crate::error::Failure;
use crate::headers::Headers;

// ── ContentType ───────────────────────────────────────────────────────────────

/// Common content-type values for use with [`ResponseBuilder::bytes`].
pub enum ContentType {
    Html,         // text/html; charset=utf-8
    Json,         // application/json
    OctetStream,  // application/octet-stream
    Text,         // text/plain; charset=utf-8
    Xml,          // application/xml
}

impl ContentType {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Html        => "text/html; charset=utf-8",
            Self::Json        => "application/json",
            Self::OctetStream => "application/octet-stream",
            Self::Text        => "text/plain; charset=utf-8",
            Self::Xml         => "application/xml",
        }
    }
}

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// ```rust
/// use pulp::{Response, StatusCode};
///
/// Response::text("hello");
/// Response::status(StatusCode::NO_CONTENT);
/// Response::redirect(StatusCode::FOUND, "/login");
///
/// Response::builder()
///     .status(StatusCode::CREATED)
///     .header("location", "/users/42")
///     .json(br#"{"id":42}"#.to_vec());
/// ```
#[derive(Clone, Debug)]
pub struct Response {
    status: u16,
    headers: Headers,
    body: Bytes,
}

impl Response {
    /// Assembles a response from its raw parts.
    pub fn new(status: u16, headers: Headers, body: impl Into<Bytes>) -> Self {
        Self { status, headers, body: body.into() }
    }

    /// `200 OK`, `application/json`.
    pub fn json(body: Vec<u8>) -> Self {
        Self::bytes_raw("application/json", body.into())
    }

    /// `200 OK`, `text/plain; charset=utf-8`.
    pub fn text(body: impl Into<String>) -> Self {
        Self::bytes_raw("text/plain; charset=utf-8", Bytes::from(Into::<String>::into(body)))
    }

    /// `200 OK`, `text/html; charset=utf-8`.
    pub fn html(body: impl Into<String>) -> Self {
        Self::bytes_raw("text/html; charset=utf-8", Bytes::from(Into::<String>::into(body)))
    }

    /// Response with no body.
    pub fn status(code: StatusCode) -> Self {
        Self { status: code.as_u16(), headers: Headers::new(), body: Bytes::new() }
    }

    /// Empty-bodied redirect with a `Location` header.
    pub fn redirect(code: StatusCode, location: &str) -> Self {
        Self::builder().status(code).header("location", location).no_body()
    }

    /// Builder for responses that need a custom status or extra headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: Headers::new(), status: StatusCode::OK.as_u16() }
    }

    fn bytes_raw(content_type: &str, body: Bytes) -> Self {
        let mut headers = Headers::new();
        headers.add("content-type", content_type);
        Self { status: StatusCode::OK.as_u16(), headers, body }
    }

    pub fn status_code(&self) -> u16 { self.status }
    pub fn headers(&self) -> &Headers { &self.headers }
    pub fn body(&self) -> &Bytes { &self.body }

    /// Returns this response with one more header appended.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.add(name, value);
        self
    }

    pub fn into_parts(self) -> (u16, Headers, Bytes) {
        (self.status, self.headers, self.body)
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Obtain via [`Response::builder()`]. Defaults to `200 OK`.
/// Terminated by a typed body method.
pub struct ResponseBuilder {
    headers: Headers,
    status: u16,
}

impl ResponseBuilder {
    pub fn status(mut self, code: StatusCode) -> Self {
        self.status = code.as_u16();
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.add(name, value);
        self
    }

    /// Terminate with a JSON body (`application/json`).
    pub fn json(self, body: Vec<u8>) -> Response {
        self.finish(ContentType::Json, body.into())
    }

    /// Terminate with a plain-text body (`text/plain; charset=utf-8`).
    pub fn text(self, body: impl Into<String>) -> Response {
        self.finish(ContentType::Text, Bytes::from(Into::<String>::into(body)))
    }

    /// Terminate with a typed body.
    pub fn bytes(self, content_type: ContentType, body: impl Into<Bytes>) -> Response {
        self.finish(content_type, body.into())
    }

    /// Terminate with no body (redirects, `204 No Content`, ...).
    pub fn no_body(self) -> Response {
        Response { body: Bytes::new(), headers: self.headers, status: self.status }
    }

    fn finish(self, content_type: ContentType, body: Bytes) -> Response {
        let mut headers = Headers::new();
        headers.add("content-type", content_type.as_str());
        headers.extend(self.headers);
        Response { body, headers, status: self.status }
    }
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Conversion into an HTTP [`Response`].
///
/// Implement on your own types to return them directly from handlers.
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response { self }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response { Response::text(self) }
}

impl IntoResponse for String {
    fn into_response(self) -> Response { Response::text(self) }
}

/// Return a [`StatusCode`] directly from a handler: `return StatusCode::NOT_FOUND`
impl IntoResponse for StatusCode {
    fn into_response(self) -> Response { Response::status(self) }
}

/// The raw triple: `(200, Headers::new(), "Hello World!")`.
impl<B: Into<Bytes>> IntoResponse for (u16, Headers, B) {
    fn into_response(self) -> Response { Response::new(self.0, self.1, self.2) }
}

// ── HandlerResult ─────────────────────────────────────────────────────────────

/// What every handler and middleware produces: a response or a failure.
pub type HandlerResult = Result<Response, Failure>;

/// Conversion of a handler's return value into a [`HandlerResult`].
///
/// Satisfied by every [`IntoResponse`] type and by `Result<T, E>` where `T`
/// is one and `E` converts into [`Failure`].
pub trait IntoHandlerResult {
    fn into_handler_result(self) -> HandlerResult;
}

impl<T: IntoResponse> IntoHandlerResult for T {
    fn into_handler_result(self) -> HandlerResult {
        Ok(self.into_response())
    }
}

impl<T, E> IntoHandlerResult for Result<T, E>
where
    T: IntoResponse,
    E: Into<Failure>,
{
    fn into_handler_result(self) -> HandlerResult {
        self.map(IntoResponse::into_response).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_puts_content_type_first() {
        let res = Response::builder()
            .status(StatusCode::CREATED)
            .header("location", "/users/42")
            .json(b"{}".to_vec());

        let pairs: Vec<_> = res.headers().iter().collect();
        assert_eq!(pairs, [("content-type", "application/json"), ("location", "/users/42")]);
        assert_eq!(res.status_code(), 201);
    }

    #[test]
    fn redirect_sets_location_and_empty_body() {
        let res = Response::redirect(StatusCode::FOUND, "/somewhere");
        assert_eq!(res.status_code(), 302);
        assert_eq!(res.headers().get("Location"), Some("/somewhere"));
        assert!(res.body().is_empty());
    }

    #[test]
    fn triple_converts() {
        let res = (418, Headers::new(), "short and stout").into_response();
        assert_eq!(res.status_code(), 418);
        assert_eq!(res.body().as_ref(), b"short and stout");
    }

    #[test]
    fn result_keeps_failure() {
        let ok: Result<&'static str, Failure> = Ok("fine");
        assert!(ok.into_handler_result().is_ok());

        let err: Result<String, std::fmt::Error> = Err(std::fmt::Error);
        let failure = err.into_handler_result().unwrap_err();
        assert_eq!(failure.message(), "an error occurred when formatting an argument");
    }

    #[test]
    fn into_parts_round_trips() {
        let (status, headers, body) = Response::text("hi").into_parts();
        let rebuilt = Response::new(status, headers, body);
        assert_eq!(rebuilt.headers().get("content-type"), Some("text/plain; charset=utf-8"));
    }
}
