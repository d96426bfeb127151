//! Unified error types.
//!
//! Two kinds of failure exist in pulp and they never mix:
//!
//! - [`Error`] is a *setup* failure: a route pattern that does not compile, an
//!   address that does not parse, a socket that cannot be bound. These surface
//!   from builders and from [`Server::serve`](crate::Server::serve), before or
//!   outside of request handling.
//! - [`Failure`] is a *per-request* failure returned by a handler. It travels
//!   up the middleware chain as the `Err` half of a
//!   [`HandlerResult`](crate::HandlerResult) until an error boundary such as
//!   [`ShowErrors`](crate::middleware::ShowErrors) renders it.

use std::fmt;

/// The error type returned by pulp's fallible setup operations.
///
/// Application-level errors (404, 401, etc.) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid route pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid socket address `{0}`")]
    Address(String),

    #[error("session encoding: {0}")]
    Session(#[from] serde_json::Error),
}

/// A handler failure: something went wrong while producing a response.
///
/// Any `std::error::Error` converts into a `Failure`, so handlers can use `?`
/// on their own fallible calls:
///
/// ```rust
/// use pulp::{Context, Failure, Response};
///
/// fn parse_id(cx: &mut Context) -> Result<Response, Failure> {
///     let id: u64 = cx.route_match(1).unwrap_or("").parse()?;
///     Ok(Response::text(format!("user {id}")))
/// }
/// ```
///
/// `Failure` deliberately does not implement `std::error::Error` itself;
/// that is what allows the blanket `From` conversion.
pub struct Failure {
    message: String,
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl Failure {
    /// A failure carrying only a message.
    pub fn msg(message: impl fmt::Display) -> Self {
        Self { message: message.to_string(), source: None }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The underlying error, when the failure was converted from one.
    pub fn source(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.source.as_deref()
    }
}

impl<E> From<E> for Failure
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(e: E) -> Self {
        Self { message: e.to_string(), source: Some(Box::new(e)) }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl fmt::Debug for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Failure")
            .field("message", &self.message)
            .field("source", &self.source)
            .finish()
    }
}
