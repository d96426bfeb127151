//! HTTP Basic authentication.
//!
//! [`credentials`] extracts the username and password from a request's
//! `Authorization` header. [`BasicAuth`] is the middleware around it: it asks a
//! caller-supplied check whether to let the request through and answers with
//! a `401` challenge otherwise.
//!
//! A missing or malformed header is not a pipeline error. The check still
//! runs, with empty credentials and the [`AuthError`] describing what was
//! wrong, and decides for itself.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use http::StatusCode;

use crate::context::Context;
use crate::handler::{BoxedHandler, ErasedHandler, Handler};
use crate::request::Request;
use crate::response::{ContentType, HandlerResult, Response};
use crate::stack::{Middleware, Next};

/// Why no credentials could be read from a request.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("no Authorization header")]
    MissingHeader,

    #[error("credentials are not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("credentials are not valid UTF-8")]
    NotUtf8,

    #[error("credentials have no `:` separator")]
    MissingSeparator,
}

/// A username/password pair.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Reads `Authorization: Basic <base64(user:pass)>`.
///
/// The password is everything after the first `:`, so it may itself contain
/// colons.
pub fn credentials(request: &Request) -> Result<Credentials, AuthError> {
    let header = request.header("authorization").ok_or(AuthError::MissingHeader)?;
    let encoded = header.strip_prefix("Basic ").unwrap_or(header).trim();

    let decoded = STANDARD.decode(encoded)?;
    let decoded = String::from_utf8(decoded).map_err(|_| AuthError::NotUtf8)?;
    let (username, password) = decoded.split_once(':').ok_or(AuthError::MissingSeparator)?;

    Ok(Credentials { username: username.to_owned(), password: password.to_owned() })
}

/// Everything the check gets to look at.
#[derive(Debug)]
pub struct AuthAttempt<'a> {
    /// Empty when `error` is set.
    pub username: &'a str,
    /// Empty when `error` is set.
    pub password: &'a str,
    pub request: &'a Request,
    pub error: Option<&'a AuthError>,
}

type Check = dyn Fn(&AuthAttempt<'_>) -> bool + Send + Sync;

/// Gatekeeper middleware for Basic authentication.
///
/// ```rust
/// use pulp::middleware::BasicAuth;
///
/// let auth = BasicAuth::new(|attempt| {
///     attempt.error.is_none() && attempt.username == "admin" && attempt.password == "hunter2"
/// })
/// .realm("Admin area");
/// ```
pub struct BasicAuth {
    check: Box<Check>,
    realm: String,
    on_failure: Option<BoxedHandler>,
}

impl BasicAuth {
    pub fn new<F>(check: F) -> Self
    where
        F: Fn(&AuthAttempt<'_>) -> bool + Send + Sync + 'static,
    {
        Self { check: Box::new(check), realm: "Basic".to_owned(), on_failure: None }
    }

    /// The realm announced in the `WWW-Authenticate` challenge.
    pub fn realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = realm.into();
        self
    }

    /// Replaces the default `401` page with a handler of your own.
    pub fn on_failure(mut self, handler: impl Handler) -> Self {
        self.on_failure = Some(handler.into_boxed_handler());
        self
    }

    fn denied(&self) -> Response {
        Response::builder()
            .status(StatusCode::UNAUTHORIZED)
            .header("www-authenticate", &format!("Basic realm=\"{}\"", self.realm))
            .bytes(ContentType::Html, "Access Denied.")
    }
}

impl Middleware for BasicAuth {
    fn call(&self, cx: &mut Context, next: Next<'_>) -> HandlerResult {
        let request = cx.request();
        let parsed = credentials(request);
        let (creds, error) = match &parsed {
            Ok(creds) => (Some(creds), None),
            Err(e) => (None, Some(e)),
        };
        let attempt = AuthAttempt {
            username: creds.map_or("", |c| c.username.as_str()),
            password: creds.map_or("", |c| c.password.as_str()),
            request,
            error,
        };

        if (self.check)(&attempt) {
            return next.run(cx);
        }

        tracing::debug!(path = request.path(), reason = ?error, "basic auth rejected");
        match &self.on_failure {
            Some(handler) => handler.call(cx),
            None => Ok(self.denied()),
        }
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("realm", &self.realm)
            .field("on_failure", &self.on_failure.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use http::Method;

    use super::*;
    use crate::stack::Stack;

    fn with_auth(value: &str) -> Request {
        Request::new(Method::GET, "/").with_header("Authorization", value)
    }

    fn basic(user_pass: &str) -> String {
        format!("Basic {}", STANDARD.encode(user_pass))
    }

    #[test]
    fn reads_credentials() {
        let creds = credentials(&with_auth(&basic("foo:foo_pass"))).unwrap();
        assert_eq!(creds, Credentials { username: "foo".into(), password: "foo_pass".into() });
    }

    #[test]
    fn password_may_contain_colons() {
        let creds = credentials(&with_auth(&basic("foo:a:b"))).unwrap();
        assert_eq!(creds.password, "a:b");
    }

    #[test]
    fn missing_header() {
        let err = credentials(&Request::new(Method::GET, "/")).unwrap_err();
        assert!(matches!(err, AuthError::MissingHeader));
    }

    #[test]
    fn malformed_base64() {
        let err = credentials(&with_auth("Basic %%%not-base64%%%")).unwrap_err();
        assert!(matches!(err, AuthError::Decode(_)));
    }

    #[test]
    fn missing_separator() {
        let err = credentials(&with_auth(&basic("nocolon"))).unwrap_err();
        assert!(matches!(err, AuthError::MissingSeparator));
    }

    fn admin_only(attempt: &AuthAttempt<'_>) -> bool {
        attempt.username == "admin" && attempt.password == "secret"
    }

    #[test]
    fn accepted_request_reaches_endpoint() {
        let app = Stack::new().with(BasicAuth::new(admin_only)).compile(|_: &mut Context| "inside");
        let res = app.handle(with_auth(&basic("admin:secret")));
        assert_eq!(res.status_code(), 200);
        assert_eq!(res.body().as_ref(), b"inside");
    }

    #[test]
    fn rejected_request_gets_challenge() {
        let app = Stack::new()
            .with(BasicAuth::new(admin_only).realm("Admin"))
            .compile(|_: &mut Context| "inside");

        let res = app.handle(with_auth(&basic("admin:wrong")));
        assert_eq!(res.status_code(), 401);
        assert_eq!(res.headers().get("WWW-Authenticate"), Some("Basic realm=\"Admin\""));
        assert_eq!(res.body().as_ref(), b"Access Denied.");
    }

    #[test]
    fn malformed_header_reaches_check_with_empty_credentials() {
        let seen = Arc::new(Mutex::new(None));
        let record = Arc::clone(&seen);
        let auth = BasicAuth::new(move |attempt| {
            *record.lock().unwrap() = Some((
                attempt.username.to_owned(),
                attempt.password.to_owned(),
                attempt.error.map(ToString::to_string),
            ));
            false
        });

        let app = Stack::new().with(auth).compile(|_: &mut Context| "inside");
        let res = app.handle(with_auth("Basic !!!"));

        assert_eq!(res.status_code(), 401);
        let (user, pass, error) = seen.lock().unwrap().take().unwrap();
        assert_eq!((user.as_str(), pass.as_str()), ("", ""));
        assert!(error.unwrap().starts_with("credentials are not valid base64"));
    }

    #[test]
    fn custom_failure_handler() {
        let app = Stack::new()
            .with(BasicAuth::new(|_| false).on_failure(|_: &mut Context| StatusCode::FORBIDDEN))
            .compile(|_: &mut Context| "inside");

        let res = app.handle(Request::new(Method::GET, "/"));
        assert_eq!(res.status_code(), 403);
    }
}
