//! Cookie-backed sessions.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use tracing::warn;

use crate::context::Context;
use crate::cookie::{self, CookieOptions};
use crate::response::HandlerResult;
use crate::session;
use crate::stack::{Middleware, Next};

/// Configuration for [`Sessions`], loadable from any serde format.
#[derive(Clone, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
    pub cookie_name: String,
    #[serde(default)]
    pub cookie: CookieOptions,
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &"<redacted>")
            .field("cookie_name", &self.cookie_name)
            .field("cookie", &self.cookie)
            .finish()
    }
}

/// Loads the session from a signed cookie and writes it back when it changes.
///
/// On the way in the named cookie is decoded into [`Context::session`]; a
/// missing, forged or unreadable cookie gives an empty session. On the way out
/// the session is compared with what was decoded, and only if it differs is a
/// fresh `Set-Cookie` appended to the response.
///
/// The secret is used as-is; choosing a strong one is the caller's job.
pub struct Sessions {
    secret: Arc<[u8]>,
    cookie_name: String,
    options: CookieOptions,
}

impl Sessions {
    pub fn new(secret: impl AsRef<[u8]>, cookie_name: impl Into<String>) -> Self {
        Self {
            secret: Arc::from(secret.as_ref()),
            cookie_name: cookie_name.into(),
            options: CookieOptions::default(),
        }
    }

    pub fn from_config(config: SessionConfig) -> Self {
        Self::new(config.secret, config.cookie_name).cookie_options(config.cookie)
    }

    pub fn cookie_options(mut self, options: CookieOptions) -> Self {
        self.options = options;
        self
    }
}

impl Middleware for Sessions {
    fn call(&self, cx: &mut Context, next: Next<'_>) -> HandlerResult {
        let decoded = cx.request()
            .cookie(&self.cookie_name)
            .map(|token| session::decode(token, &self.secret))
            .unwrap_or_default();
        cx.set_session(decoded.clone());

        let response = next.run(cx)?;

        if *cx.session() == decoded {
            return Ok(response);
        }

        match session::encode(cx.session(), &self.secret) {
            Ok(token) => {
                let header = cookie::set_cookie(&self.cookie_name, &token, &self.options);
                Ok(response.with_header("set-cookie", header))
            }
            Err(e) => {
                warn!(cookie = %self.cookie_name, "session not written: {e}");
                Ok(response)
            }
        }
    }
}

impl fmt::Debug for Sessions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sessions")
            .field("cookie_name", &self.cookie_name)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use http::Method;
    use serde_json::json;

    use super::*;
    use crate::error::Failure;
    use crate::request::Request;
    use crate::response::Response;
    use crate::session::Session;
    use crate::stack::Stack;

    const SECRET: &str = "my_secret";

    fn counter(cx: &mut Context) -> Response {
        let n = cx.session().get_as::<i64>("counter").unwrap_or(0) + 1;
        cx.session().insert("counter", n);
        Response::text(n.to_string())
    }

    fn token_from(set_cookie: &str) -> &str {
        let (pair, _) = set_cookie.split_once(';').unwrap_or((set_cookie, ""));
        pair.split_once('=').map(|(_, v)| v).unwrap()
    }

    #[test]
    fn no_cookie_then_write_issues_cookie() {
        let app = Stack::new().with(Sessions::new(SECRET, "my_key")).compile(counter);

        let res = app.handle(Request::new(Method::GET, "/"));
        let set_cookie = res.headers().get("set-cookie").unwrap();

        assert!(set_cookie.starts_with("my_key="));
        let decoded = session::decode(token_from(set_cookie), SECRET.as_bytes());
        assert_eq!(decoded.get("counter"), Some(&json!(1)));
        assert_eq!(decoded.len(), 1);
    }

    #[test]
    fn incoming_cookie_is_decoded() {
        let app = Stack::new().with(Sessions::new(SECRET, "sid")).compile(counter);

        let mut session = Session::default();
        session.insert("counter", 41);
        let token = session::encode(&session, SECRET.as_bytes()).unwrap();

        let res = app.handle(Request::new(Method::GET, "/").with_header("cookie", format!("sid={token}")));
        assert_eq!(res.body().as_ref(), b"42");
    }

    #[test]
    fn unchanged_session_writes_nothing() {
        let app = Stack::new()
            .with(Sessions::new(SECRET, "sid"))
            .compile(|cx: &mut Context| {
                let _ = cx.session().get("counter");
                Response::text("read only")
            });

        let res = app.handle(Request::new(Method::GET, "/"));
        assert!(res.headers().get("set-cookie").is_none());
    }

    #[test]
    fn untouched_float_session_is_not_reissued() {
        let app = Stack::new()
            .with(Sessions::new(SECRET, "sid"))
            .compile(|cx: &mut Context| {
                let _ = cx.session().get_as::<f64>("ratio");
                Response::text("read only")
            });

        let mut session = Session::default();
        session.insert("ratio", 5.769201399531165e-257);
        let token = session::encode(&session, SECRET.as_bytes()).unwrap();

        let res = app.handle(Request::new(Method::GET, "/").with_header("cookie", format!("sid={token}")));
        assert!(res.headers().get("set-cookie").is_none());
    }

    #[test]
    fn forged_cookie_starts_empty() {
        let app = Stack::new().with(Sessions::new(SECRET, "sid")).compile(counter);

        let mut session = Session::default();
        session.insert("counter", 99);
        let forged = session::encode(&session, b"attacker").unwrap();

        let res = app.handle(Request::new(Method::GET, "/").with_header("cookie", format!("sid={forged}")));
        assert_eq!(res.body().as_ref(), b"1");
    }

    #[test]
    fn cookie_options_are_rendered() {
        let options = CookieOptions {
            domain: Some(".my.domain.com".to_owned()),
            max_age: Some(60),
            secure: true,
            ..CookieOptions::default()
        };
        let app = Stack::new()
            .with(Sessions::new(SECRET, "sid").cookie_options(options))
            .compile(counter);

        let res = app.handle(Request::new(Method::GET, "/"));
        let set_cookie = res.headers().get("set-cookie").unwrap();
        assert!(set_cookie.ends_with("; Domain=.my.domain.com; Path=/; Max-Age=60; Secure; HttpOnly"));
    }

    #[test]
    fn failure_passes_through_without_cookie() {
        let app = Stack::new()
            .with(Sessions::new(SECRET, "sid"))
            .compile(|cx: &mut Context| -> Result<Response, Failure> {
                cx.session().insert("x", 1);
                Err(Failure::msg("downstream broke"))
            });

        let mut cx = Context::new(Request::new(Method::GET, "/"));
        let failure = app.call(&mut cx).unwrap_err();
        assert_eq!(failure.message(), "downstream broke");
    }

    #[test]
    fn config_deserializes_with_default_cookie() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"secret":"s","cookie_name":"sid"}"#).unwrap();
        assert_eq!(config.cookie, CookieOptions::default());
        assert!(!format!("{config:?}").contains("\"s\""));

        let sessions = Sessions::from_config(config);
        assert_eq!(sessions.cookie_name, "sid");
    }
}
