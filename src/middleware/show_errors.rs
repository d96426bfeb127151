//! Error boundary.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use http::StatusCode;
use tracing::error;

use crate::context::Context;
use crate::error::Failure;
use crate::response::{ContentType, HandlerResult, Response};
use crate::stack::{Middleware, Next};

const DEFAULT_TEMPLATE: &str = "<html>\n<body>\n  <p>\n    {{error}}\n  </p>\n</body>\n</html>\n";

const PLACEHOLDER: &str = "{{error}}";

/// Renders failures from the inner pipeline as a `500` HTML page.
///
/// Catches both an `Err(Failure)` returned from further in and a panic raised
/// there. The message replaces every `{{error}}` in the template, HTML-escaped.
/// Nothing escapes upward: this middleware always returns `Ok`.
pub struct ShowErrors {
    template: String,
}

impl ShowErrors {
    pub fn new() -> Self {
        Self::with_template(DEFAULT_TEMPLATE)
    }

    pub fn with_template(template: impl Into<String>) -> Self {
        Self { template: template.into() }
    }

    fn render(&self, failure: &Failure) -> Response {
        let body = self.template.replace(PLACEHOLDER, &escape_html(failure.message()));
        Response::builder()
            .status(StatusCode::INTERNAL_SERVER_ERROR)
            .bytes(ContentType::Html, body)
    }
}

impl Default for ShowErrors {
    fn default() -> Self { Self::new() }
}

impl Middleware for ShowErrors {
    fn call(&self, cx: &mut Context, next: Next<'_>) -> HandlerResult {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| next.run(cx)))
            .unwrap_or_else(|payload| Err(Failure::msg(panic_message(&*payload))));

        match outcome {
            Ok(response) => Ok(response),
            Err(failure) => {
                error!(
                    method = %cx.request().method(),
                    path = cx.request().path(),
                    error = %failure,
                    "handler failed"
                );
                Ok(self.render(&failure))
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic".to_owned()
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&'  => out.push_str("&amp;"),
            '<'  => out.push_str("&lt;"),
            '>'  => out.push_str("&gt;"),
            '"'  => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _    => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use http::Method;

    use super::*;
    use crate::request::Request;
    use crate::stack::Stack;

    #[test]
    fn failure_is_rendered() {
        let app = Stack::new()
            .with(ShowErrors::with_template("<html><body>{{error}}</body></html>"))
            .compile(|_: &mut Context| -> Result<Response, Failure> { Err(Failure::msg("foo!")) });

        let res = app.handle(Request::new(Method::GET, "/"));
        assert_eq!(res.status_code(), 500);
        assert_eq!(res.headers().get("content-type"), Some("text/html; charset=utf-8"));
        assert_eq!(res.body().as_ref(), b"<html><body>foo!</body></html>");
    }

    #[test]
    fn panic_is_rendered_and_escaped() {
        let app = Stack::new()
            .with(ShowErrors::with_template("{{error}}"))
            .compile(|_: &mut Context| -> Response { panic!("<script>&") });

        let res = app.handle(Request::new(Method::GET, "/"));
        assert_eq!(res.status_code(), 500);
        assert_eq!(res.body().as_ref(), b"&lt;script&gt;&amp;");
    }

    #[test]
    fn formatted_panic_message() {
        let app = Stack::new()
            .with(ShowErrors::with_template("{{error}}"))
            .compile(|cx: &mut Context| -> Response { panic!("no route for {}", cx.request().path()) });

        let res = app.handle(Request::new(Method::GET, "/x"));
        assert_eq!(res.body().as_ref(), b"no route for /x");
    }

    #[test]
    fn success_passes_through() {
        let app = Stack::new().with(ShowErrors::new()).compile(|_: &mut Context| "fine");
        let res = app.handle(Request::new(Method::GET, "/"));
        assert_eq!(res.status_code(), 200);
        assert_eq!(res.body().as_ref(), b"fine");
    }

    #[test]
    fn default_template_wraps_message() {
        let page = ShowErrors::new().render(&Failure::msg("oops"));
        let body = String::from_utf8(page.body().to_vec()).unwrap();
        assert!(body.contains("<p>\n    oops\n  </p>"));
    }
}
