//! Request logging.

use std::time::Instant;

use tracing::{info, info_span, warn};

use crate::context::Context;
use crate::response::HandlerResult;
use crate::stack::{Middleware, Next};

/// Opens a `request` span for each request and logs one line when it is done.
///
/// The span is stored as the context's logger, so handlers further in can log
/// inside it with `cx.logger().in_scope(|| ...)`. The access line carries the
/// method, path, status and elapsed milliseconds; a failure from further in is
/// logged at `warn` and passed up unchanged.
#[derive(Clone, Debug, Default)]
pub struct Logger {
    prefix: Option<String>,
}

impl Logger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tags every access line with `prefix`.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self { prefix: Some(prefix.into()) }
    }
}

impl Middleware for Logger {
    fn call(&self, cx: &mut Context, next: Next<'_>) -> HandlerResult {
        let method = cx.request().method().clone();
        let path = cx.request().path().to_owned();
        let prefix = self.prefix.as_deref().unwrap_or("");

        let span = info_span!("request", %method, path = %path);
        cx.set_logger(span.clone());

        let started = Instant::now();
        let result = span.in_scope(|| next.run(cx));
        let elapsed_ms = started.elapsed().as_millis() as u64;

        span.in_scope(|| match &result {
            Ok(response) => info!(
                prefix,
                %method,
                path = %path,
                status = response.status_code(),
                elapsed_ms,
                "request completed"
            ),
            Err(failure) => warn!(prefix, %method, path = %path, elapsed_ms, error = %failure, "request failed"),
        });

        result
    }
}
