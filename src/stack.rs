//! Middleware composition.
//!
//! A [`Stack`] is an ordered list of [`Middleware`] around one terminal
//! [`Handler`]. [`Stack::compile`] freezes it into an [`App`].
//!
//! ```text
//!            ┌──── A ────┐
//!   request ─┤  ┌─ B ─┐  ├─▶ response
//!            │  │  T  │  │
//!            │  └─────┘  │
//!            └───────────┘
//! Stack::new().with(A).with(B).compile(T)
//! ```
//!
//! The first middleware added is the outermost one: it sees the request first
//! and the response last. There are no nested closures. The compiled app keeps
//! a flat slice, and [`Next`] is a cursor into it.

use std::fmt;
use std::sync::Arc;

use http::StatusCode;
use tracing::error;

use crate::context::Context;
use crate::handler::{BoxedHandler, ErasedHandler, Handler};
use crate::request::Request;
use crate::response::{HandlerResult, Response};

/// A unit of request/response transformation.
///
/// A middleware may change the context before calling `next`, skip `next`
/// entirely to answer on its own, and rewrite whatever `next` returns.
///
/// Plain functions implement it:
///
/// ```rust
/// use pulp::{Context, HandlerResult, Next};
///
/// fn powered_by(cx: &mut Context, next: Next<'_>) -> HandlerResult {
///     Ok(next.run(cx)?.with_header("x-powered-by", "pulp"))
/// }
/// ```
pub trait Middleware: Send + Sync + 'static {
    fn call(&self, cx: &mut Context, next: Next<'_>) -> HandlerResult;
}

impl<F> Middleware for F
where
    F: Fn(&mut Context, Next<'_>) -> HandlerResult + Send + Sync + 'static,
{
    fn call(&self, cx: &mut Context, next: Next<'_>) -> HandlerResult {
        self(cx, next)
    }
}

/// Everything further inside the pipeline than the current middleware.
///
/// Consumed by [`run`](Next::run), so a middleware can go inward at most once.
pub struct Next<'a> {
    chain: &'a [Arc<dyn Middleware>],
    endpoint: &'a (dyn ErasedHandler + Send + Sync),
}

impl<'a> Next<'a> {
    /// Runs the rest of the pipeline.
    pub fn run(self, cx: &mut Context) -> HandlerResult {
        match self.chain.split_first() {
            Some((middleware, rest)) => {
                middleware.call(cx, Next { chain: rest, endpoint: self.endpoint })
            }
            None => self.endpoint.call(cx),
        }
    }
}

impl fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next").field("remaining", &self.chain.len()).finish()
    }
}

/// An ordered middleware list waiting for its terminal handler.
#[derive(Default)]
pub struct Stack {
    middleware: Vec<Arc<dyn Middleware>>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a middleware inside every middleware added before it.
    pub fn with(mut self, middleware: impl Middleware) -> Self {
        self.push(middleware);
        self
    }

    pub fn push(&mut self, middleware: impl Middleware) {
        self.middleware.push(Arc::new(middleware));
    }

    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }

    /// Wraps the stack around `endpoint` and returns the finished pipeline.
    ///
    /// An empty stack compiles to an app that calls `endpoint` directly.
    pub fn compile(self, endpoint: impl Handler) -> App {
        App {
            inner: Arc::new(Compiled {
                chain: self.middleware.into_boxed_slice(),
                endpoint: endpoint.into_boxed_handler(),
            }),
        }
    }
}

impl fmt::Debug for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stack").field("middleware", &self.middleware.len()).finish()
    }
}

/// A compiled, immutable pipeline.
///
/// Cloning is one `Arc` increment. Any number of requests may run through the
/// same `App` at once; all per-request state lives in their own [`Context`].
#[derive(Clone)]
pub struct App {
    inner: Arc<Compiled>,
}

struct Compiled {
    chain: Box<[Arc<dyn Middleware>]>,
    endpoint: BoxedHandler,
}

impl App {
    /// Runs the pipeline against an existing context.
    pub fn call(&self, cx: &mut Context) -> HandlerResult {
        let next = Next { chain: &self.inner.chain, endpoint: &*self.inner.endpoint };
        next.run(cx)
    }

    /// Runs the pipeline for one request and always produces a response.
    ///
    /// A [`Failure`](crate::Failure) that no error boundary handled becomes a
    /// bare `500 Internal Server Error`.
    pub fn handle(&self, request: Request) -> Response {
        let mut cx = Context::new(request);
        match self.call(&mut cx) {
            Ok(response) => response,
            Err(failure) => {
                error!(
                    method = %cx.request().method(),
                    path = cx.request().path(),
                    error = %failure,
                    "unhandled failure"
                );
                Response::status(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App").field("middleware", &self.inner.chain.len()).finish()
    }
}
