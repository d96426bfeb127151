//! Handler trait and type erasure.
//!
//! # How handlers are stored
//!
//! A stack's endpoint and a router's route targets are handlers of *different*
//! concrete types held in one collection, so they are erased behind a trait
//! object (`dyn ErasedHandler`) and stored uniformly.
//!
//! ```text
//! fn hello(cx: &mut Context) -> Response { … }   ← user writes this
//!        ↓ router.any("/", hello)
//! hello.into_boxed_handler()                     ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(hello))                     ← heap-allocated wrapper
//!        ↓  stored as BoxedHandler = Arc<dyn ErasedHandler>
//! handler.call(cx)  at request time              ← one vtable dispatch
//! ```
//!
//! Handlers are synchronous. Nothing in the pipeline waits on I/O; routing and
//! signing are CPU-bound and run on the request's own task.

use std::sync::Arc;

use crate::context::Context;
use crate::response::{HandlerResult, IntoHandlerResult};
use crate::stack::App;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, cx: &mut Context) -> HandlerResult;
}

/// A type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

/// Implemented for every valid terminal handler or route target.
///
/// You never implement this yourself. It is satisfied by any function with
/// the signature:
///
/// ```text
/// fn name(cx: &mut Context) -> impl IntoHandlerResult
/// ```
///
/// and by a compiled [`App`], so whole stacks can be mounted as route targets.
///
/// A handler is given no `next`: the innermost stage of a pipeline has nothing
/// further inside it to call, and the signature makes that impossible to get
/// wrong.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

/// Because `Sealed` is private, external crates cannot implement `Handler`.
mod private {
    pub trait Sealed {}
}

impl<F, R> private::Sealed for F
where
    F: Fn(&mut Context) -> R + Send + Sync + 'static,
    R: IntoHandlerResult,
{
}

impl<F, R> Handler for F
where
    F: Fn(&mut Context) -> R + Send + Sync + 'static,
    R: IntoHandlerResult,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

impl private::Sealed for App {}

impl Handler for App {
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(self)
    }
}

/// Newtype bridging a concrete handler `F` to the trait-object world.
struct FnHandler<F>(F);

impl<F, R> ErasedHandler for FnHandler<F>
where
    F: Fn(&mut Context) -> R,
    R: IntoHandlerResult,
{
    fn call(&self, cx: &mut Context) -> HandlerResult {
        (self.0)(cx).into_handler_result()
    }
}

impl ErasedHandler for App {
    fn call(&self, cx: &mut Context) -> HandlerResult {
        App::call(self, cx)
    }
}
