//! # pulp
//!
//! A composable middleware pipeline for HTTP handlers.
//!
//! An application is an ordered [`Stack`] of [`Middleware`] wrapped around one
//! terminal [`Handler`]. Compiling the stack yields an [`App`]: an immutable,
//! cheaply cloned pipeline that any number of requests can run through at
//! once. All per-request state lives in a [`Context`].
//!
//! What ships in the box:
//!
//! - [`Router`]: regex routing, most specific pattern wins, falls through to
//!   the rest of the stack when nothing matches
//! - [`middleware::Sessions`]: session state in an HMAC-signed cookie, no
//!   server-side store
//! - [`middleware::ShowErrors`]: error boundary that renders failures as a
//!   `500` page
//! - [`middleware::BasicAuth`] and [`middleware::Logger`]
//! - [`Server`]: a hyper-based serving boundary with graceful shutdown
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use pulp::middleware::{Logger, Sessions, ShowErrors};
//! use pulp::{Context, Response, Router, Server, Stack};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), pulp::Error> {
//!     let routes = Router::builder()
//!         .get("^/users/(\\d+)$", get_user)
//!         .any("^/goodbye(.*)", goodbye)
//!         .build()?;
//!
//!     let app = Stack::new()
//!         .with(Logger::new())
//!         .with(ShowErrors::new())
//!         .with(Sessions::new("change me", "sid"))
//!         .with(routes)
//!         .compile(hello);
//!
//!     Server::bind("0.0.0.0:3000")?.serve(app).await
//! }
//!
//! fn hello(_cx: &mut Context) -> Response {
//!     Response::text("Hello World!")
//! }
//!
//! fn goodbye(cx: &mut Context) -> Response {
//!     Response::text(format!("Goodbye{}", cx.route_match(1).unwrap_or("")))
//! }
//!
//! fn get_user(cx: &mut Context) -> Response {
//!     let id = cx.route_match(1).unwrap_or("unknown");
//!     Response::json(format!(r#"{{"id":"{id}"}}"#).into_bytes())
//! }
//! ```

mod context;
mod error;
mod handler;
mod headers;
mod request;
mod response;
mod router;
mod server;
mod stack;

pub mod cookie;
pub mod middleware;
pub mod session;

pub use context::Context;
pub use error::{Error, Failure};
pub use handler::Handler;
pub use headers::Headers;
pub use http::{Method, StatusCode};
pub use request::Request;
pub use response::{ContentType, HandlerResult, IntoHandlerResult, IntoResponse, Response, ResponseBuilder};
pub use router::{Router, RouterBuilder};
pub use server::{Server, ServerConfig};
pub use session::Session;
pub use stack::{App, Middleware, Next, Stack};
