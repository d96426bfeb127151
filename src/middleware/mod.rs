//! Built-in middleware.
//!
//! Every type here implements [`Middleware`](crate::Middleware) and is added
//! to a [`Stack`](crate::Stack) with `with`. Order matters: put
//! [`ShowErrors`] outside anything whose failures it should render, and
//! [`Sessions`] outside any router whose handlers use the session.
//!
//! ```rust
//! use pulp::middleware::{Logger, Sessions, ShowErrors};
//! use pulp::{Context, Response, Stack};
//!
//! fn hello(cx: &mut Context) -> Response {
//!     let visits = cx.session().get_as::<u64>("visits").unwrap_or(0) + 1;
//!     cx.session().insert("visits", visits);
//!     Response::text(format!("visit #{visits}"))
//! }
//!
//! let app = Stack::new()
//!     .with(Logger::new())
//!     .with(ShowErrors::new())
//!     .with(Sessions::new("s3cret", "sid"))
//!     .compile(hello);
//! ```

pub mod basic_auth;

mod logger;
mod sessions;
mod show_errors;

pub use basic_auth::BasicAuth;
pub use logger::Logger;
pub use sessions::{SessionConfig, Sessions};
pub use show_errors::ShowErrors;
