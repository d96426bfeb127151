//! A visit counter kept entirely in a signed cookie.
//!
//! Run with:
//!   RUST_LOG=debug PULP_SECRET=change-me cargo run --example sessions
//!
//! Try (the cookie jar carries the session between calls):
//!   curl -c jar -b jar http://localhost:3000/
//!   curl -c jar -b jar http://localhost:3000/
//!   curl -c jar -b jar http://localhost:3000/reset

use pulp::cookie::{CookieOptions, SameSite};
use pulp::middleware::{Logger, Sessions, ShowErrors};
use pulp::{Context, Response, Router, Server, Stack};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), pulp::Error> {
    tracing_subscriber::fmt::init();

    let secret = std::env::var("PULP_SECRET").unwrap_or_else(|_| "my_secret".to_owned());
    let sessions = Sessions::new(secret, "pulp_session").cookie_options(CookieOptions {
        same_site: Some(SameSite::Lax),
        max_age: Some(3600),
        ..CookieOptions::default()
    });

    let routes = Router::builder().get("^/reset$", reset).build()?;

    let app = Stack::new()
        .with(Logger::new())
        .with(ShowErrors::new())
        .with(sessions)
        .with(routes)
        .compile(count);

    Server::bind("0.0.0.0:3000")?.serve(app).await
}

fn count(cx: &mut Context) -> Response {
    let visits = cx.session().get_as::<u64>("visits").unwrap_or(0) + 1;
    cx.session().insert("visits", visits);
    cx.logger().in_scope(|| info!(visits, "counted visit"));
    Response::text(format!("You have visited {visits} time(s).\n"))
}

fn reset(cx: &mut Context) -> Response {
    cx.session().clear();
    Response::text("Session cleared.\n")
}
