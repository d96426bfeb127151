//! Regex routing with a terminal fallback.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example routing
//!
//! Try:
//!   curl http://localhost:3000/goodbye/world
//!   curl http://localhost:3000/users/42
//!   curl -X POST http://localhost:3000/echo -d 'hi there'
//!   curl http://localhost:3000/boom
//!   curl -u admin:hunter2 http://localhost:3000/admin/stats

use pulp::middleware::{BasicAuth, Logger, ShowErrors};
use pulp::{Context, Failure, Response, Router, Server, Stack, StatusCode};

#[tokio::main]
async fn main() -> Result<(), pulp::Error> {
    tracing_subscriber::fmt::init();

    let admin = Stack::new()
        .with(BasicAuth::new(|attempt| attempt.username == "admin" && attempt.password == "hunter2").realm("Admin"))
        .compile(|_: &mut Context| Response::json(br#"{"requests":42}"#.to_vec()));

    let routes = Router::builder()
        .any("^/goodbye(.*)", goodbye)
        .get("^/users/(\\d+)$", get_user)
        .post("^/echo$", echo)
        .any("^/boom$", boom)
        .any("^/admin/", admin)
        .get("^/old$", |_: &mut Context| Response::redirect(StatusCode::MOVED_PERMANENTLY, "/goodbye"))
        .build()?;

    let app = Stack::new()
        .with(Logger::new())
        .with(ShowErrors::new())
        .with(routes)
        .compile(hello);

    Server::bind("0.0.0.0:3000")?.serve(app).await
}

fn hello(_: &mut Context) -> Response {
    Response::text("Hello World!")
}

// Whatever follows /goodbye in the path is capture group 1.
fn goodbye(cx: &mut Context) -> Response {
    Response::text(format!("Goodbye{}", cx.route_match(1).unwrap_or("")))
}

fn get_user(cx: &mut Context) -> Response {
    let id = cx.route_match(1).unwrap_or("unknown");
    Response::json(format!(r#"{{"id":{id},"name":"alice"}}"#).into_bytes())
}

fn echo(cx: &mut Context) -> Response {
    Response::text(String::from_utf8_lossy(cx.request().body()).into_owned())
}

fn boom(_: &mut Context) -> Result<Response, Failure> {
    Err(Failure::msg("something went wrong"))
}
