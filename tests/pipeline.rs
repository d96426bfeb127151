//! End-to-end behaviour of a full stack: sessions around a router around a
//! terminal handler, with an error boundary outside.

use pulp::middleware::basic_auth::{self, AuthError};
use pulp::middleware::{BasicAuth, Logger, Sessions, ShowErrors};
use pulp::{App, Context, Failure, Method, Request, Response, Router, Session, Stack, StatusCode, session};

const SECRET: &[u8] = b"my_secret";

fn hello(_: &mut Context) -> Response {
    Response::text("Hello World!")
}

fn goodbye(cx: &mut Context) -> Response {
    let rest = cx.route_match(1).unwrap_or_default().to_owned();
    Response::text(format!("Goodbye{rest}"))
}

fn count(cx: &mut Context) -> Response {
    let n = cx.session().get_as::<i64>("counter").unwrap_or(0) + 1;
    cx.session().insert("counter", n);
    Response::text(n.to_string())
}

fn explode(_: &mut Context) -> Result<Response, Failure> {
    Err(Failure::msg("exploded"))
}

fn app() -> App {
    let routes = Router::builder()
        .any("/goodbye(.*)", goodbye)
        .get("^/count$", count)
        .any("^/explode$", explode)
        .build()
        .unwrap();

    Stack::new()
        .with(Logger::with_prefix("test:"))
        .with(ShowErrors::with_template("error: {{error}}"))
        .with(Sessions::new(SECRET, "sid"))
        .with(routes)
        .compile(hello)
}

fn set_cookie_token(res: &Response) -> Option<String> {
    let header = res.headers().get("set-cookie")?;
    let pair = header.split(';').next()?;
    Some(pair.strip_prefix("sid=")?.to_owned())
}

#[test]
fn goodbye_scenario() {
    let routes = Router::from_table([
        ("/goodbye(.*)", goodbye as fn(&mut Context) -> Response),
        (".*", hello),
    ])
    .unwrap();
    let app = Stack::new().with(routes).compile(|_: &mut Context| "unreachable");

    let mut cx = Context::new(Request::new(Method::GET, "/goodbye/world"));
    let res = app.call(&mut cx).unwrap();

    assert_eq!(res.body().as_ref(), b"Goodbye/world");
    assert_eq!(cx.route_match(1), Some("/world"));
}

#[test]
fn unrouted_request_reaches_terminal_handler() {
    let res = app().handle(Request::new(Method::GET, "/elsewhere"));
    assert_eq!(res.status_code(), 200);
    assert_eq!(res.body().as_ref(), b"Hello World!");
    assert!(res.headers().get("set-cookie").is_none());
}

#[test]
fn session_counter_survives_round_trips() {
    let app = app();

    let first = app.handle(Request::new(Method::GET, "/count"));
    assert_eq!(first.body().as_ref(), b"1");
    let token = set_cookie_token(&first).expect("first response sets the cookie");

    let decoded = session::decode(&token, SECRET);
    let expected: Session = [("counter", 1)].into_iter().collect();
    assert_eq!(decoded, expected);

    let second = app.handle(Request::new(Method::GET, "/count").with_header("cookie", format!("sid={token}")));
    assert_eq!(second.body().as_ref(), b"2");
    let token = set_cookie_token(&second).unwrap();
    assert_eq!(session::decode(&token, SECRET).get_as::<i64>("counter"), Some(2));
}

#[test]
fn method_scoped_route_falls_through_for_other_methods() {
    let res = app().handle(Request::new(Method::POST, "/count"));
    assert_eq!(res.body().as_ref(), b"Hello World!");
}

#[test]
fn failures_are_rendered_by_the_boundary() {
    let res = app().handle(Request::new(Method::GET, "/explode"));
    assert_eq!(res.status_code(), 500);
    assert_eq!(res.body().as_ref(), b"error: exploded");
}

#[test]
fn tampered_cookie_resets_the_session() {
    let app = app();
    let first = app.handle(Request::new(Method::GET, "/count"));
    let token = set_cookie_token(&first).unwrap();

    let mut forged = token.into_bytes();
    forged[0] = if forged[0] == b'A' { b'B' } else { b'A' };
    let forged = String::from_utf8(forged).unwrap();

    let res = app.handle(Request::new(Method::GET, "/count").with_header("cookie", format!("sid={forged}")));
    assert_eq!(res.body().as_ref(), b"1");
}

#[test]
fn malformed_basic_auth_is_a_401_not_a_crash() {
    let request = Request::new(Method::GET, "/").with_header("authorization", "Basic ***");
    assert!(matches!(basic_auth::credentials(&request), Err(AuthError::Decode(_))));

    let app = Stack::new()
        .with(BasicAuth::new(|attempt| attempt.error.is_none()))
        .compile(hello);

    let res = app.handle(request);
    assert_eq!(res.status_code(), StatusCode::UNAUTHORIZED.as_u16());
    assert_eq!(res.headers().get("www-authenticate"), Some("Basic realm=\"Basic\""));
}
