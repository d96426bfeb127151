//! Per-request state threaded through the middleware chain.

use http::Extensions;
use tracing::Span;

use crate::request::Request;
use crate::session::Session;

/// The mutable state bag for one request.
///
/// Created by the transport boundary (or by [`App::handle`](crate::App::handle)),
/// mutated by any middleware, and dropped once the response is out. A context
/// is never shared between requests.
///
/// The well-known slots are typed fields. Everything else a custom middleware
/// wants to hand downstream goes in [`extensions`](Context::extensions), keyed
/// by type.
///
/// Unset slots mean "not initialized yet". Accessors for the session and the
/// logger fill in a default on first use instead of failing.
#[derive(Debug)]
pub struct Context {
    request: Request,
    session: Option<Session>,
    logger: Option<Span>,
    route_matches: Option<Vec<String>>,
    extensions: Extensions,
}

impl Context {
    pub fn new(request: Request) -> Self {
        Self {
            request,
            session: None,
            logger: None,
            route_matches: None,
            extensions: Extensions::new(),
        }
    }

    pub fn request(&self) -> &Request { &self.request }
    pub fn request_mut(&mut self) -> &mut Request { &mut self.request }

    // ── session ───────────────────────────────────────────────────────────────

    /// The session, starting empty if no session middleware populated it.
    pub fn session(&mut self) -> &mut Session {
        self.session.get_or_insert_with(Session::default)
    }

    /// Whether a session has been installed or touched.
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    pub fn set_session(&mut self, session: Session) {
        self.session = Some(session);
    }

    pub fn take_session(&mut self) -> Option<Session> {
        self.session.take()
    }

    // ── logger ────────────────────────────────────────────────────────────────

    /// The request's logging span.
    ///
    /// [`Logger`](crate::middleware::Logger) installs one; otherwise a plain
    /// `request` span carrying the method and path is created on first use.
    pub fn logger(&mut self) -> &Span {
        let request = &self.request;
        self.logger.get_or_insert_with(|| {
            tracing::info_span!("request", method = %request.method(), path = request.path())
        })
    }

    pub fn set_logger(&mut self, span: Span) {
        self.logger = Some(span);
    }

    // ── route matches ─────────────────────────────────────────────────────────

    /// Groups captured by the route that matched this request.
    ///
    /// Index 0 is the whole match, 1.. are the pattern's capture groups.
    /// `None` when no [`Router`](crate::Router) matched.
    pub fn route_matches(&self) -> Option<&[String]> {
        self.route_matches.as_deref()
    }

    /// A single capture group, `None` if absent or out of range.
    pub fn route_match(&self, index: usize) -> Option<&str> {
        self.route_matches.as_ref()?.get(index).map(String::as_str)
    }

    pub fn set_route_matches(&mut self, matches: Vec<String>) {
        self.route_matches = Some(matches);
    }

    // ── extensions ────────────────────────────────────────────────────────────

    pub fn extensions(&self) -> &Extensions { &self.extensions }
    pub fn extensions_mut(&mut self) -> &mut Extensions { &mut self.extensions }
}
