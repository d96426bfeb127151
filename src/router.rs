//! Regex request router.
//!
//! Patterns are regular expressions searched for in the request path. When
//! several patterns match, the most specific one wins, where specificity is
//! simply the length of the pattern source: `/a/(.*)` beats `/a`. Length is
//! counted in UTF-8 bytes, not characters, so a non-ASCII pattern ranks above
//! an ASCII one with the same number of characters. Ties go to whichever was
//! registered first. The order is fixed once, in [`RouterBuilder::build`],
//! never per request.
//!
//! A router is a [`Middleware`]. On a match it calls the route's handler and
//! returns that response as-is; `next` is never called. With no match it
//! passes the request on to `next` untouched.

use std::cmp::Reverse;
use std::fmt;

use http::Method;
use regex::Regex;

use crate::context::Context;
use crate::error::Error;
use crate::handler::{BoxedHandler, ErasedHandler, Handler};
use crate::response::HandlerResult;
use crate::stack::{Middleware, Next};

/// The routing middleware. Build it with [`Router::builder`] or
/// [`Router::from_table`].
pub struct Router {
    routes: Vec<Route>,
}

struct Route {
    method: Option<Method>,
    matcher: Matcher,
    handler: BoxedHandler,
}

enum Matcher {
    Pattern(Regex),
    /// Matches every path; always tried after every pattern.
    AnyPath,
}

impl Route {
    fn specificity(&self) -> Reverse<Option<usize>> {
        match &self.matcher {
            Matcher::Pattern(re) => Reverse(Some(re.as_str().len())),
            Matcher::AnyPath => Reverse(None),
        }
    }

    fn accepts(&self, method: &Method) -> bool {
        self.method.as_ref().is_none_or(|m| m == method)
    }

    fn captures(&self, path: &str) -> Option<Vec<String>> {
        match &self.matcher {
            Matcher::Pattern(re) => {
                let caps = re.captures(path)?;
                Some(
                    caps.iter()
                        .map(|group| group.map_or_else(String::new, |m| m.as_str().to_owned()))
                        .collect(),
                )
            }
            Matcher::AnyPath => Some(vec![path.to_owned()]),
        }
    }
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::default()
    }

    /// Builds a method-agnostic router from `pattern → handler` pairs.
    ///
    /// ```rust
    /// use pulp::{Context, Response, Router};
    ///
    /// fn hello(_: &mut Context) -> Response { Response::text("Hello World!") }
    /// fn goodbye(_: &mut Context) -> Response { Response::text("Goodbye World!") }
    ///
    /// let router = Router::from_table([
    ///     ("/goodbye(.*)", goodbye as fn(&mut Context) -> Response),
    ///     (".*", hello),
    /// ])
    /// .unwrap();
    /// ```
    pub fn from_table<S, H, I>(table: I) -> Result<Router, Error>
    where
        S: AsRef<str>,
        H: Handler,
        I: IntoIterator<Item = (S, H)>,
    {
        table
            .into_iter()
            .fold(Router::builder(), |builder, (pattern, handler)| {
                builder.any(pattern.as_ref(), handler)
            })
            .build()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl Middleware for Router {
    fn call(&self, cx: &mut Context, next: Next<'_>) -> HandlerResult {
        let request = cx.request();
        let hit = self.routes.iter()
            .filter(|route| route.accepts(request.method()))
            .find_map(|route| Some((route, route.captures(request.path())?)));

        match hit {
            Some((route, matches)) => {
                cx.set_route_matches(matches);
                route.handler.call(cx)
            }
            None => next.run(cx),
        }
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.routes.iter().map(|r| {
            let pattern = match &r.matcher {
                Matcher::Pattern(re) => re.as_str(),
                Matcher::AnyPath => "*",
            };
            (r.method.as_ref().map(Method::as_str).unwrap_or("ANY"), pattern)
        })).finish()
    }
}

// ── RouterBuilder ─────────────────────────────────────────────────────────────

/// Collects routes; [`build`](RouterBuilder::build) compiles and orders them.
///
/// Registering the same method and pattern twice keeps the first position and
/// the last handler.
#[derive(Default)]
pub struct RouterBuilder {
    entries: Vec<Entry>,
    fallback: Option<BoxedHandler>,
}

struct Entry {
    method: Option<Method>,
    pattern: String,
    handler: BoxedHandler,
}

impl RouterBuilder {
    /// Register a handler for a method + pattern pair.
    pub fn on(self, method: Method, pattern: &str, handler: impl Handler) -> Self {
        self.add(Some(method), pattern, handler)
    }

    /// Register a handler for a pattern under every method.
    pub fn any(self, pattern: &str, handler: impl Handler) -> Self {
        self.add(None, pattern, handler)
    }

    pub fn get(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::GET, pattern, handler)
    }

    pub fn post(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::POST, pattern, handler)
    }

    pub fn put(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::PUT, pattern, handler)
    }

    pub fn delete(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::DELETE, pattern, handler)
    }

    pub fn head(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::HEAD, pattern, handler)
    }

    pub fn options(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::OPTIONS, pattern, handler)
    }

    pub fn patch(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::PATCH, pattern, handler)
    }

    /// Catch-all for any method and any path, tried after every pattern.
    pub fn fallback(mut self, handler: impl Handler) -> Self {
        self.fallback = Some(handler.into_boxed_handler());
        self
    }

    fn add(mut self, method: Option<Method>, pattern: &str, handler: impl Handler) -> Self {
        let handler = handler.into_boxed_handler();
        match self.entries.iter_mut().find(|e| e.method == method && e.pattern == pattern) {
            Some(existing) => existing.handler = handler,
            None => self.entries.push(Entry { method, pattern: pattern.to_owned(), handler }),
        }
        self
    }

    /// Compiles every pattern and orders routes by descending specificity.
    pub fn build(self) -> Result<Router, Error> {
        let mut routes = self.entries
            .into_iter()
            .map(|entry| {
                let regex = Regex::new(&entry.pattern).map_err(|source| Error::Pattern {
                    pattern: entry.pattern.clone(),
                    source,
                })?;
                Ok(Route { method: entry.method, matcher: Matcher::Pattern(regex), handler: entry.handler })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        if let Some(handler) = self.fallback {
            routes.push(Route { method: None, matcher: Matcher::AnyPath, handler });
        }

        // Stable: equal lengths keep registration order.
        routes.sort_by_key(Route::specificity);
        Ok(Router { routes })
    }
}
