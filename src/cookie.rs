//! Cookie header parsing and `Set-Cookie` rendering.

use std::fmt::Write;

use serde::Deserialize;

/// The `SameSite` cookie attribute.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "Strict",
            Self::Lax    => "Lax",
            Self::None   => "None",
        }
    }
}

/// Attributes attached to an outgoing cookie.
///
/// Deserializes from any serde format, so it can sit inside an application's
/// own config file. Missing fields take the [`Default`] values: `Path=/` and
/// `HttpOnly`, nothing else.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct CookieOptions {
    pub domain: Option<String>,
    pub path: Option<String>,
    /// Lifetime in seconds. `None` makes a browser-session cookie.
    pub max_age: Option<u64>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: Option<SameSite>,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            domain: None,
            path: Some("/".to_owned()),
            max_age: None,
            secure: false,
            http_only: true,
            same_site: None,
        }
    }
}

/// Splits a `Cookie` request header into `(name, value)` pairs.
///
/// Segments without a name are skipped; a segment without `=` yields an empty
/// value.
pub fn parse(header: &str) -> impl Iterator<Item = (&str, &str)> {
    header.split(';').filter_map(|pair| {
        let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some((name, value.trim()))
    })
}

/// Renders a `Set-Cookie` header value.
///
/// Attribute order: `Domain`, `Path`, `Max-Age`, `SameSite`, `Secure`,
/// `HttpOnly`. Unset attributes are omitted.
pub fn set_cookie(name: &str, value: &str, options: &CookieOptions) -> String {
    let mut out = format!("{name}={value}");
    if let Some(domain) = options.domain.as_deref().filter(|d| !d.is_empty()) {
        let _ = write!(out, "; Domain={domain}");
    }
    if let Some(path) = options.path.as_deref().filter(|p| !p.is_empty()) {
        let _ = write!(out, "; Path={path}");
    }
    if let Some(max_age) = options.max_age {
        let _ = write!(out, "; Max-Age={max_age}");
    }
    if let Some(same_site) = options.same_site {
        let _ = write!(out, "; SameSite={}", same_site.as_str());
    }
    if options.secure {
        out.push_str("; Secure");
    }
    if options.http_only {
        out.push_str("; HttpOnly");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_tolerates_whitespace_and_empty_segments() {
        let pairs: Vec<_> = parse(" a=1;; b = two ;flag; =orphan").collect();
        assert_eq!(pairs, [("a", "1"), ("b", "two"), ("flag", "")]);
    }

    #[test]
    fn parse_keeps_equals_inside_values() {
        let pairs: Vec<_> = parse("token=abc==/def").collect();
        assert_eq!(pairs, [("token", "abc==/def")]);
    }

    #[test]
    fn default_options_render_path_and_http_only() {
        let rendered = set_cookie("sid", "v", &CookieOptions::default());
        assert_eq!(rendered, "sid=v; Path=/; HttpOnly");
    }

    #[test]
    fn every_attribute_in_order() {
        let options = CookieOptions {
            domain: Some(".example.com".to_owned()),
            path: Some("/app".to_owned()),
            max_age: Some(3600),
            secure: true,
            http_only: true,
            same_site: Some(SameSite::Lax),
        };
        assert_eq!(
            set_cookie("sid", "v", &options),
            "sid=v; Domain=.example.com; Path=/app; Max-Age=3600; SameSite=Lax; Secure; HttpOnly",
        );
    }

    #[test]
    fn bare_cookie() {
        let options = CookieOptions { path: None, http_only: false, ..CookieOptions::default() };
        assert_eq!(set_cookie("sid", "v", &options), "sid=v");
    }
}
