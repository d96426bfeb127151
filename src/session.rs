//! Signed session tokens.
//!
//! A session is a string-keyed map of JSON values carried entirely in a
//! client-held cookie. There is no server-side store; integrity comes from an
//! HMAC over the serialized map.
//!
//! # Token format
//!
//! ```text
//! base64url(json) "/" base64url(hmac_sha256(secret, json))
//! ```
//!
//! - Both parts use the URL-safe alphabet without padding. That alphabet never
//!   produces `/`, so splitting at the first `/` is unambiguous.
//! - The JSON is canonical: map keys are sorted at every nesting level, so the
//!   same map always serializes to the same bytes and therefore the same
//!   token.
//! - The full 32-byte digest is kept; nothing is truncated.
//!
//! [`decode`] never fails. A missing separator, bad base64, a signature that
//! does not verify, or JSON that is not a map all decode to an empty session.

use std::collections::BTreeMap;
use std::collections::btree_map;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::Sha256;
use tracing::debug;

use crate::error::Error;

/// Separates the data part of a token from its signature.
pub const SEPARATOR: char = '/';

type HmacSha256 = Hmac<Sha256>;

/// Session state: string keys mapped to JSON values.
///
/// Keys are kept sorted, which is what makes the encoding canonical.
///
/// ```rust
/// use pulp::Session;
///
/// let mut session = Session::default();
/// session.insert("counter", 1);
/// session.insert("user", "alice");
///
/// assert_eq!(session.get_as::<i64>("counter"), Some(1));
/// assert_eq!(session.get("user").and_then(|v| v.as_str()), Some("alice"));
/// ```
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Session(BTreeMap<String, Value>);

impl Session {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Deserializes the value under `key`, `None` if absent or of another shape.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        T::deserialize(self.0.get(key)?).ok()
    }

    /// Stores `value` under `key`, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Session {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<'a> IntoIterator for &'a Session {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Serializes and signs `session` into a token.
///
/// Deterministic: the same session and secret always give the same token.
pub fn encode(session: &Session, secret: &[u8]) -> Result<String, Error> {
    let data = serde_json::to_vec(session)?;
    let signature = sign(&data, secret).finalize().into_bytes();

    Ok(format!(
        "{}{SEPARATOR}{}",
        URL_SAFE_NO_PAD.encode(&data),
        URL_SAFE_NO_PAD.encode(signature),
    ))
}

/// Verifies and deserializes a token. Anything untrustworthy is an empty session.
pub fn decode(token: &str, secret: &[u8]) -> Session {
    match try_decode(token, secret) {
        Some(session) => session,
        None => {
            debug!("discarding invalid session token");
            Session::default()
        }
    }
}

fn try_decode(token: &str, secret: &[u8]) -> Option<Session> {
    let (data, signature) = token.split_once(SEPARATOR)?;
    let data = URL_SAFE_NO_PAD.decode(data).ok()?;
    let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;

    // Constant-time comparison; the payload is not parsed before this passes.
    sign(&data, secret).verify_slice(&signature).ok()?;

    serde_json::from_slice(&data).ok()
}

fn sign(data: &[u8], secret: &[u8]) -> HmacSha256 {
    // HMAC hashes long keys and pads short ones, so every length is valid.
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts keys of any length");
    mac.update(data);
    mac
}
