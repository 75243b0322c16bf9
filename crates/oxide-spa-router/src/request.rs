//! The per-dispatch request context.

use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::middleware::{Flow, UnitResult};

/// A path parameter value.
///
/// Extracted text becomes a number only when the whole string is an
/// integer; everything else stays text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Integer value.
    Number(i64),
    /// Any other text.
    Text(String),
}

impl ParamValue {
    /// Coerces raw path text.
    ///
    /// ```
    /// use oxide_spa_router::ParamValue;
    ///
    /// assert_eq!(ParamValue::coerce("123"), ParamValue::Number(123));
    /// assert_eq!(ParamValue::coerce("12ab"), ParamValue::Text("12ab".into()));
    /// assert_eq!(ParamValue::coerce(""), ParamValue::Text(String::new()));
    /// ```
    pub fn coerce(raw: &str) -> Self {
        raw.parse::<i64>()
            .map_or_else(|_| Self::Text(raw.to_string()), Self::Number)
    }

    /// Returns the integer, if this is a number.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }

    /// Returns the text, if this is not a number.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Number(_) => None,
            Self::Text(s) => Some(s),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// Path parameters extracted from the URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathParams {
    params: HashMap<String, ParamValue>,
}

/// Short name used throughout the crate.
pub type Params = PathParams;

impl PathParams {
    /// Creates new empty path params.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a parameter.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.params.insert(key.into(), value.into());
    }

    /// Gets a parameter value.
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.params.get(key)
    }

    /// Gets a numeric parameter.
    pub fn number(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(ParamValue::as_i64)
    }

    /// Gets a text parameter.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ParamValue::as_str)
    }

    /// Parses a parameter as a specific type.
    pub fn parse<T: std::str::FromStr>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|v| v.to_string().parse().ok())
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether no parameters were extracted.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Returns an iterator over the parameters.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Context threaded through one handler chain.
///
/// A fresh request is built for every dispatch. Units receive it by value
/// and hand it on with [`Request::proceed`], so anything written to
/// `state` is seen by every later unit of the same chain.
#[derive(Debug, Clone)]
pub struct Request {
    /// The dispatched path, exactly as navigated to.
    pub route: String,
    /// The registered pattern that handled the path.
    pub pattern: String,
    /// Path parameters extracted from the pattern.
    pub params: PathParams,
    /// Query string parameters.
    pub query: HashMap<String, String>,
    /// Open storage shared by the units of the chain.
    pub state: HashMap<String, Value>,
}

impl Request {
    /// Creates a new request for a dispatched path.
    pub fn new(route: impl Into<String>, pattern: impl Into<String>, params: PathParams) -> Self {
        let route = route.into();
        let query = route
            .split_once('?')
            .map(|(_, q)| Self::parse_query_string(q.split('#').next().unwrap_or(q)))
            .unwrap_or_default();

        Self {
            route,
            pattern: pattern.into(),
            params,
            query,
            state: HashMap::new(),
        }
    }

    /// Stores a value for later units.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.state.insert(key.into(), value.into());
    }

    /// Reads a stored value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.state.get(key)
    }

    /// Reads a stored value as a typed value.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Gets a query parameter.
    pub fn get_query(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// Passes the request on to the next unit.
    pub fn proceed(self) -> UnitResult {
        Ok(Flow::Continue(self))
    }

    /// Parses query parameters from a query string.
    pub fn parse_query_string(query: &str) -> HashMap<String, String> {
        query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .filter_map(|pair| {
                let mut parts = pair.splitn(2, '=');
                let key = parts.next()?;
                let value = parts.next().unwrap_or("");
                Some((urlencoding_decode(key), urlencoding_decode(value)))
            })
            .collect()
    }
}

/// Simple URL decoding.
fn urlencoding_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let decoded = bytes
                    .get(i + 1..i + 3)
                    .filter(|hex| hex.iter().all(u8::is_ascii_hexdigit))
                    .and_then(|hex| std::str::from_utf8(hex).ok())
                    .and_then(|hex| u8::from_str_radix(hex, 16).ok());
                if let Some(byte) = decoded {
                    result.push(byte);
                    i += 3;
                    continue;
                }
                result.push(b'%');
            }
            b'+' => result.push(b' '),
            b => result.push(b),
        }
        i += 1;
    }

    String::from_utf8_lossy(&result).into_owned()
}
