//! Request and response cookie plumbing.
//!
//! Defines the collaborator traits a session store reads cookies from and
//! writes cookies to, with `http::HeaderMap` based implementations.

use crate::config::{CookieOptions, Result, SessionError};
use http::HeaderMap;
use http::header::{COOKIE, HeaderValue, SET_COOKIE};
use std::borrow::Cow;
use std::collections::HashMap;

/// Source of incoming cookies.
pub trait CookieSource: Send {
    /// Returns the raw value of cookie `name`, if the request carried it.
    fn cookie(&self, name: &str) -> Option<&str>;
}

/// Sink for outgoing cookies.
pub trait CookieSink {
    /// Sets cookie `name` to `value`.
    ///
    /// # Errors
    ///
    /// Returns an error if the cookie cannot be represented as a header.
    fn set_cookie(&mut self, name: &str, value: &str, options: &CookieOptions) -> Result<()>;

    /// Expires cookie `name` on the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the cookie cannot be represented as a header.
    fn delete_cookie(&mut self, name: &str, path: &str, domain: Option<&str>) -> Result<()>;
}

/// Incoming request cookies.
#[derive(Debug, Clone, Default)]
pub struct Request {
    cookies: HashMap<String, String>,
}

impl Request {
    /// Collects cookies from every `Cookie` header in `headers`.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut cookies = HashMap::new();
        for header in headers.get_all(COOKIE) {
            let Ok(header) = header.to_str() else {
                continue;
            };
            for (name, value) in parse_cookie_header(header) {
                cookies
                    .entry(name.to_string())
                    .or_insert_with(|| value.into_owned());
            }
        }
        Self { cookies }
    }

    /// Builds a request carrying the given cookies.
    #[must_use]
    pub fn with_cookies<I, K, V>(cookies: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            cookies: cookies
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl CookieSource for Request {
    fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }
}

/// Splits a `Cookie` header into name/value pairs, unquoting quoted values.
pub fn parse_cookie_header(header: &str) -> impl Iterator<Item = (&str, Cow<'_, str>)> {
    header.split(';').filter_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some((name, unquote_cookie_value(value.trim())))
    })
}

/// Bytes a cookie value may carry without quoting.
fn is_plain_cookie_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"/=!#$%&'*+-.^_`|~:".contains(&b)
}

/// Quotes `value` for a `Set-Cookie` header when it holds anything beyond
/// plain cookie bytes.
///
/// Quoted values escape `"` and `\` with a backslash, and `;`, `,`, control
/// bytes and non-ASCII bytes as three-digit octal, so the result is always a
/// valid header value that cannot end the cookie pair early.
#[must_use]
pub fn quote_cookie_value(value: &str) -> Cow<'_, str> {
    if value.bytes().all(is_plain_cookie_byte) {
        return Cow::Borrowed(value);
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for b in value.bytes() {
        match b {
            b'"' | b'\\' => {
                quoted.push('\\');
                quoted.push(char::from(b));
            }
            b';' | b',' | 0..=0x1f | 0x7f..=0xff => quoted.push_str(&format!("\\{b:03o}")),
            _ => quoted.push(char::from(b)),
        }
    }
    quoted.push('"');
    Cow::Owned(quoted)
}

/// Reverses [`quote_cookie_value`]. Unquoted values are returned as is.
#[must_use]
pub fn unquote_cookie_value(value: &str) -> Cow<'_, str> {
    let Some(inner) = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
    else {
        return Cow::Borrowed(value);
    };
    if !inner.contains('\\') {
        return Cow::Borrowed(inner);
    }

    let bytes = inner.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'\\' || i + 1 == bytes.len() {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        let octal = bytes
            .get(i + 1..i + 4)
            .filter(|digits| digits.iter().all(|d| (b'0'..=b'7').contains(d)))
            .and_then(|digits| std::str::from_utf8(digits).ok())
            .and_then(|digits| u8::from_str_radix(digits, 8).ok());
        match octal {
            Some(byte) => {
                out.push(byte);
                i += 4;
            }
            None => {
                out.push(bytes[i + 1]);
                i += 2;
            }
        }
    }
    Cow::Owned(String::from_utf8_lossy(&out).into_owned())
}

/// Checks that `name` can be used as a cookie name.
///
/// # Errors
///
/// Returns [`SessionError::InvalidCookieName`] if the name is empty or holds
/// whitespace, control characters, non-ASCII characters or separators.
pub fn validate_cookie_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_graphic() && !b"()<>@,;:\\\"/[]?={}".contains(&b));
    if valid {
        Ok(())
    } else {
        Err(SessionError::InvalidCookieName(name.to_string()))
    }
}

/// Formats a `Set-Cookie` header value, quoting `value` where needed.
#[must_use]
pub fn format_set_cookie(name: &str, value: &str, options: &CookieOptions) -> String {
    let mut cookie = format!("{name}={}", quote_cookie_value(value));
    if let Some(domain) = &options.domain {
        cookie.push_str("; Domain=");
        cookie.push_str(domain);
    }
    if let Some(max_age) = options.max_age {
        cookie.push_str(&format!("; Max-Age={max_age}"));
    }
    if options.secure == Some(true) {
        cookie.push_str("; Secure");
    }
    if options.httponly {
        cookie.push_str("; HttpOnly");
    }
    cookie.push_str("; Path=");
    cookie.push_str(&options.path);
    cookie
}

/// Formats a `Set-Cookie` header value that expires `name` immediately.
#[must_use]
pub fn format_delete_cookie(name: &str, path: &str, domain: Option<&str>) -> String {
    let options = CookieOptions {
        max_age: Some(0),
        domain: domain.map(str::to_string),
        path: path.to_string(),
        ..CookieOptions::default()
    };
    let cookie = format_set_cookie(name, "", &options);
    format!("{cookie}; Expires=Thu, 01 Jan 1970 00:00:00 GMT")
}

/// Outgoing response headers.
#[derive(Debug, Clone, Default)]
pub struct Response {
    pub headers: HeaderMap,
}

impl Response {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every `Set-Cookie` header written so far, in order.
    #[must_use]
    pub fn set_cookie_headers(&self) -> Vec<&str> {
        self.headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    /// Returns the value of the last `Set-Cookie` header written for `name`,
    /// as it appears on the wire.
    #[must_use]
    pub fn cookie_value(&self, name: &str) -> Option<&str> {
        self.set_cookie_headers()
            .into_iter()
            .rev()
            .find_map(|header| {
                let pair = header.split(';').next()?;
                let (cookie_name, value) = pair.split_once('=')?;
                (cookie_name == name).then_some(value)
            })
    }

    fn append_set_cookie(&mut self, header: &str) -> Result<()> {
        let value = HeaderValue::from_str(header)
            .map_err(|e| SessionError::InvalidHeader(e.to_string()))?;
        self.headers.append(SET_COOKIE, value);
        Ok(())
    }
}

impl CookieSink for Response {
    fn set_cookie(&mut self, name: &str, value: &str, options: &CookieOptions) -> Result<()> {
        validate_cookie_name(name)?;
        self.append_set_cookie(&format_set_cookie(name, value, options))
    }

    fn delete_cookie(&mut self, name: &str, path: &str, domain: Option<&str>) -> Result<()> {
        validate_cookie_name(name)?;
        self.append_set_cookie(&format_delete_cookie(name, path, domain))
    }
}
