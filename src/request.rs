//! Per-request input handed to the guard by the host pipeline

use std::collections::HashMap;
use std::net::IpAddr;

use crate::security::lockdown::BYPASS_COOKIE_NAME;

/// Incoming request as seen by the guard
#[derive(Debug, Clone, Default)]
pub struct IncomingRequest {
    /// Raw request URI (path plus query string) exactly as the server reports it
    pub uri: String,
    /// Decoded query parameters; a bare `?key` maps to an empty value
    pub query: HashMap<String, String>,
    /// Value of the lockdown bypass cookie, if the client sent one
    pub bypass_cookie: Option<String>,
    /// Socket peer address
    pub peer_addr: Option<IpAddr>,
    /// Request headers, keyed by lower-cased name
    pub headers: HashMap<String, String>,
}

impl IncomingRequest {
    /// Build a request from its raw URI, parsing the query string
    pub fn new<S: Into<String>>(uri: S) -> Self {
        let uri = uri.into();
        let query = uri
            .split_once('?')
            .map(|(_, query)| {
                url::form_urlencoded::parse(query.as_bytes())
                    .into_owned()
                    .collect::<HashMap<String, String>>()
            })
            .unwrap_or_default();

        Self {
            uri,
            query,
            ..Default::default()
        }
    }

    pub fn with_peer_addr(mut self, addr: IpAddr) -> Self {
        self.peer_addr = Some(addr);
        self
    }

    pub fn with_bypass_cookie<S: Into<String>>(mut self, value: S) -> Self {
        self.bypass_cookie = Some(value.into());
        self
    }

    /// Pick the bypass cookie out of a raw `Cookie` header, percent-decoding its value
    pub fn with_cookie_header(mut self, header: &str) -> Self {
        self.bypass_cookie = header
            .split(';')
            .filter_map(|pair| url::form_urlencoded::parse(pair.trim().as_bytes()).next())
            .find(|(name, _)| *name == BYPASS_COOKIE_NAME)
            .map(|(_, value)| value.into_owned());
        self
    }

    pub fn with_header<K: AsRef<str>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn has_query_param(&self, name: &str) -> bool {
        self.query.contains_key(name)
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Bypass cookie value, empty when absent
    pub fn bypass_token(&self) -> &str {
        self.bypass_cookie.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_parsing() {
        let request = IncomingRequest::new("/wp-login.php?X7k&action=login&redirect_to=%2Fwp-admin%2F");
        assert!(request.has_query_param("X7k"));
        assert_eq!(request.query_param("X7k"), Some(""));
        assert_eq!(request.query_param("action"), Some("login"));
        assert_eq!(request.query_param("redirect_to"), Some("/wp-admin/"));
        assert_eq!(request.uri, "/wp-login.php?X7k&action=login&redirect_to=%2Fwp-admin%2F");
    }

    #[test]
    fn test_no_query() {
        let request = IncomingRequest::new("/wp-login.php");
        assert!(request.query.is_empty());
        assert_eq!(request.bypass_token(), "");
    }

    #[test]
    fn test_cookie_header() {
        let request = IncomingRequest::new("/")
            .with_cookie_header("theme=dark; shieldgate_passcode=X7k; other=1");
        assert_eq!(request.bypass_token(), "X7k");

        let request = IncomingRequest::new("/").with_cookie_header("theme=dark");
        assert_eq!(request.bypass_cookie, None);
    }

    #[test]
    fn test_cookie_header_value_is_decoded() {
        let request = IncomingRequest::new("/")
            .with_cookie_header("shieldgate_passcode=open+sesame%3B1; theme=dark");
        assert_eq!(request.bypass_token(), "open sesame;1");

        let request = IncomingRequest::new("/").with_cookie_header("shieldgate_passcode=a%2Bb%2C%22c%22");
        assert_eq!(request.bypass_token(), "a+b,\"c\"");
    }

    #[test]
    fn test_headers_are_case_insensitive() {
        let request = IncomingRequest::new("/").with_header("X-Forwarded-For", "203.0.113.7");
        assert_eq!(request.header("x-forwarded-for"), Some("203.0.113.7"));
        assert_eq!(request.header("X-FORWARDED-FOR"), Some("203.0.113.7"));
    }
}
