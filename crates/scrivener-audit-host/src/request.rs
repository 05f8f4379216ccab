//! Ambient request metadata, made explicit.
//!
//! The original design read server superglobals from anywhere; here the
//! host constructs one `RequestContext` per request and threads it through
//! every hook and interceptor call.

use serde::{Deserialize, Serialize};

/// Header names consulted for the real client address, in precedence order.
const CLIENT_IP_HEADERS: &[&str] = &[
    "Client-IP",
    "X-Forwarded-For",
    "X-Forwarded",
    "Forwarded-For",
    "Forwarded",
];

/// Fallback when no address source is available at all.
const UNKNOWN_IP: &str = "UNKNOWN";

/// Metadata of the web request (or job) an audited action ran under.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Request URI including query string.
    pub uri: String,
    /// HTTP method.
    pub method: String,
    /// Referrer header, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
    /// Peer address as seen by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_addr: Option<String>,
    /// Request headers; lookup is case-insensitive.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<(String, String)>,
}

impl RequestContext {
    /// Create a context for a method and URI.
    pub fn new(method: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            method: method.into(),
            referrer: None,
            remote_addr: None,
            headers: Vec::new(),
        }
    }

    /// Set the referrer.
    pub fn with_referrer(mut self, referrer: impl Into<String>) -> Self {
        self.referrer = Some(referrer.into());
        self
    }

    /// Set the peer address.
    pub fn with_remote_addr(mut self, addr: impl Into<String>) -> Self {
        self.remote_addr = Some(addr.into());
        self
    }

    /// Append a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Look up a header value, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Best-effort client address.
    ///
    /// Proxy headers are consulted first (Client-IP, then the forwarding
    /// family), falling back to the peer address, then `"UNKNOWN"`. Header
    /// values are attacker-influencable and treated as untrusted display
    /// data, nothing more.
    pub fn client_ip(&self) -> &str {
        for name in CLIENT_IP_HEADERS {
            if let Some(value) = self.header(name).filter(|v| !v.is_empty()) {
                return value;
            }
        }
        match self.remote_addr.as_deref() {
            Some(addr) if !addr.is_empty() => addr,
            _ => UNKNOWN_IP,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn base() -> RequestContext {
        RequestContext::new("GET", "/admin/pages").with_remote_addr("192.0.2.1")
    }

    #[test_case("Client-IP", "203.0.113.5")]
    #[test_case("X-Forwarded-For", "203.0.113.6")]
    #[test_case("X-Forwarded", "203.0.113.7")]
    #[test_case("Forwarded-For", "203.0.113.8")]
    #[test_case("Forwarded", "203.0.113.9")]
    fn proxy_headers_win_over_remote_addr(header: &str, value: &str) {
        let ctx = base().with_header(header, value);
        assert_eq!(ctx.client_ip(), value);
    }

    #[test]
    fn precedence_order_among_headers() {
        let ctx = base()
            .with_header("X-Forwarded-For", "second")
            .with_header("Client-IP", "first");
        assert_eq!(ctx.client_ip(), "first");
    }

    #[test]
    fn falls_back_to_remote_addr_then_unknown() {
        assert_eq!(base().client_ip(), "192.0.2.1");
        assert_eq!(RequestContext::new("GET", "/").client_ip(), "UNKNOWN");
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let ctx = base().with_header("x-forwarded-for", "203.0.113.6");
        assert_eq!(ctx.header("X-Forwarded-For"), Some("203.0.113.6"));
        assert_eq!(ctx.client_ip(), "203.0.113.6");
    }

    #[test]
    fn empty_header_values_are_skipped() {
        let ctx = base().with_header("Client-IP", "");
        assert_eq!(ctx.client_ip(), "192.0.2.1");
    }
}
