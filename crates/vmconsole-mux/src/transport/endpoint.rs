//! Proxy endpoint addresses for each console kind.

use std::fmt;

use vmconsole_common::SessionKind;

/// Fully resolved transport address. The access token travels in the query
/// string, so `Debug` and [`Endpoint::redacted`] strip it.
#[derive(Clone, PartialEq, Eq)]
pub struct Endpoint {
    url: String,
    path: String,
    kind: SessionKind,
}

impl Endpoint {
    /// VNC display relay for a VM listening on `port`.
    pub fn display(base: &str, port: u16, token: &str) -> Self {
        Self::build(base, format!("/vnc-proxy/{port}"), token, SessionKind::Graphical)
    }

    /// Shell inside the named container.
    pub fn container_shell(base: &str, name: &str, token: &str) -> Self {
        let path = format!("/lxc-console/{}", urlencoding::encode(name));
        Self::build(base, path, token, SessionKind::Text)
    }

    /// Shell on the host itself.
    pub fn host_shell(base: &str, token: &str) -> Self {
        Self::build(base, "/host-console".to_string(), token, SessionKind::Text)
    }

    fn build(base: &str, path: String, token: &str, kind: SessionKind) -> Self {
        let base = base.trim_end_matches('/');
        let url = if token.is_empty() {
            format!("{base}{path}")
        } else {
            format!("{base}{path}?token={}", urlencoding::encode(token))
        };
        Self {
            url,
            path: format!("{base}{path}"),
            kind,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// The address without credentials, safe for logs.
    pub fn redacted(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> SessionKind {
        self.kind
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("url", &self.redacted())
            .field("kind", &self.kind)
            .finish()
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.redacted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_endpoint() {
        let ep = Endpoint::display("ws://127.0.0.1:5000/", 5901, "s3cret");
        assert_eq!(ep.url(), "ws://127.0.0.1:5000/vnc-proxy/5901?token=s3cret");
        assert_eq!(ep.redacted(), "ws://127.0.0.1:5000/vnc-proxy/5901");
        assert_eq!(ep.kind(), SessionKind::Graphical);
    }

    #[test]
    fn container_name_and_token_are_encoded() {
        let ep = Endpoint::container_shell("wss://hv.lan", "web 1", "a+b/c");
        assert_eq!(ep.url(), "wss://hv.lan/lxc-console/web%201?token=a%2Bb%2Fc");
        assert_eq!(ep.kind(), SessionKind::Text);
    }

    #[test]
    fn empty_token_has_no_query() {
        let ep = Endpoint::host_shell("ws://127.0.0.1:5000", "");
        assert_eq!(ep.url(), "ws://127.0.0.1:5000/host-console");
    }

    #[test]
    fn debug_hides_token() {
        let ep = Endpoint::host_shell("ws://127.0.0.1:5000", "s3cret");
        let debug = format!("{ep:?}");
        assert!(!debug.contains("s3cret"));
        assert!(!ep.to_string().contains("s3cret"));
    }
}
