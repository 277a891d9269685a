use std::collections::HashMap;

/// Lookup key for the peer address in map-backed sources.
pub const REMOTE_ADDR_KEY: &str = "remote-addr";

/// A read-only view of the request data the resolver needs: the immediate
/// peer address and the forwarded-address headers.
///
/// Both lookups return `None` when the value is absent. Header names are
/// given in lowercase.
pub trait RequestSource {
    /// Get the address of the direct connection-level counterparty
    fn remote_addr(&self) -> Option<&str>;

    /// Get the value of a header by name
    fn header(&self, name: &str) -> Option<&str>;
}

/// Plain map source, keyed by [`REMOTE_ADDR_KEY`] and lowercase header names.
impl RequestSource for HashMap<String, String> {
    fn remote_addr(&self) -> Option<&str> {
        self.get(REMOTE_ADDR_KEY).map(String::as_str)
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

#[cfg(feature = "http")]
mod http {
    use super::RequestSource;
    use core::net::IpAddr;

    /// Pairs the socket peer address with the headers of an http request.
    ///
    /// The http request itself does not carry the peer address, so it is
    /// supplied by the transport layer at construction.
    pub struct HttpSource<'a> {
        headers: &'a http::HeaderMap,
        remote_addr: Option<String>,
    }

    impl<'a> HttpSource<'a> {
        pub fn new<T>(remote_addr: Option<IpAddr>, request: &'a http::Request<T>) -> Self {
            Self {
                headers: request.headers(),
                remote_addr: remote_addr.map(|ip| ip.to_string()),
            }
        }

        pub fn from_parts(remote_addr: Option<IpAddr>, parts: &'a http::request::Parts) -> Self {
            Self {
                headers: &parts.headers,
                remote_addr: remote_addr.map(|ip| ip.to_string()),
            }
        }
    }

    impl RequestSource for HttpSource<'_> {
        fn remote_addr(&self) -> Option<&str> {
            self.remote_addr.as_deref()
        }

        // header map lookup is case-insensitive; a repeated header yields
        // its first value only, the rest of the chain is carried inside the
        // value itself
        fn header(&self, name: &str) -> Option<&str> {
            self.headers.get(name).and_then(|value| value.to_str().ok())
        }
    }
}

#[cfg(feature = "http")]
pub use self::http::HttpSource;
