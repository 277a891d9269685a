//! # Client ip resolver
//!
//! This crate resolves the real client ip address of an inbound request that
//! may have passed through one or more reverse proxies or load balancers.
//!
//! Forwarded-address headers are spoofable, so a header value is only honored
//! when the immediate peer address belongs to a configured set of trusted
//! proxies (exact address literals or CIDR subnets, IPv4 or IPv6). Otherwise
//! the peer address itself is reported.
//!
//! ## Usage
//!
//! ```rust
//! use client_ip_resolver::{Config, HttpSource, Resolver};
//!
//! let mut config = Config::new();
//! config.add_trusted_proxy("192.168.0.0/16").unwrap();
//!
//! let mut request = http::Request::get("/").body(()).unwrap();
//! request.headers_mut().insert(
//!     http::HeaderName::from_static("x-forwarded-for"),
//!     "203.0.113.7, 192.168.5.9".parse().unwrap(),
//! );
//! let peer_addr = core::net::IpAddr::from([192, 168, 5, 9]);
//!
//! let mut resolver = Resolver::new(config);
//! let source = HttpSource::new(Some(peer_addr), &request);
//!
//! assert_eq!(resolver.resolve(&source).unwrap(), "203.0.113.7");
//! ```
//!
//! ## Features
//!
//!  * Scans an ordered list of forwarded-address headers (`Client-Ip`,
//!    `X-Forwarded-For`, ...) and takes the first one carrying a well-formed
//!    address; the precedence list is configurable.
//!  * Header values holding a comma-separated chain of hops are reduced to
//!    the leftmost, nearest-to-client token.
//!  * A blanket-trust mode for deployments where every peer is a proxy.
//!  * The resolved address is memoized until the next reconfiguration.

mod config;
mod resolver;
mod source;

pub use config::{
    Config, ConfigUpdate, TrustedProxies, TrustedProxy, TrustedProxyParseError,
    DEFAULT_HEADER_PRECEDENCE,
};
pub use resolver::{ResolveError, Resolver};
#[cfg(feature = "http")]
pub use source::HttpSource;
pub use source::{RequestSource, REMOTE_ADDR_KEY};
