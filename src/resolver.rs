use core::net::IpAddr;

use thiserror::Error;

use crate::config::{Config, ConfigUpdate, TrustedProxies};
use crate::source::RequestSource;

/// Failure to resolve a client address.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// The request source has no peer address at all. There is no alternate
    /// source to fall back to, so this is surfaced to the caller.
    #[error("no peer address available from the request source")]
    NoPeerAddress,
}

/// Resolves the real client address of a request behind trusted proxies.
///
/// The resolver holds the configuration and memoizes the resolved address:
/// repeated [`resolve`](Resolver::resolve) calls return the same value until
/// the configuration changes. One resolver corresponds to one request
/// context; hosts processing requests concurrently should scope a resolver
/// per request rather than share one.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    config: Config,
    resolved: Option<String>,
}

impl Resolver {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            resolved: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Apply a partial configuration update and drop the memoized address.
    pub fn configure(&mut self, update: ConfigUpdate) {
        self.config.apply(update);
        self.resolved = None;
    }

    /// Switch to blanket-trust mode and drop the memoized address.
    pub fn set_blanket_trust(&mut self) {
        self.config.set_trusted_proxies(TrustedProxies::Blanket);
        self.resolved = None;
    }

    /// Resolve the client address from the given request source.
    ///
    /// Returns the memoized address when one exists. Otherwise reads the
    /// peer address, scans the forwarded-address headers when proxies are
    /// trusted, and falls back to the peer address whenever the header chain
    /// cannot be honored. A [`ResolveError::NoPeerAddress`] failure is never
    /// memoized: the peer address is read again on the next call.
    pub fn resolve<S: RequestSource>(&mut self, source: &S) -> Result<String, ResolveError> {
        if let Some(resolved) = &self.resolved {
            return Ok(resolved.clone());
        }

        let peer_addr = source.remote_addr().ok_or(ResolveError::NoPeerAddress)?;

        let resolved = match self.config.trusted_proxies() {
            // every peer is assumed to be a proxy, honor the first valid
            // forwarded value unconditionally
            TrustedProxies::Blanket => self
                .forward_candidate(source)
                .unwrap_or_else(|| peer_addr.to_string()),
            // no trusted proxies, headers are never consulted
            TrustedProxies::List(entries) if entries.is_empty() => peer_addr.to_string(),
            TrustedProxies::List(_) => match self.forward_candidate(source) {
                Some(candidate) if self.config.is_peer_trusted(peer_addr) => candidate,
                _ => peer_addr.to_string(),
            },
        };

        self.resolved = Some(resolved.clone());

        Ok(resolved)
    }

    /// Scan the header precedence list and return the first well-formed
    /// forwarded address.
    ///
    /// Proxies typically append the whole chain of hops comma-separated
    /// (`client, proxy1, proxy2`), so only the leftmost, nearest-to-client
    /// token of each header is considered. A header whose leading token is
    /// malformed is skipped entirely.
    fn forward_candidate<S: RequestSource>(&self, source: &S) -> Option<String> {
        for name in self.config.header_precedence() {
            let Some(value) = source.header(name) else {
                continue;
            };

            let token = value.split(',').next().unwrap_or(value).trim();

            if token.parse::<IpAddr>().is_ok() {
                return Some(token.to_string());
            }
        }

        None
    }
}
