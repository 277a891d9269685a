use core::net::IpAddr;
use std::str::FromStr;

use ipnet::IpNet;
use thiserror::Error;

/// Default forwarded-address header names, scanned in order.
pub const DEFAULT_HEADER_PRECEDENCE: [&str; 7] = [
    "client-ip",
    "x-forwarded-for",
    "x-forwarded",
    "x-cluster-client-ip",
    "forwarded-for",
    "forwarded",
    "via",
];

/// Error returned when a trusted proxy entry cannot be parsed.
#[derive(Debug, Error)]
pub enum TrustedProxyParseError {
    #[error("invalid trusted proxy subnet `{input}`: {source}")]
    Subnet {
        input: String,
        source: ipnet::AddrParseError,
    },
    #[error("invalid trusted proxy address `{input}`: {source}")]
    Address {
        input: String,
        source: core::net::AddrParseError,
    },
}

/// A single trusted proxy entry: an exact address literal or a CIDR subnet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrustedProxy {
    /// An exact address, matched byte-for-byte against the peer address.
    Literal(String),
    /// A CIDR subnet, matched by prefix containment.
    Subnet(IpNet),
}

impl TrustedProxy {
    /// Check whether a peer address belongs to this entry.
    ///
    /// Literal entries compare the textual representation as-is: `::1` and
    /// `0:0:0:0:0:0:0:1` are distinct. Subnet entries parse the peer address
    /// and test prefix containment; an entry of the other address family
    /// never matches.
    pub fn matches(&self, peer_addr: &str) -> bool {
        match self {
            Self::Literal(literal) => literal == peer_addr,
            Self::Subnet(net) => match peer_addr.parse::<IpAddr>() {
                Ok(ip) => net.contains(&ip),
                Err(_) => false,
            },
        }
    }
}

impl FromStr for TrustedProxy {
    type Err = TrustedProxyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.contains('/') {
            match s.parse::<IpNet>() {
                Ok(net) => Ok(Self::Subnet(net)),
                Err(source) => Err(TrustedProxyParseError::Subnet {
                    input: s.to_string(),
                    source,
                }),
            }
        } else {
            // the literal must at least be a well-formed address, but the
            // original string is what gets compared
            match s.parse::<IpAddr>() {
                Ok(_) => Ok(Self::Literal(s.to_string())),
                Err(source) => Err(TrustedProxyParseError::Address {
                    input: s.to_string(),
                    source,
                }),
            }
        }
    }
}

/// The trusted proxy setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrustedProxies {
    /// Every peer is assumed to be a legitimate proxy and the first
    /// syntactically valid forwarded header value is always honored.
    Blanket,
    /// An ordered list of trusted entries. Empty means no proxy is trusted
    /// and forwarded headers are never consulted.
    List(Vec<TrustedProxy>),
}

impl Default for TrustedProxies {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl TrustedProxies {
    /// Build the setting from a single entry string.
    ///
    /// A valid literal or CIDR becomes a one-element list; an invalid one
    /// degrades to no trusted proxies.
    pub fn single(entry: &str) -> Self {
        match entry.parse() {
            Ok(proxy) => Self::List(vec![proxy]),
            Err(_) => Self::List(Vec::new()),
        }
    }
}

/// Config for the client address resolver
///
/// By default no proxy is trusted, so resolution reports the peer address
/// untouched, and headers are scanned in the [`DEFAULT_HEADER_PRECEDENCE`]
/// order once proxies are trusted.
///
/// # Example
/// ```
/// use client_ip_resolver::Config;
///
/// let mut config = Config::new();
/// config.add_trusted_proxy("192.168.1.2").unwrap();
/// config.add_trusted_proxy("2001:db8::/32").unwrap();
///
/// assert!(config.is_peer_trusted("192.168.1.2"));
/// assert!(config.is_peer_trusted("2001:db8::abcd"));
/// assert!(!config.is_peer_trusted("10.0.0.1"));
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    trusted_proxies: TrustedProxies,
    header_precedence: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Create a new Config with no trusted proxies and the default header
    /// precedence list
    pub fn new() -> Self {
        Self {
            trusted_proxies: TrustedProxies::default(),
            header_precedence: DEFAULT_HEADER_PRECEDENCE
                .iter()
                .map(|name| (*name).to_string())
                .collect(),
        }
    }

    /// Add a trusted proxy to the list of trusted proxies
    ///
    /// proxy can be an IP address or a CIDR. In blanket-trust mode this
    /// switches back to list mode with the given entry.
    pub fn add_trusted_proxy(&mut self, proxy: &str) -> Result<(), TrustedProxyParseError> {
        let entry = proxy.parse()?;

        match &mut self.trusted_proxies {
            TrustedProxies::List(entries) => entries.push(entry),
            TrustedProxies::Blanket => self.trusted_proxies = TrustedProxies::List(vec![entry]),
        }

        Ok(())
    }

    /// Replace the trusted proxy setting
    pub fn set_trusted_proxies(&mut self, trusted_proxies: TrustedProxies) {
        self.trusted_proxies = trusted_proxies;
    }

    /// Replace the ordered header precedence list
    pub fn set_header_precedence<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.header_precedence = names.into_iter().map(Into::into).collect();
    }

    pub fn trusted_proxies(&self) -> &TrustedProxies {
        &self.trusted_proxies
    }

    pub fn header_precedence(&self) -> &[String] {
        &self.header_precedence
    }

    /// Check if a peer address is trusted given the configured proxies
    ///
    /// The first matching entry wins; blanket trust matches every peer.
    pub fn is_peer_trusted(&self, peer_addr: &str) -> bool {
        match &self.trusted_proxies {
            TrustedProxies::Blanket => true,
            TrustedProxies::List(entries) => {
                for entry in entries {
                    if entry.matches(peer_addr) {
                        return true;
                    }
                }

                false
            }
        }
    }

    pub(crate) fn apply(&mut self, update: ConfigUpdate) {
        if let Some(trusted_proxies) = update.trusted_proxies {
            self.trusted_proxies = trusted_proxies;
        }

        if let Some(header_precedence) = update.header_precedence {
            self.header_precedence = header_precedence;
        }
    }
}

/// A partial configuration update: fields left unset keep their current
/// value.
///
/// # Example
/// ```
/// use client_ip_resolver::{ConfigUpdate, TrustedProxies};
///
/// let update = ConfigUpdate::new()
///     .trusted_proxies(TrustedProxies::single("10.0.0.0/8"))
///     .header_precedence(["x-real-ip", "x-forwarded-for"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigUpdate {
    pub trusted_proxies: Option<TrustedProxies>,
    pub header_precedence: Option<Vec<String>>,
}

impl ConfigUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trusted_proxies(mut self, trusted_proxies: TrustedProxies) -> Self {
        self.trusted_proxies = Some(trusted_proxies);
        self
    }

    pub fn header_precedence<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.header_precedence = Some(names.into_iter().map(Into::into).collect());
        self
    }
}
