//! Endpoint ordering with an IP-family preference.
//!
//! A hostname such as `pads.local` may resolve to several addresses, some
//! IPv4 and some IPv6.  The output client tries them one by one until a
//! session succeeds, so the *order* of the list is the connection priority.
//!
//! | Preference | Result                                              |
//! |------------|-----------------------------------------------------|
//! | `4`        | IPv4 addresses only, in resolver order              |
//! | `6`        | IPv6 addresses only, in resolver order              |
//! | `auto`     | every IPv6 address first, then every IPv4 address   |
//!
//! The actual DNS lookup lives in the output crate; this module only applies
//! the policy to whatever the lookup returned, which keeps it testable without
//! a network.

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;

/// Which address families the client is allowed to connect over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IpPreference {
    /// IPv4 only.
    V4,
    /// IPv6 only.
    V6,
    /// Dual-stack, IPv6 preferred.
    #[default]
    Auto,
}

impl FromStr for IpPreference {
    type Err = ResolveError;

    /// Parses `4`, `v4`, `ipv4`, `6`, `v6`, `ipv6` or `auto` (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "4" | "v4" | "ipv4" => Ok(Self::V4),
            "6" | "v6" | "ipv6" => Ok(Self::V6),
            "auto" => Ok(Self::Auto),
            other => Err(ResolveError::UnknownPreference(other.to_string())),
        }
    }
}

impl fmt::Display for IpPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::V4 => "4",
            Self::V6 => "6",
            Self::Auto => "auto",
        })
    }
}

/// Address family tag carried by every [`Endpoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressFamily {
    V4,
    V6,
}

impl AddressFamily {
    /// Family of a socket address.
    pub fn of(addr: &SocketAddr) -> Self {
        match addr {
            SocketAddr::V4(_) => Self::V4,
            SocketAddr::V6(_) => Self::V6,
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::V4 => "IPv4",
            Self::V6 => "IPv6",
        })
    }
}

/// One connection candidate: a resolved address and its family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub addr: SocketAddr,
    pub family: AddressFamily,
}

impl Endpoint {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            family: AddressFamily::of(&addr),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.family, self.addr)
    }
}

/// Errors produced while turning a host into connection candidates.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The name lookup itself failed (unknown host, DNS unreachable, …).
    #[error("failed to resolve {host}: {source}")]
    Lookup {
        host: String,
        #[source]
        source: std::io::Error,
    },
    /// The lookup succeeded but no address matched the preference.
    #[error("no suitable addresses found for IP version: {preference}")]
    NoAddressFound { preference: IpPreference },
    /// The configured preference string is not one of the recognised values.
    #[error("unknown IP version '{0}' (use 4, 6 or auto)")]
    UnknownPreference(String),
}

/// Filters and orders resolved addresses according to `preference`.
///
/// Resolver order is preserved within each family.
///
/// # Errors
///
/// Returns [`ResolveError::NoAddressFound`] when nothing is left after
/// filtering, including when `addrs` is empty.
pub fn select_endpoints<I>(addrs: I, preference: IpPreference) -> Result<Vec<Endpoint>, ResolveError>
where
    I: IntoIterator<Item = SocketAddr>,
{
    let (v6, v4): (Vec<Endpoint>, Vec<Endpoint>) = addrs
        .into_iter()
        .map(Endpoint::new)
        .partition(|endpoint| endpoint.family == AddressFamily::V6);

    let endpoints = match preference {
        IpPreference::V4 => v4,
        IpPreference::V6 => v6,
        IpPreference::Auto => v6.into_iter().chain(v4).collect(),
    };

    if endpoints.is_empty() {
        return Err(ResolveError::NoAddressFound { preference });
    }
    Ok(endpoints)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
