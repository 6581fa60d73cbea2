//! DNS resolution with IP-family preference.

use async_trait::async_trait;
use padcast_core::{select_endpoints, Endpoint, IpPreference, ResolveError};
use tokio::net::lookup_host;
use tracing::debug;

use crate::application::reconnect::EndpointResolver;

/// Resolves through the operating system's resolver.  Nothing is cached:
/// every pass of the supervisor performs a fresh lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

#[async_trait]
impl EndpointResolver for SystemResolver {
    async fn resolve(
        &self,
        host: &str,
        port: u16,
        preference: IpPreference,
    ) -> Result<Vec<Endpoint>, ResolveError> {
        let addrs = lookup_host((host, port))
            .await
            .map_err(|source| ResolveError::Lookup {
                host: host.to_string(),
                source,
            })?;

        let endpoints = select_endpoints(addrs, preference)?;
        for endpoint in &endpoints {
            debug!("{host} -> {endpoint}");
        }
        Ok(endpoints)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use padcast_core::AddressFamily;

    #[tokio::test]
    async fn test_ipv4_literal_resolves_to_itself() {
        // Arrange / Act
        let endpoints = SystemResolver
            .resolve("127.0.0.1", 8000, IpPreference::Auto)
            .await
            .unwrap();

        // Assert
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].addr, "127.0.0.1:8000".parse().unwrap());
        assert_eq!(endpoints[0].family, AddressFamily::V4);
    }

    #[tokio::test]
    async fn test_ipv4_literal_with_v6_preference_is_no_address_found() {
        let result = SystemResolver.resolve("127.0.0.1", 8000, IpPreference::V6).await;

        assert!(matches!(
            result,
            Err(ResolveError::NoAddressFound { preference: IpPreference::V6 })
        ));
    }

    #[tokio::test]
    async fn test_ipv6_literal_with_auto_preference_is_ipv6() {
        let endpoints = SystemResolver.resolve("::1", 8000, IpPreference::Auto).await.unwrap();

        assert_eq!(endpoints[0].family, AddressFamily::V6);
    }
}
