//! Domain layer: pure policy types with no I/O.
//!
//! - **`endpoint`** – IP-family preference and the ordering of resolved
//!   addresses into connection candidates.

pub mod endpoint;

pub use endpoint::{select_endpoints, AddressFamily, Endpoint, IpPreference, ResolveError};
