//! SRV resolvers.

use async_trait::async_trait;
use std::time::Instant;

#[cfg(feature = "hickory")]
pub mod hickory;

/// Raw SRV records found for a name, in the order the DNS layer delivered
/// them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrvLookup {
    /// Records in presentation form, `priority weight port target.`
    pub records: Vec<String>,
    /// When the record set expires.
    pub valid_until: Instant,
}

/// Represents the ability to act as a SRV resolver.
#[async_trait]
pub trait SrvResolver: Send + Sync {
    /// Errors encountered during SRV resolution.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Gets the SRV records for `name` without sorting or deduplicating them.
    async fn lookup_srv(&self, name: &str) -> Result<SrvLookup, Self::Error>;

    /// Releases whatever the resolver holds. Called once, when the owning
    /// provider is closed.
    async fn close(&self) -> Result<(), Self::Error> {
        Ok(())
    }
}
