//! SRV resolver backed by [`hickory_resolver`].

use super::{SrvLookup, SrvResolver};
use async_trait::async_trait;
use hickory_resolver::{
    config::ResolverConfig,
    name_server::{ConnectionProvider, TokioConnectionProvider},
    proto::{op::ResponseCode, rr::rdata::SRV, ProtoErrorKind},
    ResolveError, Resolver, TokioResolver,
};
use std::time::{Duration, Instant};

#[async_trait]
impl<P> SrvResolver for Resolver<P>
where
    P: ConnectionProvider,
{
    type Error = ResolveError;

    async fn lookup_srv(&self, name: &str) -> Result<SrvLookup, Self::Error> {
        let lookup = match self.srv_lookup(name).await {
            Ok(lookup) => lookup,
            Err(e) => {
                let Some(negative_ttl) = no_data_ttl(&e) else {
                    return Err(e);
                };
                #[cfg(feature = "log")]
                tracing::debug!(%name, "name exists but has no SRV records");
                return Ok(SrvLookup {
                    records: Vec::new(),
                    valid_until: Instant::now() + negative_ttl,
                });
            }
        };

        let valid_until = lookup.as_lookup().valid_until();
        Ok(SrvLookup {
            records: lookup.iter().map(presentation).collect(),
            valid_until,
        })
    }
}

/// Negative TTL of a NODATA answer: the name exists, but holds no SRV records.
/// NXDOMAIN and every other failure yield `None`.
fn no_data_ttl(error: &ResolveError) -> Option<Duration> {
    match error.proto()?.kind() {
        ProtoErrorKind::NoRecordsFound {
            response_code: ResponseCode::NoError,
            negative_ttl,
            ..
        } => Some(Duration::from_secs(u64::from(negative_ttl.unwrap_or(0)))),
        _ => None,
    }
}

/// Renders SRV rdata in its zone-file form, `priority weight port target.`
fn presentation(srv: &SRV) -> String {
    format!(
        "{} {} {} {}",
        srv.priority(),
        srv.weight(),
        srv.port(),
        srv.target()
    )
}

/// Builds a resolver from the system configuration (e.g. `resolv.conf`).
///
/// The resolver's own record cache is disabled so every fetch goes to DNS.
pub fn system_resolver() -> Result<TokioResolver, ResolveError> {
    let mut builder = TokioResolver::builder_tokio()?;
    builder.options_mut().cache_size = 0;
    Ok(builder.build())
}

/// Builds a resolver that queries the name servers in `config`, with caching
/// disabled.
pub fn resolver_from_config(config: ResolverConfig) -> TokioResolver {
    let mut builder = Resolver::builder_with_config(config, TokioConnectionProvider::default());
    builder.options_mut().cache_size = 0;
    builder.build()
}
