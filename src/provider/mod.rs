//! Configuration providers backed by SRV lookups.

use crate::{record::ParseError, resolver::SrvResolver, SrvRecord};
use std::{
    collections::{HashMap, HashSet},
    time::Instant,
};
use tokio::runtime::{Builder, Runtime};

mod data;
pub use data::ConfigData;

/// Errors encountered by a [`DnsConfigProvider`].
#[derive(Debug, thiserror::Error)]
pub enum Error<Lookup: std::error::Error + 'static> {
    /// The DNS lookup machinery could not be set up
    #[error("cannot initialize DNS lookup")]
    Initialization(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// A requested name could not be resolved
    #[error("cannot resolve SRV record for {name}")]
    Resolution {
        /// The name that failed
        name: String,
        /// SRV lookup error
        #[source]
        source: Lookup,
    },
    /// SRV record parsing errors
    #[error(transparent)]
    Record(#[from] ParseError),
    /// Releasing the resolver failed
    #[error("cannot close resolver")]
    Teardown(#[source] Lookup),
}

/// The contract a configuration host uses to resolve `${provider:name}`
/// placeholders.
///
/// Hosts call [`configure`] once, then any number of [`get`] and
/// [`get_names`], then [`close`].
///
/// [`configure`]: ConfigProvider::configure
/// [`get`]: ConfigProvider::get
/// [`get_names`]: ConfigProvider::get_names
/// [`close`]: ConfigProvider::close
pub trait ConfigProvider {
    /// Errors produced while fetching or closing.
    type Error: std::error::Error;

    /// Applies provider options.
    fn configure(&mut self, configs: &HashMap<String, String>);

    /// Fetches every value under `path`.
    fn get(&self, path: &str) -> ConfigData;

    /// Fetches the values of `names` under `path`. Either every name is
    /// present in the result or an error is returned.
    fn get_names(&self, path: &str, names: &HashSet<String>) -> Result<ConfigData, Self::Error>;

    /// Releases the provider's resources.
    fn close(self) -> Result<(), Self::Error>
    where
        Self: Sized;
}

/// Configuration provider that turns SRV names into comma-separated
/// `host:port` lists.
///
/// # Usage
///
/// With the `hickory` feature, [`DnsConfigProvider::new`] builds a provider on
/// top of the system's resolver configuration. Any other [`SrvResolver`] can be
/// plugged in with [`DnsConfigProvider::with_resolver`].
///
/// Lookups are driven on a private current-thread runtime and block the
/// calling thread, so the provider must not be used from within an async
/// context. Names are resolved one at a time, in no particular order.
///
/// Records are joined in the order the resolver delivered them; DNS servers
/// commonly rotate that order between queries.
///
/// # Panics
///
/// [`get_names`] and [`close`] block on the provider's runtime, and panic when
/// called from a thread that is already driving a tokio runtime (e.g. inside
/// `#[tokio::main]` or a spawned task). Call them from a plain thread or via
/// `tokio::task::spawn_blocking`.
///
/// [`get_names`]: ConfigProvider::get_names
/// [`close`]: ConfigProvider::close
#[derive(Debug)]
pub struct DnsConfigProvider<Resolver> {
    resolver: Resolver,
    runtime: Runtime,
}

fn runtime() -> std::io::Result<Runtime> {
    Builder::new_current_thread().enable_all().build()
}

#[cfg(feature = "hickory")]
impl DnsConfigProvider<hickory_resolver::TokioResolver> {
    /// Creates a provider that uses the system's DNS configuration.
    pub fn new() -> Result<Self, Error<hickory_resolver::ResolveError>> {
        let runtime = runtime().map_err(|e| Error::Initialization(e.into()))?;
        let resolver = {
            let _guard = runtime.enter();
            crate::resolver::hickory::system_resolver()
                .map_err(|e| Error::Initialization(e.into()))?
        };
        Ok(Self { resolver, runtime })
    }

    /// Creates a provider that queries the name servers in `config`.
    pub fn from_config(
        config: hickory_resolver::config::ResolverConfig,
    ) -> Result<Self, Error<hickory_resolver::ResolveError>> {
        let runtime = runtime().map_err(|e| Error::Initialization(e.into()))?;
        let resolver = {
            let _guard = runtime.enter();
            crate::resolver::hickory::resolver_from_config(config)
        };
        Ok(Self { resolver, runtime })
    }
}

impl<Resolver: SrvResolver> DnsConfigProvider<Resolver> {
    /// Creates a provider that looks up SRV records with `resolver`.
    pub fn with_resolver(resolver: Resolver) -> Result<Self, Error<Resolver::Error>> {
        let runtime = runtime().map_err(|e| Error::Initialization(e.into()))?;
        Ok(Self { resolver, runtime })
    }

    /// Gets the provider's resolver.
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Looks up `name` and joins its endpoints with commas, returning the
    /// value along with the time it is valid until.
    fn resolve(&self, name: &str) -> Result<(String, Instant), Error<Resolver::Error>> {
        let lookup = self
            .runtime
            .block_on(self.resolver.lookup_srv(name))
            .map_err(|source| {
                #[cfg(feature = "log")]
                tracing::debug!(%name, error = %source, "SRV lookup failed");
                Error::Resolution {
                    name: name.to_string(),
                    source,
                }
            })?;

        let endpoints = lookup
            .records
            .iter()
            .map(|raw| {
                #[cfg(feature = "log")]
                tracing::trace!(%name, record = %raw, "parsing SRV record");
                raw.parse::<SrvRecord>().map(|record| record.endpoint())
            })
            .collect::<Result<Vec<_>, _>>()?;

        #[cfg(feature = "log")]
        tracing::debug!(%name, endpoints = endpoints.len(), "resolved SRV name");

        Ok((endpoints.join(","), lookup.valid_until))
    }
}

impl<Resolver: SrvResolver> ConfigProvider for DnsConfigProvider<Resolver> {
    type Error = Error<Resolver::Error>;

    /// No options are recognized; everything passed in is ignored.
    fn configure(&mut self, configs: &HashMap<String, String>) {
        #[cfg(feature = "log")]
        for key in configs.keys() {
            tracing::debug!(%key, "ignoring unknown DNS provider option");
        }
        #[cfg(not(feature = "log"))]
        let _ = configs;
    }

    /// SRV names cannot be enumerated, so this is always empty.
    fn get(&self, _path: &str) -> ConfigData {
        ConfigData::default()
    }

    fn get_names(&self, _path: &str, names: &HashSet<String>) -> Result<ConfigData, Self::Error> {
        let mut resolved = HashMap::with_capacity(names.len());
        let mut earliest: Option<Instant> = None;

        for name in names {
            let (value, valid_until) = self.resolve(name)?;
            earliest = Some(earliest.map_or(valid_until, |e| e.min(valid_until)));
            resolved.insert(name.clone(), value);
        }

        let ttl = earliest.map(|until| until.saturating_duration_since(Instant::now()));
        Ok(ConfigData::new(resolved).with_ttl(ttl))
    }

    fn close(self) -> Result<(), Self::Error> {
        let Self { resolver, runtime } = self;
        runtime.block_on(resolver.close()).map_err(Error::Teardown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::mock::{MockError, MockResolver};
    use std::{sync::atomic::Ordering, time::Duration};

    const KAFKA: &str = "_kafka._tcp.test.example.com";

    fn names(names: &[&str]) -> HashSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn provider(resolver: MockResolver) -> DnsConfigProvider<MockResolver> {
        let mut provider = DnsConfigProvider::with_resolver(resolver).unwrap();
        provider.configure(&HashMap::new());
        provider
    }

    fn kafka() -> MockResolver {
        MockResolver::default().with(
            KAFKA,
            &["10 0 9092 k1.example.com.", "10 0 9092 k2.example.com."],
        )
    }

    #[test]
    fn resolves_a_record_set() {
        let provider = provider(kafka());
        let data = provider.get_names("", &names(&[KAFKA])).unwrap();
        assert_eq!(data.data().keys().collect::<Vec<_>>(), vec![KAFKA]);
        assert!(matches!(
            data.data()[KAFKA].as_str(),
            "k1.example.com:9092,k2.example.com:9092" | "k2.example.com:9092,k1.example.com:9092"
        ));
        provider.close().unwrap();
    }

    #[test]
    fn keeps_delivery_order() {
        let resolver = MockResolver::default().with(
            "_http._tcp.example.com",
            &["2 0 80 b.example.com.", "1 0 81 a.example.com."],
        );
        let data = provider(resolver)
            .get_names("ignored", &names(&["_http._tcp.example.com"]))
            .unwrap();
        assert_eq!(
            data.data()["_http._tcp.example.com"],
            "b.example.com:80,a.example.com:81"
        );
    }

    #[test]
    fn duplicate_records_are_kept() {
        let resolver = MockResolver::default().with("dup", &["1 0 80 a.", "1 0 80 a."]);
        let data = provider(resolver).get_names("", &names(&["dup"])).unwrap();
        assert_eq!(data.data()["dup"], "a:80,a:80");
    }

    #[test]
    fn empty_record_set_is_empty_string() {
        let resolver = MockResolver::default().with("_none._tcp.example.com", &[]);
        let data = provider(resolver)
            .get_names("", &names(&["_none._tcp.example.com"]))
            .unwrap();
        assert_eq!(data.data()["_none._tcp.example.com"], "");
    }

    #[test]
    fn resolves_several_names() {
        let resolver = kafka().with("_zk._tcp.example.com", &["0 0 2181 zk.example.com."]);
        let data = provider(resolver)
            .get_names("", &names(&[KAFKA, "_zk._tcp.example.com"]))
            .unwrap();
        assert_eq!(data.data().len(), 2);
        assert_eq!(data.data()["_zk._tcp.example.com"], "zk.example.com:2181");
    }

    #[test]
    fn missing_name_fails_the_whole_batch() {
        let provider = provider(kafka());
        let err = provider
            .get_names("", &names(&[KAFKA, "missing.example.com"]))
            .unwrap_err();
        assert!(err.to_string().contains("missing.example.com"));
        match err {
            Error::Resolution { name, source } => {
                assert_eq!(name, "missing.example.com");
                assert_eq!(source, MockError::NotFound(name));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_record_fails_the_fetch() {
        let resolver = MockResolver::default().with("bad", &["10 0 9092"]);
        let err = provider(resolver).get_names("", &names(&["bad"])).unwrap_err();
        assert!(matches!(
            err,
            Error::Record(ParseError::Malformed(ref raw)) if raw == "10 0 9092"
        ));
    }

    #[test]
    fn bad_port_fails_the_fetch() {
        let resolver = MockResolver::default().with("bad", &["10 0 port k1.example.com."]);
        let err = provider(resolver).get_names("", &names(&["bad"])).unwrap_err();
        assert!(matches!(
            err,
            Error::Record(ParseError::InvalidNumber { field: "port", .. })
        ));
    }

    #[test]
    fn get_without_names_is_empty() {
        let provider = provider(kafka());
        for path in ["", "/", KAFKA] {
            assert_eq!(provider.get(path), ConfigData::default());
        }
    }

    #[test]
    fn no_names_yields_no_ttl() {
        let data = provider(kafka()).get_names("", &HashSet::new()).unwrap();
        assert!(data.data().is_empty());
        assert_eq!(data.ttl(), None);
    }

    #[test]
    fn ttl_is_bounded_by_record_expiry() {
        let provider = provider(kafka().ttl(Duration::from_secs(30)));
        let data = provider.get_names("", &names(&[KAFKA])).unwrap();
        let ttl = data.ttl().unwrap();
        assert!(ttl <= Duration::from_secs(30));
        assert!(ttl > Duration::from_secs(20));
    }

    #[test]
    fn configure_accepts_anything() {
        let mut provider = provider(kafka());
        provider.configure(&HashMap::from([
            ("timeout".to_string(), "5".to_string()),
            (String::new(), String::new()),
        ]));
        assert!(provider.get_names("", &names(&[KAFKA])).is_ok());
    }

    #[test]
    fn close_releases_resolver() {
        let provider = provider(kafka());
        let closed = provider.resolver().closed();
        assert!(!closed.load(Ordering::SeqCst));
        provider.close().unwrap();
        assert!(closed.load(Ordering::SeqCst));
    }

    #[test]
    fn failing_close_is_teardown_error() {
        let provider = provider(kafka().failing_close());
        let err = provider.close().unwrap_err();
        assert!(matches!(err, Error::Teardown(MockError::Close)));
        assert_eq!(err.to_string(), "cannot close resolver");
    }

    #[cfg(feature = "hickory")]
    #[test]
    fn hickory_provider_reports_failed_name() {
        let provider =
            DnsConfigProvider::from_config(hickory_resolver::config::ResolverConfig::new())
                .unwrap();
        let err = provider
            .get_names("", &names(&["missing.example.com"]))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot resolve SRV record for missing.example.com"
        );
        provider.close().unwrap();
    }
}
