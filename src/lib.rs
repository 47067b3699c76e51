#![deny(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]

/*!
Configuration provider that resolves services located by DNS SRV records.

# Introduction

SRV Records, as defined in [RFC 2782](https://tools.ietf.org/html/rfc2782),
are DNS records of the form

`_Service._Proto.Name TTL Class SRV Priority Weight Port Target`

For instance, a DNS server might respond with the following SRV records for
`_kafka._tcp.cluster1.example.com`:

```text
_kafka._tcp.cluster1.example.com. 60 IN SRV 10 0 9092 k1.example.com.
_kafka._tcp.cluster1.example.com. 60 IN SRV 10 0 9092 k2.example.com.
```

A configuration host that supports providers can then replace a placeholder
such as `${dns:_kafka._tcp.cluster1.example.com}` with the connection string
`k1.example.com:9092,k2.example.com:9092`.

[`DnsConfigProvider`] implements the host-facing [`ConfigProvider`] contract.
[`DnsConfigProvider::get_names`] looks up every requested name, turns each
record into a `host:port` endpoint and joins the endpoints of a name with
commas. Records are kept in the order DNS delivered them, which may change
from one query to the next. If any name cannot be resolved the whole call
fails; no partial result is returned.

# Alternative Resolvers

The resolver used for lookups can be changed by implementing the
[`SrvResolver`] trait. The provided backend is enabled by the following
feature:

- `hickory` (via [`hickory_resolver::Resolver`])

[`SrvResolver`]: resolver::SrvResolver
[`DnsConfigProvider::get_names`]: provider::ConfigProvider::get_names
*/

pub mod provider;
pub use provider::{ConfigData, ConfigProvider, DnsConfigProvider, Error};

mod record;
pub use record::{parse_endpoint, ParseError, SrvRecord};

pub mod resolver;
