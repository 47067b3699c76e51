//! SRV records.

use std::{fmt, num::ParseIntError, str::FromStr};

/// Errors produced while parsing the text form of a SRV record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The record had fewer than four whitespace-separated fields.
    #[error("malformed SRV record: '{0}'")]
    Malformed(String),
    /// A numeric field could not be parsed.
    #[error("invalid {field} in SRV record '{record}': {source}")]
    InvalidNumber {
        /// Name of the offending field
        field: &'static str,
        /// The raw record text
        record: String,
        /// Underlying integer parse error
        source: ParseIntError,
    },
}

/// A single SRV record parsed from its presentation text,
/// `priority weight port target`.
///
/// Only the port is interpreted as a number. Priority and weight play no part
/// in the endpoint and are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrvRecord {
    priority: String,
    weight: String,
    port: u16,
    target: String,
}

impl SrvRecord {
    /// Gets a SRV record's priority as it appeared in the record.
    pub fn priority(&self) -> &str {
        &self.priority
    }

    /// Gets a SRV record's weight as it appeared in the record.
    pub fn weight(&self) -> &str {
        &self.weight
    }

    /// Gets a SRV record's port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Gets a SRV record's target exactly as it appeared in the record.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Gets the target with the DNS root terminator, if any, removed.
    pub fn host(&self) -> &str {
        self.target.strip_suffix('.').unwrap_or(&self.target)
    }

    /// Formats the record as a `host:port` endpoint.
    pub fn endpoint(&self) -> String {
        self.to_string()
    }
}

impl FromStr for SrvRecord {
    type Err = ParseError;

    fn from_str(record: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = record.split_whitespace().collect();
        let [priority, weight, port, target, ..] = fields[..] else {
            return Err(ParseError::Malformed(record.to_string()));
        };

        let port = port
            .parse::<u16>()
            .map_err(|source| ParseError::InvalidNumber {
                field: "port",
                record: record.to_string(),
                source,
            })?;

        Ok(Self {
            priority: priority.to_string(),
            weight: weight.to_string(),
            port,
            target: target.to_string(),
        })
    }
}

impl fmt::Display for SrvRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host(), self.port)
    }
}

/// Parses one raw SRV record and formats it as a `host:port` endpoint.
pub fn parse_endpoint(record: &str) -> Result<String, ParseError> {
    record.parse::<SrvRecord>().map(|r| r.endpoint())
}
