use std::{collections::HashMap, time::Duration};

/// Configuration values produced by a [`ConfigProvider`], along with how long
/// the host may keep them before asking again.
///
/// [`ConfigProvider`]: super::ConfigProvider
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigData {
    data: HashMap<String, String>,
    ttl: Option<Duration>,
}

impl ConfigData {
    /// Creates config data without a time-to-live.
    pub fn new(data: HashMap<String, String>) -> Self {
        Self { data, ttl: None }
    }

    /// Sets the time-to-live of the data.
    pub fn with_ttl(self, ttl: Option<Duration>) -> Self {
        Self { ttl, ..self }
    }

    /// Gets the name to value mapping.
    pub fn data(&self) -> &HashMap<String, String> {
        &self.data
    }

    /// Consumes the config data, returning the name to value mapping.
    pub fn into_data(self) -> HashMap<String, String> {
        self.data
    }

    /// Gets how long the values may be used before they should be fetched again.
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }
}

impl From<HashMap<String, String>> for ConfigData {
    fn from(data: HashMap<String, String>) -> Self {
        Self::new(data)
    }
}
