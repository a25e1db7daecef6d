use std::net::SocketAddr;

use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Contact address sent to the geocoding providers in the `User-Agent`
    /// header, as their usage policies require.
    pub geocode_contact: String,
    pub geocode_timeout_secs: u64,
    pub nominatim_url: String,
    pub photon_url: String,
    /// Sales tax rate applied when an order's totals are computed.
    pub tax_rate: Decimal,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("geocode_contact", &self.geocode_contact)
            .field("geocode_timeout_secs", &self.geocode_timeout_secs)
            .field("nominatim_url", &self.nominatim_url)
            .field("photon_url", &self.photon_url)
            .field("tax_rate", &self.tax_rate)
            .finish()
    }
}
