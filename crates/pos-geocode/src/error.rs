use thiserror::Error;

/// Errors surfaced by the geocoding clients and the provider chain.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// Network, TLS, or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A provider answered with a non-success status.
    #[error("{provider} returned HTTP {status}")]
    Status { provider: &'static str, status: u16 },

    /// The service was constructed with an empty provider chain.
    #[error("no geocoding providers configured")]
    NoProviders,
}
