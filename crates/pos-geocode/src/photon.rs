//! Client for the secondary (Photon-style) geocoding provider.
//!
//! The secondary API takes the store coordinates only as a soft location
//! bias — it has no hard bounding box — and returns `GeoJSON` features with
//! coordinates in `[lon, lat]` order, transposed here during normalization.

use std::time::Duration;

use pos_core::geo::Point;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Deserialize;

use crate::error::GeocodeError;
use crate::types::{AddressParts, GeocodeSuggestion, Source};

const PROVIDER_NAME: &str = "photon";

pub struct PhotonClient {
    client: Client,
    base_url: String,
}

impl PhotonClient {
    /// Creates a client. `base_url` points at the production service normally
    /// and at a mock server in tests.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(base_url: &str, contact: &str, timeout_secs: u64) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("pos-server/0.1 ({contact})"))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Searches with the store point as a soft bias.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] on network failure or timeout, or
    /// [`GeocodeError::Status`] on a non-2xx response.
    pub async fn search(
        &self,
        query: &str,
        bias: Point,
        limit: u32,
    ) -> Result<Vec<GeocodeSuggestion>, GeocodeError> {
        let limit_param = limit.to_string();
        let lat_param = bias.lat.to_string();
        let lon_param = bias.lon.to_string();

        let response = self
            .client
            .get(format!("{}/api", self.base_url))
            .query(&[
                ("q", query),
                ("limit", limit_param.as_str()),
                ("lat", lat_param.as_str()),
                ("lon", lon_param.as_str()),
            ])
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status {
                provider: PROVIDER_NAME,
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        match serde_json::from_str::<PhotonResponse>(&body) {
            Ok(parsed) => Ok(parsed.features.into_iter().map(normalize).collect()),
            Err(e) => {
                tracing::warn!(provider = PROVIDER_NAME, error = %e, "unparseable response; treating as zero results");
                Ok(Vec::new())
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct PhotonResponse {
    #[serde(default)]
    features: Vec<PhotonFeature>,
}

#[derive(Debug, Deserialize)]
struct PhotonFeature {
    #[serde(default)]
    geometry: PhotonGeometry,
    #[serde(default)]
    properties: PhotonProperties,
}

#[derive(Debug, Default, Deserialize)]
struct PhotonGeometry {
    /// GeoJSON coordinate order: `[lon, lat]`.
    #[serde(default)]
    coordinates: Vec<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct PhotonProperties {
    name: Option<String>,
    housenumber: Option<String>,
    street: Option<String>,
    district: Option<String>,
    city: Option<String>,
    state: Option<String>,
    postcode: Option<String>,
}

fn normalize(feature: PhotonFeature) -> GeocodeSuggestion {
    let props = feature.properties;
    let raw = AddressParts {
        house_number: props.housenumber,
        road: props.street,
        suburb: props.district,
        city: props.city,
        state: props.state,
        postcode: props.postcode,
    };

    let label = raw.label();
    let display_name = match props.name {
        Some(name) if !label.is_empty() => format!("{name}, {label}"),
        Some(name) => name,
        None => label.clone(),
    };

    GeocodeSuggestion {
        source: Source::Secondary,
        label,
        // Transpose GeoJSON [lon, lat]; a malformed pair becomes NaN and is
        // dropped during ranking.
        lat: feature.geometry.coordinates.get(1).copied().unwrap_or(f64::NAN),
        lon: feature.geometry.coordinates.first().copied().unwrap_or(f64::NAN),
        display_name,
        raw,
        distance_mi: None,
    }
}
