//! Client for the primary (Nominatim-style) geocoding provider.

use std::time::Duration;

use pos_core::geo::BoundingBox;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Deserialize;

use crate::error::GeocodeError;
use crate::types::{AddressParts, GeocodeSuggestion, Source};

const PROVIDER_NAME: &str = "nominatim";

/// Client for the primary provider. Carries the identifying `User-Agent`
/// (with a contact address) that the public Nominatim usage policy requires.
pub struct NominatimClient {
    client: Client,
    base_url: String,
}

impl NominatimClient {
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

    /// Searches within `viewbox`, hard-bounded, US-only, with address details.
    ///
    /// A response body that is not the expected JSON is treated as zero
    /// results rather than a failure; a non-success status is a failure and
    /// sends the caller to the next provider in the chain.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] on network failure or timeout, or
    /// [`GeocodeError::Status`] on a non-2xx response.
    pub async fn search(
        &self,
        query: &str,
        viewbox: BoundingBox,
        limit: u32,
    ) -> Result<Vec<GeocodeSuggestion>, GeocodeError> {
        let viewbox_param = format!(
            "{:.4},{:.4},{:.4},{:.4}",
            viewbox.west, viewbox.north, viewbox.east, viewbox.south
        );
        let limit_param = limit.to_string();

        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("q", query),
                ("format", "jsonv2"),
                ("addressdetails", "1"),
                ("limit", limit_param.as_str()),
                ("viewbox", viewbox_param.as_str()),
                ("bounded", "1"),
                ("countrycodes", "us"),
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
        match serde_json::from_str::<Vec<NominatimPlace>>(&body) {
            Ok(places) => Ok(places.into_iter().map(normalize).collect()),
            Err(e) => {
                tracing::warn!(provider = PROVIDER_NAME, error = %e, "unparseable response; treating as zero results");
                Ok(Vec::new())
            }
        }
    }
}

/// One item of the provider's `jsonv2` search response. Coordinates arrive as
/// strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    address: NominatimAddress,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    house_number: Option<String>,
    road: Option<String>,
    pedestrian: Option<String>,
    neighbourhood: Option<String>,
    suburb: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    state: Option<String>,
    postcode: Option<String>,
}

fn normalize(place: NominatimPlace) -> GeocodeSuggestion {
    let address = place.address;
    let raw = AddressParts {
        house_number: address.house_number,
        road: address.road.or(address.pedestrian),
        suburb: address.neighbourhood.or(address.suburb),
        city: address.city.or(address.town).or(address.village),
        state: address.state,
        postcode: address.postcode,
    };

    GeocodeSuggestion {
        source: Source::Primary,
        label: raw.label(),
        // Unparseable coordinates become NaN and are dropped during ranking.
        lat: place.lat.parse().unwrap_or(f64::NAN),
        lon: place.lon.parse().unwrap_or(f64::NAN),
        display_name: place.display_name,
        raw,
        distance_mi: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(json: serde_json::Value) -> NominatimPlace {
        serde_json::from_value(json).expect("place should parse")
    }

    #[test]
    fn normalize_builds_label_from_address_parts() {
        let suggestion = normalize(place(serde_json::json!({
            "lat": "39.9690",
            "lon": "-75.1337",
            "display_name": "100, East Girard Avenue, Fishtown, Philadelphia, PA 19125, USA",
            "address": {
                "house_number": "100",
                "road": "East Girard Avenue",
                "neighbourhood": "Fishtown",
                "city": "Philadelphia",
                "state": "PA",
                "postcode": "19125"
            }
        })));

        assert_eq!(suggestion.source, Source::Primary);
        assert_eq!(
            suggestion.label,
            "100, East Girard Avenue, Fishtown, Philadelphia, PA, 19125"
        );
        assert!((suggestion.lat - 39.9690).abs() < 1e-9);
        assert!((suggestion.lon - -75.1337).abs() < 1e-9);
    }

    #[test]
    fn normalize_falls_back_through_locality_aliases() {
        let suggestion = normalize(place(serde_json::json!({
            "lat": "40.0",
            "lon": "-75.0",
            "address": {
                "pedestrian": "Mall Walk",
                "town": "Cheltenham"
            }
        })));

        assert_eq!(suggestion.raw.road.as_deref(), Some("Mall Walk"));
        assert_eq!(suggestion.raw.city.as_deref(), Some("Cheltenham"));
        assert_eq!(suggestion.label, "Mall Walk, Cheltenham");
    }

    #[test]
    fn normalize_turns_bad_coordinates_into_nan() {
        let suggestion = normalize(place(serde_json::json!({
            "lat": "not-a-number",
            "lon": "-75.0"
        })));
        assert!(suggestion.lat.is_nan());
    }
}
