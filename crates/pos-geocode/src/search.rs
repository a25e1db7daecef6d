//! The geocode aggregator: provider chain, distance ranking, result cache.

use std::time::Duration;

use pos_core::cache::TtlCache;
use pos_core::geo::{haversine_miles, BoundingBox, Point};

use crate::error::GeocodeError;
use crate::nominatim::NominatimClient;
use crate::photon::PhotonClient;
use crate::types::GeocodeSuggestion;

/// Tuning knobs for the aggregator. Defaults match the store's service area:
/// the bounding box biases the primary provider to roughly 3.5 mi
/// north/south and 4 mi east/west of the store.
#[derive(Debug, Clone, Copy)]
pub struct GeocodeConfig {
    pub max_results: usize,
    /// Suggestions farther than this are dropped — unless dropping them would
    /// empty an otherwise non-empty candidate set. `None` disables the filter.
    pub max_radius_miles: Option<f64>,
    pub provider_limit: u32,
    pub bbox_lat_delta: f64,
    pub bbox_lon_delta: f64,
    pub cache_ttl: Duration,
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self {
            max_results: 6,
            max_radius_miles: Some(6.0),
            provider_limit: 10,
            bbox_lat_delta: 0.05,
            bbox_lon_delta: 0.07,
            cache_ttl: Duration::from_secs(600),
        }
    }
}

/// One tier of the fallback chain. Adding a third provider means adding a
/// variant and pushing it onto the list — the chain logic stays untouched.
pub enum Provider {
    Nominatim(NominatimClient),
    Photon(PhotonClient),
}

impl Provider {
    fn name(&self) -> &'static str {
        match self {
            Provider::Nominatim(_) => "nominatim",
            Provider::Photon(_) => "photon",
        }
    }

    async fn search(
        &self,
        query: &str,
        store: Point,
        config: &GeocodeConfig,
    ) -> Result<Vec<GeocodeSuggestion>, GeocodeError> {
        match self {
            Provider::Nominatim(client) => {
                let viewbox =
                    BoundingBox::around(store, config.bbox_lat_delta, config.bbox_lon_delta);
                client.search(query, viewbox, config.provider_limit).await
            }
            Provider::Photon(client) => client.search(query, store, config.provider_limit).await,
        }
    }
}

/// Aggregates the provider chain behind a TTL'd result cache.
pub struct GeocodeService {
    providers: Vec<Provider>,
    cache: TtlCache<Vec<GeocodeSuggestion>>,
    config: GeocodeConfig,
}

impl GeocodeService {
    #[must_use]
    pub fn new(providers: Vec<Provider>, config: GeocodeConfig) -> Self {
        Self {
            providers,
            cache: TtlCache::new(config.cache_ttl),
            config,
        }
    }

    /// Builds the production chain (primary Nominatim, secondary Photon) from
    /// application config.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if an HTTP client cannot be constructed.
    pub fn from_app_config(config: &pos_core::AppConfig) -> Result<Self, GeocodeError> {
        let providers = vec![
            Provider::Nominatim(NominatimClient::new(
                &config.nominatim_url,
                &config.geocode_contact,
                config.geocode_timeout_secs,
            )?),
            Provider::Photon(PhotonClient::new(
                &config.photon_url,
                &config.geocode_contact,
                config.geocode_timeout_secs,
            )?),
        ];
        Ok(Self::new(providers, GeocodeConfig::default()))
    }

    /// Returns up to `max_results` suggestions for `query`, nearest to
    /// `store` first.
    ///
    /// A blank query returns an empty list without touching the network or
    /// the cache. Identical `(query, store)` pairs within the cache TTL are
    /// served from memory.
    ///
    /// # Errors
    ///
    /// Returns the last provider's error when every provider in the chain
    /// fails — the only fatal case.
    pub async fn search(
        &self,
        query: &str,
        store: Point,
    ) -> Result<Vec<GeocodeSuggestion>, GeocodeError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let key = cache_key(query, store);
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }

        let candidates = self.query_chain(query, store).await?;
        let ranked = rank_suggestions(candidates, store, &self.config);
        self.cache.set(&key, ranked.clone());
        Ok(ranked)
    }

    async fn query_chain(
        &self,
        query: &str,
        store: Point,
    ) -> Result<Vec<GeocodeSuggestion>, GeocodeError> {
        let mut last_error = GeocodeError::NoProviders;
        for provider in &self.providers {
            match provider.search(query, store, &self.config).await {
                Ok(items) => return Ok(items),
                Err(e) => {
                    tracing::warn!(
                        provider = provider.name(),
                        error = %e,
                        "geocoding provider failed; trying next in chain"
                    );
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }
}

fn cache_key(query: &str, store: Point) -> String {
    format!("{}|{}|{}", query.to_lowercase(), store.lat, store.lon)
}

/// Drops candidates without usable coordinates, stamps rounded distances,
/// applies the radius filter, sorts nearest-first, and caps the list.
///
/// When the radius filter would turn a non-empty candidate set into an empty
/// answer, it is relaxed: the closest available suggestions beat "nothing
/// found" for addresses just outside the delivery area.
fn rank_suggestions(
    candidates: Vec<GeocodeSuggestion>,
    store: Point,
    config: &GeocodeConfig,
) -> Vec<GeocodeSuggestion> {
    let mut measured: Vec<GeocodeSuggestion> = candidates
        .into_iter()
        .filter(|s| Point::new(s.lat, s.lon).is_valid())
        .map(|mut s| {
            let miles = haversine_miles(store, Point::new(s.lat, s.lon));
            s.distance_mi = Some((miles * 100.0).round() / 100.0);
            s
        })
        .collect();

    if let Some(radius) = config.max_radius_miles {
        let within: Vec<GeocodeSuggestion> = measured
            .iter()
            .filter(|s| s.distance_mi.unwrap_or(f64::MAX) <= radius)
            .cloned()
            .collect();
        if !within.is_empty() || measured.is_empty() {
            measured = within;
        }
    }

    measured.sort_by(|a, b| {
        a.distance_mi
            .unwrap_or(f64::MAX)
            .total_cmp(&b.distance_mi.unwrap_or(f64::MAX))
    });
    measured.truncate(config.max_results);
    measured
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AddressParts, Source};

    fn store() -> Point {
        Point::new(39.9973, -75.1251)
    }

    fn suggestion(lat: f64, lon: f64) -> GeocodeSuggestion {
        GeocodeSuggestion {
            source: Source::Primary,
            label: String::new(),
            lat,
            lon,
            display_name: String::new(),
            raw: AddressParts::default(),
            distance_mi: None,
        }
    }

    #[test]
    fn rank_sorts_nearest_first_and_rounds() {
        let ranked = rank_suggestions(
            vec![suggestion(40.02, -75.13), suggestion(39.9980, -75.1255)],
            store(),
            &GeocodeConfig::default(),
        );
        assert_eq!(ranked.len(), 2);
        let d0 = ranked[0].distance_mi.unwrap();
        let d1 = ranked[1].distance_mi.unwrap();
        assert!(d0 <= d1, "must be sorted ascending: {d0} vs {d1}");
        // Two-decimal rounding.
        assert!((d0 * 100.0).fract().abs() < 1e-9);
    }

    #[test]
    fn rank_drops_suggestions_outside_radius() {
        let ranked = rank_suggestions(
            vec![suggestion(40.0, -75.12), suggestion(40.5, -75.0)],
            store(),
            &GeocodeConfig::default(),
        );
        assert_eq!(ranked.len(), 1, "the ~35 mi item must be filtered out");
        assert!(ranked[0].distance_mi.unwrap() < 1.0);
    }

    #[test]
    fn rank_relaxes_radius_when_everything_is_far() {
        let ranked = rank_suggestions(
            vec![suggestion(40.5, -75.0), suggestion(41.0, -75.0)],
            store(),
            &GeocodeConfig::default(),
        );
        assert_eq!(
            ranked.len(),
            2,
            "closest-available fallback must kick in when the radius empties the set"
        );
        assert!(ranked[0].distance_mi.unwrap() < ranked[1].distance_mi.unwrap());
    }

    #[test]
    fn rank_drops_invalid_coordinates() {
        let ranked = rank_suggestions(
            vec![suggestion(f64::NAN, -75.0), suggestion(40.0, -75.12)],
            store(),
            &GeocodeConfig::default(),
        );
        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn rank_caps_at_max_results() {
        let candidates = (0..10)
            .map(|i| suggestion(39.9973 + f64::from(i) * 0.001, -75.1251))
            .collect();
        let ranked = rank_suggestions(candidates, store(), &GeocodeConfig::default());
        assert_eq!(ranked.len(), 6);
    }

    #[test]
    fn rank_returns_empty_for_no_valid_candidates() {
        let ranked = rank_suggestions(
            vec![suggestion(f64::NAN, f64::NAN)],
            store(),
            &GeocodeConfig::default(),
        );
        assert!(ranked.is_empty());
    }

    #[test]
    fn cache_key_lowercases_query_and_pins_store() {
        assert_eq!(
            cache_key("123 Main St", store()),
            "123 main st|39.9973|-75.1251"
        );
    }

    #[tokio::test]
    async fn blank_query_short_circuits_without_providers() {
        let service = GeocodeService::new(Vec::new(), GeocodeConfig::default());
        let result = service.search("   ", store()).await.expect("blank query");
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn cache_hit_skips_the_provider_chain() {
        // No providers configured: any chain traversal would error, so a
        // successful lookup proves the cache answered.
        let service = GeocodeService::new(Vec::new(), GeocodeConfig::default());
        let seeded = vec![suggestion(40.0, -75.12)];
        service
            .cache
            .set(&cache_key("123 main st", store()), seeded.clone());

        let result = service
            .search("123 Main St", store())
            .await
            .expect("cache hit");
        assert_eq!(result, seeded);

        let miss = service.search("somewhere else", store()).await;
        assert!(matches!(miss, Err(GeocodeError::NoProviders)));
    }
}
