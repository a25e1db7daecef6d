//! Cached provider of the restaurant's own location.
//!
//! The store row is the reference point for every geocode lookup, so this
//! path must never hard-fail: a storage error degrades to a logged warning
//! and the hard-coded default location. The cache is a performance shim over
//! the row, never a second source of truth — writes go through the normal
//! store-settings update and simply age out of here within the TTL.

use std::time::Duration;

use pos_core::cache::TtlCache;
use pos_core::geo::Point;
use serde::Serialize;
use sqlx::PgPool;

/// Fallback coordinates, matching the migration seed.
const DEFAULT_LAT: f64 = 39.9973;
const DEFAULT_LON: f64 = -75.1251;

const CACHE_KEY: &str = "store";
const CACHE_TTL: Duration = Duration::from_secs(300);

/// The store's address and coordinates as the geocode pipeline consumes them.
#[derive(Debug, Clone, Serialize)]
pub struct StoreLocation {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub lat: f64,
    pub lon: f64,
}

impl StoreLocation {
    fn fallback() -> Self {
        Self {
            name: "Store".to_string(),
            address: String::new(),
            city: String::new(),
            state: String::new(),
            zip: String::new(),
            lat: DEFAULT_LAT,
            lon: DEFAULT_LON,
        }
    }

    #[must_use]
    pub fn point(&self) -> Point {
        Point::new(self.lat, self.lon)
    }
}

impl From<pos_db::StoreSettingsRow> for StoreLocation {
    fn from(row: pos_db::StoreSettingsRow) -> Self {
        Self {
            name: row.name,
            address: row.address,
            city: row.city,
            state: row.state,
            zip: row.zip,
            lat: row.lat,
            lon: row.lon,
        }
    }
}

pub struct StoreLocator {
    pool: PgPool,
    cache: TtlCache<StoreLocation>,
}

impl StoreLocator {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            cache: TtlCache::new(CACHE_TTL),
        }
    }

    /// Returns the store location, from cache when fresh.
    ///
    /// Non-finite coordinates in storage are coerced to the defaults; a
    /// storage error yields (and caches) the default location outright.
    pub async fn get(&self) -> StoreLocation {
        if let Some(cached) = self.cache.get(CACHE_KEY) {
            return cached;
        }

        let location = match pos_db::get_store_settings(&self.pool).await {
            Ok(row) => {
                let mut location = StoreLocation::from(row);
                if !location.point().is_valid() {
                    location.lat = DEFAULT_LAT;
                    location.lon = DEFAULT_LON;
                }
                location
            }
            Err(e) => {
                tracing::warn!(error = %e, "store settings unavailable; using default location");
                StoreLocation::fallback()
            }
        };

        self.cache.set(CACHE_KEY, location.clone());
        location
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test(migrations = "../../migrations")]
    async fn returns_seeded_row(pool: PgPool) {
        let locator = StoreLocator::new(pool);
        let location = locator.get().await;
        assert!((location.lat - DEFAULT_LAT).abs() < 1e-9);
        assert!((location.lon - DEFAULT_LON).abs() < 1e-9);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn serves_cached_value_within_ttl(pool: PgPool) {
        let locator = StoreLocator::new(pool.clone());
        let first = locator.get().await;

        // Change the row underneath the cache; the shim keeps answering with
        // the cached copy until the TTL lapses.
        sqlx::query("UPDATE store_settings SET lat = 41.0, lon = -74.0 WHERE id = 1")
            .execute(&pool)
            .await
            .expect("update");

        let second = locator.get().await;
        assert!((second.lat - first.lat).abs() < 1e-9);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn coerces_non_finite_coordinates_to_default(pool: PgPool) {
        sqlx::query("UPDATE store_settings SET lat = 'NaN'::float8 WHERE id = 1")
            .execute(&pool)
            .await
            .expect("update");

        let locator = StoreLocator::new(pool);
        let location = locator.get().await;
        assert!((location.lat - DEFAULT_LAT).abs() < 1e-9);
        assert!((location.lon - DEFAULT_LON).abs() < 1e-9);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn storage_failure_degrades_to_default(pool: PgPool) {
        let locator = StoreLocator::new(pool.clone());
        pool.close().await;

        let location = locator.get().await;
        assert_eq!(location.name, "Store");
        assert!((location.lat - DEFAULT_LAT).abs() < 1e-9);
    }
}
