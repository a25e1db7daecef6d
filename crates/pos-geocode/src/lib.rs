//! Address-suggestion lookups for the order entry screen.
//!
//! Two external geocoding services sit behind one [`GeocodeService`]: a
//! strict, bounding-box-capable primary and a permissive secondary used only
//! when the primary fails. Provider responses are normalized into one
//! canonical [`GeocodeSuggestion`] shape at the network boundary, so nothing
//! downstream ever branches on which provider answered. Results are
//! distance-filtered around the store, sorted nearest-first, capped, and
//! memoized for a few minutes.

mod error;
mod nominatim;
mod photon;
mod search;
mod types;

pub use error::GeocodeError;
pub use nominatim::NominatimClient;
pub use photon::PhotonClient;
pub use search::{GeocodeConfig, GeocodeService, Provider};
pub use types::{AddressParts, GeocodeSuggestion, Source};
