use serde::{Deserialize, Serialize};

/// Which tier of the provider chain produced a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Primary,
    Secondary,
}

/// Structured address components kept from the provider response and echoed
/// to the UI under `raw`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressParts {
    pub house_number: Option<String>,
    pub road: Option<String>,
    pub suburb: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
}

impl AddressParts {
    /// Human label: the non-empty components joined with `", "`, in
    /// house-number → road → suburb → city → state → postcode order.
    #[must_use]
    pub fn label(&self) -> String {
        [
            &self.house_number,
            &self.road,
            &self.suburb,
            &self.city,
            &self.state,
            &self.postcode,
        ]
        .iter()
        .filter_map(|part| part.as_deref())
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }
}

/// One normalized address suggestion. Constructed per provider response item,
/// discarded after the HTTP response is sent (except the cached copy).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeSuggestion {
    pub source: Source,
    pub label: String,
    pub lat: f64,
    pub lon: f64,
    pub display_name: String,
    pub raw: AddressParts,
    /// Distance from the store, rounded to two decimals. Populated by the
    /// aggregator; `None` only before ranking.
    pub distance_mi: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_joins_non_empty_parts_in_order() {
        let parts = AddressParts {
            house_number: Some("100".to_string()),
            road: Some("E Girard Ave".to_string()),
            suburb: None,
            city: Some("Philadelphia".to_string()),
            state: Some("PA".to_string()),
            postcode: Some("19125".to_string()),
        };
        assert_eq!(parts.label(), "100, E Girard Ave, Philadelphia, PA, 19125");
    }

    #[test]
    fn label_skips_blank_parts() {
        let parts = AddressParts {
            house_number: None,
            road: Some("  ".to_string()),
            suburb: Some("Fishtown".to_string()),
            city: Some("Philadelphia".to_string()),
            state: None,
            postcode: None,
        };
        assert_eq!(parts.label(), "Fishtown, Philadelphia");
    }

    #[test]
    fn source_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Source::Primary).unwrap(),
            "\"primary\""
        );
        assert_eq!(
            serde_json::to_string(&Source::Secondary).unwrap(),
            "\"secondary\""
        );
    }
}
