use crate::models::GeoPoint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Place category requested from the place-search provider
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PlaceType {
    Locality,
    Lodging,
}

impl PlaceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceType::Locality => "locality",
            PlaceType::Lodging => "lodging",
        }
    }
}

impl fmt::Display for PlaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One place-search hit, normalized from the provider payload.
/// This is also the shape stored in the geocoding cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaceResult {
    pub name: String,
    pub location: GeoPoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_ratings_total: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vicinity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_status: Option<String>,
}

impl PlaceResult {
    pub fn new(name: impl Into<String>, location: GeoPoint) -> Self {
        PlaceResult {
            name: name.into(),
            location,
            rating: None,
            user_ratings_total: None,
            vicinity: None,
            business_status: None,
        }
    }

    /// Anything but `CLOSED_PERMANENTLY` counts; a missing status is assumed open.
    pub fn is_operational(&self) -> bool {
        !matches!(self.business_status.as_deref(), Some("CLOSED_PERMANENTLY"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AddressComponent {
    pub long_name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

/// Reverse-geocoding hit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeocodeResult {
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
    #[serde(default)]
    pub formatted_address: String,
}

impl GeocodeResult {
    fn component(&self, kind: &str) -> Option<&str> {
        self.address_components
            .iter()
            .find(|c| c.types.iter().any(|t| t == kind))
            .map(|c| c.long_name.as_str())
    }

    /// Locality, else the second-level administrative area,
    /// else the first segment of the formatted address.
    pub fn settlement_name(&self) -> Option<String> {
        self.component("locality")
            .or_else(|| self.component("administrative_area_level_2"))
            .map(str::to_string)
            .or_else(|| {
                self.formatted_address
                    .split(',')
                    .next()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            })
    }
}
