//! Saved locations and their identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Error returned when parsing an invalid location identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid location id {input:?}: {reason}")]
pub struct InvalidLocationId {
    input: String,
    reason: &'static str,
}

/// Identifier of a saved location.
///
/// Identifiers are positive integers assigned by the store. On the wire they
/// travel as decimal strings (`"12"`), which is what clients send in
/// `location_ids`.
///
/// # Examples
///
/// ```
/// use trip_server::domain::LocationId;
///
/// let id = LocationId::parse("12").unwrap();
/// assert_eq!(id.get(), 12);
/// assert_eq!(id.to_string(), "12");
///
/// assert!(LocationId::parse("0").is_err());
/// assert!(LocationId::parse("twelve").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocationId(u64);

impl LocationId {
    /// Wrap a raw identifier. Zero is never assigned, so it is rejected.
    pub fn new(raw: u64) -> Option<Self> {
        (raw > 0).then_some(Self(raw))
    }

    /// Parse an identifier from its decimal string form.
    pub fn parse(s: &str) -> Result<Self, InvalidLocationId> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(InvalidLocationId {
                input: s.to_string(),
                reason: "must not be empty",
            });
        }

        let raw: u64 = trimmed.parse().map_err(|_| InvalidLocationId {
            input: s.to_string(),
            reason: "must be a decimal integer",
        })?;

        Self::new(raw).ok_or_else(|| InvalidLocationId {
            input: s.to_string(),
            reason: "must be greater than zero",
        })
    }

    /// The raw numeric value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LocationId {
    type Err = InvalidLocationId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for LocationId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LocationId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Error returned for out-of-range coordinates.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid coordinates ({lat}, {lng}): {reason}")]
pub struct InvalidCoordinates {
    lat: f64,
    lng: f64,
    reason: &'static str,
}

/// A WGS84 latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinates")]
pub struct Coordinates {
    lat: f64,
    lng: f64,
}

#[derive(Deserialize)]
struct RawCoordinates {
    lat: f64,
    lng: f64,
}

impl TryFrom<RawCoordinates> for Coordinates {
    type Error = InvalidCoordinates;

    fn try_from(raw: RawCoordinates) -> Result<Self, Self::Error> {
        Self::new(raw.lat, raw.lng)
    }
}

impl Coordinates {
    /// Create a coordinate pair, rejecting non-finite or out-of-range values.
    pub fn new(lat: f64, lng: f64) -> Result<Self, InvalidCoordinates> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(InvalidCoordinates {
                lat,
                lng,
                reason: "must be finite",
            });
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(InvalidCoordinates {
                lat,
                lng,
                reason: "latitude must be within [-90, 90]",
            });
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(InvalidCoordinates {
                lat,
                lng,
                reason: "longitude must be within [-180, 180]",
            });
        }
        Ok(Self { lat, lng })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

/// The postal address of a location, as entered by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub address: String,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub zip: String,
}

impl Address {
    /// Returns the name of the first required field that is blank, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.address.trim().is_empty() {
            Some("address")
        } else if self.city.trim().is_empty() {
            Some("city")
        } else if self.state.trim().is_empty() {
            Some("state")
        } else {
            None
        }
    }

    /// Single-line form used as the geocoding query.
    pub fn one_line(&self) -> String {
        [&self.address, &self.city, &self.state, &self.zip]
            .into_iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A saved location with resolved coordinates. A stop on a trip is a
/// reference to one of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    #[serde(flatten)]
    pub address: Address,
    pub coordinate: Coordinates,
}
