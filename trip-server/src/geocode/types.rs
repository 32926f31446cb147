//! Wire types of the geocoding API.

use serde::Deserialize;

/// Response of `GET {base}/json?address=...`.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResponse {
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
    /// `OK`, `ZERO_RESULTS` or an error status.
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResult {
    #[serde(default)]
    pub formatted_address: Option<String>,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ok_response() {
        let json = r#"{
            "results": [{
                "formatted_address": "1600 Amphitheatre Pkwy, Mountain View, CA 94043, USA",
                "geometry": {"location": {"lat": 37.4224764, "lng": -122.0842499}, "location_type": "ROOFTOP"},
                "place_id": "ChIJ2eUgeAK6j4ARbn5u_wAGqWA"
            }],
            "status": "OK"
        }"#;

        let response: GeocodeResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.status, "OK");
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].geometry.location.lat, 37.4224764);
    }

    #[test]
    fn parse_error_response() {
        let json = r#"{"error_message": "The provided API key is invalid.", "results": [], "status": "REQUEST_DENIED"}"#;

        let response: GeocodeResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.status, "REQUEST_DENIED");
        assert!(response.results.is_empty());
        assert_eq!(
            response.error_message.as_deref(),
            Some("The provided API key is invalid.")
        );
    }
}
