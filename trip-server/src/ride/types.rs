//! Wire types for the ride platform API.
//!
//! Field names follow the platform's JSON. Fields the service never reads
//! are still modelled where the platform documents them, so that logs and
//! debugging output show the full response.

use serde::{Deserialize, Serialize};

use crate::domain::{Coordinates, LegEstimate, LocationId};

/// Response of `GET /estimates/price`.
#[derive(Debug, Clone, Deserialize)]
pub struct PriceEstimates {
    #[serde(default)]
    pub prices: Vec<PriceEstimate>,
}

/// One candidate price/time estimate between two points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceEstimate {
    pub product_id: String,
    #[serde(default)]
    pub currency_code: Option<String>,
    #[serde(default)]
    pub display_name: String,
    /// Human readable estimate, e.g. `"$15-20"`.
    #[serde(default)]
    pub estimate: String,
    #[serde(default)]
    pub low_estimate: Option<u64>,
    #[serde(default)]
    pub high_estimate: Option<u64>,
    #[serde(default = "default_surge")]
    pub surge_multiplier: f64,
    /// Seconds.
    pub duration: u64,
    /// Miles.
    pub distance: f64,
}

fn default_surge() -> f64 {
    1.0
}

impl PriceEstimate {
    /// Convert into the leg estimate for travelling to `stop`.
    ///
    /// Products that are metered have no low/high figures; they count as zero.
    pub fn into_leg(self, stop: LocationId) -> LegEstimate {
        LegEstimate {
            stop,
            product_id: self.product_id,
            currency_code: self.currency_code,
            distance: self.distance,
            duration: self.duration,
            low_estimate: self.low_estimate.unwrap_or(0),
            high_estimate: self.high_estimate.unwrap_or(0),
            surge_multiplier: self.surge_multiplier,
        }
    }
}

/// Response of `GET /products`.
#[derive(Debug, Clone, Deserialize)]
pub struct Products {
    #[serde(default)]
    pub products: Vec<Product>,
}

/// A ride product available at a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub capacity: u32,
    #[serde(default)]
    pub image: Option<String>,
}

/// Body of `POST /requests`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RideRequest {
    pub product_id: String,
    pub start_latitude: f64,
    pub start_longitude: f64,
    pub end_latitude: f64,
    pub end_longitude: f64,
}

impl RideRequest {
    pub fn new(product_id: impl Into<String>, start: Coordinates, end: Coordinates) -> Self {
        Self {
            product_id: product_id.into(),
            start_latitude: start.lat(),
            start_longitude: start.lng(),
            end_latitude: end.lat(),
            end_longitude: end.lng(),
        }
    }
}

/// Response of `POST /requests`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RideReceipt {
    pub request_id: String,
    pub status: String,
    /// Pickup ETA as reported by the platform. Null while a driver is
    /// still being matched.
    #[serde(default)]
    pub eta: Option<u32>,
    #[serde(default)]
    pub surge_multiplier: Option<f64>,
    #[serde(default)]
    pub driver: Option<serde_json::Value>,
    #[serde(default)]
    pub vehicle: Option<serde_json::Value>,
    #[serde(default)]
    pub location: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_price_estimates() {
        let json = r#"{
            "prices": [
                {
                    "product_id": "08f17084-23fd-4103-aa3e-9b660223934b",
                    "currency_code": "USD",
                    "display_name": "UberBLACK",
                    "estimate": "$23-29",
                    "low_estimate": 23,
                    "high_estimate": 29,
                    "surge_multiplier": 1,
                    "duration": 640,
                    "distance": 5.34
                },
                {
                    "product_id": "9af0174c-8939-4ef6-8e91-1a43a0e7c6f6",
                    "currency_code": null,
                    "display_name": "UberTAXI",
                    "estimate": "Metered",
                    "low_estimate": null,
                    "high_estimate": null,
                    "surge_multiplier": 1,
                    "duration": 640,
                    "distance": 5.34
                }
            ]
        }"#;

        let parsed: PriceEstimates = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.prices.len(), 2);
        assert_eq!(parsed.prices[0].low_estimate, Some(23));
        assert_eq!(parsed.prices[1].low_estimate, None);

        let stop = LocationId::new(4).unwrap();
        let leg = parsed.prices[1].clone().into_leg(stop);
        assert_eq!(leg.low_estimate, 0);
        assert_eq!(leg.distance, 5.34);
        assert_eq!(leg.stop, stop);
    }

    #[test]
    fn missing_prices_is_empty() {
        let parsed: PriceEstimates = serde_json::from_str("{}").unwrap();
        assert!(parsed.prices.is_empty());
    }

    #[test]
    fn parse_products() {
        let json = r#"{"products": [{
            "product_id": "327f7914-cd12-4f77-9e0c-b27bac580d03",
            "description": "The original Uber",
            "display_name": "UberBLACK",
            "capacity": 4,
            "image": "http://d1a3f4spazzrp4.cloudfront.net/car.jpg"
        }]}"#;

        let parsed: Products = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.products[0].capacity, 4);
        assert_eq!(parsed.products[0].display_name, "UberBLACK");
    }

    #[test]
    fn parse_receipt_with_nulls() {
        let json = r#"{
            "driver": null,
            "eta": 5,
            "location": null,
            "request_id": "852b8fdd-4369-4659-9628-e122662ad257",
            "status": "processing",
            "surge_multiplier": null,
            "vehicle": null
        }"#;

        let receipt: RideReceipt = serde_json::from_str(json).unwrap();
        assert_eq!(receipt.eta, Some(5));
        assert_eq!(receipt.status, "processing");
        assert!(receipt.driver.is_none());
    }

    #[test]
    fn parse_receipt_with_null_eta() {
        let json = r#"{
            "driver": null,
            "eta": null,
            "location": null,
            "request_id": "abc",
            "status": "processing",
            "surge_multiplier": null,
            "vehicle": null
        }"#;

        let receipt: RideReceipt = serde_json::from_str(json).unwrap();
        assert_eq!(receipt.eta, None);
        assert_eq!(receipt.request_id, "abc");

        let receipt: RideReceipt =
            serde_json::from_str(r#"{"request_id": "abc", "status": "processing"}"#).unwrap();
        assert_eq!(receipt.eta, None);
    }

    #[test]
    fn request_body_fields() {
        let start = Coordinates::new(37.77, -122.41).unwrap();
        let end = Coordinates::new(37.79, -122.39).unwrap();
        let body = serde_json::to_value(RideRequest::new("p1", start, end)).unwrap();

        assert_eq!(body["product_id"], "p1");
        assert_eq!(body["start_latitude"], 37.77);
        assert_eq!(body["end_longitude"], -122.39);
    }
}
