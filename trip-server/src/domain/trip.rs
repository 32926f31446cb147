//! Trip plans, leg estimates and progress snapshots.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::LocationId;

/// Identifier of a planned trip, assigned from the store's trip sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TripId(u64);

impl TripId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Parse a trip id from a path segment.
    pub fn parse(s: &str) -> Option<Self> {
        s.trim().parse().ok().map(Self)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a progress snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressId(u64);

impl ProgressId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProgressId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a trip.
///
/// `Planning → Requesting → … → Completed`. There is no way back to
/// `Planning`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripStatus {
    Planning,
    Requesting,
    InProgress,
    Completed,
}

impl TripStatus {
    /// Status of a trip whose cursor sits at `cursor` out of `stop_count` legs.
    ///
    /// A cursor of zero means no leg was requested yet, so the trip is still
    /// being planned unless there is nothing to request at all.
    pub fn for_cursor(cursor: usize, stop_count: usize) -> Self {
        if cursor >= stop_count {
            TripStatus::Completed
        } else if cursor == 0 {
            TripStatus::Planning
        } else {
            TripStatus::Requesting
        }
    }
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TripStatus::Planning => "planning",
            TripStatus::Requesting => "requesting",
            TripStatus::InProgress => "in_progress",
            TripStatus::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// Price and time estimate for travelling from the trip origin to one stop.
///
/// Only the estimate the planner selected is kept; it is folded into the
/// plan totals and never stored on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct LegEstimate {
    pub stop: LocationId,
    pub product_id: String,
    pub currency_code: Option<String>,
    /// Distance in miles, as reported by the pricing service.
    pub distance: f64,
    /// Duration in seconds.
    pub duration: u64,
    pub low_estimate: u64,
    pub high_estimate: u64,
    pub surge_multiplier: f64,
}

/// Aggregate cost and time of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TripTotals {
    pub distance: f64,
    /// Sum of the low cost estimates.
    pub cost: u64,
    /// Seconds.
    pub duration: u64,
}

impl TripTotals {
    pub fn of(legs: &[LegEstimate]) -> Self {
        legs.iter().fold(Self::default(), |acc, leg| Self {
            distance: acc.distance + leg.distance,
            cost: acc.cost + leg.low_estimate,
            duration: acc.duration + leg.duration,
        })
    }
}

/// One leg of a trip: the ride from `from` to `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Leg {
    /// Position of the leg; equal to the cursor value that selects it.
    pub index: usize,
    pub from: LocationId,
    pub to: LocationId,
}

/// A persisted multi-stop itinerary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripPlan {
    pub id: TripId,
    pub origin: LocationId,
    /// Stops in visiting order; a permutation of the requested stops.
    pub stops: Vec<LocationId>,
    pub totals: TripTotals,
    pub status: TripStatus,
    /// Index into `stops` of the next leg to request.
    pub cursor: usize,
    pub created_at: DateTime<Utc>,
}

impl TripPlan {
    /// Build a plan from legs that are already in visiting order.
    pub fn from_ordered_legs(
        id: TripId,
        origin: LocationId,
        legs: &[LegEstimate],
        created_at: DateTime<Utc>,
    ) -> Self {
        let stops: Vec<LocationId> = legs.iter().map(|leg| leg.stop).collect();
        let status = TripStatus::for_cursor(0, stops.len());

        Self {
            id,
            origin,
            stops,
            totals: TripTotals::of(legs),
            status,
            cursor: 0,
            created_at,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.cursor >= self.stops.len()
    }

    /// The leg the cursor points at, or `None` once every leg was requested.
    ///
    /// The first leg starts at the trip origin; each later leg starts at the
    /// stop the previous leg ended at.
    pub fn next_leg(&self) -> Option<Leg> {
        let to = *self.stops.get(self.cursor)?;
        let from = match self.cursor {
            0 => self.origin,
            n => self.stops[n - 1],
        };
        Some(Leg {
            index: self.cursor,
            from,
            to,
        })
    }

    /// Move the cursor past the current leg and refresh the status.
    pub fn advance_cursor(&mut self) {
        self.cursor = (self.cursor + 1).min(self.stops.len());
        self.status = TripStatus::for_cursor(self.cursor, self.stops.len());
    }
}

/// Snapshot of a trip after one leg was requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripProgress {
    pub id: ProgressId,
    pub trip_id: TripId,
    /// Cursor value after this leg was consumed.
    pub cursor: usize,
    pub origin: LocationId,
    pub destination: LocationId,
    /// The platform's `eta` for the pickup, passed through unchanged.
    pub wait_eta: u32,
    pub status: TripStatus,
    pub request_id: String,
    /// Ride status string reported by the platform (e.g. `processing`).
    pub ride_status: String,
    pub stops: Vec<LocationId>,
    pub totals: TripTotals,
    pub requested_at: DateTime<Utc>,
}
