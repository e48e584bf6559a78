use serde::{Deserialize, Serialize};

use crate::engine::pricing::{Estimate, PricingPolicy};
use crate::models::point::{Coordinate, GeoPoint, PointRole};

/// Which point, if any, the next map click sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlacementMode {
    #[default]
    Idle,
    AwaitingPickup,
    AwaitingDropoff,
}

/// Tracks the placement mode and the passenger's pending pickup/dropoff points.
///
/// At most one mode is active: entering one mode always leaves the other.
/// A click consumes the active mode and returns the controller to `Idle`.
#[derive(Debug, Default)]
pub struct PlacementController {
    mode: PlacementMode,
    pickup: Option<GeoPoint>,
    dropoff: Option<GeoPoint>,
}

impl PlacementController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> PlacementMode {
        self.mode
    }

    pub fn set_pickup_mode(&mut self) {
        self.mode = PlacementMode::AwaitingPickup;
    }

    pub fn set_dropoff_mode(&mut self) {
        self.mode = PlacementMode::AwaitingDropoff;
    }

    pub fn cancel(&mut self) {
        self.mode = PlacementMode::Idle;
    }

    /// Assigns the clicked position to the awaited role. Clicks while idle are ignored.
    pub fn map_clicked(&mut self, at: Coordinate) -> Option<GeoPoint> {
        let role = match self.mode {
            PlacementMode::Idle => return None,
            PlacementMode::AwaitingPickup => PointRole::Pickup,
            PlacementMode::AwaitingDropoff => PointRole::Dropoff,
        };

        let point = GeoPoint::new(at, role);
        match role {
            PointRole::Pickup => self.pickup = Some(point),
            PointRole::Dropoff => self.dropoff = Some(point),
        }
        self.mode = PlacementMode::Idle;

        Some(point)
    }

    pub fn pickup(&self) -> Option<GeoPoint> {
        self.pickup
    }

    pub fn dropoff(&self) -> Option<GeoPoint> {
        self.dropoff
    }

    pub fn pending(&self) -> (Option<GeoPoint>, Option<GeoPoint>) {
        (self.pickup, self.dropoff)
    }

    /// Drops both pending points; the mode is left untouched.
    pub fn clear(&mut self) {
        self.pickup = None;
        self.dropoff = None;
    }

    pub fn estimate(&self, pricing: &PricingPolicy) -> Option<Estimate> {
        match (&self.pickup, &self.dropoff) {
            (Some(pickup), Some(dropoff)) => Some(pricing.quote(pickup, dropoff)),
            _ => None,
        }
    }
}
