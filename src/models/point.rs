use serde::{Deserialize, Serialize};

/// A raw map position in degrees, as reported by a click on the map widget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lng: f64,
    pub lat: f64,
}

impl Coordinate {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointRole {
    Pickup,
    Dropoff,
}

/// A coordinate the passenger marked as the start or the end of a ride.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lng: f64,
    pub lat: f64,
    pub role: PointRole,
}

impl GeoPoint {
    pub fn new(at: Coordinate, role: PointRole) -> Self {
        Self {
            lng: at.lng,
            lat: at.lat,
            role,
        }
    }

    pub fn pickup(lng: f64, lat: f64) -> Self {
        Self::new(Coordinate::new(lng, lat), PointRole::Pickup)
    }

    pub fn dropoff(lng: f64, lat: f64) -> Self {
        Self::new(Coordinate::new(lng, lat), PointRole::Dropoff)
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lng, self.lat)
    }
}
