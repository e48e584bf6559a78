use serde::Serialize;

use crate::geo::distance_km;
use crate::models::point::GeoPoint;

pub const DEFAULT_BASE_FARE: f64 = 200.0;
pub const DEFAULT_PRICE_PER_KM: f64 = 100.0;

/// Distance and fare shown to the passenger before the order is placed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Estimate {
    pub distance_km: f64,
    pub price: i64,
}

/// Flat base fare plus a per-kilometer rate, rounded to whole currency units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingPolicy {
    base_fare: f64,
    price_per_km: f64,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_FARE, DEFAULT_PRICE_PER_KM)
    }
}

impl PricingPolicy {
    pub fn new(base_fare: f64, price_per_km: f64) -> Self {
        Self {
            base_fare,
            price_per_km,
        }
    }

    /// Rounds half away from zero, which is half-up for the non-negative fares produced here.
    pub fn estimate(&self, distance_km: f64) -> i64 {
        (distance_km * self.price_per_km + self.base_fare).round() as i64
    }

    pub fn quote(&self, pickup: &GeoPoint, dropoff: &GeoPoint) -> Estimate {
        let distance_km = distance_km(pickup, dropoff);
        Estimate {
            distance_km,
            price: self.estimate(distance_km),
        }
    }
}
