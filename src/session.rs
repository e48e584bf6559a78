use std::sync::Arc;

use tracing::warn;

use crate::engine::placement::{PlacementController, PlacementMode};
use crate::engine::pricing::Estimate;
use crate::error::AppError;
use crate::map::MapAdapter;
use crate::models::order::{Order, OrderId};
use crate::models::point::{Coordinate, GeoPoint, PointRole};
use crate::notify::{Notification, NotificationSink};
use crate::store::OrderStore;

/// The passenger and driver views of one demo session.
///
/// Owns the placement state and the order store; the map and the notification
/// outlet are injected so they can be swapped for doubles.
pub struct Session {
    placement: PlacementController,
    orders: OrderStore,
    map: Box<dyn MapAdapter>,
    notifier: Arc<dyn NotificationSink>,
    passenger_name: String,
}

impl Session {
    pub fn new(
        orders: OrderStore,
        map: Box<dyn MapAdapter>,
        notifier: Arc<dyn NotificationSink>,
        passenger_name: impl Into<String>,
    ) -> Self {
        Self {
            placement: PlacementController::new(),
            orders,
            map,
            notifier,
            passenger_name: passenger_name.into(),
        }
    }

    pub fn placement(&self) -> &PlacementController {
        &self.placement
    }

    pub fn set_pickup_mode(&mut self) {
        self.placement.set_pickup_mode();
    }

    pub fn set_dropoff_mode(&mut self) {
        self.placement.set_dropoff_mode();
    }

    pub fn cancel_placement(&mut self) {
        self.placement.cancel();
    }

    pub fn set_mode(&mut self, mode: PlacementMode) {
        match mode {
            PlacementMode::Idle => self.cancel_placement(),
            PlacementMode::AwaitingPickup => self.set_pickup_mode(),
            PlacementMode::AwaitingDropoff => self.set_dropoff_mode(),
        }
    }

    pub fn map_clicked(&mut self, at: Coordinate) -> Option<GeoPoint> {
        let point = self.placement.map_clicked(at)?;

        if let Err(err) = self.map.place_marker(point.role, point.coordinate()) {
            warn!(error = %err, role = ?point.role, "failed to place marker");
        }

        let notification = match point.role {
            PointRole::Pickup => {
                Notification::info("Pickup point set", "Now choose where you are going")
            }
            PointRole::Dropoff => {
                Notification::info("Dropoff point set", "The order is ready to be placed")
            }
        };
        self.notifier.notify(notification);

        Some(point)
    }

    pub fn preview(&self) -> Option<Estimate> {
        self.placement.estimate(self.orders.pricing())
    }

    /// Turns the pending points into an order. On failure nothing changes and
    /// the passenger is warned.
    pub fn place_order(&mut self) -> Result<Order, AppError> {
        let (pickup, dropoff) = self.placement.pending();

        let order = match self.orders.create(pickup, dropoff, &self.passenger_name) {
            Ok(order) => order,
            Err(err) => {
                if let AppError::Validation(_) = err {
                    self.notifier.notify(Notification::warning(
                        "Set both points on the map",
                        "A pickup point and a destination are required",
                    ));
                }
                return Err(err);
            }
        };

        self.placement.clear();
        self.map.clear_marker(PointRole::Pickup);
        self.map.clear_marker(PointRole::Dropoff);

        self.notifier.notify(Notification::info(
            "Order created",
            format!(
                "Price: {} • Distance: {:.1} km",
                order.price, order.distance_km
            ),
        ));

        Ok(order)
    }

    pub fn accept(&mut self, id: &OrderId) -> Result<Order, AppError> {
        let order = self.orders.accept(id)?;
        self.notifier.notify(Notification::info(
            "Order accepted",
            "Head to the passenger's pickup point",
        ));
        Ok(order)
    }

    pub fn order(&self, id: &OrderId) -> Option<&Order> {
        self.orders.get(id)
    }

    pub fn orders(&self) -> &[Order] {
        self.orders.list()
    }

    pub fn pending_orders(&self) -> Vec<Order> {
        self.orders.list_pending()
    }

    pub fn accepted_orders(&self) -> Vec<Order> {
        self.orders.list_accepted()
    }
}
