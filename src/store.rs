use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::engine::pricing::PricingPolicy;
use crate::error::AppError;
use crate::models::order::{Order, OrderId, OrderStatus};
use crate::models::point::{GeoPoint, PointRole};

/// Issues ids from the creation time in milliseconds, bumped when two orders share a tick.
#[derive(Debug, Default)]
struct IdGenerator {
    last: i64,
}

impl IdGenerator {
    fn next(&mut self, now: DateTime<Utc>) -> OrderId {
        let candidate = now.timestamp_millis();
        let id = if candidate > self.last {
            candidate
        } else {
            self.last + 1
        };
        self.last = id;
        OrderId::from(id.to_string())
    }
}

/// Owns every order of the session, most recent first.
#[derive(Debug)]
pub struct OrderStore {
    orders: Vec<Order>,
    pricing: PricingPolicy,
    ids: IdGenerator,
}

impl OrderStore {
    pub fn new(pricing: PricingPolicy) -> Self {
        Self {
            orders: Vec::new(),
            pricing,
            ids: IdGenerator::default(),
        }
    }

    /// A store pre-filled with the two mock requests the driver view starts with.
    pub fn with_demo_orders(pricing: PricingPolicy) -> Result<Self, AppError> {
        let mut store = Self::new(pricing);
        // Created oldest first so the listing reads "Alexey M." then "Maria K.".
        store.create(
            Some(GeoPoint::pickup(34.770, 32.060)),
            Some(GeoPoint::dropoff(34.800, 32.080)),
            "Maria K.",
        )?;
        store.create(
            Some(GeoPoint::pickup(34.776, 32.064)),
            Some(GeoPoint::dropoff(34.790, 32.074)),
            "Alexey M.",
        )?;
        Ok(store)
    }

    pub fn pricing(&self) -> &PricingPolicy {
        &self.pricing
    }

    pub fn create(
        &mut self,
        pickup: Option<GeoPoint>,
        dropoff: Option<GeoPoint>,
        passenger_name: &str,
    ) -> Result<Order, AppError> {
        let (Some(pickup), Some(dropoff)) = (pickup, dropoff) else {
            return Err(AppError::Validation("missing point".to_string()));
        };

        if pickup.role != PointRole::Pickup || dropoff.role != PointRole::Dropoff {
            return Err(AppError::Validation(
                "pickup and dropoff roles are swapped".to_string(),
            ));
        }

        let quote = self.pricing.quote(&pickup, &dropoff);
        let created_at = Utc::now();

        let order = Order {
            id: self.ids.next(created_at),
            pickup,
            dropoff,
            status: OrderStatus::Pending,
            price: quote.price,
            distance_km: quote.distance_km,
            passenger_name: passenger_name.to_string(),
            created_at,
        };

        self.orders.insert(0, order.clone());

        info!(
            order_id = %order.id,
            price = order.price,
            distance_km = order.distance_km,
            "order created"
        );

        Ok(order)
    }

    /// Marks the order accepted. Accepting an already accepted order is a no-op that
    /// still returns the order.
    pub fn accept(&mut self, id: &OrderId) -> Result<Order, AppError> {
        let order = self
            .orders
            .iter_mut()
            .find(|order| &order.id == id)
            .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))?;

        if order.status == OrderStatus::Accepted {
            debug!(order_id = %id, "order already accepted");
        }
        order.status = OrderStatus::Accepted;

        info!(order_id = %id, "order accepted");
        Ok(order.clone())
    }

    pub fn get(&self, id: &OrderId) -> Option<&Order> {
        self.orders.iter().find(|order| &order.id == id)
    }

    pub fn list(&self) -> &[Order] {
        &self.orders
    }

    pub fn list_pending(&self) -> Vec<Order> {
        self.orders
            .iter()
            .filter(|order| order.is_pending())
            .cloned()
            .collect()
    }

    pub fn list_accepted(&self) -> Vec<Order> {
        self.orders
            .iter()
            .filter(|order| order.is_accepted())
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{IdGenerator, OrderStore};
    use crate::engine::pricing::PricingPolicy;
    use crate::error::AppError;
    use crate::models::order::{OrderId, OrderStatus};
    use crate::models::point::GeoPoint;

    fn store() -> OrderStore {
        OrderStore::new(PricingPolicy::default())
    }

    fn ride(store: &mut OrderStore) -> crate::models::order::Order {
        store
            .create(
                Some(GeoPoint::pickup(34.776, 32.064)),
                Some(GeoPoint::dropoff(34.790, 32.074)),
                "You",
            )
            .unwrap()
    }

    #[test]
    fn create_without_dropoff_fails_and_leaves_store_untouched() {
        let mut store = store();
        let result = store.create(Some(GeoPoint::pickup(34.776, 32.064)), None, "You");

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn create_rejects_swapped_roles() {
        let mut store = store();
        let result = store.create(
            Some(GeoPoint::dropoff(34.776, 32.064)),
            Some(GeoPoint::pickup(34.790, 32.074)),
            "You",
        );

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn new_order_is_pending_and_priced() {
        let mut store = store();
        let order = ride(&mut store);

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.price, 373);
        assert_eq!(order.passenger_name, "You");
        assert_eq!(store.list_pending()[0].id, order.id);
        assert!(store.list_accepted().is_empty());
    }

    #[test]
    fn newer_orders_come_first_with_distinct_ids() {
        let mut store = store();
        let first = ride(&mut store);
        let second = ride(&mut store);

        assert_ne!(first.id, second.id);
        let pending = store.list_pending();
        assert_eq!(pending[0].id, second.id);
        assert_eq!(pending[1].id, first.id);
    }

    #[test]
    fn accept_unknown_order_fails_without_mutation() {
        let mut store = store();
        let order = ride(&mut store);

        let result = store.accept(&OrderId::from("missing".to_string()));

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(store.list_pending(), vec![order]);
    }

    #[test]
    fn accept_moves_order_and_keeps_identity() {
        let mut store = store();
        let order = ride(&mut store);

        let accepted = store.accept(&order.id).unwrap();

        assert!(store.list_pending().is_empty());
        assert_eq!(store.list_accepted(), vec![accepted.clone()]);
        assert_eq!(accepted.id, order.id);
        assert_eq!(accepted.pickup, order.pickup);
        assert_eq!(accepted.dropoff, order.dropoff);
        assert_eq!(accepted.price, order.price);
        assert_eq!(accepted.distance_km, order.distance_km);
    }

    #[test]
    fn accepting_twice_is_idempotent() {
        let mut store = store();
        let order = ride(&mut store);

        store.accept(&order.id).unwrap();
        let again = store.accept(&order.id).unwrap();

        assert_eq!(again.status, OrderStatus::Accepted);
        assert_eq!(store.list_accepted().len(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn demo_orders_are_pending_and_listed_in_original_order() {
        let store = OrderStore::with_demo_orders(PricingPolicy::default()).unwrap();
        let pending = store.list_pending();

        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].passenger_name, "Alexey M.");
        assert_eq!(pending[1].passenger_name, "Maria K.");
        assert_eq!(pending[0].price, 373);
        assert_eq!(pending[1].price, 560);
    }

    #[test]
    fn ids_stay_unique_within_the_same_millisecond() {
        let mut ids = IdGenerator::default();
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();

        let a = ids.next(now);
        let b = ids.next(now);

        assert_eq!(a.as_str(), "1700000000000");
        assert_eq!(b.as_str(), "1700000000001");
    }
}
