use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

use crate::error::AppError;

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub orders_created_total: IntCounter,
    pub orders_accepted_total: IntCounter,
    pub order_rejections_total: IntCounterVec,
    pub pending_orders: IntGauge,
    pub order_price: Histogram,
    pub map_clicks_total: IntCounter,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let orders_created_total =
            IntCounter::new("orders_created_total", "Total orders placed by passengers")
                .expect("valid orders_created_total metric");

        let orders_accepted_total =
            IntCounter::new("orders_accepted_total", "Total accept actions by drivers")
                .expect("valid orders_accepted_total metric");

        let order_rejections_total = IntCounterVec::new(
            Opts::new(
                "order_rejections_total",
                "Order operations rejected, by error kind",
            ),
            &["reason"],
        )
        .expect("valid order_rejections_total metric");

        let pending_orders = IntGauge::new("pending_orders", "Orders waiting for a driver")
            .expect("valid pending_orders metric");

        let order_price = Histogram::with_opts(
            HistogramOpts::new("order_price", "Estimated price of placed orders").buckets(vec![
                250.0, 300.0, 400.0, 500.0, 750.0, 1_000.0, 2_000.0, 5_000.0,
            ]),
        )
        .expect("valid order_price metric");

        let map_clicks_total =
            IntCounter::new("map_clicks_total", "Clicks accepted by the ready map")
                .expect("valid map_clicks_total metric");

        registry
            .register(Box::new(orders_created_total.clone()))
            .expect("register orders_created_total");
        registry
            .register(Box::new(orders_accepted_total.clone()))
            .expect("register orders_accepted_total");
        registry
            .register(Box::new(order_rejections_total.clone()))
            .expect("register order_rejections_total");
        registry
            .register(Box::new(pending_orders.clone()))
            .expect("register pending_orders");
        registry
            .register(Box::new(order_price.clone()))
            .expect("register order_price");
        registry
            .register(Box::new(map_clicks_total.clone()))
            .expect("register map_clicks_total");

        Self {
            registry,
            orders_created_total,
            orders_accepted_total,
            order_rejections_total,
            pending_orders,
            order_price,
            map_clicks_total,
        }
    }

    pub fn record_rejection(&self, err: &AppError) {
        self.order_rejections_total
            .with_label_values(&[err.kind()])
            .inc();
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}
