use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};

use crate::config::Config;
use crate::error::AppError;
use crate::map::{MapAdapter, MarkerBoard};
use crate::notify::{BroadcastNotifier, Notification};
use crate::observability::metrics::Metrics;
use crate::session::Session;
use crate::store::OrderStore;

pub struct AppState {
    pub session: Mutex<Session>,
    pub map: MarkerBoard,
    pub notifications_tx: broadcast::Sender<Notification>,
    pub metrics: Metrics,
    pub static_dir: PathBuf,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        config.validate()?;

        let (notifications_tx, _unused_rx) = broadcast::channel(config.event_buffer_size);
        let metrics = Metrics::new();

        let mut map = MarkerBoard::new(config.map_view());
        let map_clicks_total = metrics.map_clicks_total.clone();
        map.on_click(Arc::new(move |_at| map_clicks_total.inc()));

        let orders = if config.seed_demo_orders {
            OrderStore::with_demo_orders(config.pricing())?
        } else {
            OrderStore::new(config.pricing())
        };

        let notifier = Arc::new(BroadcastNotifier::new(notifications_tx.clone()));
        let session = Session::new(
            orders,
            Box::new(map.clone()),
            notifier,
            config.passenger_name.clone(),
        );

        metrics
            .pending_orders
            .set(session.pending_orders().len() as i64);

        Ok(Self {
            session: Mutex::new(session),
            map,
            notifications_tx,
            metrics,
            static_dir: config.static_dir.clone(),
        })
    }
}
