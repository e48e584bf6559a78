pub mod loader;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::models::point::{Coordinate, PointRole};

pub type ClickHandler = Arc<dyn Fn(Coordinate) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "reason")]
pub enum MapStatus {
    #[default]
    Loading,
    Ready,
    Failed(String),
}

/// The surface the core needs from a map widget.
pub trait MapAdapter: Send {
    fn status(&self) -> MapStatus;
    fn on_click(&mut self, handler: ClickHandler);
    fn place_marker(&mut self, role: PointRole, at: Coordinate) -> Result<(), AppError>;
    fn clear_marker(&mut self, role: PointRole);
}

/// The fixed city view the map opens on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapView {
    pub center: Coordinate,
    pub zoom: u8,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: Coordinate::new(34.776, 32.064),
            zoom: 12,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Marker {
    pub role: PointRole,
    pub position: Coordinate,
}

#[derive(Default)]
struct BoardInner {
    status: MapStatus,
    pickup: Option<Coordinate>,
    dropoff: Option<Coordinate>,
    handlers: Vec<ClickHandler>,
}

/// In-process map state shared between the session and the HTTP layer.
///
/// Clones share the same board. Clicks are only forwarded once the board is
/// ready; a failed board stays failed.
#[derive(Clone, Default)]
pub struct MarkerBoard {
    view: MapView,
    inner: Arc<Mutex<BoardInner>>,
}

impl MarkerBoard {
    pub fn new(view: MapView) -> Self {
        Self {
            view,
            inner: Arc::default(),
        }
    }

    fn inner(&self) -> MutexGuard<'_, BoardInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn view(&self) -> MapView {
        self.view
    }

    pub fn mark_ready(&self) {
        let mut inner = self.inner();
        if let MapStatus::Failed(reason) = &inner.status {
            warn!(reason = %reason, "ignoring ready signal for failed map");
            return;
        }
        inner.status = MapStatus::Ready;
    }

    pub fn mark_failed(&self, reason: impl Into<String>) {
        self.inner().status = MapStatus::Failed(reason.into());
    }

    /// Forwards a click to the registered handlers, or reports why it was dropped.
    pub fn click(&self, at: Coordinate) -> Result<(), AppError> {
        let handlers = {
            let inner = self.inner();
            match &inner.status {
                MapStatus::Ready => inner.handlers.clone(),
                MapStatus::Loading => {
                    debug!(lng = at.lng, lat = at.lat, "click dropped: map still loading");
                    return Err(AppError::MapNotReady);
                }
                MapStatus::Failed(reason) => return Err(AppError::MapLoad(reason.clone())),
            }
        };

        for handler in handlers {
            handler(at);
        }
        Ok(())
    }

    pub fn markers(&self) -> Vec<Marker> {
        let inner = self.inner();
        let pickup = inner.pickup.map(|position| Marker {
            role: PointRole::Pickup,
            position,
        });
        let dropoff = inner.dropoff.map(|position| Marker {
            role: PointRole::Dropoff,
            position,
        });
        pickup.into_iter().chain(dropoff).collect()
    }
}

impl MapAdapter for MarkerBoard {
    fn status(&self) -> MapStatus {
        self.inner().status.clone()
    }

    fn on_click(&mut self, handler: ClickHandler) {
        self.inner().handlers.push(handler);
    }

    fn place_marker(&mut self, role: PointRole, at: Coordinate) -> Result<(), AppError> {
        let mut inner = self.inner();
        match &inner.status {
            MapStatus::Ready => {}
            MapStatus::Loading => return Err(AppError::MapNotReady),
            MapStatus::Failed(reason) => return Err(AppError::MapLoad(reason.clone())),
        }

        match role {
            PointRole::Pickup => inner.pickup = Some(at),
            PointRole::Dropoff => inner.dropoff = Some(at),
        }
        Ok(())
    }

    fn clear_marker(&mut self, role: PointRole) {
        let mut inner = self.inner();
        match role {
            PointRole::Pickup => inner.pickup = None,
            PointRole::Dropoff => inner.dropoff = None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::{MapAdapter, MapStatus, MapView, MarkerBoard};
    use crate::error::AppError;
    use crate::models::point::{Coordinate, PointRole};

    fn recording_board() -> (MarkerBoard, Arc<Mutex<Vec<Coordinate>>>) {
        let mut board = MarkerBoard::new(MapView::default());
        let clicks = Arc::new(Mutex::new(Vec::new()));
        let sink = clicks.clone();
        board.on_click(Arc::new(move |at| sink.lock().unwrap().push(at)));
        (board, clicks)
    }

    #[test]
    fn clicks_are_dropped_while_loading() {
        let (board, clicks) = recording_board();

        let result = board.click(Coordinate::new(34.77, 32.06));

        assert!(matches!(result, Err(AppError::MapNotReady)));
        assert!(clicks.lock().unwrap().is_empty());
    }

    #[test]
    fn clicks_reach_handlers_once_ready() {
        let (board, clicks) = recording_board();
        board.mark_ready();

        board.click(Coordinate::new(34.77, 32.06)).unwrap();

        assert_eq!(*clicks.lock().unwrap(), vec![Coordinate::new(34.77, 32.06)]);
    }

    #[test]
    fn failure_is_terminal() {
        let (board, clicks) = recording_board();
        board.mark_failed("engine script unavailable");
        board.mark_ready();

        assert_eq!(
            board.status(),
            MapStatus::Failed("engine script unavailable".to_string())
        );
        assert!(matches!(
            board.click(Coordinate::new(34.77, 32.06)),
            Err(AppError::MapLoad(_))
        ));
        assert!(clicks.lock().unwrap().is_empty());
    }

    #[test]
    fn placing_a_marker_replaces_the_previous_one() {
        let mut board = MarkerBoard::new(MapView::default());
        board.mark_ready();

        board
            .place_marker(PointRole::Pickup, Coordinate::new(34.70, 32.00))
            .unwrap();
        board
            .place_marker(PointRole::Pickup, Coordinate::new(34.80, 32.10))
            .unwrap();
        board
            .place_marker(PointRole::Dropoff, Coordinate::new(34.79, 32.07))
            .unwrap();

        let markers = board.markers();
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].position, Coordinate::new(34.80, 32.10));

        board.clear_marker(PointRole::Pickup);
        assert_eq!(board.markers()[0].role, PointRole::Dropoff);
    }

    #[test]
    fn clones_share_state() {
        let board = MarkerBoard::new(MapView::default());
        let handle = board.clone();
        handle.mark_ready();
        assert_eq!(board.status(), MapStatus::Ready);
    }
}
