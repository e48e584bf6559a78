use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::error::AppError;
use crate::map::MarkerBoard;

/// Resolves one map resource (script or stylesheet) before the widget starts.
pub trait ResourceFetcher: Send + Sync {
    fn fetch(&self, resource: &str) -> impl Future<Output = Result<(), String>> + Send;
}

/// Looks the resources up in the directory the front-end is served from.
#[derive(Debug, Clone)]
pub struct StaticDirFetcher {
    root: PathBuf,
}

impl StaticDirFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ResourceFetcher for StaticDirFetcher {
    fn fetch(&self, resource: &str) -> impl Future<Output = Result<(), String>> + Send {
        let path = self.root.join(resource.trim_start_matches('/'));
        async move {
            let metadata = tokio::fs::metadata(&path)
                .await
                .map_err(|err| format!("{}: {err}", path.display()))?;
            if metadata.is_file() {
                Ok(())
            } else {
                Err(format!("{} is not a file", path.display()))
            }
        }
    }
}

/// Loads the widget's resources one after another, then waits before declaring the map ready.
#[derive(Debug, Clone)]
pub struct MapLoader {
    resources: Vec<String>,
    init_delay: Duration,
}

impl MapLoader {
    pub fn new(resources: Vec<String>, init_delay: Duration) -> Self {
        Self {
            resources,
            init_delay,
        }
    }

    /// A failed resource marks the board failed for good; there is no retry.
    pub async fn load<F: ResourceFetcher>(
        &self,
        board: &MarkerBoard,
        fetcher: &F,
    ) -> Result<(), AppError> {
        for resource in &self.resources {
            if let Err(reason) = fetcher.fetch(resource).await {
                let message = format!("failed to load {resource}: {reason}");
                error!(resource = %resource, reason = %reason, "map resource failed to load");
                board.mark_failed(message.clone());
                return Err(AppError::MapLoad(message));
            }
            debug!(resource = %resource, "map resource loaded");
        }

        sleep(self.init_delay).await;
        board.mark_ready();
        info!(resources = self.resources.len(), "map ready");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::sync::Mutex;
    use std::time::Duration;

    use super::{MapLoader, ResourceFetcher, StaticDirFetcher};
    use crate::error::AppError;
    use crate::map::{MapAdapter, MapStatus, MapView, MarkerBoard};

    struct ScriptedFetcher {
        failing: &'static str,
        seen: Mutex<Vec<String>>,
    }

    impl ResourceFetcher for ScriptedFetcher {
        fn fetch(&self, resource: &str) -> impl Future<Output = Result<(), String>> + Send {
            self.seen.lock().unwrap().push(resource.to_string());
            let result = if resource == self.failing {
                Err("404".to_string())
            } else {
                Ok(())
            };
            async move { result }
        }
    }

    fn resources() -> Vec<String> {
        vec![
            "js/map.engine.js".to_string(),
            "js/map.js".to_string(),
            "css/map.css".to_string(),
        ]
    }

    #[tokio::test]
    async fn stops_at_first_failed_resource() {
        let board = MarkerBoard::new(MapView::default());
        let fetcher = ScriptedFetcher {
            failing: "js/map.js",
            seen: Mutex::new(Vec::new()),
        };

        let result = MapLoader::new(resources(), Duration::ZERO)
            .load(&board, &fetcher)
            .await;

        assert!(matches!(result, Err(AppError::MapLoad(_))));
        assert_eq!(
            *fetcher.seen.lock().unwrap(),
            vec!["js/map.engine.js".to_string(), "js/map.js".to_string()]
        );
        assert!(matches!(board.status(), MapStatus::Failed(_)));
    }

    #[tokio::test]
    async fn board_is_ready_after_all_resources_load() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("js")).unwrap();
        std::fs::create_dir_all(dir.path().join("css")).unwrap();
        for resource in resources() {
            std::fs::write(dir.path().join(&resource), "//").unwrap();
        }

        let board = MarkerBoard::new(MapView::default());
        MapLoader::new(resources(), Duration::from_millis(5))
            .load(&board, &StaticDirFetcher::new(dir.path()))
            .await
            .unwrap();

        assert_eq!(board.status(), MapStatus::Ready);
    }

    #[tokio::test]
    async fn missing_static_file_fails_the_map() {
        let dir = tempfile::tempdir().unwrap();
        let board = MarkerBoard::new(MapView::default());

        let result = MapLoader::new(vec!["/js/map.js".to_string()], Duration::ZERO)
            .load(&board, &StaticDirFetcher::new(dir.path()))
            .await;

        assert!(result.is_err());
        assert!(matches!(board.status(), MapStatus::Failed(_)));
    }

    #[tokio::test]
    async fn no_resources_means_ready_after_delay() {
        let board = MarkerBoard::new(MapView::default());
        let fetcher = StaticDirFetcher::new("does-not-matter");

        MapLoader::new(Vec::new(), Duration::ZERO)
            .load(&board, &fetcher)
            .await
            .unwrap();

        assert_eq!(board.status(), MapStatus::Ready);
    }
}
