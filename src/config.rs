use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::engine::pricing::{PricingPolicy, DEFAULT_BASE_FARE, DEFAULT_PRICE_PER_KM};
use crate::error::AppError;
use crate::map::MapView;
use crate::models::point::Coordinate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format {other}, expected compact or json")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub passenger_name: String,
    pub seed_demo_orders: bool,
    pub base_fare: f64,
    pub price_per_km: f64,
    pub map_center_lng: f64,
    pub map_center_lat: f64,
    pub map_zoom: u8,
    pub map_init_delay_ms: u64,
    pub map_resources: Vec<String>,
    pub static_dir: PathBuf,
    pub event_buffer_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        let view = MapView::default();
        Self {
            http_port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Compact,
            passenger_name: "You".to_string(),
            seed_demo_orders: true,
            base_fare: DEFAULT_BASE_FARE,
            price_per_km: DEFAULT_PRICE_PER_KM,
            map_center_lng: view.center.lng,
            map_center_lat: view.center.lat,
            map_zoom: view.zoom,
            map_init_delay_ms: 500,
            map_resources: Vec::new(),
            static_dir: PathBuf::from("static"),
            event_buffer_size: 1024,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();
        let defaults = Self::default();

        let config = Self {
            http_port: parse_or_default("HTTP_PORT", defaults.http_port)?,
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_format: parse_or_default("LOG_FORMAT", defaults.log_format)?,
            passenger_name: env::var("PASSENGER_NAME").unwrap_or(defaults.passenger_name),
            seed_demo_orders: parse_or_default("SEED_DEMO_ORDERS", defaults.seed_demo_orders)?,
            base_fare: parse_or_default("BASE_FARE", defaults.base_fare)?,
            price_per_km: parse_or_default("PRICE_PER_KM", defaults.price_per_km)?,
            map_center_lng: parse_or_default("MAP_CENTER_LNG", defaults.map_center_lng)?,
            map_center_lat: parse_or_default("MAP_CENTER_LAT", defaults.map_center_lat)?,
            map_zoom: parse_or_default("MAP_ZOOM", defaults.map_zoom)?,
            map_init_delay_ms: parse_or_default("MAP_INIT_DELAY_MS", defaults.map_init_delay_ms)?,
            map_resources: env::var("MAP_RESOURCES")
                .map(|raw| parse_list(&raw))
                .unwrap_or(defaults.map_resources),
            static_dir: env::var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            event_buffer_size: parse_or_default("EVENT_BUFFER_SIZE", defaults.event_buffer_size)?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.event_buffer_size == 0 {
            return Err(AppError::Internal("EVENT_BUFFER_SIZE must be > 0".to_string()));
        }
        for (key, value) in [("BASE_FARE", self.base_fare), ("PRICE_PER_KM", self.price_per_km)] {
            if !value.is_finite() || value < 0.0 {
                return Err(AppError::Internal(format!(
                    "{key} must be a finite, non-negative number"
                )));
            }
        }
        Ok(())
    }

    pub fn pricing(&self) -> PricingPolicy {
        PricingPolicy::new(self.base_fare, self.price_per_km)
    }

    pub fn map_view(&self) -> MapView {
        MapView {
            center: Coordinate::new(self.map_center_lng, self.map_center_lat),
            zoom: self.map_zoom,
        }
    }

    pub fn map_init_delay(&self) -> Duration {
        Duration::from_millis(self.map_init_delay_ms)
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{parse_list, Config, LogFormat};

    #[test]
    fn log_format_is_case_insensitive() {
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert!("pretty".parse::<LogFormat>().is_err());
    }

    #[test]
    fn resource_list_skips_blank_entries() {
        assert_eq!(
            parse_list(" js/map.engine.js, ,js/map.js,css/map.css,"),
            vec!["js/map.engine.js", "js/map.js", "css/map.css"]
        );
    }

    #[test]
    fn defaults_describe_the_demo_city() {
        let config = Config::default();
        assert_eq!(config.map_view().zoom, 12);
        assert_eq!(config.pricing().estimate(1.0), 300);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_sized_event_buffer_is_rejected() {
        let config = Config {
            event_buffer_size: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_finite_fares_are_rejected() {
        for (base_fare, price_per_km) in [
            (f64::NAN, 100.0),
            (f64::INFINITY, 100.0),
            (200.0, f64::NAN),
            (200.0, f64::NEG_INFINITY),
            (-1.0, 100.0),
        ] {
            let config = Config {
                base_fare,
                price_per_km,
                ..Config::default()
            };
            assert!(config.validate().is_err(), "{base_fare} / {price_per_km}");
        }
    }
}
