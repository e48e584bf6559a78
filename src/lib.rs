pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod geo;
pub mod map;
pub mod models;
pub mod notify;
pub mod observability;
pub mod session;
pub mod state;
pub mod store;
