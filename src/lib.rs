pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod websocket;
