//! Alert Logger Library

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod sink;
pub mod writer;

pub use config::schema::AppConfig;
pub use http::HttpServer;
pub use lifecycle::{Service, Shutdown};
