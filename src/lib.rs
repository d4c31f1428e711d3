pub mod analytics;
pub mod config;
pub mod proxy;
pub mod upstream;
