pub mod api;
pub mod cache;
pub mod config;
pub mod errors;
pub mod exchanges;
pub mod models;
pub mod pipeline;
