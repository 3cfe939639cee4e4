//! toy-service: HTTP backend for the toy marketplace listings collection.
pub mod config;
pub mod dtos;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;

pub use startup::{build_router, AppState, Application};
