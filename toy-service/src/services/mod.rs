pub mod database;
pub mod metrics;
pub mod repository;

pub use database::MongoDb;
pub use metrics::{get_metrics, init_metrics, record_listing_write};
pub use repository::{ListingRepository, ListingStore};
