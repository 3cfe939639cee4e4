pub mod health;
pub mod toys;

pub use health::{health_check, liveness, metrics_endpoint, readiness_check};
pub use toys::{
    add_toy, delete_my_toy, get_toy, list_by_category, list_my_toys, list_toys, list_trending,
    search_by_toy_name, update_my_toy,
};
