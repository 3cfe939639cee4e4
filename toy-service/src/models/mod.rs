pub mod acknowledgment;
pub mod filter;
pub mod listing;

pub use acknowledgment::{DeleteAck, InsertAck, UpdateAck};
pub use filter::{FieldCondition, FilterError, ListingFilter};
pub use listing::{changes_from_json, parse_listing_id, Listing};
