//! Data pipelines behind the listing and post pages

pub mod detail;
pub mod listing;

pub use detail::{fetch_post, is_valid_uid, static_paths, DetailState};
pub use listing::{fetch_all, fetch_initial, fetch_next, load_more};
