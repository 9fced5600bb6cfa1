//! Content module - post documents and the view models rendered from them

mod post;
pub mod schema;
mod transform;

pub use post::{PostDetail, PostPagination, PostSummary, Section};
pub use transform::{count_words, reading_time, summarize, transform_post};
