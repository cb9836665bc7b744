pub mod recommendations;
pub mod recommender;

pub use recommendations::RecommendationService;
pub use recommender::{Recommender, DEFAULT_WATCH_EXCLUDE_THRESHOLD};
