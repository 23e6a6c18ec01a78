//! Core data models: stored rows, aggregate views and per-episode results.

mod appearance;
mod episode;
mod ids;
mod player;
mod results;
mod stats;
mod team;

pub use appearance::*;
pub use episode::*;
pub use ids::*;
pub use player::*;
pub use results::*;
pub use stats::*;
pub use team::*;
