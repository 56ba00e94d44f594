//! Domain layer: entities and compensation logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod engine;
pub mod entities;
pub mod error;
pub mod render;
pub mod sample;

pub use engine::{
    estimate_binary, estimate_fast_start, estimate_matching, parse_direct_count, sum_volume,
    volume_for_referrals,
};
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use render::render_tree;
