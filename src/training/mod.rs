//! Training infrastructure: the episode driver, the self-play trainer, and
//! outcome metrics.

pub mod episode;
pub mod metrics;
pub mod trainer;
