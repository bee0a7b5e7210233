//! Document intake — PDF fetch/extraction and heuristic section segmentation.

pub mod pdf;
pub mod sections;
