//! Utilities for segmentation.

pub mod cache;

pub use cache::{CacheStats, SegmentCache};
