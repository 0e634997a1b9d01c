//! Helpers shared across stages.

pub mod parallel;
