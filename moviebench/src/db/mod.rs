//! Database layer: dual connection pools, the movie repository, and the
//! EXPLAIN instrumentation that powers plan comparison.
//!
//! # Modules
//!
//! - [`pools`]: the optimized/baseline pool pair
//! - [`handlers`]: repository implementations over those pools
//! - [`models`]: typed row structures
//! - [`explain`]: EXPLAIN ANALYZE runner, timing extraction, report rendering
//! - [`errors`]: database-specific error types

pub mod errors;
pub mod explain;
pub mod handlers;
pub mod models;
pub mod pools;
