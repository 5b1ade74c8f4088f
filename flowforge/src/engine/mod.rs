//! The execution engine: drives validated pipelines through their
//! processors and records statistics.

mod executor;
mod tracker;


pub use executor::ExecutionEngine;
pub use tracker::ExecutionTracker;
