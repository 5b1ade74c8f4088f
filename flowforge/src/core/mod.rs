//! Core data types shared across the engine.

mod execution;
mod record;
mod result;

pub use execution::{Execution, ExecutionStatus, NodeStats};
pub use record::{value_as_number, value_key, value_text, Record};
pub use result::{ResultMetadata, TransformationResult};
