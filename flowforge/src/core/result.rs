//! The output contract of every node processor.

use super::Record;
use serde::{Deserialize, Serialize};

/// Row accounting and row-level errors for one processor invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultMetadata {
    /// Rows received from predecessor nodes.
    pub input_rows: usize,
    /// Rows produced for downstream nodes.
    pub output_rows: usize,
    /// Rows present in the input but absent from the output.
    pub dropped_rows: usize,
    /// Row-level error messages collected while processing.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// What a node processor hands back to the engine.
#[derive(Debug, Clone, Default)]
pub struct TransformationResult {
    /// The produced record list.
    pub records: Vec<Record>,
    /// Row accounting for this invocation.
    pub metadata: ResultMetadata,
}

impl TransformationResult {
    /// Creates a result from produced records and the input row count.
    /// `dropped_rows` is derived; fan-out (more output than input) counts
    /// as zero dropped.
    #[must_use]
    pub fn new(records: Vec<Record>, input_rows: usize, errors: Vec<String>) -> Self {
        let output_rows = records.len();
        Self {
            records,
            metadata: ResultMetadata {
                input_rows,
                output_rows,
                dropped_rows: input_rows.saturating_sub(output_rows),
                errors,
            },
        }
    }

    /// Creates a result for a source node: no predecessor, so the input
    /// row count is reported as zero.
    #[must_use]
    pub fn sourced(records: Vec<Record>) -> Self {
        let output_rows = records.len();
        Self {
            records,
            metadata: ResultMetadata {
                input_rows: 0,
                output_rows,
                dropped_rows: 0,
                errors: Vec::new(),
            },
        }
    }

    /// Creates a result that passes the input through unchanged.
    #[must_use]
    pub fn pass_through(records: Vec<Record>) -> Self {
        let rows = records.len();
        Self::new(records, rows, Vec::new())
    }
}
