//! The join processor: hash join over two predecessor inputs.
//!
//! The left input is the first incoming edge in declaration order, the
//! right input the second. With a single predecessor the node passes
//! its input through unchanged.

use crate::core::{value_key, Record, TransformationResult};
use crate::errors::NodeError;
use crate::graph::{JoinConfig, JoinType};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

/// Joins the two inputs on the configured key fields.
///
/// Build/probe hash join. Rows with a null or missing key never match.
/// Right-side non-key fields whose names collide with left-side fields
/// are inserted under the configured prefix; the right key field is
/// dropped from merged rows since it duplicates the left key.
///
/// # Errors
///
/// Returns [`NodeError`] when more than two predecessors feed the node.
pub fn apply(
    config: &JoinConfig,
    inputs: &[(Uuid, Vec<Record>)],
) -> Result<TransformationResult, NodeError> {
    match inputs {
        [] => Ok(TransformationResult::new(Vec::new(), 0, Vec::new())),
        [(_, only)] => Ok(TransformationResult::pass_through(only.clone())),
        [(_, left), (_, right)] => Ok(join(config, left, right)),
        more => Err(NodeError::new(format!(
            "join supports at most two inputs, got {}",
            more.len()
        ))),
    }
}

fn join(config: &JoinConfig, left: &[Record], right: &[Record]) -> TransformationResult {
    let input_rows = left.len() + right.len();

    // Build side: right rows bucketed by key.
    let mut buckets: HashMap<String, Vec<&Record>> = HashMap::new();
    for row in right {
        if let Some(key) = row.get(&config.right_key).filter(|v| !v.is_null()) {
            buckets.entry(value_key(key)).or_default().push(row);
        }
    }

    let mut output = Vec::new();
    for row in left {
        let matches = row
            .get(&config.left_key)
            .filter(|v| !v.is_null())
            .and_then(|key| buckets.get(&value_key(key)));

        match matches {
            Some(partners) => {
                for partner in partners {
                    output.push(merge(config, row, partner));
                }
            }
            None => {
                if config.join_type == JoinType::Left {
                    output.push(row.clone());
                }
            }
        }
    }

    TransformationResult::new(output, input_rows, Vec::new())
}

fn merge(config: &JoinConfig, left: &Record, right: &Record) -> Record {
    let mut merged = left.clone();
    for (field, value) in right {
        if field == &config.right_key {
            continue;
        }
        if merged.contains_key(field) {
            merged.insert(format!("{}{}", config.right_prefix, field), value.clone());
        } else {
            merged.insert(field.clone(), value.clone());
        }
    }
    merged
}
