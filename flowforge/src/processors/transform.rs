//! The transform processor: per-record rewriting with row-level
//! failure isolation.

use crate::core::{value_as_number, value_text, Record, TransformationResult};
use crate::errors::NodeError;
use crate::expr::{self, Expr};
use crate::graph::{ConvertType, TransformConfig, TransformOp};
use crate::utils::{format_iso8601, parse_timestamp, parse_unix_timestamp};
use regex::Regex;
use serde_json::Value;

/// Applies the configured operation list to every record independently.
///
/// A failure on one record is recorded as `"Row <i>: <message>"` and
/// that record is dropped; the node as a whole still succeeds. Invalid
/// configuration (a bad regex, an unparseable expression) fails the
/// node before any record is touched.
///
/// # Errors
///
/// Returns [`NodeError`] only for invalid configuration.
pub fn apply(
    config: &TransformConfig,
    records: Vec<Record>,
) -> Result<TransformationResult, NodeError> {
    let ops = compile(config)?;

    let input_rows = records.len();
    let mut output = Vec::with_capacity(input_rows);
    let mut errors = Vec::new();

    for (i, record) in records.into_iter().enumerate() {
        match apply_ops(&ops, record) {
            Ok(rewritten) => output.push(rewritten),
            Err(message) => errors.push(format!("Row {i}: {message}")),
        }
    }

    Ok(TransformationResult::new(output, input_rows, errors))
}

/// An operation with its pattern/expression compiled once per node run.
enum CompiledOp<'a> {
    Rename {
        field: &'a str,
        new_name: &'a str,
    },
    Map {
        target: &'a str,
        expr: Expr,
    },
    Convert {
        field: &'a str,
        to: ConvertType,
    },
    Extract {
        field: &'a str,
        regex: Regex,
        target: &'a str,
    },
    Concatenate {
        fields: &'a [String],
        separator: &'a str,
        target: &'a str,
    },
    Split {
        field: &'a str,
        separator: &'a str,
        targets: &'a [String],
    },
}

fn compile(config: &TransformConfig) -> Result<Vec<CompiledOp<'_>>, NodeError> {
    config
        .operations
        .iter()
        .map(|op| match op {
            TransformOp::Rename { field, new_name } => Ok(CompiledOp::Rename {
                field,
                new_name,
            }),
            TransformOp::Map { target, expression } => {
                let expr = expr::parse(expression).map_err(|err| {
                    NodeError::new(format!("invalid map expression '{expression}': {err}"))
                })?;
                Ok(CompiledOp::Map { target, expr })
            }
            TransformOp::Convert { field, to } => Ok(CompiledOp::Convert { field, to: *to }),
            TransformOp::Extract {
                field,
                pattern,
                target,
            } => {
                let regex = Regex::new(pattern).map_err(|err| {
                    NodeError::new(format!("invalid extract pattern '{pattern}': {err}"))
                })?;
                Ok(CompiledOp::Extract {
                    field,
                    regex,
                    target: target.as_deref().unwrap_or(field),
                })
            }
            TransformOp::Concatenate {
                fields,
                separator,
                target,
            } => Ok(CompiledOp::Concatenate {
                fields,
                separator,
                target,
            }),
            TransformOp::Split {
                field,
                separator,
                targets,
            } => Ok(CompiledOp::Split {
                field,
                separator,
                targets,
            }),
        })
        .collect()
}

fn apply_ops(ops: &[CompiledOp<'_>], mut record: Record) -> Result<Record, String> {
    for op in ops {
        match op {
            CompiledOp::Rename { field, new_name } => {
                let value = record.remove(*field).unwrap_or(Value::Null);
                record.insert((*new_name).to_string(), value);
            }
            CompiledOp::Map { target, expr } => {
                let value = expr.eval(&record).map_err(|err| err.to_string())?;
                record.insert((*target).to_string(), value);
            }
            CompiledOp::Convert { field, to } => {
                let value = record.get(*field).cloned().unwrap_or(Value::Null);
                let converted = convert(&value, *to)
                    .map_err(|message| format!("cannot convert field '{field}': {message}"))?;
                record.insert((*field).to_string(), converted);
            }
            CompiledOp::Extract {
                field,
                regex,
                target,
            } => {
                let value = record.get(*field).cloned().unwrap_or(Value::Null);
                let extracted = if value.is_null() {
                    Value::Null
                } else {
                    let text = value_text(&value);
                    match regex.captures(&text) {
                        Some(caps) => {
                            // First capture group, else the whole match.
                            let m = caps.get(1).or_else(|| caps.get(0));
                            m.map_or(Value::Null, |m| Value::String(m.as_str().to_string()))
                        }
                        None => Value::Null,
                    }
                };
                record.insert((*target).to_string(), extracted);
            }
            CompiledOp::Concatenate {
                fields,
                separator,
                target,
            } => {
                let joined = fields
                    .iter()
                    .map(|f| value_text(record.get(f).unwrap_or(&Value::Null)))
                    .collect::<Vec<_>>()
                    .join(separator);
                record.insert((*target).to_string(), Value::String(joined));
            }
            CompiledOp::Split {
                field,
                separator,
                targets,
            } => {
                let value = record.get(*field).cloned().unwrap_or(Value::Null);
                let text = value_text(&value);
                let mut parts = text.split(*separator);
                for target in targets.iter() {
                    let part = parts
                        .next()
                        .map_or(Value::Null, |p| Value::String(p.to_string()));
                    record.insert(target.clone(), part);
                }
            }
        }
    }
    Ok(record)
}

/// Coerces a value to the target type. Null passes through unchanged.
fn convert(value: &Value, to: ConvertType) -> Result<Value, String> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    match to {
        ConvertType::String => Ok(Value::String(value_text(value))),
        ConvertType::Number => value_as_number(value)
            .map(Value::from)
            .ok_or_else(|| format!("'{value}' is not a number")),
        ConvertType::Boolean => match value {
            Value::Bool(b) => Ok(Value::Bool(*b)),
            Value::Number(n) => Ok(Value::Bool(n.as_f64().is_some_and(|f| f != 0.0))),
            Value::String(s) => match s.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(Value::Bool(true)),
                "false" | "0" | "no" => Ok(Value::Bool(false)),
                other => Err(format!("'{other}' is not a boolean")),
            },
            other => Err(format!("'{other}' is not a boolean")),
        },
        ConvertType::Date => {
            let parsed = match value {
                Value::String(s) => parse_timestamp(s).map_err(|err| err.to_string())?,
                Value::Number(n) => {
                    let f = n.as_f64().ok_or_else(|| "not a finite number".to_string())?;
                    parse_unix_timestamp(f).map_err(|err| err.to_string())?
                }
                other => return Err(format!("'{other}' is not a date")),
            };
            Ok(Value::String(format_iso8601(&parsed)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::TransformOp;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn record(fields: &[(&str, Value)]) -> Record {
        fields
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    fn run(ops: Vec<TransformOp>, records: Vec<Record>) -> TransformationResult {
        apply(&TransformConfig { operations: ops }, records).unwrap()
    }

    #[test]
    fn test_rename_removes_old_key() {
        let result = run(
            vec![TransformOp::Rename {
                field: "old".to_string(),
                new_name: "new".to_string(),
            }],
            vec![record(&[("old", json!(5))])],
        );

        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].get("new"), Some(&json!(5)));
        assert!(!result.records[0].contains_key("old"));
    }

    #[test]
    fn test_map_assigns_expression_result() {
        let result = run(
            vec![TransformOp::Map {
                target: "total".to_string(),
                expression: "price * qty".to_string(),
            }],
            vec![record(&[("price", json!(10)), ("qty", json!(3))])],
        );

        assert_eq!(result.records[0]["total"], json!(30.0));
    }

    #[test]
    fn test_map_row_failure_drops_only_that_row() {
        let result = run(
            vec![TransformOp::Map {
                target: "double".to_string(),
                expression: "x * 2".to_string(),
            }],
            vec![
                record(&[("x", json!(1))]),
                record(&[("x", json!("not a number"))]),
                record(&[("x", json!(3))]),
            ],
        );

        assert_eq!(result.records.len(), 2);
        assert_eq!(result.metadata.input_rows, 3);
        assert_eq!(result.metadata.dropped_rows, 1);
        assert_eq!(result.metadata.errors.len(), 1);
        assert!(result.metadata.errors[0].starts_with("Row 1:"));
    }

    #[test]
    fn test_invalid_expression_fails_the_node() {
        let err = apply(
            &TransformConfig {
                operations: vec![TransformOp::Map {
                    target: "y".to_string(),
                    expression: "x +".to_string(),
                }],
            },
            vec![record(&[("x", json!(1))])],
        )
        .unwrap_err();

        assert!(err.to_string().contains("invalid map expression"));
    }

    #[test]
    fn test_convert_number_and_boolean() {
        let result = run(
            vec![
                TransformOp::Convert {
                    field: "n".to_string(),
                    to: ConvertType::Number,
                },
                TransformOp::Convert {
                    field: "b".to_string(),
                    to: ConvertType::Boolean,
                },
            ],
            vec![record(&[("n", json!("42")), ("b", json!("yes"))])],
        );

        assert_eq!(result.records[0]["n"], json!(42.0));
        assert_eq!(result.records[0]["b"], json!(true));
    }

    #[test]
    fn test_convert_date_normalizes_to_iso() {
        let result = run(
            vec![TransformOp::Convert {
                field: "d".to_string(),
                to: ConvertType::Date,
            }],
            vec![record(&[("d", json!("2023-10-05"))])],
        );

        let rendered = result.records[0]["d"].as_str().unwrap();
        assert!(rendered.starts_with("2023-10-05T00:00:00"));
    }

    #[test]
    fn test_convert_failure_is_row_level() {
        let result = run(
            vec![TransformOp::Convert {
                field: "n".to_string(),
                to: ConvertType::Number,
            }],
            vec![
                record(&[("n", json!("7"))]),
                record(&[("n", json!("seven"))]),
            ],
        );

        assert_eq!(result.records.len(), 1);
        assert_eq!(result.metadata.errors.len(), 1);
        assert!(result.metadata.errors[0].contains("Row 1"));
    }

    #[test]
    fn test_extract_first_capture_group() {
        let result = run(
            vec![TransformOp::Extract {
                field: "email".to_string(),
                pattern: r"@(.+)$".to_string(),
                target: Some("domain".to_string()),
            }],
            vec![record(&[("email", json!("ada@example.com"))])],
        );

        assert_eq!(result.records[0]["domain"], json!("example.com"));
        // The source field is untouched when a target is configured.
        assert_eq!(result.records[0]["email"], json!("ada@example.com"));
    }

    #[test]
    fn test_extract_whole_match_without_groups() {
        let result = run(
            vec![TransformOp::Extract {
                field: "text".to_string(),
                pattern: r"\d+".to_string(),
                target: None,
            }],
            vec![record(&[("text", json!("order 1234 shipped"))])],
        );

        assert_eq!(result.records[0]["text"], json!("1234"));
    }

    #[test]
    fn test_extract_no_match_yields_null() {
        let result = run(
            vec![TransformOp::Extract {
                field: "text".to_string(),
                pattern: r"\d+".to_string(),
                target: Some("num".to_string()),
            }],
            vec![record(&[("text", json!("no digits here"))])],
        );

        assert_eq!(result.records[0]["num"], Value::Null);
        assert!(result.metadata.errors.is_empty());
    }

    #[test]
    fn test_invalid_regex_fails_the_node() {
        let err = apply(
            &TransformConfig {
                operations: vec![TransformOp::Extract {
                    field: "x".to_string(),
                    pattern: "(unclosed".to_string(),
                    target: None,
                }],
            },
            Vec::new(),
        )
        .unwrap_err();

        assert!(err.to_string().contains("invalid extract pattern"));
    }

    #[test]
    fn test_concatenate() {
        let result = run(
            vec![TransformOp::Concatenate {
                fields: vec!["first".to_string(), "last".to_string()],
                separator: " ".to_string(),
                target: "full".to_string(),
            }],
            vec![record(&[("first", json!("Ada")), ("last", json!("Lovelace"))])],
        );

        assert_eq!(result.records[0]["full"], json!("Ada Lovelace"));
    }

    #[test]
    fn test_split_missing_parts_become_null() {
        let result = run(
            vec![TransformOp::Split {
                field: "full".to_string(),
                separator: " ".to_string(),
                targets: vec![
                    "first".to_string(),
                    "last".to_string(),
                    "suffix".to_string(),
                ],
            }],
            vec![record(&[("full", json!("Ada Lovelace"))])],
        );

        assert_eq!(result.records[0]["first"], json!("Ada"));
        assert_eq!(result.records[0]["last"], json!("Lovelace"));
        assert_eq!(result.records[0]["suffix"], Value::Null);
    }

    #[test]
    fn test_operations_apply_in_order() {
        let result = run(
            vec![
                TransformOp::Rename {
                    field: "a".to_string(),
                    new_name: "b".to_string(),
                },
                TransformOp::Map {
                    target: "c".to_string(),
                    expression: "b + 1".to_string(),
                },
            ],
            vec![record(&[("a", json!(1))])],
        );

        assert_eq!(result.records[0]["c"], json!(2.0));
    }
}
