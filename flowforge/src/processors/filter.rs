//! The filter processor: retain records for which every configured
//! condition holds.

use crate::core::{value_as_number, Record, TransformationResult};
use crate::graph::{FilterCondition, FilterConfig, FilterOperator};
use serde_json::Value;
use std::cmp::Ordering;

/// Applies the conditions with logical AND semantics. The relative
/// order of surviving records is preserved.
#[must_use]
pub fn apply(config: &FilterConfig, records: Vec<Record>) -> TransformationResult {
    let input_rows = records.len();
    let kept: Vec<Record> = records
        .into_iter()
        .filter(|record| config.conditions.iter().all(|cond| matches(record, cond)))
        .collect();
    TransformationResult::new(kept, input_rows, Vec::new())
}

fn matches(record: &Record, cond: &FilterCondition) -> bool {
    let actual = record.get(&cond.field);

    match cond.operator {
        FilterOperator::IsNull => actual.map_or(true, Value::is_null),
        FilterOperator::IsNotNull => actual.is_some_and(|v| !v.is_null()),
        _ => {
            // The remaining operators need a present, non-null value.
            let Some(actual) = actual.filter(|v| !v.is_null()) else {
                return false;
            };
            match cond.operator {
                FilterOperator::Eq => loose_eq(actual, &cond.value),
                FilterOperator::Neq => !loose_eq(actual, &cond.value),
                FilterOperator::Gt => ordered(actual, &cond.value, Ordering::is_gt),
                FilterOperator::Gte => ordered(actual, &cond.value, Ordering::is_ge),
                FilterOperator::Lt => ordered(actual, &cond.value, Ordering::is_lt),
                FilterOperator::Lte => ordered(actual, &cond.value, Ordering::is_le),
                FilterOperator::Contains => contains(actual, &cond.value),
                FilterOperator::StartsWith => {
                    str_pair(actual, &cond.value).is_some_and(|(a, b)| a.starts_with(b))
                }
                FilterOperator::EndsWith => {
                    str_pair(actual, &cond.value).is_some_and(|(a, b)| a.ends_with(b))
                }
                FilterOperator::In => match &cond.value {
                    Value::Array(members) => members.iter().any(|m| loose_eq(actual, m)),
                    _ => false,
                },
                FilterOperator::IsNull | FilterOperator::IsNotNull => unreachable!(),
            }
        }
    }
}

/// Equality comparing numbers through `f64` so `1` equals `1.0`.
fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => (x - y).abs() < f64::EPSILON,
            _ => x == y,
        },
        _ => a == b,
    }
}

fn ordered(a: &Value, b: &Value, check: impl Fn(Ordering) -> bool) -> bool {
    compare(a, b).is_some_and(check)
}

/// Numbers (and numeric strings on the condition side) compare
/// numerically; strings compare lexicographically. Other combinations
/// are incomparable and fail the condition.
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    if a.is_number() || b.is_number() {
        let x = value_as_number(a)?;
        let y = value_as_number(b)?;
        return x.partial_cmp(&y);
    }
    match (a, b) {
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn contains(actual: &Value, expected: &Value) -> bool {
    match actual {
        Value::String(haystack) => match expected {
            Value::String(needle) => haystack.contains(needle.as_str()),
            _ => false,
        },
        Value::Array(members) => members.iter().any(|m| loose_eq(m, expected)),
        _ => false,
    }
}

fn str_pair<'a>(a: &'a Value, b: &'a Value) -> Option<(&'a str, &'a str)> {
    Some((a.as_str()?, b.as_str()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(fields: &[(&str, Value)]) -> Record {
        fields
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    fn condition(field: &str, operator: FilterOperator, value: Value) -> FilterCondition {
        FilterCondition {
            field: field.to_string(),
            operator,
            value,
        }
    }

    fn run(conditions: Vec<FilterCondition>, records: Vec<Record>) -> Vec<Record> {
        apply(&FilterConfig { conditions }, records).records
    }

    #[test]
    fn test_gt_preserves_order() {
        let kept = run(
            vec![condition("x", FilterOperator::Gt, json!(5))],
            vec![
                record(&[("x", json!(3))]),
                record(&[("x", json!(7))]),
                record(&[("x", json!(10))]),
            ],
        );

        let xs: Vec<i64> = kept.iter().map(|r| r["x"].as_i64().unwrap()).collect();
        assert_eq!(xs, vec![7, 10]);
    }

    #[test]
    fn test_conditions_combine_with_and() {
        let kept = run(
            vec![
                condition("x", FilterOperator::Gte, json!(2)),
                condition("x", FilterOperator::Lt, json!(4)),
            ],
            vec![
                record(&[("x", json!(1))]),
                record(&[("x", json!(2))]),
                record(&[("x", json!(3))]),
                record(&[("x", json!(4))]),
            ],
        );

        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_eq_and_neq() {
        let records = vec![
            record(&[("status", json!("active"))]),
            record(&[("status", json!("paused"))]),
        ];

        let kept = run(
            vec![condition("status", FilterOperator::Eq, json!("active"))],
            records.clone(),
        );
        assert_eq!(kept.len(), 1);

        let kept = run(
            vec![condition("status", FilterOperator::Neq, json!("active"))],
            records,
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0]["status"], json!("paused"));
    }

    #[test]
    fn test_eq_is_numeric_across_representations() {
        let kept = run(
            vec![condition("x", FilterOperator::Eq, json!(1.0))],
            vec![record(&[("x", json!(1))])],
        );
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_string_operators() {
        let records = vec![
            record(&[("name", json!("flowforge"))]),
            record(&[("name", json!("other"))]),
        ];

        assert_eq!(
            run(
                vec![condition("name", FilterOperator::Contains, json!("forge"))],
                records.clone(),
            )
            .len(),
            1
        );
        assert_eq!(
            run(
                vec![condition("name", FilterOperator::StartsWith, json!("flow"))],
                records.clone(),
            )
            .len(),
            1
        );
        assert_eq!(
            run(
                vec![condition("name", FilterOperator::EndsWith, json!("forge"))],
                records,
            )
            .len(),
            1
        );
    }

    #[test]
    fn test_contains_on_arrays() {
        let kept = run(
            vec![condition("tags", FilterOperator::Contains, json!("etl"))],
            vec![
                record(&[("tags", json!(["etl", "nightly"]))]),
                record(&[("tags", json!(["adhoc"]))]),
            ],
        );
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_null_operators() {
        let records = vec![
            record(&[("v", Value::Null)]),
            record(&[("v", json!(1))]),
            record(&[]),
        ];

        let nulls = run(
            vec![condition("v", FilterOperator::IsNull, Value::Null)],
            records.clone(),
        );
        assert_eq!(nulls.len(), 2);

        let present = run(
            vec![condition("v", FilterOperator::IsNotNull, Value::Null)],
            records,
        );
        assert_eq!(present.len(), 1);
    }

    #[test]
    fn test_in_operator() {
        let kept = run(
            vec![condition(
                "region",
                FilterOperator::In,
                json!(["eu", "us"]),
            )],
            vec![
                record(&[("region", json!("eu"))]),
                record(&[("region", json!("apac"))]),
                record(&[("region", json!("us"))]),
            ],
        );
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_missing_field_fails_comparisons() {
        let kept = run(
            vec![condition("x", FilterOperator::Gt, json!(0))],
            vec![record(&[("y", json!(5))])],
        );
        assert!(kept.is_empty());
    }

    #[test]
    fn test_incomparable_types_fail_the_condition() {
        let kept = run(
            vec![condition("x", FilterOperator::Lt, json!(10))],
            vec![record(&[("x", json!("abc"))])],
        );
        assert!(kept.is_empty());
    }

    #[test]
    fn test_metadata_accounts_dropped() {
        let result = apply(
            &FilterConfig {
                conditions: vec![condition("x", FilterOperator::Gt, json!(5))],
            },
            vec![record(&[("x", json!(3))]), record(&[("x", json!(7))])],
        );
        assert_eq!(result.metadata.input_rows, 2);
        assert_eq!(result.metadata.output_rows, 1);
        assert_eq!(result.metadata.dropped_rows, 1);
    }
}
