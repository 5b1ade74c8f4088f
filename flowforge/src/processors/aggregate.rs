//! The aggregate processor: grouped reduction over a record list.

use crate::core::{value_as_number, value_key, Record, TransformationResult};
use crate::graph::{AggregateConfig, AggregateOp, Aggregation};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Groups records by the configured field values and computes the
/// configured aggregations per group.
///
/// The group key is the ordered concatenation of the group-by values.
/// Output carries one record per group, in first-encountered order,
/// with the group-by fields plus the aggregated values. Null and
/// missing values are excluded from every computation.
#[must_use]
pub fn apply(config: &AggregateConfig, records: Vec<Record>) -> TransformationResult {
    let input_rows = records.len();

    // First-encountered group order, independent of hashing.
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<Record>> = HashMap::new();
    for record in records {
        let key = group_key(&record, &config.group_by);
        if !groups.contains_key(&key) {
            order.push(key.clone());
        }
        groups.entry(key).or_default().push(record);
    }

    let mut output = Vec::with_capacity(order.len());
    for key in order {
        let members = &groups[&key];
        let mut row = Record::new();
        for field in &config.group_by {
            row.insert(
                field.clone(),
                members[0].get(field).cloned().unwrap_or(Value::Null),
            );
        }
        for agg in &config.aggregations {
            row.insert(agg.output_field(), reduce(agg, members));
        }
        output.push(row);
    }

    TransformationResult::new(output, input_rows, Vec::new())
}

fn group_key(record: &Record, group_by: &[String]) -> String {
    group_by
        .iter()
        .map(|field| value_key(record.get(field).unwrap_or(&Value::Null)))
        .collect::<Vec<_>>()
        .join("\u{1f}")
}

fn reduce(agg: &Aggregation, members: &[Record]) -> Value {
    let values: Vec<&Value> = members
        .iter()
        .filter_map(|r| r.get(&agg.field))
        .filter(|v| !v.is_null())
        .collect();

    match agg.operation {
        AggregateOp::Sum => Value::from(numeric(&values).sum::<f64>()),
        AggregateOp::Avg => {
            let nums: Vec<f64> = numeric(&values).collect();
            if nums.is_empty() {
                Value::Null
            } else {
                Value::from(nums.iter().sum::<f64>() / nums.len() as f64)
            }
        }
        AggregateOp::Min => extremum(&values, |a, b| a < b),
        AggregateOp::Max => extremum(&values, |a, b| a > b),
        AggregateOp::Count => Value::from(values.len() as u64),
        AggregateOp::CountDistinct => {
            let distinct: HashSet<String> = values.iter().map(|v| value_key(v)).collect();
            Value::from(distinct.len() as u64)
        }
        AggregateOp::First => values.first().copied().cloned().unwrap_or(Value::Null),
        AggregateOp::Last => values.last().copied().cloned().unwrap_or(Value::Null),
    }
}

fn numeric<'a>(values: &'a [&'a Value]) -> impl Iterator<Item = f64> + 'a {
    values.iter().filter_map(|v| value_as_number(v))
}

/// Numeric extremum when any value is numeric, otherwise lexicographic
/// over string values.
fn extremum(values: &[&Value], wins: impl Fn(f64, f64) -> bool) -> Value {
    let mut best_num: Option<f64> = None;
    for n in values.iter().filter_map(|v| value_as_number(v)) {
        best_num = Some(match best_num {
            Some(current) if !wins(n, current) => current,
            _ => n,
        });
    }
    if let Some(n) = best_num {
        return Value::from(n);
    }

    let mut best_str: Option<&str> = None;
    for s in values.iter().filter_map(|v| v.as_str()) {
        best_str = Some(match best_str {
            // Reuse the numeric comparator's direction via string ordering.
            Some(current) if !string_wins(s, current, &wins) => current,
            _ => s,
        });
    }
    best_str.map_or(Value::Null, |s| Value::String(s.to_string()))
}

fn string_wins(a: &str, b: &str, wins: &impl Fn(f64, f64) -> bool) -> bool {
    // Map the direction: wins(0,1) is true for min, false for max.
    if wins(0.0, 1.0) {
        a < b
    } else {
        a > b
    }
}
