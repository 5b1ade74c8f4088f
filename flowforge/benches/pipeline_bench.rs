//! Benchmarks for the record processors.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use flowforge::core::Record;
use flowforge::graph::{
    AggregateConfig, AggregateOp, Aggregation, FilterCondition, FilterConfig, FilterOperator,
    TransformConfig, TransformOp,
};
use flowforge::processors::{aggregate, filter, transform};
use serde_json::json;

fn rows(n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| {
            let mut record = Record::new();
            record.insert("id".to_string(), json!(i));
            record.insert("group".to_string(), json!(i % 10));
            record.insert("value".to_string(), json!(i as f64 * 1.5));
            record
        })
        .collect()
}

fn processor_benchmarks(c: &mut Criterion) {
    let filter_config = FilterConfig {
        conditions: vec![FilterCondition {
            field: "value".to_string(),
            operator: FilterOperator::Gt,
            value: json!(500.0),
        }],
    };
    c.bench_function("filter_1k_rows", |b| {
        b.iter(|| filter::apply(black_box(&filter_config), black_box(rows(1000))))
    });

    let aggregate_config = AggregateConfig {
        group_by: vec!["group".to_string()],
        aggregations: vec![Aggregation {
            field: "value".to_string(),
            operation: AggregateOp::Sum,
            output: None,
        }],
    };
    c.bench_function("aggregate_1k_rows", |b| {
        b.iter(|| aggregate::apply(black_box(&aggregate_config), black_box(rows(1000))))
    });

    let transform_config = TransformConfig {
        operations: vec![TransformOp::Map {
            target: "scaled".to_string(),
            expression: "value * 2 + 1".to_string(),
        }],
    };
    c.bench_function("transform_map_1k_rows", |b| {
        b.iter(|| transform::apply(black_box(&transform_config), black_box(rows(1000))))
    });
}

criterion_group!(benches, processor_benchmarks);
criterion_main!(benches);
