//! Static, versioned catalog of node kinds for UI consumption.
//!
//! Carries no runtime logic; the engine never reads it.

use crate::graph::{AggregateOp, FilterOperator};
use serde::Serialize;

/// Catalog schema version, bumped when entries change shape.
pub const CATALOG_VERSION: &str = "1";

/// One configuration field of a node kind.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigField {
    /// Field name as it appears in the node config.
    pub name: &'static str,
    /// Short human description.
    pub description: &'static str,
    /// Whether the field must be present.
    pub required: bool,
}

/// Description of one node kind.
#[derive(Debug, Clone, Serialize)]
pub struct NodeKindInfo {
    /// Stable kind identifier.
    pub kind: &'static str,
    /// Short human description.
    pub description: &'static str,
    /// Configuration fields the kind accepts.
    pub config_fields: Vec<ConfigField>,
}

/// The complete node catalog.
#[derive(Debug, Clone, Serialize)]
pub struct NodeCatalog {
    /// Catalog schema version.
    pub version: &'static str,
    /// Available node kinds.
    pub kinds: Vec<NodeKindInfo>,
    /// Operators a filter condition may use.
    pub filter_operators: Vec<&'static str>,
    /// Operations an aggregation may use.
    pub aggregate_operations: Vec<&'static str>,
}

fn field(name: &'static str, description: &'static str, required: bool) -> ConfigField {
    ConfigField {
        name,
        description,
        required,
    }
}

/// Builds the catalog.
#[must_use]
pub fn catalog() -> NodeCatalog {
    NodeCatalog {
        version: CATALOG_VERSION,
        kinds: vec![
            NodeKindInfo {
                kind: "source",
                description: "Reads records from an external system",
                config_fields: vec![
                    field("kind", "Connector family: database, api, file, integration", true),
                    field("options", "Adapter-specific connection options", false),
                ],
            },
            NodeKindInfo {
                kind: "transform",
                description: "Rewrites each record independently",
                config_fields: vec![field(
                    "operations",
                    "Ordered list of rename/map/convert/extract/concatenate/split operations",
                    true,
                )],
            },
            NodeKindInfo {
                kind: "filter",
                description: "Drops records failing the configured conditions",
                config_fields: vec![field(
                    "conditions",
                    "Conditions combined with logical AND",
                    true,
                )],
            },
            NodeKindInfo {
                kind: "aggregate",
                description: "Collapses records into per-group summaries",
                config_fields: vec![
                    field("group_by", "Fields whose values form the group key", true),
                    field("aggregations", "Reducers computed per group", true),
                ],
            },
            NodeKindInfo {
                kind: "join",
                description: "Merges two inputs on key fields",
                config_fields: vec![
                    field("left_key", "Key field on the first input", true),
                    field("right_key", "Key field on the second input", true),
                    field("join_type", "inner or left; defaults to inner", false),
                    field(
                        "right_prefix",
                        "Prefix for colliding right-side field names",
                        false,
                    ),
                ],
            },
            NodeKindInfo {
                kind: "destination",
                description: "Writes records to an external system",
                config_fields: vec![
                    field("kind", "Connector family: database, api, file, warehouse", true),
                    field("options", "Adapter-specific connection options", false),
                ],
            },
        ],
        filter_operators: [
            FilterOperator::Eq,
            FilterOperator::Neq,
            FilterOperator::Gt,
            FilterOperator::Gte,
            FilterOperator::Lt,
            FilterOperator::Lte,
            FilterOperator::Contains,
            FilterOperator::StartsWith,
            FilterOperator::EndsWith,
            FilterOperator::IsNull,
            FilterOperator::IsNotNull,
            FilterOperator::In,
        ]
        .iter()
        .map(|op| op.as_str())
        .collect(),
        aggregate_operations: [
            AggregateOp::Sum,
            AggregateOp::Avg,
            AggregateOp::Min,
            AggregateOp::Max,
            AggregateOp::Count,
            AggregateOp::CountDistinct,
            AggregateOp::First,
            AggregateOp::Last,
        ]
        .iter()
        .map(|op| op.as_str())
        .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_covers_all_kinds() {
        let catalog = catalog();
        let kinds: Vec<&str> = catalog.kinds.iter().map(|k| k.kind).collect();
        assert_eq!(
            kinds,
            vec!["source", "transform", "filter", "aggregate", "join", "destination"]
        );
    }

    #[test]
    fn test_catalog_lists_operators() {
        let catalog = catalog();
        assert_eq!(catalog.filter_operators.len(), 12);
        assert_eq!(catalog.aggregate_operations.len(), 8);
        assert!(catalog.filter_operators.contains(&"starts_with"));
        assert!(catalog.aggregate_operations.contains(&"count_distinct"));
    }

    #[test]
    fn test_catalog_serializes() {
        let value = serde_json::to_value(catalog()).unwrap();
        assert_eq!(value["version"], "1");
        assert!(value["kinds"].as_array().unwrap().len() == 6);
    }
}
