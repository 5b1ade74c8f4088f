//! Typed representation of nodes, edges, and pipeline metadata.

use crate::utils::generate_uuid;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Lifecycle status of a pipeline definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStatus {
    /// Being edited, not eligible for scheduled runs.
    #[default]
    Draft,
    /// Eligible for scheduled and manual runs.
    Active,
    /// Temporarily excluded from scheduled runs.
    Paused,
    /// Flagged by an operator after repeated failures.
    Error,
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Active => write!(f, "active"),
            Self::Paused => write!(f, "paused"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// 2-D canvas position. A UI concern carried through the model; the
/// engine never consults it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

/// Cron-based run schedule, evaluated by an external trigger.
///
/// The engine performs no cron parsing. Trigger implementations must
/// surface parse failures to operators instead of silently skipping the
/// pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Cron expression, five-field.
    pub cron: String,
    /// IANA timezone name the expression is evaluated in.
    pub timezone: String,
    /// Whether the schedule is currently active.
    pub enabled: bool,
}

/// Kinds of external systems a source node can read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Relational or document database.
    Database,
    /// REST or similar remote API.
    Api,
    /// Local or remote file.
    File,
    /// Third-party SaaS integration.
    Integration,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Database => write!(f, "database"),
            Self::Api => write!(f, "api"),
            Self::File => write!(f, "file"),
            Self::Integration => write!(f, "integration"),
        }
    }
}

/// Kinds of external systems a destination node can write to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DestinationKind {
    /// Relational or document database.
    Database,
    /// REST or similar remote API.
    Api,
    /// Local or remote file.
    File,
    /// Analytical data warehouse.
    Warehouse,
}

impl fmt::Display for DestinationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Database => write!(f, "database"),
            Self::Api => write!(f, "api"),
            Self::File => write!(f, "file"),
            Self::Warehouse => write!(f, "warehouse"),
        }
    }
}

/// Configuration for a source node. `options` is interpreted by the
/// connector adapter registered for `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Which connector family fetches the records.
    pub kind: SourceKind,
    /// Adapter-specific options, passed through verbatim.
    #[serde(default)]
    pub options: Value,
}

/// Configuration for a destination node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationConfig {
    /// Which connector family receives the records.
    pub kind: DestinationKind,
    /// Adapter-specific options, passed through verbatim.
    #[serde(default)]
    pub options: Value,
}

/// Target type of a convert operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvertType {
    /// Render the value as a string.
    String,
    /// Parse the value as a number.
    Number,
    /// Parse the value as a boolean.
    Boolean,
    /// Parse the value as a date, normalized to ISO 8601.
    Date,
}

/// One operation in a transform node, applied to every record in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TransformOp {
    /// Move a value to a new field name, removing the old one.
    Rename {
        /// Field to move.
        field: String,
        /// Name the value lands under.
        new_name: String,
    },
    /// Assign a field to the result of a row-scoped expression.
    Map {
        /// Field assigned.
        target: String,
        /// Expression in the restricted row language.
        expression: String,
    },
    /// Coerce a field to the given type.
    Convert {
        /// Field to coerce.
        field: String,
        /// Target type.
        to: ConvertType,
    },
    /// Apply a regular expression; the first capture group wins, else
    /// the whole match.
    Extract {
        /// Field the pattern runs against.
        field: String,
        /// Regular expression.
        pattern: String,
        /// Field the extracted value lands in; defaults to `field`.
        #[serde(default)]
        target: Option<String>,
    },
    /// Join several field values with a separator into a new field.
    Concatenate {
        /// Fields to join, in order.
        fields: Vec<String>,
        /// Separator between values.
        separator: String,
        /// Field the joined string lands in.
        target: String,
    },
    /// Split a field by a separator into several named target fields.
    Split {
        /// Field to split.
        field: String,
        /// Separator to split on.
        separator: String,
        /// Fields the parts land in; missing parts become null.
        targets: Vec<String>,
    },
}

/// Configuration for a transform node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformConfig {
    /// Operations applied to every record, in order.
    pub operations: Vec<TransformOp>,
}

/// Comparison operators available to filter conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    /// Equal.
    Eq,
    /// Not equal.
    Neq,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// String or array containment.
    Contains,
    /// String prefix match.
    StartsWith,
    /// String suffix match.
    EndsWith,
    /// Field is null or absent.
    IsNull,
    /// Field is present and non-null.
    IsNotNull,
    /// Field value is a member of the configured array.
    In,
}

impl FilterOperator {
    /// Stable identifier used in the node catalog.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Contains => "contains",
            Self::StartsWith => "starts_with",
            Self::EndsWith => "ends_with",
            Self::IsNull => "is_null",
            Self::IsNotNull => "is_not_null",
            Self::In => "in",
        }
    }
}

/// One condition of a filter node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterCondition {
    /// Field the condition inspects.
    pub field: String,
    /// Comparison operator.
    pub operator: FilterOperator,
    /// Comparison operand; unused by `is_null`/`is_not_null`.
    #[serde(default)]
    pub value: Value,
}

/// Configuration for a filter node. Conditions combine with logical AND.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// All conditions a record must satisfy to survive.
    pub conditions: Vec<FilterCondition>,
}

/// Aggregation operations over a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateOp {
    /// Numeric sum.
    Sum,
    /// Numeric mean.
    Avg,
    /// Minimum value.
    Min,
    /// Maximum value.
    Max,
    /// Count of non-null values.
    Count,
    /// Count of distinct non-null values.
    CountDistinct,
    /// First non-null value encountered.
    First,
    /// Last non-null value encountered.
    Last,
}

impl AggregateOp {
    /// Stable identifier, also the suffix of default output names.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Avg => "avg",
            Self::Min => "min",
            Self::Max => "max",
            Self::Count => "count",
            Self::CountDistinct => "count_distinct",
            Self::First => "first",
            Self::Last => "last",
        }
    }
}

/// One aggregation computed per group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Aggregation {
    /// Field the operation runs over.
    pub field: String,
    /// The reducer.
    pub operation: AggregateOp,
    /// Output field name; defaults to `<field>_<operation>`.
    #[serde(default)]
    pub output: Option<String>,
}

impl Aggregation {
    /// The field name the aggregated value lands under.
    #[must_use]
    pub fn output_field(&self) -> String {
        self.output
            .clone()
            .unwrap_or_else(|| format!("{}_{}", self.field, self.operation.as_str()))
    }
}

/// Configuration for an aggregate node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateConfig {
    /// Fields whose values form the group key, in order.
    pub group_by: Vec<String>,
    /// Aggregations computed per group.
    pub aggregations: Vec<Aggregation>,
}

/// Join variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinType {
    /// Keep only rows with a match on both sides.
    #[default]
    Inner,
    /// Keep every left row, matched or not.
    Left,
}

fn default_right_prefix() -> String {
    "right_".to_string()
}

/// Configuration for a join node.
///
/// The left input is the first incoming edge in declaration order, the
/// right input the second. Right-side non-key fields whose names collide
/// with left-side fields are inserted under `right_prefix`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinConfig {
    /// Key field on the left input.
    pub left_key: String,
    /// Key field on the right input.
    pub right_key: String,
    /// Join variant.
    #[serde(default)]
    pub join_type: JoinType,
    /// Prefix applied to colliding right-side field names.
    #[serde(default = "default_right_prefix")]
    pub right_prefix: String,
}

/// Node behavior together with its type-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "config", rename_all = "snake_case")]
pub enum NodeKind {
    /// Reads records from an external system.
    Source(SourceConfig),
    /// Rewrites each record independently.
    Transform(TransformConfig),
    /// Drops records that fail the configured conditions.
    Filter(FilterConfig),
    /// Collapses records into per-group summaries.
    Aggregate(AggregateConfig),
    /// Merges two inputs on key fields.
    Join(JoinConfig),
    /// Writes records to an external system.
    Destination(DestinationConfig),
}

impl NodeKind {
    /// Stable identifier of the node kind.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Source(_) => "source",
            Self::Transform(_) => "transform",
            Self::Filter(_) => "filter",
            Self::Aggregate(_) => "aggregate",
            Self::Join(_) => "join",
            Self::Destination(_) => "destination",
        }
    }

    /// Returns true for source nodes.
    #[must_use]
    pub fn is_source(&self) -> bool {
        matches!(self, Self::Source(_))
    }

    /// Returns true for destination nodes.
    #[must_use]
    pub fn is_destination(&self) -> bool {
        matches!(self, Self::Destination(_))
    }
}

/// One processing step in a pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique id within the pipeline.
    pub id: Uuid,
    /// Display name, used in error messages.
    pub name: String,
    /// Behavior and configuration.
    #[serde(flatten)]
    pub kind: NodeKind,
    /// Canvas position, UI only.
    #[serde(default)]
    pub position: Position,
}

impl Node {
    /// Creates a node with a fresh id.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: generate_uuid(),
            name: name.into(),
            kind,
            position: Position::default(),
        }
    }

    /// Sets the canvas position.
    #[must_use]
    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = Position { x, y };
        self
    }
}

/// A declared data-flow dependency from one node's output to another's
/// input. Both ids must reference nodes present in the same pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// Unique id within the pipeline.
    pub id: Uuid,
    /// The producing node.
    pub source: Uuid,
    /// The consuming node.
    pub target: Uuid,
    /// Output port on the source, for multi-port nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    /// Input port on the target, for multi-port nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
}

impl Edge {
    /// Creates an edge with a fresh id.
    #[must_use]
    pub fn new(source: Uuid, target: Uuid) -> Self {
        Self {
            id: generate_uuid(),
            source,
            target,
            source_handle: None,
            target_handle: None,
        }
    }
}

/// A user-authored directed graph of processing nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipeline {
    /// Unique id.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Optional free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Processing nodes. Declaration order is the scheduler tie-break.
    pub nodes: Vec<Node>,
    /// Data-flow edges. Declaration order drives input concatenation.
    pub edges: Vec<Edge>,
    /// Optional cron schedule, evaluated externally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Schedule>,
    /// Lifecycle status.
    #[serde(default)]
    pub status: PipelineStatus,
}

impl Pipeline {
    /// Creates an empty draft pipeline with a fresh id.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: generate_uuid(),
            name: name.into(),
            description: None,
            nodes: Vec::new(),
            edges: Vec::new(),
            schedule: None,
            status: PipelineStatus::Draft,
        }
    }

    /// Looks up a node by id.
    #[must_use]
    pub fn node(&self, id: Uuid) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }
}
