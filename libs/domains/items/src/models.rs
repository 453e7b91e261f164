use chrono::{DateTime, Utc};
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// A stored item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Item {
    /// Server-assigned identifier, never reused
    pub id: i64,
    /// Unique, non-empty name
    pub name: String,
    /// Non-negative value
    pub value: f64,
    pub note: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated fields for an insert, full replace or seed entry
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub name: String,
    pub value: f64,
    pub note: String,
}

/// Request body documented for create and replace.
///
/// Bodies are accepted as loose JSON and coerced, so `value` may also be
/// sent as a numeric string.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ItemInput {
    #[schema(example = "apple")]
    pub name: String,
    #[schema(example = 12.5)]
    pub value: f64,
    #[serde(default)]
    pub note: Option<String>,
}

/// Request body documented for partial update; at least one field required
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub value: Option<f64>,
    pub note: Option<String>,
}

/// Request body documented for seed loads
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SeedRequest {
    pub items: Vec<ItemInput>,
    /// Clear the table (and reset ids) before loading
    #[serde(default)]
    pub replace: bool,
}

/// Result of a seed load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SeedOutcome {
    /// Entries written by this load
    pub processed: u64,
    /// Rows in the store after the load
    pub total: u64,
}

/// Aggregates over `value`; all zero on an empty store
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema, FromQueryResult)]
pub struct ItemStats {
    pub count: i64,
    pub sum: f64,
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

/// One column of the backing table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, FromQueryResult)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    #[serde(rename = "default")]
    pub column_default: Option<String>,
}

/// Raw search query parameters, coerced into a [`crate::filter::SearchFilter`]
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Case-insensitive substring of the name
    pub name: Option<String>,
    /// Inclusive lower bound on value
    pub min_value: Option<String>,
    /// Inclusive upper bound on value
    pub max_value: Option<String>,
    /// Result cap, clamped to [1, 100]
    pub limit: Option<String>,
}

/// Query parameters of the text insert endpoint
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AddParams {
    pub name: Option<String>,
    pub value: Option<String>,
    pub note: Option<String>,
}
