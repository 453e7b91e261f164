//! Filter query composer for item search.

use sea_orm::sea_query::{Expr, ExprTrait, Func};
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Select};

use crate::coerce::{coerce_bound, coerce_limit};
use crate::entity;
use crate::error::ItemResult;
use crate::models::{Item, SearchParams};

pub const DEFAULT_SEARCH_LIMIT: u64 = 20;

/// Conjunction of optional predicates plus a result cap.
///
/// Absent predicates place no constraint on their axis. Results are ordered
/// by value descending, then id ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchFilter {
    /// Case-insensitive substring of the name
    pub name_substring: Option<String>,
    /// Inclusive lower bound
    pub min_value: Option<f64>,
    /// Inclusive upper bound
    pub max_value: Option<f64>,
    pub limit: u64,
}

impl Default for SearchFilter {
    fn default() -> Self {
        Self {
            name_substring: None,
            min_value: None,
            max_value: None,
            limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

impl SearchFilter {
    pub fn from_params(params: &SearchParams) -> ItemResult<Self> {
        // Blank means no constraint; otherwise the needle is matched as given
        let name_substring = params
            .name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string);

        Ok(Self {
            name_substring,
            min_value: coerce_bound(params.min_value.as_deref(), "min_value")?,
            max_value: coerce_bound(params.max_value.as_deref(), "max_value")?,
            limit: coerce_limit(params.limit.as_deref(), DEFAULT_SEARCH_LIMIT),
        })
    }

    /// True when both bounds are set and cannot be satisfied together
    pub fn is_empty_range(&self) -> bool {
        matches!((self.min_value, self.max_value), (Some(min), Some(max)) if min > max)
    }

    /// In-process evaluation of the predicates, matching the SQL condition
    pub fn matches(&self, item: &Item) -> bool {
        if let Some(ref needle) = self.name_substring {
            if !item.name.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }
        if let Some(min) = self.min_value {
            if item.value < min {
                return false;
            }
        }
        if let Some(max) = self.max_value {
            if item.value > max {
                return false;
            }
        }
        true
    }

    /// Sort and truncate already-matched items the way the SQL query does
    pub fn order_and_truncate(&self, mut items: Vec<Item>) -> Vec<Item> {
        items.sort_by(|a, b| b.value.total_cmp(&a.value).then(a.id.cmp(&b.id)));
        items.truncate(self.limit as usize);
        items
    }

    pub fn condition(&self) -> Condition {
        let mut condition = Condition::all();

        if let Some(ref needle) = self.name_substring {
            let pattern = format!("%{}%", escape_like(&needle.to_lowercase()));
            condition = condition
                .add(Expr::expr(Func::lower(Expr::col((entity::Entity, entity::Column::Name))))
                    .like(pattern));
        }
        if let Some(min) = self.min_value {
            condition = condition.add(entity::Column::Value.gte(min));
        }
        if let Some(max) = self.max_value {
            condition = condition.add(entity::Column::Value.lte(max));
        }

        condition
    }

    /// Filtered, ordered and limited select over items
    pub fn select(&self) -> Select<entity::Entity> {
        entity::Entity::find()
            .filter(self.condition())
            .order_by_desc(entity::Column::Value)
            .order_by_asc(entity::Column::Id)
            .limit(self.limit)
    }
}

/// Escape LIKE wildcards so the needle matches literally
fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
