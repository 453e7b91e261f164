use observability::ItemMetrics;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use crate::coerce::{as_object, coerce_flag, coerce_name, coerce_new_item, coerce_note, coerce_value};
use crate::error::{ItemError, ItemResult};
use crate::filter::SearchFilter;
use crate::models::{AddParams, ColumnInfo, Item, ItemStats, NewItem, SearchParams, SeedOutcome};
use crate::patch::UpdateClause;
use crate::repository::ItemRepository;

/// Item Store Accessor: coerces untyped input and runs it against a repository
#[derive(Clone)]
pub struct ItemService<R: ItemRepository> {
    repository: Arc<R>,
}

/// Record outcome and latency of one accessor call
async fn observe<T, F>(operation: &'static str, fut: F) -> ItemResult<T>
where
    F: Future<Output = ItemResult<T>>,
{
    let start = Instant::now();
    let result = fut.await;
    let outcome = match &result {
        Ok(_) => "ok",
        Err(e) => e.kind(),
    };
    ItemMetrics::record_operation(operation, outcome, start.elapsed().as_secs_f64());
    result
}

impl<R: ItemRepository> ItemService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create from a JSON body
    pub async fn create_item(&self, body: &Value) -> ItemResult<Item> {
        observe("create", async {
            let input = coerce_new_item(body)?;
            self.repository.create(input).await
        })
        .await
    }

    /// Create from query parameters (`?name=&value=&note=`)
    pub async fn add_item(&self, params: &AddParams) -> ItemResult<Item> {
        observe("create", async {
            let blank_name = params.name.as_deref().map(str::trim).unwrap_or_default().is_empty();
            if blank_name || params.value.is_none() {
                return Err(ItemError::validation("need ?name=...&value=..."));
            }

            let input = NewItem {
                name: coerce_name(params.name.as_deref())?,
                value: coerce_value(params.value.as_deref())?,
                note: coerce_note(params.note.as_deref()),
            };
            self.repository.create(input).await
        })
        .await
    }

    pub async fn get_item(&self, id: i64) -> ItemResult<Item> {
        observe("read", async {
            self.repository
                .get_by_id(id)
                .await?
                .ok_or(ItemError::NotFound(id))
        })
        .await
    }

    /// All items ordered by id
    pub async fn list_items(&self) -> ItemResult<Vec<Item>> {
        observe("list", self.repository.list()).await
    }

    pub async fn search_items(&self, params: &SearchParams) -> ItemResult<Vec<Item>> {
        observe("search", async {
            let filter = SearchFilter::from_params(params)?;
            self.repository.search(filter).await
        })
        .await
    }

    /// Overwrite name, value and note
    pub async fn replace_item(&self, id: i64, body: &Value) -> ItemResult<Item> {
        observe("replace", async {
            let input = coerce_new_item(body)?;
            self.repository
                .update(id, UpdateClause::replace_all(input))
                .await?
                .ok_or(ItemError::NotFound(id))
        })
        .await
    }

    /// Change only the fields present in `body`
    pub async fn patch_item(&self, id: i64, body: &Value) -> ItemResult<Item> {
        observe("update", async {
            let clause = UpdateClause::from_json(body)?;
            self.repository
                .update(id, clause)
                .await?
                .ok_or(ItemError::NotFound(id))
        })
        .await
    }

    pub async fn delete_item(&self, id: i64) -> ItemResult<()> {
        observe("delete", async {
            if !self.repository.delete(id).await? {
                return Err(ItemError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    pub async fn stats(&self) -> ItemResult<ItemStats> {
        observe("stats", self.repository.stats()).await
    }

    /// Seed from `{"items": [...], "replace": bool}`.
    ///
    /// Every entry is validated before anything is written, so one bad entry
    /// rejects the whole batch.
    pub async fn seed(&self, body: &Value) -> ItemResult<SeedOutcome> {
        observe("seed", async {
            let obj = as_object(body)?;
            let replace = coerce_flag(obj.get("replace"));

            let items = match obj.get("items") {
                None | Some(Value::Null) => Vec::new(),
                Some(Value::Array(entries)) => entries
                    .iter()
                    .map(coerce_new_item)
                    .collect::<ItemResult<Vec<_>>>()?,
                Some(_) => return Err(ItemError::validation("items must be an array")),
            };

            if items.is_empty() {
                return Err(ItemError::validation("no items to insert"));
            }

            let outcome = self.repository.seed(items, replace).await?;
            ItemMetrics::record_seed(outcome.processed, replace);
            Ok(outcome)
        })
        .await
    }

    pub async fn describe_schema(&self) -> ItemResult<Vec<ColumnInfo>> {
        observe("describe_schema", self.repository.describe_schema()).await
    }
}
