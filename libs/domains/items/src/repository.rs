use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{ItemError, ItemResult};
use crate::filter::SearchFilter;
use crate::models::{ColumnInfo, Item, ItemStats, NewItem, SeedOutcome};
use crate::patch::{Assignment, UpdateClause};

/// Repository trait for item persistence
///
/// Every method is one logical store operation; multi-row writes are atomic.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Insert a new item; duplicate names fail with `Conflict`
    async fn create(&self, input: NewItem) -> ItemResult<Item>;

    async fn get_by_id(&self, id: i64) -> ItemResult<Option<Item>>;

    /// All items ordered by id
    async fn list(&self) -> ItemResult<Vec<Item>>;

    async fn search(&self, filter: SearchFilter) -> ItemResult<Vec<Item>>;

    /// Apply `clause` and refresh `updated_at`; `None` if the id does not exist
    async fn update(&self, id: i64, clause: UpdateClause) -> ItemResult<Option<Item>>;

    /// Returns false if nothing was deleted
    async fn delete(&self, id: i64) -> ItemResult<bool>;

    async fn stats(&self) -> ItemResult<ItemStats>;

    /// Load `items` in one transaction, upserting on name.
    /// With `replace`, existing rows are removed and ids restart first.
    async fn seed(&self, items: Vec<NewItem>, replace: bool) -> ItemResult<SeedOutcome>;

    /// Column definitions of the backing table
    async fn describe_schema(&self) -> ItemResult<Vec<ColumnInfo>>;
}

#[derive(Debug)]
struct Store {
    items: BTreeMap<i64, Item>,
    next_id: i64,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            items: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl Store {
    fn id_by_name(&self, name: &str) -> Option<i64> {
        self.items
            .values()
            .find(|item| item.name == name)
            .map(|item| item.id)
    }

    fn insert(&mut self, input: NewItem) -> Item {
        let now = Utc::now();
        let item = Item {
            id: self.next_id,
            name: input.name,
            value: input.value,
            note: input.note,
            created_at: now,
            updated_at: now,
        };
        self.next_id += 1;
        self.items.insert(item.id, item.clone());
        item
    }
}

/// Mirrors `GREATEST(now(), updated_at + 1µs)`
fn next_updated_at(previous: DateTime<Utc>) -> DateTime<Utc> {
    Utc::now().max(previous + Duration::microseconds(1))
}

/// In-memory implementation of ItemRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryItemRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryItemRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ItemRepository for InMemoryItemRepository {
    async fn create(&self, input: NewItem) -> ItemResult<Item> {
        let mut store = self.store.write().await;

        if store.id_by_name(&input.name).is_some() {
            return Err(ItemError::duplicate_name(&input.name));
        }

        let item = store.insert(input);
        tracing::info!(item_id = item.id, "Created item");
        Ok(item)
    }

    async fn get_by_id(&self, id: i64) -> ItemResult<Option<Item>> {
        let store = self.store.read().await;
        Ok(store.items.get(&id).cloned())
    }

    async fn list(&self) -> ItemResult<Vec<Item>> {
        let store = self.store.read().await;
        Ok(store.items.values().cloned().collect())
    }

    async fn search(&self, filter: SearchFilter) -> ItemResult<Vec<Item>> {
        let store = self.store.read().await;

        let matched: Vec<Item> = store
            .items
            .values()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect();

        Ok(filter.order_and_truncate(matched))
    }

    async fn update(&self, id: i64, clause: UpdateClause) -> ItemResult<Option<Item>> {
        let mut store = self.store.write().await;

        if !store.items.contains_key(&id) {
            return Ok(None);
        }

        if let Some(new_name) = clause.new_name() {
            if store.id_by_name(new_name).is_some_and(|owner| owner != id) {
                return Err(ItemError::duplicate_name(new_name));
            }
        }

        let Some(item) = store.items.get_mut(&id) else {
            return Ok(None);
        };

        for assignment in clause.into_assignments() {
            match assignment {
                Assignment::Name(name) => item.name = name,
                Assignment::Value(value) => item.value = value,
                Assignment::Note(note) => item.note = note,
            }
        }
        item.updated_at = next_updated_at(item.updated_at);

        tracing::info!(item_id = id, "Updated item");
        Ok(Some(item.clone()))
    }

    async fn delete(&self, id: i64) -> ItemResult<bool> {
        let mut store = self.store.write().await;

        if store.items.remove(&id).is_some() {
            tracing::info!(item_id = id, "Deleted item");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn stats(&self) -> ItemResult<ItemStats> {
        let store = self.store.read().await;

        if store.items.is_empty() {
            return Ok(ItemStats::default());
        }

        let values: Vec<f64> = store.items.values().map(|item| item.value).collect();
        let count = values.len() as i64;
        let sum: f64 = values.iter().sum();

        Ok(ItemStats {
            count,
            sum,
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            avg: sum / count as f64,
        })
    }

    async fn seed(&self, items: Vec<NewItem>, replace: bool) -> ItemResult<SeedOutcome> {
        let mut store = self.store.write().await;

        if replace {
            *store = Store::default();
        }

        let processed = items.len() as u64;
        for input in items {
            match store.id_by_name(&input.name) {
                Some(id) => {
                    if let Some(existing) = store.items.get_mut(&id) {
                        existing.value = input.value;
                        existing.note = input.note;
                        existing.updated_at = next_updated_at(existing.updated_at);
                    }
                }
                None => {
                    store.insert(input);
                }
            }
        }

        let total = store.items.len() as u64;
        tracing::info!(processed, total, replace, "Seeded items");
        Ok(SeedOutcome { processed, total })
    }

    async fn describe_schema(&self) -> ItemResult<Vec<ColumnInfo>> {
        let column = |name: &str, data_type: &str, default: Option<&str>| ColumnInfo {
            name: name.to_string(),
            data_type: data_type.to_string(),
            nullable: false,
            column_default: default.map(str::to_string),
        };

        Ok(vec![
            column("id", "bigint", Some("nextval('items_id_seq'::regclass)")),
            column("name", "text", None),
            column("value", "double precision", None),
            column("note", "text", Some("''::text")),
            column("created_at", "timestamp with time zone", Some("CURRENT_TIMESTAMP")),
            column("updated_at", "timestamp with time zone", Some("CURRENT_TIMESTAMP")),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_item(name: &str, value: f64) -> NewItem {
        NewItem {
            name: name.to_string(),
            value,
            note: String::new(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_item() {
        let repo = InMemoryItemRepository::new();

        let item = repo.create(new_item("apple", 1.5)).await.unwrap();
        assert_eq!(item.id, 1);
        assert_eq!(item.created_at, item.updated_at);

        let fetched = repo.get_by_id(item.id).await.unwrap().unwrap();
        assert_eq!(fetched, item);
    }

    #[tokio::test]
    async fn test_duplicate_name_conflicts() {
        let repo = InMemoryItemRepository::new();
        repo.create(new_item("apple", 1.0)).await.unwrap();

        let err = repo.create(new_item("apple", 2.0)).await.unwrap_err();
        assert!(matches!(err, ItemError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let repo = InMemoryItemRepository::new();
        let first = repo.create(new_item("a", 1.0)).await.unwrap();
        assert!(repo.delete(first.id).await.unwrap());
        assert!(!repo.delete(first.id).await.unwrap());

        let second = repo.create(new_item("b", 1.0)).await.unwrap();
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn test_update_touches_only_given_fields() {
        let repo = InMemoryItemRepository::new();
        let item = repo.create(new_item("apple", 3.0)).await.unwrap();

        let clause = UpdateClause::new(vec![Assignment::Note("x".into())]).unwrap();
        let updated = repo.update(item.id, clause).await.unwrap().unwrap();

        assert_eq!(updated.name, "apple");
        assert_eq!(updated.value, 3.0);
        assert_eq!(updated.note, "x");
        assert!(updated.updated_at > item.updated_at);
        assert_eq!(updated.created_at, item.created_at);
    }

    #[tokio::test]
    async fn test_update_missing_id_returns_none() {
        let repo = InMemoryItemRepository::new();
        let clause = UpdateClause::new(vec![Assignment::Value(1.0)]).unwrap();
        assert!(repo.update(99, clause).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rename_to_existing_name_conflicts() {
        let repo = InMemoryItemRepository::new();
        repo.create(new_item("apple", 1.0)).await.unwrap();
        let pear = repo.create(new_item("pear", 1.0)).await.unwrap();

        let clause = UpdateClause::new(vec![Assignment::Name("apple".into())]).unwrap();
        let err = repo.update(pear.id, clause).await.unwrap_err();
        assert!(matches!(err, ItemError::Conflict(_)));

        // Renaming to its own name is fine
        let clause = UpdateClause::new(vec![Assignment::Name("pear".into())]).unwrap();
        assert!(repo.update(pear.id, clause).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_stats_empty_and_populated() {
        let repo = InMemoryItemRepository::new();
        assert_eq!(repo.stats().await.unwrap(), ItemStats::default());

        repo.create(new_item("a", 10.0)).await.unwrap();
        repo.create(new_item("b", 20.0)).await.unwrap();

        let stats = repo.stats().await.unwrap();
        assert_eq!(
            stats,
            ItemStats {
                count: 2,
                sum: 30.0,
                min: 10.0,
                max: 20.0,
                avg: 15.0
            }
        );
    }

    #[tokio::test]
    async fn test_seed_merge_upserts_by_name() {
        let repo = InMemoryItemRepository::new();
        repo.create(new_item("keep", 1.0)).await.unwrap();

        let outcome = repo
            .seed(
                vec![
                    new_item("dup", 1.0),
                    NewItem {
                        name: "dup".into(),
                        value: 2.0,
                        note: "second".into(),
                    },
                ],
                false,
            )
            .await
            .unwrap();

        assert_eq!(outcome, SeedOutcome { processed: 2, total: 2 });

        let items = repo.list().await.unwrap();
        let dup = items.iter().find(|i| i.name == "dup").unwrap();
        assert_eq!(dup.value, 2.0);
        assert_eq!(dup.note, "second");
    }

    #[tokio::test]
    async fn test_seed_replace_resets_contents_and_ids() {
        let repo = InMemoryItemRepository::new();
        repo.create(new_item("old", 1.0)).await.unwrap();
        repo.create(new_item("older", 1.0)).await.unwrap();

        let outcome = repo
            .seed(vec![new_item("A", 1.0), new_item("B", 2.0)], true)
            .await
            .unwrap();
        assert_eq!(outcome, SeedOutcome { processed: 2, total: 2 });

        let items = repo.list().await.unwrap();
        let summary: Vec<(i64, &str)> = items.iter().map(|i| (i.id, i.name.as_str())).collect();
        assert_eq!(summary, vec![(1, "A"), (2, "B")]);
    }

    #[tokio::test]
    async fn test_search_limits_and_orders() {
        let repo = InMemoryItemRepository::new();
        for (name, value) in [("alpha", 10.0), ("beta", 50.0), ("gamma", 30.0), ("kiwi", 40.0)] {
            repo.create(new_item(name, value)).await.unwrap();
        }

        let filter = SearchFilter {
            name_substring: Some("A".into()),
            min_value: Some(10.0),
            max_value: Some(50.0),
            limit: 2,
        };
        let found = repo.search(filter).await.unwrap();

        let names: Vec<&str> = found.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["beta", "gamma"]);
    }
}
