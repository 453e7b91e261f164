//! Integration tests for the Items domain
//!
//! These tests use real PostgreSQL via testcontainers to ensure:
//! - Queries built by the filter and patch modules run as intended
//! - The unique name and non-negative value constraints are enforced
//! - Seed loads are atomic and replace resets ids

use domain_items::*;
use test_utils::{TestDataBuilder, TestDatabase, assertions::*};

fn new_item(name: impl Into<String>, value: f64) -> NewItem {
    NewItem {
        name: name.into(),
        value,
        note: String::new(),
    }
}

// ============================================================================
// Repository Tests
// ============================================================================

#[tokio::test]
async fn test_create_and_get_item() {
    let db = TestDatabase::new().await;
    let repo = PgItemRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("create_and_get");

    let input = NewItem {
        name: builder.name("item", "main"),
        value: builder.value(0),
        note: "integration".to_string(),
    };

    let created = repo.create(input.clone()).await.unwrap();

    assert!(created.id > 0);
    assert_eq!(created.name, input.name);
    assert_close(created.value, input.value, "value");
    assert_eq!(created.note, "integration");
    assert_eq!(created.created_at, created.updated_at);

    let retrieved = repo.get_by_id(created.id).await.unwrap();
    let retrieved = assert_some(retrieved, "item should exist");
    assert_eq!(retrieved, created);
}

#[tokio::test]
async fn test_ids_are_sequential_and_never_reused() {
    let db = TestDatabase::new().await;
    let repo = PgItemRepository::new(db.connection());

    let first = repo.create(new_item("one", 1.0)).await.unwrap();
    assert!(repo.delete(first.id).await.unwrap());

    let second = repo.create(new_item("two", 2.0)).await.unwrap();
    assert!(second.id > first.id);
}

#[tokio::test]
async fn test_duplicate_name_is_conflict() {
    let db = TestDatabase::new().await;
    let repo = PgItemRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("duplicate_name");
    let name = builder.name("item", "dup");

    repo.create(new_item(&name, 1.0)).await.unwrap();

    let err = repo.create(new_item(&name, 2.0)).await.unwrap_err();
    assert!(matches!(err, ItemError::Conflict(_)), "got {err:?}");
    assert_eq!(err.to_string(), format!("item with name '{}' already exists", name));

    // Names are compared exactly
    repo.create(new_item(name.to_uppercase(), 3.0)).await.unwrap();
}

#[tokio::test]
async fn test_get_missing_item_returns_none() {
    let db = TestDatabase::new().await;
    let repo = PgItemRepository::new(db.connection());

    assert!(repo.get_by_id(999).await.unwrap().is_none());
    assert!(!repo.delete(999).await.unwrap());
}

#[tokio::test]
async fn test_partial_update_touches_only_named_columns() {
    let db = TestDatabase::new().await;
    let repo = PgItemRepository::new(db.connection());

    let created = repo
        .create(NewItem {
            name: "fig".into(),
            value: 5.0,
            note: "dried".into(),
        })
        .await
        .unwrap();

    let clause = UpdateClause::new(vec![Assignment::Value(7.5)]).unwrap();
    let updated = repo.update(created.id, clause).await.unwrap();
    let updated = assert_some(updated, "update should find the row");

    assert_eq!(updated.name, "fig");
    assert_eq!(updated.note, "dried");
    assert_close(updated.value, 7.5, "value");
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > created.updated_at);

    // Back-to-back updates keep moving the timestamp forward
    let clause = UpdateClause::new(vec![Assignment::Note("fresh".into())]).unwrap();
    let again = repo.update(created.id, clause).await.unwrap().unwrap();
    assert!(again.updated_at > updated.updated_at);
}

#[tokio::test]
async fn test_update_missing_item_returns_none() {
    let db = TestDatabase::new().await;
    let repo = PgItemRepository::new(db.connection());

    let clause = UpdateClause::new(vec![Assignment::Note("x".into())]).unwrap();
    assert!(repo.update(42, clause).await.unwrap().is_none());
}

#[tokio::test]
async fn test_rename_onto_existing_name_is_conflict() {
    let db = TestDatabase::new().await;
    let repo = PgItemRepository::new(db.connection());

    repo.create(new_item("apple", 1.0)).await.unwrap();
    let pear = repo.create(new_item("pear", 2.0)).await.unwrap();

    let clause = UpdateClause::new(vec![Assignment::Name("apple".into())]).unwrap();
    let err = repo.update(pear.id, clause).await.unwrap_err();
    assert!(matches!(err, ItemError::Conflict(_)));

    let unchanged = repo.get_by_id(pear.id).await.unwrap().unwrap();
    assert_eq!(unchanged.name, "pear");
}

#[tokio::test]
async fn test_replace_all_overwrites_every_field() {
    let db = TestDatabase::new().await;
    let repo = PgItemRepository::new(db.connection());

    let created = repo
        .create(NewItem {
            name: "kiwi".into(),
            value: 2.0,
            note: "old".into(),
        })
        .await
        .unwrap();

    let clause = UpdateClause::replace_all(new_item("gold kiwi", 4.0));
    let replaced = repo.update(created.id, clause).await.unwrap().unwrap();

    assert_eq!(replaced.id, created.id);
    assert_eq!(replaced.name, "gold kiwi");
    assert_eq!(replaced.note, "");
}

#[tokio::test]
async fn test_search_matches_case_insensitive_substring_and_range() {
    let db = TestDatabase::new().await;
    let repo = PgItemRepository::new(db.connection());

    for (name, value) in [
        ("Red Apple", 4.0),
        ("green apple", 9.0),
        ("pineapple", 9.0),
        ("banana", 20.0),
        ("100%_pure", 1.0),
    ] {
        repo.create(new_item(name, value)).await.unwrap();
    }

    let filter = SearchFilter {
        name_substring: Some("APPLE".into()),
        min_value: Some(5.0),
        ..Default::default()
    };
    let names: Vec<String> = repo
        .search(filter)
        .await
        .unwrap()
        .into_iter()
        .map(|i| i.name)
        .collect();
    // Equal values fall back to id order
    assert_eq!(names, vec!["green apple", "pineapple"]);

    // LIKE wildcards in the needle are matched literally
    let filter = SearchFilter {
        name_substring: Some("%_".into()),
        ..Default::default()
    };
    let found = repo.search(filter).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "100%_pure");

    let filter = SearchFilter {
        limit: 2,
        ..Default::default()
    };
    let top: Vec<f64> = repo
        .search(filter)
        .await
        .unwrap()
        .into_iter()
        .map(|i| i.value)
        .collect();
    assert_eq!(top, vec![20.0, 9.0]);

    let filter = SearchFilter {
        min_value: Some(10.0),
        max_value: Some(1.0),
        ..Default::default()
    };
    assert!(repo.search(filter).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_stats_empty_and_populated() {
    let db = TestDatabase::new().await;
    let repo = PgItemRepository::new(db.connection());

    assert_eq!(repo.stats().await.unwrap(), ItemStats::default());

    for (name, value) in [("a", 1.0), ("b", 2.5), ("c", 5.5)] {
        repo.create(new_item(name, value)).await.unwrap();
    }

    let stats = repo.stats().await.unwrap();
    assert_eq!(stats.count, 3);
    assert_close(stats.sum, 9.0, "sum");
    assert_close(stats.min, 1.0, "min");
    assert_close(stats.max, 5.5, "max");
    assert_close(stats.avg, 3.0, "avg");
}

#[tokio::test]
async fn test_seed_merges_by_name() {
    let db = TestDatabase::new().await;
    let repo = PgItemRepository::new(db.connection());

    let existing = repo.create(new_item("old", 1.0)).await.unwrap();

    let outcome = repo
        .seed(
            vec![
                NewItem {
                    name: "old".into(),
                    value: 10.0,
                    note: "updated".into(),
                },
                new_item("new", 2.0),
                new_item("new", 3.0),
            ],
            false,
        )
        .await
        .unwrap();

    assert_eq!(outcome, SeedOutcome { processed: 3, total: 2 });

    let old = repo.get_by_id(existing.id).await.unwrap().unwrap();
    assert_close(old.value, 10.0, "merged value");
    assert_eq!(old.note, "updated");
    assert_eq!(old.created_at, existing.created_at);
    assert!(old.updated_at > existing.updated_at);

    let items = repo.list().await.unwrap();
    let new = items.iter().find(|i| i.name == "new").unwrap();
    assert_close(new.value, 3.0, "last duplicate wins");
}

#[tokio::test]
async fn test_seed_replace_resets_ids() {
    let db = TestDatabase::new().await;
    let repo = PgItemRepository::new(db.connection());

    for name in ["a", "b", "c"] {
        repo.create(new_item(name, 1.0)).await.unwrap();
    }

    let outcome = repo
        .seed(vec![new_item("x", 1.0), new_item("y", 2.0)], true)
        .await
        .unwrap();
    assert_eq!(outcome, SeedOutcome { processed: 2, total: 2 });

    let ids: Vec<i64> = repo.list().await.unwrap().iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[tokio::test]
async fn test_seed_failure_leaves_store_untouched() {
    let db = TestDatabase::new().await;
    let repo = PgItemRepository::new(db.connection());

    repo.create(new_item("keep", 1.0)).await.unwrap();

    // Negative values slip past the repository but violate the table check
    let result = repo
        .seed(vec![new_item("fresh", 1.0), new_item("broken", -1.0)], true)
        .await;
    assert!(result.is_err());

    let names: Vec<String> = repo.list().await.unwrap().into_iter().map(|i| i.name).collect();
    assert_eq!(names, vec!["keep"]);
}

#[tokio::test]
async fn test_describe_schema_reports_columns() {
    let db = TestDatabase::new().await;
    let repo = PgItemRepository::new(db.connection());

    let columns = repo.describe_schema().await.unwrap();
    let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["id", "name", "value", "note", "created_at", "updated_at"]
    );

    let value = columns.iter().find(|c| c.name == "value").unwrap();
    assert_eq!(value.data_type, "double precision");
    assert!(!value.nullable);

    let id = columns.iter().find(|c| c.name == "id").unwrap();
    assert!(id.column_default.as_deref().unwrap_or_default().starts_with("nextval"));
}

// ============================================================================
// Service Tests
// ============================================================================

#[tokio::test]
async fn test_service_patch_from_json_against_postgres() {
    let db = TestDatabase::new().await;
    let service = ItemService::new(PgItemRepository::new(db.connection()));

    let created = service
        .create_item(&serde_json::json!({"name": "plum", "value": "4"}))
        .await
        .unwrap();

    let patched = service
        .patch_item(created.id, &serde_json::json!({"note": "ripe", "value": 6}))
        .await
        .unwrap();
    assert_eq!(patched.note, "ripe");
    assert_close(patched.value, 6.0, "value");

    let err = service
        .patch_item(created.id + 100, &serde_json::json!({"note": "x"}))
        .await
        .unwrap_err();
    assert!(matches!(err, ItemError::NotFound(_)));
}

#[tokio::test]
async fn test_concurrent_inserts_with_same_name() {
    let db = TestDatabase::new().await;
    let repo = PgItemRepository::new(db.connection());

    let handles: Vec<_> = (0..5)
        .map(|i| {
            let repo = repo.clone();
            tokio::spawn(async move { repo.create(new_item("contended", i as f64)).await })
        })
        .collect();

    let results: Vec<_> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let created = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(ItemError::Conflict(_))))
        .count();
    assert_eq!(created, 1);
    assert_eq!(conflicts, 4);
}
