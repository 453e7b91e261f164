use async_trait::async_trait;
use sea_orm::sea_query::{Expr, OnConflict, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait,
    FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder, Statement, TransactionTrait,
    UpdateMany,
};

use crate::{
    entity,
    error::{ItemError, ItemResult},
    filter::SearchFilter,
    models::{ColumnInfo, Item, ItemStats, NewItem, SeedOutcome},
    patch::{Assignment, UpdateClause},
    repository::ItemRepository,
};

pub const ITEMS_TABLE: &str = "items";

/// `updated_at` always moves strictly forward, even within one clock tick
fn bump_updated_at() -> SimpleExpr {
    Expr::cust("GREATEST(now(), items.updated_at + interval '1 microsecond')")
}

fn assignment_expr(assignment: Assignment) -> (entity::Column, SimpleExpr) {
    match assignment {
        Assignment::Name(name) => (entity::Column::Name, Expr::value(name)),
        Assignment::Value(value) => (entity::Column::Value, Expr::value(value)),
        Assignment::Note(note) => (entity::Column::Note, Expr::value(note)),
    }
}

/// `UPDATE items SET <clause>, updated_at = ... WHERE id = $n`
fn update_statement(id: i64, clause: UpdateClause) -> UpdateMany<entity::Entity> {
    let mut update = entity::Entity::update_many();
    for assignment in clause.into_assignments() {
        let (column, expr) = assignment_expr(assignment);
        update = update.col_expr(column, expr);
    }

    update
        .col_expr(entity::Column::UpdatedAt, bump_updated_at())
        .filter(entity::Column::Id.eq(id))
}

const STATS_SQL: &str = r#"
SELECT COUNT(*)::BIGINT                              AS count,
       COALESCE(SUM(value), 0)::DOUBLE PRECISION     AS sum,
       COALESCE(MIN(value), 0)::DOUBLE PRECISION     AS min,
       COALESCE(MAX(value), 0)::DOUBLE PRECISION     AS max,
       COALESCE(AVG(value), 0)::DOUBLE PRECISION     AS avg
FROM items
"#;

const DESCRIBE_SQL: &str = r#"
SELECT column_name::TEXT    AS name,
       data_type::TEXT      AS data_type,
       is_nullable = 'YES'  AS nullable,
       column_default::TEXT AS column_default
FROM information_schema.columns
WHERE table_schema = current_schema() AND table_name = $1
ORDER BY ordinal_position
"#;

/// PostgreSQL-backed item repository
#[derive(Clone)]
pub struct PgItemRepository {
    db: DatabaseConnection,
}

impl PgItemRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ItemRepository for PgItemRepository {
    async fn create(&self, input: NewItem) -> ItemResult<Item> {
        let name = input.name.clone();
        let active_model: entity::ActiveModel = input.into();

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| ItemError::from_write(e, &name))?;

        tracing::info!(item_id = model.id, "Created item");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: i64) -> ItemResult<Option<Item>> {
        let model = entity::Entity::find_by_id(id).one(&self.db).await?;
        tracing::debug!(item_id = id, found = model.is_some(), "Fetched item");
        Ok(model.map(Into::into))
    }

    async fn list(&self) -> ItemResult<Vec<Item>> {
        let models = entity::Entity::find()
            .order_by_asc(entity::Column::Id)
            .all(&self.db)
            .await?;

        tracing::debug!(count = models.len(), "Listed items");
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn search(&self, filter: SearchFilter) -> ItemResult<Vec<Item>> {
        let models = filter.select().all(&self.db).await?;

        tracing::debug!(count = models.len(), limit = filter.limit, "Searched items");
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn update(&self, id: i64, clause: UpdateClause) -> ItemResult<Option<Item>> {
        let new_name = clause.new_name().map(str::to_string);

        let models = update_statement(id, clause)
            .exec_with_returning(&self.db)
            .await
            .map_err(|e| match new_name {
                Some(ref name) => ItemError::from_write(e, name),
                None => e.into(),
            })?;

        let updated = models.into_iter().next().map(Item::from);
        if updated.is_some() {
            tracing::info!(item_id = id, "Updated item");
        }
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> ItemResult<bool> {
        let result = entity::Entity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected > 0 {
            tracing::info!(item_id = id, "Deleted item");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn stats(&self) -> ItemResult<ItemStats> {
        let stats = ItemStats::find_by_statement(Statement::from_string(
            DbBackend::Postgres,
            STATS_SQL,
        ))
        .one(&self.db)
        .await?
        .unwrap_or_default();

        Ok(stats)
    }

    async fn seed(&self, items: Vec<NewItem>, replace: bool) -> ItemResult<SeedOutcome> {
        let txn = self.db.begin().await?;

        if replace {
            txn.execute_unprepared("TRUNCATE items RESTART IDENTITY")
                .await?;
        }

        let processed = items.len() as u64;
        for input in items {
            let name = input.name.clone();
            let active_model: entity::ActiveModel = input.into();

            entity::Entity::insert(active_model)
                .on_conflict(
                    OnConflict::column(entity::Column::Name)
                        .update_columns([entity::Column::Value, entity::Column::Note])
                        .value(entity::Column::UpdatedAt, bump_updated_at())
                        .to_owned(),
                )
                .exec(&txn)
                .await
                .map_err(|e| ItemError::from_write(e, &name))?;
        }

        let total = entity::Entity::find().count(&txn).await?;
        txn.commit().await?;

        tracing::info!(processed, total, replace, "Seeded items");
        Ok(SeedOutcome { processed, total })
    }

    async fn describe_schema(&self) -> ItemResult<Vec<ColumnInfo>> {
        let columns = ColumnInfo::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            DESCRIBE_SQL,
            [ITEMS_TABLE.into()],
        ))
        .all(&self.db)
        .await?;

        Ok(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, QueryTrait};

    fn model(id: i64, name: &str, value: f64) -> entity::Model {
        let now = chrono::Utc::now().fixed_offset();
        entity::Model {
            id,
            name: name.to_string(),
            value,
            note: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_get_by_id_maps_model() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model(3, "apple", 1.5)]])
            .into_connection();
        let repo = PgItemRepository::new(db);

        let item = repo.get_by_id(3).await.unwrap().unwrap();
        assert_eq!(item.id, 3);
        assert_eq!(item.name, "apple");
    }

    #[test]
    fn test_update_sql_sets_only_given_columns() {
        let clause = UpdateClause::new(vec![Assignment::Value(2.0)]).unwrap();
        let sql = update_statement(1, clause).build(DbBackend::Postgres).sql;

        assert!(sql.contains(r#""value" = $1"#));
        assert!(sql.contains("GREATEST(now()"));
        assert!(!sql.contains(r#""name" ="#));
        assert!(!sql.contains(r#""note" ="#));
    }

    #[test]
    fn test_update_sql_keeps_clause_order() {
        let clause = UpdateClause::new(vec![
            Assignment::Note("x".into()),
            Assignment::Name("fig".into()),
        ])
        .unwrap();
        let sql = update_statement(1, clause).build(DbBackend::Postgres).sql;

        let note_at = sql.find(r#""note" = $1"#).unwrap();
        let name_at = sql.find(r#""name" = $2"#).unwrap();
        assert!(note_at < name_at);
    }

    #[tokio::test]
    async fn test_update_missing_row_returns_none() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<entity::Model>::new()])
            .into_connection();
        let repo = PgItemRepository::new(db);

        let clause = UpdateClause::new(vec![Assignment::Note("x".into())]).unwrap();
        assert!(repo.update(42, clause).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_reports_rows_affected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
            ])
            .into_connection();
        let repo = PgItemRepository::new(db);

        assert!(repo.delete(1).await.unwrap());
        assert!(!repo.delete(1).await.unwrap());
    }

    #[tokio::test]
    async fn test_query_error_is_store_unavailable() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([sea_orm::DbErr::Custom("connection reset".into())])
            .into_connection();
        let repo = PgItemRepository::new(db);

        let err = repo.list().await.unwrap_err();
        assert_eq!(err.kind(), "store_unavailable");
    }
}
