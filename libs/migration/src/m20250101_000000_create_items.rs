use sea_orm_migration::prelude::*;

/// Name of the table owned by the items domain
pub const ITEMS_TABLE: &str = "items";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Items::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Items::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Items::Name).text().not_null().unique_key())
                    .col(ColumnDef::new(Items::Value).double().not_null())
                    .col(ColumnDef::new(Items::Note).text().not_null().default(""))
                    .col(
                        ColumnDef::new(Items::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Items::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Enforced by the store as well as by input coercion
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                ALTER TABLE items
                    ADD CONSTRAINT items_value_non_negative CHECK (value >= 0)
                "#,
            )
            .await?;

        // Search orders by value
        manager
            .create_index(
                Index::create()
                    .name("idx_items_value")
                    .table(Items::Table)
                    .col(Items::Value)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Items::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Items {
    Table,
    Id,
    Name,
    Value,
    Note,
    CreatedAt,
    UpdatedAt,
}
