use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;

use crate::models::{Item, NewItem};

/// Sea-ORM Entity for the items table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(column_type = "Text", unique)]
    pub name: String,
    #[sea_orm(column_type = "Double")]
    pub value: f64,
    #[sea_orm(column_type = "Text")]
    pub note: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Item {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            value: model.value,
            note: model.note,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

// Id and timestamps come from column defaults, so created_at == updated_at
impl From<NewItem> for ActiveModel {
    fn from(input: NewItem) -> Self {
        ActiveModel {
            id: NotSet,
            name: Set(input.name),
            value: Set(input.value),
            note: Set(input.note),
            created_at: NotSet,
            updated_at: NotSet,
        }
    }
}
