//! Items Domain
//!
//! CRUD, search, aggregates and bulk loading over the `items` table.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints (JSON, TSV export, plain-text add)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Coercion, not-found mapping, metrics
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + PostgreSQL / in-memory)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Filter/Patch│  ← Search conditions, partial update clauses
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_items::{handlers, postgres::PgItemRepository, service::ItemService};
//!
//! let db = sea_orm::Database::connect("postgresql://localhost/items").await?;
//! let service = ItemService::new(PgItemRepository::new(db));
//! let router = handlers::router(service);
//! ```

pub mod coerce;
pub mod entity;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod models;
pub mod patch;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{ItemError, ItemResult, TextError};
pub use filter::SearchFilter;
pub use handlers::ApiDoc;
pub use models::{
    AddParams, ColumnInfo, Item, ItemStats, NewItem, SearchParams, SeedOutcome,
};
pub use patch::{Assignment, UpdateClause};
pub use postgres::PgItemRepository;
pub use repository::{InMemoryItemRepository, ItemRepository};
pub use service::ItemService;
