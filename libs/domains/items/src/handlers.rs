use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    AppError, IdPath,
    errors::responses::{
        BadRequestIdResponse, BadRequestValidationResponse, ConflictResponse, NotFoundResponse,
        ServiceUnavailableResponse,
    },
};
use serde_json::Value;
use std::fmt::Write;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::TextError;
use crate::models::{
    AddParams, ColumnInfo, Item, ItemInput, ItemPatch, ItemStats, SearchParams, SeedOutcome,
    SeedRequest,
};
use crate::repository::ItemRepository;
use crate::service::ItemService;

/// OpenAPI documentation for the Items API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_items,
        create_item,
        search_items,
        item_stats,
        describe_schema,
        seed_items,
        export_items,
        add_item,
        get_item,
        replace_item,
        patch_item,
        delete_item,
    ),
    components(
        schemas(Item, ItemInput, ItemPatch, ItemStats, SeedRequest, SeedOutcome, ColumnInfo),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestIdResponse,
            ConflictResponse,
            ServiceUnavailableResponse
        )
    ),
    tags(
        (name = "items", description = "Item store endpoints")
    )
)]
pub struct ApiDoc;

type SharedService<R> = Arc<ItemService<R>>;

/// Create the items router with all HTTP endpoints
pub fn router<R: ItemRepository + 'static>(service: ItemService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/search", get(search_items))
        .route("/stats", get(item_stats))
        .route("/schema", get(describe_schema))
        .route("/seed", post(seed_items))
        .route("/export", get(export_items))
        .route("/add", get(add_item))
        .route(
            "/{id}",
            get(get_item)
                .put(replace_item)
                .patch(patch_item)
                .delete(delete_item),
        )
        .with_state(shared_service)
}

/// Render items as tab-separated text with a header row
pub fn render_tsv(items: &[Item]) -> String {
    let clean = |s: &str| s.replace(['\t', '\n', '\r'], " ");

    let mut out = String::from("id\tname\tvalue\tnote\n");
    for item in items {
        let _ = writeln!(
            out,
            "{}\t{}\t{}\t{}",
            item.id,
            clean(&item.name),
            item.value,
            clean(&item.note)
        );
    }
    out
}

/// List all items ordered by id
#[utoipa::path(
    get,
    path = "",
    tag = "items",
    responses(
        (status = 200, description = "All items", body = Vec<Item>),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn list_items<R: ItemRepository>(
    State(service): State<SharedService<R>>,
) -> Result<Json<Vec<Item>>, AppError> {
    Ok(Json(service.list_items().await?))
}

/// Create an item
#[utoipa::path(
    post,
    path = "",
    tag = "items",
    request_body = ItemInput,
    responses(
        (status = 201, description = "Item created", body = Item),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn create_item<R: ItemRepository>(
    State(service): State<SharedService<R>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = payload?;
    let item = service.create_item(&body).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Search items by name substring and value range
#[utoipa::path(
    get,
    path = "/search",
    tag = "items",
    params(SearchParams),
    responses(
        (status = 200, description = "Matching items, highest value first", body = Vec<Item>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn search_items<R: ItemRepository>(
    State(service): State<SharedService<R>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Item>>, AppError> {
    Ok(Json(service.search_items(&params).await?))
}

/// Count, sum, min, max and average of item values
#[utoipa::path(
    get,
    path = "/stats",
    tag = "items",
    responses(
        (status = 200, description = "Aggregates, zero when empty", body = ItemStats),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn item_stats<R: ItemRepository>(
    State(service): State<SharedService<R>>,
) -> Result<Json<ItemStats>, AppError> {
    Ok(Json(service.stats().await?))
}

/// Column definitions of the items table
#[utoipa::path(
    get,
    path = "/schema",
    tag = "items",
    responses(
        (status = 200, description = "Columns in ordinal order", body = Vec<ColumnInfo>),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn describe_schema<R: ItemRepository>(
    State(service): State<SharedService<R>>,
) -> Result<Json<Vec<ColumnInfo>>, AppError> {
    Ok(Json(service.describe_schema().await?))
}

/// Bulk-load items, optionally replacing existing data
#[utoipa::path(
    post,
    path = "/seed",
    tag = "items",
    request_body = SeedRequest,
    responses(
        (status = 200, description = "Rows processed and resulting total", body = SeedOutcome),
        (status = 400, response = BadRequestValidationResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn seed_items<R: ItemRepository>(
    State(service): State<SharedService<R>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SeedOutcome>, AppError> {
    let Json(body) = payload?;
    Ok(Json(service.seed(&body).await?))
}

/// All items as tab-separated text
#[utoipa::path(
    get,
    path = "/export",
    tag = "items",
    responses(
        (status = 200, description = "id, name, value, note per line", body = String, content_type = "text/plain")
    )
)]
async fn export_items<R: ItemRepository>(
    State(service): State<SharedService<R>>,
) -> Result<impl IntoResponse, TextError> {
    let items = service.list_items().await?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        render_tsv(&items),
    ))
}

/// Insert from query parameters, replying in plain text
#[utoipa::path(
    get,
    path = "/add",
    tag = "items",
    params(AddParams),
    responses(
        (status = 200, description = "ok: inserted", body = String, content_type = "text/plain"),
        (status = 400, description = "error: <reason>", body = String, content_type = "text/plain"),
        (status = 409, description = "error: <reason>", body = String, content_type = "text/plain")
    )
)]
async fn add_item<R: ItemRepository>(
    State(service): State<SharedService<R>>,
    Query(params): Query<AddParams>,
) -> Result<&'static str, TextError> {
    service.add_item(&params).await?;
    Ok("ok: inserted\n")
}

/// Get an item by id
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "items",
    params(
        ("id" = i64, Path, description = "Item id")
    ),
    responses(
        (status = 200, description = "Item found", body = Item),
        (status = 400, response = BadRequestIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn get_item<R: ItemRepository>(
    State(service): State<SharedService<R>>,
    IdPath(id): IdPath,
) -> Result<Json<Item>, AppError> {
    Ok(Json(service.get_item(id).await?))
}

/// Replace name, value and note of an item
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "items",
    params(
        ("id" = i64, Path, description = "Item id")
    ),
    request_body = ItemInput,
    responses(
        (status = 200, description = "Item replaced", body = Item),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn replace_item<R: ItemRepository>(
    State(service): State<SharedService<R>>,
    IdPath(id): IdPath,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Item>, AppError> {
    let Json(body) = payload?;
    Ok(Json(service.replace_item(id, &body).await?))
}

/// Update only the given fields of an item
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "items",
    params(
        ("id" = i64, Path, description = "Item id")
    ),
    request_body = ItemPatch,
    responses(
        (status = 200, description = "Item updated", body = Item),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn patch_item<R: ItemRepository>(
    State(service): State<SharedService<R>>,
    IdPath(id): IdPath,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Item>, AppError> {
    let Json(body) = payload?;
    Ok(Json(service.patch_item(id, &body).await?))
}

/// Delete an item
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "items",
    params(
        ("id" = i64, Path, description = "Item id")
    ),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 400, response = BadRequestIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn delete_item<R: ItemRepository>(
    State(service): State<SharedService<R>>,
    IdPath(id): IdPath,
) -> Result<StatusCode, AppError> {
    service.delete_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
