use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse)
    ),
    info(
        title = "Items API",
        version = "0.1.0",
        description = "Create, search, aggregate and bulk-load named items with numeric values"
    ),
    servers(
        (url = "/api", description = "API base path")
    ),
    nest(
        (path = "/items", api = domain_items::ApiDoc)
    )
)]
pub struct ApiDoc;
