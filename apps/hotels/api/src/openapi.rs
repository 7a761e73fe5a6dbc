use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse)
    ),
    info(
        title = "Hotels API",
        version = "0.1.0",
        description = "Hotel catalogue with embedding-based similar hotel search"
    ),
    servers(
        (url = "/api", description = "API base path")
    ),
    nest(
        (path = "/v1/hotels", api = domain_hotels::handlers::ApiDoc)
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hotel_paths_are_nested() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/v1/hotels/{id}/similar"));
        assert!(doc.paths.paths.contains_key("/v1/hotels/{id}"));
    }
}
