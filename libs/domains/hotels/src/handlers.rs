use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    ValidatedJson, ValidatedQuery,
    errors::responses::{
        BadRequestValidationResponse, InternalServerErrorResponse, NotFoundResponse,
        ServiceUnavailableResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::HotelResult;
use crate::models::{
    Contact, CreateHotel, HotelId, HotelResponse, SimilarHotelsResponse, SimilarOptions,
    SimilarQuery, UpdateHotel,
};
use crate::repository::HotelRepository;
use crate::search::SimilaritySearch;
use crate::service::HotelService;

pub const TAG: &str = "hotels";

/// OpenAPI documentation for Hotels API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_hotels,
        create_hotel,
        get_hotel,
        update_hotel,
        delete_hotel,
        similar_hotels,
    ),
    components(
        schemas(HotelResponse, CreateHotel, UpdateHotel, Contact, SimilarHotelsResponse),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            ServiceUnavailableResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Hotel catalogue and similarity search")
    )
)]
pub struct ApiDoc;

type SharedService<R, S> = State<Arc<HotelService<R, S>>>;

/// Create the hotel router with all HTTP endpoints
pub fn router<R, S>(service: HotelService<R, S>) -> Router
where
    R: HotelRepository + 'static,
    S: SimilaritySearch + 'static,
{
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_hotels).post(create_hotel))
        .route(
            "/{id}",
            get(get_hotel).put(update_hotel).delete(delete_hotel),
        )
        .route("/{id}/similar", get(similar_hotels))
        .with_state(shared_service)
}

/// List all hotels
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    responses(
        (status = 200, description = "List of hotels", body = Vec<HotelResponse>),
        (status = 503, response = ServiceUnavailableResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_hotels<R: HotelRepository, S: SimilaritySearch>(
    State(service): SharedService<R, S>,
) -> HotelResult<Json<Vec<HotelResponse>>> {
    let hotels = service.list_hotels().await?;
    Ok(Json(hotels.into_iter().map(HotelResponse::from).collect()))
}

/// Create a new hotel; its embedding is computed on the way in
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = CreateHotel,
    responses(
        (status = 201, description = "Hotel created successfully", body = HotelResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 503, response = ServiceUnavailableResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_hotel<R: HotelRepository, S: SimilaritySearch>(
    State(service): SharedService<R, S>,
    ValidatedJson(input): ValidatedJson<CreateHotel>,
) -> HotelResult<impl IntoResponse> {
    let hotel = service.create_hotel(input).await?;
    Ok((StatusCode::CREATED, Json(HotelResponse::from(hotel))))
}

/// Get a hotel by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = String, Path, description = "Hotel ID")
    ),
    responses(
        (status = 200, description = "Hotel found", body = HotelResponse),
        (status = 404, response = NotFoundResponse),
        (status = 503, response = ServiceUnavailableResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_hotel<R: HotelRepository, S: SimilaritySearch>(
    State(service): SharedService<R, S>,
    Path(id): Path<HotelId>,
) -> HotelResult<Json<HotelResponse>> {
    let hotel = service.get_hotel(&id).await?;
    Ok(Json(hotel.into()))
}

/// Update a hotel; only supplied fields change
#[utoipa::path(
    put,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = String, Path, description = "Hotel ID")
    ),
    request_body = UpdateHotel,
    responses(
        (status = 200, description = "Hotel updated successfully", body = HotelResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 503, response = ServiceUnavailableResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_hotel<R: HotelRepository, S: SimilaritySearch>(
    State(service): SharedService<R, S>,
    Path(id): Path<HotelId>,
    ValidatedJson(input): ValidatedJson<UpdateHotel>,
) -> HotelResult<Json<HotelResponse>> {
    let hotel = service.update_hotel(&id, input).await?;
    Ok(Json(hotel.into()))
}

/// Delete a hotel
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = String, Path, description = "Hotel ID")
    ),
    responses(
        (status = 204, description = "Hotel deleted successfully"),
        (status = 404, response = NotFoundResponse),
        (status = 503, response = ServiceUnavailableResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_hotel<R: HotelRepository, S: SimilaritySearch>(
    State(service): SharedService<R, S>,
    Path(id): Path<HotelId>,
) -> HotelResult<impl IntoResponse> {
    service.delete_hotel(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Hotels most similar to the given one, nearest first
///
/// The hotel itself is normally its own nearest neighbor and is included
/// unless `exclude_self=true`.
#[utoipa::path(
    get,
    path = "/{id}/similar",
    tag = TAG,
    params(
        ("id" = String, Path, description = "Hotel ID"),
        SimilarQuery
    ),
    responses(
        (status = 200, description = "Similar hotels", body = SimilarHotelsResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 503, response = ServiceUnavailableResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn similar_hotels<R: HotelRepository, S: SimilaritySearch>(
    State(service): SharedService<R, S>,
    Path(id): Path<HotelId>,
    ValidatedQuery(query): ValidatedQuery<SimilarQuery>,
) -> HotelResult<Json<SimilarHotelsResponse>> {
    let options = SimilarOptions {
        k: query.k.unwrap_or_else(|| service.default_k()),
        exclude_self: query.exclude_self,
    };

    let hotels = service.find_similar_with(&id, options).await?;
    Ok(Json(SimilarHotelsResponse {
        similar_hotels: hotels.into_iter().map(HotelResponse::from).collect(),
    }))
}
