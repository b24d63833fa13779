use crate::{
    error::ApiResult, repository_from_request, rest_api::Paging, state::AppState, validate::Garde,
};
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json,
};
use http::{header, StatusCode};
#[cfg_attr(not(feature = "openapi"), allow(unused_imports))]
use mrental_dal::rental::{CreateRental, Rental, RentalRepository};
use mrental_types::claim::ApiClaim;
use tracing::info;

repository_from_request!(RentalRepository);

#[cfg_attr(feature = "openapi",  utoipa::path(post, path = "", tag = "Rental", operation_id = "createRental",
    request_body = CreateRental,
    responses((status = StatusCode::CREATED, description = "Created rental with its items", body = Rental),
    (status = StatusCode::BAD_REQUEST, description = "Invalid payload or unknown movies"))))]
pub async fn create(
    repository: RentalRepository,
    api_user: ApiClaim,
    Garde(Json(payload)): Garde<Json<CreateRental>>,
) -> ApiResult<impl IntoResponse> {
    let record = repository.create(payload).await?;
    info!("Rental {} registered by {}", record.id, api_user.unique_name);
    let location = format!("{}/locacoes/{}", super::API_PREFIX, record.id);

    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(record)))
}

#[cfg_attr(feature = "openapi",  utoipa::path(get, path = "", tag = "Rental", operation_id = "listRental",
    params(Paging), responses((status = StatusCode::OK, description = "Rentals with items", body = Vec<Rental>))))]
pub async fn list(
    repository: RentalRepository,
    State(state): State<AppState>,
    axum_valid::Garde(Query(paging)): axum_valid::Garde<Query<Paging>>,
) -> ApiResult<impl IntoResponse> {
    let listing_params = paging.into_listing_params(state.config().default_page_size)?;
    let records = repository.list(listing_params).await?;
    Ok((StatusCode::OK, Json(records)))
}

#[cfg_attr(feature = "openapi",  utoipa::path(get, path = "/{id}", tag = "Rental", operation_id = "getRental",
    responses((status = StatusCode::OK, description = "Rental with items", body = Rental))))]
pub async fn get_rental(
    Path(id): Path<i64>,
    repository: RentalRepository,
) -> ApiResult<impl IntoResponse> {
    let record = repository.get(id).await?;
    Ok((StatusCode::OK, Json(record)))
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_rental))
}

#[cfg(feature = "openapi")]
#[derive(utoipa::OpenApi)]
#[openapi(paths(create, list, get_rental))]
struct RentalDocs;

#[cfg(feature = "openapi")]
pub fn api_docs() -> utoipa::openapi::OpenApi {
    use utoipa::OpenApi as _;
    RentalDocs::openapi()
}
