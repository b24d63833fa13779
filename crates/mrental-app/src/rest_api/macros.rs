#[macro_export]
macro_rules! crud_api {
    ($entity:ty, $resource:literal) => {
        type EntityRepository = paste::paste! {[<$entity Repository>]};
        crate::repository_from_request!(EntityRepository);
        pub mod crud_api {
            use super::*;
            use crate::error::{ApiError, ApiResult};
            use crate::rest_api::Paging;
            use crate::state::AppState;
            use crate::validate::Garde;
            use axum::{
                extract::{Path, Query, State},
                response::IntoResponse,
                Json,
            };
            use http::{header, StatusCode};
            use mrental_types::claim::ApiClaim;
            use tracing::debug;

            type CreateEntity = paste::paste! {[<Create $entity>]};
            type UpdateEntity = paste::paste! {[<Update $entity>]};

            #[cfg_attr(feature = "openapi",  utoipa::path(get, path = "", tag = stringify!($entity), operation_id = concat!("list", stringify!($entity)),
            params(Paging), responses((status = StatusCode::OK, description = "List, whole collection when no page is requested", body = Vec<$entity>))))]
            pub async fn list(
                repository: EntityRepository,
                State(state): State<AppState>,
                axum_valid::Garde(Query(paging)): axum_valid::Garde<Query<Paging>>,
            ) -> ApiResult<impl IntoResponse> {
                let listing_params = paging.into_listing_params(state.config().default_page_size)?;
                let records = repository.list(listing_params).await?;
                Ok((StatusCode::OK, Json(records)))
            }

            #[cfg_attr(feature = "openapi",  utoipa::path(get, path = "/{id}", tag = stringify!($entity), operation_id = concat!("get", stringify!($entity)),
            responses((status = StatusCode::OK, description = "Get one", body = $entity))))]
            pub async fn get(
                Path(id): Path<i64>,
                repository: EntityRepository,
            ) -> ApiResult<impl IntoResponse> {
                let record = repository.get(id).await?;

                Ok((StatusCode::OK, Json(record)))
            }

            #[cfg_attr(feature = "openapi",  utoipa::path(post, path = "", tag = stringify!($entity), operation_id = concat!("create", stringify!($entity)),
            responses((status = StatusCode::CREATED, description = concat!("Created ", stringify!($entity)), body = $entity))))]
            pub async fn create(
                repository: EntityRepository,
                _api_user: ApiClaim,
                Garde(Json(payload)): Garde<Json<CreateEntity>>,
            ) -> ApiResult<impl IntoResponse> {
                let record = repository.create(payload).await?;
                let location = format!("{}/{}/{}", crate::rest_api::API_PREFIX, $resource, record.id);

                Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(record)))
            }

            #[cfg_attr(feature = "openapi",  utoipa::path(put, path = "/{id}", tag = stringify!($entity), operation_id = concat!("update", stringify!($entity)),
            responses((status = StatusCode::OK, description = concat!("Updated ", stringify!($entity)), body = $entity))))]
            pub async fn update(
                Path(id): Path<i64>,
                repository: EntityRepository,
                _api_user: ApiClaim,
                Garde(Json(payload)): Garde<Json<UpdateEntity>>,
            ) -> ApiResult<impl IntoResponse> {
                if payload.id != id {
                    debug!("Path id {id} differs from body id {}", payload.id);
                    return Err(ApiError::InvalidRequest(format!(
                        "Id in path ({id}) does not match id in body ({})",
                        payload.id
                    )));
                }
                let record = repository.update(id, payload).await?;

                Ok((StatusCode::OK, Json(record)))
            }

            #[cfg_attr(feature = "openapi",  utoipa::path(delete, path = "/{id}", tag = stringify!($entity), operation_id = concat!("delete", stringify!($entity)),
            responses((status = StatusCode::OK, description = concat!("Deleted ", stringify!($entity)), body = $entity))))]
            pub async fn delete(
                Path(id): Path<i64>,
                repository: EntityRepository,
                _api_user: ApiClaim,
            ) -> ApiResult<impl IntoResponse> {
                let record = repository.delete(id).await?;

                Ok((StatusCode::OK, Json(record)))
            }

            #[cfg_attr(feature = "openapi",  utoipa::path(patch, path = "/inativar/{id}", tag = stringify!($entity), operation_id = concat!("deactivate", stringify!($entity)),
            responses((status = StatusCode::OK, description = concat!("Deactivated ", stringify!($entity)), body = $entity))))]
            pub async fn deactivate(
                Path(id): Path<i64>,
                repository: EntityRepository,
                _api_user: ApiClaim,
            ) -> ApiResult<impl IntoResponse> {
                let record = repository.deactivate(id).await?;

                Ok((StatusCode::OK, Json(record)))
            }

            #[cfg(feature = "openapi")]
            #[cfg_attr(feature = "openapi", derive(utoipa::OpenApi))]
            #[openapi(paths(list, get, create, update, delete, deactivate))]
            struct ApiDocs;

            #[cfg(feature = "openapi")]
            pub(super) fn api_docs() -> utoipa::openapi::OpenApi {
                use utoipa::OpenApi as _;
                ApiDocs::openapi()
            }
        }
    };
}

#[macro_export]
macro_rules! publish_api_docs {
    () => {
        #[cfg(feature = "openapi")]
        pub fn api_docs() -> utoipa::openapi::OpenApi {
            crud_api::api_docs()
        }
    };
    ($($end_point:path),+) => {
        #[cfg(feature = "openapi")]
        #[derive(utoipa::OpenApi)]
        #[openapi(paths($($end_point),+))]
        struct ModuleDocs;

        #[cfg(feature = "openapi")]
        pub fn api_docs() -> utoipa::openapi::OpenApi {
            use utoipa::OpenApi as _;
            let docs = ModuleDocs::openapi();
            docs.merge_from(crud_api::api_docs())
        }
    };
}

/// Routes of `crud_api!` handlers, extra routes can be added to returned router
#[macro_export]
macro_rules! value_router {
    () => {
        fn crud_router() -> axum::Router<crate::state::AppState> {
            use axum::routing::{get, patch};
            axum::Router::new()
                .route("/", get(crud_api::list).post(crud_api::create))
                .route(
                    "/{id}",
                    get(crud_api::get)
                        .put(crud_api::update)
                        .delete(crud_api::delete),
                )
                .route("/inativar/{id}", patch(crud_api::deactivate))
        }
    };
}
