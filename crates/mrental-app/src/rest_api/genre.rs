use crate::{crud_api, publish_api_docs, value_router};
#[cfg_attr(not(feature = "openapi"), allow(unused_imports))]
use mrental_dal::genre::{CreateGenre, Genre, GenreRepository, UpdateGenre};

use crate::state::AppState;
use axum::routing::get;

publish_api_docs!(extra_crud_api::list_with_movies);
crud_api!(Genre, "generos");
value_router!();

mod extra_crud_api {
    use axum::{response::IntoResponse, Json};
    use http::StatusCode;
    #[cfg_attr(not(feature = "openapi"), allow(unused_imports))]
    use mrental_dal::genre::{GenreRepository, GenreWithMovies};

    use crate::error::ApiResult;

    #[cfg_attr(feature = "openapi",  utoipa::path(get, path = "/filmes", tag = "Genre", operation_id = "listGenreWithMovies",
        responses((status = StatusCode::OK, description = "All genres with their movies", body = Vec<GenreWithMovies>))))]
    pub async fn list_with_movies(repository: GenreRepository) -> ApiResult<impl IntoResponse> {
        let records = repository.list_with_movies().await?;
        Ok((StatusCode::OK, Json(records)))
    }
}

pub fn router() -> axum::Router<AppState> {
    crud_router().route("/filmes", get(extra_crud_api::list_with_movies))
}
