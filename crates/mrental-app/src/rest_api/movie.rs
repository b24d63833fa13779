use crate::{crud_api, publish_api_docs, value_router};
#[cfg_attr(not(feature = "openapi"), allow(unused_imports))]
use mrental_dal::movie::{CreateMovie, Movie, MovieRepository, UpdateMovie};

use crate::state::AppState;

publish_api_docs!();
crud_api!(Movie, "filmes");
value_router!();

pub fn router() -> axum::Router<AppState> {
    crud_router()
}
