mod macros;
mod paging;

pub mod genre;
pub mod movie;
pub mod rental;

pub use paging::Paging;

pub const API_PREFIX: &str = "/api/v1";

/// All versioned API routes, to be nested on [`API_PREFIX`]
pub fn api_router() -> axum::Router<crate::state::AppState> {
    axum::Router::new()
        .nest("/generos", genre::router())
        .nest("/filmes", movie::router())
        .nest("/locacoes", rental::router())
        .nest("/autorizacao", crate::auth::router())
}

#[cfg(feature = "openapi")]
pub fn api_docs() -> utoipa::openapi::OpenApi {
    utoipa::openapi::OpenApiBuilder::new()
        .info(
            utoipa::openapi::InfoBuilder::new()
                .title("mrental API")
                .version(env!("CARGO_PKG_VERSION"))
                .build(),
        )
        .build()
        .nest(format!("{API_PREFIX}/generos"), genre::api_docs())
        .nest(format!("{API_PREFIX}/filmes"), movie::api_docs())
        .nest(format!("{API_PREFIX}/locacoes"), rental::api_docs())
        .nest(format!("{API_PREFIX}/autorizacao"), crate::auth::api_docs())
}
