use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
    validate::Garde,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    routing::{get, post},
    Json,
};
use http::StatusCode;
use mrental_dal::user::{CreateUser, UserRepository};
use mrental_types::{claim::ApiClaim, general::ValidEmail};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{debug, info};

pub mod token;

const HOME_MESSAGE: &str =
    "Movie rental API home page. See README.md for instructions on how to use the API";
const TOKEN_MESSAGE: &str = "JWT token generated successfully";

crate::repository_from_request!(UserRepository);

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LoginCredentials {
    email: String,
    password: String,
}

/// Response of successful registration or login
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TokenEnvelope {
    pub authenticated: bool,
    pub token: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
    pub message: String,
}

fn issue_token(state: &AppState, email: &str) -> ApiResult<TokenEnvelope> {
    let issued = state.tokens().issue(ApiClaim::new_unsigned(email))?;
    Ok(TokenEnvelope {
        authenticated: true,
        token: issued.token,
        expires_at: OffsetDateTime::from(issued.expires),
        message: TOKEN_MESSAGE.to_string(),
    })
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "", tag = "Auth", operation_id = "home",
responses((status = StatusCode::OK, description = "Welcome text", body = String))))]
pub async fn home() -> &'static str {
    HOME_MESSAGE
}

#[cfg_attr(feature = "openapi", utoipa::path(post, path = "/registrar", tag = "Auth", operation_id = "register",
request_body = CreateUser,
responses((status = StatusCode::OK, description = "Account created", body = TokenEnvelope))))]
pub async fn register(
    State(state): State<AppState>,
    repository: UserRepository,
    Garde(Json(payload)): Garde<Json<CreateUser>>,
) -> ApiResult<impl IntoResponse> {
    let user = repository.create(payload).await?;
    info!("Registered user {}", user.email);
    let envelope = issue_token(&state, &user.email)?;
    Ok((StatusCode::OK, Json(envelope)))
}

#[cfg_attr(feature = "openapi", utoipa::path(post, path = "/login", tag = "Auth", operation_id = "login",
request_body = LoginCredentials,
responses((status = StatusCode::OK, description = "Logged in", body = TokenEnvelope))))]
pub async fn login(
    State(state): State<AppState>,
    repository: UserRepository,
    payload: Result<Json<LoginCredentials>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(credentials) = payload.map_err(|e| {
        debug!("Unreadable login payload: {e}");
        ApiError::InvalidCredentials
    })?;
    let email = credentials.email.parse::<ValidEmail>().map_err(|e| {
        debug!("Login with invalid email: {e}");
        ApiError::InvalidCredentials
    })?;
    let user = repository
        .check_password(email.as_ref(), &credentials.password)
        .await?;
    let envelope = issue_token(&state, &user.email)?;
    Ok((StatusCode::OK, Json(envelope)))
}

/// Must be nested on /api/v1/autorizacao
pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", get(home))
        .route("/registrar", post(register))
        .route("/login", post(login))
}

#[cfg(feature = "openapi")]
#[derive(utoipa::OpenApi)]
#[openapi(paths(home, register, login))]
struct AuthDocs;

#[cfg(feature = "openapi")]
pub fn api_docs() -> utoipa::openapi::OpenApi {
    use utoipa::OpenApi as _;
    AuthDocs::openapi()
}
