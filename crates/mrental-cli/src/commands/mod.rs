use mrental_dal::user::UserRepository;
use mrental_types::config::BackendConfig;

pub mod change_password;
pub mod create_user;
pub mod migrate;

#[allow(async_fn_in_trait)]
pub trait Executor {
    async fn run(self) -> anyhow::Result<()>;
}

/// Opens database, creating it with current schema when needed
pub(crate) async fn open_pool(backend: &BackendConfig) -> anyhow::Result<mrental_dal::Pool> {
    backend.ensure_data_dir()?;
    let pool = mrental_dal::new_pool(&backend.database_url()).await?;
    mrental_dal::migrate(&pool).await?;
    Ok(pool)
}

pub(crate) async fn create_user_repository(
    backend: &BackendConfig,
) -> anyhow::Result<UserRepository> {
    let pool = open_pool(backend).await?;
    Ok(UserRepository::new(pool))
}
