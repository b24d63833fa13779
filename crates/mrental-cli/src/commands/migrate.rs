use clap::Args;
use mrental_types::config::BackendConfig;
use tracing::info;

use crate::commands::{open_pool, Executor};

#[derive(Args, Debug)]
pub struct MigrateCmd {
    #[command(flatten)]
    pub backend: BackendConfig,
}

impl Executor for MigrateCmd {
    async fn run(self) -> anyhow::Result<()> {
        let pool = open_pool(&self.backend).await?;
        let applied: i64 = mrental_dal::applied_migrations(&pool).await?;
        info!(
            "Database {} is up to date, {applied} migrations applied",
            self.backend.database_url()
        );
        pool.close().await;
        Ok(())
    }
}
