use clap::Parser;
use garde::Validate as _;
use mrental_types::{config::BackendConfig, general::ValidEmail};
use tracing::info;

use crate::commands::{create_user_repository, Executor};

#[derive(Parser, Debug)]
pub struct CreateUserCmd {
    #[command(flatten)]
    pub backend: BackendConfig,
    #[arg(short, long, help = "User email, used as username")]
    pub email: ValidEmail,
    #[arg(short, long, help = "User password")]
    pub password: String,
}

impl Executor for CreateUserCmd {
    async fn run(self) -> anyhow::Result<()> {
        let new_user = mrental_dal::user::CreateUser {
            email: self.email,
            password: self.password,
        };
        new_user.validate()?;
        let repository = create_user_repository(&self.backend).await?;
        let user = repository.create(new_user).await?;
        info!("Created user {} with id {}", user.email, user.id);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser as _;
    use std::str::FromStr as _;

    use super::*;

    #[tokio::test]
    async fn test_create_user_and_change_password() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().to_string_lossy().to_string();
        let backend = BackendConfig::try_parse_from(["test", "--data-dir", &data_dir]).unwrap();

        let cmd = CreateUserCmd {
            backend: backend.clone(),
            email: ValidEmail::from_str("admin@example.com").unwrap(),
            password: "Admin#123".to_string(),
        };
        cmd.run().await.unwrap();

        let cmd = CreateUserCmd {
            backend: backend.clone(),
            email: ValidEmail::from_str("weak@example.com").unwrap(),
            password: "weak".to_string(),
        };
        assert!(cmd.run().await.is_err());

        let cmd = crate::commands::change_password::ChangePasswordCmd {
            backend: backend.clone(),
            email: ValidEmail::from_str("admin@example.com").unwrap(),
            password: "Changed#456".to_string(),
        };
        cmd.run().await.unwrap();

        let repository = create_user_repository(&backend).await.unwrap();
        let user = repository
            .check_password("admin@example.com", "Changed#456")
            .await
            .unwrap();
        assert_eq!(user.email, "admin@example.com");
        assert!(repository
            .find_by_email("weak@example.com")
            .await
            .unwrap()
            .is_none());
    }
}
