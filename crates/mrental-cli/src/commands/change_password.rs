use clap::Args;
use garde::Validate as _;
use mrental_dal::user::NewPassword;
use mrental_types::{config::BackendConfig, general::ValidEmail};
use tracing::info;

use crate::commands::{create_user_repository, Executor};

#[derive(Args, Debug)]
pub struct ChangePasswordCmd {
    #[command(flatten)]
    pub backend: BackendConfig,
    #[arg(short, long, help = "User email, used as username")]
    pub email: ValidEmail,
    #[arg(short, long, help = "New user password")]
    pub password: String,
}

impl Executor for ChangePasswordCmd {
    async fn run(self) -> anyhow::Result<()> {
        let new_password = NewPassword {
            password: self.password,
        };
        new_password.validate()?;
        let repository = create_user_repository(&self.backend).await?;
        repository
            .change_password(self.email.as_ref(), &new_password.password)
            .await?;
        info!("Password changed for {}", self.email);
        Ok(())
    }
}
