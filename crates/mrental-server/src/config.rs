use crate::error::Result;
pub use clap::Parser;
use mrental_types::config::BackendConfig;

#[derive(Debug, Clone, clap::Parser)]
#[command(version, about = "Movie rental catalog REST server")]
pub struct ServerConfig {
    #[arg(
        short,
        long,
        default_value_t = 3000,
        env = "MRENTAL_LISTEN_PORT",
        help = "Port to listen on"
    )]
    pub port: u16,
    #[arg(
        short,
        long,
        default_value = "127.0.0.1",
        env = "MRENTAL_LISTEN_ADDRESS",
        help = "Address to listen on"
    )]
    pub listen_address: String,

    #[command(flatten)]
    pub backend: BackendConfig,

    #[arg(
        long,
        env = "MRENTAL_JWT_KEY",
        hide_env_values = true,
        help = "Pre-shared key signing API tokens, default is random key stored in [data-dir]/secret"
    )]
    pub jwt_key: Option<String>,

    #[arg(
        long,
        env = "MRENTAL_TOKEN_ISSUER",
        default_value = "mrental",
        help = "Issuer (iss) of API tokens"
    )]
    pub token_issuer: String,

    #[arg(
        long,
        env = "MRENTAL_TOKEN_AUDIENCE",
        default_value = "mrental",
        help = "Audience (aud) of API tokens"
    )]
    pub token_audience: String,

    #[arg(
        long,
        env = "MRENTAL_TOKEN_HOURS",
        default_value_t = 2.0,
        help = "Token validity in hours, fractions allowed"
    )]
    pub token_hours: f64,

    #[arg(
        long,
        env = "MRENTAL_DEFAULT_PAGE_SIZE",
        default_value = "100",
        help = "Page size used when only page number is requested"
    )]
    pub default_page_size: u32,

    #[arg(long, env = "MRENTAL_CORS", help = "Enable permissive CORS")]
    pub cors: bool,
}

impl ServerConfig {
    pub fn load() -> Result<Self> {
        ServerConfig::try_parse().map_err(|e| e.into())
    }
}
