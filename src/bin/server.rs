use anyhow::Result;
use fish_frenzy::server::{self, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env()?;
    log::info!("starting with {config:?}");
    server::run(config).await
}
