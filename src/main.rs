//! `niche-analyst-server [CONFIG_FILE]`

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1);
    niche_analyst::server::start(config_path.as_deref()).await
}
