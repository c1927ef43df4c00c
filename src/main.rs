use tracing_subscriber::{EnvFilter, fmt};
use tracing::info;

use permitdesk::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))?;
    fmt().with_env_filter(filter).init();

    let args: Vec<String> = std::env::args().collect();
    if permitdesk::config::has_flag(&args, "--help") || permitdesk::config::has_flag(&args, "-h") {
        println!("permitdesk\n\nUSAGE:\n  permitdesk [--http-port N] [--state-dir PATH] [--no-persist]\n\nOPTIONS:\n  --http-port N       HTTP port (env: PERMITDESK_HTTP_PORT, default 7878)\n  --state-dir PATH    Session storage folder (env: PERMITDESK_STATE_DIR, default state)\n  --no-persist        Keep the session in memory only (env: PERMITDESK_PERSIST=false)\n");
        return Ok(());
    }
    let cfg = Config::from_env_and_args(&args);

    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    info!(target: "permitdesk", "permitdesk starting: RUST_LOG='{}'", rust_log);

    permitdesk::server::run_with_config(cfg).await
}
