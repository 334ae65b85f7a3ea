use anyhow::Result;
use clap::Parser;
use loyalty_proxy::server;
use loyalty_proxy::utils::config_loader;
use loyalty_proxy::utils::logging;
use loyalty_proxy::utils::logging::LogLevel;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "loyalty-proxy.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    /// Overrides settings.server.port
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Read args
    // -------------------------------

    let args = Args::parse();

    // -------------------------------
    // 2. Load YAML config, fail fast on any validation error
    // -------------------------------

    let mut service_config = config_loader::run(&args.config).await?;
    if let Some(port) = args.port {
        service_config.settings.server.port = port.to_string();
    }
    logging::run(&service_config, args.log_level)?;

    // -------------------------------
    // 3. Start http server
    // -------------------------------

    info!(
        vendor = %service_config.vendor.base_url,
        redeem = %service_config.vendor.redeem_base_url(),
        "Service starting..."
    );
    server::server::start(&service_config).await
}
