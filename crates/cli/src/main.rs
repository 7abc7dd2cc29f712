use clap::Parser;
use relay_dns_application::ResolveQueryUseCase;
use relay_dns_domain::{CliOverrides, Config};
use relay_dns_infrastructure::dns::transport::{DohUpstream, UdpUpstream};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod bootstrap;
mod server;

#[derive(Parser)]
#[command(name = "relay-dns")]
#[command(version)]
#[command(about = "Relay DNS - forwarding DNS proxy with DoH fallback")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// DNS listener port
    #[arg(short = 'd', long)]
    dns_port: Option<u16>,

    /// Bind address
    #[arg(short = 'b', long)]
    bind: Option<String>,

    /// Upstream DNS server (ip:port)
    #[arg(short = 'u', long)]
    upstream: Option<String>,

    /// DoH JSON endpoint URL
    #[arg(long)]
    doh_endpoint: Option<String>,

    /// Disable the DoH resolver entirely
    #[arg(long)]
    no_doh: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        dns_port: cli.dns_port,
        bind_address: cli.bind.clone(),
        upstream: cli.upstream.clone(),
        doh_endpoint: cli.doh_endpoint.clone(),
        no_doh: cli.no_doh,
        log_level: cli.log_level.clone(),
    };

    let config = Config::load(cli.config.as_deref(), cli_overrides)?;
    config.validate()?;

    bootstrap::init_logging(&config);

    info!("Starting Relay DNS v{}", env!("CARGO_PKG_VERSION"));

    let timeout = Duration::from_millis(config.upstream.query_timeout);

    let udp = Arc::new(UdpUpstream::from_config(&config.upstream)?);
    let doh: Option<Arc<dyn relay_dns_application::UpstreamResolver>> = if config.doh.enabled {
        info!(endpoint = %config.doh.endpoint, "DoH resolver enabled");
        Some(Arc::new(DohUpstream::from_config(&config.doh, timeout)))
    } else {
        None
    };

    let use_case = Arc::new(ResolveQueryUseCase::new(doh, udp));

    server::start_dns_server(&config.server, use_case).await
}
