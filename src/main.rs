use anyhow::Context;
use clap::Parser;
use pingora_core::server::configuration::Opt;
use pingora_core::server::Server;
use std::path::PathBuf;
use std::sync::Arc;
use tsubame::config::Config;
use tsubame::handler::{HandlerOptions, ImageHandler, TracingSink};
use tsubame::proxy::ImageProxy;
use tsubame::storage::build_store;

/// Tsubame - on-demand image resizing proxy built with Cloudflare's Pingora
#[derive(Parser, Debug)]
#[command(name = "tsubame")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Daemon mode
    #[arg(short = 'd', long)]
    daemon: bool,

    /// Test configuration and exit
    #[arg(long)]
    test: bool,

    /// Upgrade workers gracefully
    #[arg(long)]
    upgrade: bool,
}

fn main() -> anyhow::Result<()> {
    tsubame::logging::init_subscriber()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging subsystem: {}", e))?;

    let args = Args::parse();

    let config = Config::from_file(&args.config).with_context(|| {
        format!(
            "Failed to load configuration from {}",
            args.config.display()
        )
    })?;
    config.validate().context("Configuration is invalid")?;

    tracing::info!(
        config_file = %args.config.display(),
        server_address = %config.server.address,
        server_port = config.server.port,
        route_prefix = %config.routing.prefix,
        storage_backend = ?config.storage.backend,
        target_format = %config.image.target_format,
        "Configuration loaded successfully"
    );

    if args.test {
        println!("Configuration file {} is valid", args.config.display());
        return Ok(());
    }

    // The store is built before Pingora starts its own runtimes
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create bootstrap runtime")?;
    let store = runtime
        .block_on(build_store(&config.storage))
        .context("Failed to initialize storage backend")?;
    drop(runtime);

    tracing::info!(backend = store.backend_name(), "Storage backend ready");

    let handler = ImageHandler::new(
        store,
        Arc::new(TracingSink),
        HandlerOptions::from(&config),
    );
    let proxy = ImageProxy::new(Arc::new(handler));

    let opt = Opt {
        daemon: args.daemon,
        test: args.test,
        upgrade: args.upgrade,
        ..Default::default()
    };

    let mut server = Server::new(Some(opt)).context("Failed to create Pingora server")?;
    if let Some(conf) = Arc::get_mut(&mut server.configuration) {
        conf.threads = config.server.threads;
    }
    server.bootstrap();

    let mut proxy_service = pingora_proxy::http_proxy_service(&server.configuration, proxy);

    let listen_addr = config.server.listen_addr();
    proxy_service.add_tcp(&listen_addr);

    tracing::info!(
        address = %listen_addr,
        threads = config.server.threads,
        "Starting Tsubame image proxy"
    );

    server.add_service(proxy_service);
    server.run_forever();
}
