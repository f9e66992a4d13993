use anyhow::Context;
use clap::Parser;
use length_convert::rpc::{ConvertHandler, RpcServer};
use length_convert::utils::{logger, validation::Validate};
use length_convert::{LengthConverter, ServerArgs, ServerConfig};
use std::sync::Arc;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ServerArgs::parse();

    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if config.logging.json {
        logger::init_json_logger(config.logging.verbose);
    } else {
        logger::init_cli_logger(config.logging.verbose);
    }

    tracing::info!("🚀 Starting length conversion service v{}", env!("CARGO_PKG_VERSION"));

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    run(config).await
}

async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let catalog = config.build_catalog().context("Failed to build unit catalog")?;
    let converter: Arc<LengthConverter> = Arc::new(LengthConverter::with_catalog(catalog));

    let server = RpcServer::bind(
        config.rpc_addr(),
        ConvertHandler::new(converter.clone()),
        config.server_limits(),
    )
    .await
    .with_context(|| format!("Failed to bind RPC service on {}", config.rpc_addr()))?;

    // Ctrl-C 同時通知 RPC 與 HTTP
    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("🛑 Received Ctrl-C, shutting down");
        }
        let _ = stop_tx.send(true);
    });

    let http = if config.http.enabled {
        start_http(&config, converter.clone(), stop_rx.clone()).await?
    } else {
        tracing::info!("⚙️ HTTP API disabled");
        None
    };

    server
        .serve_with_shutdown(wait_for_stop(stop_rx))
        .await
        .context("RPC service failed")?;

    if let Some(handle) = http {
        handle.await.context("HTTP task panicked")??;
    }

    tracing::info!("✅ Shut down cleanly");
    Ok(())
}

async fn wait_for_stop(mut stop: watch::Receiver<bool>) {
    while !*stop.borrow() {
        if stop.changed().await.is_err() {
            break;
        }
    }
}

#[cfg(feature = "web")]
async fn start_http(
    config: &ServerConfig,
    converter: Arc<LengthConverter>,
    stop: watch::Receiver<bool>,
) -> anyhow::Result<Option<tokio::task::JoinHandle<length_convert::Result<()>>>> {
    use length_convert::web::{self, WebState};

    let listener = tokio::net::TcpListener::bind(config.http_addr())
        .await
        .with_context(|| format!("Failed to bind HTTP API on {}", config.http_addr()))?;
    let state = WebState::new(converter);

    Ok(Some(tokio::spawn(web::serve(
        listener,
        state,
        wait_for_stop(stop),
    ))))
}

#[cfg(not(feature = "web"))]
async fn start_http(
    _config: &ServerConfig,
    _converter: Arc<LengthConverter>,
    _stop: watch::Receiver<bool>,
) -> anyhow::Result<Option<tokio::task::JoinHandle<length_convert::Result<()>>>> {
    tracing::warn!("⚠️ Built without the `web` feature, HTTP API not available");
    Ok(None)
}
