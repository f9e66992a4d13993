use clap::Parser;
use length_convert::utils::{logger, validation::Validate};
use length_convert::{
    ClientArgs, ConversionService, ConvertClient, ConvertError, LengthConverter, LocalService,
    RemoteService, Session, SessionMode,
};
use std::sync::Arc;
use tokio::io::BufReader;

#[tokio::main]
async fn main() {
    let args = ClientArgs::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);
    tracing::debug!("Client args: {:?}", args);

    if let Err(e) = args.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if let Err(e) = run(&args).await {
        tracing::error!(
            "❌ Client failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 建議: {}", e.recovery_suggestion());
        std::process::exit(e.exit_code().max(1));
    }
}

async fn run(args: &ClientArgs) -> Result<(), ConvertError> {
    let mode = if args.once {
        SessionMode::Once
    } else {
        SessionMode::Interactive
    };

    if args.local {
        tracing::info!("🔌 Converting in-process (--local)");
        let service = LocalService::new(Arc::new(LengthConverter::extended()));
        return run_session(&service, mode).await;
    }

    tracing::info!("[Client] started");
    let client = ConvertClient::connect((args.host.as_str(), args.port), args.client_options()).await?;
    tracing::info!("[Client] opened socket to {}:{}", args.host, args.port);

    let service = RemoteService::new(client);
    let result = run_session(&service, mode).await;

    // 不論成功與否都關閉連線
    if let Err(e) = service.close().await {
        tracing::debug!("Error while closing connection: {}", e);
    }
    result
}

async fn run_session<S: ConversionService>(service: &S, mode: SessionMode) -> Result<(), ConvertError> {
    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();

    let count = Session::new(service, mode).run(stdin, stdout).await?;
    tracing::info!("✅ {} conversion(s) done", count);
    Ok(())
}
