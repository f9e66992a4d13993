use clap::Parser;
use length_convert::utils::logger;
use length_convert::{ConvertArgs, InputParser, LengthConverter, ServerConfig, UnitCatalog};

fn main() {
    let args = ConvertArgs::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);
    tracing::debug!("CLI args: {:?}", args);

    // 建立單位目錄: 設定檔優先，其次 --extended
    let catalog = match &args.config {
        Some(path) => match ServerConfig::from_file(path).and_then(|c| c.build_catalog()) {
            Ok(catalog) => catalog,
            Err(e) => {
                tracing::error!("❌ Failed to load units from '{}': {}", path.display(), e);
                eprintln!("❌ {}", e.user_friendly_message());
                eprintln!("💡 建議: {}", e.recovery_suggestion());
                std::process::exit(e.exit_code().max(1));
            }
        },
        None if args.extended => UnitCatalog::extended(),
        None => UnitCatalog::basic(),
    };

    let converter = LengthConverter::with_catalog(catalog);
    let output = InputParser::new(&converter).convert_args(&args.expression);
    println!("{}", output);
}
