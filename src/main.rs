use clap::Parser;
use sbr_etl::app::runner;
use sbr_etl::core::ConfigProvider;
use sbr_etl::utils::{logger, validation::Validate};
use sbr_etl::{CliConfig, TomlConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 載入 TOML 配置 (若有指定)，命令列檔案附加在後
    let toml_config = match &cli.config {
        Some(path) => match TomlConfig::from_file(path) {
            Ok(mut config) => {
                config.input.files.extend(cli.files.iter().cloned());
                config.logging.verbose |= cli.verbose;
                config.logging.json |= cli.log_json;
                config.logging.monitor |= cli.monitor;
                Some(config)
            }
            Err(e) => {
                eprintln!("❌ Failed to load config file {}: {}", path, e.user_friendly_message());
                eprintln!("💡 建議: {}", e.recovery_suggestion());
                std::process::exit(1);
            }
        },
        None => None,
    };

    // 初始化日誌
    let (verbose, json, monitor) = match &toml_config {
        Some(config) => (
            config.logging.verbose,
            config.logging.json,
            config.logging.monitor,
        ),
        None => (cli.verbose, cli.log_json, cli.monitor),
    };
    if json {
        logger::init_json_logger(verbose);
    } else {
        logger::init_cli_logger(verbose);
    }

    tracing::info!("Starting sbr-etl");
    if verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }
    if monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let exit_code = match toml_config {
        Some(config) => run(config, monitor).await,
        None => run(cli, monitor).await,
    };

    if exit_code > 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}

/// Validate, then process every input file; returns the exit code of the worst failure.
async fn run<C>(config: C, monitor: bool) -> i32
where
    C: ConfigProvider + Validate + Clone,
{
    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        return 1;
    }

    // 根據錯誤嚴重程度決定退出碼
    runner::run_files(&config, monitor).await.exit_code()
}
