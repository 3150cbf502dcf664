use anyhow::Context;
use clap::Parser;
use route_revenue::utils::error::ErrorSeverity;
use route_revenue::utils::{logger, validation::Validate};
use route_revenue::{
    CliConfig, CsvRevenueStore, EngineConfig, RevenueError, RevenueUpdater, ScenarioSource,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    let run_id = chrono::Utc::now().format("%Y%m%dT%H%M%SZ").to_string();
    tracing::info!("🚀 Starting route-revenue run {}", run_id);
    tracing::info!("📁 Loading configuration from: {}", cli.config);

    let mut config = match EngineConfig::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", cli.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    cli.apply_overrides(&mut config);

    // 驗證配置
    if let Err(e) = config.validate() {
        fail(&e);
    }
    let period = match config.period() {
        Ok(period) => period,
        Err(e) => fail(&e),
    };

    let source = match ScenarioSource::from_file(config.scenario_path()) {
        Ok(source) => source,
        Err(e) => fail(&e),
    };
    tracing::info!(
        "✅ Scenario {} loaded ({} markets)",
        config.scenario_path(),
        source.market_count()
    );

    let store = CsvRevenueStore::with_file_name(
        config.output_path().to_string(),
        config.file_name().to_string(),
    );
    let output_file = store.file_path();
    let updater = RevenueUpdater::new(source, store, config.updater_settings());

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - records will not be written");
        let records = match updater.preview_period(period).await {
            Ok(records) => records,
            Err(e) => fail(&e),
        };
        let rendered =
            serde_json::to_string_pretty(&records).context("Failed to render preview records")?;
        println!("{}", rendered);
        return Ok(());
    }

    match updater.run_period(period).await {
        Ok(summary) => {
            tracing::info!("📁 Records saved to: {}", output_file.display());
            let rendered =
                serde_json::to_string_pretty(&summary).context("Failed to render run summary")?;
            println!("{}", rendered);
        }
        Err(e) => fail(&e),
    }

    Ok(())
}

fn fail(e: &RevenueError) -> ! {
    tracing::error!(
        "❌ Revenue update failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
