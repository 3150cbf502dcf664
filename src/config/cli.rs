use crate::config::toml_config::EngineConfig;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "route-revenue")]
#[command(about = "Allocates market demand to airline routes and records the period's revenue")]
pub struct CliConfig {
    /// Path to the engine TOML configuration
    #[arg(short, long, default_value = "route-revenue.toml")]
    pub config: String,

    /// Override the scenario file from the configuration
    #[arg(long)]
    pub scenario: Option<String>,

    /// Period to compute (overrides simulation.period)
    #[arg(short, long)]
    pub period: Option<u32>,

    /// Override the output directory from the configuration
    #[arg(long)]
    pub output_path: Option<String>,

    /// Override engine.max_concurrent_markets
    #[arg(long)]
    pub max_concurrent_markets: Option<usize>,

    /// Compute and print the records without writing them
    #[arg(long)]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

impl CliConfig {
    /// 將命令列參數覆蓋到 TOML 配置
    pub fn apply_overrides(&self, config: &mut EngineConfig) {
        if let Some(scenario) = &self.scenario {
            tracing::info!("🔧 Scenario overridden to: {}", scenario);
            config.input.scenario_path = scenario.clone();
        }
        if let Some(period) = self.period {
            config.simulation.period = Some(period);
        }
        if let Some(output_path) = &self.output_path {
            tracing::info!("🔧 Output path overridden to: {}", output_path);
            config.output.output_path = output_path.clone();
        }
        if let Some(concurrent) = self.max_concurrent_markets {
            config
                .engine
                .get_or_insert(crate::config::toml_config::ExecutionConfig {
                    max_concurrent_markets: None,
                })
                .max_concurrent_markets = Some(concurrent);
        }
    }
}
