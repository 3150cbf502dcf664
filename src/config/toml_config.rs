use crate::core::reputation::ReputationWeights;
use crate::core::revenue_updater::UpdaterSettings;
use crate::utils::error::{RevenueError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_range,
    validate_weights_sum, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub simulation: SimulationInfo,
    pub input: InputConfig,
    pub output: OutputConfig,
    pub reputation: Option<ReputationConfig>,
    pub engine: Option<ExecutionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationInfo {
    pub name: String,
    pub description: Option<String>,
    pub period: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub scenario_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub output_path: String,
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReputationConfig {
    pub service_quality_weight: f64,
    pub seat_comfort_weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    pub max_concurrent_markets: Option<usize>,
}

impl EngineConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(RevenueError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${SCENARIO_DIR})，未定義的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| RevenueError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("simulation.name", &self.simulation.name)?;
        validate_path("input.scenario_path", &self.input.scenario_path)?;
        validate_path("output.output_path", &self.output.output_path)?;
        if let Some(file_name) = &self.output.file_name {
            validate_path("output.file_name", file_name)?;
        }

        if let Some(reputation) = &self.reputation {
            validate_range(
                "reputation.service_quality_weight",
                reputation.service_quality_weight,
                0.0,
                1.0,
            )?;
            validate_range(
                "reputation.seat_comfort_weight",
                reputation.seat_comfort_weight,
                0.0,
                1.0,
            )?;
            validate_weights_sum(
                "reputation",
                &[
                    reputation.service_quality_weight,
                    reputation.seat_comfort_weight,
                ],
            )?;
        }

        if let Some(concurrent) = self.engine.as_ref().and_then(|e| e.max_concurrent_markets) {
            validate_positive_number("engine.max_concurrent_markets", concurrent, 1)?;
        }

        Ok(())
    }

    /// 取得要計算的期間
    pub fn period(&self) -> Result<u32> {
        self.simulation
            .period
            .ok_or_else(|| RevenueError::MissingConfigError {
                field: "simulation.period".to_string(),
            })
    }

    pub fn scenario_path(&self) -> &str {
        &self.input.scenario_path
    }

    pub fn output_path(&self) -> &str {
        &self.output.output_path
    }

    pub fn file_name(&self) -> &str {
        self.output
            .file_name
            .as_deref()
            .unwrap_or(crate::adapters::csv_store::DEFAULT_FILE_NAME)
    }

    pub fn max_concurrent_markets(&self) -> usize {
        self.engine
            .as_ref()
            .and_then(|e| e.max_concurrent_markets)
            .unwrap_or(UpdaterSettings::default().max_concurrent_markets)
    }

    pub fn reputation_weights(&self) -> ReputationWeights {
        self.reputation
            .as_ref()
            .map(|r| ReputationWeights {
                service_quality: r.service_quality_weight,
                seat_comfort: r.seat_comfort_weight,
            })
            .unwrap_or_default()
    }

    pub fn updater_settings(&self) -> UpdaterSettings {
        UpdaterSettings {
            reputation: self.reputation_weights(),
            max_concurrent_markets: self.max_concurrent_markets(),
        }
    }
}

impl Validate for EngineConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
