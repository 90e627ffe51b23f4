use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use super::sections::{
    ApiConfig, CacheConfig, DatabaseConfig, JobConfig, ObservabilityConfig, PipelineConfig,
    SourceConfig,
};

fn default_jobs() -> Vec<JobConfig> {
    vec![JobConfig::default()]
}

/// System configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub source: SourceConfig,
    pub pipeline: PipelineConfig,
    pub api: ApiConfig,
    pub observability: ObservabilityConfig,
    #[serde(default = "default_jobs")]
    pub jobs: Vec<JobConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            cache: CacheConfig::default(),
            source: SourceConfig::default(),
            pipeline: PipelineConfig::default(),
            api: ApiConfig::default(),
            observability: ObservabilityConfig::default(),
            jobs: default_jobs(),
        }
    }
}

impl AppConfig {
    /// Load configuration from config file and environment variables
    ///
    /// Load order:
    /// 1. Default configuration
    /// 2. Config file (TOML format)
    /// 3. Environment variable overrides (`PAPERBOY__SECTION__KEY`)
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_path {
            if Path::new(path).exists() {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            } else {
                return Err(anyhow::anyhow!("配置文件不存在: {}", path));
            }
        } else {
            let default_paths = ["config/paperboy.toml", "paperboy.toml"];
            if let Some(path) = default_paths.iter().find(|p| Path::new(p).exists()) {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("PAPERBOY")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder
            .build()
            .context("构建配置失败")?
            .try_deserialize()
            .context("反序列化配置失败")?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(toml_str).context("解析TOML配置失败")?;

        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("序列化配置为TOML失败")
    }

    pub fn validate(&self) -> Result<()> {
        self.database.validate().context("数据库配置验证失败")?;
        self.cache.validate().context("缓存配置验证失败")?;
        self.source.validate().context("内容源配置验证失败")?;
        self.pipeline.validate().context("流水线配置验证失败")?;
        self.api.validate().context("API配置验证失败")?;
        self.observability
            .validate()
            .context("可观测性配置验证失败")?;

        let mut names = HashSet::new();
        for job in &self.jobs {
            job.validate().context("定时任务配置验证失败")?;
            if !names.insert(job.name.as_str()) {
                return Err(anyhow::anyhow!("定时任务名称重复: {}", job.name));
            }
        }

        Ok(())
    }
}
