use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://paperboy.db".to_string(),
            max_connections: 5,
        }
    }
}

impl DatabaseConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.url.is_empty() {
            return Err(anyhow::anyhow!("数据库URL不能为空"));
        }

        if !self.url.starts_with("sqlite:") {
            return Err(anyhow::anyhow!("数据库URL必须是SQLite格式"));
        }

        if self.max_connections == 0 {
            return Err(anyhow::anyhow!("最大连接数必须大于0"));
        }

        Ok(())
    }
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub redis_url: String,
    pub key_prefix: String,
    pub ttl_seconds: u64,
    pub command_timeout_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            redis_url: "redis://127.0.0.1:6379".to_string(),
            key_prefix: "paperboy".to_string(),
            ttl_seconds: 3600,
            command_timeout_ms: 500,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.enabled
            && !self.redis_url.starts_with("redis://")
            && !self.redis_url.starts_with("rediss://")
        {
            return Err(anyhow::anyhow!("缓存URL必须是Redis格式: {}", self.redis_url));
        }

        if self.ttl_seconds == 0 {
            return Err(anyhow::anyhow!("缓存TTL必须大于0"));
        }

        if self.command_timeout_ms == 0 {
            return Err(anyhow::anyhow!("缓存命令超时时间必须大于0"));
        }

        Ok(())
    }
}

/// Content source configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SourceConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_seconds: u64,
    /// 每次抓取回溯的时间窗口
    pub lookback_minutes: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://content.guardianapis.com".to_string(),
            api_key: String::new(),
            timeout_seconds: 30,
            lookback_minutes: 60,
        }
    }
}

impl SourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn lookback(&self) -> Duration {
        Duration::from_secs(self.lookback_minutes * 60)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(anyhow::anyhow!("内容源地址必须是HTTP(S)格式: {}", self.base_url));
        }

        if self.timeout_seconds == 0 {
            return Err(anyhow::anyhow!("内容源请求超时时间必须大于0"));
        }

        if self.lookback_minutes == 0 {
            return Err(anyhow::anyhow!("回溯时间窗口必须大于0"));
        }

        Ok(())
    }
}

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub max_concurrency: usize,
    /// 标题或URL匹配任一正则的文章会被丢弃
    pub exclude_patterns: Vec<String>,
    pub summary_sentences: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 8,
            exclude_patterns: Vec::new(),
            summary_sentences: 7,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_concurrency == 0 {
            return Err(anyhow::anyhow!("最大并发数必须大于0"));
        }

        if self.summary_sentences == 0 {
            return Err(anyhow::anyhow!("摘要句子数必须大于0"));
        }

        for pattern in &self.exclude_patterns {
            regex::Regex::new(pattern)
                .map_err(|e| anyhow::anyhow!("无效的排除规则 '{}': {}", pattern, e))?;
        }

        Ok(())
    }
}

/// API configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    pub enabled: bool,
    pub bind_address: String,
    pub request_timeout_seconds: u64,
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_seconds: 60,
            default_page_size: 10,
            max_page_size: 50,
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.bind_address.parse::<SocketAddr>().is_err() {
            return Err(anyhow::anyhow!("无效的绑定地址: {}", self.bind_address));
        }

        if self.request_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("请求超时时间必须大于0"));
        }

        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            return Err(anyhow::anyhow!(
                "默认分页大小必须在 1 到 {} 之间",
                self.max_page_size
            ));
        }

        Ok(())
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: String,
    /// `pretty` 或 `json`
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

impl ObservabilityConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(anyhow::anyhow!("无效的日志级别: {}", self.log_level));
        }

        if !matches!(self.log_format.as_str(), "pretty" | "json") {
            return Err(anyhow::anyhow!("无效的日志格式: {}", self.log_format));
        }

        Ok(())
    }
}

/// 一个定时抓取任务
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct JobConfig {
    pub name: String,
    pub section: String,
    pub period_seconds: u64,
    pub recovery_period_seconds: u64,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            name: "guardian-world".to_string(),
            section: "world".to_string(),
            period_seconds: 3600,
            recovery_period_seconds: 300,
        }
    }
}

impl JobConfig {
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period_seconds)
    }

    pub fn recovery_period(&self) -> Duration {
        Duration::from_secs(self.recovery_period_seconds)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.name.is_empty() {
            return Err(anyhow::anyhow!("任务名称不能为空"));
        }

        if self.section.is_empty() {
            return Err(anyhow::anyhow!("任务 {} 的栏目不能为空", self.name));
        }

        if self.period_seconds == 0 || self.recovery_period_seconds == 0 {
            return Err(anyhow::anyhow!("任务 {} 的调度周期必须大于0", self.name));
        }

        Ok(())
    }
}
