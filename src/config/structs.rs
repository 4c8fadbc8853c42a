use serde::{Deserialize, Serialize};

use crate::errors::{LinkshelfError, Result};
use crate::utils::code_generator::MAX_CODE_LENGTH;

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 包含：
/// - links: 短码长度、默认 TTL、默认点击上限、基础 URL
/// - notifications: 通知开关与收件箱容量
/// - sweeper: 过期清理与统计日志的周期
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct StaticConfig {
    #[serde(default)]
    pub links: LinksConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub sweeper: SweeperConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从指定 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > TOML 文件 > 默认值
    /// ENV 前缀：LS，分隔符：__
    /// 示例：LS__LINKS__CODE_LENGTH=10
    pub fn load_from(path: &str) -> Result<Self> {
        use config::{Config, Environment, File};

        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("LS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: StaticConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 校验配置值
    pub fn validate(&self) -> Result<()> {
        if self.links.code_length == 0 || self.links.code_length > MAX_CODE_LENGTH {
            return Err(LinkshelfError::config(format!(
                "links.code_length must be between 1 and {}",
                MAX_CODE_LENGTH
            )));
        }
        if self.links.default_ttl_hours == 0 {
            return Err(LinkshelfError::config(
                "links.default_ttl_hours must be positive",
            ));
        }
        let ttl = chrono::Duration::try_hours(i64::from(self.links.default_ttl_hours));
        if ttl
            .and_then(|ttl| chrono::Utc::now().checked_add_signed(ttl))
            .is_none()
        {
            return Err(LinkshelfError::config(format!(
                "links.default_ttl_hours {} is out of range",
                self.links.default_ttl_hours
            )));
        }
        if self.links.default_click_limit == 0 {
            return Err(LinkshelfError::config(
                "links.default_click_limit must be positive",
            ));
        }
        if self.notifications.history_capacity == 0 {
            return Err(LinkshelfError::config(
                "notifications.history_capacity must be positive",
            ));
        }
        if self.sweeper.interval_secs == 0 || self.sweeper.stats_interval_secs == 0 {
            return Err(LinkshelfError::config("sweeper intervals must be positive"));
        }
        Ok(())
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }
}

/// 短链接配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinksConfig {
    #[serde(default = "default_code_length")]
    pub code_length: usize,
    #[serde(default = "default_ttl_hours")]
    pub default_ttl_hours: u32,
    #[serde(default = "default_click_limit")]
    pub default_click_limit: u32,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

/// 通知配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationsConfig {
    #[serde(default = "default_notifications_enabled")]
    pub enabled: bool,
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
}

/// 后台清理配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SweeperConfig {
    #[serde(default = "default_sweep_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_stats_interval_secs")]
    pub stats_interval_secs: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions
// ============================================================

fn default_code_length() -> usize {
    8
}

fn default_ttl_hours() -> u32 {
    24
}

fn default_click_limit() -> u32 {
    10
}

fn default_base_url() -> String {
    "http://localhost:8080/".to_string()
}

fn default_notifications_enabled() -> bool {
    true
}

fn default_history_capacity() -> usize {
    50
}

fn default_sweep_interval_secs() -> u64 {
    3600
}

fn default_stats_interval_secs() -> u64 {
    1800
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            code_length: default_code_length(),
            default_ttl_hours: default_ttl_hours(),
            default_click_limit: default_click_limit(),
            base_url: default_base_url(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: default_notifications_enabled(),
            history_capacity: default_history_capacity(),
        }
    }
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_sweep_interval_secs(),
            stats_interval_secs: default_stats_interval_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}
