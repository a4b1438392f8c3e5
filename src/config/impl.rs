use chrono::{FixedOffset, Offset, Utc};
use config::{Config, ConfigError, Environment, File};
use std::sync::OnceLock;

use super::AppConfig;

static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

impl AppConfig {
    /// 加载配置
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            // 内置默认值
            .set_default("app.system_name", "ClassHub")?
            .set_default("app.environment", "development")?
            .set_default("app.log_level", "info")?
            .set_default("store.backend", "memory")?
            .set_default("store.seed_file", "")?
            .set_default("sync.channel_capacity", 64)?
            .set_default("sync.week_start", "sunday")?
            .set_default("sync.utc_offset_minutes", 0)?
            .set_default("sync.current_user", "")?
            .set_default("lookup.max_capacity", 1024)?
            .set_default("lookup.ttl_secs", 600)?
            // 首先加载默认配置文件
            .add_source(File::with_name("config").required(false))
            // 然后根据环境加载特定配置文件
            .add_source(
                File::with_name(&format!(
                    "config.{}",
                    std::env::var("APP_ENV").unwrap_or_else(|_| "development".into())
                ))
                .required(false),
            )
            // 最后加载环境变量覆盖
            .add_source(
                Environment::with_prefix("CLASSHUB")
                    .separator("__")
                    .try_parsing(true),
            );

        // 支持从环境变量加载
        builder = builder
            .set_override_option("app.environment", std::env::var("APP_ENV").ok())?
            .set_override_option("app.log_level", std::env::var("RUST_LOG").ok())?
            .set_override_option("store.seed_file", std::env::var("CLASSHUB_SEED_FILE").ok())?
            .set_override_option("sync.current_user", std::env::var("CLASSHUB_USER").ok())?;

        let config = builder.build()?;
        let mut app_config: AppConfig = config.try_deserialize()?;

        // 缓冲至少为 1
        if app_config.sync.channel_capacity == 0 {
            app_config.sync.channel_capacity = 1;
        }

        Ok(app_config)
    }

    /// 获取全局配置实例
    pub fn get() -> &'static AppConfig {
        APP_CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                eprintln!("Failed to load configuration: {e}");
                std::process::exit(1);
            })
        })
    }

    /// 初始化配置 (在应用启动时调用)
    pub fn init() -> Result<(), ConfigError> {
        let config = Self::load()?;
        APP_CONFIG
            .set(config)
            .map_err(|_| ConfigError::Message("Configuration already initialized".to_string()))?;
        Ok(())
    }

    /// 检查是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app.environment == "production"
    }

    /// 检查是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app.environment == "development"
    }

    /// 配置的当前用户（未配置时为 None）
    pub fn current_user(&self) -> Option<&str> {
        let user = self.sync.current_user.trim();
        if user.is_empty() { None } else { Some(user) }
    }

    /// 初始数据文件路径（未配置时为 None）
    pub fn seed_file(&self) -> Option<&str> {
        if self.store.seed_file.is_empty() {
            None
        } else {
            Some(&self.store.seed_file)
        }
    }

    /// 周边界计算使用的时区
    pub fn calendar_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.sync.utc_offset_minutes * 60)
            .unwrap_or_else(|| Utc.fix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_defaults() {
        let config = AppConfig::load().unwrap();
        assert_eq!(config.store.backend, "memory");
        assert!(config.sync.channel_capacity >= 1);
        assert!(config.lookup.max_capacity > 0);
    }

    #[test]
    fn test_calendar_offset_out_of_range_falls_back_to_utc() {
        let mut config = AppConfig::load().unwrap();
        config.sync.utc_offset_minutes = 100_000;
        assert_eq!(config.calendar_offset().local_minus_utc(), 0);
        config.sync.utc_offset_minutes = 480;
        assert_eq!(config.calendar_offset().local_minus_utc(), 480 * 60);
    }
}
