use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// 应用配置结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub store: StoreConfig,
    pub sync: SyncConfig,
    pub lookup: LookupConfig,
}

/// 应用设置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub system_name: String,
    pub environment: String,
    pub log_level: String,
}

/// 远程存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: String,   // 已注册的存储插件名称
    pub seed_file: String, // 初始数据 JSON 文件，空字符串表示不加载
}

/// 同步配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub channel_capacity: usize, // 每个集合的推送缓冲
    pub week_start: WeekStart,
    pub utc_offset_minutes: i32, // 计算周边界使用的时区偏移
    pub current_user: String,    // 当前登录用户，空字符串表示未登录
}

/// 一周的起始日
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekStart {
    Sunday,
    Monday,
}

impl WeekStart {
    pub fn weekday(self) -> Weekday {
        match self {
            WeekStart::Sunday => Weekday::Sun,
            WeekStart::Monday => Weekday::Mon,
        }
    }
}

/// 用户联系方式查询缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupConfig {
    pub max_capacity: u64,
    pub ttl_secs: u64,
}
