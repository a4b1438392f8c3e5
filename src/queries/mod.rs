//! 派生查询
//!
//! 所有查询都是纯函数：输入为镜像当前内容（[`MirrorView`](crate::sync::MirrorView)）
//! 与调用方上下文（当前用户、当前时间），相同输入总是得到相同输出。
//!
//! 未登录时不报错，而是按"无选课"或"全部可见"处理。

pub mod enrollment;
pub mod grades;
pub mod groups;
pub mod progress;
pub mod submissions;
pub mod updates;

use chrono::{DateTime, FixedOffset, Utc, Weekday};

use crate::config::AppConfig;
use crate::utils::{EpochSeconds, normalize_id};

/// 调用方上下文
#[derive(Debug, Clone)]
pub struct QueryContext {
    pub user_id: Option<String>,
    pub now: DateTime<FixedOffset>,
    pub week_start: Weekday,
}

impl QueryContext {
    pub fn new(user_id: Option<&str>, now: DateTime<FixedOffset>, week_start: Weekday) -> Self {
        Self {
            user_id: user_id.map(str::to_string),
            now,
            week_start,
        }
    }

    /// 按配置的时区与周起始日，以当前时间构造
    pub fn from_config(config: &AppConfig, user_id: Option<&str>) -> Self {
        let now = Utc::now().with_timezone(&config.calendar_offset());
        Self::new(user_id, now, config.sync.week_start.weekday())
    }

    /// 规范化后的当前用户
    pub fn user(&self) -> Option<&str> {
        normalize_id(self.user_id.as_deref())
    }

    pub fn now_seconds(&self) -> EpochSeconds {
        self.now.timestamp_millis() as f64 / 1000.0
    }
}
