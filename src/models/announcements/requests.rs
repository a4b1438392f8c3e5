use serde_json::Value;

use super::entities::fields;
use crate::utils::{EpochSeconds, RawFields};

// 创建公告请求
#[derive(Debug, Clone)]
pub struct CreateAnnouncementRequest {
    pub class_id: String,
    pub maker_id: Option<String>,
    pub title: String,
    pub subtitle: Option<String>,
    pub links: Vec<String>,
    // 发送时间，缺省为当前时间
    pub send_date: Option<EpochSeconds>,
}

impl CreateAnnouncementRequest {
    pub fn into_fields(self, now: EpochSeconds) -> RawFields {
        let mut payload = RawFields::new();
        payload.insert(
            fields::MAKER_ID.into(),
            Value::from(self.maker_id.unwrap_or_default()),
        );
        payload.insert(fields::CLASS_ID.into(), Value::from(self.class_id));
        payload.insert(
            fields::SEND_DATE.into(),
            Value::from(self.send_date.unwrap_or(now)),
        );
        payload.insert(fields::TITLE.into(), Value::from(self.title));
        if let Some(subtitle) = self.subtitle {
            payload.insert(fields::SUBTITLE.into(), Value::from(subtitle));
        }
        if !self.links.is_empty() {
            payload.insert(fields::LINKS.into(), Value::from(self.links));
        }
        payload
    }
}
