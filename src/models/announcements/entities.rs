use serde::Serialize;

use crate::models::{CollectionKind, Entity};
use crate::utils::normalize::{string_field, string_list_field, timestamp_field};
use crate::utils::{EpochSeconds, RawFields};

// 存储格式中的拼写（announement）需原样保留
pub(crate) mod fields {
    pub const MAKER_ID: &str = "announementMakerID";
    pub const CLASS_ID: &str = "classID";
    pub const SEND_DATE: &str = "announcementSendDate";
    pub const TITLE: &str = "announementTitle";
    pub const SUBTITLE: &str = "announementSubtitle";
    pub const LINKS: &str = "announementLinks";
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnouncementRecord {
    pub id: String,
    pub maker_id: Option<String>,
    pub class_id: Option<String>,
    // 发送时间（秒）
    pub send_date: Option<EpochSeconds>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub links: Vec<String>,
}

impl Entity for AnnouncementRecord {
    const KIND: CollectionKind = CollectionKind::Announcements;

    fn from_fields(key: &str, raw: &RawFields) -> Self {
        Self {
            id: key.to_string(),
            maker_id: string_field(raw, fields::MAKER_ID),
            class_id: string_field(raw, fields::CLASS_ID),
            send_date: timestamp_field(raw, fields::SEND_DATE),
            title: string_field(raw, fields::TITLE),
            subtitle: string_field(raw, fields::SUBTITLE),
            links: string_list_field(raw, fields::LINKS),
        }
    }

    fn key(&self) -> &str {
        &self.id
    }
}
