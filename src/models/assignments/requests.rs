use serde_json::Value;

use super::entities::fields;
use crate::utils::{EpochSeconds, RawFields};

// 创建作业请求
#[derive(Debug, Clone)]
pub struct CreateAssignmentRequest {
    pub title: String,
    pub subtitle: Option<String>,
    pub class_id: String,
    pub maker_id: Option<String>,
    pub due_date: Option<EpochSeconds>,
    pub turn_in: bool,
    pub retakes: bool,
    pub category: Option<String>,
}

impl CreateAssignmentRequest {
    pub fn new(title: impl Into<String>, class_id: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            class_id: class_id.into(),
            maker_id: None,
            due_date: None,
            turn_in: true,
            retakes: false,
            category: None,
        }
    }

    pub fn into_fields(self) -> RawFields {
        let mut payload = RawFields::new();
        payload.insert(fields::TITLE.into(), Value::from(self.title));
        payload.insert(fields::CLASS_ID.into(), Value::from(self.class_id));
        payload.insert(
            fields::MAKER_ID.into(),
            Value::from(self.maker_id.unwrap_or_default()),
        );
        payload.insert(fields::TURN_IN.into(), Value::from(self.turn_in));
        payload.insert(fields::RETAKES.into(), Value::from(self.retakes));
        if let Some(subtitle) = self.subtitle {
            payload.insert(fields::SUBTITLE.into(), Value::from(subtitle));
        }
        if let Some(due) = self.due_date {
            payload.insert(fields::DUE_DATE.into(), Value::from(due));
        }
        if let Some(category) = self.category {
            payload.insert(fields::CATEGORY.into(), Value::from(category));
        }
        payload
    }
}
