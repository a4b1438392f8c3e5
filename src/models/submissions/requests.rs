use serde_json::Value;

use super::entities::fields;
use crate::utils::RawFields;

// 创建作业提交请求
#[derive(Debug, Clone, Default)]
pub struct CreateSubmissionRequest {
    pub submitter_id: Option<String>,
    pub assignment_id: String,
    pub class_id: Option<String>,
    pub submission_link: Option<String>,
}

impl CreateSubmissionRequest {
    pub fn into_fields(self) -> RawFields {
        let mut payload = RawFields::new();
        payload.insert(
            fields::SUBMITTER_ID.into(),
            Value::from(self.submitter_id.unwrap_or_default()),
        );
        payload.insert(fields::ASSIGNMENT_ID.into(), Value::from(self.assignment_id));
        if let Some(class_id) = self.class_id {
            payload.insert(fields::CLASS_ID.into(), Value::from(class_id));
        }
        if let Some(link) = self.submission_link {
            payload.insert(fields::LINK.into(), Value::from(link));
        }
        payload
    }
}
