use serde_json::Value;

use super::entities::fields;
use crate::utils::RawFields;

// 创建班级请求
//
// 教师 ID 缺失时写入空字符串，与现有客户端保持一致
#[derive(Debug, Clone, Default)]
pub struct CreateClassRequest {
    pub name: String,
    pub teacher_id: Option<String>,
    pub students: Vec<String>,
}

impl CreateClassRequest {
    pub fn into_fields(self) -> RawFields {
        let mut payload = RawFields::new();
        payload.insert(fields::NAME.into(), Value::from(self.name));
        payload.insert(
            fields::TEACHER_ID.into(),
            Value::from(self.teacher_id.unwrap_or_default()),
        );
        payload.insert(fields::STUDENTS.into(), Value::from(self.students));
        payload
    }
}

// 更新班级请求，只写入提供的字段
#[derive(Debug, Clone, Default)]
pub struct UpdateClassRequest {
    pub name: Option<String>,
    pub teacher_id: Option<String>,
    pub students: Option<Vec<String>>,
}

impl UpdateClassRequest {
    pub fn into_fields(self) -> RawFields {
        let mut payload = RawFields::new();
        if let Some(name) = self.name {
            payload.insert(fields::NAME.into(), Value::from(name));
        }
        if let Some(teacher_id) = self.teacher_id {
            payload.insert(fields::TEACHER_ID.into(), Value::from(teacher_id));
        }
        if let Some(students) = self.students {
            payload.insert(fields::STUDENTS.into(), Value::from(students));
        }
        payload
    }
}
