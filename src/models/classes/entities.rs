use serde::Serialize;

use crate::models::{CollectionKind, Entity};
use crate::utils::{RawFields, ids_equal};
use crate::utils::normalize::{string_field, string_list_field};

pub(crate) mod fields {
    pub const NAME: &str = "className";
    pub const TEACHER_ID: &str = "classTeacherID";
    pub const STUDENTS: &str = "classStudents";
}

/// 缺失班级名称时的默认值
pub const UNTITLED_CLASS: &str = "Untitled Class";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassRecord {
    // 班级键
    pub id: String,
    // 班级名称
    pub name: String,
    // 教师 ID
    pub teacher_id: Option<String>,
    // 学生 ID 列表（顺序无意义）
    pub students: Vec<String>,
}

impl ClassRecord {
    /// 用户是否为该班级的学生或教师
    pub fn has_member(&self, user_id: &str) -> bool {
        ids_equal(self.teacher_id.as_deref(), Some(user_id))
            || self
                .students
                .iter()
                .any(|s| ids_equal(Some(s.as_str()), Some(user_id)))
    }
}

impl Entity for ClassRecord {
    const KIND: CollectionKind = CollectionKind::Classes;

    fn from_fields(key: &str, raw: &RawFields) -> Self {
        Self {
            id: key.to_string(),
            name: string_field(raw, fields::NAME).unwrap_or_else(|| UNTITLED_CLASS.to_string()),
            teacher_id: string_field(raw, fields::TEACHER_ID),
            students: string_list_field(raw, fields::STUDENTS),
        }
    }

    fn key(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_class_defaults() {
        let class = ClassRecord::from_raw("c1", &json!({})).unwrap();
        assert_eq!(class.name, UNTITLED_CLASS);
        assert!(class.teacher_id.is_none());
        assert!(class.students.is_empty());
    }

    #[test]
    fn test_class_membership() {
        let class = ClassRecord::from_raw(
            "c1",
            &json!({ "className": "Biology", "classTeacherID": "t1", "classStudents": ["s2", "s1"] }),
        )
        .unwrap();
        assert!(class.has_member("s1"));
        assert!(class.has_member("t1"));
        assert!(!class.has_member("s3"));
        assert!(class.has_member(" s2"));
    }

    #[test]
    fn test_non_map_value_is_invalid() {
        assert!(ClassRecord::from_raw("c1", &json!("Biology")).is_none());
        assert!(ClassRecord::from_raw("c1", &json!(null)).is_none());
    }
}
