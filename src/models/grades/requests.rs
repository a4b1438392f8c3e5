use serde_json::Value;

use super::entities::fields;
use crate::utils::RawFields;

// 创建评分请求
#[derive(Debug, Clone, Default)]
pub struct CreateGradeRequest {
    pub class_id: String,
    pub assignment_id: Option<String>,
    pub grader_id: Option<String>,
    pub points: Option<f64>,
    pub max_points: Option<f64>,
    pub section: Option<String>,
}

impl CreateGradeRequest {
    pub fn into_fields(self) -> RawFields {
        let mut payload = RawFields::new();
        payload.insert(fields::CLASS_ID.into(), Value::from(self.class_id));
        if let Some(assignment_id) = self.assignment_id {
            payload.insert(fields::ASSIGNMENT_ID.into(), Value::from(assignment_id));
        }
        if let Some(grader_id) = self.grader_id {
            payload.insert(fields::GRADER_ID.into(), Value::from(grader_id));
        }
        if let Some(points) = self.points {
            payload.insert(fields::POINTS.into(), Value::from(points));
        }
        if let Some(max_points) = self.max_points {
            payload.insert(fields::MAX_POINTS.into(), Value::from(max_points));
        }
        if let Some(section) = self.section {
            payload.insert(fields::SECTION.into(), Value::from(section));
        }
        payload
    }
}

// 更新评分请求
#[derive(Debug, Clone, Default)]
pub struct UpdateGradeRequest {
    pub points: Option<f64>,
    pub max_points: Option<f64>,
    pub section: Option<String>,
}

impl UpdateGradeRequest {
    pub fn into_fields(self) -> RawFields {
        let mut payload = RawFields::new();
        if let Some(points) = self.points {
            payload.insert(fields::POINTS.into(), Value::from(points));
        }
        if let Some(max_points) = self.max_points {
            payload.insert(fields::MAX_POINTS.into(), Value::from(max_points));
        }
        if let Some(section) = self.section {
            payload.insert(fields::SECTION.into(), Value::from(section));
        }
        payload
    }
}
