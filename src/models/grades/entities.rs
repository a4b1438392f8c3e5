use serde::Serialize;

use crate::models::{CollectionKind, Entity};
use crate::utils::RawFields;
use crate::utils::normalize::{number_field, string_field};

pub(crate) mod fields {
    pub const ASSIGNMENT_ID: &str = "assignmentID";
    pub const GRADER_ID: &str = "graderID";
    pub const CLASS_ID: &str = "classID";
    pub const POINTS: &str = "gradePoints";
    pub const MAX_POINTS: &str = "gradeMaxPoints";
    pub const SECTION: &str = "gradeSection";
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeRecord {
    // 评分键
    pub id: String,
    // 关联的作业 ID
    pub assignment_id: Option<String>,
    // 评分人 ID
    pub grader_id: Option<String>,
    // 所属班级 ID
    pub class_id: Option<String>,
    // 得分
    pub points: Option<f64>,
    // 满分
    pub max_points: Option<f64>,
    // 分组标签
    pub section: Option<String>,
}

impl GradeRecord {
    /// 得分与满分都缺失即视为未评分
    pub fn is_graded(&self) -> bool {
        self.points.is_some() || self.max_points.is_some()
    }

    /// 得分与满分同时存在时返回二者
    pub fn scored(&self) -> Option<(f64, f64)> {
        Some((self.points?, self.max_points?))
    }
}

impl Entity for GradeRecord {
    const KIND: CollectionKind = CollectionKind::Grades;

    fn from_fields(key: &str, raw: &RawFields) -> Self {
        Self {
            id: key.to_string(),
            assignment_id: string_field(raw, fields::ASSIGNMENT_ID),
            grader_id: string_field(raw, fields::GRADER_ID),
            class_id: string_field(raw, fields::CLASS_ID),
            points: number_field(raw, fields::POINTS),
            max_points: number_field(raw, fields::MAX_POINTS),
            section: string_field(raw, fields::SECTION),
        }
    }

    fn key(&self) -> &str {
        &self.id
    }
}
