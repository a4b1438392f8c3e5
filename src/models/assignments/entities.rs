use serde::Serialize;

use crate::models::{CollectionKind, Entity};
use crate::utils::normalize::{bool_field, integer_field, string_field, timestamp_field};
use crate::utils::{EpochSeconds, RawFields};

pub(crate) mod fields {
    pub const TITLE: &str = "assignmentTitle";
    pub const SUBTITLE: &str = "assignmentSubtitle";
    pub const MAKER_ID: &str = "assignmentMakerID";
    pub const CLASS_ID: &str = "classID";
    pub const MAX_POINTS: &str = "maxPoints";
    pub const DUE_DATE: &str = "assignmentDueDate";
    pub const RETAKES: &str = "assignmentRetakes";
    pub const CATEGORY: &str = "assignmentCategory";
    pub const TURN_IN: &str = "assignmentTurnIn";
}

pub const UNTITLED_ASSIGNMENT: &str = "Untitled";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentRecord {
    // 作业键
    pub id: String,
    // 作业标题
    pub title: String,
    // 作业副标题
    pub subtitle: Option<String>,
    // 所属班级 ID
    pub class_id: Option<String>,
    // 创建者 ID
    pub maker_id: Option<String>,
    // 满分，缺失为 0
    pub max_points: i64,
    // 截止时间（秒）
    pub due_date: Option<EpochSeconds>,
    // 是否允许重做
    pub retakes_allowed: bool,
    // 分类
    pub category: Option<String>,
}

impl Entity for AssignmentRecord {
    const KIND: CollectionKind = CollectionKind::Assignments;

    fn from_fields(key: &str, raw: &RawFields) -> Self {
        Self {
            id: key.to_string(),
            title: string_field(raw, fields::TITLE)
                .unwrap_or_else(|| UNTITLED_ASSIGNMENT.to_string()),
            subtitle: string_field(raw, fields::SUBTITLE),
            class_id: string_field(raw, fields::CLASS_ID),
            maker_id: string_field(raw, fields::MAKER_ID),
            max_points: integer_field(raw, fields::MAX_POINTS).unwrap_or(0),
            due_date: timestamp_field(raw, fields::DUE_DATE),
            retakes_allowed: bool_field(raw, fields::RETAKES).unwrap_or(false),
            category: string_field(raw, fields::CATEGORY),
        }
    }

    fn key(&self) -> &str {
        &self.id
    }
}
