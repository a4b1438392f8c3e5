use serde::Serialize;

use crate::models::{CollectionKind, Entity};
use crate::utils::RawFields;
use crate::utils::normalize::string_field;

pub(crate) mod fields {
    pub const SUBMITTER_ID: &str = "assignmentSubmitterID";
    pub const ASSIGNMENT_ID: &str = "assignmentID";
    pub const CLASS_ID: &str = "classID";
    pub const LINK: &str = "submissionLink";
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentSubmissionRecord {
    // 提交键
    pub id: String,
    // 提交者 ID
    pub submitter_id: Option<String>,
    // 作业 ID
    pub assignment_id: Option<String>,
    // 班级 ID
    pub class_id: Option<String>,
    // 提交链接
    pub submission_link: Option<String>,
}

impl Entity for AssignmentSubmissionRecord {
    const KIND: CollectionKind = CollectionKind::AssignmentSubmissions;

    fn from_fields(key: &str, raw: &RawFields) -> Self {
        Self {
            id: key.to_string(),
            submitter_id: string_field(raw, fields::SUBMITTER_ID),
            assignment_id: string_field(raw, fields::ASSIGNMENT_ID),
            class_id: string_field(raw, fields::CLASS_ID),
            submission_link: string_field(raw, fields::LINK),
        }
    }

    fn key(&self) -> &str {
        &self.id
    }
}
