//! 小组协作相关实体：小组、任务、任务完成记录、附件、消息

use serde::Serialize;

use crate::models::{CollectionKind, Entity};
use crate::utils::normalize::{bool_field, string_field, string_list_field, timestamp_field};
use crate::utils::{EpochSeconds, RawFields, ids_equal};

pub(crate) mod fields {
    pub const GROUP_ID: &str = "groupID";
    pub const CREATOR_ID: &str = "creatorID";

    pub const CLASS_ID: &str = "classID";
    pub const LEADER_ID: &str = "leaderID";
    pub const PARTICIPANTS: &str = "groupParticipants";
    pub const GROUP_TITLE: &str = "groupTitle";
    pub const ASSIGNMENT_ID: &str = "assignmentID";

    pub const TASK_VALUE: &str = "taskValue";
    pub const TASK_CREATION_DATE: &str = "taskCreationDate";
    pub const TASK_COMPLETED: &str = "taskCompleted";

    pub const TASK_ID: &str = "taskID";
    pub const COMPLETION_DATE: &str = "completionDate";

    pub const ATTACHMENT_LINK: &str = "attachmentLink";
    pub const ATTACHMENT_TITLE: &str = "attachmentTitle";
    pub const ATTACHMENT_DATE: &str = "attachmentDate";

    pub const MESSAGE_TEXT: &str = "messageText";
    pub const MESSAGE_DATE: &str = "messageDate";
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRecord {
    pub id: String,
    pub class_id: Option<String>,
    pub leader_id: Option<String>,
    pub participants: Vec<String>,
    pub title: Option<String>,
    pub assignment_id: Option<String>,
}

impl GroupRecord {
    /// 用户是否为组长或组员
    pub fn has_member(&self, user_id: &str) -> bool {
        ids_equal(self.leader_id.as_deref(), Some(user_id))
            || self
                .participants
                .iter()
                .any(|p| ids_equal(Some(p.as_str()), Some(user_id)))
    }
}

impl Entity for GroupRecord {
    const KIND: CollectionKind = CollectionKind::Groups;

    fn from_fields(key: &str, raw: &RawFields) -> Self {
        Self {
            id: key.to_string(),
            class_id: string_field(raw, fields::CLASS_ID),
            leader_id: string_field(raw, fields::LEADER_ID),
            participants: string_list_field(raw, fields::PARTICIPANTS),
            title: string_field(raw, fields::GROUP_TITLE),
            assignment_id: string_field(raw, fields::ASSIGNMENT_ID),
        }
    }

    fn key(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTaskRecord {
    pub id: String,
    pub group_id: Option<String>,
    pub creator_id: Option<String>,
    // 存储字段为 taskValue
    pub title: Option<String>,
    pub creation_date: Option<EpochSeconds>,
    // 整组完成标记，与个人完成记录无关
    pub completed_for_group: bool,
}

impl Entity for GroupTaskRecord {
    const KIND: CollectionKind = CollectionKind::GroupTasks;

    fn from_fields(key: &str, raw: &RawFields) -> Self {
        Self {
            id: key.to_string(),
            group_id: string_field(raw, fields::GROUP_ID),
            creator_id: string_field(raw, fields::CREATOR_ID),
            title: string_field(raw, fields::TASK_VALUE),
            creation_date: timestamp_field(raw, fields::TASK_CREATION_DATE),
            completed_for_group: bool_field(raw, fields::TASK_COMPLETED).unwrap_or(false),
        }
    }

    fn key(&self) -> &str {
        &self.id
    }
}

/// 每条记录表示某个用户完成了某个任务
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTaskCompletionRecord {
    pub id: String,
    pub task_id: Option<String>,
    pub group_id: Option<String>,
    pub creator_id: Option<String>,
    pub completion_date: Option<EpochSeconds>,
}

impl Entity for GroupTaskCompletionRecord {
    const KIND: CollectionKind = CollectionKind::GroupTaskCompletions;

    fn from_fields(key: &str, raw: &RawFields) -> Self {
        Self {
            id: key.to_string(),
            task_id: string_field(raw, fields::TASK_ID),
            group_id: string_field(raw, fields::GROUP_ID),
            creator_id: string_field(raw, fields::CREATOR_ID),
            completion_date: timestamp_field(raw, fields::COMPLETION_DATE),
        }
    }

    fn key(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupAttachmentRecord {
    pub id: String,
    pub group_id: Option<String>,
    pub creator_id: Option<String>,
    // 缺失时为空字符串
    pub link: String,
    pub title: Option<String>,
    pub date: Option<EpochSeconds>,
}

impl Entity for GroupAttachmentRecord {
    const KIND: CollectionKind = CollectionKind::GroupAttachments;

    fn from_fields(key: &str, raw: &RawFields) -> Self {
        Self {
            id: key.to_string(),
            group_id: string_field(raw, fields::GROUP_ID),
            creator_id: string_field(raw, fields::CREATOR_ID),
            link: string_field(raw, fields::ATTACHMENT_LINK).unwrap_or_default(),
            title: string_field(raw, fields::ATTACHMENT_TITLE),
            date: timestamp_field(raw, fields::ATTACHMENT_DATE),
        }
    }

    fn key(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMessageRecord {
    pub id: String,
    pub group_id: Option<String>,
    pub creator_id: Option<String>,
    pub text: Option<String>,
    pub date: Option<EpochSeconds>,
}

impl Entity for GroupMessageRecord {
    const KIND: CollectionKind = CollectionKind::GroupMessages;

    fn from_fields(key: &str, raw: &RawFields) -> Self {
        Self {
            id: key.to_string(),
            group_id: string_field(raw, fields::GROUP_ID),
            creator_id: string_field(raw, fields::CREATOR_ID),
            text: string_field(raw, fields::MESSAGE_TEXT),
            date: timestamp_field(raw, fields::MESSAGE_DATE),
        }
    }

    fn key(&self) -> &str {
        &self.id
    }
}
