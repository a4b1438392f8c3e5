use serde_json::Value;

use super::entities::fields;
use crate::utils::{EpochSeconds, RawFields};

// 创建小组请求
#[derive(Debug, Clone, Default)]
pub struct CreateGroupRequest {
    pub class_id: String,
    pub leader_id: Option<String>,
    pub title: Option<String>,
    pub participants: Vec<String>,
    pub assignment_id: Option<String>,
}

impl CreateGroupRequest {
    pub fn into_fields(self) -> RawFields {
        let mut payload = RawFields::new();
        payload.insert(fields::CLASS_ID.into(), Value::from(self.class_id));
        payload.insert(fields::PARTICIPANTS.into(), Value::from(self.participants));
        if let Some(leader_id) = self.leader_id {
            payload.insert(fields::LEADER_ID.into(), Value::from(leader_id));
        }
        if let Some(title) = self.title {
            payload.insert(fields::GROUP_TITLE.into(), Value::from(title));
        }
        if let Some(assignment_id) = self.assignment_id {
            payload.insert(fields::ASSIGNMENT_ID.into(), Value::from(assignment_id));
        }
        payload
    }
}

// 创建小组任务请求
#[derive(Debug, Clone, Default)]
pub struct CreateGroupTaskRequest {
    pub group_id: String,
    pub creator_id: Option<String>,
    pub title: String,
}

impl CreateGroupTaskRequest {
    pub fn into_fields(self, now: EpochSeconds) -> RawFields {
        let mut payload = RawFields::new();
        payload.insert(fields::GROUP_ID.into(), Value::from(self.group_id));
        payload.insert(fields::TASK_VALUE.into(), Value::from(self.title));
        if let Some(creator_id) = self.creator_id {
            payload.insert(fields::CREATOR_ID.into(), Value::from(creator_id));
        }
        payload.insert(fields::TASK_CREATION_DATE.into(), Value::from(now));
        payload
    }
}

// 更新小组任务请求（例如设置整组完成标记）
#[derive(Debug, Clone, Default)]
pub struct UpdateGroupTaskRequest {
    pub title: Option<String>,
    pub completed_for_group: Option<bool>,
}

impl UpdateGroupTaskRequest {
    pub fn into_fields(self) -> RawFields {
        let mut payload = RawFields::new();
        if let Some(title) = self.title {
            payload.insert(fields::TASK_VALUE.into(), Value::from(title));
        }
        if let Some(completed) = self.completed_for_group {
            payload.insert(fields::TASK_COMPLETED.into(), Value::from(completed));
        }
        payload
    }
}

// 创建任务完成记录请求
#[derive(Debug, Clone, Default)]
pub struct CreateTaskCompletionRequest {
    pub task_id: String,
    pub group_id: String,
    pub creator_id: Option<String>,
}

impl CreateTaskCompletionRequest {
    pub fn into_fields(self, now: EpochSeconds) -> RawFields {
        let mut payload = RawFields::new();
        payload.insert(fields::TASK_ID.into(), Value::from(self.task_id));
        payload.insert(fields::GROUP_ID.into(), Value::from(self.group_id));
        if let Some(creator_id) = self.creator_id {
            payload.insert(fields::CREATOR_ID.into(), Value::from(creator_id));
        }
        payload.insert(fields::COMPLETION_DATE.into(), Value::from(now));
        payload
    }
}

// 创建小组附件请求
#[derive(Debug, Clone, Default)]
pub struct CreateGroupAttachmentRequest {
    pub group_id: String,
    pub creator_id: Option<String>,
    pub link: String,
    pub title: Option<String>,
}

impl CreateGroupAttachmentRequest {
    pub fn into_fields(self, now: EpochSeconds) -> RawFields {
        let mut payload = RawFields::new();
        payload.insert(fields::GROUP_ID.into(), Value::from(self.group_id));
        payload.insert(fields::ATTACHMENT_LINK.into(), Value::from(self.link));
        if let Some(creator_id) = self.creator_id {
            payload.insert(fields::CREATOR_ID.into(), Value::from(creator_id));
        }
        if let Some(title) = self.title {
            payload.insert(fields::ATTACHMENT_TITLE.into(), Value::from(title));
        }
        payload.insert(fields::ATTACHMENT_DATE.into(), Value::from(now));
        payload
    }
}

// 创建小组消息请求
#[derive(Debug, Clone, Default)]
pub struct CreateGroupMessageRequest {
    pub group_id: String,
    pub creator_id: Option<String>,
    pub text: String,
}

impl CreateGroupMessageRequest {
    pub fn into_fields(self, now: EpochSeconds) -> RawFields {
        let mut payload = RawFields::new();
        payload.insert(fields::GROUP_ID.into(), Value::from(self.group_id));
        payload.insert(fields::MESSAGE_TEXT.into(), Value::from(self.text));
        if let Some(creator_id) = self.creator_id {
            payload.insert(fields::CREATOR_ID.into(), Value::from(creator_id));
        }
        payload.insert(fields::MESSAGE_DATE.into(), Value::from(now));
        payload
    }
}
