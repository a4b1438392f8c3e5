//! 小组相关写入

use tracing::debug;

use super::{WriteGateway, WriteTicket};
use crate::models::CollectionKind;
use crate::models::groups::requests::{
    CreateGroupAttachmentRequest, CreateGroupMessageRequest, CreateGroupRequest,
    CreateGroupTaskRequest, CreateTaskCompletionRequest, UpdateGroupTaskRequest,
};
use crate::queries::groups::{completions_for_task, user_completion};
use crate::sync::MirrorView;
use crate::utils::now_epoch_seconds;

/// 切换个人完成状态的结果
#[derive(Debug)]
pub enum CompletionToggle {
    /// 新建了完成记录
    Completed(WriteTicket),
    /// 删除了已有的完成记录
    Reopened(WriteTicket),
}

impl CompletionToggle {
    pub fn into_ticket(self) -> WriteTicket {
        match self {
            CompletionToggle::Completed(ticket) | CompletionToggle::Reopened(ticket) => ticket,
        }
    }
}

impl WriteGateway {
    pub fn create_group(&self, request: CreateGroupRequest) -> WriteTicket {
        self.create(CollectionKind::Groups, request.into_fields())
    }

    pub fn create_group_task(&self, request: CreateGroupTaskRequest) -> WriteTicket {
        self.create(
            CollectionKind::GroupTasks,
            request.into_fields(now_epoch_seconds()),
        )
    }

    pub fn update_group_task(&self, task_id: &str, request: UpdateGroupTaskRequest) -> WriteTicket {
        self.update(CollectionKind::GroupTasks, task_id, request.into_fields())
    }

    pub fn delete_group_task(&self, task_id: &str) -> WriteTicket {
        self.delete(CollectionKind::GroupTasks, task_id)
    }

    /// 删除任务及引用它的全部完成记录
    ///
    /// 各删除并发提交，完成顺序不确定；任务本身的票据位于返回列表末尾。
    pub fn delete_group_task_with_completions(
        &self,
        view: &MirrorView,
        task_id: &str,
    ) -> Vec<WriteTicket> {
        let mut tickets: Vec<WriteTicket> = completions_for_task(view, task_id)
            .into_iter()
            .map(|c| self.delete_task_completion(&c.id))
            .collect();
        debug!(
            task_id,
            completions = tickets.len(),
            "Deleting group task with completions"
        );
        tickets.push(self.delete_group_task(task_id));
        tickets
    }

    pub fn create_task_completion(&self, request: CreateTaskCompletionRequest) -> WriteTicket {
        self.create(
            CollectionKind::GroupTaskCompletions,
            request.into_fields(now_epoch_seconds()),
        )
    }

    pub fn delete_task_completion(&self, completion_id: &str) -> WriteTicket {
        self.delete(CollectionKind::GroupTaskCompletions, completion_id)
    }

    /// 切换用户对任务的个人完成状态
    ///
    /// 已有该用户的完成记录则删除，否则新建。任务所属小组取任务记录中的
    /// groupID，任务不在镜像中时使用 `group_id`。
    pub fn toggle_task_completion(
        &self,
        view: &MirrorView,
        task_id: &str,
        group_id: &str,
        user_id: &str,
    ) -> CompletionToggle {
        if let Some(existing) = user_completion(view, task_id, user_id) {
            return CompletionToggle::Reopened(self.delete_task_completion(&existing.id));
        }

        let group_id = view
            .group_tasks
            .get(task_id)
            .and_then(|t| t.group_id.clone())
            .unwrap_or_else(|| group_id.to_string());
        CompletionToggle::Completed(self.create_task_completion(CreateTaskCompletionRequest {
            task_id: task_id.to_string(),
            group_id,
            creator_id: Some(user_id.to_string()),
        }))
    }

    pub fn create_group_attachment(&self, request: CreateGroupAttachmentRequest) -> WriteTicket {
        self.create(
            CollectionKind::GroupAttachments,
            request.into_fields(now_epoch_seconds()),
        )
    }

    pub fn delete_group_attachment(&self, attachment_id: &str) -> WriteTicket {
        self.delete(CollectionKind::GroupAttachments, attachment_id)
    }

    pub fn create_group_message(&self, request: CreateGroupMessageRequest) -> WriteTicket {
        self.create(
            CollectionKind::GroupMessages,
            request.into_fields(now_epoch_seconds()),
        )
    }

    pub fn delete_group_message(&self, message_id: &str) -> WriteTicket {
        self.delete(CollectionKind::GroupMessages, message_id)
    }
}
