//! 小组协作查询

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::Serialize;

use crate::models::groups::entities::{
    GroupAttachmentRecord, GroupMessageRecord, GroupRecord, GroupTaskCompletionRecord,
    GroupTaskRecord,
};
use crate::queries::QueryContext;
use crate::sync::MirrorView;
use crate::utils::{EpochSeconds, ids_equal, normalize_id};

/// 找不到任务时显示的标题
pub const UNTITLED_TASK: &str = "(untitled)";

fn by_date_desc(a: Option<EpochSeconds>, b: Option<EpochSeconds>) -> Ordering {
    b.unwrap_or(0.0).total_cmp(&a.unwrap_or(0.0))
}

/// 用户本人的完成记录，与任务自身的整组完成标记无关
pub fn user_completion<'a>(
    view: &'a MirrorView,
    task_id: &str,
    user_id: &str,
) -> Option<&'a GroupTaskCompletionRecord> {
    view.group_task_completions.iter().find(|c| {
        ids_equal(c.task_id.as_deref(), Some(task_id))
            && ids_equal(c.creator_id.as_deref(), Some(user_id))
    })
}

pub fn is_task_completed_by_user(view: &MirrorView, task_id: &str, user_id: &str) -> bool {
    user_completion(view, task_id, user_id).is_some()
}

/// 当前用户作为组长或组员所在的小组
pub fn my_groups<'a>(view: &'a MirrorView, ctx: &QueryContext) -> Vec<&'a GroupRecord> {
    let Some(user) = ctx.user() else {
        return Vec::new();
    };
    view.groups.iter().filter(|g| g.has_member(user)).collect()
}

/// 小组任务，按创建时间降序；`hide_completed` 时隐藏整组已完成的任务
pub fn tasks_for_group<'a>(
    view: &'a MirrorView,
    group_id: &str,
    hide_completed: bool,
) -> Vec<&'a GroupTaskRecord> {
    let mut tasks: Vec<_> = view
        .group_tasks
        .iter()
        .filter(|t| ids_equal(t.group_id.as_deref(), Some(group_id)))
        .filter(|t| !(hide_completed && t.completed_for_group))
        .collect();
    tasks.sort_by(|a, b| by_date_desc(a.creation_date, b.creation_date));
    tasks
}

pub fn completions_for_task<'a>(
    view: &'a MirrorView,
    task_id: &str,
) -> Vec<&'a GroupTaskCompletionRecord> {
    view.group_task_completions
        .iter()
        .filter(|c| ids_equal(c.task_id.as_deref(), Some(task_id)))
        .collect()
}

pub fn attachments_for_group<'a>(
    view: &'a MirrorView,
    group_id: &str,
) -> Vec<&'a GroupAttachmentRecord> {
    let mut attachments: Vec<_> = view
        .group_attachments
        .iter()
        .filter(|a| ids_equal(a.group_id.as_deref(), Some(group_id)))
        .collect();
    attachments.sort_by(|a, b| by_date_desc(a.date, b.date));
    attachments
}

pub fn messages_for_group<'a>(
    view: &'a MirrorView,
    group_id: &str,
) -> Vec<&'a GroupMessageRecord> {
    let mut messages: Vec<_> = view
        .group_messages
        .iter()
        .filter(|m| ids_equal(m.group_id.as_deref(), Some(group_id)))
        .collect();
    messages.sort_by(|a, b| by_date_desc(a.date, b.date));
    messages
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentCompletion {
    pub completion_id: String,
    pub task_id: Option<String>,
    pub task_title: String,
    pub group_id: Option<String>,
    pub group_title: Option<String>,
    pub completer_id: Option<String>,
    // completionDate，缺失时取任务创建时间
    pub date: Option<EpochSeconds>,
}

/// 我的小组中的任务完成动态，最新的在前
pub fn recent_completions(view: &MirrorView, ctx: &QueryContext) -> Vec<RecentCompletion> {
    let my_group_ids: HashSet<&str> = my_groups(view, ctx)
        .into_iter()
        .filter_map(|g| normalize_id(Some(&g.id)))
        .collect();
    if my_group_ids.is_empty() {
        return Vec::new();
    }

    let mut completions: Vec<RecentCompletion> = view
        .group_task_completions
        .iter()
        .filter(|c| normalize_id(c.group_id.as_deref()).is_some_and(|id| my_group_ids.contains(id)))
        .map(|c| {
            let task = normalize_id(c.task_id.as_deref()).and_then(|id| view.group_tasks.get(id));
            let group = normalize_id(c.group_id.as_deref()).and_then(|id| view.groups.get(id));
            RecentCompletion {
                completion_id: c.id.clone(),
                task_id: c.task_id.clone(),
                task_title: task
                    .and_then(|t| t.title.clone())
                    .unwrap_or_else(|| UNTITLED_TASK.to_string()),
                group_id: c.group_id.clone(),
                group_title: group.and_then(|g| g.title.clone()),
                completer_id: c.creator_id.clone(),
                date: c.completion_date.or_else(|| task.and_then(|t| t.creation_date)),
            }
        })
        .collect();
    completions.sort_by(|a, b| by_date_desc(a.date, b.date));
    completions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::fixtures::{context, entity};
    use serde_json::json;

    fn view_with_completions(completions: Vec<GroupTaskCompletionRecord>) -> MirrorView {
        MirrorView::builder()
            .groups(vec![
                entity("g1", json!({ "leaderID": "U", "groupTitle": "Lab" })),
                entity("g2", json!({ "groupParticipants": ["V"] })),
            ])
            .group_tasks(vec![
                entity("t1", json!({ "groupID": "g1", "taskValue": "Outline", "taskCompleted": true, "taskCreationDate": 100 })),
                entity("t2", json!({ "groupID": "g1", "taskCreationDate": 200 })),
                entity("t3", json!({ "groupID": "g2", "taskValue": "Other" })),
            ])
            .group_task_completions(completions)
            .build()
    }

    #[test]
    fn test_per_user_completion_ignores_group_flag() {
        let view = view_with_completions(vec![entity(
            "k1",
            json!({ "taskID": "t2", "groupID": "g1", "creatorID": "U" }),
        )]);
        // t1 整组已完成，但 U 没有完成记录
        assert!(!is_task_completed_by_user(&view, "t1", "U"));
        assert!(is_task_completed_by_user(&view, "t2", "U"));
        assert!(!is_task_completed_by_user(&view, "t2", "V"));

        // 删除完成记录后恢复为未完成
        let view = view_with_completions(Vec::new());
        assert!(!is_task_completed_by_user(&view, "t2", "U"));
    }

    #[test]
    fn test_tasks_for_group_sorted_and_filtered() {
        let view = view_with_completions(Vec::new());
        let ids: Vec<_> = tasks_for_group(&view, "g1", false).iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t2", "t1"]);
        let open: Vec<_> = tasks_for_group(&view, "g1", true).iter().map(|t| t.id.as_str()).collect();
        assert_eq!(open, vec!["t2"]);
    }

    #[test]
    fn test_recent_completions_only_in_my_groups() {
        let view = view_with_completions(vec![
            entity("k1", json!({ "taskID": "t1", "groupID": "g1", "creatorID": "W", "completionDate": 500 })),
            entity("k2", json!({ "taskID": "t2", "groupID": "g1", "creatorID": "U" })),
            entity("k3", json!({ "taskID": "missing", "groupID": "g1", "completionDate": 900 })),
            entity("k4", json!({ "taskID": "t3", "groupID": "g2", "completionDate": 999 })),
        ]);
        let recent = recent_completions(&view, &context(Some("U")));
        let ids: Vec<_> = recent.iter().map(|c| c.completion_id.as_str()).collect();
        assert_eq!(ids, vec!["k3", "k1", "k2"]);
        assert_eq!(recent[0].task_title, UNTITLED_TASK);
        assert_eq!(recent[1].task_title, "Outline");
        assert_eq!(recent[1].group_title.as_deref(), Some("Lab"));
        // 缺少完成时间时使用任务创建时间
        assert_eq!(recent[2].date, Some(200.0));

        assert!(recent_completions(&view, &context(None)).is_empty());
    }

    #[test]
    fn test_my_groups() {
        let view = view_with_completions(Vec::new());
        let mine: Vec<_> = my_groups(&view, &context(Some("V"))).iter().map(|g| g.id.as_str()).collect();
        assert_eq!(mine, vec!["g2"]);
    }
}
