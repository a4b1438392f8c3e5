//! 最新动态：已选班级的公告与作业合并为一个按时间降序的列表

use serde::Serialize;

use crate::queries::QueryContext;
use crate::queries::enrollment::{announcements_for_user, assignments_for_user, class_name};
use crate::sync::MirrorView;
use crate::utils::EpochSeconds;

const DEFAULT_ANNOUNCEMENT_TITLE: &str = "Announcement";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UpdateKind {
    Announcement,
    Assignment,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateItem {
    // ann_<key> / ass_<key>
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub date: EpochSeconds,
    pub class_name: String,
    pub kind: UpdateKind,
}

pub fn latest_updates(view: &MirrorView, ctx: &QueryContext) -> Vec<UpdateItem> {
    let announcements = announcements_for_user(view, ctx).into_iter().map(|a| UpdateItem {
        id: format!("ann_{}", a.id),
        title: a
            .title
            .clone()
            .unwrap_or_else(|| DEFAULT_ANNOUNCEMENT_TITLE.to_string()),
        subtitle: a.subtitle.clone().unwrap_or_default(),
        date: a.send_date.unwrap_or(0.0),
        class_name: class_name(view, a.class_id.as_deref()),
        kind: UpdateKind::Announcement,
    });
    let assignments = assignments_for_user(view, ctx).into_iter().map(|a| UpdateItem {
        id: format!("ass_{}", a.id),
        title: a.title.clone(),
        subtitle: a.subtitle.clone().unwrap_or_default(),
        date: a.due_date.unwrap_or(0.0),
        class_name: class_name(view, a.class_id.as_deref()),
        kind: UpdateKind::Assignment,
    });

    let mut items: Vec<UpdateItem> = announcements.chain(assignments).collect();
    items.sort_by(|a, b| b.date.total_cmp(&a.date));
    items
}
